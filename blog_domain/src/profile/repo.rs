use entrait::entrait_export as entrait;

use super::{Gender, ProfileId};
use crate::error::BlogResult;
use crate::user::UserId;

/// A profile joined with the account that owns it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProfileRecord {
    pub profile_id: ProfileId,
    pub user_id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub profile_photo: String,
    pub about_me: String,
    pub gender: Gender,
    pub city: String,
    pub twitter_handle: String,
    pub facebook_account: String,
    pub github_account: String,
}

#[derive(Clone, Default, Debug)]
pub struct ProfileUpdate<'a> {
    pub profile_photo: Option<&'a str>,
    pub about_me: Option<&'a str>,
    pub gender: Option<Gender>,
    pub city: Option<&'a str>,
    pub twitter_handle: Option<&'a str>,
    pub facebook_account: Option<&'a str>,
    pub github_account: Option<&'a str>,
}

#[entrait(ProfileRepoImpl, delegate_by = DelegateProfileRepo, mock_api=ProfileRepoMock)]
pub trait ProfileRepo {
    /// Create the profile of a freshly created account, with default settings.
    async fn insert_profile(&self, user_id: UserId) -> BlogResult<ProfileRecord>;

    async fn find_profile_by_username(&self, username: &str)
        -> BlogResult<Option<ProfileRecord>>;

    async fn find_profile_by_user_id(&self, user_id: UserId)
        -> BlogResult<Option<ProfileRecord>>;

    /// All profiles, ordered by username.
    async fn list_profiles(&self) -> BlogResult<Vec<ProfileRecord>>;

    async fn update_profile(
        &self,
        profile_id: ProfileId,
        update: ProfileUpdate<'_>,
    ) -> BlogResult<ProfileRecord>;
}
