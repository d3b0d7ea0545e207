pub mod repo;

use crate::error::{BlogError, BlogResult};
use crate::notify::Notifier;
use crate::social_graph::SocialGraph;
use crate::user::auth::{Actor, Authenticate};
use crate::user::{full_name, UserId};
use repo::{ProfileRecord, ProfileRepo};

use entrait::entrait_export as entrait;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ProfileId(pub Uuid);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub const DEFAULT_CITY: &str = "Accra";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = BlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            _ => Err(BlogError::invalid(
                "gender",
                format!("\"{s}\" is not a valid choice"),
            )),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct Profile {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub id: ProfileId,
    pub profile_photo: String,
    pub about_me: String,
    pub gender: Gender,
    pub city: String,
    pub twitter_handle: String,
    pub facebook_account: String,
    pub github_account: String,
    /// Whether the viewer follows this profile.
    pub following: bool,
}

impl Profile {
    fn new(record: ProfileRecord, following: bool) -> Self {
        Self {
            full_name: full_name(&record.first_name, &record.last_name),
            username: record.username,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            id: record.profile_id,
            profile_photo: record.profile_photo,
            about_me: record.about_me,
            gender: record.gender,
            city: record.city,
            twitter_handle: record.twitter_handle,
            facebook_account: record.facebook_account,
            github_account: record.github_account,
            following,
        }
    }
}

#[derive(serde::Deserialize, Default)]
#[serde(default)]
pub struct ProfileUpdate {
    pub profile_photo: Option<String>,
    pub about_me: Option<String>,
    pub gender: Option<Gender>,
    pub city: Option<String>,
    pub twitter_handle: Option<String>,
    pub facebook_account: Option<String>,
    pub github_account: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct FollowingList {
    pub users_i_follow: Vec<Profile>,
    pub num_users_i_follow: usize,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct FollowersList {
    pub followers: Vec<Profile>,
    pub num_of_followers: usize,
}

const MAX_CITY_LENGTH: usize = 180;
const MAX_HANDLE_LENGTH: usize = 50;

/// Runs after an account has been stored.
#[entrait(pub AccountHooks, mock_api=AccountHooksMock)]
pub mod account_hooks {
    use super::*;
    use crate::user::repo::User;

    pub async fn on_account_created(deps: &impl ProfileRepo, user: &User) -> BlogResult<()> {
        let profile = deps.insert_profile(user.user_id).await?;
        tracing::info!("{}'s profile created", profile.username);
        Ok(())
    }
}

#[entrait(pub ProfileApi, mock_api=ProfileApiMock)]
pub mod api {
    use super::*;

    pub async fn list_profiles(
        deps: &(impl Authenticate + ProfileRepo + SocialGraph),
        actor: Actor,
    ) -> BlogResult<Vec<Profile>> {
        let me = current_profile(deps, actor).await?;
        let followed = followed_by(deps, &me).await?;

        Ok(deps
            .list_profiles()
            .await?
            .into_iter()
            .map(|record| {
                let following = followed.contains(&record.profile_id);
                Profile::new(record, following)
            })
            .collect())
    }

    pub async fn fetch_profile(
        deps: &(impl Authenticate + ProfileRepo + SocialGraph),
        actor: Actor,
        username: &str,
    ) -> BlogResult<Profile> {
        let me = current_profile(deps, actor).await?;
        let profile = find_profile(deps, username).await?;
        let following = deps
            .check_following(me.profile_id, profile.profile_id)
            .await?;

        Ok(Profile::new(profile, following))
    }

    pub async fn update_profile(
        deps: &(impl Authenticate + ProfileRepo),
        actor: Actor,
        username: &str,
        update: ProfileUpdate,
    ) -> BlogResult<Profile> {
        let current_user_id = deps.authenticate(actor).await?;
        let profile = find_profile(deps, username).await?;
        if profile.user_id != current_user_id {
            return Err(BlogError::NotYourProfile);
        }

        validate_update(&update)?;

        let updated = deps
            .update_profile(
                profile.profile_id,
                repo::ProfileUpdate {
                    profile_photo: update.profile_photo.as_deref(),
                    about_me: update.about_me.as_deref(),
                    gender: update.gender,
                    city: update.city.as_deref().map(str::trim),
                    twitter_handle: update.twitter_handle.as_deref(),
                    facebook_account: update.facebook_account.as_deref(),
                    github_account: update.github_account.as_deref(),
                },
            )
            .await?;

        // Nobody follows themselves
        Ok(Profile::new(updated, false))
    }

    pub async fn follow_user(
        deps: &(impl Authenticate + ProfileRepo + SocialGraph + Notifier),
        actor: Actor,
        username: &str,
    ) -> BlogResult<Profile> {
        let current_user_id = deps.authenticate(actor).await?;
        let target = find_profile(deps, username).await?;
        if target.user_id == current_user_id {
            return Err(BlogError::CantFollowYourself);
        }

        let me = own_profile(deps, current_user_id).await?;
        if deps
            .check_following(me.profile_id, target.profile_id)
            .await?
        {
            return Err(BlogError::AlreadyFollowing(target.username));
        }

        deps.follow(me.profile_id, target.profile_id).await?;
        tracing::info!("{} now follows {}", me.username, target.username);

        if let Err(err) = deps.notify_new_follower(&target, &me).await {
            tracing::warn!(?err, followee = %target.username, "failed to notify about new follower");
        }

        Ok(Profile::new(target, true))
    }

    pub async fn unfollow_user(
        deps: &(impl Authenticate + ProfileRepo + SocialGraph),
        actor: Actor,
        username: &str,
    ) -> BlogResult<Profile> {
        let me = current_profile(deps, actor).await?;
        let target = find_profile(deps, username).await?;
        if !deps
            .check_following(me.profile_id, target.profile_id)
            .await?
        {
            return Err(BlogError::NotFollowing(target.username));
        }

        deps.unfollow(me.profile_id, target.profile_id).await?;
        tracing::info!("{} unfollowed {}", me.username, target.username);

        Ok(Profile::new(target, false))
    }

    pub async fn following(
        deps: &(impl Authenticate + ProfileRepo + SocialGraph),
        actor: Actor,
        username: &str,
    ) -> BlogResult<FollowingList> {
        let me = current_profile(deps, actor).await?;
        let profile = find_profile(deps, username).await?;

        let users_i_follow = relative_to(
            deps.following_list(profile.profile_id).await?,
            &followed_by(deps, &me).await?,
        );

        Ok(FollowingList {
            num_users_i_follow: users_i_follow.len(),
            users_i_follow,
        })
    }

    pub async fn followers(
        deps: &(impl Authenticate + ProfileRepo + SocialGraph),
        actor: Actor,
        username: &str,
    ) -> BlogResult<FollowersList> {
        let me = current_profile(deps, actor).await?;
        let profile = find_profile(deps, username).await?;

        let followers = relative_to(
            deps.followers_list(profile.profile_id).await?,
            &followed_by(deps, &me).await?,
        );

        Ok(FollowersList {
            num_of_followers: followers.len(),
            followers,
        })
    }

    async fn current_profile(
        deps: &(impl Authenticate + ProfileRepo),
        actor: Actor,
    ) -> BlogResult<ProfileRecord> {
        let current_user_id = deps.authenticate(actor).await?;
        own_profile(deps, current_user_id).await
    }

    async fn own_profile(deps: &impl ProfileRepo, user_id: UserId) -> BlogResult<ProfileRecord> {
        deps.find_profile_by_user_id(user_id)
            .await?
            .ok_or(BlogError::CurrentUserDoesNotExist)
    }

    async fn find_profile(deps: &impl ProfileRepo, username: &str) -> BlogResult<ProfileRecord> {
        deps.find_profile_by_username(username)
            .await?
            .ok_or(BlogError::ProfileNotFound)
    }

    async fn followed_by(
        deps: &impl SocialGraph,
        viewer: &ProfileRecord,
    ) -> BlogResult<HashSet<ProfileId>> {
        Ok(deps
            .following_list(viewer.profile_id)
            .await?
            .into_iter()
            .map(|record| record.profile_id)
            .collect())
    }

    fn relative_to(records: Vec<ProfileRecord>, followed: &HashSet<ProfileId>) -> Vec<Profile> {
        records
            .into_iter()
            .map(|record| {
                let following = followed.contains(&record.profile_id);
                Profile::new(record, following)
            })
            .collect()
    }

    fn validate_update(update: &ProfileUpdate) -> BlogResult<()> {
        if let Some(city) = &update.city {
            let city = city.trim();
            if city.is_empty() || city.chars().count() > MAX_CITY_LENGTH {
                return Err(BlogError::invalid(
                    "city",
                    format!("The city is required and can't exceed {MAX_CITY_LENGTH} characters"),
                ));
            }
        }
        for (field, value) in [
            ("twitter_handle", &update.twitter_handle),
            ("facebook_account", &update.facebook_account),
            ("github_account", &update.github_account),
        ] {
            if value
                .as_ref()
                .is_some_and(|value| value.chars().count() > MAX_HANDLE_LENGTH)
            {
                return Err(BlogError::invalid(
                    field,
                    format!("Ensure this field has no more than {MAX_HANDLE_LENGTH} characters"),
                ));
            }
        }
        Ok(())
    }
}
