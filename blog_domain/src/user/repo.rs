use entrait::entrait_export as entrait;

use super::password::PasswordHash;
use super::UserId;
use crate::error::BlogResult;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: time::OffsetDateTime,
}

#[derive(Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: PasswordHash,
}

#[entrait(UserRepoImpl, delegate_by = DelegateUserRepo, mock_api=UserRepoMock)]
pub trait UserRepo {
    async fn insert_user(&self, new_user: NewUser<'_>) -> BlogResult<User>;

    async fn find_user_by_username(&self, username: &str) -> BlogResult<Option<User>>;

    /// Removing a user also removes everything that belongs to it.
    async fn delete_user(&self, user_id: UserId) -> BlogResult<()>;
}
