use super::repo::UserRepo;
use super::UserId;
use crate::error::{BlogError, BlogResult};

use entrait::entrait_export as entrait;

///
/// The username an authentication provider vouched for.
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Actor(String);

impl Actor {
    pub fn new(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    pub fn username(&self) -> &str {
        &self.0
    }
}

#[entrait(pub Authenticate, mock_api=AuthenticateMock)]
pub mod authenticate {
    use super::*;

    pub async fn authenticate(deps: &impl UserRepo, actor: Actor) -> BlogResult<UserId> {
        deps.find_user_by_username(actor.username())
            .await?
            .map(|user| user.user_id)
            .ok_or(BlogError::CurrentUserDoesNotExist)
    }
}
