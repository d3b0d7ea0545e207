use crate::error::BlogResult;
use crate::profile::repo::ProfileRecord;

use entrait::entrait_export as entrait;

pub const NEW_FOLLOWER_SUBJECT: &str = "A new user follows you";

/// Tells people about things that happened to them.
#[entrait(NotifierImpl, delegate_by = DelegateNotifier, mock_api=NotifierMock)]
pub trait Notifier {
    async fn notify_new_follower(
        &self,
        followee: &ProfileRecord,
        follower: &ProfileRecord,
    ) -> BlogResult<()>;
}

/// The email a followee receives about a new follower.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewFollowerMessage {
    pub recipient: String,
    pub subject: &'static str,
    pub body: String,
}

impl NewFollowerMessage {
    pub fn new(followee: &ProfileRecord, follower: &ProfileRecord) -> Self {
        Self {
            recipient: followee.email.clone(),
            subject: NEW_FOLLOWER_SUBJECT,
            body: format!(
                "Hi there {}!!, the user {} now follows you",
                followee.username, follower.username
            ),
        }
    }
}
