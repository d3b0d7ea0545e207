use crate::app::GetFromEmail;

use blog_domain::error::BlogResult;
use blog_domain::notify::NewFollowerMessage;
use blog_domain::profile::repo::ProfileRecord;

use entrait::*;

/// Writes would-be emails to the log instead of sending them.
pub struct LoggingNotifier;

#[entrait]
impl blog_domain::notify::NotifierImpl for LoggingNotifier {
    pub async fn notify_new_follower(
        deps: &impl GetFromEmail,
        followee: &ProfileRecord,
        follower: &ProfileRecord,
    ) -> BlogResult<()> {
        let message = NewFollowerMessage::new(followee, follower);

        tracing::info!(
            recipient = %message.recipient,
            sender = %deps.get_from_email(),
            subject = message.subject,
            body = %message.body,
            "new follower email"
        );
        Ok(())
    }
}
