pub mod repo;

use crate::blog::{find_blog, repo::BlogRepo};
use crate::error::*;
use crate::user::auth::{Actor, Authenticate};
use crate::user::UserId;
use repo::{CommentRecord, CommentRepo};

use entrait::entrait_export as entrait;
use uuid::Uuid;

#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct CommentId(pub Uuid);

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct Comment {
    pub id: CommentId,
    pub author: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: time::OffsetDateTime,
}

impl From<CommentRecord> for Comment {
    fn from(record: CommentRecord) -> Self {
        Self {
            id: record.comment_id,
            author: record.author_username,
            body: record.body,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct CommentList {
    pub num_comments: usize,
    pub comments: Vec<Comment>,
}

#[entrait(pub CommentApi, mock_api=CommentApiMock)]
pub mod api {
    use super::*;

    pub async fn list_comments(
        deps: &(impl Authenticate + BlogRepo + CommentRepo),
        actor: Actor,
        slug: &str,
    ) -> BlogResult<CommentList> {
        deps.authenticate(actor).await?;
        let blog = find_blog(deps, slug).await?;

        let comments: Vec<Comment> = deps
            .list_comments(blog.blog_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(CommentList {
            num_comments: comments.len(),
            comments,
        })
    }

    pub async fn add_comment(
        deps: &(impl Authenticate + BlogRepo + CommentRepo),
        actor: Actor,
        slug: &str,
        body: &str,
    ) -> BlogResult<Comment> {
        let current_user_id = deps.authenticate(actor).await?;
        let blog = find_blog(deps, slug).await?;
        let body = validate_body(body)?;

        let comment = deps
            .insert_comment(blog.blog_id, current_user_id, body)
            .await?;
        tracing::info!(%slug, author = %comment.author_username, "comment added");

        Ok(comment.into())
    }

    pub async fn update_comment(
        deps: &(impl Authenticate + CommentRepo),
        actor: Actor,
        comment_id: CommentId,
        body: &str,
    ) -> BlogResult<Comment> {
        let current_user_id = deps.authenticate(actor).await?;
        own_comment(deps, current_user_id, comment_id).await?;
        let body = validate_body(body)?;

        deps.update_comment(comment_id, body).await.map(Into::into)
    }

    pub async fn delete_comment(
        deps: &(impl Authenticate + CommentRepo),
        actor: Actor,
        comment_id: CommentId,
    ) -> BlogResult<()> {
        let current_user_id = deps.authenticate(actor).await?;
        own_comment(deps, current_user_id, comment_id).await?;

        deps.delete_comment(comment_id).await
    }

    async fn own_comment(
        deps: &impl CommentRepo,
        current_user_id: UserId,
        comment_id: CommentId,
    ) -> BlogResult<CommentRecord> {
        let comment = deps
            .find_comment(comment_id)
            .await?
            .ok_or(BlogError::CommentNotFound)?;

        if comment.author_id != current_user_id {
            return Err(BlogError::NotYourComment);
        }
        Ok(comment)
    }

    fn validate_body(body: &str) -> BlogResult<&str> {
        let body = body.trim();
        if body.is_empty() {
            return Err(BlogError::invalid("body", "This field may not be blank."));
        }
        Ok(body)
    }
}
