use crate::blog::BlogId;
use crate::error::BlogResult;
use crate::user::UserId;

use super::CommentId;

use entrait::entrait_export as entrait;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentRecord {
    pub comment_id: CommentId,
    pub blog_id: BlogId,
    pub author_id: UserId,
    pub author_username: String,
    pub body: String,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
}

#[entrait(CommentRepoImpl, delegate_by = DelegateCommentRepo, mock_api=CommentRepoMock)]
pub trait CommentRepo {
    /// Oldest first.
    async fn list_comments(&self, blog_id: BlogId) -> BlogResult<Vec<CommentRecord>>;

    async fn find_comment(&self, comment_id: CommentId) -> BlogResult<Option<CommentRecord>>;

    async fn insert_comment(
        &self,
        blog_id: BlogId,
        author_id: UserId,
        body: &str,
    ) -> BlogResult<CommentRecord>;

    async fn update_comment(&self, comment_id: CommentId, body: &str)
        -> BlogResult<CommentRecord>;

    async fn delete_comment(&self, comment_id: CommentId) -> BlogResult<()>;
}
