use crate::blog::BlogId;
use crate::error::BlogResult;
use crate::user::UserId;

use super::Reaction;

use entrait::entrait_export as entrait;

#[entrait(ReactionRepoImpl, delegate_by = DelegateReactionRepo, mock_api=ReactionRepoMock)]
pub trait ReactionRepo {
    async fn find_reaction(&self, blog_id: BlogId, user_id: UserId)
        -> BlogResult<Option<Reaction>>;

    /// Insert the reaction, or replace the user's existing one.
    async fn upsert_reaction(
        &self,
        blog_id: BlogId,
        user_id: UserId,
        reaction: Reaction,
    ) -> BlogResult<()>;

    async fn delete_reaction(&self, blog_id: BlogId, user_id: UserId) -> BlogResult<()>;
}
