use crate::blog::BlogId;
use crate::error::BlogResult;
use crate::user::UserId;

use entrait::entrait_export as entrait;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RatingRecord {
    pub rating_id: uuid::Uuid,
    pub blog_id: BlogId,
    pub rated_by: String,
    pub value: i16,
    pub review: String,
    pub created_at: time::OffsetDateTime,
}

#[entrait(RatingRepoImpl, delegate_by = DelegateRatingRepo, mock_api=RatingRepoMock)]
pub trait RatingRepo {
    async fn has_rated(&self, blog_id: BlogId, user_id: UserId) -> BlogResult<bool>;

    /// Fails with `AlreadyRated` when `rated_by` has rated the blog before.
    async fn insert_rating(
        &self,
        blog_id: BlogId,
        rated_by: UserId,
        value: i16,
        review: &str,
    ) -> BlogResult<RatingRecord>;

    async fn list_ratings(&self, blog_id: BlogId) -> BlogResult<Vec<RatingRecord>>;
}
