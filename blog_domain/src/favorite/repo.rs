use crate::blog::BlogId;
use crate::error::BlogResult;
use crate::user::UserId;

use entrait::entrait_export as entrait;

#[entrait(FavoriteRepoImpl, delegate_by = DelegateFavoriteRepo, mock_api=FavoriteRepoMock)]
pub trait FavoriteRepo {
    /// Fails with `AlreadyFavorited` when the blog is already a favorite.
    async fn insert_favorite(&self, user_id: UserId, blog_id: BlogId) -> BlogResult<()>;

    /// Removing a favorite that does not exist is not an error.
    async fn delete_favorite(&self, user_id: UserId, blog_id: BlogId) -> BlogResult<()>;
}
