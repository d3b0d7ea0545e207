pub mod repo;

use crate::blog::repo::{BlogRepo, Filter};
use crate::blog::{find_blog, get_single_blog, Blog};
use crate::error::*;
use crate::user::auth::{Actor, Authenticate};
use repo::FavoriteRepo;

use entrait::entrait_export as entrait;

#[derive(serde::Serialize, Debug)]
pub struct Favorites {
    pub my_favorites: Vec<Blog>,
}

#[entrait(pub FavoriteApi, mock_api=FavoriteApiMock)]
pub mod api {
    use super::*;

    pub async fn favorite_blog(
        deps: &(impl Authenticate + BlogRepo + FavoriteRepo),
        actor: Actor,
        slug: &str,
    ) -> BlogResult<Blog> {
        let current_user_id = deps.authenticate(actor).await?;
        let blog = find_blog(deps, slug).await?;

        deps.insert_favorite(current_user_id, blog.blog_id).await?;
        tracing::info!(%slug, "blog favorited");

        get_single_blog(deps, slug).await
    }

    pub async fn unfavorite_blog(
        deps: &(impl Authenticate + BlogRepo + FavoriteRepo),
        actor: Actor,
        slug: &str,
    ) -> BlogResult<()> {
        let current_user_id = deps.authenticate(actor).await?;
        let blog = find_blog(deps, slug).await?;

        deps.delete_favorite(current_user_id, blog.blog_id).await
    }

    pub async fn list_favorites(
        deps: &(impl Authenticate + BlogRepo),
        actor: Actor,
    ) -> BlogResult<Favorites> {
        let current_user_id = deps.authenticate(actor).await?;

        let blogs = deps
            .select_blogs(Filter {
                favorited_by: Some(current_user_id),
                ..Default::default()
            })
            .await?;

        Ok(Favorites {
            my_favorites: blogs.into_iter().map(Into::into).collect(),
        })
    }
}
