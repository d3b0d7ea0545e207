use crate::DbResultExt;
use crate::GetDb;
use crate::OnConstraint;

use blog_domain::blog::BlogId;
use blog_domain::error::{BlogError, BlogResult};
use blog_domain::user::UserId;

use entrait::*;

pub struct PgFavoriteRepo;

#[entrait]
impl blog_domain::favorite::repo::FavoriteRepoImpl for PgFavoriteRepo {
    pub async fn insert_favorite(
        deps: &impl GetDb,
        UserId(user_id): UserId,
        BlogId(blog_id): BlogId,
    ) -> BlogResult<()> {
        sqlx::query("INSERT INTO app.favorite (user_id, blog_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(blog_id)
            .execute(&deps.get_db().pg_pool)
            .await
            .to_blog_err()
            .on_constraint("favorite_pkey", |_| BlogError::AlreadyFavorited)?;

        Ok(())
    }

    pub async fn delete_favorite(
        deps: &impl GetDb,
        UserId(user_id): UserId,
        BlogId(blog_id): BlogId,
    ) -> BlogResult<()> {
        sqlx::query("DELETE FROM app.favorite WHERE user_id = $1 AND blog_id = $2")
            .bind(user_id)
            .bind(blog_id)
            .execute(&deps.get_db().pg_pool)
            .await
            .to_blog_err()?;

        Ok(())
    }
}
