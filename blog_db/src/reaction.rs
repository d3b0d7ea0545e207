use crate::DbResultExt;
use crate::GetDb;

use blog_domain::blog::BlogId;
use blog_domain::error::BlogResult;
use blog_domain::reaction::Reaction;
use blog_domain::user::UserId;

use anyhow::anyhow;
use entrait::*;

pub struct PgReactionRepo;

#[entrait]
impl blog_domain::reaction::repo::ReactionRepoImpl for PgReactionRepo {
    pub async fn find_reaction(
        deps: &impl GetDb,
        BlogId(blog_id): BlogId,
        UserId(user_id): UserId,
    ) -> BlogResult<Option<Reaction>> {
        let value = sqlx::query_scalar::<_, i16>(
            "SELECT value FROM app.reaction WHERE blog_id = $1 AND user_id = $2",
        )
        .bind(blog_id)
        .bind(user_id)
        .fetch_optional(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?;

        value
            .map(|value| {
                Reaction::from_value(value)
                    .ok_or_else(|| anyhow!("unexpected reaction value {value}").into())
            })
            .transpose()
    }

    pub async fn upsert_reaction(
        deps: &impl GetDb,
        BlogId(blog_id): BlogId,
        UserId(user_id): UserId,
        reaction: Reaction,
    ) -> BlogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO app.reaction (blog_id, user_id, value) VALUES ($1, $2, $3)
            ON CONFLICT (blog_id, user_id) DO UPDATE SET value = EXCLUDED.value
            "#,
        )
        .bind(blog_id)
        .bind(user_id)
        .bind(reaction.value())
        .execute(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?;

        Ok(())
    }

    pub async fn delete_reaction(
        deps: &impl GetDb,
        BlogId(blog_id): BlogId,
        UserId(user_id): UserId,
    ) -> BlogResult<()> {
        sqlx::query("DELETE FROM app.reaction WHERE blog_id = $1 AND user_id = $2")
            .bind(blog_id)
            .bind(user_id)
            .execute(&deps.get_db().pg_pool)
            .await
            .to_blog_err()?;

        Ok(())
    }
}
