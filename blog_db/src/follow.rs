use crate::profile::{into_records, ProfileRow, PROFILE_COLUMNS};
use crate::DbResultExt;
use crate::GetDb;
use crate::OnConstraint;

use blog_domain::error::{BlogError, BlogResult};
use blog_domain::profile::repo::ProfileRecord;
use blog_domain::profile::ProfileId;

use entrait::*;

pub struct PgFollowRepo;

#[entrait]
impl blog_domain::social_graph::FollowRepoImpl for PgFollowRepo {
    pub async fn insert_follow(
        deps: &impl GetDb,
        ProfileId(follower): ProfileId,
        ProfileId(followee): ProfileId,
    ) -> BlogResult<()> {
        sqlx::query(
            r#"
            INSERT INTO app.follow (follower_id, followee_id) VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(follower)
        .bind(followee)
        .execute(&deps.get_db().pg_pool)
        .await
        .to_blog_err()
        .on_constraint("follow_not_self", |_| BlogError::CantFollowYourself)
        .on_constraint("follow_followee_id_fkey", |_| BlogError::ProfileNotFound)
        .on_constraint("follow_follower_id_fkey", |_| {
            BlogError::CurrentUserDoesNotExist
        })?;

        Ok(())
    }

    pub async fn delete_follow(
        deps: &impl GetDb,
        ProfileId(follower): ProfileId,
        ProfileId(followee): ProfileId,
    ) -> BlogResult<()> {
        sqlx::query("DELETE FROM app.follow WHERE follower_id = $1 AND followee_id = $2")
            .bind(follower)
            .bind(followee)
            .execute(&deps.get_db().pg_pool)
            .await
            .to_blog_err()?;

        Ok(())
    }

    pub async fn follow_exists(
        deps: &impl GetDb,
        ProfileId(follower): ProfileId,
        ProfileId(followee): ProfileId,
    ) -> BlogResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM app.follow WHERE follower_id = $1 AND followee_id = $2
            )
            "#,
        )
        .bind(follower)
        .bind(followee)
        .fetch_one(&deps.get_db().pg_pool)
        .await
        .to_blog_err()
    }

    pub async fn list_following(
        deps: &impl GetDb,
        ProfileId(follower): ProfileId,
    ) -> BlogResult<Vec<ProfileRecord>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM app.follow f
            INNER JOIN app.profile p ON p.profile_id = f.followee_id
            INNER JOIN app.user u ON u.user_id = p.user_id
            WHERE f.follower_id = $1
            ORDER BY u.username
            "#
        ))
        .bind(follower)
        .fetch_all(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?;

        into_records(rows)
    }

    pub async fn list_followers(
        deps: &impl GetDb,
        ProfileId(followee): ProfileId,
    ) -> BlogResult<Vec<ProfileRecord>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM app.follow f
            INNER JOIN app.profile p ON p.profile_id = f.follower_id
            INNER JOIN app.user u ON u.user_id = p.user_id
            WHERE f.followee_id = $1
            ORDER BY u.username
            "#
        ))
        .bind(followee)
        .fetch_all(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?;

        into_records(rows)
    }
}
