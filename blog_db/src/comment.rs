use crate::DbResultExt;
use crate::GetDb;

use blog_domain::blog::BlogId;
use blog_domain::comment::repo::*;
use blog_domain::comment::CommentId;
use blog_domain::error::{BlogError, BlogResult};
use blog_domain::user::UserId;

use entrait::*;
use uuid::Uuid;

pub struct PgCommentRepo;

#[derive(sqlx::FromRow)]
struct CommentRow {
    comment_id: Uuid,
    blog_id: Uuid,
    author_id: Uuid,
    author_username: String,
    body: String,
    created_at: time::OffsetDateTime,
    updated_at: time::OffsetDateTime,
}

impl From<CommentRow> for CommentRecord {
    fn from(row: CommentRow) -> Self {
        Self {
            comment_id: CommentId(row.comment_id),
            blog_id: BlogId(row.blog_id),
            author_id: UserId(row.author_id),
            author_username: row.author_username,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COMMENT_COLUMNS: &str = r#"
    c.comment_id,
    c.blog_id,
    c.author_id,
    u.username author_username,
    c.body,
    c.created_at,
    c.updated_at
"#;

#[entrait]
impl blog_domain::comment::repo::CommentRepoImpl for PgCommentRepo {
    pub async fn list_comments(
        deps: &impl GetDb,
        BlogId(blog_id): BlogId,
    ) -> BlogResult<Vec<CommentRecord>> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM app.comment c
            INNER JOIN app.user u ON u.user_id = c.author_id
            WHERE c.blog_id = $1
            ORDER BY c.created_at
            "#
        ))
        .bind(blog_id)
        .fetch_all(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn find_comment(
        deps: &impl GetDb,
        CommentId(comment_id): CommentId,
    ) -> BlogResult<Option<CommentRecord>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM app.comment c
            INNER JOIN app.user u ON u.user_id = c.author_id
            WHERE c.comment_id = $1
            "#
        ))
        .bind(comment_id)
        .fetch_optional(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?;

        Ok(row.map(Into::into))
    }

    pub async fn insert_comment(
        deps: &impl GetDb,
        BlogId(blog_id): BlogId,
        UserId(author_id): UserId,
        body: &str,
    ) -> BlogResult<CommentRecord> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            // language=PostgreSQL
            r#"
            WITH inserted_comment AS (
                INSERT INTO app.comment (blog_id, author_id, body)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS}
            FROM inserted_comment c
            INNER JOIN app.user u ON u.user_id = c.author_id
            "#
        ))
        .bind(blog_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?;

        Ok(row.into())
    }

    pub async fn update_comment(
        deps: &impl GetDb,
        CommentId(comment_id): CommentId,
        body: &str,
    ) -> BlogResult<CommentRecord> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            WITH updated_comment AS (
                UPDATE app.comment SET body = $1, updated_at = now()
                WHERE comment_id = $2
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS}
            FROM updated_comment c
            INNER JOIN app.user u ON u.user_id = c.author_id
            "#
        ))
        .bind(body)
        .bind(comment_id)
        .fetch_optional(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?
        .ok_or(BlogError::CommentNotFound)?;

        Ok(row.into())
    }

    pub async fn delete_comment(
        deps: &impl GetDb,
        CommentId(comment_id): CommentId,
    ) -> BlogResult<()> {
        let result = sqlx::query("DELETE FROM app.comment WHERE comment_id = $1")
            .bind(comment_id)
            .execute(&deps.get_db().pg_pool)
            .await
            .to_blog_err()?;

        if result.rows_affected() == 0 {
            return Err(BlogError::CommentNotFound);
        }
        Ok(())
    }
}
