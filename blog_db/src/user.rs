use crate::DbResultExt;
use crate::GetDb;
use crate::OnConstraint;

use blog_domain::error::{BlogError, BlogResult};
use blog_domain::user::repo::*;
use blog_domain::user::UserId;

use entrait::*;
use uuid::Uuid;

pub struct PgUserRepo;

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    date_joined: time::OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: UserId(row.user_id),
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            date_joined: row.date_joined,
        }
    }
}

#[entrait]
impl blog_domain::user::repo::UserRepoImpl for PgUserRepo {
    pub async fn insert_user(deps: &impl GetDb, new_user: NewUser<'_>) -> BlogResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            // language=PostgreSQL
            r#"
            INSERT INTO app.user (username, email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING user_id, username, email, first_name, last_name, date_joined
            "#,
        )
        .bind(new_user.username)
        .bind(new_user.email)
        .bind(new_user.first_name)
        .bind(new_user.last_name)
        .bind(new_user.password_hash.0)
        .fetch_one(&deps.get_db().pg_pool)
        .await
        .to_blog_err()
        .on_constraint("user_username_key", |_| BlogError::UsernameTaken)
        .on_constraint("user_email_key", |_| BlogError::EmailTaken)?;

        Ok(row.into())
    }

    pub async fn find_user_by_username(
        deps: &impl GetDb,
        username: &str,
    ) -> BlogResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT user_id, username, email, first_name, last_name, date_joined FROM app.user WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?;

        Ok(row.map(Into::into))
    }

    pub async fn delete_user(deps: &impl GetDb, UserId(user_id): UserId) -> BlogResult<()> {
        // profile, follows, blogs and everything hanging off them go by cascade
        let result = sqlx::query("DELETE FROM app.user WHERE user_id = $1")
            .bind(user_id)
            .execute(&deps.get_db().pg_pool)
            .await
            .to_blog_err()?;

        if result.rows_affected() == 0 {
            return Err(BlogError::UserNotFound);
        }
        Ok(())
    }
}
