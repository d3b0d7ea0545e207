use crate::DbResultExt;
use crate::GetDb;

use blog_domain::error::{BlogError, BlogResult};
use blog_domain::profile::repo::*;
use blog_domain::profile::ProfileId;
use blog_domain::user::UserId;

use entrait::*;
use uuid::Uuid;

pub struct PgProfileRepo;

/// Columns of a profile joined with its user, aliased `p` and `u`.
pub(crate) const PROFILE_COLUMNS: &str = r#"
    p.profile_id,
    p.user_id,
    u.username,
    u.first_name,
    u.last_name,
    u.email,
    p.profile_photo,
    p.about_me,
    p.gender,
    p.city,
    p.twitter_handle,
    p.facebook_account,
    p.github_account
"#;

#[derive(sqlx::FromRow)]
pub(crate) struct ProfileRow {
    profile_id: Uuid,
    user_id: Uuid,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    profile_photo: String,
    about_me: String,
    gender: String,
    city: String,
    twitter_handle: String,
    facebook_account: String,
    github_account: String,
}

impl TryFrom<ProfileRow> for ProfileRecord {
    type Error = BlogError;

    fn try_from(row: ProfileRow) -> BlogResult<Self> {
        Ok(Self {
            profile_id: ProfileId(row.profile_id),
            user_id: UserId(row.user_id),
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            profile_photo: row.profile_photo,
            about_me: row.about_me,
            gender: row.gender.parse()?,
            city: row.city,
            twitter_handle: row.twitter_handle,
            facebook_account: row.facebook_account,
            github_account: row.github_account,
        })
    }
}

pub(crate) fn into_records(rows: Vec<ProfileRow>) -> BlogResult<Vec<ProfileRecord>> {
    rows.into_iter().map(TryInto::try_into).collect()
}

#[entrait]
impl blog_domain::profile::repo::ProfileRepoImpl for PgProfileRepo {
    pub async fn insert_profile(
        deps: &impl GetDb,
        UserId(user_id): UserId,
    ) -> BlogResult<ProfileRecord> {
        sqlx::query_as::<_, ProfileRow>(&format!(
            // language=PostgreSQL
            r#"
            WITH inserted_profile AS (
                INSERT INTO app.profile (user_id) VALUES ($1)
                RETURNING *
            )
            SELECT {PROFILE_COLUMNS}
            FROM inserted_profile p
            INNER JOIN app.user u USING (user_id)
            "#
        ))
        .bind(user_id)
        .fetch_one(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?
        .try_into()
    }

    pub async fn find_profile_by_username(
        deps: &impl GetDb,
        username: &str,
    ) -> BlogResult<Option<ProfileRecord>> {
        sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM app.profile p
            INNER JOIN app.user u USING (user_id)
            WHERE u.username = $1
            "#
        ))
        .bind(username)
        .fetch_optional(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?
        .map(TryInto::try_into)
        .transpose()
    }

    pub async fn find_profile_by_user_id(
        deps: &impl GetDb,
        UserId(user_id): UserId,
    ) -> BlogResult<Option<ProfileRecord>> {
        sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM app.profile p
            INNER JOIN app.user u USING (user_id)
            WHERE p.user_id = $1
            "#
        ))
        .bind(user_id)
        .fetch_optional(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?
        .map(TryInto::try_into)
        .transpose()
    }

    pub async fn list_profiles(deps: &impl GetDb) -> BlogResult<Vec<ProfileRecord>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM app.profile p
            INNER JOIN app.user u USING (user_id)
            ORDER BY u.username
            "#
        ))
        .fetch_all(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?;

        into_records(rows)
    }

    pub async fn update_profile(
        deps: &impl GetDb,
        ProfileId(profile_id): ProfileId,
        up: ProfileUpdate<'_>,
    ) -> BlogResult<ProfileRecord> {
        sqlx::query_as::<_, ProfileRow>(&format!(
            // language=PostgreSQL
            r#"
            WITH updated_profile AS (
                UPDATE app.profile
                SET
                    profile_photo = COALESCE($1, profile_photo),
                    about_me = COALESCE($2, about_me),
                    gender = COALESCE($3, gender),
                    city = COALESCE($4, city),
                    twitter_handle = COALESCE($5, twitter_handle),
                    facebook_account = COALESCE($6, facebook_account),
                    github_account = COALESCE($7, github_account)
                WHERE profile_id = $8
                RETURNING *
            )
            SELECT {PROFILE_COLUMNS}
            FROM updated_profile p
            INNER JOIN app.user u USING (user_id)
            "#
        ))
        .bind(up.profile_photo)
        .bind(up.about_me)
        .bind(up.gender.map(|gender| gender.as_str()))
        .bind(up.city)
        .bind(up.twitter_handle)
        .bind(up.facebook_account)
        .bind(up.github_account)
        .bind(profile_id)
        .fetch_optional(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?
        .ok_or(BlogError::ProfileNotFound)?
        .try_into()
    }
}
