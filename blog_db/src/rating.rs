use crate::DbResultExt;
use crate::GetDb;
use crate::OnConstraint;

use blog_domain::blog::BlogId;
use blog_domain::error::{BlogError, BlogResult};
use blog_domain::rating::repo::*;
use blog_domain::user::UserId;

use entrait::*;
use uuid::Uuid;

pub struct PgRatingRepo;

#[derive(sqlx::FromRow)]
struct RatingRow {
    rating_id: Uuid,
    blog_id: Uuid,
    rated_by: String,
    value: i16,
    review: String,
    created_at: time::OffsetDateTime,
}

impl From<RatingRow> for RatingRecord {
    fn from(row: RatingRow) -> Self {
        Self {
            rating_id: row.rating_id,
            blog_id: BlogId(row.blog_id),
            rated_by: row.rated_by,
            value: row.value,
            review: row.review,
            created_at: row.created_at,
        }
    }
}

#[entrait]
impl blog_domain::rating::repo::RatingRepoImpl for PgRatingRepo {
    pub async fn has_rated(
        deps: &impl GetDb,
        BlogId(blog_id): BlogId,
        UserId(user_id): UserId,
    ) -> BlogResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM app.rating WHERE blog_id = $1 AND user_id = $2)",
        )
        .bind(blog_id)
        .bind(user_id)
        .fetch_one(&deps.get_db().pg_pool)
        .await
        .to_blog_err()
    }

    pub async fn insert_rating(
        deps: &impl GetDb,
        BlogId(blog_id): BlogId,
        UserId(user_id): UserId,
        value: i16,
        review: &str,
    ) -> BlogResult<RatingRecord> {
        let row = sqlx::query_as::<_, RatingRow>(
            // language=PostgreSQL
            r#"
            WITH inserted_rating AS (
                INSERT INTO app.rating (blog_id, user_id, value, review)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT r.rating_id, r.blog_id, u.username rated_by, r.value, r.review, r.created_at
            FROM inserted_rating r
            INNER JOIN app.user u ON u.user_id = r.user_id
            "#,
        )
        .bind(blog_id)
        .bind(user_id)
        .bind(value)
        .bind(review)
        .fetch_one(&deps.get_db().pg_pool)
        .await
        .to_blog_err()
        .on_constraint("rating_blog_user_key", |_| BlogError::AlreadyRated)?;

        Ok(row.into())
    }

    pub async fn list_ratings(
        deps: &impl GetDb,
        BlogId(blog_id): BlogId,
    ) -> BlogResult<Vec<RatingRecord>> {
        let rows = sqlx::query_as::<_, RatingRow>(
            r#"
            SELECT r.rating_id, r.blog_id, u.username rated_by, r.value, r.review, r.created_at
            FROM app.rating r
            INNER JOIN app.user u ON u.user_id = r.user_id
            WHERE r.blog_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(blog_id)
        .fetch_all(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::tests::new_blog;
    use crate::create_test_db;
    use crate::user::tests::*;

    use blog_domain::blog::repo::{BlogRepo, Filter};
    use blog_domain::iter_util::Single;

    use assert_matches::*;

    #[tokio::test]
    #[ignore]
    async fn one_rating_per_user_and_blog() -> BlogResult<()> {
        let db = create_test_db().await;
        let author = insert_test_user(&db, TestNewUser::default()).await?;
        let reader = insert_test_user(&db, other_user()).await?;
        let blog_id = db.insert_blog(new_blog(author.user_id, "slug", &[])).await?;

        assert!(!db.has_rated(blog_id, reader.user_id).await?);
        let rating = db.insert_rating(blog_id, reader.user_id, 4, "good").await?;
        assert_eq!("username2", rating.rated_by);
        assert!(db.has_rated(blog_id, reader.user_id).await?);
        assert!(!db.has_rated(blog_id, author.user_id).await?);

        assert_matches!(
            db.insert_rating(blog_id, reader.user_id, 2, "").await,
            Err(BlogError::AlreadyRated)
        );

        assert_eq!(vec![rating], db.list_ratings(blog_id).await?);

        let blog = db
            .select_blogs(Filter::default())
            .await?
            .into_iter()
            .single()?;
        assert_eq!(Some(4.0), blog.average_rating);
        assert_eq!(1, blog.num_ratings);

        Ok(())
    }
}
