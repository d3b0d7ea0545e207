use crate::DbResultExt;
use crate::GetDb;
use crate::OnConstraint;

use blog_domain::blog::repo::*;
use blog_domain::blog::BlogId;
use blog_domain::error::{BlogError, BlogResult};
use blog_domain::user::UserId;

use entrait::*;
use uuid::Uuid;

pub struct PgBlogRepo;

#[derive(sqlx::FromRow)]
struct BlogRow {
    blog_id: Uuid,
    slug: String,
    title: String,
    description: String,
    body: String,
    banner_image: Option<String>,
    tag_list: Vec<String>,
    views: i64,
    created_at: time::OffsetDateTime,
    updated_at: time::OffsetDateTime,
    author_id: Uuid,
    author_username: String,
    author_first_name: String,
    author_last_name: String,
    author_email: String,
    author_about_me: String,
    author_profile_photo: String,
    author_twitter_handle: String,
    author_facebook_account: String,
    author_github_account: String,
    average_rating: Option<f64>,
    num_ratings: i64,
    likes: i64,
    dislikes: i64,
    num_comments: i64,
}

impl From<BlogRow> for BlogRecord {
    fn from(row: BlogRow) -> Self {
        Self {
            blog_id: BlogId(row.blog_id),
            slug: row.slug,
            title: row.title,
            description: row.description,
            body: row.body,
            banner_image: row.banner_image,
            tag_list: row.tag_list,
            views: row.views,
            created_at: row.created_at,
            updated_at: row.updated_at,
            author_id: UserId(row.author_id),
            author_username: row.author_username,
            author_first_name: row.author_first_name,
            author_last_name: row.author_last_name,
            author_email: row.author_email,
            author_about_me: row.author_about_me,
            author_profile_photo: row.author_profile_photo,
            author_twitter_handle: row.author_twitter_handle,
            author_facebook_account: row.author_facebook_account,
            author_github_account: row.author_github_account,
            average_rating: row.average_rating,
            num_ratings: row.num_ratings,
            likes: row.likes,
            dislikes: row.dislikes,
            num_comments: row.num_comments,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BlogMetaRow {
    blog_id: Uuid,
    author_id: Uuid,
}

#[entrait]
impl blog_domain::blog::repo::BlogRepoImpl for PgBlogRepo {
    pub async fn select_blogs(deps: &impl GetDb, filter: Filter<'_>) -> BlogResult<Vec<BlogRecord>> {
        let rows = sqlx::query_as::<_, BlogRow>(
            // language=PostgreSQL
            r#"
            SELECT
                blog.blog_id,
                blog.slug,
                blog.title,
                blog.description,
                blog.body,
                blog.banner_image,
                blog.tag_list,
                (SELECT count(*) FROM app.blog_view v WHERE v.blog_id = blog.blog_id) views,
                blog.created_at,
                blog.updated_at,
                author.user_id author_id,
                author.username author_username,
                author.first_name author_first_name,
                author.last_name author_last_name,
                author.email author_email,
                COALESCE(profile.about_me, '') author_about_me,
                COALESCE(profile.profile_photo, '') author_profile_photo,
                COALESCE(profile.twitter_handle, '') author_twitter_handle,
                COALESCE(profile.facebook_account, '') author_facebook_account,
                COALESCE(profile.github_account, '') author_github_account,
                (SELECT avg(r.value)::float8 FROM app.rating r WHERE r.blog_id = blog.blog_id) average_rating,
                (SELECT count(*) FROM app.rating r WHERE r.blog_id = blog.blog_id) num_ratings,
                (SELECT count(*) FROM app.reaction x WHERE x.blog_id = blog.blog_id AND x.value = 1) likes,
                (SELECT count(*) FROM app.reaction x WHERE x.blog_id = blog.blog_id AND x.value = -1) dislikes,
                (SELECT count(*) FROM app.comment c WHERE c.blog_id = blog.blog_id) num_comments
            FROM app.blog
            INNER JOIN app.user author ON author.user_id = blog.author_id
            LEFT JOIN app.profile profile ON profile.user_id = author.user_id
            WHERE (
                $1::text IS NULL OR blog.slug = $1
            ) AND (
                $2::text IS NULL
                OR strpos(lower(author.username), lower($2)) > 0
                OR strpos(lower(author.first_name), lower($2)) > 0
            ) AND (
                $3::text IS NULL OR strpos(lower(blog.title), lower($3)) > 0
            ) AND (
                cardinality($4::text[]) = 0 OR blog.tag_list && $4
            ) AND (
                $5::uuid IS NULL OR EXISTS(
                    SELECT 1 FROM app.favorite fav
                    WHERE fav.blog_id = blog.blog_id AND fav.user_id = $5
                )
            )
            ORDER BY blog.created_at DESC
            "#,
        )
        .bind(filter.slug)
        .bind(filter.author)
        .bind(filter.title)
        .bind(filter.tags)
        .bind(filter.favorited_by.map(|UserId(id)| id))
        .fetch_all(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn find_blog_meta(deps: &impl GetDb, slug: &str) -> BlogResult<Option<BlogMeta>> {
        let row = sqlx::query_as::<_, BlogMetaRow>(
            "SELECT blog_id, author_id FROM app.blog WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?;

        Ok(row.map(|row| BlogMeta {
            blog_id: BlogId(row.blog_id),
            author_id: UserId(row.author_id),
        }))
    }

    pub async fn insert_blog(deps: &impl GetDb, new_blog: NewBlog<'_>) -> BlogResult<BlogId> {
        let blog_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO app.blog (author_id, slug, title, description, body, banner_image, tag_list)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING blog_id
            "#,
        )
        .bind(new_blog.author_id.0)
        .bind(new_blog.slug)
        .bind(new_blog.title)
        .bind(new_blog.description)
        .bind(new_blog.body)
        .bind(new_blog.banner_image)
        .bind(new_blog.tag_list)
        .fetch_one(&deps.get_db().pg_pool)
        .await
        .to_blog_err()
        .on_constraint("blog_slug_key", |_| {
            BlogError::DuplicateBlogSlug(new_blog.slug.to_string())
        })?;

        Ok(BlogId(blog_id))
    }

    pub async fn update_blog(
        deps: &impl GetDb,
        BlogId(blog_id): BlogId,
        up: BlogUpdate<'_>,
    ) -> BlogResult<()> {
        let result = sqlx::query(
            // language=PostgreSQL
            r#"
            UPDATE app.blog
            SET
                slug = COALESCE($1, slug),
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                body = COALESCE($4, body),
                banner_image = CASE WHEN $5 THEN $6 ELSE banner_image END,
                tag_list = COALESCE($7, tag_list),
                updated_at = now()
            WHERE blog_id = $8
            "#,
        )
        .bind(up.slug)
        .bind(up.title)
        .bind(up.description)
        .bind(up.body)
        .bind(up.banner_image.is_some())
        .bind(up.banner_image.flatten())
        .bind(up.tag_list)
        .bind(blog_id)
        .execute(&deps.get_db().pg_pool)
        .await
        .to_blog_err()
        .on_constraint("blog_slug_key", |_| {
            BlogError::DuplicateBlogSlug(up.slug.unwrap_or_default().to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(BlogError::BlogNotFound);
        }
        Ok(())
    }

    pub async fn delete_blog(deps: &impl GetDb, BlogId(blog_id): BlogId) -> BlogResult<()> {
        let result = sqlx::query("DELETE FROM app.blog WHERE blog_id = $1")
            .bind(blog_id)
            .execute(&deps.get_db().pg_pool)
            .await
            .to_blog_err()?;

        if result.rows_affected() == 0 {
            return Err(BlogError::BlogNotFound);
        }
        Ok(())
    }

    pub async fn record_view(deps: &impl GetDb, BlogId(blog_id): BlogId, ip: &str) -> BlogResult<bool> {
        let result = sqlx::query(
            "INSERT INTO app.blog_view (blog_id, ip) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(blog_id)
        .bind(ip)
        .execute(&deps.get_db().pg_pool)
        .await
        .to_blog_err()?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::create_test_db;
    use crate::user::tests::*;

    use blog_domain::iter_util::Single;
    use blog_domain::user::repo::UserRepo;

    use assert_matches::*;

    pub fn new_blog<'a>(author_id: UserId, slug: &'a str, tags: &'a [String]) -> NewBlog<'a> {
        NewBlog {
            author_id,
            slug,
            title: slug,
            description: "desc",
            body: "some body text",
            banner_image: None,
            tag_list: tags,
        }
    }

    async fn select_single_slug_or_none(
        db: &impl BlogRepo,
        filter: Filter<'_>,
    ) -> BlogResult<Option<String>> {
        Ok(db
            .select_blogs(filter)
            .await?
            .into_iter()
            .single_or_none()?
            .map(|blog| blog.slug))
    }

    #[tokio::test]
    #[ignore]
    async fn blog_lifecycle_should_work() -> BlogResult<()> {
        let db = create_test_db().await;
        let user = insert_test_user(&db, TestNewUser::default()).await?;

        let blog_id = db
            .insert_blog(new_blog(user.user_id, "slug", &["tag".to_string()]))
            .await?;
        let meta = db.find_blog_meta("slug").await?.unwrap();
        assert_eq!(blog_id, meta.blog_id);
        assert_eq!(user.user_id, meta.author_id);

        db.update_blog(
            blog_id,
            BlogUpdate {
                slug: Some("slug2"),
                title: Some("title2"),
                banner_image: Some(Some("banner.png")),
                ..Default::default()
            },
        )
        .await?;

        let blog = db
            .select_blogs(Filter {
                slug: Some("slug2"),
                ..Default::default()
            })
            .await?
            .into_iter()
            .single()?;
        assert_eq!("title2", blog.title);
        assert_eq!("desc", blog.description);
        assert_eq!(Some("banner.png".to_string()), blog.banner_image);
        assert_eq!(None, blog.average_rating);
        assert_eq!(0, blog.views);

        db.update_blog(
            blog_id,
            BlogUpdate {
                body: Some("other body"),
                ..Default::default()
            },
        )
        .await?;
        let blog = db
            .select_blogs(Filter {
                slug: Some("slug2"),
                ..Default::default()
            })
            .await?
            .into_iter()
            .single()?;
        assert_eq!(Some("banner.png".to_string()), blog.banner_image);

        db.update_blog(
            blog_id,
            BlogUpdate {
                banner_image: Some(None),
                ..Default::default()
            },
        )
        .await?;
        let blog = db
            .select_blogs(Filter {
                slug: Some("slug2"),
                ..Default::default()
            })
            .await?
            .into_iter()
            .single()?;
        assert_eq!(None, blog.banner_image);

        db.delete_blog(blog_id).await?;
        assert_eq!(None, db.find_blog_meta("slug2").await?);
        assert_matches!(db.delete_blog(blog_id).await, Err(BlogError::BlogNotFound));

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn duplicate_slug_is_refused() -> BlogResult<()> {
        let db = create_test_db().await;
        let user = insert_test_user(&db, TestNewUser::default()).await?;

        db.insert_blog(new_blog(user.user_id, "slug", &[])).await?;
        assert_matches!(
            db.insert_blog(new_blog(user.user_id, "slug", &[])).await,
            Err(BlogError::DuplicateBlogSlug(slug)) if slug == "slug"
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn views_are_counted_once_per_address() -> BlogResult<()> {
        let db = create_test_db().await;
        let user = insert_test_user(&db, TestNewUser::default()).await?;
        let blog_id = db.insert_blog(new_blog(user.user_id, "slug", &[])).await?;

        assert!(db.record_view(blog_id, "10.0.0.1").await?);
        assert!(!db.record_view(blog_id, "10.0.0.1").await?);
        assert!(db.record_view(blog_id, "10.0.0.2").await?);

        let blog = db
            .select_blogs(Filter::default())
            .await?
            .into_iter()
            .single()?;
        assert_eq!(2, blog.views);

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn should_filter_blogs() -> BlogResult<()> {
        let db = create_test_db().await;
        let user1 = insert_test_user(&db, TestNewUser::default()).await?;
        let user2 = insert_test_user(&db, other_user()).await?;

        db.insert_blog(new_blog(user1.user_id, "rust-rocks", &["rust".to_string()]))
            .await?;
        db.insert_blog(new_blog(user2.user_id, "on-gardens", &["garden".to_string()]))
            .await?;

        assert_eq!(
            Some("rust-rocks".to_string()),
            select_single_slug_or_none(
                &db,
                Filter {
                    title: Some("ROCKS"),
                    ..Default::default()
                }
            )
            .await?
        );

        assert_eq!(
            Some("on-gardens".to_string()),
            select_single_slug_or_none(
                &db,
                Filter {
                    author: Some("username2"),
                    ..Default::default()
                }
            )
            .await?
        );

        assert_eq!(
            Some("rust-rocks".to_string()),
            select_single_slug_or_none(
                &db,
                Filter {
                    tags: &["rust".to_string(), "zig".to_string()],
                    ..Default::default()
                }
            )
            .await?
        );

        assert_eq!(
            None,
            select_single_slug_or_none(
                &db,
                Filter {
                    favorited_by: Some(user1.user_id),
                    ..Default::default()
                }
            )
            .await?
        );

        db.delete_user(user2.user_id).await?;
        assert_eq!(1, db.select_blogs(Filter::default()).await?.len());

        Ok(())
    }
}
