use blog_domain::error::{BlogError, BlogResult};

use anyhow::Context;
use sqlx::error::DatabaseError;
use sqlx::PgPool;

pub mod blog;
pub mod comment;
pub mod favorite;
pub mod follow;
pub mod profile;
pub mod rating;
pub mod reaction;
pub mod user;

#[cfg(any(test, feature = "memory"))]
pub mod memory;

#[derive(Clone)]
pub struct Db {
    pub pg_pool: PgPool,
}

impl Db {
    pub async fn init(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pg_pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .context("could not connect to database_url")?;

        sqlx::migrate!("../migrations").run(&pg_pool).await?;
        tracing::info!(max_connections, "database ready");

        Ok(Db { pg_pool })
    }
}

pub trait GetDb {
    fn get_db(&self) -> &Db;
}

impl GetDb for Db {
    fn get_db(&self) -> &Db {
        self
    }
}

impl<T: GetDb> GetDb for entrait::Impl<T> {
    fn get_db(&self) -> &Db {
        (**self).get_db()
    }
}

trait DbResultExt<T> {
    fn to_blog_err(self) -> BlogResult<T>;
}

impl<T> DbResultExt<T> for Result<T, sqlx::Error> {
    fn to_blog_err(self) -> BlogResult<T> {
        self.map_err(|e| BlogError::Anyhow(e.into()))
    }
}

trait OnConstraint<T> {
    fn on_constraint(
        self,
        name: &str,
        map_err: impl FnOnce(Box<dyn DatabaseError>) -> BlogError,
    ) -> BlogResult<T>;
}

impl<T> OnConstraint<T> for BlogResult<T> {
    fn on_constraint(
        self,
        name: &str,
        map_err: impl FnOnce(Box<dyn DatabaseError>) -> BlogError,
    ) -> BlogResult<T> {
        self.map_err(|e| match e {
            BlogError::Anyhow(e) => match e.downcast::<sqlx::Error>() {
                Ok(sqlx::Error::Database(dbe)) if dbe.constraint() == Some(name) => map_err(dbe),
                Ok(e) => BlogError::Anyhow(e.into()),
                Err(e) => BlogError::Anyhow(e),
            },
            e => e,
        })
    }
}

#[cfg(test)]
mod test_delegation {
    use super::*;
    use blog_domain::blog::repo::DelegateBlogRepo;
    use blog_domain::comment::repo::DelegateCommentRepo;
    use blog_domain::favorite::repo::DelegateFavoriteRepo;
    use blog_domain::profile::repo::DelegateProfileRepo;
    use blog_domain::rating::repo::DelegateRatingRepo;
    use blog_domain::reaction::repo::DelegateReactionRepo;
    use blog_domain::social_graph::DelegateFollowRepo;
    use blog_domain::user::repo::DelegateUserRepo;

    impl DelegateUserRepo<Self> for Db {
        type Target = user::PgUserRepo;
    }

    impl DelegateProfileRepo<Self> for Db {
        type Target = profile::PgProfileRepo;
    }

    impl DelegateFollowRepo<Self> for Db {
        type Target = follow::PgFollowRepo;
    }

    impl DelegateBlogRepo<Self> for Db {
        type Target = blog::PgBlogRepo;
    }

    impl DelegateCommentRepo<Self> for Db {
        type Target = comment::PgCommentRepo;
    }

    impl DelegateRatingRepo<Self> for Db {
        type Target = rating::PgRatingRepo;
    }

    impl DelegateReactionRepo<Self> for Db {
        type Target = reaction::PgReactionRepo;
    }

    impl DelegateFavoriteRepo<Self> for Db {
        type Target = favorite::PgFavoriteRepo;
    }
}

#[cfg(test)]
async fn create_test_db() -> entrait::Impl<Db> {
    use sha2::Digest;
    use sqlx::Connection;

    let mut hasher = sha2::Sha256::new();
    hasher.update(std::thread::current().name().unwrap().as_bytes());
    let thread_hash = hex::encode(hasher.finalize());
    let db_name = &thread_hash[0..24];

    let mut url = database_server_url();
    let mut connection = sqlx::PgConnection::connect(url.as_str()).await.unwrap();

    sqlx::query(&format!(r#"DROP DATABASE IF EXISTS "{}""#, db_name))
        .execute(&mut connection)
        .await
        .expect("failed to drop");

    sqlx::query(&format!(r#"CREATE DATABASE "{}""#, db_name))
        .execute(&mut connection)
        .await
        .expect("failed creating test database");

    url.set_path(db_name);

    let pg_pool = sqlx::PgPool::connect(url.as_str())
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("../migrations")
        .run(&pg_pool)
        .await
        .expect("Failed to migrate");

    entrait::Impl::new(Db { pg_pool })
}

#[cfg(test)]
fn database_server_url() -> url::Url {
    // (re)load the .env file
    dotenv::dotenv().ok();

    let mut url: url::Url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set")
        .parse()
        .expect("malformed DATABASE_URL");

    if let Ok(mut path) = url.path_segments_mut() {
        path.clear();
    }

    url
}
