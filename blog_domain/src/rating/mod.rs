pub mod repo;

use crate::blog::{find_blog, repo::BlogRepo};
use crate::error::*;
use crate::user::auth::{Actor, Authenticate};
use repo::{RatingRecord, RatingRepo};

use entrait::entrait_export as entrait;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct NewRating {
    pub value: i16,
    #[serde(default)]
    pub review: String,
}

#[derive(serde::Serialize, Clone, Debug)]
pub struct Rating {
    pub id: uuid::Uuid,
    pub rated_by: String,
    pub value: i16,
    pub label: &'static str,
    pub review: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

impl From<RatingRecord> for Rating {
    fn from(record: RatingRecord) -> Self {
        Self {
            id: record.rating_id,
            rated_by: record.rated_by,
            label: label(record.value),
            value: record.value,
            review: record.review,
            created_at: record.created_at,
        }
    }
}

fn label(value: i16) -> &'static str {
    match value {
        1 => "poor",
        2 => "fair",
        3 => "good",
        4 => "very good",
        5 => "excellent",
        _ => "",
    }
}

#[entrait(pub RatingApi, mock_api=RatingApiMock)]
pub mod api {
    use super::*;

    pub async fn rate_blog(
        deps: &(impl Authenticate + BlogRepo + RatingRepo),
        actor: Actor,
        slug: &str,
        rating: NewRating,
    ) -> BlogResult<Rating> {
        let current_user_id = deps.authenticate(actor).await?;
        let blog = find_blog(deps, slug).await?;

        if blog.author_id == current_user_id {
            return Err(BlogError::CantRateYourBlog);
        }
        if deps.has_rated(blog.blog_id, current_user_id).await? {
            return Err(BlogError::AlreadyRated);
        }
        if rating.value == 0 {
            return Err(BlogError::ZeroRating);
        }
        if !(MIN_RATING..=MAX_RATING).contains(&rating.value) {
            return Err(BlogError::invalid(
                "value",
                format!("The rating must be between {MIN_RATING} and {MAX_RATING}"),
            ));
        }

        let rating = deps
            .insert_rating(
                blog.blog_id,
                current_user_id,
                rating.value,
                rating.review.trim(),
            )
            .await?;
        tracing::info!(%slug, value = rating.value, "blog rated");

        Ok(rating.into())
    }

    pub async fn list_ratings(
        deps: &(impl Authenticate + BlogRepo + RatingRepo),
        actor: Actor,
        slug: &str,
    ) -> BlogResult<Vec<Rating>> {
        deps.authenticate(actor).await?;
        let blog = find_blog(deps, slug).await?;

        deps.list_ratings(blog.blog_id)
            .await
            .map(|ratings| ratings.into_iter().map(Into::into).collect())
    }
}
