use crate::error::BlogResult;
use crate::user::UserId;

use super::BlogId;

use entrait::entrait_export as entrait;

/// A blog row joined with its author and aggregates over its ratings,
/// reactions and comments.
#[derive(Clone, Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub struct BlogRecord {
    pub blog_id: BlogId,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub banner_image: Option<String>,
    pub tag_list: Vec<String>,
    pub views: i64,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
    pub author_id: UserId,
    pub author_username: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_email: String,
    pub author_about_me: String,
    pub author_profile_photo: String,
    pub author_twitter_handle: String,
    pub author_facebook_account: String,
    pub author_github_account: String,
    pub average_rating: Option<f64>,
    pub num_ratings: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub num_comments: i64,
}

/// Just enough of a blog to decide who may touch it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlogMeta {
    pub blog_id: BlogId,
    pub author_id: UserId,
}

#[derive(Default, Debug)]
pub struct Filter<'a> {
    pub slug: Option<&'a str>,
    /// Case-insensitive substring of the author's username or first name.
    pub author: Option<&'a str>,
    /// Case-insensitive substring of the title.
    pub title: Option<&'a str>,
    /// Matches blogs carrying any of these tags. Empty means no tag filtering.
    pub tags: &'a [String],
    pub favorited_by: Option<UserId>,
}

#[derive(Clone, Copy, Debug)]
pub struct NewBlog<'a> {
    pub author_id: UserId,
    pub slug: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub body: &'a str,
    pub banner_image: Option<&'a str>,
    pub tag_list: &'a [String],
}

/// `None` leaves a field unchanged.
#[derive(Clone, Copy, Default, Debug)]
pub struct BlogUpdate<'a> {
    pub slug: Option<&'a str>,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub body: Option<&'a str>,
    /// `Some(None)` removes the banner image.
    pub banner_image: Option<Option<&'a str>>,
    pub tag_list: Option<&'a [String]>,
}

#[entrait(BlogRepoImpl, delegate_by = DelegateBlogRepo, mock_api=BlogRepoMock)]
pub trait BlogRepo {
    /// Newest first.
    async fn select_blogs(&self, filter: Filter<'_>) -> BlogResult<Vec<BlogRecord>>;

    async fn find_blog_meta(&self, slug: &str) -> BlogResult<Option<BlogMeta>>;

    /// Fails with `DuplicateBlogSlug` when the slug is taken.
    async fn insert_blog(&self, new_blog: NewBlog<'_>) -> BlogResult<BlogId>;

    /// Fails with `DuplicateBlogSlug` when the new slug is taken by another blog.
    async fn update_blog(&self, blog_id: BlogId, update: BlogUpdate<'_>) -> BlogResult<()>;

    async fn delete_blog(&self, blog_id: BlogId) -> BlogResult<()>;

    /// Count a view from `ip`, unless that address has already viewed the blog.
    /// Returns whether the view was counted.
    async fn record_view(&self, blog_id: BlogId, ip: &str) -> BlogResult<bool>;
}
