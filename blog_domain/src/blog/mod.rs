pub mod repo;

use crate::error::*;
use crate::iter_util::Single;
use crate::read_time::{estimate_read_time, PostContent, ReadTime};
use crate::user::auth::{Actor, Authenticate};
use crate::user::{full_name, UserId};
use repo::BlogRepo;

use entrait::entrait_export as entrait;
use itertools::Itertools;
use std::fmt;
use uuid::Uuid;

#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct BlogId(pub Uuid);

impl fmt::Display for BlogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(serde::Serialize, Clone, Debug)]
pub struct Blog {
    id: BlogId,
    title: String,
    slug: String,
    #[serde(rename = "tagList")]
    tag_list: Vec<String>,
    description: String,
    body: String,
    banner_image: Option<String>,
    // Absent for posts without a single word.
    #[serde(skip_serializing_if = "Option::is_none")]
    read_time: Option<ReadTime>,
    author_info: AuthorInfo,
    likes: i64,
    dislikes: i64,
    num_ratings: i64,
    average_rating: f64,
    views: i64,
    num_comments: i64,
    #[serde(with = "time::serde::rfc3339")]
    created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: time::OffsetDateTime,
}

#[derive(serde::Serialize, Clone, Debug)]
pub struct AuthorInfo {
    username: String,
    fullname: String,
    about_me: String,
    profile_photo: String,
    email: String,
    twitter_handle: String,
    facebook_account: String,
    github_account: String,
}

impl From<repo::BlogRecord> for Blog {
    fn from(record: repo::BlogRecord) -> Self {
        let read_time = estimate_read_time(&PostContent {
            title: &record.title,
            body: &record.body,
            description: &record.description,
            tags: &record.tag_list,
            has_banner_image: record.banner_image.as_deref().and_then(non_blank).is_some(),
        });

        Self {
            id: record.blog_id,
            title: record.title,
            slug: record.slug,
            tag_list: record.tag_list,
            description: record.description,
            body: record.body,
            banner_image: record.banner_image,
            read_time,
            author_info: AuthorInfo {
                fullname: full_name(&record.author_first_name, &record.author_last_name),
                username: record.author_username,
                about_me: record.author_about_me,
                profile_photo: record.author_profile_photo,
                email: record.author_email,
                twitter_handle: record.author_twitter_handle,
                facebook_account: record.author_facebook_account,
                github_account: record.author_github_account,
            },
            likes: record.likes,
            dislikes: record.dislikes,
            num_ratings: record.num_ratings,
            average_rating: record
                .average_rating
                .map(|average| (average * 10.0).round() / 10.0)
                .unwrap_or(0.0),
            views: record.views,
            num_comments: record.num_comments,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(serde::Deserialize)]
pub struct BlogCreate {
    pub title: String,
    pub description: String,
    pub body: String,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(serde::Deserialize, Default)]
#[serde(default)]
pub struct BlogUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    /// An empty string removes the banner image.
    pub banner_image: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(serde::Deserialize, Default, Eq, PartialEq)]
#[serde(default)]
pub struct ListBlogsQuery {
    pub author: Option<String>,
    pub title: Option<String>,
    /// Comma separated, spaces are ignored.
    pub tags: Option<String>,
}

const MAX_TITLE_LENGTH: usize = 250;
const MAX_DESCRIPTION_LENGTH: usize = 255;
const MAX_SLUG_SUFFIX: usize = 100;

#[entrait(pub BlogApi, mock_api=BlogApiMock)]
pub mod api {
    use super::*;

    pub async fn list_blogs(
        deps: &(impl Authenticate + BlogRepo),
        actor: Actor,
        query: ListBlogsQuery,
    ) -> BlogResult<Vec<Blog>> {
        deps.authenticate(actor).await?;

        let tags = query.tags.as_deref().map(parse_tags).unwrap_or_default();
        deps.select_blogs(repo::Filter {
            slug: None,
            author: query.author.as_deref(),
            title: query.title.as_deref(),
            tags: &tags,
            favorited_by: None,
        })
        .await
        .map(|blogs| blogs.into_iter().map(Into::into).collect())
    }

    pub async fn fetch_blog(
        deps: &(impl Authenticate + BlogRepo),
        actor: Actor,
        slug: &str,
        viewer_ip: &str,
    ) -> BlogResult<Blog> {
        deps.authenticate(actor).await?;
        let blog = find_blog(deps, slug).await?;

        if deps.record_view(blog.blog_id, viewer_ip).await? {
            tracing::debug!(%slug, %viewer_ip, "new blog view");
        }

        get_single_blog(deps, slug).await
    }

    pub async fn create_blog(
        deps: &(impl Authenticate + BlogRepo),
        actor: Actor,
        blog: BlogCreate,
    ) -> BlogResult<Blog> {
        let current_user_id = deps.authenticate(actor).await?;

        let base_slug = validate_title(&blog.title)?;
        validate_description(&blog.description)?;
        let tags = normalize_tags(&blog.tags);

        let new_blog = repo::NewBlog {
            author_id: current_user_id,
            slug: &base_slug,
            title: blog.title.trim(),
            description: &blog.description,
            body: &blog.body,
            banner_image: blog.banner_image.as_deref().and_then(non_blank),
            tag_list: &tags,
        };

        for slug in slug_candidates(&base_slug) {
            match deps
                .insert_blog(repo::NewBlog {
                    slug: &slug,
                    ..new_blog
                })
                .await
            {
                Ok(_) => {
                    tracing::info!(%slug, author = %current_user_id.0, "blog created");
                    return get_single_blog(deps, &slug).await;
                }
                Err(BlogError::DuplicateBlogSlug(_)) => continue,
                Err(err) => return Err(err),
            }
        }

        Err(BlogError::DuplicateBlogSlug(base_slug))
    }

    pub async fn update_blog(
        deps: &(impl Authenticate + BlogRepo),
        actor: Actor,
        slug: &str,
        blog_update: BlogUpdate,
    ) -> BlogResult<Blog> {
        let current_user_id = deps.authenticate(actor).await?;
        let blog = owned_blog(deps, current_user_id, slug).await?;

        let new_slug = blog_update.title.as_deref().map(validate_title).transpose()?;
        if let Some(description) = &blog_update.description {
            validate_description(description)?;
        }
        let tags = blog_update.tags.as_deref().map(normalize_tags);

        let update = repo::BlogUpdate {
            slug: None,
            title: blog_update.title.as_deref().map(str::trim),
            description: blog_update.description.as_deref(),
            body: blog_update.body.as_deref(),
            banner_image: blog_update.banner_image.as_deref().map(non_blank),
            tag_list: tags.as_deref(),
        };

        let Some(base_slug) = new_slug else {
            deps.update_blog(blog.blog_id, update).await?;
            return get_single_blog(deps, slug).await;
        };

        for new_slug in slug_candidates(&base_slug) {
            match deps
                .update_blog(
                    blog.blog_id,
                    repo::BlogUpdate {
                        slug: Some(&new_slug),
                        ..update
                    },
                )
                .await
            {
                Ok(()) => return get_single_blog(deps, &new_slug).await,
                Err(BlogError::DuplicateBlogSlug(_)) => continue,
                Err(err) => return Err(err),
            }
        }

        Err(BlogError::DuplicateBlogSlug(base_slug))
    }

    pub async fn delete_blog(
        deps: &(impl Authenticate + BlogRepo),
        actor: Actor,
        slug: &str,
    ) -> BlogResult<()> {
        let current_user_id = deps.authenticate(actor).await?;
        let blog = owned_blog(deps, current_user_id, slug).await?;

        deps.delete_blog(blog.blog_id).await?;
        tracing::info!(%slug, "blog deleted");
        Ok(())
    }

    async fn owned_blog(
        deps: &impl BlogRepo,
        current_user_id: UserId,
        slug: &str,
    ) -> BlogResult<repo::BlogMeta> {
        let blog = find_blog(deps, slug).await?;
        if blog.author_id != current_user_id {
            return Err(BlogError::NotYourBlog);
        }
        Ok(blog)
    }

    /// Returns the slug the title produces.
    fn validate_title(title: &str) -> BlogResult<String> {
        let title = title.trim();
        if title.is_empty() || title.chars().count() > MAX_TITLE_LENGTH {
            return Err(BlogError::invalid(
                "title",
                format!("A title is required and can't exceed {MAX_TITLE_LENGTH} characters"),
            ));
        }
        let slug = slugify(title);
        if slug.is_empty() {
            return Err(BlogError::invalid(
                "title",
                "The title must contain at least one letter or digit",
            ));
        }
        Ok(slug)
    }

    fn validate_description(description: &str) -> BlogResult<()> {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(BlogError::invalid(
                "description",
                format!("Ensure this field has no more than {MAX_DESCRIPTION_LENGTH} characters"),
            ));
        }
        Ok(())
    }
}

/// Fetch a blog by slug, fully populated.
pub(crate) async fn get_single_blog(deps: &impl BlogRepo, slug: &str) -> BlogResult<Blog> {
    deps.select_blogs(repo::Filter {
        slug: Some(slug),
        ..Default::default()
    })
    .await?
    .into_iter()
    .single_or_none()?
    .map(Into::into)
    .ok_or(BlogError::BlogNotFound)
}

pub(crate) async fn find_blog(deps: &impl BlogRepo, slug: &str) -> BlogResult<repo::BlogMeta> {
    deps.find_blog_meta(slug)
        .await?
        .ok_or(BlogError::BlogNotFound)
}

/// `hello`, `hello-2`, `hello-3`, ...
fn slug_candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string())
        .chain((2..=MAX_SLUG_SUFFIX).map(move |n| format!("{base}-{n}")))
}

fn non_blank(image: &str) -> Option<&str> {
    let image = image.trim();
    (!image.is_empty()).then_some(image)
}

fn parse_tags(tags: &str) -> Vec<String> {
    tags.replace(' ', "")
        .split(',')
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .unique()
        .collect()
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .unique()
        .map(str::to_string)
        .collect()
}

fn slugify(string: &str) -> String {
    const QUOTE_CHARS: &[char] = &['\'', '"'];

    string
        // Split on anything that isn't a word character or quotation mark.
        // This has the effect of keeping contractions and possessives together.
        .split(|c: char| !(QUOTE_CHARS.contains(&c) || c.is_alphanumeric()))
        // If multiple non-word characters follow each other then we'll get empty substrings
        // so we'll filter those out.
        .filter(|s| !s.is_empty())
        .map(|s| {
            let mut s = s.replace(QUOTE_CHARS, "");
            s.make_ascii_lowercase();
            s
        })
        .filter(|s| !s.is_empty())
        .join("-")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::api::*;
    use super::repo::BlogRepoMock;
    use super::*;
    use crate::user::auth::authenticate::AuthenticateMock;

    use assert_matches::*;
    use unimock::*;

    pub const AUTHOR: UserId = UserId(Uuid::from_u128(1));
    pub const READER: UserId = UserId(Uuid::from_u128(2));
    pub const BLOG: BlogId = BlogId(Uuid::from_u128(100));

    pub fn test_blog_record() -> repo::BlogRecord {
        repo::BlogRecord {
            blog_id: BLOG,
            slug: "slug".to_string(),
            title: "title".to_string(),
            description: "desc".to_string(),
            body: "body".to_string(),
            banner_image: None,
            tag_list: vec!["tag".to_string()],
            views: 0,
            created_at: time::OffsetDateTime::UNIX_EPOCH,
            updated_at: time::OffsetDateTime::UNIX_EPOCH,
            author_id: AUTHOR,
            author_username: "author".to_string(),
            author_first_name: "yaa".to_string(),
            author_last_name: "asantewaa".to_string(),
            author_email: "author@example.com".to_string(),
            author_about_me: "".to_string(),
            author_profile_photo: "".to_string(),
            author_twitter_handle: "".to_string(),
            author_facebook_account: "".to_string(),
            author_github_account: "".to_string(),
            average_rating: None,
            num_ratings: 0,
            likes: 0,
            dislikes: 0,
            num_comments: 0,
        }
    }

    pub fn test_blog_meta() -> repo::BlogMeta {
        repo::BlogMeta {
            blog_id: BLOG,
            author_id: AUTHOR,
        }
    }

    pub fn mock_authenticate_as(user_id: UserId) -> impl unimock::Clause {
        AuthenticateMock::authenticate
            .next_call(matching!(_))
            .returns(Ok(user_id))
    }

    pub fn mock_find_blog() -> impl unimock::Clause {
        BlogRepoMock::find_blog_meta
            .next_call(matching!("slug"))
            .returns(Ok(Some(test_blog_meta())))
    }

    #[tokio::test]
    async fn create_blog_should_slugify() {
        let deps = Unimock::new((
            mock_authenticate_as(AUTHOR),
            BlogRepoMock::insert_blog
                .next_call(matching!(repo::NewBlog {
                    slug: "my-title",
                    title: "My Title",
                    ..
                }))
                .returns(Ok(BLOG)),
            BlogRepoMock::select_blogs
                .next_call(matching!(repo::Filter {
                    slug: Some("my-title"),
                    ..
                }))
                .returns(Ok(vec![test_blog_record()])),
        ));

        api::create_blog(
            &deps,
            Actor::new("author"),
            BlogCreate {
                title: " My Title ".to_string(),
                description: "Desc".to_string(),
                body: "Body".to_string(),
                banner_image: None,
                tags: vec!["tag".to_string()],
            },
        )
        .await
        .unwrap();
    }

    fn blog_create(title: &str, banner_image: Option<&str>) -> BlogCreate {
        BlogCreate {
            title: title.to_string(),
            description: "".to_string(),
            body: "Body".to_string(),
            banner_image: banner_image.map(str::to_string),
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn create_blog_with_a_taken_title_gets_a_numbered_slug() {
        let deps = Unimock::new((
            mock_authenticate_as(AUTHOR),
            BlogRepoMock::insert_blog
                .next_call(matching!(repo::NewBlog { slug: "hello", .. }))
                .returns(Err(BlogError::DuplicateBlogSlug("hello".to_string()))),
            BlogRepoMock::insert_blog
                .next_call(matching!(repo::NewBlog { slug: "hello-2", .. }))
                .returns(Err(BlogError::DuplicateBlogSlug("hello-2".to_string()))),
            BlogRepoMock::insert_blog
                .next_call(matching!(repo::NewBlog {
                    slug: "hello-3",
                    title: "Hello",
                    ..
                }))
                .returns(Ok(BLOG)),
            BlogRepoMock::select_blogs
                .next_call(matching!(repo::Filter {
                    slug: Some("hello-3"),
                    ..
                }))
                .returns(Ok(vec![test_blog_record()])),
        ));

        api::create_blog(&deps, Actor::new("author"), blog_create("Hello", None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_blog_stores_a_blank_banner_image_as_none() {
        let deps = Unimock::new((
            mock_authenticate_as(AUTHOR),
            BlogRepoMock::insert_blog
                .next_call(matching!(repo::NewBlog {
                    slug: "hello",
                    banner_image: None,
                    ..
                }))
                .returns(Ok(BLOG)),
            BlogRepoMock::select_blogs
                .next_call(matching!(_))
                .returns(Ok(vec![test_blog_record()])),
        ));

        api::create_blog(&deps, Actor::new("author"), blog_create("Hello", Some("  ")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_blog_requires_a_wordy_title() {
        let deps = Unimock::new(mock_authenticate_as(AUTHOR));

        assert_matches!(
            api::create_blog(
                &deps,
                Actor::new("author"),
                BlogCreate {
                    title: "?!".to_string(),
                    description: "".to_string(),
                    body: "".to_string(),
                    banner_image: None,
                    tags: vec![],
                },
            )
            .await,
            Err(BlogError::Invalid { field: "title", .. })
        );
    }

    #[tokio::test]
    async fn fetch_unknown_blog_should_produce_not_found_error() {
        let deps = Unimock::new((
            mock_authenticate_as(READER),
            BlogRepoMock::find_blog_meta
                .next_call(matching!("slug"))
                .returns(Ok(None)),
        ));

        assert_matches!(
            api::fetch_blog(&deps, Actor::new("reader"), "slug", "127.0.0.1").await,
            Err(BlogError::BlogNotFound)
        );
    }

    #[tokio::test]
    async fn fetch_blog_records_the_view_before_reading() {
        let deps = Unimock::new((
            mock_authenticate_as(READER),
            mock_find_blog(),
            BlogRepoMock::record_view
                .next_call(matching!(_, "10.0.0.7"))
                .returns(Ok(true)),
            BlogRepoMock::select_blogs
                .next_call(matching!(repo::Filter {
                    slug: Some("slug"),
                    ..
                }))
                .returns(Ok(vec![repo::BlogRecord {
                    views: 1,
                    ..test_blog_record()
                }])),
        ));

        let blog = api::fetch_blog(&deps, Actor::new("reader"), "slug", "10.0.0.7")
            .await
            .unwrap();
        assert_eq!(1, blog.views);
    }

    #[tokio::test]
    async fn only_the_author_may_update() {
        let deps = Unimock::new((mock_authenticate_as(READER), mock_find_blog()));

        assert_matches!(
            api::update_blog(
                &deps,
                Actor::new("reader"),
                "slug",
                BlogUpdate {
                    body: Some("vandalism".to_string()),
                    ..Default::default()
                }
            )
            .await,
            Err(BlogError::NotYourBlog)
        );
    }

    #[tokio::test]
    async fn only_the_author_may_delete() {
        let deps = Unimock::new((mock_authenticate_as(READER), mock_find_blog()));

        assert_matches!(
            api::delete_blog(&deps, Actor::new("reader"), "slug").await,
            Err(BlogError::NotYourBlog)
        );
    }

    #[tokio::test]
    async fn update_blog_should_update_slug() {
        let deps = Unimock::new((
            mock_authenticate_as(AUTHOR),
            mock_find_blog(),
            BlogRepoMock::update_blog
                .next_call(matching!(
                    _,
                    repo::BlogUpdate {
                        slug: Some("new-title"),
                        title: Some("New Title"),
                        description: Some("New desc"),
                        body: Some("New body"),
                        banner_image: None,
                        tag_list: None,
                    }
                ))
                .returns(Ok(())),
            BlogRepoMock::select_blogs
                .next_call(matching!(repo::Filter {
                    slug: Some("new-title"),
                    ..
                }))
                .returns(Ok(vec![test_blog_record()])),
        ));

        api::update_blog(
            &deps,
            Actor::new("author"),
            "slug",
            BlogUpdate {
                title: Some("New Title".to_string()),
                description: Some("New desc".to_string()),
                body: Some("New body".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn update_blog_to_a_taken_title_gets_a_numbered_slug() {
        let deps = Unimock::new((
            mock_authenticate_as(AUTHOR),
            mock_find_blog(),
            BlogRepoMock::update_blog
                .next_call(matching!(
                    _,
                    repo::BlogUpdate {
                        slug: Some("hello"),
                        ..
                    }
                ))
                .returns(Err(BlogError::DuplicateBlogSlug("hello".to_string()))),
            BlogRepoMock::update_blog
                .next_call(matching!(
                    _,
                    repo::BlogUpdate {
                        slug: Some("hello-2"),
                        title: Some("Hello"),
                        ..
                    }
                ))
                .returns(Ok(())),
            BlogRepoMock::select_blogs
                .next_call(matching!(repo::Filter {
                    slug: Some("hello-2"),
                    ..
                }))
                .returns(Ok(vec![test_blog_record()])),
        ));

        api::update_blog(
            &deps,
            Actor::new("author"),
            "slug",
            BlogUpdate {
                title: Some("Hello".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn update_blog_with_an_empty_banner_image_removes_it() {
        let deps = Unimock::new((
            mock_authenticate_as(AUTHOR),
            mock_find_blog(),
            BlogRepoMock::update_blog
                .next_call(matching!(
                    _,
                    repo::BlogUpdate {
                        slug: None,
                        banner_image: Some(None),
                        ..
                    }
                ))
                .returns(Ok(())),
            BlogRepoMock::select_blogs
                .next_call(matching!(repo::Filter {
                    slug: Some("slug"),
                    ..
                }))
                .returns(Ok(vec![test_blog_record()])),
        ));

        api::update_blog(
            &deps,
            Actor::new("author"),
            "slug",
            BlogUpdate {
                banner_image: Some("".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn list_blogs_splits_tags() {
        let deps = Unimock::new((
            mock_authenticate_as(READER),
            BlogRepoMock::select_blogs
                .next_call(matching!((filter) if filter.tags == ["rust", "web"] && filter.title == Some("async")))
                .returns(Ok(vec![])),
        ));

        let blogs = api::list_blogs(
            &deps,
            Actor::new("reader"),
            ListBlogsQuery {
                title: Some("async".to_string()),
                tags: Some("rust, web,,rust".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(blogs.is_empty());
    }

    #[test]
    fn blog_view_carries_read_time_and_rounded_rating() {
        let blog = Blog::from(repo::BlogRecord {
            body: vec!["word"; 496].join(" "),
            average_rating: Some(11.0 / 3.0),
            ..test_blog_record()
        });

        // title + body + description + tag = 499 words
        assert_eq!(Some(ReadTime::Minutes(2)), blog.read_time);
        assert_eq!(3.7, blog.average_rating);
        assert_eq!("Yaa Asantewaa", blog.author_info.fullname);
    }

    #[test]
    fn wordless_blog_has_no_read_time() {
        let blog = Blog::from(repo::BlogRecord {
            title: "".to_string(),
            body: "".to_string(),
            description: "".to_string(),
            tag_list: vec![],
            ..test_blog_record()
        });

        assert_eq!(None, blog.read_time);
        assert_eq!(0.0, blog.average_rating);
        let json = serde_json::to_value(&blog).unwrap();
        assert!(json.get("read_time").is_none());
        assert_eq!(serde_json::json!([]), json["tagList"]);
    }

    #[test]
    fn only_a_non_blank_banner_image_adds_reading_time() {
        // title + body + description + tag = 100 words
        let record = repo::BlogRecord {
            body: vec!["word"; 97].join(" "),
            ..test_blog_record()
        };

        let blank = Blog::from(repo::BlogRecord {
            banner_image: Some("".to_string()),
            ..record.clone()
        });
        assert_eq!(Some(ReadTime::Seconds(24)), blank.read_time);

        let banner = Blog::from(repo::BlogRecord {
            banner_image: Some("banner.png".to_string()),
            ..record
        });
        assert_eq!(Some(ReadTime::Seconds(34)), banner.read_time);
    }

    #[test]
    fn slugify_keeps_contractions_together() {
        assert_eq!("hello-world-its", slugify("Hello, World! It's"));
        assert_eq!("dont-panic", slugify("Don't   \"panic\""));
    }
}
