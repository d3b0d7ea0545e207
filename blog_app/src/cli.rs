use crate::config::Config;

use blog_domain::blog::api::BlogApi;
use blog_domain::blog::{BlogCreate, BlogUpdate, ListBlogsQuery};
use blog_domain::comment::api::CommentApi;
use blog_domain::comment::CommentId;
use blog_domain::error::{BlogError, BlogResult};
use blog_domain::favorite::api::FavoriteApi;
use blog_domain::profile::api::ProfileApi;
use blog_domain::profile::ProfileUpdate;
use blog_domain::rating::api::RatingApi;
use blog_domain::rating::NewRating;
use blog_domain::reaction::api::ReactionApi;
use blog_domain::reaction::Reaction;
use blog_domain::read_time::{estimate_read_time, word_count, PostContent};
use blog_domain::user::accounts::Accounts;
use blog_domain::user::auth::Actor;
use blog_domain::user::NewAccount;

use serde_json::json;
use uuid::Uuid;

#[derive(clap::Parser, Debug)]
#[clap(name = "blog", version, about = "Blogging platform backend")]
pub struct Cli {
    #[clap(flatten)]
    pub config: Config,

    /// Username to act as, as vouched for by the authentication provider.
    #[clap(long = "as", env = "BLOG_USER", global = true)]
    pub actor: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Estimate how long a post takes to read. Needs no database.
    ReadTime(ReadTimeArgs),
    CreateAccount {
        #[clap(long)]
        username: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        first_name: String,
        #[clap(long)]
        last_name: String,
        #[clap(long, env = "BLOG_PASSWORD")]
        password: String,
    },
    /// Delete the acting user's account and everything it owns.
    DeleteAccount,
    Profiles,
    Profile {
        username: String,
    },
    UpdateProfile {
        username: String,
        #[clap(long)]
        profile_photo: Option<String>,
        #[clap(long)]
        about_me: Option<String>,
        /// male, female or other
        #[clap(long)]
        gender: Option<String>,
        #[clap(long)]
        city: Option<String>,
        #[clap(long)]
        twitter_handle: Option<String>,
        #[clap(long)]
        facebook_account: Option<String>,
        #[clap(long)]
        github_account: Option<String>,
    },
    Follow {
        username: String,
    },
    Unfollow {
        username: String,
    },
    Following {
        username: String,
    },
    Followers {
        username: String,
    },
    Blogs {
        #[clap(long)]
        author: Option<String>,
        #[clap(long)]
        title: Option<String>,
        /// Comma separated
        #[clap(long)]
        tags: Option<String>,
    },
    Blog {
        slug: String,
        /// Address the view is counted for.
        #[clap(long, default_value = "127.0.0.1")]
        ip: String,
    },
    CreateBlog {
        #[clap(long)]
        title: String,
        #[clap(long, default_value = "")]
        description: String,
        #[clap(long)]
        body: String,
        #[clap(long)]
        banner_image: Option<String>,
        #[clap(long = "tag")]
        tags: Vec<String>,
    },
    UpdateBlog {
        slug: String,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        body: Option<String>,
        #[clap(long)]
        banner_image: Option<String>,
        /// Replaces all tags when given.
        #[clap(long = "tag")]
        tags: Vec<String>,
    },
    DeleteBlog {
        slug: String,
    },
    Comments {
        slug: String,
    },
    Comment {
        slug: String,
        body: String,
    },
    EditComment {
        id: Uuid,
        body: String,
    },
    DeleteComment {
        id: Uuid,
    },
    Rate {
        slug: String,
        #[clap(allow_hyphen_values = true)]
        value: i16,
        #[clap(long, default_value = "")]
        review: String,
    },
    Ratings {
        slug: String,
    },
    /// like or dislike. Repeating a reaction withdraws it.
    React {
        slug: String,
        reaction: String,
    },
    Favorite {
        slug: String,
    },
    Unfavorite {
        slug: String,
    },
    Favorites,
}

#[derive(clap::Args, Debug)]
pub struct ReadTimeArgs {
    #[clap(long, default_value = "")]
    pub title: String,
    #[clap(long, default_value = "")]
    pub description: String,
    #[clap(long = "tag")]
    pub tags: Vec<String>,
    #[clap(long)]
    pub banner_image: bool,
    pub body: String,
}

pub fn read_time_report(args: &ReadTimeArgs) -> serde_json::Value {
    let post = PostContent {
        title: &args.title,
        body: &args.body,
        description: &args.description,
        tags: &args.tags,
        has_banner_image: args.banner_image,
    };

    json!({
        "word_count": word_count(&post),
        "read_time": estimate_read_time(&post),
    })
}

fn to_json(value: impl serde::Serialize) -> BlogResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| BlogError::Anyhow(e.into()))
}

pub async fn run<D>(deps: &D, actor: Option<&str>, command: Command) -> BlogResult<serde_json::Value>
where
    D: Accounts
        + ProfileApi
        + BlogApi
        + CommentApi
        + RatingApi
        + ReactionApi
        + FavoriteApi,
{
    let actor = || actor.map(Actor::new).ok_or(BlogError::Unauthorized);

    match command {
        Command::ReadTime(args) => Ok(read_time_report(&args)),
        Command::CreateAccount {
            username,
            email,
            first_name,
            last_name,
            password,
        } => to_json(
            deps.create_account(NewAccount {
                username,
                email,
                first_name,
                last_name,
                password: password.into(),
            })
            .await?,
        ),
        Command::DeleteAccount => {
            deps.delete_account(actor()?).await?;
            Ok(json!({ "message": "Account deleted" }))
        }
        Command::Profiles => to_json(deps.list_profiles(actor()?).await?),
        Command::Profile { username } => to_json(deps.fetch_profile(actor()?, &username).await?),
        Command::UpdateProfile {
            username,
            profile_photo,
            about_me,
            gender,
            city,
            twitter_handle,
            facebook_account,
            github_account,
        } => {
            let update = ProfileUpdate {
                profile_photo,
                about_me,
                gender: gender.as_deref().map(str::parse).transpose()?,
                city,
                twitter_handle,
                facebook_account,
                github_account,
            };
            to_json(deps.update_profile(actor()?, &username, update).await?)
        }
        Command::Follow { username } => to_json(deps.follow_user(actor()?, &username).await?),
        Command::Unfollow { username } => {
            to_json(deps.unfollow_user(actor()?, &username).await?)
        }
        Command::Following { username } => to_json(deps.following(actor()?, &username).await?),
        Command::Followers { username } => to_json(deps.followers(actor()?, &username).await?),
        Command::Blogs {
            author,
            title,
            tags,
        } => to_json(
            deps.list_blogs(
                actor()?,
                ListBlogsQuery {
                    author,
                    title,
                    tags,
                },
            )
            .await?,
        ),
        Command::Blog { slug, ip } => to_json(deps.fetch_blog(actor()?, &slug, &ip).await?),
        Command::CreateBlog {
            title,
            description,
            body,
            banner_image,
            tags,
        } => to_json(
            deps.create_blog(
                actor()?,
                BlogCreate {
                    title,
                    description,
                    body,
                    banner_image,
                    tags,
                },
            )
            .await?,
        ),
        Command::UpdateBlog {
            slug,
            title,
            description,
            body,
            banner_image,
            tags,
        } => to_json(
            deps.update_blog(
                actor()?,
                &slug,
                BlogUpdate {
                    title,
                    description,
                    body,
                    banner_image,
                    tags: (!tags.is_empty()).then_some(tags),
                },
            )
            .await?,
        ),
        Command::DeleteBlog { slug } => {
            deps.delete_blog(actor()?, &slug).await?;
            Ok(json!({ "message": "Blog deleted" }))
        }
        Command::Comments { slug } => to_json(deps.list_comments(actor()?, &slug).await?),
        Command::Comment { slug, body } => {
            to_json(deps.add_comment(actor()?, &slug, &body).await?)
        }
        Command::EditComment { id, body } => {
            to_json(deps.update_comment(actor()?, CommentId(id), &body).await?)
        }
        Command::DeleteComment { id } => {
            deps.delete_comment(actor()?, CommentId(id)).await?;
            Ok(json!({ "message": "Comment deleted" }))
        }
        Command::Rate {
            slug,
            value,
            review,
        } => to_json(
            deps.rate_blog(actor()?, &slug, NewRating { value, review })
                .await?,
        ),
        Command::Ratings { slug } => to_json(deps.list_ratings(actor()?, &slug).await?),
        Command::React { slug, reaction } => {
            let reaction: Reaction = reaction.parse()?;
            to_json(deps.react(actor()?, &slug, reaction).await?)
        }
        Command::Favorite { slug } => to_json(deps.favorite_blog(actor()?, &slug).await?),
        Command::Unfavorite { slug } => {
            deps.unfavorite_blog(actor()?, &slug).await?;
            Ok(json!({ "message": "Blog removed from favorites" }))
        }
        Command::Favorites => to_json(deps.list_favorites(actor()?).await?),
    }
}
