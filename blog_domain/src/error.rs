use http::StatusCode;
use std::borrow::Cow;
use std::collections::BTreeMap;

pub type BlogResult<T, E = BlogError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum BlogError {
    #[error("authentication required")]
    Unauthorized,

    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: Cow<'static, str>,
    },

    #[error("user does not exist")]
    CurrentUserDoesNotExist,

    #[error("User with that username does not exist")]
    UserNotFound,

    #[error("username is taken")]
    UsernameTaken,

    #[error("email is taken")]
    EmailTaken,

    #[error("A profile with this username does not exist")]
    ProfileNotFound,

    #[error("You can't edit a profile that doesn't belong to you!")]
    NotYourProfile,

    #[error("You can't follow yourself")]
    CantFollowYourself,

    #[error("You already follow {0}")]
    AlreadyFollowing(String),

    #[error("You do not follow {0}")]
    NotFollowing(String),

    #[error("That blog does not exist in our catalog")]
    BlogNotFound,

    #[error("duplicate blog slug: {0}")]
    DuplicateBlogSlug(String),

    #[error("You can't update or delete a blog that does not belong to you")]
    NotYourBlog,

    #[error("Comment does not exist")]
    CommentNotFound,

    #[error("You can't change a comment that does not belong to you")]
    NotYourComment,

    #[error("You can't rate/review your own blog post")]
    CantRateYourBlog,

    #[error("You have already rated this blog post")]
    AlreadyRated,

    #[error("You can't give a zero rating")]
    ZeroRating,

    #[error("You have already favorited this blog")]
    AlreadyFavorited,

    #[error("an internal server error occurred")]
    Anyhow(#[from] anyhow::Error),
}

impl BlogError {
    /// Convenient constructor for `BlogError::Invalid`.
    pub fn invalid(field: &'static str, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Invalid { .. } => StatusCode::BAD_REQUEST,
            Self::CurrentUserDoesNotExist => StatusCode::NOT_FOUND,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::UsernameTaken => StatusCode::BAD_REQUEST,
            Self::EmailTaken => StatusCode::BAD_REQUEST,
            Self::ProfileNotFound => StatusCode::NOT_FOUND,
            Self::NotYourProfile => StatusCode::FORBIDDEN,
            Self::CantFollowYourself => StatusCode::FORBIDDEN,
            Self::AlreadyFollowing(_) => StatusCode::BAD_REQUEST,
            Self::NotFollowing(_) => StatusCode::BAD_REQUEST,
            Self::BlogNotFound => StatusCode::NOT_FOUND,
            Self::DuplicateBlogSlug(_) => StatusCode::BAD_REQUEST,
            Self::NotYourBlog => StatusCode::FORBIDDEN,
            Self::CommentNotFound => StatusCode::NOT_FOUND,
            Self::NotYourComment => StatusCode::FORBIDDEN,
            Self::CantRateYourBlog => StatusCode::FORBIDDEN,
            Self::AlreadyRated => StatusCode::BAD_REQUEST,
            Self::ZeroRating => StatusCode::BAD_REQUEST,
            Self::AlreadyFavorited => StatusCode::BAD_REQUEST,
            Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shape the error the way clients expect to receive it.
    ///
    /// Not-found errors are keyed by the kind of entity that was missing,
    /// validation errors by the offending field and everything else by `detail`.
    pub fn to_body(&self) -> ErrorBody {
        let key: Cow<'static, str> = match self {
            Self::Invalid { field, .. } => (*field).into(),
            Self::UsernameTaken => "username".into(),
            Self::EmailTaken => "email".into(),
            Self::UserNotFound | Self::CurrentUserDoesNotExist => "user".into(),
            Self::ProfileNotFound => "profile".into(),
            Self::BlogNotFound => "blog".into(),
            Self::DuplicateBlogSlug(_) => "slug".into(),
            Self::CommentNotFound => "comment".into(),
            _ => "detail".into(),
        };

        let message = match self {
            Self::Invalid { reason, .. } => reason.clone(),
            Self::Anyhow(e) => {
                tracing::error!("Generic error: {:?}", e);
                self.to_string().into()
            }
            _ => self.to_string().into(),
        };

        ErrorBody {
            status_code: self.status_code().as_u16(),
            errors: BTreeMap::from([(key, message)]),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Eq, PartialEq)]
pub struct ErrorBody {
    pub status_code: u16,
    pub errors: BTreeMap<Cow<'static, str>, Cow<'static, str>>,
}
