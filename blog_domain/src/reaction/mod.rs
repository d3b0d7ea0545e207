pub mod repo;

use crate::blog::{find_blog, repo::BlogRepo};
use crate::error::*;
use crate::user::auth::{Actor, Authenticate};
use repo::ReactionRepo;

use entrait::entrait_export as entrait;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    /// The stored value: `1` for like, `-1` for dislike.
    pub fn value(self) -> i16 {
        match self {
            Self::Like => 1,
            Self::Dislike => -1,
        }
    }

    pub fn from_value(value: i16) -> Option<Self> {
        match value {
            1 => Some(Self::Like),
            -1 => Some(Self::Dislike),
            _ => None,
        }
    }

    fn shout(self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::Dislike => "DISLIKE",
        }
    }
}

impl FromStr for Reaction {
    type Err = BlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            _ => Err(BlogError::invalid(
                "reaction",
                "A reaction is either like or dislike",
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReactionOutcome {
    Set(Reaction),
    Withdrawn(Reaction),
}

impl ReactionOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Set(_) => "Reaction successfully set".to_string(),
            Self::Withdrawn(reaction) => format!("You no-longer {}", reaction.shout()),
        }
    }
}

impl serde::Serialize for ReactionOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("ReactionOutcome", 1)?;
        s.serialize_field("message", &self.message())?;
        s.end()
    }
}

#[entrait(pub ReactionApi, mock_api=ReactionApiMock)]
pub mod api {
    use super::*;

    pub async fn react(
        deps: &(impl Authenticate + BlogRepo + ReactionRepo),
        actor: Actor,
        slug: &str,
        reaction: Reaction,
    ) -> BlogResult<ReactionOutcome> {
        let current_user_id = deps.authenticate(actor).await?;
        let blog = find_blog(deps, slug).await?;

        match deps.find_reaction(blog.blog_id, current_user_id).await? {
            Some(existing) if existing == reaction => {
                deps.delete_reaction(blog.blog_id, current_user_id).await?;
                tracing::debug!(%slug, ?reaction, "reaction withdrawn");
                Ok(ReactionOutcome::Withdrawn(reaction))
            }
            _ => {
                deps.upsert_reaction(blog.blog_id, current_user_id, reaction)
                    .await?;
                tracing::debug!(%slug, ?reaction, "reaction set");
                Ok(ReactionOutcome::Set(reaction))
            }
        }
    }
}
