//! Directed "follows" edges between profiles.
//!
//! The graph only stores and answers questions about edges. Business rules
//! (no following yourself, no following twice, the target must exist) are
//! checked by the callers before they mutate it. Adding an edge that already
//! exists, or removing one that doesn't, leaves the graph as it was.

use crate::error::BlogResult;
use crate::profile::repo::ProfileRecord;
use crate::profile::ProfileId;

use entrait::entrait_export as entrait;

#[entrait(FollowRepoImpl, delegate_by = DelegateFollowRepo, mock_api=FollowRepoMock)]
pub trait FollowRepo {
    /// Must not fail when the edge already exists.
    async fn insert_follow(&self, follower: ProfileId, followee: ProfileId) -> BlogResult<()>;

    async fn delete_follow(&self, follower: ProfileId, followee: ProfileId) -> BlogResult<()>;

    async fn follow_exists(&self, follower: ProfileId, followee: ProfileId) -> BlogResult<bool>;

    /// Profiles followed by `follower`, ordered by username.
    async fn list_following(&self, follower: ProfileId) -> BlogResult<Vec<ProfileRecord>>;

    /// Profiles following `followee`, ordered by username.
    async fn list_followers(&self, followee: ProfileId) -> BlogResult<Vec<ProfileRecord>>;
}

#[entrait(pub SocialGraph, mock_api=SocialGraphMock)]
pub mod graph {
    use super::*;

    pub async fn following_list(
        deps: &impl FollowRepo,
        profile: ProfileId,
    ) -> BlogResult<Vec<ProfileRecord>> {
        deps.list_following(profile).await
    }

    pub async fn followers_list(
        deps: &impl FollowRepo,
        profile: ProfileId,
    ) -> BlogResult<Vec<ProfileRecord>> {
        deps.list_followers(profile).await
    }

    pub async fn follow(
        deps: &impl FollowRepo,
        profile: ProfileId,
        target: ProfileId,
    ) -> BlogResult<()> {
        tracing::debug!(follower = %profile, followee = %target, "adding follow edge");
        deps.insert_follow(profile, target).await
    }

    pub async fn unfollow(
        deps: &impl FollowRepo,
        profile: ProfileId,
        target: ProfileId,
    ) -> BlogResult<()> {
        tracing::debug!(follower = %profile, followee = %target, "removing follow edge");
        deps.delete_follow(profile, target).await
    }

    pub async fn check_following(
        deps: &impl FollowRepo,
        profile: ProfileId,
        target: ProfileId,
    ) -> BlogResult<bool> {
        deps.follow_exists(profile, target).await
    }

    /// Whether `other` follows `profile`.
    pub async fn check_is_followed_by(
        deps: &impl FollowRepo,
        profile: ProfileId,
        other: ProfileId,
    ) -> BlogResult<bool> {
        deps.follow_exists(other, profile).await
    }
}

#[cfg(test)]
mod tests {
    use super::graph::*;
    use super::*;

    use unimock::*;
    use uuid::Uuid;

    const P: ProfileId = ProfileId(Uuid::from_u128(1));
    const Q: ProfileId = ProfileId(Uuid::from_u128(2));

    #[tokio::test]
    async fn followed_by_is_following_reversed() {
        let deps = Unimock::new(
            FollowRepoMock::follow_exists
                .next_call(matching!((follower, followee) if follower.0 == P.0 && followee.0 == Q.0))
                .returns(Ok(true)),
        );

        assert!(check_is_followed_by(&deps, Q, P).await.unwrap());
    }

    #[tokio::test]
    async fn follow_and_unfollow_go_straight_to_the_store() {
        let deps = Unimock::new((
            FollowRepoMock::insert_follow
                .next_call(matching!(_, _))
                .returns(Ok(())),
            FollowRepoMock::delete_follow
                .next_call(matching!(_, _))
                .returns(Ok(())),
        ));

        follow(&deps, P, Q).await.unwrap();
        unfollow(&deps, P, Q).await.unwrap();
    }
}
