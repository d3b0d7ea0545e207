//! In-memory account, profile and follow stores.
//!
//! They enforce the same rules as the PostgreSQL schema: unique usernames
//! and emails, one profile per user, no self-follows, and removing a user
//! removes their profile and every edge touching it.

use blog_domain::error::{BlogError, BlogResult};
use blog_domain::notify::NewFollowerMessage;
use blog_domain::profile::repo::*;
use blog_domain::profile::{Gender, ProfileId, DEFAULT_CITY};
use blog_domain::user::repo::*;
use blog_domain::user::UserId;

use entrait::*;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;
use uuid::Uuid;

const DEFAULT_PROFILE_PHOTO: &str = "/profile_default.png";

#[derive(Default)]
pub struct MemDb {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    users: BTreeMap<UserId, User>,
    profiles: BTreeMap<ProfileId, StoredProfile>,
    follows: BTreeSet<(ProfileId, ProfileId)>,
    notifications: Vec<NewFollowerMessage>,
}

#[derive(Clone)]
struct StoredProfile {
    user_id: UserId,
    profile_photo: String,
    about_me: String,
    gender: Gender,
    city: String,
    twitter_handle: String,
    facebook_account: String,
    github_account: String,
}

impl State {
    fn record(&self, profile_id: ProfileId) -> BlogResult<ProfileRecord> {
        let profile = self
            .profiles
            .get(&profile_id)
            .ok_or(BlogError::ProfileNotFound)?;
        let user = self
            .users
            .get(&profile.user_id)
            .ok_or(BlogError::UserNotFound)?;

        Ok(ProfileRecord {
            profile_id,
            user_id: user.user_id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            profile_photo: profile.profile_photo.clone(),
            about_me: profile.about_me.clone(),
            gender: profile.gender,
            city: profile.city.clone(),
            twitter_handle: profile.twitter_handle.clone(),
            facebook_account: profile.facebook_account.clone(),
            github_account: profile.github_account.clone(),
        })
    }

    fn profile_id_of(&self, user_id: UserId) -> Option<ProfileId> {
        self.profiles
            .iter()
            .find(|(_, profile)| profile.user_id == user_id)
            .map(|(profile_id, _)| *profile_id)
    }

    fn sorted_records(
        &self,
        profile_ids: impl Iterator<Item = ProfileId>,
    ) -> BlogResult<Vec<ProfileRecord>> {
        let mut records = profile_ids
            .map(|profile_id| self.record(profile_id))
            .collect::<BlogResult<Vec<_>>>()?;
        records.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(records)
    }
}

impl MemDb {
    /// Follow notifications delivered so far, oldest first.
    pub async fn sent_notifications(&self) -> Vec<NewFollowerMessage> {
        self.state.read().await.notifications.clone()
    }
}

pub trait GetMemDb {
    fn get_mem_db(&self) -> &MemDb;
}

impl GetMemDb for MemDb {
    fn get_mem_db(&self) -> &MemDb {
        self
    }
}

impl<T: GetMemDb> GetMemDb for entrait::Impl<T> {
    fn get_mem_db(&self) -> &MemDb {
        (**self).get_mem_db()
    }
}

pub struct MemUserRepo;

#[entrait]
impl blog_domain::user::repo::UserRepoImpl for MemUserRepo {
    pub async fn insert_user(deps: &impl GetMemDb, new_user: NewUser<'_>) -> BlogResult<User> {
        let mut state = deps.get_mem_db().state.write().await;

        if state.users.values().any(|u| u.username == new_user.username) {
            return Err(BlogError::UsernameTaken);
        }
        if state.users.values().any(|u| u.email == new_user.email) {
            return Err(BlogError::EmailTaken);
        }

        let user = User {
            user_id: UserId(Uuid::new_v4()),
            username: new_user.username.to_string(),
            email: new_user.email.to_string(),
            first_name: new_user.first_name.to_string(),
            last_name: new_user.last_name.to_string(),
            date_joined: time::OffsetDateTime::now_utc(),
        };
        state.users.insert(user.user_id, user.clone());

        Ok(user)
    }

    pub async fn find_user_by_username(
        deps: &impl GetMemDb,
        username: &str,
    ) -> BlogResult<Option<User>> {
        Ok(deps
            .get_mem_db()
            .state
            .read()
            .await
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    pub async fn delete_user(deps: &impl GetMemDb, user_id: UserId) -> BlogResult<()> {
        let mut state = deps.get_mem_db().state.write().await;

        state.users.remove(&user_id).ok_or(BlogError::UserNotFound)?;
        if let Some(profile_id) = state.profile_id_of(user_id) {
            state.profiles.remove(&profile_id);
            state
                .follows
                .retain(|(follower, followee)| *follower != profile_id && *followee != profile_id);
        }

        Ok(())
    }
}

pub struct MemProfileRepo;

#[entrait]
impl blog_domain::profile::repo::ProfileRepoImpl for MemProfileRepo {
    pub async fn insert_profile(deps: &impl GetMemDb, user_id: UserId) -> BlogResult<ProfileRecord> {
        let mut state = deps.get_mem_db().state.write().await;

        if !state.users.contains_key(&user_id) {
            return Err(BlogError::UserNotFound);
        }
        if state.profile_id_of(user_id).is_some() {
            return Err(anyhow::anyhow!("user already has a profile").into());
        }

        let profile_id = ProfileId(Uuid::new_v4());
        state.profiles.insert(
            profile_id,
            StoredProfile {
                user_id,
                profile_photo: DEFAULT_PROFILE_PHOTO.to_string(),
                about_me: String::new(),
                gender: Gender::default(),
                city: DEFAULT_CITY.to_string(),
                twitter_handle: String::new(),
                facebook_account: String::new(),
                github_account: String::new(),
            },
        );

        state.record(profile_id)
    }

    pub async fn find_profile_by_username(
        deps: &impl GetMemDb,
        username: &str,
    ) -> BlogResult<Option<ProfileRecord>> {
        let state = deps.get_mem_db().state.read().await;

        state
            .users
            .values()
            .find(|user| user.username == username)
            .and_then(|user| state.profile_id_of(user.user_id))
            .map(|profile_id| state.record(profile_id))
            .transpose()
    }

    pub async fn find_profile_by_user_id(
        deps: &impl GetMemDb,
        user_id: UserId,
    ) -> BlogResult<Option<ProfileRecord>> {
        let state = deps.get_mem_db().state.read().await;

        state
            .profile_id_of(user_id)
            .map(|profile_id| state.record(profile_id))
            .transpose()
    }

    pub async fn list_profiles(deps: &impl GetMemDb) -> BlogResult<Vec<ProfileRecord>> {
        let state = deps.get_mem_db().state.read().await;
        state.sorted_records(state.profiles.keys().copied())
    }

    pub async fn update_profile(
        deps: &impl GetMemDb,
        profile_id: ProfileId,
        up: ProfileUpdate<'_>,
    ) -> BlogResult<ProfileRecord> {
        let mut state = deps.get_mem_db().state.write().await;
        let profile = state
            .profiles
            .get_mut(&profile_id)
            .ok_or(BlogError::ProfileNotFound)?;

        fn apply(field: &mut String, value: Option<&str>) {
            if let Some(value) = value {
                *field = value.to_string();
            }
        }

        apply(&mut profile.profile_photo, up.profile_photo);
        apply(&mut profile.about_me, up.about_me);
        apply(&mut profile.city, up.city);
        apply(&mut profile.twitter_handle, up.twitter_handle);
        apply(&mut profile.facebook_account, up.facebook_account);
        apply(&mut profile.github_account, up.github_account);
        if let Some(gender) = up.gender {
            profile.gender = gender;
        }

        state.record(profile_id)
    }
}

pub struct MemFollowRepo;

#[entrait]
impl blog_domain::social_graph::FollowRepoImpl for MemFollowRepo {
    pub async fn insert_follow(
        deps: &impl GetMemDb,
        follower: ProfileId,
        followee: ProfileId,
    ) -> BlogResult<()> {
        let mut state = deps.get_mem_db().state.write().await;

        if follower == followee {
            return Err(BlogError::CantFollowYourself);
        }
        if !state.profiles.contains_key(&follower) {
            return Err(BlogError::CurrentUserDoesNotExist);
        }
        if !state.profiles.contains_key(&followee) {
            return Err(BlogError::ProfileNotFound);
        }

        state.follows.insert((follower, followee));
        Ok(())
    }

    pub async fn delete_follow(
        deps: &impl GetMemDb,
        follower: ProfileId,
        followee: ProfileId,
    ) -> BlogResult<()> {
        deps.get_mem_db()
            .state
            .write()
            .await
            .follows
            .remove(&(follower, followee));
        Ok(())
    }

    pub async fn follow_exists(
        deps: &impl GetMemDb,
        follower: ProfileId,
        followee: ProfileId,
    ) -> BlogResult<bool> {
        Ok(deps
            .get_mem_db()
            .state
            .read()
            .await
            .follows
            .contains(&(follower, followee)))
    }

    pub async fn list_following(
        deps: &impl GetMemDb,
        follower: ProfileId,
    ) -> BlogResult<Vec<ProfileRecord>> {
        let state = deps.get_mem_db().state.read().await;
        state.sorted_records(
            state
                .follows
                .iter()
                .filter(|(from, _)| *from == follower)
                .map(|(_, to)| *to),
        )
    }

    pub async fn list_followers(
        deps: &impl GetMemDb,
        followee: ProfileId,
    ) -> BlogResult<Vec<ProfileRecord>> {
        let state = deps.get_mem_db().state.read().await;
        state.sorted_records(
            state
                .follows
                .iter()
                .filter(|(_, to)| *to == followee)
                .map(|(from, _)| *from),
        )
    }
}

/// Keeps every new-follower message instead of sending it.
pub struct RecordingNotifier;

#[entrait]
impl blog_domain::notify::NotifierImpl for RecordingNotifier {
    pub async fn notify_new_follower(
        deps: &impl GetMemDb,
        followee: &ProfileRecord,
        follower: &ProfileRecord,
    ) -> BlogResult<()> {
        deps.get_mem_db()
            .state
            .write()
            .await
            .notifications
            .push(NewFollowerMessage::new(followee, follower));
        Ok(())
    }
}

impl DelegateUserRepo<Self> for MemDb {
    type Target = MemUserRepo;
}

impl DelegateProfileRepo<Self> for MemDb {
    type Target = MemProfileRepo;
}

impl blog_domain::social_graph::DelegateFollowRepo<Self> for MemDb {
    type Target = MemFollowRepo;
}

impl blog_domain::notify::DelegateNotifier<Self> for MemDb {
    type Target = RecordingNotifier;
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_domain::notify::NEW_FOLLOWER_SUBJECT;
    use blog_domain::profile::api::ProfileApi;
    use blog_domain::social_graph::SocialGraph;
    use blog_domain::user::accounts::Accounts;
    use blog_domain::user::auth::Actor;
    use blog_domain::user::NewAccount;

    use assert_matches::*;
    use entrait::Impl;

    async fn app_with(usernames: &[&str]) -> Impl<MemDb> {
        let app = Impl::new(MemDb::default());
        for username in usernames {
            app.create_account(NewAccount {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                first_name: username.to_string(),
                last_name: "tester".to_string(),
                password: "correct horse".into(),
            })
            .await
            .unwrap();
        }
        app
    }

    fn usernames(profiles: &[blog_domain::profile::Profile]) -> Vec<&str> {
        profiles
            .iter()
            .map(|profile| profile.username.as_str())
            .collect()
    }

    #[tokio::test]
    async fn follow_then_unfollow_round_trip() {
        let app = app_with(&["alice", "bob"]).await;

        let bob = app.follow_user(Actor::new("alice"), "bob").await.unwrap();
        assert!(bob.following);

        let following = app.following(Actor::new("alice"), "alice").await.unwrap();
        assert_eq!(1, following.num_users_i_follow);
        assert_eq!(vec!["bob"], usernames(&following.users_i_follow));

        let followers = app.followers(Actor::new("alice"), "bob").await.unwrap();
        assert_eq!(vec!["alice"], usernames(&followers.followers));

        let bob = app.unfollow_user(Actor::new("alice"), "bob").await.unwrap();
        assert!(!bob.following);

        let following = app.following(Actor::new("alice"), "alice").await.unwrap();
        assert_eq!(0, following.num_users_i_follow);
        let followers = app.followers(Actor::new("bob"), "bob").await.unwrap();
        assert_eq!(0, followers.num_of_followers);
    }

    #[tokio::test]
    async fn following_notifies_the_followee() {
        let app = app_with(&["alice", "bob"]).await;
        app.follow_user(Actor::new("alice"), "bob").await.unwrap();

        let sent = app.sent_notifications().await;
        assert_eq!(1, sent.len());
        assert_eq!("bob@example.com", sent[0].recipient);
        assert_eq!(NEW_FOLLOWER_SUBJECT, sent[0].subject);
        assert_eq!(
            "Hi there bob!!, the user alice now follows you",
            sent[0].body
        );
    }

    #[tokio::test]
    async fn following_twice_and_unfollowing_strangers_fail() {
        let app = app_with(&["alice", "bob"]).await;

        assert_matches!(
            app.unfollow_user(Actor::new("alice"), "bob").await,
            Err(BlogError::NotFollowing(username)) if username == "bob"
        );

        app.follow_user(Actor::new("alice"), "bob").await.unwrap();
        assert_matches!(
            app.follow_user(Actor::new("alice"), "bob").await,
            Err(BlogError::AlreadyFollowing(username)) if username == "bob"
        );

        assert_eq!(1, app.sent_notifications().await.len());
    }

    #[tokio::test]
    async fn nobody_follows_themselves() {
        let app = app_with(&["alice"]).await;

        assert_matches!(
            app.follow_user(Actor::new("alice"), "alice").await,
            Err(BlogError::CantFollowYourself)
        );

        let alice = app.find_profile_by_username("alice").await.unwrap().unwrap();
        assert_matches!(
            app.follow(alice.profile_id, alice.profile_id).await,
            Err(BlogError::CantFollowYourself)
        );
    }

    #[tokio::test]
    async fn followed_by_is_the_inverse_of_following() {
        let app = app_with(&["alice", "bob", "carol"]).await;
        app.follow_user(Actor::new("alice"), "bob").await.unwrap();
        app.follow_user(Actor::new("carol"), "bob").await.unwrap();

        let alice = app.find_profile_by_username("alice").await.unwrap().unwrap();
        let bob = app.find_profile_by_username("bob").await.unwrap().unwrap();

        assert!(app.check_following(alice.profile_id, bob.profile_id).await.unwrap());
        assert!(app
            .check_is_followed_by(bob.profile_id, alice.profile_id)
            .await
            .unwrap());
        assert!(!app
            .check_is_followed_by(alice.profile_id, bob.profile_id)
            .await
            .unwrap());

        let followers = app.followers_list(bob.profile_id).await.unwrap();
        for follower in &followers {
            assert!(app
                .check_following(follower.profile_id, bob.profile_id)
                .await
                .unwrap());
        }
        assert_eq!(2, followers.len());
    }

    #[tokio::test]
    async fn graph_operations_are_idempotent() {
        let app = app_with(&["alice", "bob"]).await;
        let alice = app.find_profile_by_username("alice").await.unwrap().unwrap();
        let bob = app.find_profile_by_username("bob").await.unwrap().unwrap();

        app.follow(alice.profile_id, bob.profile_id).await.unwrap();
        app.follow(alice.profile_id, bob.profile_id).await.unwrap();
        assert_eq!(1, app.following_list(alice.profile_id).await.unwrap().len());

        app.unfollow(alice.profile_id, bob.profile_id).await.unwrap();
        app.unfollow(alice.profile_id, bob.profile_id).await.unwrap();
        assert!(app.following_list(alice.profile_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_an_account_removes_its_edges() {
        let app = app_with(&["alice", "carol"]).await;
        app.follow_user(Actor::new("alice"), "carol").await.unwrap();
        app.follow_user(Actor::new("carol"), "alice").await.unwrap();

        app.delete_account(Actor::new("carol")).await.unwrap();

        let following = app.following(Actor::new("alice"), "alice").await.unwrap();
        assert_eq!(0, following.num_users_i_follow);
        let followers = app.followers(Actor::new("alice"), "alice").await.unwrap();
        assert_eq!(0, followers.num_of_followers);

        assert_matches!(
            app.fetch_profile(Actor::new("alice"), "carol").await,
            Err(BlogError::ProfileNotFound)
        );
        assert_matches!(
            app.follow_user(Actor::new("carol"), "alice").await,
            Err(BlogError::CurrentUserDoesNotExist)
        );
    }

    #[tokio::test]
    async fn usernames_and_emails_are_unique() {
        let app = app_with(&["alice"]).await;

        let result = app
            .create_account(NewAccount {
                username: "alice".to_string(),
                email: "other@example.com".to_string(),
                first_name: "Alice".to_string(),
                last_name: "Again".to_string(),
                password: "correct horse".into(),
            })
            .await;
        assert_matches!(result, Err(BlogError::UsernameTaken));

        let result = app
            .create_account(NewAccount {
                username: "alice2".to_string(),
                email: "alice@example.com".to_string(),
                first_name: "Alice".to_string(),
                last_name: "Again".to_string(),
                password: "correct horse".into(),
            })
            .await;
        assert_matches!(result, Err(BlogError::EmailTaken));
    }

    #[tokio::test]
    async fn new_accounts_get_a_default_profile() {
        let app = app_with(&["alice"]).await;

        let profile = app.fetch_profile(Actor::new("alice"), "alice").await.unwrap();
        assert_eq!(DEFAULT_CITY, profile.city);
        assert_eq!("Alice Tester", profile.full_name);
        assert!(!profile.following);
    }
}
