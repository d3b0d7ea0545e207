use crate::config::Config;
use crate::notify::LoggingNotifier;

use blog_db::{Db, GetDb};
use blog_domain::blog::repo::DelegateBlogRepo;
use blog_domain::comment::repo::DelegateCommentRepo;
use blog_domain::favorite::repo::DelegateFavoriteRepo;
use blog_domain::notify::DelegateNotifier;
use blog_domain::profile::repo::DelegateProfileRepo;
use blog_domain::rating::repo::DelegateRatingRepo;
use blog_domain::reaction::repo::DelegateReactionRepo;
use blog_domain::social_graph::DelegateFollowRepo;
use blog_domain::user::repo::DelegateUserRepo;

use entrait::*;
use std::sync::Arc;

#[derive(Clone)]
pub struct App {
    pub config: Arc<Config>,
    pub db: Db,
}

impl GetDb for App {
    fn get_db(&self) -> &Db {
        &self.db
    }
}

#[entrait(pub GetFromEmail)]
fn get_from_email(app: &App) -> &str {
    &app.config.default_from_email
}

impl DelegateUserRepo<Self> for App {
    type Target = blog_db::user::PgUserRepo;
}

impl DelegateProfileRepo<Self> for App {
    type Target = blog_db::profile::PgProfileRepo;
}

impl DelegateFollowRepo<Self> for App {
    type Target = blog_db::follow::PgFollowRepo;
}

impl DelegateBlogRepo<Self> for App {
    type Target = blog_db::blog::PgBlogRepo;
}

impl DelegateCommentRepo<Self> for App {
    type Target = blog_db::comment::PgCommentRepo;
}

impl DelegateRatingRepo<Self> for App {
    type Target = blog_db::rating::PgRatingRepo;
}

impl DelegateReactionRepo<Self> for App {
    type Target = blog_db::reaction::PgReactionRepo;
}

impl DelegateFavoriteRepo<Self> for App {
    type Target = blog_db::favorite::PgFavoriteRepo;
}

impl DelegateNotifier<Self> for App {
    type Target = LoggingNotifier;
}
