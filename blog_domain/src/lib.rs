pub mod blog;
pub mod comment;
pub mod error;
pub mod favorite;
pub mod notify;
pub mod profile;
pub mod rating;
pub mod reaction;
pub mod read_time;
pub mod social_graph;
pub mod user;

pub mod iter_util;
