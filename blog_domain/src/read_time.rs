//! Estimated reading time of a blog post.
//!
//! Every whitespace separated token of the title, body, description and tags
//! counts as a word. A post with a banner image gets a fixed extra sixth of a
//! minute for looking at the picture.

use std::fmt;

pub const WORDS_PER_MINUTE: f64 = 250.0;

/// One sixth of a minute, rounded to three decimals.
pub const BANNER_IMAGE_ADJUSTMENT: f64 = 0.167;

/// The parts of a post that contribute to its reading time.
#[derive(Clone, Copy, Default)]
pub struct PostContent<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub description: &'a str,
    pub tags: &'a [String],
    pub has_banner_image: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadTime {
    Seconds(u64),
    Minutes(u64),
}

impl fmt::Display for ReadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds(seconds) => write!(f, "{seconds} second(s)"),
            Self::Minutes(minutes) => write!(f, "{minutes} minute(s)"),
        }
    }
}

impl serde::Serialize for ReadTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn word_count(post: &PostContent<'_>) -> usize {
    [post.title, post.body, post.description]
        .into_iter()
        .chain(post.tags.iter().map(String::as_str))
        .map(|text| text.split_whitespace().count())
        .sum()
}

/// Estimate how long `post` takes to read.
///
/// Returns `None` for a post without any words, there is nothing sensible to show then.
pub fn estimate_read_time(post: &PostContent<'_>) -> Option<ReadTime> {
    let words = word_count(post);
    if words == 0 {
        return None;
    }

    let adjustment = if post.has_banner_image {
        BANNER_IMAGE_ADJUSTMENT
    } else {
        0.0
    };
    let minutes = words as f64 / WORDS_PER_MINUTE;

    Some(if minutes < 1.0 {
        ReadTime::Seconds(((minutes + adjustment) * 60.0).round() as u64)
    } else {
        ReadTime::Minutes((minutes + adjustment).round() as u64)
    })
}
