//! News source abstraction layer.
//!
//! This module defines the [`NewsSource`] trait, the [`FetchQuery`] it is
//! called with, and the common [`Headline`] type.  The concrete HTTP client
//! is [`NewsApiSource`].
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `gnews.rs`).
//! 2. Define a struct holding its configuration and implement [`NewsSource`].
//! 3. Add `mod gnews;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of [`NewsApiSource`].
//!
//! The fetch worker, the feed state and the UI are all source-agnostic.

mod headline;
mod news_api;

pub use headline::{Headline, HeadlineId};
pub use news_api::NewsApiSource;

use chrono::NaiveDate;
use serde::Deserialize;

/// Upper bound on the number of articles a single fetch returns.
pub const MAX_ARTICLES: usize = 100;

/// Ordering the upstream service applies to results.  The client never
/// re-sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    PublishedAt,
    Popularity,
    Relevancy,
}

impl SortBy {
    pub fn as_param(self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Popularity => "popularity",
            SortBy::Relevancy => "relevancy",
        }
    }
}

/// What to ask the source for.  The upper date bound is always "today" and
/// is filled in by the source at fetch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchQuery {
    pub topic: String,
    /// Fixed lower bound of the publication date range.
    pub from: NaiveDate,
    pub sort_by: SortBy,
    pub language: String,
}

/// A failed fetch.  Sources report failures as values so the feed can tell
/// "no news" apart from "could not get news".
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream error {code}: {message}")]
    Upstream { code: String, message: String },
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Trait every news source must implement.
///
/// Fetches run on the background fetch worker, so implementations must be
/// [`Send`].
pub trait NewsSource: Send {
    /// Human-readable label used in logs and the status bar.
    fn name(&self) -> &str;

    /// Fetch at most [`MAX_ARTICLES`] headlines matching `query`, in the
    /// order the upstream service returns them.
    fn fetch(&self, query: &FetchQuery) -> Result<Vec<Headline>, SourceError>;
}
