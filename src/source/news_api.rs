//! NewsAPI (`/v2/everything`) source implementation.
//!
//! The HTTP round trip lives in [`NewsSource::fetch`]; turning a response
//! body into headlines is the pure [`NewsApiSource::parse_response`] so that
//! tests can exercise it without the network.

use std::time::Duration;

use chrono::Utc;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::headline::Article;
use super::{FetchQuery, Headline, NewsSource, SourceError, MAX_ARTICLES};

/// A NewsAPI-compatible endpoint.
pub struct NewsApiSource {
    client: Client,
    endpoint: String,
    api_key: String,
}

/// Top-level response body.  Errors come back as
/// `{ "status": "error", "code": "...", "message": "..." }`.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

impl NewsApiSource {
    /// Create a source for `endpoint` (e.g.
    /// `https://newsapi.org/v2/everything`) authenticated with `api_key`.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!("headline-tui/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Decode a response body into at most [`MAX_ARTICLES`] headlines.
    ///
    /// Articles that cannot become a [`Headline`] (no title, removed, bad
    /// timestamp) are skipped; they do not fail the batch.
    pub fn parse_response(body: &str) -> Result<Vec<Headline>, SourceError> {
        let envelope: Envelope = serde_json::from_str(body)?;

        if envelope.status == "error" {
            return Err(SourceError::Upstream {
                code: envelope.code.unwrap_or_else(|| "unknown".into()),
                message: envelope.message.unwrap_or_default(),
            });
        }

        let headlines = envelope
            .articles
            .into_iter()
            .filter_map(|article| match Headline::try_from(article) {
                Ok(headline) => Some(headline),
                Err(reason) => {
                    tracing::debug!(%reason, "skipping article");
                    None
                }
            })
            .take(MAX_ARTICLES)
            .collect();

        Ok(headlines)
    }
}

impl NewsSource for NewsApiSource {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    fn fetch(&self, query: &FetchQuery) -> Result<Vec<Headline>, SourceError> {
        let from = query.from.format("%Y-%m-%d").to_string();
        let to = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        let page_size = MAX_ARTICLES.to_string();

        // `without_url` keeps the api key (a query parameter) out of logs.
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query.topic.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("sortBy", query.sort_by.as_param()),
                ("language", query.language.as_str()),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .map_err(|e| SourceError::Transport(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SourceError::Transport(e.without_url()))?;

        if !status.is_success() {
            // NewsAPI explains most failures (bad key, rate limit) in a JSON
            // body; prefer that over the bare status.
            return Err(match Self::parse_response(&body) {
                Err(upstream @ SourceError::Upstream { .. }) => upstream,
                _ => SourceError::Status {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let headlines = Self::parse_response(&body)?;
        tracing::info!(
            topic = %query.topic,
            count = headlines.len(),
            "fetched headlines"
        );
        Ok(headlines)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
