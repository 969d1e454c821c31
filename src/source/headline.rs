//! The article record shared by the news source, the snapshot store and the
//! feed.
//!
//! `Headline` is what the rest of the application works with.  On the wire
//! (both the HTTP response and the snapshot file) an article has the NewsAPI
//! shape:
//!
//! ```json
//! { "title": "...", "author": "...", "source": { "name": "..." },
//!   "urlToImage": "...", "publishedAt": "2024-10-20T10:00:00Z", "url": "..." }
//! ```
//!
//! Conversion from that shape goes through [`TryFrom<Article>`], which is
//! where ingestion rules live: articles with no title, no usable timestamp,
//! or NewsAPI's `"[Removed]"` placeholder are rejected.

use std::fmt;
use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Title NewsAPI substitutes for articles taken down after indexing.
const REMOVED_TITLE: &str = "[Removed]";

/// Synthetic identity of a headline.
///
/// The upstream API has no stable article id, and titles alone collide, so
/// the id is derived from title, publication time and source name.  It is
/// never serialized: decoding a snapshot recomputes the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeadlineId(String);

impl HeadlineId {
    fn derive(title: &str, published_at: &DateTime<Utc>, source_name: Option<&str>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update([0u8]);
        hasher.update(published_at.to_rfc3339_opts(SecondsFormat::AutoSi, true).as_bytes());
        hasher.update([0u8]);
        hasher.update(source_name.unwrap_or_default().as_bytes());
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(16);
        for b in &digest[..8] {
            let _ = write!(hex, "{b:02x}");
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HeadlineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single news article, immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Article", into = "Article")]
pub struct Headline {
    /// Identity used for pinning, deletion and de-duplication.
    pub id: HeadlineId,
    pub title: String,
    pub author: Option<String>,
    /// Display name of the publisher (e.g. "Reuters").
    pub source_name: Option<String>,
    pub image_url: Option<String>,
    /// Link to the full article.
    pub url: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl Headline {
    pub fn new(
        title: impl Into<String>,
        author: Option<String>,
        source_name: Option<String>,
        image_url: Option<String>,
        url: Option<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        let title = title.into();
        let id = HeadlineId::derive(&title, &published_at, source_name.as_deref());
        Self {
            id,
            title,
            author,
            source_name,
            image_url,
            url,
            published_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

/// An article as the news API (and the snapshot file) spells it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: Option<String>,
    pub author: Option<String>,
    pub source: Option<ArticleSource>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Why an article was not turned into a [`Headline`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejected {
    #[error("article has no title")]
    MissingTitle,
    #[error("article was removed upstream")]
    Removed,
    #[error("article has no publication date")]
    MissingDate,
    #[error("unparseable publication date {0:?}")]
    BadDate(String),
}

impl TryFrom<Article> for Headline {
    type Error = Rejected;

    fn try_from(article: Article) -> Result<Self, Self::Error> {
        let title = match article.title {
            Some(t) if t.trim().is_empty() => return Err(Rejected::MissingTitle),
            Some(t) if t == REMOVED_TITLE => return Err(Rejected::Removed),
            Some(t) => t,
            None => return Err(Rejected::MissingTitle),
        };

        let raw_date = article.published_at.ok_or(Rejected::MissingDate)?;
        let published_at = DateTime::parse_from_rfc3339(&raw_date)
            .map_err(|_| Rejected::BadDate(raw_date.clone()))?
            .with_timezone(&Utc);

        Ok(Headline::new(
            title,
            article.author,
            article.source.and_then(|s| s.name),
            article.url_to_image,
            article.url,
            published_at,
        ))
    }
}

impl From<Headline> for Article {
    fn from(headline: Headline) -> Self {
        Article {
            title: Some(headline.title),
            author: headline.author,
            source: Some(ArticleSource {
                id: None,
                name: headline.source_name,
            }),
            url_to_image: headline.image_url,
            published_at: Some(
                headline
                    .published_at
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ),
            url: headline.url,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 20, hour, 0, 0).unwrap()
    }

    #[test]
    fn id_is_stable_for_identical_inputs() {
        let a = Headline::new("Tesla unveils X", None, Some("Reuters".into()), None, None, ts(10));
        let b = Headline::new("Tesla unveils X", Some("Jane".into()), Some("Reuters".into()), None, None, ts(10));
        assert_eq!(a.id, b.id, "author does not take part in identity");
        assert_eq!(a.id.as_str().len(), 16);
    }

    #[test]
    fn same_title_from_different_sources_does_not_collide() {
        let a = Headline::new("Tesla Q3 earnings", None, Some("Reuters".into()), None, None, ts(9));
        let b = Headline::new("Tesla Q3 earnings", None, Some("Bloomberg".into()), None, None, ts(9));
        let c = Headline::new("Tesla Q3 earnings", None, Some("Reuters".into()), None, None, ts(11));
        assert_ne!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn sub_second_times_keep_ids_apart() {
        let a = Headline::new("Tesla Q3 earnings", None, None, None, None, ts(9));
        let b = Headline::new(
            "Tesla Q3 earnings",
            None,
            None,
            None,
            None,
            ts(9) + chrono::Duration::milliseconds(123),
        );
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn fractional_seconds_survive_encoding() {
        let at = ts(10) + chrono::Duration::milliseconds(123);
        let headline = Headline::new("Tesla unveils X", None, None, None, None, at);

        let value = serde_json::to_value(&headline).unwrap();
        assert_eq!(value["publishedAt"], "2024-10-20T10:00:00.123Z");

        let back: Headline = serde_json::from_value(value).unwrap();
        assert_eq!(back.published_at, at);
        assert_eq!(back.id, headline.id);
    }

    #[test]
    fn decodes_news_api_article() {
        let json = r#"{
            "source": { "id": null, "name": "The Verge" },
            "author": "Jane Doe",
            "title": "Tesla unveils X",
            "url": "https://example.com/x",
            "urlToImage": "https://example.com/x.png",
            "publishedAt": "2024-10-20T10:00:00Z",
            "content": "ignored"
        }"#;

        let headline: Headline = serde_json::from_str(json).unwrap();
        assert_eq!(headline.title, "Tesla unveils X");
        assert_eq!(headline.author.as_deref(), Some("Jane Doe"));
        assert_eq!(headline.source_name.as_deref(), Some("The Verge"));
        assert_eq!(headline.image_url.as_deref(), Some("https://example.com/x.png"));
        assert_eq!(headline.published_at, ts(10));
    }

    #[test]
    fn encoding_keeps_the_article_shape() {
        let headline = Headline::new(
            "Tesla unveils X",
            None,
            Some("Reuters".into()),
            Some("https://example.com/x.png".into()),
            None,
            ts(10),
        );
        let value = serde_json::to_value(&headline).unwrap();
        assert_eq!(value["source"]["name"], "Reuters");
        assert_eq!(value["urlToImage"], "https://example.com/x.png");
        assert_eq!(value["publishedAt"], "2024-10-20T10:00:00Z");
        assert!(value.get("id").is_none(), "id is derived, never stored");

        let back: Headline = serde_json::from_value(value).unwrap();
        assert_eq!(back, headline);
    }

    #[test]
    fn rejects_removed_placeholder() {
        let article = Article {
            title: Some("[Removed]".into()),
            published_at: Some("2024-10-20T10:00:00Z".into()),
            ..Article::default()
        };
        assert_eq!(Headline::try_from(article), Err(Rejected::Removed));
    }

    #[test]
    fn rejects_missing_title_and_bad_date() {
        let untitled = Article {
            published_at: Some("2024-10-20T10:00:00Z".into()),
            ..Article::default()
        };
        assert_eq!(Headline::try_from(untitled), Err(Rejected::MissingTitle));

        let bad_date = Article {
            title: Some("Title".into()),
            published_at: Some("yesterday".into()),
            ..Article::default()
        };
        assert_eq!(
            Headline::try_from(bad_date),
            Err(Rejected::BadDate("yesterday".into()))
        );
    }

    #[test]
    fn missing_source_maps_to_none() {
        let article = Article {
            title: Some("Title".into()),
            published_at: Some("2024-10-20T10:00:00+02:00".into()),
            ..Article::default()
        };
        let headline = Headline::try_from(article).unwrap();
        assert!(headline.source_name.is_none());
        assert_eq!(headline.published_at, ts(8), "offsets normalise to UTC");
    }
}
