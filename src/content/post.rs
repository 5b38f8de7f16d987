//! Post models
//!
//! The summary shown in the post list, the full detail shown on a post
//! page, and one page of summaries as the content source returns them.

use chrono::{DateTime, FixedOffset};
use tracing::warn;

use crate::api::{ApiError, Document};
use crate::content::richtext::{self, Block};

/// Reading speed used for the reading time estimate
const WORDS_PER_MINUTE: usize = 200;

/// The reduced fields of a post needed for list display
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    /// Document uid, doubles as the URL slug
    pub uid: String,

    /// First publication date, absent on unpublished previews
    pub publication_date: Option<DateTime<FixedOffset>>,

    /// Post title
    pub title: String,

    /// One-line subtitle shown under the title
    pub subtitle: String,

    /// Author display name
    pub author: String,
}

impl PostSummary {
    /// Normalize an API document into a summary
    ///
    /// Fails when the uid or a required text field is absent.
    pub fn from_document(doc: &Document) -> Result<Self, ApiError> {
        Ok(Self {
            uid: require(doc.uid.clone(), "uid", doc)?,
            publication_date: parse_publication_date(doc),
            title: require(doc.data.title.clone(), "title", doc)?,
            subtitle: require(doc.data.subtitle.clone(), "subtitle", doc)?,
            author: require(doc.data.author.clone(), "author", doc)?,
        })
    }
}

/// One page of summaries as returned by the content source
#[derive(Debug, Clone, PartialEq)]
pub struct PostPage {
    /// Opaque URL of the next page, null on the last one
    pub next_cursor: Option<String>,

    /// Summaries in display order
    pub posts: Vec<PostSummary>,
}

impl PostPage {
    /// Whether another page is available
    pub fn has_more(&self) -> bool {
        matches!(self.next_cursor.as_deref(), Some(cursor) if !cursor.is_empty())
    }
}

/// Full post detail for a post page
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Document uid, doubles as the URL slug
    pub uid: String,

    /// First publication date
    pub publication_date: Option<DateTime<FixedOffset>>,

    /// Post title
    pub title: String,

    /// Author display name
    pub author: String,

    /// Banner image URL, absent when the document has none
    pub banner_url: Option<String>,

    /// Heading-plus-body content sections
    pub sections: Vec<Section>,
}

/// One content section of a post
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: Option<String>,
    pub body: Vec<Block>,
}

impl Post {
    /// Normalize an API document into full post detail
    pub fn from_document(doc: &Document) -> Result<Self, ApiError> {
        let sections = doc
            .data
            .content
            .iter()
            .map(|section| Section {
                heading: section.heading.clone(),
                body: section.body.clone(),
            })
            .collect();

        Ok(Self {
            uid: require(doc.uid.clone(), "uid", doc)?,
            publication_date: parse_publication_date(doc),
            title: require(doc.data.title.clone(), "title", doc)?,
            author: require(doc.data.author.clone(), "author", doc)?,
            banner_url: doc.data.banner.as_ref().and_then(|b| b.url.clone()),
            sections,
        })
    }

    /// Whitespace-separated words across section headings and body text
    pub fn word_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| {
                let heading_words = section
                    .heading
                    .as_deref()
                    .map(|h| h.split_whitespace().count())
                    .unwrap_or(0);
                let body_words = richtext::as_text(&section.body).split_whitespace().count();
                heading_words + body_words
            })
            .sum()
    }

    /// Estimated reading time in minutes, rounded up
    pub fn reading_minutes(&self) -> usize {
        self.word_count().div_ceil(WORDS_PER_MINUTE)
    }
}

fn require(value: Option<String>, field: &'static str, doc: &Document) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::MissingField {
        field,
        id: doc.id.clone(),
    })
}

/// Parse the wire date, tolerating both RFC 3339 and the compact
/// `+0000` offset form the API serves
fn parse_publication_date(doc: &Document) -> Option<DateTime<FixedOffset>> {
    let raw = doc.first_publication_date.as_deref()?;
    match DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
    {
        Ok(date) => Some(date),
        Err(err) => {
            warn!("Unparseable publication date '{}' on {}: {}", raw, doc.id, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    fn document(value: serde_json::Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    fn full_document() -> Document {
        document(json!({
            "id": "XyZ123",
            "uid": "my-post",
            "type": "posts",
            "first_publication_date": "2021-04-15T19:25:28+0000",
            "data": {
                "title": "My post",
                "subtitle": "On things",
                "author": "Ada Lovelace",
                "banner": {"url": "https://images.example.com/banner.png"},
                "content": [
                    {
                        "heading": "Getting started",
                        "body": [
                            {"type": "paragraph", "text": "One two three four five.", "spans": []}
                        ]
                    }
                ]
            }
        }))
    }

    #[test]
    fn test_summary_from_document() {
        let summary = PostSummary::from_document(&full_document()).unwrap();
        assert_eq!(summary.uid, "my-post");
        assert_eq!(summary.title, "My post");
        assert_eq!(summary.subtitle, "On things");
        assert_eq!(summary.author, "Ada Lovelace");
        let date = summary.publication_date.unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2021, 4, 15));
    }

    #[test]
    fn test_summary_missing_uid() {
        let doc = document(json!({
            "id": "XyZ123",
            "uid": null,
            "type": "posts",
            "first_publication_date": null,
            "data": {"title": "t", "subtitle": "s", "author": "a"}
        }));
        let err = PostSummary::from_document(&doc).unwrap_err();
        match err {
            ApiError::MissingField { field, id } => {
                assert_eq!(field, "uid");
                assert_eq!(id, "XyZ123");
            }
            other => panic!("expected missing field error, got {other:?}"),
        }
    }

    #[test]
    fn test_summary_missing_title() {
        let doc = document(json!({
            "id": "XyZ123",
            "uid": "my-post",
            "type": "posts",
            "first_publication_date": null,
            "data": {"subtitle": "s", "author": "a"}
        }));
        let err = PostSummary::from_document(&doc).unwrap_err();
        assert!(matches!(err, ApiError::MissingField { field: "title", .. }));
    }

    #[test]
    fn test_unparseable_date_becomes_none() {
        let doc = document(json!({
            "id": "XyZ123",
            "uid": "my-post",
            "type": "posts",
            "first_publication_date": "yesterday-ish",
            "data": {"title": "t", "subtitle": "s", "author": "a"}
        }));
        let summary = PostSummary::from_document(&doc).unwrap();
        assert!(summary.publication_date.is_none());
    }

    #[test]
    fn test_rfc3339_date_accepted() {
        let doc = document(json!({
            "id": "XyZ123",
            "uid": "my-post",
            "type": "posts",
            "first_publication_date": "2021-04-15T19:25:28+00:00",
            "data": {"title": "t", "subtitle": "s", "author": "a"}
        }));
        let summary = PostSummary::from_document(&doc).unwrap();
        assert!(summary.publication_date.is_some());
    }

    #[test]
    fn test_post_from_document() {
        let post = Post::from_document(&full_document()).unwrap();
        assert_eq!(post.uid, "my-post");
        assert_eq!(
            post.banner_url.as_deref(),
            Some("https://images.example.com/banner.png")
        );
        assert_eq!(post.sections.len(), 1);
        assert_eq!(post.sections[0].heading.as_deref(), Some("Getting started"));
    }

    #[test]
    fn test_word_count_includes_headings() {
        let post = Post::from_document(&full_document()).unwrap();
        // "Getting started" = 2 words, body paragraph = 5 words
        assert_eq!(post.word_count(), 7);
        assert_eq!(post.reading_minutes(), 1);
    }

    #[test]
    fn test_reading_minutes_rounds_up() {
        let mut post = Post::from_document(&full_document()).unwrap();
        let long_text = "word ".repeat(401);
        post.sections = vec![Section {
            heading: None,
            body: vec![Block::Paragraph {
                text: long_text,
                spans: vec![],
            }],
        }];
        assert_eq!(post.word_count(), 401);
        assert_eq!(post.reading_minutes(), 3);
    }

    #[test]
    fn test_empty_post_reads_in_zero_minutes() {
        let mut post = Post::from_document(&full_document()).unwrap();
        post.sections.clear();
        assert_eq!(post.reading_minutes(), 0);
    }

    #[test]
    fn test_page_has_more() {
        let page = PostPage {
            next_cursor: Some("https://example.com/page/2".to_string()),
            posts: vec![],
        };
        assert!(page.has_more());

        let page = PostPage {
            next_cursor: Some(String::new()),
            posts: vec![],
        };
        assert!(!page.has_more());

        let page = PostPage {
            next_cursor: None,
            posts: vec![],
        };
        assert!(!page.has_more());
    }
}
