//! The post feed: an append-only list of summaries plus pagination state
//!
//! `PostFeed` is a value. Loading more posts produces a new feed rather
//! than mutating in place, so a failed load leaves the caller holding
//! exactly the state it had before. The next-page cursor is stored
//! verbatim and always reflects the most recently fetched page.

use tracing::debug;

use crate::api::{ContentApi, Result};
use crate::content::{PostPage, PostSummary};

/// Pagination state over the post list
#[derive(Debug, Clone, PartialEq)]
pub struct PostFeed {
    posts: Vec<PostSummary>,
    next_cursor: Option<String>,
}

impl PostFeed {
    /// Seed a feed from the initial page
    pub fn new(initial_page: PostPage) -> Self {
        Self {
            posts: initial_page.posts,
            next_cursor: initial_page.next_cursor,
        }
    }

    /// Posts in display order
    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    /// Whether another page is available
    ///
    /// True iff the most recently fetched page carried a non-empty
    /// next-page cursor.
    pub fn has_more(&self) -> bool {
        matches!(self.next_cursor.as_deref(), Some(cursor) if !cursor.is_empty())
    }

    /// The stored next-page cursor, if any
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    /// Append one fetched page
    ///
    /// Existing posts keep their order; the page's posts follow them
    /// unchanged. Duplicate uids are kept as they arrive. The stored
    /// cursor is replaced by the page's, whatever the previous value.
    pub fn append(mut self, page: PostPage) -> Self {
        self.posts.extend(page.posts);
        self.next_cursor = page.next_cursor;
        self
    }

    /// Fetch the next page and append it
    ///
    /// Returns the grown feed on success. On failure the error is
    /// returned and the caller's feed is untouched. Calling on an
    /// exhausted feed returns it unchanged.
    pub async fn load_more(&self, api: &ContentApi) -> Result<Self> {
        let cursor = match self.next_cursor.as_deref() {
            Some(cursor) if !cursor.is_empty() => cursor,
            _ => {
                debug!("Load more called on an exhausted feed");
                return Ok(self.clone());
            }
        };

        let page = api.fetch_more(cursor).await?;
        Ok(self.clone().append(page))
    }

    /// Follow cursors until the feed is exhausted
    pub async fn load_all(self, api: &ContentApi) -> Result<Self> {
        let mut feed = self;
        while feed.has_more() {
            feed = feed.load_more(api).await?;
        }
        Ok(feed)
    }
}
