pub mod fetcher;
pub mod parser;

use serde::{Deserialize, Serialize};

/// One feed entry selected for summarization.
///
/// Items keep the position they had in the feed document; the digest is
/// rendered in that order regardless of when each summary arrives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    /// Position within the selected items, 0-based and contiguous.
    pub index: usize,
    pub title: String,
    /// Description exactly as the feed carried it, markup included.
    pub description: String,
    /// Description reduced to its text content, whitespace collapsed.
    pub plain_description: String,
    pub link: String,
    pub comments_link: Option<String>,
}

/// A parsed feed document: the channel title plus the selected items.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub title: String,
    pub items: Vec<FeedItem>,
}
