use crate::error::{Error, Result};
use crate::feed::{FeedItem, ParsedFeed};
use rss::Channel;
use select::document::Document;
use tracing::warn;

pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an RSS document and select up to `max_items` entries, in
    /// document order.
    ///
    /// Selection happens before validation: only the first `max_items`
    /// elements are considered at all. An element missing its title,
    /// description, or link is logged and skipped; the surviving items are
    /// re-indexed so that indices stay contiguous.
    pub fn parse(&self, raw: &str, max_items: usize) -> Result<ParsedFeed> {
        let channel = raw
            .parse::<Channel>()
            .map_err(|e| Error::FeedParse(format!("Failed to parse feed: {}", e)))?;

        let mut items = Vec::new();
        for entry in channel.items().iter().take(max_items) {
            let title = match entry.title().map(str::trim) {
                Some(t) if !t.is_empty() => t.to_string(),
                _ => {
                    warn!("Skipping feed item without a title");
                    continue;
                }
            };

            let link = match entry.link().map(str::trim) {
                Some(l) if !l.is_empty() => l.to_string(),
                _ => {
                    warn!("Skipping feed item '{}' without a link", title);
                    continue;
                }
            };

            let description = match entry.description() {
                Some(d) => d.to_string(),
                None => {
                    warn!("Skipping feed item '{}' without a description", title);
                    continue;
                }
            };

            let plain_description = strip_markup(&description);

            items.push(FeedItem {
                index: items.len(),
                title,
                description,
                plain_description,
                link,
                comments_link: entry.comments().map(|c| c.trim().to_string()),
            });
        }

        Ok(ParsedFeed {
            title: channel.title().to_string(),
            items,
        })
    }

    pub fn validate_feed_url(&self, url: &str) -> Result<()> {
        let parsed_url = url::Url::parse(url)
            .map_err(|e| Error::InvalidUrl(format!("Invalid URL: {}", e)))?;

        match parsed_url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(Error::InvalidUrl(format!("Unsupported scheme: {}", scheme))),
        }
    }
}

/// Reduce an HTML fragment to its text content, with runs of whitespace
/// collapsed to single spaces.
fn strip_markup(raw: &str) -> String {
    let document = Document::from(raw);
    let text = document
        .nth(0)
        .map(|node| node.text())
        .unwrap_or_default();

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
