use crate::config::RunConfig;
use crate::error::Result;
use crate::feed::fetcher::FeedFetcher;
use crate::feed::parser::FeedParser;
use crate::feed::FeedItem;
use crate::summary::provider::{OpenAiProvider, SummaryProvider};
use crate::summary::{PromptTemplate, SummaryRequester, SummaryResult};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// The collected outcome of one digest run.
#[derive(Debug)]
pub struct Digest {
    pub feed_title: String,
    pub results: Vec<SummaryResult>,
    pub failed: usize,
}

/// Drives one run end to end: fetch the feed, parse and select items, fan
/// out one summary request per item, and collect the survivors in feed
/// order.
///
/// The feed fetch completes and parses before any summary request goes
/// out. The summary requests themselves are all issued at once and have no
/// ordering dependency on each other.
pub struct DigestPipeline {
    fetcher: FeedFetcher,
    parser: FeedParser,
    requester: SummaryRequester,
    rss_url: String,
    max_items: usize,
}

impl DigestPipeline {
    pub fn new(
        fetcher: FeedFetcher,
        provider: Arc<dyn SummaryProvider>,
        prompt: PromptTemplate,
        language: impl Into<String>,
        rss_url: impl Into<String>,
        max_items: usize,
    ) -> Self {
        Self {
            fetcher,
            parser: FeedParser::new(),
            requester: SummaryRequester::new(provider, prompt, language),
            rss_url: rss_url.into(),
            max_items,
        }
    }

    /// Wire a pipeline from resolved run parameters.
    pub fn from_config(config: &RunConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout);

        let provider = OpenAiProvider::new(&config.api_key)
            .with_api_url(&config.api_url)
            .with_model(&config.model)
            .with_timeout(timeout);

        let prompt = config
            .prompt
            .as_deref()
            .map(PromptTemplate::new)
            .unwrap_or_default();

        Self::new(
            FeedFetcher::new().with_timeout(timeout),
            Arc::new(provider),
            prompt,
            &config.language,
            &config.rss_url,
            config.max_items,
        )
    }

    pub async fn run(&self) -> Result<Digest> {
        info!("Fetching feed from {}", self.rss_url);
        let raw = self.fetcher.fetch(&self.rss_url).await?;

        let feed = self.parser.parse(&raw, self.max_items)?;
        info!("Summarizing {} items from '{}'", feed.items.len(), feed.title);

        let (results, failed) = self.summarize(&feed.items).await;

        Ok(Digest {
            feed_title: feed.title,
            results,
            failed,
        })
    }

    /// Issue one summary request per item, all at once, and wait for every
    /// request to settle. Failed items are logged and dropped; the
    /// survivors come back sorted by feed position.
    pub async fn summarize(&self, items: &[FeedItem]) -> (Vec<SummaryResult>, usize) {
        let requests = items
            .iter()
            .map(|item| async move { (item, self.requester.request(item).await) });

        let settled = join_all(requests).await;

        let mut results = Vec::with_capacity(settled.len());
        let mut failed = 0;
        for (item, outcome) in settled {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    failed += 1;
                    error!("Summary for '{}' failed: {}", item.title, e);
                }
            }
        }

        results.sort_by_key(|result| result.index);

        (results, failed)
    }
}
