pub mod provider;

use crate::error::Result;
use crate::feed::FeedItem;
use crate::render::HtmlRenderer;
use provider::SummaryProvider;
use std::sync::Arc;
use tracing::debug;

/// Instructions sent for every feed item unless the user supplies their own
/// template. `{title}`, `{description}`, and `{language}` are substituted
/// per item.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "In 1-3 sentences, explain why this might be \
interesting, define any tech jargon in 1-2 sentences, and bold with HTML <b> any keywords. \
Respond in this language: {language}. INPUT: {title}";

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn render(&self, item: &FeedItem, language: &str) -> String {
        self.template
            .replace("{title}", &item.title)
            .replace("{description}", &item.plain_description)
            .replace("{language}", language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT_TEMPLATE)
    }
}

/// Outcome of one summary request, keyed by the item's feed position.
#[derive(Debug, Clone)]
pub struct SummaryResult {
    pub index: usize,
    pub html: String,
}

/// Builds the prompt for one feed item, asks the provider for a summary,
/// and renders the item's digest entry.
pub struct SummaryRequester {
    provider: Arc<dyn SummaryProvider>,
    prompt: PromptTemplate,
    language: String,
    renderer: HtmlRenderer,
}

impl SummaryRequester {
    pub fn new(
        provider: Arc<dyn SummaryProvider>,
        prompt: PromptTemplate,
        language: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            prompt,
            language: language.into(),
            renderer: HtmlRenderer::new(),
        }
    }

    pub async fn request(&self, item: &FeedItem) -> Result<SummaryResult> {
        let prompt = self.prompt.render(item, &self.language);
        debug!("Prompt: {}", prompt);

        let summary = self.provider.complete(&prompt).await?;

        Ok(SummaryResult {
            index: item.index,
            html: self.renderer.render_entry(item, &summary),
        })
    }
}
