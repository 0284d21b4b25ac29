use crate::feed::FeedItem;
use crate::summary::SummaryResult;
use chrono::Utc;
use regex::Regex;

/// Renders feed items and their summaries into the digest page markup.
///
/// All feed and model text is escaped before it reaches the page. The only
/// markup that survives is what the renderer itself emits, including the
/// `<b>` tags rebuilt from `**` emphasis markers in the summary text.
pub struct HtmlRenderer {
    emphasis: Regex,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self {
            emphasis: Regex::new(r"\*\*(.*?)\*\*").expect("Failed to compile emphasis pattern"),
        }
    }

    /// Escape summary text, then turn `**text**` marker pairs into `<b>` tags.
    pub fn summary_html(&self, summary: &str) -> String {
        let escaped = html_escape::encode_text(summary);
        self.emphasis.replace_all(&escaped, "<b>${1}</b>").into_owned()
    }

    /// One `<li>` digest entry: bolded title, summary, and the item's links.
    pub fn render_entry(&self, item: &FeedItem, summary: &str) -> String {
        let mut entry = String::new();

        entry.push_str("<li>\n");
        entry.push_str(&format!(
            "  <p class=\"title\"><b>{}</b></p>\n",
            html_escape::encode_text(&item.title)
        ));
        entry.push_str(&format!(
            "  <p class=\"summary\"><b>Summary:</b> {} <a href=\"{}\" target=\"_blank\">[Link]</a>",
            self.summary_html(summary),
            html_escape::encode_double_quoted_attribute(&item.link)
        ));

        if let Some(comments) = &item.comments_link {
            entry.push_str(&format!(
                "&nbsp;<a href=\"{}\" target=\"_blank\">[Comments]</a>",
                html_escape::encode_double_quoted_attribute(comments)
            ));
        }

        entry.push_str("</p>\n</li>");
        entry
    }
}

/// Assemble the full digest page around the already-rendered entries.
/// Entries appear exactly in the order given.
pub fn render_page(feed_title: &str, results: &[SummaryResult]) -> String {
    let title = if feed_title.trim().is_empty() {
        "RSS Digest"
    } else {
        feed_title
    };

    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str(&format!(
        "<title>{}</title>\n",
        html_escape::encode_text(title)
    ));
    page.push_str("</head>\n<body>\n");
    page.push_str(&format!("<h1>{}</h1>\n", html_escape::encode_text(title)));
    page.push_str("<ul id=\"main\">\n");

    for result in results {
        page.push_str(&result.html);
        page.push('\n');
    }

    page.push_str("</ul>\n");
    page.push_str(&format!(
        "<p class=\"generated\">Generated {}</p>\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    page.push_str("</body>\n</html>\n");
    page
}
