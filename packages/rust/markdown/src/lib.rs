//! HTML-to-Markdown conversion for crawled story pages.
//!
//! Converts a fetched article page to clean Markdown using the `htmd` crate,
//! after cutting the page down to its main content, then applies a series of
//! cleanup passes. The result is the "page content" the rewriter sees and the
//! record set stores as the original text.

mod cleanup;

use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use storyfeed_shared::{Result, StoryfeedError};

/// Tags whose content never belongs in article text.
const SKIP_TAGS: [&str; 10] = [
    "script", "style", "nav", "header", "footer", "aside", "iframe", "noscript", "svg", "form",
];

/// Containers that usually hold an article body, in priority order.
const CONTENT_SELECTORS: [&str; 9] = [
    "article",
    "main article",
    "[role=\"main\"]",
    "main",
    ".post-content",
    ".entry-content",
    ".article-body",
    "#content",
    ".content",
];

/// Convert a full HTML document to Markdown.
///
/// 1. Picks the main content container (falls back to `<body>`)
/// 2. Converts HTML → Markdown via `htmd`, skipping page chrome
/// 3. Runs the cleanup pipeline, resolving relative links against `source_url`
#[instrument(skip(html), fields(url = %source_url, html_len = html.len()))]
pub fn html_to_markdown(html: &str, source_url: &str) -> Result<String> {
    let doc = Html::parse_document(html);
    let content_html = extract_content_html(&doc).unwrap_or_else(|| html.to_string());

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(SKIP_TAGS.to_vec())
        .build();

    let raw_markdown = converter
        .convert(&content_html)
        .map_err(|e| StoryfeedError::Conversion(format!("htmd conversion failed: {e}")))?;

    let base_url = Url::parse(source_url).ok();
    let markdown = cleanup::run_pipeline(&raw_markdown, base_url.as_ref());

    debug!(
        raw_len = raw_markdown.len(),
        final_len = markdown.len(),
        "page converted"
    );

    Ok(markdown)
}

/// Normalize a plain-text response body the same way converted pages are.
pub fn normalize_text(text: &str) -> String {
    cleanup::run_pipeline(text, None)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Inner HTML of the first matching content container that carries text.
fn extract_content_html(doc: &Html) -> Option<String> {
    for sel_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(sel_str) else {
            continue;
        };
        if let Some(el) = doc.select(&selector).next() {
            if el.text().any(|t| !t.trim().is_empty()) {
                return Some(el.inner_html());
            }
        }
    }

    let body = Selector::parse("body").ok()?;
    doc.select(&body).next().map(|el| el.inner_html())
}
