//! Concurrent multi-URL page fetcher.
//!
//! The crawler takes every URL of a batch at once, fetches them concurrently
//! under a semaphore, and converts each response to normalized Markdown text.
//! Failures never escape: a URL that cannot be fetched or converted is
//! reported with no content.

use std::collections::HashSet;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};
use url::Url;

use storyfeed_shared::{ContentFetcher, CrawlSettings, CrawledPage, Result, StoryfeedError};

/// User-Agent string for crawl requests.
const USER_AGENT: &str = concat!("storyfeed/", env!("CARGO_PKG_VERSION"));

/// How a response body is turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Html,
    PlainText,
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Concurrent page fetcher shared across all batches of a run.
pub struct Crawler {
    client: Client,
    semaphore: Semaphore,
    /// Allow localhost/private IPs (for tests with mock servers).
    allow_localhost: bool,
}

impl Crawler {
    /// Create a new crawler from the `[crawl]` config section.
    pub fn new(config: &CrawlSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| StoryfeedError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            semaphore: Semaphore::new(config.concurrency.max(1)),
            allow_localhost: false,
        })
    }

    /// Allow crawling localhost/private IPs (for tests).
    #[cfg(test)]
    pub fn allow_localhost(mut self) -> Self {
        self.allow_localhost = true;
        self
    }

    /// Fetch one page and return its normalized text.
    async fn fetch_page(&self, raw_url: &str) -> Result<String> {
        let url = Url::parse(raw_url)
            .map_err(|e| StoryfeedError::parse(format!("invalid URL {raw_url}: {e}")))?;

        if !self.allow_localhost && is_ssrf_target(&url) {
            return Err(StoryfeedError::Network(format!(
                "{url}: blocked by SSRF protection"
            )));
        }

        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| StoryfeedError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoryfeedError::Network(format!("{url}: HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let Some(kind) = body_kind(content_type.as_deref()) else {
            return Err(StoryfeedError::Conversion(format!(
                "{url}: unsupported content type {}",
                content_type.unwrap_or_default()
            )));
        };

        let body = response
            .text()
            .await
            .map_err(|e| StoryfeedError::Network(format!("{url}: body read failed: {e}")))?;

        let text = match kind {
            BodyKind::Html => storyfeed_markdown::html_to_markdown(&body, url.as_str())?,
            BodyKind::PlainText => storyfeed_markdown::normalize_text(&body),
        };

        if text.trim().is_empty() {
            return Err(StoryfeedError::fetch_empty(url.as_str()));
        }

        Ok(text)
    }
}

#[async_trait]
impl ContentFetcher for Crawler {
    #[instrument(skip_all, fields(urls = urls.len()))]
    async fn crawl_many(&self, urls: &[String]) -> Vec<CrawledPage> {
        let start = Instant::now();

        let mut seen = HashSet::new();
        let unique: Vec<&String> = urls.iter().filter(|u| seen.insert(u.as_str())).collect();

        let fetches = unique.into_iter().map(|url| async move {
            let Ok(_permit) = self.semaphore.acquire().await else {
                return CrawledPage {
                    url: url.clone(),
                    content: None,
                };
            };

            let content = match self.fetch_page(url).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(%url, error = %e, "crawl failed");
                    None
                }
            };

            CrawledPage {
                url: url.clone(),
                content,
            }
        });

        let pages = join_all(fetches).await;

        let with_content = pages.iter().filter(|p| p.content.is_some()).count();
        info!(
            pages = pages.len(),
            with_content,
            empty = pages.len() - with_content,
            duration_ms = start.elapsed().as_millis(),
            "crawl completed"
        );

        pages
    }
}

/// Classify a response by its `Content-Type`. A missing header is treated as HTML.
fn body_kind(content_type: Option<&str>) -> Option<BodyKind> {
    let Some(ct) = content_type else {
        return Some(BodyKind::Html);
    };
    let mime = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();

    match mime.as_str() {
        "text/html" | "application/xhtml+xml" => Some(BodyKind::Html),
        "text/plain" | "text/markdown" | "text/x-markdown" => Some(BodyKind::PlainText),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

/// Check if a URL targets a potentially dangerous resource.
fn is_ssrf_target(url: &Url) -> bool {
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    match url.host() {
        Some(url::Host::Ipv4(v4)) => is_private_ip(&IpAddr::V4(v4)),
        Some(url::Host::Ipv6(v6)) => is_private_ip(&IpAddr::V6(v6)),
        Some(url::Host::Domain(host)) => {
            host == "localhost" || host.ends_with(".local") || host.ends_with(".internal")
        }
        None => true,
    }
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (Carrier-grade NAT)
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64)
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}
