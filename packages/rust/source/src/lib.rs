//! Hacker News story id source.
//!
//! Resolves the current top-story ranking and per-story metadata from the
//! public Firebase API (`/topstories.json`, `/item/<id>.json`). One HTTP
//! client is shared by every request of a run.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use storyfeed_shared::{Result, SourceConfig, StoryDetails, StoryId, StoryIdSource, StoryfeedError};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("storyfeed/", env!("CARGO_PKG_VERSION"));

/// Story id source backed by the Hacker News API.
#[derive(Clone)]
pub struct HackerNewsSource {
    client: Client,
    base_url: String,
}

impl HackerNewsSource {
    /// Build a source from the `[source]` config section.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoryfeedError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_details(&self, id: StoryId) -> Result<Option<StoryDetails>> {
        let url = format!("{}/item/{id}.json", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoryfeedError::SourceUnavailable(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoryfeedError::SourceUnavailable(format!(
                "{url}: HTTP {status}"
            )));
        }

        // Deleted or unknown items come back as a literal `null`.
        response
            .json::<Option<StoryDetails>>()
            .await
            .map_err(|e| StoryfeedError::parse(format!("{url}: {e}")))
    }
}

#[async_trait]
impl StoryIdSource for HackerNewsSource {
    #[instrument(skip(self))]
    async fn list_top_ids(&self, limit: usize) -> Result<Vec<StoryId>> {
        let url = format!("{}/topstories.json", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoryfeedError::SourceUnavailable(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoryfeedError::SourceUnavailable(format!(
                "{url}: HTTP {status}"
            )));
        }

        let ids: Vec<StoryId> = response
            .json()
            .await
            .map_err(|e| StoryfeedError::SourceUnavailable(format!("{url}: bad body: {e}")))?;

        let ranked: Vec<StoryId> = ids.into_iter().take(limit).collect();
        info!(count = ranked.len(), "fetched top story ids");
        Ok(ranked)
    }

    async fn fetch_details(&self, id: StoryId) -> Option<StoryDetails> {
        match self.get_details(id).await {
            Ok(Some(details)) => {
                debug!(%id, title = %details.title, "fetched story details");
                Some(details)
            }
            Ok(None) => {
                warn!(%id, "story not found");
                None
            }
            Err(e) => {
                warn!(%id, error = %e, "failed to fetch story");
                None
            }
        }
    }
}
