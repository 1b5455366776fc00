//! Seams between the pipeline and its external collaborators.
//!
//! Every trait is object safe so the pipeline can take `&dyn` references and
//! tests can substitute in-memory fakes.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CrawledPage, Story, StoryDetails, StoryId};

/// Ranked story ids and per-story metadata.
#[async_trait]
pub trait StoryIdSource: Send + Sync {
    /// Current ranking, best first, at most `limit` ids.
    ///
    /// Fails with `SourceUnavailable` on a non-success response.
    async fn list_top_ids(&self, limit: usize) -> Result<Vec<StoryId>>;

    /// Metadata for one story. `None` on any failure or a missing item.
    async fn fetch_details(&self, id: StoryId) -> Option<StoryDetails>;
}

/// Retrieves normalized text for many URLs at once.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Best-effort crawl. URLs may be missing from the result or carry no content.
    async fn crawl_many(&self, urls: &[String]) -> Vec<CrawledPage>;
}

/// Produces a localized rewrite of a story.
#[async_trait]
pub trait Rewriter: Send + Sync {
    /// Raw response text. One call per story; callers do not retry.
    async fn rewrite(&self, title: &str, content: &str, target_language: &str) -> Result<String>;
}

/// Durable record set.
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Load the persisted stories. An unreadable document yields an empty set.
    async fn load(&self) -> Vec<Story>;

    /// Replace the persisted document with `stories`.
    async fn save(&self, stories: &[Story]) -> Result<()>;
}

/// Ids already present in a record set.
pub fn known_ids(stories: &[Story]) -> HashSet<StoryId> {
    stories.iter().map(|s| s.id).collect()
}
