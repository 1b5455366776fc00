//! End-to-end run: load → rank → dedup → batches (details → crawl → rewrite) → merge → save.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use storyfeed_rewriter::parse_rewrite_response;
use storyfeed_shared::{
    ContentFetcher, PipelineConfig, Result, Rewriter, Story, StoryDetails, StoryIdSource,
    StoryStore, StoryfeedError, StoryId, known_ids,
};

use crate::batch::{Pacer, plan_batches};
use crate::merge::{merge_latest, new_ids};

/// Outcome counters of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ids in the current ranking.
    pub ranked: usize,
    /// Stories loaded from the store.
    pub known: usize,
    /// Ranked ids not seen before.
    pub new_ids: usize,
    /// Batches launched.
    pub batches: usize,
    /// New stories fetched and rewritten successfully.
    pub processed: usize,
    /// Stories in the merged record set.
    pub persisted: usize,
    /// Whether the store was written.
    pub saved: bool,
    /// The ranking could not be fetched or was empty; nothing was saved.
    pub ranking_unavailable: bool,
}

/// One ingestion run over injected collaborators.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    source: &'a dyn StoryIdSource,
    fetcher: &'a dyn ContentFetcher,
    rewriter: &'a dyn Rewriter,
    store: &'a dyn StoryStore,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        source: &'a dyn StoryIdSource,
        fetcher: &'a dyn ContentFetcher,
        rewriter: &'a dyn Rewriter,
        store: &'a dyn StoryStore,
    ) -> Self {
        Self {
            config,
            source,
            fetcher,
            rewriter,
            store,
        }
    }

    /// Run the whole job once.
    ///
    /// Per-story failures are logged and skipped. Only a failed save is an
    /// error; a missing ranking ends the run early with the store untouched.
    #[instrument(skip_all, fields(limit = self.config.top_story_limit))]
    pub async fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();

        let persisted = self.store.load().await;
        let known = known_ids(&persisted);
        let mut summary = RunSummary {
            known: known.len(),
            ..RunSummary::default()
        };

        let ranked = match self.source.list_top_ids(self.config.top_story_limit).await {
            Ok(ids) if !ids.is_empty() => ids,
            Ok(_) => {
                warn!("ranking is empty, keeping persisted stories");
                summary.ranking_unavailable = true;
                return Ok(summary);
            }
            Err(e) => {
                warn!(error = %e, "ranking unavailable, keeping persisted stories");
                summary.ranking_unavailable = true;
                return Ok(summary);
            }
        };
        summary.ranked = ranked.len();

        let pending = new_ids(&ranked, &known);
        summary.new_ids = pending.len();

        let batches = plan_batches(&pending, self.config.batch_size, self.config.max_batches);
        summary.batches = batches.len();
        info!(
            ranked = summary.ranked,
            known = summary.known,
            new = summary.new_ids,
            batches = summary.batches,
            "planned run"
        );

        let title_label = self.config.title_label();
        let mut pacer = Pacer::new(Duration::from_secs(self.config.batch_pacing_secs));
        let mut fresh = Vec::with_capacity(pending.len());
        for (index, batch) in batches.iter().enumerate() {
            pacer.wait_turn().await;
            fresh.extend(self.run_batch(index + 1, batch, &title_label).await);
        }
        summary.processed = fresh.len();

        let latest = merge_latest(&ranked, fresh, persisted.clone());
        summary.persisted = latest.len();

        if latest != persisted {
            self.store.save(&latest).await?;
            summary.saved = true;
        } else {
            info!("record set unchanged, skipping save");
        }

        info!(
            processed = summary.processed,
            persisted = summary.persisted,
            saved = summary.saved,
            elapsed_ms = start.elapsed().as_millis(),
            "run complete"
        );

        Ok(summary)
    }

    /// Details, crawl and rewrite for one batch. Output keeps the batch's rank order.
    #[instrument(skip_all, fields(batch = index, size = ids.len()))]
    async fn run_batch(&self, index: usize, ids: &[StoryId], title_label: &str) -> Vec<Story> {
        let start = Instant::now();

        let details = join_all(ids.iter().map(|&id| self.source.fetch_details(id))).await;
        let linked: Vec<StoryDetails> = details
            .into_iter()
            .zip(ids)
            .filter_map(|(details, id)| match details {
                None => {
                    warn!(%id, "no details for story, skipping");
                    None
                }
                Some(d) if d.usable_url().is_none() => {
                    info!(id = %d.id, title = %d.title, "story has no link, skipping");
                    None
                }
                Some(d) => Some(d),
            })
            .collect();

        if linked.is_empty() {
            info!("no crawlable stories in batch");
            return Vec::new();
        }

        let content_by_url = self.crawl(&linked).await;

        let ready: Vec<(StoryDetails, String)> = linked
            .into_iter()
            .filter_map(|d| {
                let content = d.usable_url().and_then(|url| content_by_url.get(url)).cloned();
                match content {
                    Some(content) => Some((d, content)),
                    None => {
                        let err = StoryfeedError::fetch_empty(d.usable_url().unwrap_or_default());
                        warn!(id = %d.id, title = %d.title, error = %err, "skipping story");
                        None
                    }
                }
            })
            .collect();

        let results = join_all(
            ready
                .iter()
                .map(|(details, content)| self.rewrite_story(details, content, title_label)),
        )
        .await;

        let stories: Vec<Story> = results
            .into_iter()
            .zip(&ready)
            .filter_map(|(result, (details, _))| match result {
                Ok(story) => Some(story),
                Err(e) => {
                    warn!(id = %details.id, title = %details.title, error = %e, "rewrite failed, skipping story");
                    None
                }
            })
            .collect();

        info!(
            processed = stories.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "batch complete"
        );
        stories
    }

    /// One crawl call for every link of the batch, as a URL → text lookup.
    async fn crawl(&self, stories: &[StoryDetails]) -> HashMap<String, String> {
        let urls: Vec<String> = stories
            .iter()
            .filter_map(|d| d.usable_url().map(str::to_string))
            .collect();

        let limit = Duration::from_secs(self.config.crawl_timeout_secs);
        let pages = match timeout(limit, self.fetcher.crawl_many(&urls)).await {
            Ok(pages) => pages,
            Err(_) => {
                warn!(
                    urls = urls.len(),
                    timeout_secs = self.config.crawl_timeout_secs,
                    "crawl timed out, batch has no content"
                );
                Vec::new()
            }
        };

        pages
            .into_iter()
            .filter_map(|page| {
                let text = page.text()?.to_string();
                Some((page.url, text))
            })
            .collect()
    }

    async fn rewrite_story(
        &self,
        details: &StoryDetails,
        content: &str,
        title_label: &str,
    ) -> Result<Story> {
        let limit = Duration::from_secs(self.config.rewrite_timeout_secs);
        let call = self
            .rewriter
            .rewrite(&details.title, content, &self.config.target_language);

        let raw = timeout(limit, call).await.map_err(|_| {
            StoryfeedError::RewriteFailed(format!(
                "timed out after {}s",
                self.config.rewrite_timeout_secs
            ))
        })??;

        let parsed = parse_rewrite_response(&raw, &details.title, title_label);
        if parsed.used_fallback {
            warn!(id = %details.id, title = %details.title, "response has no title line, keeping original title");
        }

        Ok(Story {
            id: details.id,
            title: details.title.clone(),
            url: details.usable_url().map(str::to_string),
            rewritten_title: Some(parsed.title),
            rewritten_content: Some(parsed.body),
            original_content: Some(content.to_string()),
        })
    }
}
