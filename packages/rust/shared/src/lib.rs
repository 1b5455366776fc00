//! Shared types, error model, collaborator traits, and configuration for storyfeed.
//!
//! This crate is the foundation depended on by all other storyfeed crates.
//! It provides:
//! - [`StoryfeedError`] — the unified error type
//! - Domain types ([`Story`], [`StoryId`], [`StoryDetails`], [`CrawledPage`])
//! - Collaborator traits ([`StoryIdSource`], [`ContentFetcher`], [`Rewriter`], [`StoryStore`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlSettings, GeminiConfig, PipelineConfig, SourceConfig, StoreConfig,
    config_dir, config_file_path, load_config, load_config_from, validate_api_key,
};
pub use error::{Result, StoryfeedError};
pub use traits::{ContentFetcher, Rewriter, StoryIdSource, StoryStore, known_ids};
pub use types::{CrawledPage, Story, StoryDetails, StoryId};
