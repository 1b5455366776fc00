//! Page crawler for story links.
//!
//! This crate provides [`Crawler`], the [`ContentFetcher`](storyfeed_shared::ContentFetcher)
//! used by the pipeline: one call per batch with every URL of the batch,
//! bounded concurrency inside, normalized Markdown text out.

pub mod engine;

pub use engine::Crawler;
