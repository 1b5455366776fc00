//! Core pipeline orchestration for storyfeed.
//!
//! This crate ties the story source, crawler, rewriter and store together:
//! dedup against the persisted set, batched fetch/crawl/rewrite with pacing
//! between batch starts, then an order-preserving merge and save.

pub mod batch;
pub mod merge;
pub mod pipeline;

pub use batch::{Pacer, plan_batches};
pub use merge::{merge_latest, new_ids};
pub use pipeline::{Pipeline, RunSummary};
