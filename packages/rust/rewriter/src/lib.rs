//! Localized rewriting of crawled stories.
//!
//! This crate provides:
//! - [`GeminiRewriter`] — the [`Rewriter`](storyfeed_shared::Rewriter) backed by the Gemini API
//! - [`build_prompt`] — the rewrite prompt for a title, body, and target language
//! - [`parse_rewrite_response`] — splits a raw response into title and body

mod gemini;
mod prompt;
mod response;

pub use gemini::GeminiRewriter;
pub use prompt::{build_prompt, truncate_content};
pub use response::{ParsedRewrite, parse_rewrite_response, strip_markdown_fence};
