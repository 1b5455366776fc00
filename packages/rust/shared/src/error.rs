//! Error types for storyfeed.
//!
//! Library crates use [`StoryfeedError`] via `thiserror`.
//! The binary wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all storyfeed operations.
#[derive(Debug, thiserror::Error)]
pub enum StoryfeedError {
    /// The ranking or a story's details could not be fetched.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// Crawling a story's link produced no content.
    #[error("no content fetched from {url}")]
    FetchEmpty { url: String },

    /// The rewriting service errored, timed out, or returned unusable text.
    #[error("rewrite failed: {0}")]
    RewriteFailed(String),

    /// The persisted story document exists but cannot be read.
    #[error("persisted state at {path:?} is corrupt: {message}")]
    PersistedStateCorrupt { path: PathBuf, message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error outside the source taxonomy (client construction, crawl).
    #[error("network error: {0}")]
    Network(String),

    /// Response or document parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// HTML-to-Markdown conversion error.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StoryfeedError>;

impl StoryfeedError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a fetch-empty error for the given URL.
    pub fn fetch_empty(url: impl Into<String>) -> Self {
        Self::FetchEmpty { url: url.into() }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
