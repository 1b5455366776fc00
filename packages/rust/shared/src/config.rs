//! Application configuration for storyfeed.
//!
//! User config lives at `~/.storyfeed/storyfeed.toml` unless a path is given
//! on the command line. Missing sections and fields fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoryfeedError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "storyfeed.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".storyfeed";

// ---------------------------------------------------------------------------
// Config structs (matching storyfeed.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Batching, pacing, and rewrite settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Story id source.
    #[serde(default)]
    pub source: SourceConfig,

    /// Page crawler.
    #[serde(default)]
    pub crawl: CrawlSettings,

    /// Gemini rewriter.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Persisted record set.
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.top_story_limit == 0 {
            return Err(StoryfeedError::config("pipeline.top_story_limit must be at least 1"));
        }
        if self.pipeline.batch_size == 0 {
            return Err(StoryfeedError::config("pipeline.batch_size must be at least 1"));
        }
        if self.crawl.concurrency == 0 {
            return Err(StoryfeedError::config("crawl.concurrency must be at least 1"));
        }
        if self.pipeline.target_language.trim().is_empty() {
            return Err(StoryfeedError::config("pipeline.target_language must not be empty"));
        }
        Ok(())
    }
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// How many ranked ids to consider.
    #[serde(default = "default_top_story_limit")]
    pub top_story_limit: usize,

    /// Ids per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum number of batches; the last one takes the remainder. `0` means no cap.
    #[serde(default = "default_max_batches")]
    pub max_batches: usize,

    /// Minimum seconds between consecutive batch starts.
    #[serde(default = "default_batch_pacing_secs")]
    pub batch_pacing_secs: u64,

    /// Output language for rewriting.
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Label the rewriter puts before the rewritten title. Derived from
    /// `target_language` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_label: Option<String>,

    /// Upper bound for one batch's crawl call.
    #[serde(default = "default_step_timeout_secs")]
    pub crawl_timeout_secs: u64,

    /// Upper bound for one story's rewrite call.
    #[serde(default = "default_step_timeout_secs")]
    pub rewrite_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_story_limit: default_top_story_limit(),
            batch_size: default_batch_size(),
            max_batches: default_max_batches(),
            batch_pacing_secs: default_batch_pacing_secs(),
            target_language: default_target_language(),
            title_label: None,
            crawl_timeout_secs: default_step_timeout_secs(),
            rewrite_timeout_secs: default_step_timeout_secs(),
        }
    }
}

impl PipelineConfig {
    /// The title label to ask for and to parse.
    pub fn title_label(&self) -> String {
        if let Some(label) = &self.title_label {
            return label.clone();
        }
        match self.target_language.trim().to_lowercase().as_str() {
            "chinese" | "simplified chinese" | "zh" | "zh-cn" | "中文" | "简体中文" => {
                "标题:".into()
            }
            "traditional chinese" | "zh-tw" | "zh-hk" | "繁體中文" => "標題:".into(),
            "japanese" | "ja" | "日本語" => "タイトル:".into(),
            _ => "Title:".into(),
        }
    }
}

fn default_top_story_limit() -> usize {
    30
}
fn default_batch_size() -> usize {
    15
}
fn default_max_batches() -> usize {
    2
}
fn default_batch_pacing_secs() -> u64 {
    60
}
fn default_target_language() -> String {
    "Chinese".into()
}
fn default_step_timeout_secs() -> u64 {
    300
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the Hacker News API.
    #[serde(default = "default_source_base_url")]
    pub base_url: String,

    /// HTTP timeout per request.
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_source_base_url(),
            timeout_secs: default_source_timeout(),
        }
    }
}

fn default_source_base_url() -> String {
    "https://hacker-news.firebaseio.com/v0".into()
}
fn default_source_timeout() -> u64 {
    30
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSettings {
    /// Maximum concurrent page fetches.
    #[serde(default = "default_crawl_concurrency")]
    pub concurrency: usize,

    /// HTTP timeout per page.
    #[serde(default = "default_crawl_request_timeout")]
    pub request_timeout_secs: u64,

    /// Redirects followed per page.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            concurrency: default_crawl_concurrency(),
            request_timeout_secs: default_crawl_request_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_crawl_concurrency() -> usize {
    8
}
fn default_crawl_request_timeout() -> u64 {
    30
}
fn default_max_redirects() -> usize {
    5
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for rewriting.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Generative Language API.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// HTTP timeout per rewrite request.
    #[serde(default = "default_gemini_timeout")]
    pub timeout_secs: u64,

    /// Page content beyond this many characters is truncated before prompting.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_gemini_base_url(),
            timeout_secs: default_gemini_timeout(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".into()
}
fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_gemini_timeout() -> u64 {
    180
}
fn default_max_content_chars() -> usize {
    100_000
}

/// `[store]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON document holding the record set.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("hn_stories.json")
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.storyfeed/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| StoryfeedError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.storyfeed/storyfeed.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from the default location. Returns defaults if
/// the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| StoryfeedError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        StoryfeedError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Check that the Gemini API key env var is set and non-empty, returning it.
pub fn validate_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.gemini.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(StoryfeedError::config(format!(
            "Gemini API key not found. Set the {var_name} environment variable."
        ))),
    }
}
