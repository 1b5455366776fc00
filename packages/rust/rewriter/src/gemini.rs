//! Gemini `generateContent` client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use storyfeed_shared::{GeminiConfig, Result, Rewriter, StoryfeedError};

use crate::prompt::{build_prompt, truncate_content};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("storyfeed/", env!("CARGO_PKG_VERSION"));

/// Max bytes of an error body echoed into the error message.
const ERROR_BODY_PREVIEW: usize = 200;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_p: f64,
    top_k: u32,
    candidate_count: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 64,
            candidate_count: 1,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(StoryfeedError::RewriteFailed(format!("prompt blocked: {reason}")));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| StoryfeedError::RewriteFailed("response has no candidates".into()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
            return Err(StoryfeedError::RewriteFailed(format!(
                "empty candidate (finish reason: {reason})"
            )));
        }

        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// GeminiRewriter
// ---------------------------------------------------------------------------

/// Rewriter backed by the Gemini Generative Language API.
pub struct GeminiRewriter {
    client: Client,
    api_key: String,
    endpoint: String,
    title_label: String,
    max_content_chars: usize,
}

impl GeminiRewriter {
    /// Create a rewriter from the `[gemini]` section, the resolved API key,
    /// and the title label the prompt should ask for.
    pub fn new(config: &GeminiConfig, api_key: String, title_label: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoryfeedError::Network(format!("failed to build HTTP client: {e}")))?;

        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            client,
            api_key,
            endpoint,
            title_label,
            max_content_chars: config.max_content_chars,
        })
    }
}

#[async_trait]
impl Rewriter for GeminiRewriter {
    #[instrument(skip_all, fields(title = %title, content_len = content.len()))]
    async fn rewrite(&self, title: &str, content: &str, target_language: &str) -> Result<String> {
        let start = Instant::now();
        let content = truncate_content(content, self.max_content_chars);
        let prompt = build_prompt(title, &content, target_language, &self.title_label);

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: &prompt }],
            }],
            generation_config: GenerationConfig::default(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| StoryfeedError::RewriteFailed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoryfeedError::RewriteFailed(format!(
                "HTTP {status}: {}",
                preview(&body)
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| StoryfeedError::RewriteFailed(format!("invalid response body: {e}")))?;

        let (tokens_in, tokens_out) = parsed
            .usage_metadata
            .as_ref()
            .map(|u| (u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        let text = parsed.into_text()?;

        debug!(
            tokens_in,
            tokens_out,
            latency_ms = start.elapsed().as_millis(),
            response_len = text.len(),
            "rewrite complete"
        );

        Ok(text)
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rewriter_for(server: &MockServer) -> GeminiRewriter {
        let config = GeminiConfig {
            base_url: format!("{}/v1beta", server.uri()),
            timeout_secs: 5,
            max_content_chars: 1_000,
            ..GeminiConfig::default()
        };
        GeminiRewriter::new(&config, "test-key".into(), "标题:".into()).unwrap()
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 40}
        })
    }

    #[test]
    fn request_serializes_in_camel_case() {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: GenerationConfig::default(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["topK"], 64);
        assert_eq!(json["generationConfig"]["candidateCount"], 1);
    }

    #[test]
    fn multi_part_candidate_is_joined() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "标题: 新\n"}, {"text": "正文"}]}}]
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "标题: 新\n正文");
    }

    #[tokio::test]
    async fn rewrite_returns_candidate_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_string_contains("Title: Launch HN"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("标题: 发布\n\n正文")))
            .expect(1)
            .mount(&server)
            .await;

        let text = rewriter_for(&server)
            .rewrite("Launch HN", "We built a thing.", "Chinese")
            .await
            .unwrap();
        assert_eq!(text, "标题: 发布\n\n正文");
    }

    #[tokio::test]
    async fn rate_limit_is_rewrite_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = rewriter_for(&server)
            .rewrite("t", "c", "Chinese")
            .await
            .unwrap_err();
        assert!(matches!(err, StoryfeedError::RewriteFailed(_)));
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn blocked_prompt_is_rewrite_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let err = rewriter_for(&server)
            .rewrite("t", "c", "Chinese")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn empty_candidate_is_rewrite_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"finishReason": "MAX_TOKENS"}]
            })))
            .mount(&server)
            .await;

        let err = rewriter_for(&server)
            .rewrite("t", "c", "Chinese")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let body = "错".repeat(300);
        assert_eq!(preview(&body).chars().count(), ERROR_BODY_PREVIEW);
    }
}
