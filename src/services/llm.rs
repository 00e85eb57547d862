//! LLM service for content generation
//!
//! Talks to the Anthropic Messages API. One request per call, with model,
//! temperature and token limit fixed by deployment configuration. The
//! completion must be a JSON object matching the shape in
//! [`prompts`](super::prompts); anything else is reported as
//! [`ScribeError::ContentMalformed`] without repair or re-prompting.

use super::prompts;
use super::ContentGenerator;
use crate::error::{Result, ScribeError};
use crate::types::{GeneratedContent, GenerationRequest, Post};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

const SERVICE: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";

/// Configuration for LLM service
#[derive(Debug)]
pub struct LlmConfig {
    /// Anthropic API key
    pub api_key: SecretString,

    /// API root, without the `/v1/messages` path
    pub base_url: String,

    /// Model to use
    pub model: String,

    /// Max tokens for responses
    pub max_tokens: u32,

    /// Temperature for sampling
    pub temperature: f32,

    /// Request timeout; generation routinely takes 30-60s
    pub timeout: Duration,
}

/// LLM-backed content generator
pub struct LlmService {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

/// Anthropic API message format
#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<Content>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(rename = "type")]
    type_: String,
    message: String,
}

impl LlmService {
    /// Create a new LLM service
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| ScribeError::Other(format!("invalid API key header value: {}", e)))?;
        api_key.set_sensitive(true);
        headers.insert("x-api-key", api_key);
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScribeError::Other(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Make an API call to Claude and return the completion text
    async fn call_api(&self, system: &str, user: &str) -> Result<String> {
        debug!(model = %self.model, "Calling Anthropic API");

        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ScribeError::RemoteUnavailable {
                service: SERVICE,
                message: format!("request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_status(status, &body));
        }

        let api_response: AnthropicResponse =
            response
                .json()
                .await
                .map_err(|e| ScribeError::RemoteUnavailable {
                    service: SERVICE,
                    message: format!("failed to parse response: {}", e),
                })?;

        if api_response.stop_reason.as_deref() == Some("max_tokens") {
            warn!(max_tokens = self.max_tokens, "Completion truncated at token limit");
            return Err(ScribeError::ContentMalformed(format!(
                "completion truncated at {} tokens",
                self.max_tokens
            )));
        }

        let text: String = api_response
            .content
            .into_iter()
            .filter_map(|c| c.text)
            .collect();

        if text.trim().is_empty() {
            return Err(ScribeError::ContentMalformed(
                "empty completion from API".to_string(),
            ));
        }

        debug!(chars = text.len(), "Completion received");
        Ok(text)
    }
}

#[async_trait]
impl ContentGenerator for LlmService {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent> {
        info!(
            style = request.style().as_str(),
            tone = request.tone().as_str(),
            "Generating post content"
        );

        let system = prompts::generation_system_prompt(request);
        let text = self.call_api(&system, request.prompt()).await?;
        let content = parse_generated_content(&text)?;

        info!(
            title = %content.title,
            categories = ?content.suggested_categories,
            tags = ?content.suggested_tags,
            "Content generated"
        );
        Ok(content)
    }

    async fn improve(&self, post: &Post, instructions: &str) -> Result<GeneratedContent> {
        info!(post_id = post.id, "Improving post content");

        let system = prompts::improvement_system_prompt();
        let user = prompts::improvement_user_prompt(post, instructions);
        let text = self.call_api(&system, &user).await?;
        parse_generated_content(&text)
    }
}

/// Shape the completion must parse into
#[derive(Debug, Deserialize)]
struct CompletionPayload {
    title: Option<String>,
    content: Option<String>,
    excerpt: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Parse a completion into [`GeneratedContent`]
///
/// `title`, `content` and `excerpt` must be present; `title` and `content`
/// must be non-blank. Suggested categories and tags are normalized into
/// case-insensitive sets.
pub fn parse_generated_content(text: &str) -> Result<GeneratedContent> {
    let payload: CompletionPayload = serde_json::from_str(text.trim()).map_err(|e| {
        debug!(response = %truncate(text, 500), "Unparseable completion");
        ScribeError::ContentMalformed(format!("completion is not the expected JSON: {}", e))
    })?;

    let missing: Vec<&str> = [
        ("title", payload.title.is_none()),
        ("content", payload.content.is_none()),
        ("excerpt", payload.excerpt.is_none()),
    ]
    .into_iter()
    .filter_map(|(name, absent)| absent.then_some(name))
    .collect();

    if !missing.is_empty() {
        return Err(ScribeError::ContentMalformed(format!(
            "completion is missing required fields: {}",
            missing.join(", ")
        )));
    }

    let content = GeneratedContent::new(
        payload.title.unwrap_or_default().trim(),
        payload.content.unwrap_or_default(),
        payload.excerpt.unwrap_or_default().trim(),
        payload.categories,
        payload.tags,
    );
    content.validate()?;
    Ok(content)
}

fn map_error_status(status: StatusCode, body: &str) -> ScribeError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!("{}: {}", api_err.error.type_, api_err.error.message),
        Err(_) => format!("API returned {}: {}", status, truncate(body, 200)),
    };
    warn!(status = %status, "Anthropic API error: {}", message);

    match status.as_u16() {
        401 | 403 => ScribeError::AuthenticationFailed {
            service: SERVICE,
            message,
        },
        429 => ScribeError::RemoteUnavailable {
            service: SERVICE,
            message,
        },
        code if code >= 500 => ScribeError::RemoteUnavailable {
            service: SERVICE,
            message,
        },
        code => ScribeError::Rejected {
            service: SERVICE,
            status: code,
            code: None,
            message,
        },
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
