//! Fitting post text into a platform's character budget
//!
//! Text within the budget passes through untouched. Longer text goes to a
//! summarization service exactly once; when that is unavailable or fails the
//! text is hard-truncated with a trailing ellipsis. Lengths count Unicode
//! scalar values, not bytes.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{Result, SummarizeError};

pub const ELLIPSIS: &str = "...";

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Hard-truncate `text` to at most `limit` characters, ending in an ellipsis
pub fn truncate(text: &str, limit: usize) -> String {
    if char_len(text) <= limit {
        return text.to_string();
    }
    if limit < ELLIPSIS.len() {
        return text.chars().take(limit).collect();
    }

    let mut truncated: String = text.chars().take(limit - ELLIPSIS.len()).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// A service that can shorten text
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `text`, aiming to stay under `limit` characters
    async fn summarize(&self, text: &str, limit: usize) -> Result<String>;
}

pub struct ContentAdapter {
    summarizer: Box<dyn Summarizer>,
}

impl ContentAdapter {
    pub fn new(summarizer: Box<dyn Summarizer>) -> Self {
        Self { summarizer }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Box::new(GeminiSummarizer::from_config(config)))
    }

    /// Return `text` unchanged if it fits in `limit`, otherwise a version that does
    pub async fn adapt(&self, text: &str, limit: usize) -> String {
        let length = char_len(text);
        if length <= limit {
            return text.to_string();
        }

        info!(length, limit, "Text exceeds limit, summarizing");
        match self.summarizer.summarize(text, limit).await {
            Ok(summary) => {
                let summary = summary.trim();
                if summary.is_empty() {
                    warn!("Summary was empty, truncating original text");
                    truncate(text, limit)
                } else {
                    debug!(summary, "Received summary");
                    truncate(summary, limit)
                }
            }
            Err(e) => {
                warn!(error = %e, "Summarization failed, truncating text");
                truncate(text, limit)
            }
        }
    }
}

// === Gemini ===

/// Summarizer backed by the Gemini `generateContent` API
pub struct GeminiSummarizer {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    max_output_tokens: u32,
    temperature: f32,
}

impl GeminiSummarizer {
    pub fn new(
        api_key: Option<SecretString>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into(),
            model: model.into(),
            max_output_tokens: 70,
            temperature: 0.7,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let api_key = config
            .credentials
            .gemini_api_key
            .as_ref()
            .map(|key| SecretString::from(key.expose_secret().to_string()));

        Self {
            max_output_tokens: config.content.max_output_tokens,
            temperature: config.content.temperature,
            ..Self::new(api_key, &config.endpoints.gemini, &config.content.model)
        }
    }

    fn prompt(text: &str, limit: usize) -> String {
        format!(
            "You are a helpful assistant that summarizes text for a tweet. \
             Make it engaging and keep it under {} characters.\n\n{}",
            limit, text
        )
    }

    fn build_request(&self, text: &str, limit: usize) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Self::prompt(text, limit),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, text: &str, limit: usize) -> Result<String> {
        let api_key = self.api_key.as_ref().ok_or(SummarizeError::MissingApiKey)?;

        debug!(model = %self.model, "Sending request to Gemini API");
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key.expose_secret())])
            .json(&self.build_request(text, limit))
            .send()
            .await
            .map_err(|e| SummarizeError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, body = %body, "Gemini API error");
            return Err(match status.as_u16() {
                401 | 403 => SummarizeError::Unauthorized,
                429 => SummarizeError::RateLimitExceeded,
                code => SummarizeError::Provider(code, body),
            }
            .into());
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SummarizeError::InvalidResponse(e.to_string()))?;

        let summary = body
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n");

        if summary.trim().is_empty() {
            return Err(
                SummarizeError::InvalidResponse("No text content in response".to_string()).into(),
            );
        }

        Ok(summary.trim().to_string())
    }
}

// === Request/Response Types ===

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}
