//! Structured extraction collaborator
//!
//! Anything that can turn a prompt plus a JSON schema into a best-effort JSON
//! object implements [`StructuredExtractor`]. The bundled implementation talks
//! to an OpenAI-compatible chat completions endpoint.

use crate::config::ExtractionConfig;
use crate::extraction::schema::Schema;
use crate::extraction::ExtractionError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You extract structured data from text. Answer only with JSON \
     matching the provided schema. Omit fields whose information is not available instead \
     of guessing.";

/// Schema-constrained text-to-object capability
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    /// Returns an object following `schema` as closely as the input allows
    async fn extract(&self, prompt: &str, schema: &Schema) -> Result<Value, ExtractionError>;
}

/// Extractor backed by an OpenAI-compatible `/chat/completions` API
pub struct OpenAiExtractor {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiExtractor {
    /// Builds an extractor, reading the API key from the configured variable
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| ExtractionError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    pub fn new(config: &ExtractionConfig, api_key: String) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl StructuredExtractor for OpenAiExtractor {
    async fn extract(&self, prompt: &str, schema: &Schema) -> Result<Value, ExtractionError> {
        let request = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name,
                    "schema": schema.body,
                    "strict": false
                }
            }
        });

        tracing::debug!("Requesting '{}' extraction from {}", schema.name, self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ExtractionError::EmptyResponse)?;

        let value: Value = serde_json::from_str(strip_code_fence(&content))
            .map_err(ExtractionError::InvalidJson)?;
        if !value.is_object() {
            return Err(ExtractionError::NotAnObject);
        }

        Ok(value)
    }
}

/// Some models wrap JSON in a markdown code fence despite instructions
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
