//! Chat-completions client for the external text-generation provider
//!
//! Built per request from the caller-supplied credential; nothing here holds
//! a key beyond the lifetime of one request. Uses a pooled reqwest::Client.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use crate::error::FinsightError;
use crate::prompt::PromptPayload;
use crate::Result;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";

/// Per-request provider client.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Send one prompt payload, return the provider's text verbatim.
    pub async fn complete(&self, payload: &PromptPayload) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(FinsightError::InvalidArgument(
                "provider API key is empty".to_string(),
            ));
        }

        let request = ChatRequest {
            model: MODEL.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: payload.text.clone(),
            }],
        };

        info!("Calling text-generation provider ({})", MODEL);

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Provider request failed: {}", e);
                FinsightError::UpstreamFailure(format!("provider request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Provider error response ({}): {}", status, body);
            return Err(FinsightError::UpstreamFailure(format!(
                "provider returned {}: {}",
                status, body
            )));
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            error!("Failed to parse provider response: {}", e);
            FinsightError::UpstreamFailure(format!("provider response parse error: {}", e))
        })?;

        let answer = completion
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                FinsightError::UpstreamFailure("provider returned no content".to_string())
            })?;

        Ok(answer)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}
