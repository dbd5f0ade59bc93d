//! Mistral chat-completions adapter

use async_trait::async_trait;
use expense_ocr_domain::{DocumentAnalyzer, ExtractError, ModelRequest};
use reqwest::Client;
use secrecy::ExposeSecret;
use std::time::Duration;

use super::{ChatCompletionRequest, LlmConfig, extract_content};
use crate::secrets::ApiKeyResolver;

const CHAT_COMPLETIONS_ROUTE: &str = "/v1/chat/completions";

/// Document analyzer calling Mistral's multimodal chat-completions endpoint
pub struct MistralAnalyzer {
    client: Client,
    api_key: ApiKeyResolver,
    base_url: String,
}

impl MistralAnalyzer {
    pub fn new(api_key: ApiKeyResolver, config: LlmConfig) -> Result<Self, ExtractError> {
        let mut builder = Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| ExtractError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn credential_source(&self) -> String {
        self.api_key.source()
    }
}

#[async_trait]
impl DocumentAnalyzer for MistralAnalyzer {
    async fn complete(&self, request: &ModelRequest) -> Result<String, ExtractError> {
        let api_key = self.api_key.resolve().await?;
        let body = ChatCompletionRequest::from_model_request(request);
        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_ROUTE);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractError::Transport(format!("request timed out: {}", e))
                } else {
                    ExtractError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let raw_body = response
            .text()
            .await
            .map_err(|e| ExtractError::Transport(e.to_string()))?;

        tracing::debug!(
            status = status.as_u16(),
            body_length = raw_body.len(),
            "Mistral API responded"
        );

        extract_content(status.as_u16(), &raw_body)
    }
}
