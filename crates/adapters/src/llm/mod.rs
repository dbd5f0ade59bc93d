//! LLM provider adapters

pub mod mistral;
pub mod stub;

pub use mistral::MistralAnalyzer;
pub use stub::StubAnalyzer;

use expense_ocr_domain::{ExtractError, MediaPart, ModelRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Common LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API root, without the `/v1/...` route
    pub base_url: String,
    /// Request timeout in seconds (0 = transport default)
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mistral.ai".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Chat-completions request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

/// One element of a multi-part user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: String },
    DocumentUrl { document_url: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ChatCompletionRequest {
    pub fn from_model_request(request: &ModelRequest) -> Self {
        let media = match &request.media_part {
            MediaPart::ImageUrl(url) => ContentPart::ImageUrl {
                image_url: url.clone(),
            },
            MediaPart::DocumentUrl(url) => ContentPart::DocumentUrl {
                document_url: url.clone(),
            },
        };

        Self {
            model: request.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: request.prompt_text.clone(),
                    },
                    media,
                ],
            }],
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
        }
    }

    /// The media part of the user message, if present
    pub fn media_part(&self) -> Option<MediaPart> {
        self.messages
            .iter()
            .flat_map(|m| m.content.iter())
            .find_map(|part| match part {
                ContentPart::ImageUrl { image_url } => Some(MediaPart::ImageUrl(image_url.clone())),
                ContentPart::DocumentUrl { document_url } => {
                    Some(MediaPart::DocumentUrl(document_url.clone()))
                }
                ContentPart::Text { .. } => None,
            })
    }
}

/// Parse a response body, substituting a structured error object when it is not JSON
pub fn parse_json_body(raw_body: &str) -> Value {
    serde_json::from_str(raw_body).unwrap_or_else(|_| ExtractError::invalid_json(raw_body))
}

/// Classify an HTTP response and pull out `choices[0].message.content`
pub fn extract_content(status: u16, raw_body: &str) -> Result<String, ExtractError> {
    let body = parse_json_body(raw_body);

    if !(200..300).contains(&status) {
        return Err(ExtractError::Api {
            message: api_error_message(&body),
            body,
        });
    }

    match body.pointer("/choices/0/message/content") {
        Some(Value::String(content)) => Ok(content.clone()),
        Some(Value::Null) | None => {
            let message = if error_field(&body).is_some() {
                api_error_message(&body)
            } else {
                "Mistral API response is missing choices[0].message.content".to_string()
            };
            Err(ExtractError::Api { message, body })
        }
        Some(other) => Ok(other.to_string()),
    }
}

fn error_field(body: &Value) -> Option<String> {
    let field = body.get("error").or_else(|| body.get("message"))?;
    match field {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn api_error_message(body: &Value) -> String {
    match error_field(body) {
        Some(detail) => format!("Mistral API error: {}", detail),
        None => "Mistral API error".to_string(),
    }
}
