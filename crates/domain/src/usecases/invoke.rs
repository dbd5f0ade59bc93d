//! Invocation adapter: inbound event to `{statusCode, body}` envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    model::{ExtractionRequest, ModelSelection},
    ports::{DocumentAnalyzer, ExtractError},
    usecases::extract::ExtractUseCase,
};

/// Inbound event fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationEvent {
    #[serde(default)]
    pub url: Option<String>,
    /// MIME type or explicit `image`/`document` tag
    #[serde(default)]
    pub content_type: Option<String>,
    /// Older name for `content_type`; used only when `content_type` is absent
    #[serde(default)]
    pub doc_type: Option<String>,
}

impl InvocationEvent {
    pub fn new(url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            content_type: Some(content_type.into()),
            doc_type: None,
        }
    }

    pub fn resolved_content_type(&self) -> Option<&str> {
        self.content_type.as_deref().or(self.doc_type.as_deref())
    }
}

/// Outbound response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

impl InvocationResult {
    pub const OK: u16 = 200;
    pub const ERROR: u16 = 500;

    pub fn success(body: Value) -> Self {
        Self {
            status_code: Self::OK,
            body,
            url: None,
            content_type: None,
            doc_type: None,
        }
    }

    pub fn failure(error: &ExtractError) -> Self {
        Self {
            status_code: Self::ERROR,
            body: error.payload(),
            url: None,
            content_type: None,
            doc_type: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == Self::OK
    }
}

/// Configuration for the invocation handler
#[derive(Debug, Clone, Default)]
pub struct InvocationConfig {
    pub models: ModelSelection,
    /// Echo `url` and the type field(s) back in success envelopes, under the names sent
    pub echo_input: bool,
}

/// Maps events to envelopes; never returns an error
pub struct InvocationHandler<A> {
    usecase: ExtractUseCase<A>,
    echo_input: bool,
}

impl<A: DocumentAnalyzer> InvocationHandler<A> {
    pub fn new(analyzer: A, config: InvocationConfig) -> Self {
        Self {
            usecase: ExtractUseCase::new(analyzer, config.models),
            echo_input: config.echo_input,
        }
    }

    pub fn models(&self) -> &ModelSelection {
        self.usecase.models()
    }

    /// Handle an event given as raw JSON bytes
    pub async fn handle_json(&self, payload: &[u8]) -> InvocationResult {
        match serde_json::from_slice::<InvocationEvent>(payload) {
            Ok(event) => self.handle(event).await,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected unparsable invocation event");
                InvocationResult::failure(&ExtractError::InvalidRequest(format!(
                    "invalid invocation event: {}",
                    e
                )))
            }
        }
    }

    pub async fn handle(&self, event: InvocationEvent) -> InvocationResult {
        let span = tracing::info_span!("invocation", invocation_id = %Uuid::new_v4());
        self.run(event).instrument(span).await
    }

    async fn run(&self, event: InvocationEvent) -> InvocationResult {
        let url = event.url.as_deref().unwrap_or_default();
        let content_type = event.resolved_content_type().unwrap_or_default();

        let outcome = match ExtractionRequest::new(url, content_type) {
            Ok(request) => self.usecase.extract(&request).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(body) => {
                let mut result = InvocationResult::success(body);
                if self.echo_input {
                    result.url = event.url;
                    result.content_type = event.content_type;
                    result.doc_type = event.doc_type;
                }
                result
            }
            Err(error) => {
                match &error {
                    ExtractError::Api { message, .. } => {
                        tracing::error!(error = %message, "Model API call failed")
                    }
                    other => tracing::error!(error = %other, "Extraction failed"),
                }
                InvocationResult::failure(&error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelRequest;
    use async_trait::async_trait;
    use serde_json::json;

    struct FakeAnalyzer {
        outcome: Result<String, ExtractError>,
    }

    #[async_trait]
    impl DocumentAnalyzer for FakeAnalyzer {
        async fn complete(&self, _request: &ModelRequest) -> Result<String, ExtractError> {
            self.outcome.clone()
        }
    }

    fn handler(outcome: Result<String, ExtractError>) -> InvocationHandler<FakeAnalyzer> {
        InvocationHandler::new(FakeAnalyzer { outcome }, InvocationConfig::default())
    }

    #[tokio::test]
    async fn test_success_returns_content_unchanged() {
        let content = r#"{"status":"success","amount":18.9,"currency":"EUR","date":"2025-03-14","expense_type":"one-time","category":"meal","confidence":0.97,"comment":"lunch"}"#;
        let handler = handler(Ok(content.to_string()));

        let result = handler
            .handle(InvocationEvent::new("https://x/receipt.jpg", "image/jpeg"))
            .await;

        assert_eq!(result.status_code, 200);
        assert_eq!(result.body, serde_json::from_str::<Value>(content).unwrap());
        assert!(result.url.is_none());
    }

    #[tokio::test]
    async fn test_model_rejection_is_success_envelope() {
        let handler = handler(Ok(
            r#"{"status":"error","comment":"not an expense proof"}"#.to_string()
        ));

        let result = handler
            .handle(InvocationEvent::new("https://x/cat.jpg", "image/jpeg"))
            .await;

        assert_eq!(result.status_code, 200);
        assert_eq!(
            result.body,
            json!({"status": "error", "comment": "not an expense proof"})
        );
    }

    #[tokio::test]
    async fn test_api_error_carries_body() {
        let handler = handler(Err(ExtractError::Api {
            message: "Mistral API error: invalid key".to_string(),
            body: json!({"error": "invalid key"}),
        }));

        let result = handler
            .handle(InvocationEvent::new("https://x/receipt.jpg", "image/jpeg"))
            .await;

        assert_eq!(result.status_code, 500);
        assert_eq!(result.body, json!({"error": "invalid key"}));
    }

    #[tokio::test]
    async fn test_transport_error_is_message() {
        let handler = handler(Err(ExtractError::Transport("dns failure".to_string())));

        let result = handler
            .handle(InvocationEvent::new("https://x/invoice.pdf", "application/pdf"))
            .await;

        assert_eq!(result.status_code, 500);
        assert_eq!(result.body, json!("Network error: dns failure"));
    }

    #[tokio::test]
    async fn test_unparsable_content_is_structured_error() {
        let handler = handler(Ok("sorry, I cannot help".to_string()));

        let result = handler
            .handle(InvocationEvent::new("https://x/invoice.pdf", "document"))
            .await;

        assert_eq!(result.status_code, 500);
        assert_eq!(
            result.body,
            json!({"error": "Invalid JSON response", "raw_body": "sorry, I cannot help"})
        );
    }

    #[tokio::test]
    async fn test_missing_url_is_error_without_calling_model() {
        let handler = handler(Err(ExtractError::Transport("must not be called".to_string())));

        let result = handler
            .handle(InvocationEvent {
                url: None,
                content_type: Some("image/png".to_string()),
                doc_type: None,
            })
            .await;

        assert_eq!(result.status_code, 500);
        assert_eq!(result.body, json!("Invalid request: document url is required"));
    }

    #[tokio::test]
    async fn test_echo_input_on_success() {
        let handler = InvocationHandler::new(
            FakeAnalyzer {
                outcome: Ok(r#"{"amount": 3}"#.to_string()),
            },
            InvocationConfig {
                echo_input: true,
                ..Default::default()
            },
        );

        let result = handler
            .handle_json(br#"{"url": "https://x/a.pdf", "doc_type": "document"}"#)
            .await;

        assert_eq!(result.status_code, 200);
        assert_eq!(result.url.as_deref(), Some("https://x/a.pdf"));
        assert_eq!(result.doc_type.as_deref(), Some("document"));
        assert!(result.content_type.is_none());

        let envelope = serde_json::to_value(&result).unwrap();
        assert_eq!(envelope["statusCode"], 200);
        assert_eq!(envelope["doc_type"], "document");
        assert!(envelope.get("content_type").is_none());
    }

    struct RecordingAnalyzer {
        seen: std::sync::Mutex<Vec<ModelRequest>>,
    }

    #[async_trait]
    impl DocumentAnalyzer for RecordingAnalyzer {
        async fn complete(&self, request: &ModelRequest) -> Result<String, ExtractError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(r#"{"status":"success","amount":4.2}"#.to_string())
        }
    }

    #[tokio::test]
    async fn test_event_with_both_type_fields_prefers_content_type() {
        let handler = InvocationHandler::new(
            RecordingAnalyzer {
                seen: std::sync::Mutex::new(Vec::new()),
            },
            InvocationConfig {
                echo_input: true,
                ..Default::default()
            },
        );

        let result = handler
            .handle_json(
                br#"{"url":"https://x/a.pdf","content_type":"application/pdf","doc_type":"image"}"#,
            )
            .await;

        assert_eq!(result.status_code, 200);
        assert_eq!(result.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(result.doc_type.as_deref(), Some("image"));

        let seen = handler.usecase.analyzer().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "mistral-small-latest");
    }

    #[tokio::test]
    async fn test_unparsable_event() {
        let handler = handler(Ok("{}".to_string()));

        let result = handler.handle_json(b"not json").await;

        assert_eq!(result.status_code, 500);
        assert!(result.body.as_str().unwrap().contains("invalid invocation event"));
    }
}
