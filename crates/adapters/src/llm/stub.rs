//! Stub analyzer for testing and offline mode

use async_trait::async_trait;
use expense_ocr_domain::{DocumentAnalyzer, ExtractError, MediaKind, ModelRequest};
use serde_json::json;

/// Stub analyzer that returns configurable responses
pub struct StubAnalyzer {
    content: Option<String>,
    error: Option<ExtractError>,
}

impl StubAnalyzer {
    /// Create a stub that returns specific content
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            error: None,
        }
    }

    /// Create a stub that always returns an error
    pub fn with_error(error: ExtractError) -> Self {
        Self {
            content: None,
            error: Some(error),
        }
    }

    /// Create a stub that answers with a plausible classification for the media kind
    pub fn canned() -> Self {
        Self {
            content: None,
            error: None,
        }
    }
}

impl Default for StubAnalyzer {
    fn default() -> Self {
        Self::canned()
    }
}

#[async_trait]
impl DocumentAnalyzer for StubAnalyzer {
    async fn complete(&self, request: &ModelRequest) -> Result<String, ExtractError> {
        if let Some(ref error) = self.error {
            return Err(error.clone());
        }

        if let Some(ref content) = self.content {
            return Ok(content.clone());
        }

        let (category, comment) = match request.media_part.media_kind() {
            MediaKind::Image => ("meal", "Stub: receipt image"),
            MediaKind::Document => ("supplies", "Stub: invoice document"),
        };

        Ok(json!({
            "status": "success",
            "amount": 0.0,
            "currency": "EUR",
            "date": "1970-01-01",
            "expense_type": "one-time",
            "category": category,
            "confidence": 1.0,
            "comment": comment,
        })
        .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expense_ocr_domain::{ExtractionRequest, ModelSelection};

    fn request(content_type: &str) -> ModelRequest {
        let extraction = ExtractionRequest::new("https://x/doc", content_type).unwrap();
        ModelRequest::from_extraction(&extraction, &ModelSelection::default())
    }

    #[tokio::test]
    async fn test_configured_content() {
        let stub = StubAnalyzer::with_content(r#"{"amount": 1}"#);
        let content = stub.complete(&request("image/png")).await.unwrap();

        assert_eq!(content, r#"{"amount": 1}"#);
    }

    #[tokio::test]
    async fn test_error_stub() {
        let stub = StubAnalyzer::with_error(ExtractError::Transport("offline".to_string()));
        let result = stub.complete(&request("image/png")).await;

        assert!(matches!(result, Err(ExtractError::Transport(_))));
    }

    #[tokio::test]
    async fn test_canned_depends_on_media_kind() {
        let stub = StubAnalyzer::canned();

        let image: serde_json::Value =
            serde_json::from_str(&stub.complete(&request("image/png")).await.unwrap()).unwrap();
        let document: serde_json::Value =
            serde_json::from_str(&stub.complete(&request("application/pdf")).await.unwrap())
                .unwrap();

        assert_eq!(image["category"], "meal");
        assert_eq!(document["category"], "supplies");
        assert_eq!(image["currency"], "EUR");
    }
}
