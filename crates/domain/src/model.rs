//! Domain models and value objects

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ports::ExtractError;
use crate::prompt::EXPENSE_PROMPT;

/// Whether a document is sent to the model as an image or as a general document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Document,
}

impl MediaKind {
    /// Resolve a media kind from a MIME type or an explicit `image`/`document` tag.
    ///
    /// Any MIME type under `image/` is an image, every other non-empty value is
    /// a document.
    pub fn from_content_type(content_type: &str) -> Result<Self, ExtractError> {
        let normalized = content_type.trim().to_ascii_lowercase();

        match normalized.as_str() {
            "" => Err(ExtractError::InvalidRequest(
                "content type is required".to_string(),
            )),
            "image" => Ok(Self::Image),
            "document" => Ok(Self::Document),
            other if other.starts_with("image/") => Ok(Self::Image),
            _ => Ok(Self::Document),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single extraction request built from caller-supplied fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// URL of the image or document to analyze
    pub document_reference: String,
    /// How the document is presented to the model
    pub media_kind: MediaKind,
}

impl ExtractionRequest {
    /// Validate caller input and build a request
    pub fn new(url: &str, content_type: &str) -> Result<Self, ExtractError> {
        let document_reference = url.trim();
        if document_reference.is_empty() {
            return Err(ExtractError::InvalidRequest(
                "document url is required".to_string(),
            ));
        }

        Ok(Self {
            document_reference: document_reference.to_string(),
            media_kind: MediaKind::from_content_type(content_type)?,
        })
    }
}

/// The media reference part of a model request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPart {
    ImageUrl(String),
    DocumentUrl(String),
}

impl MediaPart {
    pub fn url(&self) -> &str {
        match self {
            Self::ImageUrl(url) | Self::DocumentUrl(url) => url,
        }
    }

    pub fn media_kind(&self) -> MediaKind {
        match self {
            Self::ImageUrl(_) => MediaKind::Image,
            Self::DocumentUrl(_) => MediaKind::Document,
        }
    }
}

pub const DEFAULT_IMAGE_MODEL: &str = "pixtral-large-latest";
pub const DEFAULT_DOCUMENT_MODEL: &str = "mistral-small-latest";

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_document_model() -> String {
    DEFAULT_DOCUMENT_MODEL.to_string()
}

/// Model identifiers selected per media kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
    /// Vision-capable model used for images
    #[serde(default = "default_image_model")]
    pub image: String,
    /// Model used for PDFs and other documents
    #[serde(default = "default_document_model")]
    pub document: String,
}

impl ModelSelection {
    pub fn model_for(&self, kind: MediaKind) -> &str {
        match kind {
            MediaKind::Image => &self.image,
            MediaKind::Document => &self.document,
        }
    }
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            image: default_image_model(),
            document: default_document_model(),
        }
    }
}

/// Provider-agnostic chat request: one user message with prompt text and one media part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    pub model: String,
    pub prompt_text: String,
    pub media_part: MediaPart,
}

impl ModelRequest {
    pub fn from_extraction(request: &ExtractionRequest, models: &ModelSelection) -> Self {
        let url = request.document_reference.clone();
        let media_part = match request.media_kind {
            MediaKind::Image => MediaPart::ImageUrl(url),
            MediaKind::Document => MediaPart::DocumentUrl(url),
        };

        Self {
            model: models.model_for(request.media_kind).to_string(),
            prompt_text: format!("{}\n\n", EXPENSE_PROMPT),
            media_part,
        }
    }

    /// Recover the request this model request was derived from
    pub fn extraction(&self) -> ExtractionRequest {
        ExtractionRequest {
            document_reference: self.media_part.url().to_string(),
            media_kind: self.media_part.media_kind(),
        }
    }
}

/// Status reported by the model inside its JSON answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationStatus {
    #[default]
    Success,
    Error,
}

/// Lenient typed view of the model's answer.
///
/// Only used for logging; the caller always receives the untouched JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseClassification {
    #[serde(default)]
    pub status: ClassificationStatus,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub date: Option<String>,
    pub expense_type: Option<String>,
    pub category: Option<String>,
    pub confidence: Option<f64>,
    pub comment: Option<String>,
}

impl ExpenseClassification {
    /// Read the classification fields out of a content value, if it is an object
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn is_rejected(&self) -> bool {
        self.status == ClassificationStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_kind_from_mime_types() {
        assert_eq!(
            MediaKind::from_content_type("image/jpeg").unwrap(),
            MediaKind::Image
        );
        assert_eq!(
            MediaKind::from_content_type("IMAGE/PNG").unwrap(),
            MediaKind::Image
        );
        assert_eq!(
            MediaKind::from_content_type("application/pdf").unwrap(),
            MediaKind::Document
        );
        assert_eq!(
            MediaKind::from_content_type("text/plain").unwrap(),
            MediaKind::Document
        );
    }

    #[test]
    fn test_media_kind_from_explicit_tags() {
        assert_eq!(
            MediaKind::from_content_type("image").unwrap(),
            MediaKind::Image
        );
        assert_eq!(
            MediaKind::from_content_type(" document ").unwrap(),
            MediaKind::Document
        );
    }

    #[test]
    fn test_media_kind_rejects_empty() {
        let err = MediaKind::from_content_type("  ").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidRequest(_)));
    }

    #[test]
    fn test_extraction_request_requires_url() {
        let err = ExtractionRequest::new("", "image/jpeg").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidRequest(_)));
    }

    #[test]
    fn test_model_request_for_image_uses_image_model() {
        let request = ExtractionRequest::new("https://x/receipt.jpg", "image/jpeg").unwrap();
        let model_request = ModelRequest::from_extraction(&request, &ModelSelection::default());

        assert_eq!(model_request.model, "pixtral-large-latest");
        assert_eq!(
            model_request.media_part,
            MediaPart::ImageUrl("https://x/receipt.jpg".to_string())
        );
        assert!(model_request.prompt_text.starts_with(EXPENSE_PROMPT));
    }

    #[test]
    fn test_model_request_for_document_uses_document_model() {
        let request = ExtractionRequest::new("https://x/invoice.pdf", "application/pdf").unwrap();
        let models = ModelSelection {
            image: "vision".to_string(),
            document: "text".to_string(),
        };
        let model_request = ModelRequest::from_extraction(&request, &models);

        assert_eq!(model_request.model, "text");
        assert_eq!(
            model_request.media_part,
            MediaPart::DocumentUrl("https://x/invoice.pdf".to_string())
        );
    }

    #[test]
    fn test_model_request_recovers_extraction() {
        let request = ExtractionRequest::new("https://x/invoice.pdf", "document").unwrap();
        let model_request = ModelRequest::from_extraction(&request, &ModelSelection::default());

        assert_eq!(model_request.extraction(), request);
    }

    #[test]
    fn test_classification_view_of_rejection() {
        let value = json!({"status": "error", "comment": "not an expense proof"});
        let view = ExpenseClassification::from_value(&value).unwrap();

        assert!(view.is_rejected());
        assert_eq!(view.comment.as_deref(), Some("not an expense proof"));
    }

    #[test]
    fn test_classification_view_ignores_non_objects() {
        assert!(ExpenseClassification::from_value(&json!("plain text")).is_none());
    }

    #[test]
    fn test_model_selection_fills_missing_fields_with_defaults() {
        let selection: ModelSelection =
            serde_json::from_value(json!({"image": "pixtral-12b-2409"})).unwrap();

        assert_eq!(selection.image, "pixtral-12b-2409");
        assert_eq!(selection.document, DEFAULT_DOCUMENT_MODEL);
    }
}
