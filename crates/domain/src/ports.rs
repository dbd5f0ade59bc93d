//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::{Value, json};
use thiserror::Error;

use crate::model::ModelRequest;

/// Error type for a single extraction
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    #[error("Network error: {0}")]
    Transport(String),
    #[error("{message}")]
    Api { message: String, body: Value },
    #[error("Invalid JSON response")]
    Parse { raw_body: String },
    #[error("Model returned an empty list of proofs")]
    EmptyContent,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Credential error: {0}")]
    Credential(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractError {
    /// Structured stand-in for a body that could not be parsed as JSON
    pub fn invalid_json(raw_body: &str) -> Value {
        json!({
            "error": "Invalid JSON response",
            "raw_body": raw_body,
        })
    }

    /// The value returned to the caller for this failure
    pub fn payload(&self) -> Value {
        match self {
            Self::Api { body, .. } => body.clone(),
            Self::Parse { raw_body } => Self::invalid_json(raw_body),
            other => Value::String(other.to_string()),
        }
    }
}

/// Port for a chat-completion call against a multimodal model
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Issue one request and return the raw `choices[0].message.content` text
    async fn complete(&self, request: &ModelRequest) -> Result<String, ExtractError>;
}

#[async_trait]
impl<A: DocumentAnalyzer + ?Sized> DocumentAnalyzer for &A {
    async fn complete(&self, request: &ModelRequest) -> Result<String, ExtractError> {
        (**self).complete(request).await
    }
}

#[async_trait]
impl<A: DocumentAnalyzer + ?Sized> DocumentAnalyzer for Box<A> {
    async fn complete(&self, request: &ModelRequest) -> Result<String, ExtractError> {
        (**self).complete(request).await
    }
}

/// Error type for secret store lookups
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Secret not found: {0}")]
    NotFound(String),
    #[error("Secret store unavailable: {0}")]
    Unavailable(String),
    #[error("Timed out fetching secret")]
    Timeout,
}

/// Port for a parameter/secret store holding the API credential
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the secret value
    async fn fetch(&self) -> Result<SecretString, SecretError>;

    /// Short human-readable description (never includes the value)
    fn describe(&self) -> String;
}
