//! Extraction use case

use serde_json::Value;

use crate::{
    model::{ExpenseClassification, ExtractionRequest, ModelRequest, ModelSelection},
    ports::{DocumentAnalyzer, ExtractError},
    prompt::PROMPT_VERSION,
};

/// Decode the model's content string.
///
/// A JSON array (several proofs returned separately) collapses to its first element.
pub fn decode_content(content: &str) -> Result<Value, ExtractError> {
    let value: Value = serde_json::from_str(content).map_err(|_| ExtractError::Parse {
        raw_body: content.to_string(),
    })?;

    match value {
        Value::Array(items) => items.into_iter().next().ok_or(ExtractError::EmptyContent),
        other => Ok(other),
    }
}

/// Use case for extracting expense data from one document
pub struct ExtractUseCase<A> {
    analyzer: A,
    models: ModelSelection,
}

impl<A: DocumentAnalyzer> ExtractUseCase<A> {
    pub fn new(analyzer: A, models: ModelSelection) -> Self {
        Self { analyzer, models }
    }

    pub fn models(&self) -> &ModelSelection {
        &self.models
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub async fn extract(&self, request: &ExtractionRequest) -> Result<Value, ExtractError> {
        let model_request = ModelRequest::from_extraction(request, &self.models);

        tracing::info!(
            media_kind = %request.media_kind,
            model = %model_request.model,
            prompt_version = PROMPT_VERSION,
            "Extracting expense data"
        );

        let content = self.analyzer.complete(&model_request).await?;
        let value = decode_content(&content)?;

        match ExpenseClassification::from_value(&value) {
            Some(view) if view.is_rejected() => tracing::info!(
                comment = view.comment.as_deref().unwrap_or_default(),
                "Model rejected document"
            ),
            Some(view) => tracing::info!(
                category = ?view.category,
                confidence = ?view.confidence,
                "Expense extracted"
            ),
            None => tracing::debug!("Model content is not an object"),
        }

        Ok(value)
    }
}
