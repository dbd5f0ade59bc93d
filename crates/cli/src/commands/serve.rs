//! Serve command - HTTP host for invocations
//!
//! Exposes the function on `/invoke` and on the path used by the Lambda
//! runtime interface emulator, so the same event payloads work locally and
//! behind a function URL.

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use expense_ocr_domain::ModelSelection;
use expense_ocr_domain::prompt::PROMPT_VERSION;
use expense_ocr_domain::usecases::InvocationResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::args::ServeArgs;
use crate::commands::invoke::{Handler, build_handler};
use crate::config::AppConfig;

pub const INVOKE_PATH: &str = "/invoke";
pub const LAMBDA_INVOKE_PATH: &str = "/2015-03-31/functions/function/invocations";

pub async fn execute(args: ServeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());

    let handler = Arc::new(build_handler(&config)?);
    let app = create_router(handler);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    tracing::info!(
        bind = %bind,
        provider = %config.llm.provider,
        "Serving invocations on {} and {}",
        INVOKE_PATH,
        LAMBDA_INVOKE_PATH
    );

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")
}

pub fn create_router(handler: Arc<Handler>) -> Router {
    Router::new()
        .route(INVOKE_PATH, post(invoke))
        .route(LAMBDA_INVOKE_PATH, post(invoke))
        .route("/health", get(health))
        .with_state(handler)
        .layer(TraceLayer::new_for_http())
}

/// The envelope is always delivered with HTTP 200; its `statusCode` carries the outcome
async fn invoke(State(handler): State<Arc<Handler>>, body: Bytes) -> Json<InvocationResult> {
    Json(handler.handle_json(&body).await)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub prompt_version: String,
    pub models: ModelSelection,
}

async fn health(State(handler): State<Arc<Handler>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        prompt_version: PROMPT_VERSION.to_string(),
        models: handler.models().clone(),
    })
}
