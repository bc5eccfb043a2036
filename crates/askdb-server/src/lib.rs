//! AskDB Server: the HTTP shell around the pipeline
//!
//! One JSON endpoint: `POST /ask` takes `{"question": ...}` and returns
//! the pipeline trace as an array of per-stage updates, in stage order.
//! Pipeline failures map to error statuses here; the pipeline itself knows
//! nothing about HTTP.

use askdb_core::StageUpdate;
use askdb_pipeline::{Pipeline, PipelineError};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the process-wide tracing subscriber (binaries call this once)
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

/// Build the application router over a shared pipeline
pub fn create_router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ask", post(ask_handler))
        .with_state(pipeline)
}

/// Bind and serve until the process exits
pub async fn serve(addr: SocketAddr, pipeline: Arc<Pipeline>) -> anyhow::Result<()> {
    let app = create_router(pipeline);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("askdb listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    #[serde(default)]
    question: String,
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn ask_handler(
    State(pipeline): State<Arc<Pipeline>>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<Vec<StageUpdate>>, AskError> {
    info!(question = %payload.question, "incoming question");
    let updates = pipeline.run(&payload.question).await?;
    Ok(Json(updates))
}

/// Pipeline failure mapped onto an HTTP status
struct AskError(PipelineError);

impl From<PipelineError> for AskError {
    fn from(e: PipelineError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AskError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PipelineError::EmptyQuestion => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(error = %self.0, "pipeline run failed");
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
