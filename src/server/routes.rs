//! HTTP routes
//!
//! - `GET /api/analyze?address=0x...` - analyze one wallet
//! - `GET /health` - liveness probe

use super::state::AppState;
use crate::error::AnalyzerError;
use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

pub const MSG_ADDRESS_REQUIRED: &str = "Wallet address is required";
pub const MSG_INVALID_ADDRESS: &str = "Invalid wallet address";
pub const MSG_ANALYSIS_FAILED: &str = "Failed to analyze wallet. Please try again.";

#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    pub address: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods([Method::GET]);

    Router::new()
        .route("/api/analyze", get(analyze_wallet))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// JSON error body `{"error": message}`
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn analyzer_error_response(err: &AnalyzerError) -> Response {
    match err {
        AnalyzerError::MissingAddress => error_response(StatusCode::BAD_REQUEST, MSG_ADDRESS_REQUIRED),
        AnalyzerError::InvalidAddress(_) => error_response(StatusCode::BAD_REQUEST, MSG_INVALID_ADDRESS),
        AnalyzerError::Internal(detail) => {
            error!("❌ Wallet analysis failed: {}", detail);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_ANALYSIS_FAILED)
        }
    }
}

async fn analyze_wallet(State(state): State<AppState>, Query(params): Query<AnalyzeParams>) -> Response {
    let address = params.address.unwrap_or_default();
    info!("🔍 Analyze request for {:?}", address);

    // Run on its own task so a panic in the pipeline becomes a 500
    let analyzer = state.analyzer.clone();
    let outcome = tokio::spawn(async move { analyzer.analyze(&address).await })
        .await
        .unwrap_or_else(|join_err| Err(AnalyzerError::Internal(join_err.to_string())));

    match outcome {
        Ok(result) => Json(result).into_response(),
        Err(err) => analyzer_error_response(&err),
    }
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "uptimeSecs": state.uptime_secs(),
    }))
}
