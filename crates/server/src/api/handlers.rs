use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use anitrack_core::{LibraryError, SanitizedConfig};

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// Error half of every fallible handler.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub type ApiResult<T> = Result<T, ApiError>;

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map a library store error onto an HTTP status.
pub fn library_error(e: LibraryError) -> ApiError {
    let status = match &e {
        LibraryError::NotFound(_) => StatusCode::NOT_FOUND,
        LibraryError::Forbidden(_) => StatusCode::FORBIDDEN,
        LibraryError::Conflict(_) => StatusCode::CONFLICT,
        LibraryError::Validation(_) => StatusCode::BAD_REQUEST,
        LibraryError::Database(_) => {
            error!("Library store failure: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    api_error(status, e.to_string())
}

/// A number that form-style clients may also send as text.
///
/// Deserialization never fails: fractional numbers are truncated and
/// anything that is not a number reads as zero.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(i64),
    Fraction(f64),
    Text(String),
    Other(serde_json::Value),
}

impl LooseNumber {
    pub fn value(&self) -> i64 {
        match self {
            LooseNumber::Number(n) => *n,
            LooseNumber::Fraction(f) => f.trunc() as i64,
            LooseNumber::Text(text) => text.trim().parse().unwrap_or(0),
            LooseNumber::Other(_) => 0,
        }
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// GET /metrics
///
/// Prometheus text exposition.
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
