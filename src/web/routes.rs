//! REST API routes
//!
//! Every request carries its own image and selection list; nothing is kept
//! between requests. Pixel work runs on the blocking pool.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::codec::{self, CodecError};
use crate::editor::RedactOp;
use crate::segment::SegmentError;
use crate::selection::{Rect, SelectionSet};
use crate::service::Investigator;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub investigator: Arc<Investigator>,
    pub version: String,
}

impl AppState {
    pub fn new(investigator: Arc<Investigator>) -> Self {
        Self {
            investigator,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(Investigator::default()))
    }
}

/// Build the API router
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/crop", post(crop))
        .route("/blackout", post(blackout))
        .route("/blur", post(blur))
        .route("/select_object", post(select_object))
        .route("/select", post(select))
        .route("/deselect", post(deselect))
}

// ============================================================
// Request / response bodies
// ============================================================

/// Image plus selections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    /// Base64 image, optionally as a `data:` URL
    #[serde(alias = "image")]
    pub image_base64: String,
    #[serde(default)]
    pub selections: SelectionSet,
}

/// Base64 PNG result; empty for a zero-area crop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub image_base64: String,
    /// Segmentation strategy that produced the mask (select_object only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub strategy: Option<String>,
}

/// Append `rect` to `selections`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectRequest {
    #[serde(default)]
    pub selections: SelectionSet,
    pub rect: Rect,
}

/// Remove every selection containing `(x, y)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRequest {
    #[serde(default)]
    pub selections: SelectionSet,
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionsResponse {
    pub selections: SelectionSet,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether an external matting model is installed
    pub matting: bool,
}

// ============================================================
// Handlers
// ============================================================

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        matting: state.investigator.matting_available(),
    })
}

async fn crop(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, AppError> {
    redact(state, RedactOp::Crop, request).await
}

async fn blackout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, AppError> {
    redact(state, RedactOp::Blackout, request).await
}

async fn blur(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, AppError> {
    redact(state, RedactOp::Blur, request).await
}

async fn redact(
    state: Arc<AppState>,
    op: RedactOp,
    request: ProcessRequest,
) -> Result<Json<ProcessResponse>, AppError> {
    let investigator = state.investigator.clone();
    let image_base64 = run_blocking(move || {
        let image = codec::decode_image(&request.image_base64)?;
        let output = investigator.redact(op, &image, &request.selections);
        Ok(codec::encode_image(&output)?)
    })
    .await?;

    Ok(Json(ProcessResponse {
        image_base64,
        strategy: None,
    }))
}

async fn select_object(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, AppError> {
    let investigator = state.investigator.clone();
    run_blocking(move || {
        let image = codec::decode_image(&request.image_base64)?;
        let extraction = investigator.select_object(&image, &request.selections)?;
        Ok(Json(ProcessResponse {
            image_base64: codec::encode_image(&extraction.image)?,
            strategy: Some(extraction.strategy.to_string()),
        }))
    })
    .await
}

async fn select(Json(request): Json<SelectRequest>) -> Json<SelectionsResponse> {
    Json(SelectionsResponse {
        selections: request.selections.add(request.rect),
    })
}

async fn deselect(Json(request): Json<PointRequest>) -> Json<SelectionsResponse> {
    Json(SelectionsResponse {
        selections: request.selections.remove_at_point(request.x, request.y),
    })
}

/// Run CPU-bound work off the async executor
async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Worker task failed: {}", e)))?
}

// ============================================================
// Errors
// ============================================================

/// API error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl From<CodecError> for AppError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Encode(_) => AppError::Internal(e.to_string()),
            CodecError::Base64(_) | CodecError::Decode(_) => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<SegmentError> for AppError {
    fn from(e: SegmentError) -> Self {
        match e {
            SegmentError::EmptyImage(..) => AppError::BadRequest(e.to_string()),
            SegmentError::StrategiesExhausted => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_new() {
        let state = AppState::default();
        assert!(!state.version.is_empty());
        assert!(!state.investigator.matting_available());
    }

    #[test]
    fn test_process_request_field_names() {
        let request: ProcessRequest = serde_json::from_str(
            r#"{"image_base64":"abc","selections":[{"x":1,"y":2,"width":3,"height":4}]}"#,
        )
        .unwrap();
        assert_eq!(request.image_base64, "abc");
        assert_eq!(request.selections.as_slice(), &[Rect::new(1, 2, 3, 4)]);

        let request: ProcessRequest = serde_json::from_str(r#"{"image":"xyz"}"#).unwrap();
        assert_eq!(request.image_base64, "xyz");
        assert!(request.selections.is_empty());
    }

    #[test]
    fn test_process_response_omits_strategy() {
        let json = serde_json::to_string(&ProcessResponse {
            image_base64: String::new(),
            strategy: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"image_base64":""}"#);
    }

    #[test]
    fn test_health_response_serialize() {
        let response = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            matting: false,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"matting\":false"));
    }

    #[test]
    fn test_error_mapping() {
        let bad = AppError::from(SegmentError::EmptyImage(0, 0));
        assert!(matches!(bad, AppError::BadRequest(_)));
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let internal = AppError::from(SegmentError::StrategiesExhausted);
        assert_eq!(internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
