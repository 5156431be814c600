use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::models::EstimateResponse;
use crate::services::FoodEstimator;

pub mod error;

pub use error::ApiError;

/// Room for multipart boundaries and headers on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Field names accepted for the uploaded photo.
const IMAGE_FIELDS: &[&str] = &["image", "file"];

pub struct AppState {
    pub estimator: Arc<dyn FoodEstimator>,
    pub max_image_bytes: usize,
    pub include_raw: bool,
}

pub fn create_router(
    estimator: Arc<dyn FoodEstimator>,
    max_image_bytes: usize,
    include_raw: bool,
) -> Router {
    let state = Arc::new(AppState {
        estimator,
        max_image_bytes,
        include_raw,
    });

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/api/food/estimate", post(estimate_handler))
        .layer(DefaultBodyLimit::max(
            max_image_bytes.saturating_add(MULTIPART_OVERHEAD),
        ))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

async fn estimate_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, axum::extract::multipart::MultipartRejection>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let image = read_image(&mut multipart, state.max_image_bytes).await?;
    log::info!("📸 Estimate request with {} byte image", image.len());

    let estimation = state.estimator.estimate(image).await?;

    Ok(Json(EstimateResponse {
        success: true,
        predictions: estimation.predictions,
        raw: state.include_raw.then_some(estimation.raw),
    }))
}

/// Pull the first image field out of the upload, enforcing the size ceiling.
async fn read_image(multipart: &mut Multipart, max_bytes: usize) -> Result<Vec<u8>, ApiError> {
    let too_large = || ApiError::ImageTooLarge { limit: max_bytes };
    let upload_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::ImageTooLarge { limit: max_bytes }
        } else {
            ApiError::BadRequest(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let is_image = field
            .name()
            .map(|name| IMAGE_FIELDS.contains(&name))
            .unwrap_or(false);
        if !is_image {
            continue;
        }

        let bytes = field.bytes().await.map_err(upload_error)?;
        if bytes.is_empty() {
            return Err(ApiError::MissingImage);
        }
        if bytes.len() > max_bytes {
            return Err(too_large());
        }
        return Ok(bytes.to_vec());
    }

    Err(ApiError::MissingImage)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal(format!("handler panicked: {}", detail)).into_response()
}

async fn root_handler() -> &'static str {
    "Food Vision Proxy - POST an image to /api/food/estimate"
}

async fn health_check() -> &'static str {
    "OK"
}
