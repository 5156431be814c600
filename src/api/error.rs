use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::ErrorResponse;
use crate::services::EstimateError;

/// Errors surfaced by the estimate endpoint, mapped to HTTP statuses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No image provided")]
    MissingImage,
    #[error("Invalid upload: {0}")]
    BadRequest(String),
    #[error("Image exceeds the {limit} byte limit")]
    ImageTooLarge { limit: usize },
    #[error("Food vision provider URL is not configured")]
    NotConfigured,
    #[error("Food vision provider unavailable")]
    Upstream { details: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            ApiError::MissingImage | ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::ImageTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, None),
            ApiError::NotConfigured => {
                log::error!("❌ Estimate requested but FOOD_VISION_URL is not set");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            ApiError::Upstream { details } => {
                log::error!("❌ Food vision provider failed: {}", details);
                (StatusCode::BAD_GATEWAY, Some(details.clone()))
            }
            ApiError::Internal(detail) => {
                log::error!("❌ Internal error during estimation: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        // Internal details stay in the log.
        let message = match &self {
            ApiError::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            success: false,
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<EstimateError> for ApiError {
    fn from(err: EstimateError) -> Self {
        match err {
            EstimateError::NotConfigured => ApiError::NotConfigured,
            EstimateError::Transport(e) => ApiError::Upstream {
                details: e.details(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transport::{AttemptFailure, TransportError};
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_missing_image_returns_400() {
        let response = ApiError::MissingImage.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "No image provided");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_too_large_returns_413() {
        let response = ApiError::ImageTooLarge { limit: 10 }.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_not_configured_returns_500() {
        let api_err: ApiError = EstimateError::NotConfigured.into();
        let response = api_err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_transport_failure_returns_502_with_details() {
        let transport = TransportError {
            binary: AttemptFailure::Status {
                status: 500,
                body: "boom".to_string(),
            },
            json: AttemptFailure::Transport("timed out".to_string()),
        };
        let api_err: ApiError = EstimateError::Transport(transport).into();
        let response = api_err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        let details = json["details"].as_str().unwrap();
        assert!(details.contains("boom"));
        assert!(details.contains("timed out"));
    }

    #[tokio::test]
    async fn test_internal_hides_detail() {
        let response = ApiError::Internal("db password leaked".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["message"], "An internal error occurred");
    }
}
