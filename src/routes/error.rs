use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::services::store::StoreError;
use crate::services::upstream::UpstreamError;

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors a route handler can return.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream(e) => {
                tracing::warn!(error = %e, "Upstream request failed");
                StatusCode::BAD_GATEWAY
            }
            ApiError::Store(StoreError::UnknownId(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Full(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(e) => {
                tracing::error!(error = %e, "Job store invariant violated");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
