//! HTTP surface: chat relay, image jobs, health and metrics.

pub mod chat;
pub mod error;
pub mod health;
pub mod jobs;
pub mod metrics;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::models::generation::MessageResponse;
use error::ApiError;

/// Build the application router. The `/metrics` route is mounted only when
/// a Prometheus recorder handle is supplied.
pub fn build_router(state: AppState, prometheus: Option<Arc<PrometheusHandle>>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health::health_check).fallback(method_not_allowed))
        .route("/api/OmoshiroikotoItte", get(chat::oracle).fallback(method_not_allowed))
        .route("/api/spell", get(chat::spell).fallback(method_not_allowed))
        .route("/api/image", get(jobs::create_job).fallback(method_not_allowed))
        .route("/api/image/{id}", get(jobs::job_status).fallback(method_not_allowed))
        .route(
            "/api/image/{id}/result",
            get(jobs::job_result).fallback(method_not_allowed),
        )
        .fallback(greeting)
        .with_state(state);

    if let Some(handle) = prometheus {
        app = app.route(
            "/metrics",
            get(metrics::prometheus_metrics).with_state(handle),
        );
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    app.layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        // CorsLayer only sends allow-headers on preflight; browsers here expect it on every reply
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Any other path answers with a greeting, GET only.
async fn greeting(method: Method) -> Result<Json<MessageResponse>, ApiError> {
    if method != Method::GET {
        return Err(ApiError::MethodNotAllowed);
    }
    Ok(Json(MessageResponse {
        message: "Hello from oracle-relay!".to_string(),
    }))
}
