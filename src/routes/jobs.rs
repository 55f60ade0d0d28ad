use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::models::generation::{ImageOptions, ImageQuery, JobCreatedResponse};
use crate::models::job::JobState;
use crate::routes::error::ApiError;

/// GET /api/image?prompt=&size= — start an image-generation job.
pub async fn create_job(
    State(state): State<AppState>,
    query: Result<Query<ImageQuery>, QueryRejection>,
) -> Result<(StatusCode, Json<JobCreatedResponse>), ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    query
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let options = ImageOptions {
        size: query.size.unwrap_or(state.prompts.image_size),
    };
    let job_id = state.runner.submit(query.prompt, options).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(JobCreatedResponse {
            job_id,
            status: "pending".to_string(),
        }),
    ))
}

/// GET /api/image/{id} — current state of a job.
pub async fn job_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobState>, ApiError> {
    let job = state
        .jobs
        .get(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Job not found: {}", id)))?;

    Ok(Json(job.state))
}

/// GET /api/image/{id}/result — redirect to the generated image once ready.
pub async fn job_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let job = state
        .jobs
        .get(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Job not found: {}", id)))?;

    let response = match job.state {
        JobState::Complete { url } => (StatusCode::FOUND, [(header::LOCATION, url)]).into_response(),
        pending @ JobState::Pending => (StatusCode::ACCEPTED, Json(pending)).into_response(),
        failed @ JobState::Error { .. } => (StatusCode::BAD_GATEWAY, Json(failed)).into_response(),
    };

    Ok(response)
}
