use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::models::generation::{MessageResponse, PromptQuery, Spell};
use crate::routes::error::ApiError;

fn validated(query: Result<Query<PromptQuery>, QueryRejection>) -> Result<PromptQuery, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    query
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(query)
}

/// GET /api/OmoshiroikotoItte?userInput= — chat completion in the wizard persona.
pub async fn oracle(
    State(state): State<AppState>,
    query: Result<Query<PromptQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let query = validated(query)?;
    let prompt = query.prompt_or(&state.prompts.default_prompt);

    let message = state
        .upstream
        .complete(&state.prompts.system_role, prompt)
        .await?;

    Ok(Json(MessageResponse { message }))
}

/// GET /api/spell?userInput= — structured completion returning a [`Spell`].
pub async fn spell(
    State(state): State<AppState>,
    query: Result<Query<PromptQuery>, QueryRejection>,
) -> Result<Json<Spell>, ApiError> {
    let query = validated(query)?;
    let prompt = query.prompt_or(&state.prompts.default_prompt);

    let value = state
        .upstream
        .complete_structured(&state.prompts.system_role, prompt, "spell", &Spell::schema())
        .await?;

    let spell: Spell = serde_json::from_value(value).map_err(|e| {
        ApiError::Upstream(crate::services::upstream::UpstreamError::Malformed(
            e.to_string(),
        ))
    })?;

    Ok(Json(spell))
}
