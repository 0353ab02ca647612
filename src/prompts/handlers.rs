use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use super::dto::{OwnerFilter, PromptRequest};
use super::repo::PromptEntry;
use super::services;
use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::extract::{ValidJson, ValidPath, ValidQuery};
use crate::state::AppState;

pub fn prompt_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/residents/:id/prompts",
            get(list_for_resident).post(create_prompt),
        )
        .route("/prompts", get(list_prompts))
        .route(
            "/prompts/:id",
            get(get_prompt).put(update_prompt).delete(delete_prompt),
        )
}

#[instrument(skip(state, caller, payload))]
pub async fn create_prompt(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidPath(resident_id): ValidPath<u64>,
    ValidJson(payload): ValidJson<PromptRequest>,
) -> Result<(StatusCode, Json<PromptEntry>), ApiError> {
    let entry = services::create(&state, &caller, resident_id, payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state, caller))]
pub async fn list_for_resident(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidPath(resident_id): ValidPath<u64>,
) -> Result<Json<Vec<PromptEntry>>, ApiError> {
    Ok(Json(
        services::list_for_resident(&state, &caller, resident_id).await?,
    ))
}

/// `?owner_id=` lists one owner's entries, tolerating unknown owners; no filter lists all.
#[instrument(skip(state, caller))]
pub async fn list_prompts(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidQuery(filter): ValidQuery<OwnerFilter>,
) -> Result<Json<Vec<PromptEntry>>, ApiError> {
    let entries = match filter.owner_id {
        Some(owner_id) => services::list_by_owner(&state, &caller, owner_id).await?,
        None => services::list_all(&state, &caller).await?,
    };
    Ok(Json(entries))
}

#[instrument(skip(state, caller))]
pub async fn get_prompt(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidPath(id): ValidPath<u64>,
) -> Result<Json<PromptEntry>, ApiError> {
    Ok(Json(services::get(&state, &caller, id).await?))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_prompt(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidPath(id): ValidPath<u64>,
    ValidJson(payload): ValidJson<PromptRequest>,
) -> Result<Json<PromptEntry>, ApiError> {
    Ok(Json(services::update(&state, &caller, id, payload).await?))
}

#[instrument(skip(state, caller))]
pub async fn delete_prompt(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidPath(id): ValidPath<u64>,
) -> Result<StatusCode, ApiError> {
    services::delete(&state, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
