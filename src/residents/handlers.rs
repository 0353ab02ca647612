use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::dto::{StatusFilter, StatusRequest, StatusView};
use super::services;
use crate::accounts::dto::UserView;
use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::extract::{ValidJson, ValidPath, ValidQuery};
use crate::state::AppState;

pub fn resident_routes() -> Router<AppState> {
    Router::new()
        .route("/residents", get(list_by_status))
        .route("/residents/statuses", get(list_statuses))
        .route("/residents/:id/status", get(get_status).put(set_status))
}

#[instrument(skip(state, caller))]
pub async fn list_by_status(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidQuery(filter): ValidQuery<StatusFilter>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    Ok(Json(
        services::list_by_status(&state, &caller, filter.status).await?,
    ))
}

#[instrument(skip(state, caller))]
pub async fn list_statuses(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<StatusView>>, ApiError> {
    Ok(Json(services::list_statuses(&state, &caller).await?))
}

#[instrument(skip(state, caller))]
pub async fn get_status(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidPath(id): ValidPath<u64>,
) -> Result<Json<StatusView>, ApiError> {
    Ok(Json(services::get_status(&state, &caller, id).await?))
}

#[instrument(skip(state, caller))]
pub async fn set_status(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidPath(id): ValidPath<u64>,
    ValidJson(payload): ValidJson<StatusRequest>,
) -> Result<Json<StatusView>, ApiError> {
    Ok(Json(
        services::set_status(&state, &caller, id, payload.status).await?,
    ))
}
