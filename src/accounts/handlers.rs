use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::{RegisterRequest, UpdateUserRequest, UserView};
use super::services;
use crate::auth::extractors::{AuthUser, MaybeAuthUser};
use crate::error::ApiError;
use crate::extract::{ValidJson, ValidPath};
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(register))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload), fields(username = %payload.username, role = ?payload.role))]
pub async fn register(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<UserView>), ApiError> {
    let view = services::register(&state, caller.as_ref(), payload).await?;

    let mut headers = HeaderMap::new();
    let location = HeaderValue::from_str(&format!("/api/v1/users/{}", view.id()))
        .map_err(anyhow::Error::from)?;
    headers.insert(header::LOCATION, location);

    Ok((StatusCode::CREATED, headers, Json(view)))
}

#[instrument(skip(state, caller))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<UserView>>, ApiError> {
    Ok(Json(services::list(&state, &caller).await?))
}

#[instrument(skip(state, caller))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidPath(id): ValidPath<u64>,
) -> Result<Json<UserView>, ApiError> {
    Ok(Json(services::get(&state, &caller, id).await?))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidPath(id): ValidPath<u64>,
    ValidJson(payload): ValidJson<UpdateUserRequest>,
) -> Result<Json<UserView>, ApiError> {
    Ok(Json(services::update(&state, &caller, id, payload).await?))
}

#[instrument(skip(state, caller))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidPath(id): ValidPath<u64>,
) -> Result<StatusCode, ApiError> {
    services::delete(&state, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
