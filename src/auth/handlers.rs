use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    accounts::{dto::UserView, services as accounts},
    auth::{
        dto::{AuthResponse, BootstrapRequest, LoginRequest, RefreshRequest},
        extractors::AuthUser,
        services,
    },
    error::ApiError,
    extract::ValidJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/bootstrap", post(bootstrap))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(services::login(&state, payload).await?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(services::refresh(&state, payload).await?))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn bootstrap(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<BootstrapRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let resp = services::bootstrap(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[instrument(skip(state, caller), fields(user_id = caller.id))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<UserView>, ApiError> {
    Ok(Json(accounts::get(&state, &caller, caller.id).await?))
}
