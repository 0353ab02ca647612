use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::claims::TokenKind;
use super::jwt::JwtKeys;
use super::policy::Caller;
use crate::accounts::repo_types::Role;
use crate::error::ApiError;
use crate::residents::repo::ResidentStatus;
use crate::state::AppState;

/// Verified caller taken from a Bearer access token.
pub struct AuthUser(pub Caller);

/// Like [`AuthUser`] but anonymous requests pass through as `None`.
/// A header that is present yet invalid is still rejected.
pub struct MaybeAuthUser(pub Option<Caller>);

fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(header) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".into()))?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(Some)
        .ok_or_else(|| ApiError::Unauthorized("Invalid auth scheme".into()))
}

async fn resolve_caller(token: &str, state: &AppState) -> Result<Caller, ApiError> {
    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify(token).map_err(|_| {
        warn!("invalid or expired token");
        ApiError::Unauthorized("Invalid or expired token".into())
    })?;
    if claims.kind != TokenKind::Access {
        return Err(ApiError::Unauthorized("Access token required".into()));
    }
    let id = claims
        .account_id()
        .ok_or_else(|| ApiError::Unauthorized("Invalid token subject".into()))?;

    let accounts = state.accounts.lock().await;
    let statuses = state.statuses.lock().await;
    let account = accounts.get(id).ok_or_else(|| {
        warn!(account_id = id, "token for deleted account");
        ApiError::Unauthorized("Account no longer exists".into())
    })?;
    if account.role == Role::Resident && statuses.get(id) == Some(ResidentStatus::Deactivated) {
        warn!(account_id = id, "deactivated resident rejected");
        return Err(ApiError::Forbidden);
    }

    Ok(Caller {
        id: account.id,
        role: account.role,
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;
        Ok(AuthUser(resolve_caller(token, state).await?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => Ok(MaybeAuthUser(Some(resolve_caller(token, state).await?))),
            None => Ok(MaybeAuthUser(None)),
        }
    }
}
