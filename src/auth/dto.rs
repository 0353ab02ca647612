use serde::{Deserialize, Serialize};

use crate::accounts::dto::UserView;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Creates an admin account when `token` matches the configured bootstrap secret.
#[derive(Debug, Deserialize)]
pub struct BootstrapRequest {
    pub token: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub barangay: Option<String>,
}

/// Response returned after login, refresh or bootstrap.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub user: UserView,
}
