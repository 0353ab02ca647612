use axum::extract::FromRef;
use tracing::{info, warn};

use crate::accounts::dto::UserView;
use crate::accounts::repo_types::{NewAccount, Role};
use crate::accounts::services::{create_account, validate_password, validate_username};
use crate::auth::dto::{AuthResponse, BootstrapRequest, LoginRequest, RefreshRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::policy;
use crate::error::ApiError;
use crate::residents::repo::ResidentStatus;
use crate::state::AppState;

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".into())
}

fn issue_tokens(state: &AppState, user: UserView) -> Result<AuthResponse, ApiError> {
    let keys = JwtKeys::from_ref(state);
    Ok(AuthResponse {
        access_token: keys.sign_access(user.id())?,
        refresh_token: keys.sign_refresh(user.id())?,
        token_type: "Bearer",
        user,
    })
}

/// Current view of a session's account. Deleted accounts and deactivated residents get no session.
async fn session_view(state: &AppState, account_id: u64) -> Result<UserView, ApiError> {
    let reg = state.registry().await;
    let account = reg
        .accounts
        .get(account_id)
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;
    if account.role == Role::Resident
        && reg.statuses.get(account_id) == Some(ResidentStatus::Deactivated)
    {
        warn!(user_id = account_id, "deactivated resident refused a session");
        return Err(ApiError::Forbidden);
    }
    Ok(UserView::of(account, &reg.statuses, &reg.prompts))
}

pub async fn login(state: &AppState, req: LoginRequest) -> Result<AuthResponse, ApiError> {
    let account = state
        .accounts
        .lock()
        .await
        .find_by_username(&req.username)
        .cloned();
    let Some(account) = account else {
        warn!(username = %req.username, "login unknown username");
        return Err(invalid_credentials());
    };

    if !verify_password(&req.password, &account.password_hash)? {
        warn!(user_id = account.id, "login invalid password");
        return Err(invalid_credentials());
    }

    let view = session_view(state, account.id).await?;
    info!(user_id = account.id, username = %account.username, "user logged in");
    issue_tokens(state, view)
}

pub async fn refresh(state: &AppState, req: RefreshRequest) -> Result<AuthResponse, ApiError> {
    let keys = JwtKeys::from_ref(state);
    let claims = keys
        .verify_refresh(&req.refresh_token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;
    let account_id = claims
        .account_id()
        .ok_or_else(|| ApiError::Unauthorized("Invalid token subject".into()))?;
    let view = session_view(state, account_id).await?;
    issue_tokens(state, view)
}

/// Create an admin account with the configured shared secret instead of an admin session.
pub async fn bootstrap(state: &AppState, req: BootstrapRequest) -> Result<AuthResponse, ApiError> {
    if let Err(e) =
        policy::check_bootstrap_token(state.config.bootstrap_token.as_deref(), &req.token)
    {
        warn!(username = %req.username, "bootstrap refused");
        return Err(e);
    }
    validate_username(&req.username)?;
    validate_password(&req.password)?;

    let password_hash = hash_password(&req.password)?;
    let view = create_account(
        state,
        NewAccount {
            username: req.username,
            password_hash,
            contact: req.contact,
            barangay: req.barangay,
            role: Role::Admin,
        },
    )
    .await?;
    info!(user_id = view.id(), "admin bootstrapped");
    issue_tokens(state, view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::dto::RegisterRequest;
    use crate::accounts::services::register;
    use crate::auth::policy::Caller;
    use crate::residents::services::set_status;

    fn bootstrap_request(token: &str) -> BootstrapRequest {
        BootstrapRequest {
            token: token.into(),
            username: "kapitan".into(),
            password: "s3cret-pass".into(),
            contact: None,
            barangay: Some("Poblacion".into()),
        }
    }

    async fn seed_resident(state: &AppState) -> u64 {
        register(
            state,
            None,
            RegisterRequest {
                username: "juan".into(),
                password: "pw123".into(),
                contact: None,
                barangay: None,
                role: Role::Resident,
            },
        )
        .await
        .unwrap()
        .id()
    }

    #[tokio::test]
    async fn bootstrap_with_configured_secret_creates_admin() {
        let state = AppState::fake();
        let resp = bootstrap(&state, bootstrap_request("let-me-in")).await.unwrap();
        assert!(matches!(resp.user, UserView::Admin { .. }));
        assert_eq!(resp.token_type, "Bearer");

        let claims = JwtKeys::from_ref(&state).verify(&resp.access_token).unwrap();
        assert_eq!(claims.account_id(), Some(resp.user.id()));
    }

    #[tokio::test]
    async fn bootstrap_with_wrong_or_missing_secret_is_forbidden() {
        let state = AppState::fake();
        let err = bootstrap(&state, bootstrap_request("guess")).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));

        let mut config = (*state.config).clone();
        config.bootstrap_token = None;
        let disabled = AppState::new(config);
        let err = bootstrap(&disabled, bootstrap_request("let-me-in"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
        assert_eq!(disabled.accounts.lock().await.len(), 0);
    }

    #[tokio::test]
    async fn login_checks_password() {
        let state = AppState::fake();
        let id = seed_resident(&state).await;

        let ok = login(
            &state,
            LoginRequest {
                username: "juan".into(),
                password: "pw123".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(ok.user.id(), id);

        for (username, password) in [("juan", "wrong"), ("nobody", "pw123")] {
            let err = login(
                &state,
                LoginRequest {
                    username: username.into(),
                    password: password.into(),
                },
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ApiError::Unauthorized(_)));
        }
    }

    #[tokio::test]
    async fn deactivated_resident_cannot_log_in() {
        let state = AppState::fake();
        let id = seed_resident(&state).await;
        let admin = Caller {
            id: 0,
            role: Role::Admin,
        };
        set_status(&state, &admin, id, ResidentStatus::Deactivated)
            .await
            .unwrap();

        let err = login(
            &state,
            LoginRequest {
                username: "juan".into(),
                password: "pw123".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[tokio::test]
    async fn refresh_issues_a_new_pair_and_rejects_access_tokens() {
        let state = AppState::fake();
        seed_resident(&state).await;
        let session = login(
            &state,
            LoginRequest {
                username: "juan".into(),
                password: "pw123".into(),
            },
        )
        .await
        .unwrap();

        let renewed = refresh(
            &state,
            RefreshRequest {
                refresh_token: session.refresh_token.clone(),
            },
        )
        .await
        .unwrap();
        assert_eq!(renewed.user.id(), session.user.id());

        let err = refresh(
            &state,
            RefreshRequest {
                refresh_token: session.access_token,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
