use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::accounts::dto::{RegisterRequest, UpdateUserRequest, UserView};
use crate::accounts::repo_types::{AccountPatch, NewAccount, Role};
use crate::auth::password::hash_password;
use crate::auth::policy::{self, Caller};
use crate::error::ApiError;
use crate::residents::repo::ResidentStatus;
use crate::state::AppState;

pub(crate) fn validate_username(username: &str) -> Result<(), ApiError> {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^\S{1,64}$").unwrap();
    }
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "Username must be 1-64 characters without spaces".into(),
        ))
    }
}

pub(crate) fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::Validation("Password required".into()));
    }
    Ok(())
}

/// Register a resident or, for admin callers, another admin.
pub async fn register(
    state: &AppState,
    caller: Option<&Caller>,
    req: RegisterRequest,
) -> Result<UserView, ApiError> {
    if let Err(e) = policy::may_register(req.role, caller) {
        warn!(username = %req.username, "admin registration refused");
        return Err(e);
    }
    validate_username(&req.username)?;
    validate_password(&req.password)?;

    let password_hash = hash_password(&req.password)?;
    create_account(
        state,
        NewAccount {
            username: req.username,
            password_hash,
            contact: req.contact,
            barangay: req.barangay,
            role: req.role,
        },
    )
    .await
}

/// Insert an already-authorized account. Residents start out approved.
pub(crate) async fn create_account(
    state: &AppState,
    new: NewAccount,
) -> Result<UserView, ApiError> {
    let mut reg = state.registry().await;
    let account = match reg.accounts.insert(new, OffsetDateTime::now_utc()) {
        Ok(a) => a,
        Err(e) => {
            warn!("username already taken");
            return Err(e);
        }
    };
    if account.role == Role::Resident {
        reg.statuses.set(account.id, ResidentStatus::Approved);
    }
    info!(
        user_id = account.id,
        username = %account.username,
        role = ?account.role,
        total = reg.accounts.len(),
        "user registered"
    );
    Ok(UserView::of(&account, &reg.statuses, &reg.prompts))
}

pub async fn get(state: &AppState, caller: &Caller, id: u64) -> Result<UserView, ApiError> {
    policy::require_owner_or_admin(caller, id)?;
    let reg = state.registry().await;
    let account = reg.accounts.get(id).ok_or(ApiError::NotFound("user"))?;
    Ok(UserView::of(account, &reg.statuses, &reg.prompts))
}

pub async fn list(state: &AppState, caller: &Caller) -> Result<Vec<UserView>, ApiError> {
    policy::require_admin(caller)?;
    let reg = state.registry().await;
    Ok(reg
        .accounts
        .iter()
        .map(|a| UserView::of(a, &reg.statuses, &reg.prompts))
        .collect())
}

/// Partial update. A role change is an admin-only action and keeps the status table in step.
pub async fn update(
    state: &AppState,
    caller: &Caller,
    id: u64,
    req: UpdateUserRequest,
) -> Result<UserView, ApiError> {
    policy::require_owner_or_admin(caller, id)?;
    if let Some(username) = req.username.as_deref() {
        validate_username(username)?;
    }
    let password_hash = match req.password.as_deref() {
        Some(plain) => {
            validate_password(plain)?;
            Some(hash_password(plain)?)
        }
        None => None,
    };

    let mut reg = state.registry().await;
    let current_role = reg.accounts.get(id).ok_or(ApiError::NotFound("user"))?.role;
    let role_change = req.role.filter(|role| *role != current_role);
    if role_change.is_some() {
        policy::require_admin(caller)?;
    }

    let account = reg.accounts.update(
        id,
        AccountPatch {
            username: req.username,
            password_hash,
            contact: req.contact,
            barangay: req.barangay,
            role: role_change,
        },
    )?;
    match role_change {
        Some(Role::Admin) => {
            reg.statuses.remove(id);
        }
        Some(Role::Resident) => {
            reg.statuses.set(id, ResidentStatus::Approved);
        }
        None => {}
    }

    info!(user_id = id, role_changed = role_change.is_some(), "user updated");
    Ok(UserView::of(&account, &reg.statuses, &reg.prompts))
}

/// Remove an account together with its prompt entries and status record.
pub async fn delete(state: &AppState, caller: &Caller, id: u64) -> Result<(), ApiError> {
    policy::require_owner_or_admin(caller, id)?;
    let mut reg = state.registry().await;
    let account = reg.accounts.remove(id)?;
    let purged = reg.prompts.purge_owner(id);
    reg.statuses.remove(id);
    info!(user_id = id, username = %account.username, purged_prompts = purged, "user deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::dto::PromptRequest;
    use crate::prompts::services as prompts;

    const ROOT: Caller = Caller {
        id: 0,
        role: Role::Admin,
    };

    fn registration(username: &str, role: Role) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            password: "pw123".into(),
            contact: None,
            barangay: Some("Poblacion".into()),
            role,
        }
    }

    #[tokio::test]
    async fn register_assigns_id_and_approved_status() {
        let state = AppState::fake();
        let view = register(&state, None, registration("juan", Role::Resident))
            .await
            .unwrap();
        match view {
            UserView::Resident { id, status, prompts, .. } => {
                assert_eq!(id, 1);
                assert_eq!(status, ResidentStatus::Approved);
                assert!(prompts.is_empty());
            }
            other => panic!("expected resident view, got {other:?}"),
        }

        let stored = state.accounts.lock().await.get(1).cloned().unwrap();
        assert_ne!(stored.password_hash, "pw123");
        assert!(crate::auth::password::verify_password("pw123", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts_and_leaves_store_unchanged() {
        let state = AppState::fake();
        register(&state, None, registration("juan", Role::Resident))
            .await
            .unwrap();
        let err = register(&state, Some(&ROOT), registration("juan", Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict));
        assert_eq!(state.accounts.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn admin_registration_needs_admin_caller() {
        let state = AppState::fake();
        let resident = Caller {
            id: 1,
            role: Role::Resident,
        };
        for caller in [None, Some(&resident)] {
            let err = register(&state, caller, registration("kap", Role::Admin))
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Forbidden));
        }
        assert_eq!(state.accounts.lock().await.len(), 0);

        let view = register(&state, Some(&ROOT), registration("kap", Role::Admin))
            .await
            .unwrap();
        assert!(matches!(view, UserView::Admin { .. }));
        assert!(state.statuses.lock().await.get(view.id()).is_none());
    }

    #[tokio::test]
    async fn blank_username_is_rejected() {
        let state = AppState::fake();
        let err = register(&state, None, registration("  ", Role::Resident))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn contact_only_update_keeps_other_fields() {
        let state = AppState::fake();
        let id = register(&state, None, registration("juan", Role::Resident))
            .await
            .unwrap()
            .id();
        let caller = Caller {
            id,
            role: Role::Resident,
        };

        let view = update(
            &state,
            &caller,
            id,
            UpdateUserRequest {
                contact: Some("0917-555-0101".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        match view {
            UserView::Resident {
                username,
                contact,
                barangay,
                ..
            } => {
                assert_eq!(username, "juan");
                assert_eq!(contact.as_deref(), Some("0917-555-0101"));
                assert_eq!(barangay.as_deref(), Some("Poblacion"));
            }
            other => panic!("expected resident view, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn password_update_rehashes() {
        let state = AppState::fake();
        let id = register(&state, None, registration("juan", Role::Resident))
            .await
            .unwrap()
            .id();
        let before = state.accounts.lock().await.get(id).cloned().unwrap();

        update(
            &state,
            &ROOT,
            id,
            UpdateUserRequest {
                password: Some("new-pass".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let after = state.accounts.lock().await.get(id).cloned().unwrap();
        assert_ne!(before.password_hash, after.password_hash);
        assert!(crate::auth::password::verify_password("new-pass", &after.password_hash).unwrap());
    }

    #[tokio::test]
    async fn role_change_is_admin_only_and_syncs_status() {
        let state = AppState::fake();
        let id = register(&state, None, registration("juan", Role::Resident))
            .await
            .unwrap()
            .id();
        let self_caller = Caller {
            id,
            role: Role::Resident,
        };
        let promote = || UpdateUserRequest {
            role: Some(Role::Admin),
            ..Default::default()
        };

        let err = update(&state, &self_caller, id, promote()).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));

        let view = update(&state, &ROOT, id, promote()).await.unwrap();
        assert!(matches!(view, UserView::Admin { .. }));
        assert!(state.statuses.lock().await.get(id).is_none());

        let demote = UpdateUserRequest {
            role: Some(Role::Resident),
            ..Default::default()
        };
        update(&state, &ROOT, id, demote).await.unwrap();
        assert_eq!(
            state.statuses.lock().await.get(id),
            Some(ResidentStatus::Approved)
        );
    }

    #[tokio::test]
    async fn residents_cannot_touch_other_accounts() {
        let state = AppState::fake();
        register(&state, None, registration("juan", Role::Resident))
            .await
            .unwrap();
        let maria = register(&state, None, registration("maria", Role::Resident))
            .await
            .unwrap()
            .id();
        let juan = Caller {
            id: 1,
            role: Role::Resident,
        };

        assert!(matches!(get(&state, &juan, maria).await, Err(ApiError::Forbidden)));
        assert!(matches!(delete(&state, &juan, maria).await, Err(ApiError::Forbidden)));
        assert!(matches!(list(&state, &juan).await, Err(ApiError::Forbidden)));
        assert_eq!(list(&state, &ROOT).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_cascades_to_prompts_and_status() {
        let state = AppState::fake();
        let id = register(&state, None, registration("juan", Role::Resident))
            .await
            .unwrap()
            .id();
        let entry = prompts::create(
            &state,
            &ROOT,
            id,
            PromptRequest {
                title: "Request".into(),
                body: "Need certificate".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!((entry.id, entry.owner_id), (1, 1));

        delete(&state, &ROOT, id).await.unwrap();

        assert!(matches!(get(&state, &ROOT, id).await, Err(ApiError::NotFound(_))));
        assert!(matches!(
            prompts::get(&state, &ROOT, entry.id).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            prompts::list_for_resident(&state, &ROOT, id).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(state.statuses.lock().await.get(id).is_none());
        assert!(matches!(delete(&state, &ROOT, id).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_keeps_registration_order() {
        let state = AppState::fake();
        for (username, role) in [
            ("pedro", Role::Resident),
            ("kap", Role::Admin),
            ("ana", Role::Resident),
            ("maria", Role::Resident),
        ] {
            register(&state, Some(&ROOT), registration(username, role))
                .await
                .unwrap();
        }
        delete(&state, &ROOT, 3).await.unwrap();
        register(&state, None, registration("ana", Role::Resident))
            .await
            .unwrap();

        let views = list(&state, &ROOT).await.unwrap();
        assert_eq!(
            views.iter().map(UserView::id).collect::<Vec<_>>(),
            vec![1, 2, 4, 5]
        );
        assert!(matches!(views[1], UserView::Admin { .. }));
    }
}
