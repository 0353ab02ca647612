use tracing::{info, warn};

use crate::accounts::dto::UserView;
use crate::accounts::repo_types::Role;
use crate::auth::policy::{self, Caller};
use crate::error::ApiError;
use crate::residents::dto::StatusView;
use crate::residents::repo::ResidentStatus;
use crate::state::AppState;

/// Admin-only. The account must exist and be a resident; the record itself is upserted.
pub async fn set_status(
    state: &AppState,
    caller: &Caller,
    resident_id: u64,
    status: ResidentStatus,
) -> Result<StatusView, ApiError> {
    if let Err(e) = policy::require_admin(caller) {
        warn!(caller_id = caller.id, resident_id, "status change refused");
        return Err(e);
    }
    let accounts = state.accounts.lock().await;
    accounts.resident(resident_id)?;
    let mut statuses = state.statuses.lock().await;
    let previous = statuses.set(resident_id, status);
    info!(resident_id, ?previous, ?status, "resident status set");
    Ok(StatusView {
        resident_id,
        status,
    })
}

pub async fn get_status(
    state: &AppState,
    caller: &Caller,
    resident_id: u64,
) -> Result<StatusView, ApiError> {
    policy::require_owner_or_admin(caller, resident_id)?;
    let accounts = state.accounts.lock().await;
    accounts.resident(resident_id)?;
    let statuses = state.statuses.lock().await;
    let status = statuses
        .get(resident_id)
        .ok_or(ApiError::NotFound("resident status"))?;
    Ok(StatusView {
        resident_id,
        status,
    })
}

/// Resident views with the given status, in registration order.
pub async fn list_by_status(
    state: &AppState,
    caller: &Caller,
    status: ResidentStatus,
) -> Result<Vec<UserView>, ApiError> {
    policy::require_admin(caller)?;
    let reg = state.registry().await;
    Ok(reg
        .accounts
        .iter()
        .filter(|a| a.role == Role::Resident && reg.statuses.get(a.id) == Some(status))
        .map(|a| UserView::of(a, &reg.statuses, &reg.prompts))
        .collect())
}

pub async fn list_statuses(
    state: &AppState,
    caller: &Caller,
) -> Result<Vec<StatusView>, ApiError> {
    policy::require_admin(caller)?;
    let statuses = state.statuses.lock().await;
    Ok(statuses
        .iter()
        .map(|(resident_id, status)| StatusView {
            resident_id,
            status,
        })
        .collect())
}
