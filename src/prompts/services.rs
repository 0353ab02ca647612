use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::policy::{self, Caller};
use crate::error::ApiError;
use crate::prompts::dto::PromptRequest;
use crate::prompts::repo::PromptEntry;
use crate::state::AppState;

/// Append an entry for a resident, stamped with the server clock.
pub async fn create(
    state: &AppState,
    caller: &Caller,
    resident_id: u64,
    req: PromptRequest,
) -> Result<PromptEntry, ApiError> {
    policy::require_owner_or_admin(caller, resident_id)?;
    let accounts = state.accounts.lock().await;
    accounts.resident(resident_id)?;
    // accounts stays locked so the owner cannot be deleted mid-append
    let mut prompts = state.prompts.lock().await;
    let entry = prompts.append(resident_id, req.title, req.body, OffsetDateTime::now_utc());
    info!(prompt_id = entry.id, owner_id = resident_id, "prompt created");
    Ok(entry)
}

/// Entries of a resident; unknown ids and admin accounts are errors.
pub async fn list_for_resident(
    state: &AppState,
    caller: &Caller,
    resident_id: u64,
) -> Result<Vec<PromptEntry>, ApiError> {
    policy::require_owner_or_admin(caller, resident_id)?;
    let accounts = state.accounts.lock().await;
    accounts.resident(resident_id)?;
    let prompts = state.prompts.lock().await;
    Ok(prompts.by_owner(resident_id))
}

/// Entries by owner id without checking the owner; unknown owners give an empty list.
pub async fn list_by_owner(
    state: &AppState,
    caller: &Caller,
    owner_id: u64,
) -> Result<Vec<PromptEntry>, ApiError> {
    policy::require_owner_or_admin(caller, owner_id)?;
    Ok(state.prompts.lock().await.by_owner(owner_id))
}

pub async fn list_all(state: &AppState, caller: &Caller) -> Result<Vec<PromptEntry>, ApiError> {
    policy::require_admin(caller)?;
    Ok(state.prompts.lock().await.all())
}

/// Another resident's entry reads as missing, so ids do not leak across owners.
fn visible<'a>(
    caller: &Caller,
    id: u64,
    entry: Option<&'a PromptEntry>,
) -> Result<&'a PromptEntry, ApiError> {
    let entry = entry.ok_or(ApiError::NotFound("prompt"))?;
    policy::require_owner_or_admin(caller, entry.owner_id).map_err(|_| {
        warn!(caller_id = caller.id, prompt_id = id, "prompt of another owner requested");
        ApiError::NotFound("prompt")
    })?;
    Ok(entry)
}

pub async fn get(state: &AppState, caller: &Caller, id: u64) -> Result<PromptEntry, ApiError> {
    let prompts = state.prompts.lock().await;
    Ok(visible(caller, id, prompts.get(id))?.clone())
}

pub async fn update(
    state: &AppState,
    caller: &Caller,
    id: u64,
    req: PromptRequest,
) -> Result<PromptEntry, ApiError> {
    let mut prompts = state.prompts.lock().await;
    visible(caller, id, prompts.get(id))?;
    let entry = prompts.update(id, req.title, req.body)?;
    info!(prompt_id = id, "prompt updated");
    Ok(entry)
}

pub async fn delete(state: &AppState, caller: &Caller, id: u64) -> Result<(), ApiError> {
    let mut prompts = state.prompts.lock().await;
    let owner_id = visible(caller, id, prompts.get(id))?.owner_id;
    prompts.remove(id)?;
    info!(prompt_id = id, owner_id, "prompt deleted");
    Ok(())
}
