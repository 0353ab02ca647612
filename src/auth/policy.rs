use crate::accounts::repo_types::Role;
use crate::error::ApiError;

/// A verified caller. The role comes from the caller's account record, not from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: u64,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub fn require_admin(caller: &Caller) -> Result<(), ApiError> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Creating an admin account needs an admin caller; anyone may create a resident.
pub fn may_register(role: Role, caller: Option<&Caller>) -> Result<(), ApiError> {
    match (role, caller) {
        (Role::Resident, _) => Ok(()),
        (Role::Admin, Some(caller)) => require_admin(caller),
        (Role::Admin, None) => Err(ApiError::Forbidden),
    }
}

/// Per-resident resources are open to their owner and to admins.
pub fn require_owner_or_admin(caller: &Caller, owner_id: u64) -> Result<(), ApiError> {
    if caller.id == owner_id || caller.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Superuser bootstrap: the supplied secret must equal the configured one.
/// With no configured secret every attempt is refused.
pub fn check_bootstrap_token(expected: Option<&str>, supplied: &str) -> Result<(), ApiError> {
    match expected {
        Some(expected) if expected == supplied => Ok(()),
        _ => Err(ApiError::Forbidden),
    }
}
