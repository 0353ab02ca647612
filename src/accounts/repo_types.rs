use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Account role. Residents carry a status and own prompt entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Resident,
    Admin,
}

/// Account record held by the account store.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: u64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed
    pub contact: Option<String>,
    pub barangay: Option<String>,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields of an account about to be inserted; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub contact: Option<String>,
    pub barangay: Option<String>,
    pub role: Role,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub contact: Option<String>,
    pub barangay: Option<String>,
    pub role: Option<Role>,
}
