use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::accounts::repo_types::{Account, Role};
use crate::prompts::repo::{PromptEntry, Prompts};
use crate::residents::repo::{ResidentStatus, Statuses};

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub barangay: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Request body for a partial account update. Omitted fields stay as they are.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub contact: Option<String>,
    pub barangay: Option<String>,
    pub role: Option<Role>,
}

/// Public view of an account, discriminated by role. Never carries the credential.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum UserView {
    Resident {
        id: u64,
        username: String,
        contact: Option<String>,
        barangay: Option<String>,
        #[serde(with = "time::serde::rfc3339")]
        created_at: OffsetDateTime,
        status: ResidentStatus,
        prompts: Vec<PromptEntry>,
    },
    Admin {
        id: u64,
        username: String,
        contact: Option<String>,
        barangay: Option<String>,
        #[serde(with = "time::serde::rfc3339")]
        created_at: OffsetDateTime,
    },
}

impl UserView {
    /// Build the view of an account; residents get their status and prompt entries attached.
    pub fn of(account: &Account, statuses: &Statuses, prompts: &Prompts) -> Self {
        let account = account.clone();
        match account.role {
            Role::Resident => UserView::Resident {
                id: account.id,
                username: account.username,
                contact: account.contact,
                barangay: account.barangay,
                created_at: account.created_at,
                // every resident is seeded on registration
                status: statuses
                    .get(account.id)
                    .unwrap_or(ResidentStatus::Approved),
                prompts: prompts.by_owner(account.id),
            },
            Role::Admin => UserView::Admin {
                id: account.id,
                username: account.username,
                contact: account.contact,
                barangay: account.barangay,
                created_at: account.created_at,
            },
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            UserView::Resident { id, .. } | UserView::Admin { id, .. } => *id,
        }
    }
}
