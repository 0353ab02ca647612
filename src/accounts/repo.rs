use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::{Mutex, MutexGuard};

use crate::accounts::repo_types::{Account, AccountPatch, NewAccount, Role};
use crate::error::ApiError;

/// Shared handle to the in-memory account table.
#[derive(Clone, Default)]
pub struct AccountStore {
    inner: Arc<Mutex<Accounts>>,
}

impl AccountStore {
    pub async fn lock(&self) -> MutexGuard<'_, Accounts> {
        self.inner.lock().await
    }
}

/// Accounts in insertion order. Ids come from a counter that deletions never rewind.
#[derive(Debug, Default)]
pub struct Accounts {
    records: Vec<Account>,
    last_id: u64,
}

impl Accounts {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.records.iter()
    }

    pub fn get(&self, id: u64) -> Option<&Account> {
        self.records.iter().find(|a| a.id == id)
    }

    pub fn find_by_username(&self, username: &str) -> Option<&Account> {
        self.records.iter().find(|a| a.username == username)
    }

    /// Look up an account that must be a resident.
    pub fn resident(&self, id: u64) -> Result<&Account, ApiError> {
        let account = self.get(id).ok_or(ApiError::NotFound("user"))?;
        if account.role != Role::Resident {
            return Err(ApiError::InvalidRole);
        }
        Ok(account)
    }

    pub fn insert(&mut self, new: NewAccount, now: OffsetDateTime) -> Result<Account, ApiError> {
        if self.find_by_username(&new.username).is_some() {
            return Err(ApiError::Conflict);
        }
        self.last_id += 1;
        let account = Account {
            id: self.last_id,
            username: new.username,
            password_hash: new.password_hash,
            contact: new.contact,
            barangay: new.barangay,
            role: new.role,
            created_at: now,
        };
        self.records.push(account.clone());
        Ok(account)
    }

    pub fn update(&mut self, id: u64, patch: AccountPatch) -> Result<Account, ApiError> {
        let idx = self
            .records
            .iter()
            .position(|a| a.id == id)
            .ok_or(ApiError::NotFound("user"))?;

        if let Some(username) = patch.username.as_deref() {
            let taken = self
                .records
                .iter()
                .any(|a| a.id != id && a.username == username);
            if taken {
                return Err(ApiError::Conflict);
            }
        }

        let account = &mut self.records[idx];
        if let Some(username) = patch.username {
            account.username = username;
        }
        if let Some(hash) = patch.password_hash {
            account.password_hash = hash;
        }
        if let Some(contact) = patch.contact {
            account.contact = Some(contact);
        }
        if let Some(barangay) = patch.barangay {
            account.barangay = Some(barangay);
        }
        if let Some(role) = patch.role {
            account.role = role;
        }
        Ok(account.clone())
    }

    pub fn remove(&mut self, id: u64) -> Result<Account, ApiError> {
        let idx = self
            .records
            .iter()
            .position(|a| a.id == id)
            .ok_or(ApiError::NotFound("user"))?;
        Ok(self.records.remove(idx))
    }
}
