use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::ApiError;

/// A titled prompt written by a resident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptEntry {
    pub id: u64,
    pub owner_id: u64,
    pub title: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime, // set once at creation
}

/// Shared handle to the prompt history log.
#[derive(Clone, Default)]
pub struct PromptStore {
    inner: Arc<Mutex<Prompts>>,
}

impl PromptStore {
    pub async fn lock(&self) -> MutexGuard<'_, Prompts> {
        self.inner.lock().await
    }
}

#[derive(Debug, Default)]
pub struct Prompts {
    entries: Vec<PromptEntry>,
    last_id: u64,
}

impl Prompts {
    pub fn append(
        &mut self,
        owner_id: u64,
        title: String,
        body: String,
        now: OffsetDateTime,
    ) -> PromptEntry {
        self.last_id += 1;
        let entry = PromptEntry {
            id: self.last_id,
            owner_id,
            title,
            body,
            created_at: now,
        };
        self.entries.push(entry.clone());
        entry
    }

    pub fn get(&self, id: u64) -> Option<&PromptEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn all(&self) -> Vec<PromptEntry> {
        self.entries.clone()
    }

    /// Entries of one owner in insertion order; empty for unknown owners.
    pub fn by_owner(&self, owner_id: u64) -> Vec<PromptEntry> {
        self.entries
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect()
    }

    /// Replace title and body. `created_at` is left as it was.
    pub fn update(
        &mut self,
        id: u64,
        title: String,
        body: String,
    ) -> Result<PromptEntry, ApiError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(ApiError::NotFound("prompt"))?;
        entry.title = title;
        entry.body = body;
        Ok(entry.clone())
    }

    pub fn remove(&mut self, id: u64) -> Result<PromptEntry, ApiError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(ApiError::NotFound("prompt"))?;
        Ok(self.entries.remove(idx))
    }

    /// Drop every entry of an owner. Returns how many were removed.
    pub fn purge_owner(&mut self, owner_id: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.owner_id != owner_id);
        before - self.entries.len()
    }
}
