use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidentStatus {
    Activated,
    Deactivated,
    Approved,
}

/// Shared handle to the resident status table.
#[derive(Clone, Default)]
pub struct StatusStore {
    inner: Arc<Mutex<Statuses>>,
}

impl StatusStore {
    pub async fn lock(&self) -> MutexGuard<'_, Statuses> {
        self.inner.lock().await
    }
}

/// Status per resident id, ordered by id.
#[derive(Debug, Default)]
pub struct Statuses {
    by_resident: BTreeMap<u64, ResidentStatus>,
}

impl Statuses {
    /// Create-or-replace. Returns the previous value, if any.
    pub fn set(&mut self, resident_id: u64, status: ResidentStatus) -> Option<ResidentStatus> {
        self.by_resident.insert(resident_id, status)
    }

    pub fn get(&self, resident_id: u64) -> Option<ResidentStatus> {
        self.by_resident.get(&resident_id).copied()
    }

    pub fn remove(&mut self, resident_id: u64) -> Option<ResidentStatus> {
        self.by_resident.remove(&resident_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, ResidentStatus)> + '_ {
        self.by_resident.iter().map(|(id, status)| (*id, *status))
    }
}
