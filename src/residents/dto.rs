use serde::{Deserialize, Serialize};

use crate::residents::repo::ResidentStatus;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ResidentStatus,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: ResidentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub resident_id: u64,
    pub status: ResidentStatus,
}
