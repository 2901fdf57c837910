use serde::{Deserialize, Serialize};

use super::RecordId;

/// Outcome of a batch confirmation attempt: which records got their change
/// log written and which still hold persisted but unaudited values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub audited: Vec<RecordId>,
    pub unaudited: Vec<RecordId>,
}

impl ReconciliationReport {
    pub fn is_complete(&self) -> bool {
        self.unaudited.is_empty()
    }
}
