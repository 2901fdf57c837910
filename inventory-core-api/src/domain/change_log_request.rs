use serde::{Deserialize, Serialize};

use super::{PendingChange, RecordId};

/// Body of `POST /api/change-logs`.
///
/// One request carries every field change of one record; the backend stores
/// one change-log row per entry in `changes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChangeLogRequest {
    pub table_name: String,
    pub record_id: RecordId,
    pub changes: Vec<PendingChange>,
    pub change_reason: Option<String>,
    pub module_name: String,
}

/// Body of `POST /api/change-logs/batch` and of the foreign-key variants
/// (`batch-by-purchase`, `batch-by-new-purchase`), where `record_ids` holds
/// the foreign ids instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchChangeLogRequest {
    pub table_name: String,
    pub record_ids: Vec<RecordId>,
}
