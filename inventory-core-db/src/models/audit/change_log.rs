use chrono::{DateTime, Utc};
use inventory_core_api::{FieldValue, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use super::TrackedTable;
use crate::models::Identifiable;

/// # Documentation
/// - One row of the server-side change log: a single field of a single record
///   changed at a point in time, optionally with a reason.
/// - Write-once and append-only. The client never updates or deletes rows.
/// - Rows are written through `POST /api/change-logs`, one request per
///   record carrying every changed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogModel {
    pub id: RecordId,
    pub table_name: String,
    pub record_id: RecordId,
    pub field_name: String,
    #[serde(default)]
    pub field_label: Option<String>,
    #[serde(default)]
    pub old_value: FieldValue,
    #[serde(default)]
    pub new_value: FieldValue,

    /// Free-text reason given when the change was confirmed
    #[serde(default, alias = "change_reason")]
    pub reason: Option<String>,

    pub changed_at: DateTime<Utc>,

    /// Screen the change was made from
    #[serde(default)]
    pub module_name: Option<String>,
}

impl ChangeLogModel {
    pub fn table(&self) -> Option<TrackedTable> {
        TrackedTable::from_str(&self.table_name).ok()
    }
}

impl Identifiable for ChangeLogModel {
    fn get_id(&self) -> RecordId {
        self.id.clone()
    }
}

/// Response of the batch history endpoints, keyed by the requested id
pub type ChangeLogBatch = HashMap<RecordId, Vec<ChangeLogModel>>;
