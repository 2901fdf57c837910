use chrono::{DateTime, Utc};
use inventory_core_api::{FieldValue, RecordId};
use serde::{Deserialize, Serialize};

use super::ChangeLogModel;

/// Client-side projection of a change-log row, rendered as the hover/click
/// history of a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeIndicator {
    pub id: RecordId,
    pub table_name: String,
    pub field_name: String,
    pub field_label: Option<String>,
    pub old_value: FieldValue,
    pub new_value: FieldValue,
    pub reason: Option<String>,
    pub changed_at: DateTime<Utc>,
    pub module_name: Option<String>,
}

impl ChangeIndicator {
    /// One-line description such as `Disponible → Reservada`
    pub fn summary(&self) -> String {
        let old = self.old_value.to_string();
        let new = self.new_value.to_string();
        format!(
            "{} → {}",
            if old.is_empty() { "—" } else { old.as_str() },
            if new.is_empty() { "—" } else { new.as_str() }
        )
    }
}

impl From<&ChangeLogModel> for ChangeIndicator {
    fn from(row: &ChangeLogModel) -> Self {
        Self {
            id: row.id.clone(),
            table_name: row.table_name.clone(),
            field_name: row.field_name.clone(),
            field_label: row.field_label.clone(),
            old_value: row.old_value.clone(),
            new_value: row.new_value.clone(),
            reason: row.reason.clone(),
            changed_at: row.changed_at,
            module_name: row.module_name.clone(),
        }
    }
}
