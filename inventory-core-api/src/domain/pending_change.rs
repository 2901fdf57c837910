use serde::{Deserialize, Serialize};

use super::{FieldValue, RecordId};

/// One proposed edit of a single field.
///
/// Created when a cell edit actually changes a value and consumed when the
/// change is confirmed, cancelled or reverted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingChange {
    pub record_id: RecordId,
    pub field_name: String,
    pub field_label: String,
    pub old_value: FieldValue,
    pub new_value: FieldValue,
}

impl PendingChange {
    pub fn new(
        record_id: RecordId,
        field_name: impl Into<String>,
        field_label: impl Into<String>,
        old_value: FieldValue,
        new_value: FieldValue,
    ) -> Self {
        Self {
            record_id,
            field_name: field_name.into(),
            field_label: field_label.into(),
            old_value,
            new_value,
        }
    }
}
