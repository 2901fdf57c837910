use thiserror::Error;

use crate::domain::{RecordId, ReconciliationReport};

/// Message carried by a cancelled confirmation. UI callers match on it to
/// tell a deliberate abort apart from a failure.
pub const CHANGE_CANCELLED: &str = "CHANGE_CANCELLED";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChangeError {
    /// The empty-to-value fast path could not persist the field.
    #[error("Direct write failed for record {record_id}: {message}")]
    DirectWriteFailure { record_id: RecordId, message: String },

    /// The record update issued by a confirmed change failed.
    #[error("Record write failed for record {record_id}: {message}")]
    RecordWriteFailure { record_id: RecordId, message: String },

    #[error("{}", CHANGE_CANCELLED)]
    ConfirmationCancelled,

    /// A queued batch write failed and its contribution was rolled back.
    #[error("Batch write failed for record {record_id}: {message}")]
    BatchWriteFailure { record_id: RecordId, message: String },

    /// The record data was written but its change log was not.
    #[error("Change log write failed for record {record_id}: {message}")]
    AuditWriteFailure { record_id: RecordId, message: String },

    /// A batch confirmation stopped part way; the report lists which records
    /// still have unaudited writes.
    #[error("Batch confirmation incomplete: {} of {} records audited: {message}", .report.audited.len(), .report.audited.len() + .report.unaudited.len())]
    BatchAuditIncomplete {
        report: ReconciliationReport,
        message: String,
    },

    /// Reverting a batch could not restore every record.
    #[error("Batch revert incomplete, {} records still pending: {message}", .pending.len())]
    BatchRevertIncomplete {
        pending: Vec<RecordId>,
        message: String,
    },

    #[error("Change history could not be loaded: {0}")]
    HistoryLoadFailure(String),

    #[error("A confirmation is already pending")]
    ConfirmationPending,

    #[error("No confirmation is pending")]
    NoPendingConfirmation,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ChangeError {
    /// True for the user-initiated cancel, which must not be reported as a
    /// failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ChangeError::ConfirmationCancelled)
    }

    /// True when the record store and the change log may disagree.
    pub fn leaves_unaudited_writes(&self) -> bool {
        matches!(
            self,
            ChangeError::AuditWriteFailure { .. } | ChangeError::BatchAuditIncomplete { .. }
        )
    }
}

pub type ChangeResult<T> = Result<T, ChangeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_message_is_sentinel() {
        let err = ChangeError::ConfirmationCancelled;
        assert_eq!(err.to_string(), "CHANGE_CANCELLED");
        assert!(err.is_cancellation());
        assert!(!err.leaves_unaudited_writes());
    }

    #[test]
    fn test_batch_audit_incomplete_message_counts_records() {
        let err = ChangeError::BatchAuditIncomplete {
            report: ReconciliationReport {
                audited: vec![RecordId::from("A")],
                unaudited: vec![RecordId::from("B"), RecordId::from("C")],
            },
            message: "HTTP 500".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Batch confirmation incomplete: 1 of 3 records audited: HTTP 500"
        );
        assert!(err.leaves_unaudited_writes());
        assert!(!err.is_cancellation());
    }
}
