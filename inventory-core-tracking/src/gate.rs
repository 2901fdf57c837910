use inventory_core_api::{
    ChangeError, ChangeResult, CreateChangeLogRequest, FieldMap, PendingChange, RecordId,
};
use inventory_core_db::{Auditable, ChangeLogRepository, RecordRepository};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::batch::BatchAccumulator;
use crate::indicator_cache::ChangeIndicatorCache;
use crate::local_records::LocalRecords;
use crate::notifier::Notifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    Closed,
    AwaitingConfirm,
    Confirming,
}

struct OpenRequest {
    id: u64,
    record_id: RecordId,
    updates: FieldMap,
    changes: Vec<PendingChange>,
    responder: oneshot::Sender<ChangeResult<()>>,
}

enum GateState {
    Closed,
    AwaitingConfirm(OpenRequest),
    Confirming,
}

impl GateState {
    fn status(&self) -> GateStatus {
        match self {
            GateState::Closed => GateStatus::Closed,
            GateState::AwaitingConfirm(_) => GateStatus::AwaitingConfirm,
            GateState::Confirming => GateStatus::Confirming,
        }
    }
}

/// Closes the gate when a confirmation ends, however it ends
struct ConfirmingGuard<'a> {
    state: &'a Mutex<GateState>,
}

impl Drop for ConfirmingGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock() = GateState::Closed;
    }
}

/// Withdraws an open request whose caller stopped waiting
struct OpenGuard<'a> {
    state: &'a Mutex<GateState>,
    id: u64,
}

impl Drop for OpenGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if matches!(&*state, GateState::AwaitingConfirm(open) if open.id == self.id) {
            *state = GateState::Closed;
        }
    }
}

/// # Documentation
/// The confirmation step in front of every audited change.
///
/// Exactly one flow may be open at a time:
/// `Closed -> AwaitingConfirm -> Confirming -> Closed`, or back to `Closed`
/// on cancel. Opening a second flow, or starting a batch confirmation while
/// one is open, fails with `ConfirmationPending`.
pub struct ChangeConfirmationGate<T: Auditable> {
    state: Mutex<GateState>,
    next_id: Mutex<u64>,
    records: Arc<dyn RecordRepository<T>>,
    change_logs: Arc<dyn ChangeLogRepository>,
    local: Arc<LocalRecords<T>>,
    indicators: Arc<ChangeIndicatorCache<T>>,
    notifier: Arc<dyn Notifier>,
    module_name: String,
}

impl<T: Auditable> ChangeConfirmationGate<T> {
    pub fn new(
        records: Arc<dyn RecordRepository<T>>,
        change_logs: Arc<dyn ChangeLogRepository>,
        local: Arc<LocalRecords<T>>,
        indicators: Arc<ChangeIndicatorCache<T>>,
        notifier: Arc<dyn Notifier>,
        module_name: impl Into<String>,
    ) -> Self {
        Self {
            state: Mutex::new(GateState::Closed),
            next_id: Mutex::new(0),
            records,
            change_logs,
            local,
            indicators,
            notifier,
            module_name: module_name.into(),
        }
    }

    pub fn status(&self) -> GateStatus {
        self.state.lock().status()
    }

    /// Changes shown in the open dialog
    pub fn pending(&self) -> Option<Vec<PendingChange>> {
        match &*self.state.lock() {
            GateState::AwaitingConfirm(open) => Some(open.changes.clone()),
            _ => None,
        }
    }

    /// Opens the dialog for one record and waits for the user.
    ///
    /// Resolves once `confirm` has persisted the updates and written the
    /// change log, or with `ConfirmationCancelled` after `cancel`.
    pub async fn open(
        &self,
        record_id: &RecordId,
        updates: FieldMap,
        changes: Vec<PendingChange>,
    ) -> ChangeResult<()> {
        let (responder, answer) = oneshot::channel();
        let id = {
            let mut next_id = self.next_id.lock();
            *next_id += 1;
            *next_id
        };

        {
            let mut state = self.state.lock();
            if !matches!(*state, GateState::Closed) {
                return Err(ChangeError::ConfirmationPending);
            }
            debug!(record_id = %record_id, changes = changes.len(), "Confirmation opened");
            *state = GateState::AwaitingConfirm(OpenRequest {
                id,
                record_id: record_id.clone(),
                updates,
                changes,
                responder,
            });
        }

        let _withdraw = OpenGuard {
            state: &self.state,
            id,
        };
        answer
            .await
            .unwrap_or(Err(ChangeError::ConfirmationCancelled))
    }

    /// Confirms the open dialog: writes the record, then its change log with
    /// `reason`, then refreshes the record's indicators.
    ///
    /// A failed change-log write leaves the record write in place.
    pub async fn confirm(&self, reason: Option<String>) -> ChangeResult<()> {
        let open = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, GateState::Confirming) {
                GateState::AwaitingConfirm(open) => open,
                other => {
                    *state = other;
                    return Err(ChangeError::NoPendingConfirmation);
                }
            }
        };
        let close = ConfirmingGuard { state: &self.state };

        let result = self.apply(&open, reason).await;
        if let Err(e) = &result {
            self.notifier.error(&failure_notice(e));
        }
        // Closed before the opener wakes up, so it can open again at once
        drop(close);
        // The opener may have stopped waiting
        let _ = open.responder.send(result.clone());
        result
    }

    async fn apply(&self, open: &OpenRequest, reason: Option<String>) -> ChangeResult<()> {
        let record_id = &open.record_id;

        self.records
            .update_fields(record_id, &open.updates)
            .await
            .map_err(|e| {
                error!(record_id = %record_id, error = %e, "Confirmed record write failed");
                ChangeError::RecordWriteFailure {
                    record_id: record_id.clone(),
                    message: e.to_string(),
                }
            })?;
        self.local.apply_persisted(record_id, &open.updates);

        if !open.changes.is_empty() {
            let request = self.change_log_request(record_id, open.changes.clone(), reason);
            self.change_logs
                .create_change_log(&request)
                .await
                .map_err(|e| {
                    error!(record_id = %record_id, error = %e, "Change log write failed after record write");
                    ChangeError::AuditWriteFailure {
                        record_id: record_id.clone(),
                        message: e.to_string(),
                    }
                })?;
        }

        self.indicators
            .refresh_or_warn(std::slice::from_ref(record_id))
            .await;
        info!(record_id = %record_id, changes = open.changes.len(), "Change confirmed");
        self.notifier.success("Cambio registrado");
        Ok(())
    }

    /// Closes the open dialog; the waiting `open` call fails with
    /// `ConfirmationCancelled`. No notice is raised for a cancel.
    pub fn cancel(&self) -> ChangeResult<()> {
        let open = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, GateState::Closed) {
                GateState::AwaitingConfirm(open) => open,
                other => {
                    *state = other;
                    return Err(ChangeError::NoPendingConfirmation);
                }
            }
        };
        debug!(record_id = %open.record_id, "Confirmation cancelled");
        let _ = open.responder.send(Err(ChangeError::ConfirmationCancelled));
        Ok(())
    }

    /// Writes the change log of every pending batch entry, one request per
    /// record, and clears the batch once all of them succeeded.
    ///
    /// Returns the number of field changes logged by this call. On the first
    /// failure the batch is kept as is; records logged in this or an earlier
    /// attempt are not logged again on retry. The success notice counts every
    /// change the batch held, whichever attempt logged it.
    pub async fn confirm_batch(
        &self,
        batch: &BatchAccumulator<T>,
        reason: Option<String>,
    ) -> ChangeResult<usize> {
        {
            let mut state = self.state.lock();
            if !matches!(*state, GateState::Closed) {
                return Err(ChangeError::ConfirmationPending);
            }
            *state = GateState::Confirming;
        }
        let _close = ConfirmingGuard { state: &self.state };

        let mut logged = 0;
        let mut audited_records = Vec::new();
        for record_id in batch.pending_records() {
            let lane = batch.lane(&record_id);
            let _turn = lane.lock().await;

            let (tickets, changes) = batch.settled_unaudited(&record_id);
            if changes.is_empty() {
                continue;
            }
            let count = changes.len();
            let request = self.change_log_request(&record_id, changes, reason.clone());
            if let Err(e) = self.change_logs.create_change_log(&request).await {
                let report = batch.reconciliation_report();
                error!(
                    record_id = %record_id,
                    audited = report.audited.len(),
                    unaudited = report.unaudited.len(),
                    error = %e,
                    "Batch change log write failed"
                );
                self.notifier.error(
                    "No se pudieron registrar todos los cambios del lote. Los cambios siguen pendientes, inténtalo de nuevo",
                );
                return Err(ChangeError::BatchAuditIncomplete {
                    report,
                    message: e.to_string(),
                });
            }
            batch.mark_audited(&record_id, &tickets);
            logged += count;
            audited_records.push(record_id);
        }

        let cleared = batch.commit_audited();
        if !audited_records.is_empty() {
            self.indicators.refresh_or_warn(&audited_records).await;
        }
        info!(
            resource = T::RESOURCE,
            logged,
            records = cleared.records,
            changes = cleared.changes,
            "Batch confirmed"
        );
        if cleared.changes > 0 {
            self.notifier
                .success(&format!("{} cambios guardados correctamente", cleared.changes));
        }
        Ok(logged)
    }

    fn change_log_request(
        &self,
        record_id: &RecordId,
        changes: Vec<PendingChange>,
        reason: Option<String>,
    ) -> CreateChangeLogRequest {
        CreateChangeLogRequest {
            table_name: T::TABLE.to_string(),
            record_id: record_id.clone(),
            changes,
            change_reason: reason.filter(|r| !r.trim().is_empty()),
            module_name: self.module_name.clone(),
        }
    }
}

fn failure_notice(error: &ChangeError) -> String {
    match error {
        ChangeError::AuditWriteFailure { .. } => {
            "El cambio se guardó pero no se pudo registrar en el historial".to_string()
        }
        _ => "No se pudo guardar el cambio".to_string(),
    }
}
