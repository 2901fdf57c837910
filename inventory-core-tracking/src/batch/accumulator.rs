use inventory_core_api::{
    ChangeError, ChangeResult, FieldMap, PendingChange, RecordId, ReconciliationReport,
};
use inventory_core_db::{Auditable, RecordRepository};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info};

use super::entry::{BatchEntry, Contribution};
use super::summary::BatchSummary;
use crate::config::BatchConfig;
use crate::local_records::LocalRecords;
use crate::notifier::Notifier;

#[derive(Default)]
struct BatchState {
    order: Vec<RecordId>,
    entries: HashMap<RecordId, BatchEntry>,
}

impl BatchState {
    fn entry_mut(&mut self, record_id: &RecordId) -> &mut BatchEntry {
        if !self.entries.contains_key(record_id) {
            self.order.push(record_id.clone());
        }
        self.entries
            .entry(record_id.clone())
            .or_insert_with(|| BatchEntry::new(record_id.clone()))
    }

    fn remove(&mut self, record_id: &RecordId) {
        self.entries.remove(record_id);
        self.order.retain(|id| id != record_id);
    }

    /// Removes one contribution, dropping the entry when it was the last
    fn rollback(&mut self, record_id: &RecordId, ticket: u64) {
        let now_empty = match self.entries.get_mut(record_id) {
            Some(entry) => {
                entry.remove_ticket(ticket);
                entry.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.remove(record_id);
        }
    }
}

/// What one commit removed from the batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Cleared {
    /// Records that left the batch entirely
    pub records: usize,
    pub changes: usize,
}

/// Collects field edits across many records while batch mode is on.
///
/// Every `queue` call persists the record's merged updates right away and
/// defers the change-log write to batch confirmation. Writes for the same
/// record go through a FIFO lane: each one sends the merged map as it stands
/// when its turn comes, and a write whose ticket an earlier write already
/// covered is skipped.
pub struct BatchAccumulator<T: Auditable> {
    enabled: AtomicBool,
    state: Mutex<BatchState>,
    lanes: Mutex<HashMap<RecordId, Arc<AsyncMutex<()>>>>,
    next_ticket: AtomicU64,
    records: Arc<dyn RecordRepository<T>>,
    local: Arc<LocalRecords<T>>,
    notifier: Arc<dyn Notifier>,
    config: BatchConfig,
}

impl<T: Auditable> BatchAccumulator<T> {
    pub fn new(
        records: Arc<dyn RecordRepository<T>>,
        local: Arc<LocalRecords<T>>,
        notifier: Arc<dyn Notifier>,
        config: BatchConfig,
    ) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            state: Mutex::new(BatchState::default()),
            lanes: Mutex::new(HashMap::new()),
            next_ticket: AtomicU64::new(1),
            records,
            local,
            notifier,
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Turns batch mode on or off.
    ///
    /// Turning it off with changes still pending would leave persisted values
    /// without a change log, so it is refused until the batch is confirmed
    /// or reverted.
    pub fn set_enabled(&self, enabled: bool) -> ChangeResult<()> {
        if !enabled && self.has_pending() {
            return Err(ChangeError::ValidationError(format!(
                "{} pending changes must be saved or discarded before leaving batch mode",
                self.summary().change_count
            )));
        }
        self.enabled.store(enabled, Ordering::SeqCst);
        debug!(resource = T::RESOURCE, enabled, "Batch mode toggled");
        Ok(())
    }

    /// Queues one edit and persists the record's merged updates.
    ///
    /// On a failed write only this call's contribution is rolled back; the
    /// record's other pending changes are kept.
    pub async fn queue(
        &self,
        record_id: &RecordId,
        updates: FieldMap,
        changes: Vec<PendingChange>,
    ) -> ChangeResult<()> {
        if !self.is_enabled() {
            return Err(ChangeError::ValidationError(
                "Batch mode is not enabled".to_string(),
            ));
        }

        let originals = self.current_values(record_id, &updates);
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        self.state.lock().entry_mut(record_id).push(Contribution {
            ticket,
            updates,
            changes,
            originals,
            audited: false,
        });

        let lane = self.lane(record_id);
        let _turn = lane.lock().await;

        let (snapshot, covers) = {
            let state = self.state.lock();
            match state.entries.get(record_id) {
                Some(entry) if entry.has_ticket(ticket) && entry.persisted_ticket < ticket => {
                    (entry.updates.clone(), entry.latest_ticket())
                }
                _ => {
                    debug!(record_id = %record_id, ticket, "Write already covered by an earlier one");
                    return Ok(());
                }
            }
        };

        match self.records.update_fields(record_id, &snapshot).await {
            Ok(()) => {
                if let Some(entry) = self.state.lock().entries.get_mut(record_id) {
                    entry.persisted_ticket = entry.persisted_ticket.max(covers);
                }
                self.local.apply_persisted(record_id, &snapshot);
                info!(
                    record_id = %record_id,
                    ticket,
                    fields = snapshot.len(),
                    "Batch updates persisted"
                );
                Ok(())
            }
            Err(e) => {
                self.state.lock().rollback(record_id, ticket);
                error!(record_id = %record_id, ticket, error = %e, "Batch write failed, change rolled back");
                self.notifier
                    .error("No se pudo guardar el cambio; se ha quitado del lote");
                Err(ChangeError::BatchWriteFailure {
                    record_id: record_id.clone(),
                    message: e.to_string(),
                })
            }
        }
    }

    pub fn summary(&self) -> BatchSummary {
        let state = self.state.lock();
        let change_count = state.entries.values().map(|e| e.change_count()).sum();
        BatchSummary::new(
            state.entries.len(),
            change_count,
            self.config.progress_full_at,
        )
    }

    pub fn has_pending(&self) -> bool {
        !self.state.lock().entries.is_empty()
    }

    /// Entries in the order their records were first edited
    pub fn entries(&self) -> Vec<BatchEntry> {
        let state = self.state.lock();
        state
            .order
            .iter()
            .filter_map(|id| state.entries.get(id).cloned())
            .collect()
    }

    pub fn entry(&self, record_id: &RecordId) -> Option<BatchEntry> {
        self.state.lock().entries.get(record_id).cloned()
    }

    /// Records whose values are persisted, split by whether their change log
    /// has been written
    pub fn reconciliation_report(&self) -> ReconciliationReport {
        let state = self.state.lock();
        let mut report = ReconciliationReport::default();
        for id in &state.order {
            match state.entries.get(id) {
                Some(entry) if entry.is_fully_audited() => report.audited.push(id.clone()),
                Some(_) => report.unaudited.push(id.clone()),
                None => {}
            }
        }
        report
    }

    /// Writes the pre-batch value of every unaudited field back and drops
    /// those changes without touching the change log.
    ///
    /// Records whose restoring write fails stay in the batch.
    pub async fn revert(&self) -> ChangeResult<usize> {
        let mut reverted = 0;
        let mut pending = Vec::new();
        let mut last_error = String::new();

        for record_id in self.pending_records() {
            let lane = self.lane(&record_id);
            let _turn = lane.lock().await;

            let originals = match self.state.lock().entries.get(&record_id) {
                Some(entry) => entry.original_values(),
                None => continue,
            };

            if !originals.is_empty() {
                if let Err(e) = self.records.update_fields(&record_id, &originals).await {
                    error!(record_id = %record_id, error = %e, "Failed to restore original values");
                    last_error = e.to_string();
                    pending.push(record_id);
                    continue;
                }
                self.local.apply_persisted(&record_id, &originals);
            }

            let mut state = self.state.lock();
            let now_empty = state
                .entries
                .get_mut(&record_id)
                .map(|entry| entry.discard_settled())
                .unwrap_or(false);
            if now_empty {
                state.remove(&record_id);
            }
            reverted += 1;
        }
        self.prune_lanes();

        if pending.is_empty() {
            info!(resource = T::RESOURCE, reverted, "Batch reverted");
            if reverted > 0 {
                self.notifier.info("Cambios del lote descartados");
            }
            Ok(reverted)
        } else {
            self.notifier
                .error("No se pudieron descartar todos los cambios del lote");
            Err(ChangeError::BatchRevertIncomplete {
                pending,
                message: last_error,
            })
        }
    }

    /// Local values of the fields `updates` is about to overwrite
    fn current_values(&self, record_id: &RecordId, updates: &FieldMap) -> FieldMap {
        let Some(record) = self.local.get(record_id) else {
            return FieldMap::new();
        };
        updates
            .keys()
            .filter_map(|name| record.get_field(name).map(|value| (name.clone(), value)))
            .collect()
    }

    pub(crate) fn pending_records(&self) -> Vec<RecordId> {
        self.state.lock().order.clone()
    }

    /// Write lane of a record; holding it means no write for the record is
    /// in flight
    pub(crate) fn lane(&self, record_id: &RecordId) -> Arc<AsyncMutex<()>> {
        self.lanes
            .lock()
            .entry(record_id.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    pub(crate) fn settled_unaudited(&self, record_id: &RecordId) -> (Vec<u64>, Vec<PendingChange>) {
        self.state
            .lock()
            .entries
            .get(record_id)
            .map(|entry| entry.settled_unaudited())
            .unwrap_or_default()
    }

    pub(crate) fn mark_audited(&self, record_id: &RecordId, tickets: &[u64]) {
        if let Some(entry) = self.state.lock().entries.get_mut(record_id) {
            entry.mark_audited(tickets);
        }
    }

    /// Drops every audited change in one step
    pub(crate) fn commit_audited(&self) -> Cleared {
        let cleared = {
            let mut state = self.state.lock();
            let changes = state.entries.values().map(|e| e.audited_change_count()).sum();
            let emptied: Vec<RecordId> = state
                .entries
                .iter_mut()
                .filter_map(|(id, entry)| entry.drop_audited().then(|| id.clone()))
                .collect();
            for id in &emptied {
                state.remove(id);
            }
            Cleared {
                records: emptied.len(),
                changes,
            }
        };
        self.prune_lanes();
        cleared
    }

    fn prune_lanes(&self) {
        self.lanes.lock().retain(|_, lane| Arc::strong_count(lane) > 1);
    }
}
