use async_trait::async_trait;
use inventory_core_api::{
    ChangeResult, FieldMap, FieldValue, PendingChange, RecordId, ReconciliationReport,
};
use inventory_core_db::{
    Auditable, ChangeIndicator, ChangeLogRepository, FindSpecsByModel, RecordRepository,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::batch::{BatchAccumulator, BatchEntry, BatchSummary};
use crate::config::TrackingConfig;
use crate::gate::{ChangeConfirmationGate, GateStatus};
use crate::indicator_cache::ChangeIndicatorCache;
use crate::local_records::LocalRecords;
use crate::navigation_guard::{NavigationGuard, NavigationPrompt, SaveCallback};
use crate::notifier::Notifier;
use crate::requester::{FieldChangeRequester, FieldUpdateOutcome};

const LOAD_FAILED: &str = "No se pudieron cargar los registros";
const HISTORY_FAILED: &str = "No se pudo cargar el historial de cambios";

/// Backend collaborators of one page
pub struct TrackingRepositories<T: Auditable> {
    pub records: Arc<dyn RecordRepository<T>>,
    pub change_logs: Arc<dyn ChangeLogRepository>,
    pub specs: Option<Arc<dyn FindSpecsByModel>>,
}

impl<T: Auditable> Clone for TrackingRepositories<T> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            change_logs: self.change_logs.clone(),
            specs: self.specs.clone(),
        }
    }
}

/// Saves the pending batch without a reason when the user leaves the page
struct BatchSaver<T: Auditable> {
    gate: Arc<ChangeConfirmationGate<T>>,
    batch: Arc<BatchAccumulator<T>>,
}

#[async_trait]
impl<T: Auditable> SaveCallback for BatchSaver<T> {
    async fn save(&self) -> ChangeResult<usize> {
        self.gate.confirm_batch(&self.batch, None).await?;
        Ok(self.batch.summary().change_count)
    }
}

/// # Documentation
/// Page-level owner of the change-tracking components for one record kind.
///
/// It wires the requester, the batch, the gate, the indicator cache and the
/// navigation guard over one set of repositories, and re-synchronises the
/// guard after every operation that can change the pending count.
///
/// # Example
/// ```ignore
/// let tracker = ChangeTracker::<EquipmentModel>::new(repositories, config, notifier, prompt);
/// tracker.load().await?;
/// tracker.set_batch_mode(true)?;
/// tracker.request_field_update(&record, "state", "Estado", "Reservada".into(), None).await?;
/// tracker.confirm_batch(Some("corrección mensual".to_string())).await?;
/// ```
pub struct ChangeTracker<T: Auditable> {
    config: TrackingConfig,
    records: Arc<dyn RecordRepository<T>>,
    local: Arc<LocalRecords<T>>,
    batch: Arc<BatchAccumulator<T>>,
    gate: Arc<ChangeConfirmationGate<T>>,
    indicators: Arc<ChangeIndicatorCache<T>>,
    requester: FieldChangeRequester<T>,
    guard: NavigationGuard,
    notifier: Arc<dyn Notifier>,
}

impl<T: Auditable> ChangeTracker<T> {
    pub fn new(
        repositories: TrackingRepositories<T>,
        config: TrackingConfig,
        notifier: Arc<dyn Notifier>,
        prompt: Arc<dyn NavigationPrompt>,
    ) -> Self {
        let local = Arc::new(LocalRecords::default());
        let indicators = Arc::new(ChangeIndicatorCache::new(
            repositories.change_logs.clone(),
            local.clone(),
            &config.indicators,
        ));
        let batch = Arc::new(BatchAccumulator::new(
            repositories.records.clone(),
            local.clone(),
            notifier.clone(),
            config.batch.clone(),
        ));
        let gate = Arc::new(ChangeConfirmationGate::new(
            repositories.records.clone(),
            repositories.change_logs.clone(),
            local.clone(),
            indicators.clone(),
            notifier.clone(),
            config.module_name.clone(),
        ));
        let requester = FieldChangeRequester::new(
            repositories.records.clone(),
            repositories.specs.clone(),
            batch.clone(),
            gate.clone(),
            local.clone(),
            notifier.clone(),
        );
        let guard = NavigationGuard::new(config.guard.clone(), notifier.clone(), prompt);
        guard.set_save_callback(Some(Arc::new(BatchSaver {
            gate: gate.clone(),
            batch: batch.clone(),
        })));

        Self {
            config,
            records: repositories.records,
            local,
            batch,
            gate,
            indicators,
            requester,
            guard,
            notifier,
        }
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Loads the record list and the history of every record.
    ///
    /// History is best effort: a failed history load is reported and the
    /// records are still returned.
    pub async fn load(&self) -> ChangeResult<usize> {
        let count = match self.local.reload(self.records.as_ref()).await {
            Ok(count) => count,
            Err(e) => {
                error!(resource = T::RESOURCE, error = %e, "Failed to load records");
                self.notifier.error(LOAD_FAILED);
                return Err(e);
            }
        };
        self.indicators.invalidate_all();
        if let Err(e) = self.indicators.refresh(&self.local.ids()).await {
            warn!(resource = T::RESOURCE, error = %e, "Change history unavailable after load");
            self.notifier.error(HISTORY_FAILED);
        }
        info!(resource = T::RESOURCE, count, "Records loaded");
        Ok(count)
    }

    pub fn records(&self) -> Vec<T> {
        self.local.all()
    }

    pub fn record(&self, record_id: &RecordId) -> Option<T> {
        self.local.get(record_id)
    }

    pub fn is_batch_mode(&self) -> bool {
        self.batch.is_enabled()
    }

    pub fn set_batch_mode(&self, enabled: bool) -> ChangeResult<()> {
        let result = self.batch.set_enabled(enabled);
        self.sync_guard();
        result
    }

    pub async fn request_field_update(
        &self,
        record: &T,
        field_name: &str,
        field_label: &str,
        new_value: FieldValue,
        updates_override: Option<FieldMap>,
    ) -> ChangeResult<FieldUpdateOutcome> {
        let result = self
            .requester
            .request_field_update(record, field_name, field_label, new_value, updates_override)
            .await;
        self.sync_guard();
        result
    }

    pub fn gate_status(&self) -> GateStatus {
        self.gate.status()
    }

    pub fn pending_confirmation(&self) -> Option<Vec<PendingChange>> {
        self.gate.pending()
    }

    pub async fn confirm(&self, reason: Option<String>) -> ChangeResult<()> {
        self.gate.confirm(reason).await
    }

    pub fn cancel(&self) -> ChangeResult<()> {
        self.gate.cancel()
    }

    pub async fn confirm_batch(&self, reason: Option<String>) -> ChangeResult<usize> {
        let result = self.gate.confirm_batch(&self.batch, reason).await;
        self.sync_guard();
        result
    }

    /// Discards the batch, writing the original values back
    pub async fn revert_batch(&self) -> ChangeResult<usize> {
        let result = self.batch.revert().await;
        self.sync_guard();
        result
    }

    pub fn summary(&self) -> BatchSummary {
        self.batch.summary()
    }

    pub fn batch_entries(&self) -> Vec<BatchEntry> {
        self.batch.entries()
    }

    pub fn reconciliation_report(&self) -> ReconciliationReport {
        self.batch.reconciliation_report()
    }

    pub async fn indicators(&self, record_id: &RecordId, field_name: &str) -> Vec<ChangeIndicator> {
        self.indicators.get(record_id, field_name).await
    }

    pub async fn has_changes(&self, record_id: &RecordId, field_name: &str) -> bool {
        self.indicators.has_changes(record_id, field_name).await
    }

    pub async fn refresh_indicators(&self, record_ids: &[RecordId]) -> ChangeResult<()> {
        let result = self.indicators.refresh(record_ids).await;
        if let Err(e) = &result {
            warn!(records = record_ids.len(), error = %e, "Change indicators could not be refreshed");
            self.notifier.error(HISTORY_FAILED);
        }
        result
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    fn sync_guard(&self) {
        self.guard
            .sync(self.batch.is_enabled(), self.batch.summary().change_count);
    }
}
