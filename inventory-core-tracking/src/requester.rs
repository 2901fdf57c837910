use inventory_core_api::{ChangeError, ChangeResult, FieldMap, FieldValue, PendingChange};
use inventory_core_db::utils::{is_empty_value, values_equal};
use inventory_core_db::{Auditable, FindSpecsByModel, MachineSpecsModel, RecordRepository};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::batch::BatchAccumulator;
use crate::gate::ChangeConfirmationGate;
use crate::local_records::LocalRecords;
use crate::notifier::Notifier;

/// Field whose edit pulls in the technical specification
const MODEL_FIELD: &str = "model";

/// What a field edit ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdateOutcome {
    /// Old and new values are equivalent; nothing was sent
    Unchanged,
    /// An empty field was filled directly, without a change-log entry
    Written,
    /// The user confirmed the change and it was written with its log
    Confirmed,
    /// The change was persisted and added to the pending batch
    Queued,
}

/// Entry point of every cell edit: decides between a direct write, the
/// confirmation gate and the batch.
pub struct FieldChangeRequester<T: Auditable> {
    records: Arc<dyn RecordRepository<T>>,
    specs: Option<Arc<dyn FindSpecsByModel>>,
    batch: Arc<BatchAccumulator<T>>,
    gate: Arc<ChangeConfirmationGate<T>>,
    local: Arc<LocalRecords<T>>,
    notifier: Arc<dyn Notifier>,
}

impl<T: Auditable> FieldChangeRequester<T> {
    pub fn new(
        records: Arc<dyn RecordRepository<T>>,
        specs: Option<Arc<dyn FindSpecsByModel>>,
        batch: Arc<BatchAccumulator<T>>,
        gate: Arc<ChangeConfirmationGate<T>>,
        local: Arc<LocalRecords<T>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            records,
            specs,
            batch,
            gate,
            local,
            notifier,
        }
    }

    /// Requests that `field_name` of `record` become `new_value`.
    ///
    /// `updates_override` replaces the `{field_name: new_value}` map sent to
    /// the backend; the recorded diff still uses the typed old and new
    /// values. A cancelled confirmation returns `ConfirmationCancelled`,
    /// which callers treat as a silent abort.
    pub async fn request_field_update(
        &self,
        record: &T,
        field_name: &str,
        field_label: &str,
        new_value: FieldValue,
        updates_override: Option<FieldMap>,
    ) -> ChangeResult<FieldUpdateOutcome> {
        let record_id = record.get_id();
        let old_value = record.field_value(field_name)?;

        if values_equal(&old_value, &new_value) {
            debug!(record_id = %record_id, field = field_name, "Value unchanged, nothing to do");
            return Ok(FieldUpdateOutcome::Unchanged);
        }

        let mut updates = updates_override.unwrap_or_else(|| {
            let mut updates = FieldMap::new();
            updates.insert(field_name.to_string(), new_value.clone());
            updates
        });
        let mut changes = vec![PendingChange::new(
            record_id.clone(),
            field_name,
            field_label,
            old_value,
            new_value.clone(),
        )];

        if T::ACCEPTS_SPECS && field_name == MODEL_FIELD && !is_empty_value(&new_value) {
            if let Some(specs) = self.lookup_specs(&new_value).await {
                for (spec, value) in specs.field_values() {
                    let current = record.get_field(spec.name).unwrap_or_default();
                    if values_equal(&current, &value) {
                        continue;
                    }
                    updates.insert(spec.name.to_string(), value.clone());
                    changes.push(PendingChange::new(
                        record_id.clone(),
                        spec.name,
                        spec.label,
                        current,
                        value,
                    ));
                }
            }
        }

        if self.batch.is_enabled() {
            debug!(record_id = %record_id, field = field_name, changes = changes.len(), "Routing edit to batch");
            self.batch.queue(&record_id, updates, changes).await?;
            return Ok(FieldUpdateOutcome::Queued);
        }

        // Filling an empty field is initial data entry, not a change
        changes.retain(|change| !is_empty_value(&change.old_value));
        if changes.is_empty() {
            return self.write_directly(record, updates).await;
        }

        debug!(record_id = %record_id, field = field_name, changes = changes.len(), "Routing edit to confirmation");
        self.gate.open(&record_id, updates, changes).await?;
        Ok(FieldUpdateOutcome::Confirmed)
    }

    async fn write_directly(&self, record: &T, updates: FieldMap) -> ChangeResult<FieldUpdateOutcome> {
        let record_id = record.get_id();
        match self.records.update_fields(&record_id, &updates).await {
            Ok(()) => {
                self.local.apply_persisted(&record_id, &updates);
                info!(record_id = %record_id, fields = updates.len(), "Empty fields filled");
                self.notifier.success("Campo actualizado");
                Ok(FieldUpdateOutcome::Written)
            }
            Err(e) => {
                error!(record_id = %record_id, error = %e, "Direct write failed");
                self.notifier.error("No se pudo actualizar el campo");
                Err(ChangeError::DirectWriteFailure {
                    record_id,
                    message: e.to_string(),
                })
            }
        }
    }

    async fn lookup_specs(&self, model: &FieldValue) -> Option<MachineSpecsModel> {
        let specs = self.specs.as_ref()?;
        let model = model.to_string();
        match specs.find_specs_by_model(model.trim()).await {
            Ok(Some(found)) => Some(found),
            Ok(None) => {
                debug!(model = %model, "No specification registered for model");
                None
            }
            Err(e) => {
                warn!(model = %model, error = %e, "Specification lookup failed, continuing without it");
                None
            }
        }
    }
}
