use inventory_core_api::{ChangeError, ChangeResult, RecordId};
use inventory_core_db::{
    Auditable, ChangeIndicator, ChangeLogBatch, ChangeLogModel, ChangeLogRepository, IndicatorLink,
};
use moka::future::Cache;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::IndicatorConfig;
use crate::local_records::LocalRecords;

/// Change history of one record, keyed by field name, newest first
pub type FieldIndicators = HashMap<String, Vec<ChangeIndicator>>;

/// Per-record, per-field change history behind the cell affordances.
///
/// History is fetched for many records in one request per source table.
/// A refresh replaces a record's whole map; entries are never patched.
pub struct ChangeIndicatorCache<T: Auditable> {
    cache: Cache<RecordId, Arc<FieldIndicators>>,
    change_logs: Arc<dyn ChangeLogRepository>,
    local: Arc<LocalRecords<T>>,
    max_per_field: usize,
}

impl<T: Auditable> ChangeIndicatorCache<T> {
    pub fn new(
        change_logs: Arc<dyn ChangeLogRepository>,
        local: Arc<LocalRecords<T>>,
        config: &IndicatorConfig,
    ) -> Self {
        Self {
            cache: Cache::builder().max_capacity(config.cache_capacity).build(),
            change_logs,
            local,
            max_per_field: config.max_per_field,
        }
    }

    /// Reloads the history of `record_ids`.
    ///
    /// Records with linked purchase or new-purchase rows also get the history
    /// of those rows. On failure the cache keeps its previous contents.
    pub async fn refresh(&self, record_ids: &[RecordId]) -> ChangeResult<()> {
        let mut seen = HashSet::new();
        let ids: Vec<RecordId> = record_ids
            .iter()
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect();
        if ids.is_empty() {
            return Ok(());
        }

        let own = self
            .change_logs
            .load_batch(T::TABLE, &ids)
            .await
            .map_err(history_error)?;

        let mut links: HashMap<RecordId, Vec<IndicatorLink>> = HashMap::new();
        let mut purchase_ids = Vec::new();
        let mut new_purchase_ids = Vec::new();
        for id in &ids {
            let Some(record) = self.local.get(id) else {
                continue;
            };
            for link in record.indicator_links() {
                let bucket = match link {
                    IndicatorLink::Purchase(_) => &mut purchase_ids,
                    IndicatorLink::NewPurchase(_) => &mut new_purchase_ids,
                };
                if !bucket.contains(link.foreign_id()) {
                    bucket.push(link.foreign_id().clone());
                }
                links.entry(id.clone()).or_default().push(link);
            }
        }

        let by_purchase = if purchase_ids.is_empty() {
            ChangeLogBatch::new()
        } else {
            self.change_logs
                .load_batch_by_purchase(&purchase_ids)
                .await
                .map_err(history_error)?
        };
        let by_new_purchase = if new_purchase_ids.is_empty() {
            ChangeLogBatch::new()
        } else {
            self.change_logs
                .load_batch_by_new_purchase(&new_purchase_ids)
                .await
                .map_err(history_error)?
        };

        for id in &ids {
            let mut rows: Vec<&ChangeLogModel> = own.get(id).into_iter().flatten().collect();
            for link in links.get(id).into_iter().flatten() {
                let source = match link {
                    IndicatorLink::Purchase(_) => &by_purchase,
                    IndicatorLink::NewPurchase(_) => &by_new_purchase,
                };
                rows.extend(source.get(link.foreign_id()).into_iter().flatten());
            }
            let indicators = self.merge(rows);
            self.cache.insert(id.clone(), Arc::new(indicators)).await;
        }

        debug!(
            table = T::TABLE.as_str(),
            records = ids.len(),
            linked_purchases = purchase_ids.len(),
            linked_new_purchases = new_purchase_ids.len(),
            "Change indicators refreshed"
        );
        Ok(())
    }

    /// Groups rows by field, drops rows seen twice (linked sources overlap),
    /// sorts newest first and keeps the most recent few
    fn merge(&self, rows: Vec<&ChangeLogModel>) -> FieldIndicators {
        let mut seen = HashSet::new();
        let mut indicators = FieldIndicators::new();
        for row in rows {
            if !seen.insert((row.table_name.as_str(), row.id.as_str())) {
                continue;
            }
            indicators
                .entry(row.field_name.clone())
                .or_default()
                .push(ChangeIndicator::from(row));
        }
        for list in indicators.values_mut() {
            list.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
            list.truncate(self.max_per_field);
        }
        indicators
    }

    pub async fn get(&self, record_id: &RecordId, field_name: &str) -> Vec<ChangeIndicator> {
        self.cache
            .get(record_id)
            .await
            .and_then(|fields| fields.get(field_name).cloned())
            .unwrap_or_default()
    }

    pub async fn has_changes(&self, record_id: &RecordId, field_name: &str) -> bool {
        self.cache
            .get(record_id)
            .await
            .is_some_and(|fields| fields.get(field_name).is_some_and(|list| !list.is_empty()))
    }

    /// Names of the fields with history, sorted
    pub async fn fields_with_changes(&self, record_id: &RecordId) -> Vec<String> {
        let mut fields: Vec<String> = self
            .cache
            .get(record_id)
            .await
            .map(|fields| fields.keys().cloned().collect())
            .unwrap_or_default();
        fields.sort();
        fields
    }

    pub async fn invalidate(&self, record_id: &RecordId) {
        self.cache.invalidate(record_id).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Refresh whose failure is only logged; used after writes that already
    /// succeeded
    pub(crate) async fn refresh_or_warn(&self, record_ids: &[RecordId]) {
        if let Err(e) = self.refresh(record_ids).await {
            warn!(records = record_ids.len(), error = %e, "Change indicators could not be refreshed");
        }
    }
}

fn history_error(e: Box<dyn std::error::Error + Send + Sync>) -> ChangeError {
    ChangeError::HistoryLoadFailure(e.to_string())
}
