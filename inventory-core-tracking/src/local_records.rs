use inventory_core_api::{ChangeError, ChangeResult, FieldMap, RecordId};
use inventory_core_db::{Auditable, LoadAll};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, warn};

/// The page's in-memory copy of the record list.
///
/// Rows keep the order the backend returned them in. Successful writes are
/// applied here so the table shows the new value without a reload.
pub struct LocalRecords<T: Auditable> {
    inner: RwLock<Inner<T>>,
}

struct Inner<T> {
    order: Vec<RecordId>,
    rows: HashMap<RecordId, T>,
}

impl<T: Auditable> Default for LocalRecords<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Auditable> LocalRecords<T> {
    pub fn new(records: Vec<T>) -> Self {
        let this = Self {
            inner: RwLock::new(Inner {
                order: Vec::new(),
                rows: HashMap::new(),
            }),
        };
        this.replace_all(records);
        this
    }

    pub fn replace_all(&self, records: Vec<T>) {
        let mut inner = self.inner.write();
        inner.order = records.iter().map(|r| r.get_id()).collect();
        inner.rows = records.into_iter().map(|r| (r.get_id(), r)).collect();
    }

    pub fn get(&self, id: &RecordId) -> Option<T> {
        self.inner.read().rows.get(id).cloned()
    }

    pub fn all(&self) -> Vec<T> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.rows.get(id).cloned())
            .collect()
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.inner.read().order.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies a persisted update to the local copy.
    ///
    /// The update is applied to a clone first so a conversion error leaves
    /// the row untouched.
    pub fn apply(&self, id: &RecordId, updates: &FieldMap) -> ChangeResult<()> {
        let mut inner = self.inner.write();
        let Some(row) = inner.rows.get_mut(id) else {
            debug!(record_id = %id, "Record not loaded locally, skipping local update");
            return Ok(());
        };
        let mut updated = row.clone();
        updated.apply_updates(updates)?;
        *row = updated;
        Ok(())
    }

    /// Applies an update that is already persisted; a local conversion
    /// failure only means the table is stale until the next reload.
    pub(crate) fn apply_persisted(&self, id: &RecordId, updates: &FieldMap) {
        if let Err(e) = self.apply(id, updates) {
            warn!(record_id = %id, error = %e, "Persisted update could not be applied locally");
        }
    }

    /// Replaces the local copy with the backend's full list
    pub async fn reload<R>(&self, repository: &R) -> ChangeResult<usize>
    where
        R: LoadAll<T> + ?Sized,
    {
        let records = repository.load_all().await.map_err(|e| {
            ChangeError::InternalError(format!("Failed to load {}: {e}", T::RESOURCE))
        })?;
        let count = records.len();
        self.replace_all(records);
        debug!(resource = T::RESOURCE, count, "Reloaded local records");
        Ok(count)
    }
}
