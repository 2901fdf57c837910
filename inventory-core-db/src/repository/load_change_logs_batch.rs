use async_trait::async_trait;
use inventory_core_api::RecordId;

use crate::models::audit::{ChangeLogBatch, TrackedTable};

/// Repository trait for loading change history of many records in one call
///
/// All methods return a map from the requested id to its rows. Ids without
/// history may be missing from the map.
#[async_trait]
pub trait LoadChangeLogsBatch: Send + Sync {
    /// History of `ids` in `table`
    async fn load_batch(
        &self,
        table: TrackedTable,
        ids: &[RecordId],
    ) -> Result<ChangeLogBatch, Box<dyn std::error::Error + Send + Sync>>;

    /// History attached to purchases: the purchase rows themselves, their
    /// service records and the equipment rows created from them
    async fn load_batch_by_purchase(
        &self,
        purchase_ids: &[RecordId],
    ) -> Result<ChangeLogBatch, Box<dyn std::error::Error + Send + Sync>>;

    /// History attached to new purchases
    async fn load_batch_by_new_purchase(
        &self,
        new_purchase_ids: &[RecordId],
    ) -> Result<ChangeLogBatch, Box<dyn std::error::Error + Send + Sync>>;
}
