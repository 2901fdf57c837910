use async_trait::async_trait;
use inventory_core_api::{BatchChangeLogRequest, RecordId};
use inventory_core_db::{ChangeLogBatch, ChangeLogModel, LoadChangeLogsBatch, TrackedTable};
use std::collections::HashMap;
use std::error::Error;

use super::repo_impl::ChangeLogRepositoryImpl;

impl ChangeLogRepositoryImpl {
    /// Shared body of the three batch history endpoints. The backend keys
    /// the response by id as a JSON object, so keys always arrive as text.
    pub(super) async fn load_batch_impl(
        repo: &ChangeLogRepositoryImpl,
        endpoint: &str,
        table: TrackedTable,
        ids: &[RecordId],
    ) -> Result<ChangeLogBatch, Box<dyn Error + Send + Sync>> {
        if ids.is_empty() {
            return Ok(ChangeLogBatch::new());
        }

        let url = repo.client.endpoint(&["change-logs", endpoint])?;
        let request = BatchChangeLogRequest {
            table_name: table.to_string(),
            record_ids: ids.to_vec(),
        };
        let rows: HashMap<String, Vec<ChangeLogModel>> = repo.client.post_json(url, &request).await?;

        let batch: ChangeLogBatch = rows
            .into_iter()
            .map(|(id, entries)| (RecordId::from(id), entries))
            .collect();
        tracing::debug!(
            endpoint,
            table = table.as_str(),
            requested = ids.len(),
            with_history = batch.len(),
            "Change history loaded"
        );
        Ok(batch)
    }
}

#[async_trait]
impl LoadChangeLogsBatch for ChangeLogRepositoryImpl {
    async fn load_batch(
        &self,
        table: TrackedTable,
        ids: &[RecordId],
    ) -> Result<ChangeLogBatch, Box<dyn Error + Send + Sync>> {
        Self::load_batch_impl(self, "batch", table, ids).await
    }

    async fn load_batch_by_purchase(
        &self,
        purchase_ids: &[RecordId],
    ) -> Result<ChangeLogBatch, Box<dyn Error + Send + Sync>> {
        Self::load_batch_impl(self, "batch-by-purchase", TrackedTable::Purchases, purchase_ids).await
    }

    async fn load_batch_by_new_purchase(
        &self,
        new_purchase_ids: &[RecordId],
    ) -> Result<ChangeLogBatch, Box<dyn Error + Send + Sync>> {
        Self::load_batch_impl(self, "batch-by-new-purchase", TrackedTable::NewPurchases, new_purchase_ids).await
    }
}
