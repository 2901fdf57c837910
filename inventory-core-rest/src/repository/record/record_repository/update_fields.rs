use async_trait::async_trait;
use inventory_core_api::{FieldMap, RecordId};
use inventory_core_db::{Auditable, UpdateFields};
use std::error::Error;

use super::repo_impl::RecordRepositoryImpl;

impl<T: Auditable> RecordRepositoryImpl<T> {
    pub(super) async fn update_fields_impl(
        repo: &RecordRepositoryImpl<T>,
        id: &RecordId,
        updates: &FieldMap,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let url = repo.record_url(id)?;
        repo.client.put_discard(url, updates).await?;
        tracing::debug!(
            resource = T::RESOURCE,
            record_id = %id,
            fields = updates.len(),
            "Record updated"
        );
        Ok(())
    }
}

#[async_trait]
impl<T: Auditable> UpdateFields<T> for RecordRepositoryImpl<T> {
    async fn update_fields(
        &self,
        id: &RecordId,
        updates: &FieldMap,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Self::update_fields_impl(self, id, updates).await
    }
}
