use async_trait::async_trait;
use inventory_core_db::{Auditable, LoadAll};
use serde::de::DeserializeOwned;
use std::error::Error;

use super::repo_impl::RecordRepositoryImpl;

impl<T: Auditable + DeserializeOwned> RecordRepositoryImpl<T> {
    pub(super) async fn load_all_impl(
        repo: &RecordRepositoryImpl<T>,
    ) -> Result<Vec<T>, Box<dyn Error + Send + Sync>> {
        let url = repo.collection_url()?;
        let records: Vec<T> = repo.client.get_json(url).await?;
        tracing::debug!(resource = T::RESOURCE, count = records.len(), "Records loaded");
        Ok(records)
    }
}

#[async_trait]
impl<T: Auditable + DeserializeOwned> LoadAll<T> for RecordRepositoryImpl<T> {
    async fn load_all(&self) -> Result<Vec<T>, Box<dyn Error + Send + Sync>> {
        Self::load_all_impl(self).await
    }
}
