use inventory_core_api::RecordId;
use inventory_core_db::Auditable;
use reqwest::Url;
use std::marker::PhantomData;

use crate::client::RestClient;
use crate::error::RestError;

/// Record resource of kind `T`, served under `/api/<T::RESOURCE>`
pub struct RecordRepositoryImpl<T: Auditable> {
    pub(crate) client: RestClient,
    _record: PhantomData<fn() -> T>,
}

impl<T: Auditable> RecordRepositoryImpl<T> {
    pub fn new(client: RestClient) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }

    pub(crate) fn collection_url(&self) -> Result<Url, RestError> {
        self.client.endpoint(&[T::RESOURCE])
    }

    pub(crate) fn record_url(&self, id: &RecordId) -> Result<Url, RestError> {
        self.client.endpoint(&[T::RESOURCE, id.as_str()])
    }
}

impl<T: Auditable> Clone for RecordRepositoryImpl<T> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}
