use inventory_core_db::Auditable;
use std::sync::Arc;

use crate::client::RestClient;
use crate::config::RestConfig;
use crate::error::RestError;
use crate::repository::{ChangeLogRepositoryImpl, RecordRepositoryImpl, SpecsRepositoryImpl};

/// Factory for the REST repositories
///
/// Holds the one HTTP client every repository shares. Build it once per
/// backend and hand the repositories to each page's tracker.
#[derive(Clone)]
pub struct RestRepositories {
    client: RestClient,
}

impl RestRepositories {
    pub fn new(config: &RestConfig) -> Result<Self, RestError> {
        Ok(Self::with_client(RestClient::new(config)?))
    }

    /// Settings from `INVENTORY_API_URL` / `INVENTORY_API_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, RestError> {
        Self::new(&RestConfig::from_env()?)
    }

    pub fn with_client(client: RestClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    pub fn build_record_repo<T: Auditable>(&self) -> Arc<RecordRepositoryImpl<T>> {
        Arc::new(RecordRepositoryImpl::new(self.client.clone()))
    }

    pub fn build_change_log_repo(&self) -> Arc<ChangeLogRepositoryImpl> {
        Arc::new(ChangeLogRepositoryImpl::new(self.client.clone()))
    }

    pub fn build_specs_repo(&self) -> Arc<SpecsRepositoryImpl> {
        Arc::new(SpecsRepositoryImpl::new(self.client.clone()))
    }

    /// Everything one page needs for record kind `T`. The specs repository
    /// is only built for kinds that bundle specs into `model` edits.
    pub fn build_all_repos<T: Auditable>(&self) -> RecordRepositories<T> {
        RecordRepositories {
            record_repository: self.build_record_repo(),
            change_log_repository: self.build_change_log_repo(),
            specs_repository: T::ACCEPTS_SPECS.then(|| self.build_specs_repo()),
        }
    }
}

/// Container for the repositories of one record kind
pub struct RecordRepositories<T: Auditable> {
    pub record_repository: Arc<RecordRepositoryImpl<T>>,
    pub change_log_repository: Arc<ChangeLogRepositoryImpl>,
    pub specs_repository: Option<Arc<SpecsRepositoryImpl>>,
}
