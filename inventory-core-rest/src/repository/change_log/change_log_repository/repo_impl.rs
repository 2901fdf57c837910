use crate::client::RestClient;

/// Change log endpoints under `/api/change-logs`
#[derive(Clone)]
pub struct ChangeLogRepositoryImpl {
    pub(crate) client: RestClient,
}

impl ChangeLogRepositoryImpl {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}
