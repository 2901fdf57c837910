use crate::client::RestClient;

/// Technical specifications by machine model, `/api/model-specs/<model>`
#[derive(Clone)]
pub struct SpecsRepositoryImpl {
    pub(crate) client: RestClient,
}

impl SpecsRepositoryImpl {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}
