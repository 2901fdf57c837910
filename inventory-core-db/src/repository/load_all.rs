use async_trait::async_trait;

use crate::models::auditable::Auditable;

/// Generic repository trait for loading the full list of a record resource
///
/// Used to refresh the page's local records after confirmed writes
/// (`GET /api/<resource>`).
#[async_trait]
pub trait LoadAll<T: Auditable>: Send + Sync {
    async fn load_all(&self) -> Result<Vec<T>, Box<dyn std::error::Error + Send + Sync>>;
}
