use async_trait::async_trait;
use inventory_core_api::{FieldMap, RecordId};

use crate::models::auditable::Auditable;

/// Generic repository trait for writing a partial update to one record
///
/// Implementations send only the given fields (`PUT /api/<resource>/<id>`
/// with a JSON object body). The caller decides whether the map is a single
/// field or the merged map of a batch entry.
///
/// # Type Parameters
/// * `T` - The record type that must implement Auditable trait
///
/// # Example
/// ```ignore
/// impl UpdateFields<EquipmentModel> for RecordRepositoryImpl<EquipmentModel> {
///     async fn update_fields(&self, id: &RecordId, updates: &FieldMap) -> Result<(), Box<dyn Error + Send + Sync>> {
///         // Implementation
///     }
/// }
/// ```
#[async_trait]
pub trait UpdateFields<T: Auditable>: Send + Sync {
    /// Persist a partial update
    ///
    /// # Arguments
    /// * `id` - The record to update
    /// * `updates` - Field name to new value
    ///
    /// # Returns
    /// * `Ok(())` - The backend accepted the update
    /// * `Err` - Transport failure or non-success status
    async fn update_fields(
        &self,
        id: &RecordId,
        updates: &FieldMap,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
