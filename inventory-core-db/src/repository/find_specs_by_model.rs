use async_trait::async_trait;

use crate::models::inventory::MachineSpecsModel;

/// Repository trait for looking up the technical specification of a model
#[async_trait]
pub trait FindSpecsByModel: Send + Sync {
    /// # Returns
    /// * `Ok(Some(specs))` - The model is known
    /// * `Ok(None)` - No specification is registered for the model
    /// * `Err` - An error if the lookup could not be executed
    async fn find_specs_by_model(
        &self,
        model: &str,
    ) -> Result<Option<MachineSpecsModel>, Box<dyn std::error::Error + Send + Sync>>;
}
