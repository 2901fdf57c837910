use async_trait::async_trait;
use inventory_core_api::CreateChangeLogRequest;

/// Repository trait for appending change-log entries
///
/// One call writes every field change of one record. From the caller's point
/// of view the call is a single logical write: it either succeeds as a whole
/// or fails as a whole.
#[async_trait]
pub trait CreateChangeLog: Send + Sync {
    /// Append the entries described by `request`
    ///
    /// # Arguments
    /// * `request` - Table, record, field diffs, optional reason and module
    ///
    /// # Returns
    /// * `Ok(())` - All entries were written
    /// * `Err` - Nothing can be assumed to have been written
    async fn create_change_log(
        &self,
        request: &CreateChangeLogRequest,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
