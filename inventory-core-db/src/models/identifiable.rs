use inventory_core_api::RecordId;

/// Trait for entities that can be uniquely identified by a record id
pub trait Identifiable {
    /// Returns the unique identifier of the entity
    fn get_id(&self) -> RecordId;
}
