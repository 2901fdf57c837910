pub mod create_change_log;
pub mod find_specs_by_model;
pub mod load_all;
pub mod load_change_logs_batch;
pub mod update_fields;

// Re-exports
pub use create_change_log::*;
pub use find_specs_by_model::*;
pub use load_all::*;
pub use load_change_logs_batch::*;
pub use update_fields::*;

use crate::models::auditable::Auditable;

/// Everything the change-tracking core needs from a record resource
pub trait RecordRepository<T: Auditable>: UpdateFields<T> + LoadAll<T> {}

impl<T: Auditable, R: UpdateFields<T> + LoadAll<T>> RecordRepository<T> for R {}

/// Everything the change-tracking core needs from the change log
pub trait ChangeLogRepository: CreateChangeLog + LoadChangeLogsBatch {}

impl<R: CreateChangeLog + LoadChangeLogsBatch> ChangeLogRepository for R {}
