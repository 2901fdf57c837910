pub mod change_log_request;
pub mod field_value;
pub mod pending_change;
pub mod reconciliation;
pub mod record_id;

pub use change_log_request::*;
pub use field_value::*;
pub use pending_change::*;
pub use reconciliation::*;
pub use record_id::*;
