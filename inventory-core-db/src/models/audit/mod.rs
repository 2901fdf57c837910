pub mod change_indicator;
pub mod change_log;
pub mod indicator_link;
pub mod tracked_table;

pub use change_indicator::*;
pub use change_log::*;
pub use indicator_link::*;
pub use tracked_table::*;
