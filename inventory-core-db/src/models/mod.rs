pub mod auditable;
pub mod identifiable;
pub mod field;
pub mod audit;
pub mod inventory;

// Re-exports
pub use auditable::*;
pub use identifiable::*;
pub use field::*;
pub use audit::*;
pub use inventory::*;
