pub mod equipment;
pub mod importation;
pub mod machine_specs;
pub mod new_purchase;

pub use equipment::*;
pub use importation::*;
pub use machine_specs::*;
pub use new_purchase::*;
