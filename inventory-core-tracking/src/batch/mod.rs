pub mod accumulator;
pub mod entry;
pub mod summary;

pub use accumulator::*;
pub use entry::*;
pub use summary::*;
