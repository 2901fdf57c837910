pub mod change_log;
pub mod record;
pub mod specs;

pub use change_log::ChangeLogRepositoryImpl;
pub use record::RecordRepositoryImpl;
pub use specs::SpecsRepositoryImpl;
