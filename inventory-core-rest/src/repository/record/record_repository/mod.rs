pub mod repo_impl;
pub mod load_all;
pub mod update_fields;

pub use repo_impl::RecordRepositoryImpl;
