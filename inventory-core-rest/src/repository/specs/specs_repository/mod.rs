pub mod repo_impl;
pub mod find_by_model;

pub use repo_impl::SpecsRepositoryImpl;
