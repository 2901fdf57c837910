pub mod client;
pub mod config;
pub mod error;
pub mod repository;
pub mod rest_repositories;

pub use client::RestClient;
pub use config::RestConfig;
pub use error::RestError;
pub use repository::{ChangeLogRepositoryImpl, RecordRepositoryImpl, SpecsRepositoryImpl};
pub use rest_repositories::{RecordRepositories, RestRepositories};

#[cfg(test)]
pub mod test_helper;

