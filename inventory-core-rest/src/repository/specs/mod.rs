pub mod specs_repository;

pub use specs_repository::SpecsRepositoryImpl;
