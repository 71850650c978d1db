//! Load repository: replaces the contents of the four output tables.

pub mod model;
pub mod repository;

pub use repository::LoadRepository;
