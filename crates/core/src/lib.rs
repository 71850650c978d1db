//! AdvisorGPT Core - cleaning pipeline, domain records, and traits.
//!
//! This crate contains the data-cleaning pipeline for the two advisor CSV
//! exports (current holdings and target allocations) and the typed records
//! for the four output tables. It is database-agnostic and defines traits
//! that are implemented by the `storage-sqlite` crate.

pub mod cleaning;
pub mod constants;
pub mod errors;
pub mod ingest;
pub mod pipeline;
pub mod records;
pub mod table;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

// Re-export the table substrate used across module boundaries
pub use table::Frame;
