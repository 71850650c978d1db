//! End-to-end ingest pipeline: parse, clean, and load the two raw exports.

mod pipeline_model;
mod pipeline_service;

pub use pipeline_model::{LoadReport, PipelineConfig, TableLoadOutcome};
pub use pipeline_service::PipelineService;
