//! Cleaning and normalization for the raw advisor exports.
//!
//! The pipeline is a short, linear sequence of in-memory transforms:
//! column-name normalization, reference-keyed filling of missing values,
//! client identifier repair, numeric triangulation, and the reshape of the
//! wide allocation sheet into per-client rows. Cleaning is best-effort by
//! policy: values that cannot be repaired or derived stay missing; errors
//! are reserved for cases where continuing would produce wrong output.

pub mod allocations;
pub mod client_ids;
pub mod columns;
pub mod holdings;
pub mod reference_fill;

pub use allocations::{normalize_target_allocation, AllocationOutput, AllocationShape};
pub use client_ids::{normalize_client_id, repair_client_ids, MisfillWindow};
pub use columns::{normalize_column_name, normalize_columns};
pub use holdings::{normalize_holdings, HoldingsCleanConfig, HoldingsOutput};
pub use reference_fill::fill_from_reference;
