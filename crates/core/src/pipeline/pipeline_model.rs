//! Pipeline configuration and run reporting.

use serde::{Deserialize, Serialize};

use crate::cleaning::{AllocationShape, HoldingsCleanConfig};

/// Configuration for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    pub holdings: HoldingsCleanConfig,
    pub allocation: AllocationShape,
}

/// Outcome of loading one output table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableLoadOutcome {
    /// Output table name.
    pub table: String,
    /// Rows inserted (zero when the load failed).
    pub inserted: usize,
    /// Rows dropped because a typed record could not be built from them.
    pub skipped: usize,
    /// Load failure, when the table's transaction rolled back.
    pub error: Option<String>,
}

/// Per-table outcomes of one pipeline run.
///
/// A failed table does not abort the run: its transaction rolls back and
/// the remaining tables still load. Cross-table consistency is therefore
/// weak by design; callers decide whether a partial load is acceptable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub tables: Vec<TableLoadOutcome>,
}

impl LoadReport {
    /// True when every table loaded without error.
    pub fn all_ok(&self) -> bool {
        self.tables.iter().all(|t| t.error.is_none())
    }

    /// Total rows inserted across tables.
    pub fn total_inserted(&self) -> usize {
        self.tables.iter().map(|t| t.inserted).sum()
    }
}
