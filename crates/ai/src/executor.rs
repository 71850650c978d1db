//! Store seam for agent-generated SQL.
//!
//! The agent never touches the database directly; it hands generated SQL
//! to a `SqlExecutorTrait` the storage crate implements with a read-only
//! connection. Tests plug in `FakeSqlExecutor`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AiError;

/// Rows returned by one agent query, stringified for prompt rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Trait for executing read-only SQL against the output tables.
#[async_trait]
pub trait SqlExecutorTrait: Send + Sync {
    /// Execute one SELECT statement. Implementations must hold a read-only
    /// connection so a hostile or hallucinated statement cannot mutate the
    /// store.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult, AiError>;
}

/// In-memory executor for tests: returns a fixed result and records the
/// statements it was asked to run.
#[derive(Default)]
pub struct FakeSqlExecutor {
    pub result: QueryResult,
    pub executed: std::sync::Mutex<Vec<String>>,
}

impl FakeSqlExecutor {
    pub fn with_result(columns: Vec<&str>, rows: Vec<Vec<&str>>) -> Self {
        Self {
            result: QueryResult {
                columns: columns.into_iter().map(str::to_string).collect(),
                rows: rows
                    .into_iter()
                    .map(|row| row.into_iter().map(|c| Some(c.to_string())).collect())
                    .collect(),
            },
            executed: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SqlExecutorTrait for FakeSqlExecutor {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult, AiError> {
        self.executed.lock().unwrap().push(sql.to_string());
        Ok(self.result.clone())
    }
}
