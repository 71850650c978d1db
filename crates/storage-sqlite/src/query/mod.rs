//! Read-only query executor for the SQL agent.
//!
//! Agent-generated SQL runs over a rusqlite connection opened with
//! `SQLITE_OPEN_READ_ONLY`, so even a statement that slips past the
//! agent's guard cannot mutate the store. Diesel is not used here; the
//! agent works with arbitrary SELECT shapes, not typed rows.

use async_trait::async_trait;
use log::debug;
use rusqlite::{types::ValueRef, Connection, OpenFlags};

use advisorgpt_ai::{AiError, QueryResult, SqlExecutorTrait};

pub struct ReadOnlyQueryExecutor {
    db_path: String,
}

impl ReadOnlyQueryExecutor {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

fn run_query(db_path: &str, sql: &str) -> Result<QueryResult, AiError> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| AiError::Query(e.to_string()))?;
    conn.busy_timeout(std::time::Duration::from_secs(30))
        .map_err(|e| AiError::Query(e.to_string()))?;

    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| AiError::Query(e.to_string()))?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let column_count = columns.len();

    let mut rows = Vec::new();
    let mut cursor = stmt.query([]).map_err(|e| AiError::Query(e.to_string()))?;
    while let Some(row) = cursor.next().map_err(|e| AiError::Query(e.to_string()))? {
        let mut cells = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let value = match row.get_ref(i).map_err(|e| AiError::Query(e.to_string()))? {
                ValueRef::Null => None,
                ValueRef::Integer(v) => Some(v.to_string()),
                ValueRef::Real(v) => Some(v.to_string()),
                ValueRef::Text(v) => Some(String::from_utf8_lossy(v).to_string()),
                ValueRef::Blob(_) => Some("<blob>".to_string()),
            };
            cells.push(value);
        }
        rows.push(cells);
    }

    Ok(QueryResult { columns, rows })
}

#[async_trait]
impl SqlExecutorTrait for ReadOnlyQueryExecutor {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult, AiError> {
        let db_path = self.db_path.clone();
        let sql = sql.to_string();
        debug!("executing agent query: {}", sql);

        tokio::task::spawn_blocking(move || run_query(&db_path, &sql))
            .await
            .map_err(|e| AiError::internal(format!("query task panicked: {}", e)))?
    }
}
