//! Natural-language SQL agent.
//!
//! One `ask` turn makes two model calls: the first turns the question into
//! a single read-only SELECT over the known schema, the second summarizes
//! the query result as prose. There is no conversational memory; each turn
//! stands alone.

use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use rig::{
    client::{CompletionClient, Nothing},
    completion::Prompt,
    providers::{anthropic, gemini, ollama, openai},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AiError;
use crate::executor::{QueryResult, SqlExecutorTrait};

/// DDL of the four output tables, given verbatim to the model.
const SCHEMA_DDL: &str = "\
CREATE TABLE client_profile (
    client TEXT PRIMARY KEY,
    target_portfolio TEXT NOT NULL
);
CREATE TABLE asset_performance (
    symbol TEXT PRIMARY KEY,
    name TEXT,
    sector TEXT,
    current_price TEXT,
    dividend_yield TEXT,
    pe_ratio TEXT,
    week_52_high TEXT,
    week_52_low TEXT,
    analyst_rating TEXT,
    target_price TEXT,
    risk_level TEXT
);
CREATE TABLE client_allocation (
    client TEXT NOT NULL,
    symbol TEXT NOT NULL,
    quantity TEXT NOT NULL,
    buy_price TEXT,
    purchase_date TEXT,
    PRIMARY KEY (client, symbol)
);
CREATE TABLE target_allocation (
    client TEXT NOT NULL,
    asset_class TEXT NOT NULL,
    target_allocation_percent TEXT NOT NULL,
    PRIMARY KEY (client, asset_class)
);";

// ============================================================================
// Agent Trait
// ============================================================================

/// Trait for answering a natural-language question against the store.
#[async_trait]
pub trait SqlAgentTrait: Send + Sync {
    /// Answer one question. Network and auth failures propagate as-is;
    /// retries, if wanted, belong to the caller.
    async fn ask(&self, question: &str) -> Result<String, AiError>;
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the SQL agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    /// Provider id: "anthropic", "gemini", "ollama", or any
    /// OpenAI-compatible provider.
    pub provider_id: String,
    /// Model id at the provider.
    pub model_id: String,
    /// API key; optional only for keyless providers like ollama.
    pub api_key: Option<String>,
    /// Base URL override (ollama / self-hosted gateways).
    pub base_url: Option<String>,
    /// Max result rows rendered into the summarization prompt.
    pub max_result_rows: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider_id: "openai".to_string(),
            model_id: "gpt-4o-mini".to_string(),
            api_key: None,
            base_url: None,
            max_result_rows: 50,
        }
    }
}

// ============================================================================
// Agent Implementation
// ============================================================================

/// SQL agent backed by a rig-core provider and a store executor.
pub struct SqlAgent {
    config: AgentConfig,
    executor: Arc<dyn SqlExecutorTrait>,
}

impl SqlAgent {
    pub fn new(config: AgentConfig, executor: Arc<dyn SqlExecutorTrait>) -> Self {
        Self { config, executor }
    }

    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let provider_id = self.config.provider_id.as_str();
        let model_id = &self.config.model_id;
        let api_key = self.config.api_key.clone();

        let response = match provider_id {
            "anthropic" => {
                let key = api_key.ok_or_else(|| AiError::MissingApiKey(provider_id.to_string()))?;
                let client: anthropic::Client<HttpClient> =
                    anthropic::Client::new(&key).map_err(|e| AiError::Provider(e.to_string()))?;
                client
                    .agent(model_id)
                    .build()
                    .prompt(prompt)
                    .await
                    .map_err(|e| AiError::Provider(e.to_string()))?
            }
            "gemini" | "google" => {
                let key = api_key.ok_or_else(|| AiError::MissingApiKey(provider_id.to_string()))?;
                let client: gemini::Client<HttpClient> =
                    gemini::Client::new(&key).map_err(|e| AiError::Provider(e.to_string()))?;
                client
                    .agent(model_id)
                    .build()
                    .prompt(prompt)
                    .await
                    .map_err(|e| AiError::Provider(e.to_string()))?
            }
            "ollama" => {
                let mut builder = ollama::Client::<HttpClient>::builder().api_key(Nothing);
                if let Some(url) = &self.config.base_url {
                    builder = builder.base_url(url);
                }
                let client = builder
                    .build()
                    .map_err(|e| AiError::Provider(e.to_string()))?;
                client
                    .agent(model_id)
                    .build()
                    .prompt(prompt)
                    .await
                    .map_err(|e| AiError::Provider(e.to_string()))?
            }
            _ => {
                // Default to OpenAI-compatible
                let key = api_key.ok_or_else(|| AiError::MissingApiKey(provider_id.to_string()))?;
                let client: openai::Client<HttpClient> =
                    openai::Client::new(&key).map_err(|e| AiError::Provider(e.to_string()))?;
                client
                    .agent(model_id)
                    .build()
                    .prompt(prompt)
                    .await
                    .map_err(|e| AiError::Provider(e.to_string()))?
            }
        };

        Ok(response)
    }

    fn sql_prompt(&self, question: &str) -> String {
        format!(
            "You translate questions about a financial advisor's book into SQLite SQL.\n\
Schema:\n{}\n\n\
Rules:\n\
- Return exactly ONE SELECT statement (WITH ... SELECT is fine)\n\
- No INSERT/UPDATE/DELETE/DDL, no PRAGMA, no multiple statements\n\
- Return ONLY the SQL, no commentary\n\n\
Question: {}\n\nSQL:",
            SCHEMA_DDL, question
        )
    }

    fn summary_prompt(&self, question: &str, sql: &str, result: &QueryResult) -> String {
        format!(
            "A user asked: {}\n\n\
This SQL was run against the advisor database:\n{}\n\n\
Result:\n{}\n\n\
Answer the user's question in plain prose based only on this result. \
Be concise; mention concrete numbers and names from the rows.",
            question,
            sql,
            render_result(result, self.config.max_result_rows)
        )
    }
}

#[async_trait]
impl SqlAgentTrait for SqlAgent {
    async fn ask(&self, question: &str) -> Result<String, AiError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AiError::InvalidInput("question is empty".to_string()));
        }

        let raw_sql = self.complete(&self.sql_prompt(question)).await?;
        let sql = extract_sql(&raw_sql)?;
        debug!("generated SQL: {}", sql);

        let result = self.executor.execute_query(&sql).await?;
        debug!(
            "query returned {} rows, {} columns",
            result.rows.len(),
            result.columns.len()
        );

        let answer = self
            .complete(&self.summary_prompt(question, &sql, &result))
            .await?;
        Ok(escape_dollars(answer.trim()))
    }
}

// ============================================================================
// SQL and Text Helpers
// ============================================================================

/// Strip code fences and validate that the model produced a single
/// read-only SELECT.
pub fn extract_sql(raw: &str) -> Result<String, AiError> {
    let mut sql = raw.trim();

    if let Some(stripped) = sql.strip_prefix("```") {
        // Drop the language tag line and the closing fence. Longer tag
        // first: "sql" is a prefix of "sqlite".
        let stripped = stripped
            .strip_prefix("sqlite")
            .or_else(|| stripped.strip_prefix("sql"))
            .unwrap_or(stripped);
        sql = stripped.strip_suffix("```").unwrap_or(stripped).trim();
    }

    let sql = sql.trim_end_matches(';').trim().to_string();
    if sql.is_empty() {
        return Err(AiError::RejectedSql("empty statement".to_string()));
    }

    let lowered = sql.to_lowercase();
    if !(lowered.starts_with("select") || lowered.starts_with("with")) {
        return Err(AiError::RejectedSql(format!(
            "not a SELECT statement: {}",
            sql.lines().next().unwrap_or_default()
        )));
    }
    if sql.contains(';') {
        return Err(AiError::RejectedSql(
            "multiple statements are not allowed".to_string(),
        ));
    }

    Ok(sql)
}

/// Render a query result as a compact text table, bounded to `max_rows`.
fn render_result(result: &QueryResult, max_rows: usize) -> String {
    if result.rows.is_empty() {
        return "(no rows)".to_string();
    }

    let mut out = result.columns.join(" | ");
    out.push('\n');
    for row in result.rows.iter().take(max_rows) {
        let line: Vec<&str> = row
            .iter()
            .map(|cell| cell.as_deref().unwrap_or("NULL"))
            .collect();
        out.push_str(&line.join(" | "));
        out.push('\n');
    }
    if result.rows.len() > max_rows {
        out.push_str(&format!(
            "... {} more rows omitted\n",
            result.rows.len() - max_rows
        ));
    }
    out
}

/// Escape literal `$` so answers render safely in markdown chat UIs.
pub fn escape_dollars(text: &str) -> String {
    text.replace('$', "\\$")
}

// ============================================================================
// Fake Agent for Testing
// ============================================================================

/// A fake agent returning a fixed answer, for wiring tests.
pub struct FakeSqlAgent {
    pub answer: String,
}

impl FakeSqlAgent {
    pub fn with_answer(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
        }
    }
}

#[async_trait]
impl SqlAgentTrait for FakeSqlAgent {
    async fn ask(&self, _question: &str) -> Result<String, AiError> {
        Ok(escape_dollars(&self.answer))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::FakeSqlExecutor;

    #[test]
    fn test_extract_sql_plain_select() {
        let sql = extract_sql("SELECT * FROM client_profile;").unwrap();
        assert_eq!(sql, "SELECT * FROM client_profile");
    }

    #[test]
    fn test_extract_sql_fenced() {
        let raw = "```sql\nSELECT client FROM client_allocation\n```";
        assert_eq!(extract_sql(raw).unwrap(), "SELECT client FROM client_allocation");
    }

    #[test]
    fn test_extract_sql_sqlite_fence_tag() {
        let raw = "```sqlite\nSELECT client FROM client_profile\n```";
        assert_eq!(extract_sql(raw).unwrap(), "SELECT client FROM client_profile");
    }

    #[test]
    fn test_extract_sql_with_cte() {
        let raw = "WITH totals AS (SELECT client FROM client_allocation) SELECT * FROM totals";
        assert!(extract_sql(raw).is_ok());
    }

    #[test]
    fn test_extract_sql_rejects_mutation() {
        assert!(extract_sql("DELETE FROM client_profile").is_err());
        assert!(extract_sql("DROP TABLE asset_performance").is_err());
    }

    #[test]
    fn test_extract_sql_rejects_multiple_statements() {
        assert!(extract_sql("SELECT 1; DELETE FROM client_profile").is_err());
    }

    #[test]
    fn test_escape_dollars() {
        assert_eq!(
            escape_dollars("AAPL is worth $1,500.00"),
            "AAPL is worth \\$1,500.00"
        );
    }

    #[test]
    fn test_render_result_bounded() {
        let result = QueryResult {
            columns: vec!["client".to_string()],
            rows: (0..10)
                .map(|i| vec![Some(format!("Client_{}", i))])
                .collect(),
        };
        let rendered = render_result(&result, 3);
        assert!(rendered.contains("7 more rows omitted"));
    }

    #[test]
    fn test_render_result_nulls() {
        let result = QueryResult {
            columns: vec!["buy_price".to_string()],
            rows: vec![vec![None]],
        };
        assert!(render_result(&result, 10).contains("NULL"));
    }

    #[tokio::test]
    async fn test_fake_agent_escapes_dollars() {
        let agent = FakeSqlAgent::with_answer("Total value is $250.00");
        let answer = agent.ask("what is the total?").await.unwrap();
        assert_eq!(answer, "Total value is \\$250.00");
    }

    #[tokio::test]
    async fn test_fake_executor_records_statements() {
        let executor = FakeSqlExecutor::with_result(vec!["client"], vec![vec!["Client_23"]]);
        let result = executor.execute_query("SELECT client FROM x").await.unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(
            executor.executed.lock().unwrap().as_slice(),
            &["SELECT client FROM x".to_string()]
        );
    }
}
