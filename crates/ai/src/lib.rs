//! AdvisorGPT AI - natural-language SQL agent over rig-core.
//!
//! One chat turn is one blocking request/response: the user's question is
//! turned into a single read-only SELECT against the output-table schema,
//! the query runs through a store-provided executor, and a second model
//! call summarizes the rows as prose.
//!
//! - `agent`: the two-call orchestration and SQL guardrails
//! - `executor`: the store seam (`SqlExecutorTrait`) and a test fake
//! - `error`: agent error types

pub mod agent;
pub mod error;
pub mod executor;

pub use agent::{AgentConfig, FakeSqlAgent, SqlAgent, SqlAgentTrait};
pub use error::AiError;
pub use executor::{FakeSqlExecutor, QueryResult, SqlExecutorTrait};
