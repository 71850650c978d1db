//! SQLite storage implementation for AdvisorGPT.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `advisorgpt-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations for the four output tables
//! - The load repository (per-table replace semantics)
//! - A read-only query executor for the SQL agent
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The `core` and `ai` crates are database-agnostic and work with traits.
//!
//! ```text
//! core (cleaning pipeline)     ai (SQL agent)
//!           │                        │
//!           └───────────┬────────────┘
//!                       │
//!                       ▼
//!              storage-sqlite (this crate)
//!                       │
//!                       ▼
//!                   SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod loader;
pub mod query;
pub mod schema;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use loader::LoadRepository;
pub use query::ReadOnlyQueryExecutor;

// Re-export from advisorgpt-core for convenience
pub use advisorgpt_core::errors::{DatabaseError, Error, Result};
