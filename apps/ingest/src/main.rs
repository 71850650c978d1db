//! Ingest binary: cleans the two advisor CSV exports and loads the four
//! output tables.
//!
//! Usage: `advisorgpt-ingest <holdings.csv> <target_allocations.csv>`
//! The database location comes from `ADVISOR_DATA_DIR` (or `DATABASE_URL`).

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use advisorgpt_core::pipeline::{PipelineConfig, PipelineService};
use advisorgpt_storage_sqlite::db::{self, spawn_writer};
use advisorgpt_storage_sqlite::LoadRepository;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let mut args = std::env::args().skip(1);
    let holdings_path = args
        .next()
        .or_else(|| std::env::var("ADVISOR_HOLDINGS_CSV").ok());
    let allocations_path = args
        .next()
        .or_else(|| std::env::var("ADVISOR_ALLOCATIONS_CSV").ok());
    let (holdings_path, allocations_path) = match (holdings_path, allocations_path) {
        (Some(h), Some(a)) => (h, a),
        _ => {
            eprintln!("usage: advisorgpt-ingest <holdings.csv> <target_allocations.csv>");
            std::process::exit(2);
        }
    };

    let data_dir = std::env::var("ADVISOR_DATA_DIR").unwrap_or_else(|_| "./data".to_string());
    let db_path = db::init(&data_dir)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = spawn_writer(pool);
    let repository = Arc::new(LoadRepository::new(writer));

    let holdings_csv = std::fs::read(&holdings_path)?;
    let allocations_csv = std::fs::read(&allocations_path)?;

    let service = PipelineService::new(repository, PipelineConfig::default());
    let report = service.run(&holdings_csv, &allocations_csv).await?;

    for outcome in &report.tables {
        match &outcome.error {
            None => tracing::info!(
                "{}: {} rows loaded ({} skipped)",
                outcome.table,
                outcome.inserted,
                outcome.skipped
            ),
            Some(err) => tracing::error!("{}: load failed: {}", outcome.table, err),
        }
    }
    tracing::info!("{} rows loaded in total", report.total_inserted());

    if !report.all_ok() {
        std::process::exit(1);
    }
    Ok(())
}
