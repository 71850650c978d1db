use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use advisorgpt_ai::{AgentConfig, SqlAgent, SqlAgentTrait};
use advisorgpt_storage_sqlite::{db, ReadOnlyQueryExecutor};

pub struct AppState {
    pub agent: Arc<dyn SqlAgentTrait>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("ADVISOR_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.data_dir)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;

    let executor = Arc::new(ReadOnlyQueryExecutor::new(db_path.clone()));
    let agent_config = AgentConfig {
        provider_id: config.ai_provider.clone(),
        model_id: config.ai_model.clone(),
        api_key: config.ai_api_key.clone(),
        base_url: config.ai_base_url.clone(),
        ..AgentConfig::default()
    };
    let agent: Arc<dyn SqlAgentTrait> = Arc::new(SqlAgent::new(agent_config, executor));

    Ok(Arc::new(AppState { agent, db_path }))
}
