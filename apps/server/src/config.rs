/// Server configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the SQLite database.
    pub data_dir: String,
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// LLM provider id ("openai", "anthropic", "gemini", "ollama").
    pub ai_provider: String,
    /// Model id at the provider.
    pub ai_model: String,
    /// API key for the provider; keyless providers may omit it.
    pub ai_api_key: Option<String>,
    /// Base URL override for self-hosted providers.
    pub ai_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("ADVISOR_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            listen_addr: std::env::var("ADVISOR_LISTEN_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            ai_provider: std::env::var("ADVISOR_AI_PROVIDER")
                .unwrap_or_else(|_| "openai".to_string()),
            ai_model: std::env::var("ADVISOR_AI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            ai_api_key: std::env::var("ADVISOR_AI_API_KEY").ok(),
            ai_base_url: std::env::var("ADVISOR_AI_BASE_URL").ok(),
        }
    }
}
