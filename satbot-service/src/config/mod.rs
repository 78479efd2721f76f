use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::config::{self as core_config, Entries};
use service_core::error::AppError;
use std::path::{Path, PathBuf};

/// OpenAI-compatible chat completions endpoint served by Groq.
pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Environment variables consulted when resolving configuration.
pub const CONFIG_KEYS: &[&str] = &[
    "PORT",
    "GROQ_API_KEY",
    "GROQ_API_URL",
    "CONTEXT_FILE",
    "LOG_LEVEL",
    "OTLP_ENDPOINT",
];

#[derive(Debug, Deserialize)]
pub struct SatbotConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Checked per request rather than at startup, so a missing key is reported
    /// to callers instead of preventing the service from booting.
    #[serde(default)]
    pub groq_api_key: Option<Secret<String>>,
    #[serde(default = "default_groq_api_url")]
    pub groq_api_url: String,
    #[serde(default = "default_context_file")]
    pub context_file: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    /// The env file that contributed values, if one was found.
    #[serde(skip)]
    pub env_file: Option<PathBuf>,
    /// Parse errors for env file lines that were ignored.
    #[serde(skip)]
    pub env_file_skipped: Vec<String>,
}

fn default_port() -> u16 {
    8080
}

fn default_groq_api_url() -> String {
    DEFAULT_GROQ_API_URL.to_string()
}

fn default_context_file() -> PathBuf {
    PathBuf::from("context.txt")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl SatbotConfig {
    /// Load from the env file named by `ENV_FILE` (default `.env`) layered under
    /// the process environment. A missing file is not an error.
    pub fn load() -> Result<Self, AppError> {
        let env_file = std::env::var("ENV_FILE").unwrap_or_else(|_| ".env".to_string());
        Self::load_from(PathBuf::from(env_file), core_config::process_env(CONFIG_KEYS))
    }

    /// Layer `env` over the contents of `env_file`, which may be absent.
    pub fn load_from(env_file: PathBuf, env: Entries) -> Result<Self, AppError> {
        let Some(parsed) = core_config::read_env_file(&env_file)? else {
            return Self::resolve(Entries::new(), env);
        };

        let mut config = Self::resolve(parsed.entries, env)?;
        config.env_file = Some(env_file);
        config.env_file_skipped = parsed.skipped;
        Ok(config)
    }

    /// Pure resolution from an env-file layer and an environment layer.
    pub fn resolve(file: Entries, env: Entries) -> Result<Self, AppError> {
        let mut config: SatbotConfig = core_config::resolve(file, env)?;
        config.groq_api_key = config
            .groq_api_key
            .filter(|key| !key.expose_secret().trim().is_empty());
        Ok(config)
    }

    pub fn context_file(&self) -> &Path {
        &self.context_file
    }
}
