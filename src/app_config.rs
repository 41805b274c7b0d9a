use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Model service settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Glossary file location, `None` means the per-user default
    #[serde(default)]
    pub glossary_path: Option<PathBuf>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// File that receives a copy of every log line, empty to disable
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// Settings for the hosted text generation service
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiConfig {
    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    // @field: Model used for extraction, translation and review
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    // @field: Model used for the polish pass
    #[serde(default = "default_reasoner_model")]
    pub reasoner_model: String,

    // @field: Max output tokens per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    // @field: Backoff base, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_api_base(),
            chat_model: default_chat_model(),
            reasoner_model: default_reasoner_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Environment variables that override the configuration file
pub const ENV_API_KEY: &str = "DEEPSEEK_API_KEY";
pub const ENV_API_BASE: &str = "DEEPSEEK_API_BASE";
pub const ENV_CHAT_MODEL: &str = "MODEL_NAME";
pub const ENV_REASONER_MODEL: &str = "REASONER_MODEL_NAME";
pub const ENV_MAX_TOKENS: &str = "MAX_TOKENS";

fn default_api_base() -> String {
    "https://api.deepseek.com/v1".to_string()
}

fn default_chat_model() -> String {
    "deepseek-chat".to_string()
}

fn default_reasoner_model() -> String {
    "deepseek-reasoner".to_string()
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_timeout_secs() -> u64 {
    180
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_log_file() -> String {
    "mdtranslate.log".to_string()
}

impl Config {
    /// Load the configuration file, writing a default one when it does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.api.api_key = api_key;
        }
        if let Some(api_base) = lookup(ENV_API_BASE) {
            self.api.api_base = api_base;
        }
        if let Some(model) = lookup(ENV_CHAT_MODEL) {
            self.api.chat_model = model;
        }
        if let Some(model) = lookup(ENV_REASONER_MODEL) {
            self.api.reasoner_model = model;
        }
        if let Some(max_tokens) = lookup(ENV_MAX_TOKENS) {
            self.api.max_tokens = max_tokens.trim().parse()
                .with_context(|| format!("{} must be a positive integer, got '{}'", ENV_MAX_TOKENS, max_tokens))?;
        }

        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api.api_base)
            .with_context(|| format!("Invalid API base URL: {}", self.api.api_base))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(anyhow!("API base URL must use http or https: {}", self.api.api_base));
        }

        if self.api.max_tokens == 0 {
            return Err(anyhow!("max_tokens must be greater than zero"));
        }

        if self.api.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than zero"));
        }

        // Without a key every unit falls back to its source text
        if self.api.api_key.is_empty() {
            warn!("No API key configured ({}), model calls will fail", ENV_API_KEY);
        }

        Ok(())
    }

    /// Resolve the glossary file: explicit override, then config, then the per-user data dir
    pub fn resolve_glossary_path(&self, cli_override: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_override {
            return path.to_path_buf();
        }
        if let Some(path) = &self.glossary_path {
            return path.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join("mdtranslate"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("terminology.csv")
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig::default(),
            glossary_path: None,
            log_level: LogLevel::default(),
            log_file: default_log_file(),
        }
    }
}
