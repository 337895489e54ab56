//! Configuration loading and config file resolution
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. `REVFUSE_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/revfuse/config.toml`)
//! 4. Built-in defaults (no file)
//!
//! Every section and field is optional; a partial TOML file is merged over
//! the built-in defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "REVFUSE_CONFIG";

/// Default OpenAI-compatible endpoint (Groq)
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default chat model
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Pipeline defaults (overridable per invocation)
    pub pipeline: PipelineSettings,

    /// LLM findings source settings
    pub llm: LlmConfig,

    /// External static analysis tool
    pub static_tool: StaticToolConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Pipeline defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Run the LLM phase when the source is available
    pub use_llm: bool,

    /// Time budget for the LLM phase in seconds
    pub max_llm_time_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            use_llm: true,
            max_llm_time_secs: 30,
        }
    }
}

/// LLM source settings (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key (environment variables take precedence)
    pub api_key: Option<String>,

    /// Base URL; `/chat/completions` is appended
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on response tokens
    pub max_tokens: u32,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,

    /// Number of static findings passed to the model as hints
    pub context_issue_limit: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: 0.1,
            max_tokens: 2000,
            request_timeout_secs: 60,
            context_issue_limit: 3,
        }
    }
}

/// External static analysis command
///
/// The program receives the code on stdin and prints a JSON report on stdout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticToolConfig {
    /// Program to execute (None = not configured)
    pub program: Option<String>,

    /// Arguments passed to the program
    pub args: Vec<String>,
}

impl TomlConfig {
    /// Copy of this config with secrets replaced, for display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.llm.api_key.is_some() {
            copy.llm.api_key = Some("********".to_string());
        }
        copy
    }
}

/// Resolve which config file to load, if any
///
/// An explicit path (CLI or environment) is returned even when missing so the
/// caller can report it; the platform default is only returned if it exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    let default_path = default_config_path()?;
    if default_path.exists() {
        Some(default_path)
    } else {
        debug!("No config file at {}", default_path.display());
        None
    }
}

/// Platform config file location (`~/.config/revfuse/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("revfuse").join("config.toml"))
}

/// Load and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Read config {} failed: {}", path.display(), e))
    })?;
    let config = toml::from_str(&content)?;
    info!("Configuration loaded from {}", path.display());
    Ok(config)
}

/// Resolve and load configuration, falling back to built-in defaults
///
/// An explicitly requested file that cannot be read is an error; the absence
/// of any config file is not.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) => load_toml_config(&path),
        None => {
            warn!("No config file found, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}
