//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.math-agent/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MathAgentConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub model: Option<String>,
    pub max_agentic_rounds: Option<u8>,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system_prompt: Option<String>,
    pub system_prompt_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OpenRouterConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WebConfig {
    pub bind: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_MODEL: &str = "meta-llama/llama-3-8b-instruct";
pub const DEFAULT_MAX_AGENTIC_ROUNDS: u8 = 10;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_WEB_BIND: &str = "127.0.0.1:8501";
pub const DEFAULT_SYSTEM_PROMPT_FILE: &str = "system_prompt.txt";

const CONFIG_DIR: &str = ".math-agent";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a patient math tutor helping secondary school \
    students prepare for their exams. You have tools for arithmetic, algebra, geometry, \
    trigonometry, logarithms, statistics, sequences, percentages and ratios. \
    ALWAYS use a tool for any calculation instead of computing it yourself. \
    Explain each step of the solution clearly, state the formula you are using, \
    and finish with the final answer. If a tool reports an error, explain what went wrong \
    and how the question could be rephrased.";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub model_name: String,
    pub max_agentic_rounds: u8,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub system_prompt: String,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub web_bind: String,
}

impl ResolvedConfig {
    /// The OpenRouter key, or `MissingApiKey` when none was configured.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.openrouter_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}

/// Values given on the command line; `None` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub bind: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    MissingApiKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::MissingApiKey => write!(
                f,
                "OPENROUTER_API_KEY not found. Set it in your environment, a .env file, \
                 or [openrouter] api_key in ~/{CONFIG_DIR}/config.toml"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.math-agent`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_DIR))
}

/// Returns the path to `~/.math-agent/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.math-agent/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `MathAgentConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<MathAgentConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(MathAgentConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<MathAgentConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(MathAgentConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: MathAgentConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG_CONTENT: &str = r#"# Math Agent Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# model = "meta-llama/llama-3-8b-instruct"   # Or set MATH_AGENT_MODEL
# max_agentic_rounds = 10
# max_output_tokens = 4096
# temperature = 0.0
# system_prompt = "You are a patient math tutor."
# system_prompt_file = "system_prompt.txt"   # Path relative to ~/.math-agent/

# [openrouter]
# api_key = "sk-or-..."                      # Or set OPENROUTER_API_KEY
# base_url = "https://openrouter.ai/api/v1"  # Or set OPENROUTER_BASE_URL

# [web]
# bind = "127.0.0.1:8501"
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG_CONTENT) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &MathAgentConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with(config, cli, config_dir().as_deref(), |key| std::env::var(key).ok())
}

/// [`resolve`] with an explicit config directory and environment lookup.
pub fn resolve_with(
    config: &MathAgentConfig,
    cli: &CliOverrides,
    config_dir: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Model: CLI → env → config → default
    let model_name = cli
        .model
        .clone()
        .or_else(|| env("MATH_AGENT_MODEL"))
        .or_else(|| config.general.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    // OpenRouter API key: env → config
    let openrouter_api_key = env("OPENROUTER_API_KEY").or_else(|| config.openrouter.api_key.clone());

    // OpenRouter base URL: env → config → default
    let openrouter_base_url = env("OPENROUTER_BASE_URL")
        .or_else(|| config.openrouter.base_url.clone())
        .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string());

    // Web bind address: CLI → config → default
    let web_bind = cli
        .bind
        .clone()
        .or_else(|| config.web.bind.clone())
        .unwrap_or_else(|| DEFAULT_WEB_BIND.to_string());

    ResolvedConfig {
        model_name,
        max_agentic_rounds: config
            .general
            .max_agentic_rounds
            .unwrap_or(DEFAULT_MAX_AGENTIC_ROUNDS),
        max_output_tokens: config
            .general
            .max_output_tokens
            .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
        temperature: config.general.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        system_prompt: resolve_system_prompt(config, config_dir),
        openrouter_api_key,
        openrouter_base_url,
        web_bind,
    }
}

/// Resolves the system prompt: inline wins over file, both win over default.
fn resolve_system_prompt(config: &MathAgentConfig, config_dir: Option<&Path>) -> String {
    if let Some(ref prompt) = config.general.system_prompt {
        return prompt.clone();
    }

    let file = config
        .general
        .system_prompt_file
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT_FILE);

    if let Some(dir) = config_dir {
        let prompt_path = dir.join(file);
        match fs::read_to_string(&prompt_path) {
            Ok(contents) => {
                let trimmed = contents.trim().to_string();
                if !trimmed.is_empty() {
                    info!("Loaded system prompt from {}", prompt_path.display());
                    return trimmed;
                }
                warn!("System prompt file is empty: {}", prompt_path.display());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No system prompt file at {}", prompt_path.display());
            }
            Err(e) => {
                warn!(
                    "Failed to read system prompt file {}: {}",
                    prompt_path.display(),
                    e
                );
            }
        }
    }

    DEFAULT_SYSTEM_PROMPT.to_string()
}
