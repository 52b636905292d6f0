//! Application configuration for PolicyTracker.
//!
//! User config lives at `~/.policytracker/policytracker.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PolicyTrackerError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "policytracker.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".policytracker";

// ---------------------------------------------------------------------------
// Config structs (matching policytracker.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Congress.gov API settings.
    #[serde(default)]
    pub congress: CongressConfig,

    /// Gemini generation service settings.
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Database file path.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Maximum bills fetched per ingest run.
    #[serde(default = "default_batch_limit")]
    pub batch_limit: u32,

    /// Congressional session to ingest.
    #[serde(default = "default_session")]
    pub session: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            batch_limit: default_batch_limit(),
            session: default_session(),
        }
    }
}

fn default_db_path() -> String {
    "~/.policytracker/policytracker.db".into()
}
fn default_batch_limit() -> u32 {
    50
}
fn default_session() -> u32 {
    118
}

/// `[congress]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CongressConfig {
    /// Base URL of the Congress.gov API.
    #[serde(default = "default_congress_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_congress_key_env")]
    pub api_key_env: String,
}

impl Default for CongressConfig {
    fn default() -> Self {
        Self {
            base_url: default_congress_base_url(),
            api_key_env: default_congress_key_env(),
        }
    }
}

fn default_congress_base_url() -> String {
    "https://api.congress.gov".into()
}
fn default_congress_key_env() -> String {
    "CONGRESS_API_KEY".into()
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL of the generative-language API.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model ID used for summary and analysis generation.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_gemini_key_env")]
    pub api_key_env: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            api_key_env: default_gemini_key_env(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_gemini_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_gemini_key_env() -> String {
    "GOOGLE_AI_KEY".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.policytracker/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PolicyTrackerError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.policytracker/policytracker.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PolicyTrackerError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        PolicyTrackerError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PolicyTrackerError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PolicyTrackerError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PolicyTrackerError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read an API key out of the env var named by `var_name`.
pub fn api_key_from_env(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(PolicyTrackerError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}

/// Expand a leading `~/` in a configured path against the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("db_path"));
        assert!(toml_str.contains("CONGRESS_API_KEY"));
        assert!(toml_str.contains("GOOGLE_AI_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.batch_limit, 50);
        assert_eq!(parsed.defaults.session, 118);
        assert_eq!(parsed.gemini.model, "gemini-2.5-flash");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
batch_limit = 10

[gemini]
model = "gemini-2.0-flash"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.batch_limit, 10);
        assert_eq!(config.defaults.session, 118);
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.congress.base_url, "https://api.congress.gov");
    }

    #[test]
    fn api_key_validation() {
        // Use a unique env var name to avoid interfering with other tests
        let result = api_key_from_env("PT_TEST_NONEXISTENT_KEY_12345");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }

    #[test]
    fn expand_path_passthrough() {
        assert_eq!(expand_path("/tmp/x.db"), PathBuf::from("/tmp/x.db"));
    }
}
