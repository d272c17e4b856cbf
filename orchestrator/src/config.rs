//! Configuration loading (.studio.toml)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::dispatch::ModelStrategy;
use crate::error::ConfigError;
use crate::llm::ThinkingMode;
use crate::writers_room::DEFAULT_WRITERS_MODEL;

pub const CONFIG_FILE_NAME: &str = ".studio.toml";

/// Find a config file by walking up the directory tree, then checking global config.
///
/// Search order:
/// 1. Current directory and parent directories (walking up to root)
/// 2. Global config at ~/.config/studio/
fn find_config_file(filename: &str) -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let candidate = current.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("studio").join(filename);
        if global_path.exists() {
            return Some(global_path);
        }
    }

    None
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudioConfig {
    #[serde(default)]
    pub ollama: OllamaSection,
    #[serde(default)]
    pub gateway: GatewaySection,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub consensus: ConsensusSection,
    #[serde(default)]
    pub writers_room: WritersRoomSection,
}

/// Local Ollama server
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaSection {
    #[serde(default = "default_ollama_url")]
    pub url: String,
    /// Local model served for the logical `ollama` id
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

/// OpenAI-compatible gateway for hosted models
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySection {
    #[serde(default = "default_gateway_url")]
    pub base_url: String,
    /// Environment variable holding the bearer token
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Logical model id -> remote model name
    #[serde(default)]
    pub models: HashMap<String, String>,
    #[serde(default = "default_true")]
    pub send_reasoning_effort: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Bound on a single provider round-trip; 0 disables the bound
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,
    #[serde(default = "default_strategy")]
    pub default_strategy: String,
    /// Always report "Completed Successfully" regardless of step failures
    #[serde(default)]
    pub legacy_status: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsensusSection {
    #[serde(default = "default_consensus_models")]
    pub models: Vec<String>,
    #[serde(default = "default_consensus_thinking")]
    pub thinking_mode: ThinkingMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WritersRoomSection {
    /// Model every specialist in a session talks to
    #[serde(default = "default_writers_model")]
    pub model: String,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "qwen3:14b".to_string()
}

fn default_gateway_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_api_key_env() -> String {
    "STUDIO_API_KEY".to_string()
}

fn default_true() -> bool {
    true
}

fn default_provider_timeout() -> u64 {
    300
}

fn default_strategy() -> String {
    "auto".to_string()
}

pub fn default_consensus_models() -> Vec<String> {
    vec![
        "gemini-pro".to_string(),
        "gpt-5".to_string(),
        "claude-haiku".to_string(),
    ]
}

fn default_consensus_thinking() -> ThinkingMode {
    ThinkingMode::High
}

fn default_writers_model() -> String {
    DEFAULT_WRITERS_MODEL.to_string()
}

impl Default for OllamaSection {
    fn default() -> Self {
        Self {
            url: default_ollama_url(),
            model: default_ollama_model(),
        }
    }
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            base_url: default_gateway_url(),
            api_key_env: default_api_key_env(),
            models: HashMap::new(),
            send_reasoning_effort: true,
        }
    }
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            provider_timeout_secs: default_provider_timeout(),
            default_strategy: default_strategy(),
            legacy_status: false,
        }
    }
}

impl Default for ConsensusSection {
    fn default() -> Self {
        Self {
            models: default_consensus_models(),
            thinking_mode: default_consensus_thinking(),
        }
    }
}

impl Default for WritersRoomSection {
    fn default() -> Self {
        Self {
            model: default_writers_model(),
        }
    }
}

impl EngineSection {
    pub fn provider_timeout(&self) -> Option<Duration> {
        (self.provider_timeout_secs > 0).then(|| Duration::from_secs(self.provider_timeout_secs))
    }

    pub fn strategy(&self) -> ModelStrategy {
        ModelStrategy::from_name_lenient(&self.default_strategy)
    }
}

impl StudioConfig {
    /// Load from the first .studio.toml found, or defaults when none exists
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(config_path) = find_config_file(CONFIG_FILE_NAME) {
            tracing::debug!("Loading studio config from: {}", config_path.display());
            return Self::load_from_path(&config_path);
        }

        tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
        Ok(Self::default())
    }

    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = StudioConfig::default();
        assert_eq!(config.ollama.url, "http://localhost:11434");
        assert_eq!(config.engine.provider_timeout(), Some(Duration::from_secs(300)));
        assert_eq!(config.engine.strategy(), ModelStrategy::Auto);
        assert!(!config.engine.legacy_status);
        assert_eq!(config.consensus.models, vec!["gemini-pro", "gpt-5", "claude-haiku"]);
        assert_eq!(config.consensus.thinking_mode, ThinkingMode::High);
        assert_eq!(config.writers_room.model, "ollama");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[ollama]
model = "llama3.1:8b"

[gateway]
api_key_env = "MY_KEY"
[gateway.models]
gemini-pro = "google/gemini-2.5-pro"

[engine]
provider_timeout_secs = 0
default_strategy = "balanced"
legacy_status = true

[consensus]
models = ["gemini-flash"]
thinking_mode = "medium"

[writers_room]
model = "claude-haiku"
"#
        )
        .unwrap();

        let config = StudioConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.ollama.url, "http://localhost:11434");
        assert_eq!(config.ollama.model, "llama3.1:8b");
        assert_eq!(config.gateway.api_key_env, "MY_KEY");
        assert_eq!(
            config.gateway.models.get("gemini-pro").map(String::as_str),
            Some("google/gemini-2.5-pro")
        );
        assert_eq!(config.engine.provider_timeout(), None);
        assert_eq!(config.engine.strategy(), ModelStrategy::Balanced);
        assert!(config.engine.legacy_status);
        assert_eq!(config.consensus.models, vec!["gemini-flash"]);
        assert_eq!(config.consensus.thinking_mode, ThinkingMode::Medium);
        assert_eq!(config.writers_room.model, "claude-haiku");
    }

    #[test]
    fn test_parse_error_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine\nbroken").unwrap();

        let err = StudioConfig::load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
