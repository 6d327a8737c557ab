use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use docchat_core::chunk::{DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};
use docchat_core::{ChunkConfig, DEFAULT_TOP_K};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub document: DocumentConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_overlap() -> usize {
    DEFAULT_OVERLAP
}

impl ChunkingConfig {
    /// Validated chunker parameters for the retrieval core.
    pub fn to_chunk_config(&self) -> Result<ChunkConfig> {
        ChunkConfig::new(self.chunk_size, self.overlap).context("Invalid [chunking] section")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// Settings for the OpenAI-compatible chat completions endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}
fn default_model() -> String {
    "llama-3.1-8b-instant".to_string()
}
fn default_temperature() -> f64 {
    0.2
}
fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
            api_url: default_api_url(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

fn default_token_env() -> String {
    "TELEGRAM_BOT_TOKEN".to_string()
}
fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}
fn default_poll_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Default configuration for a single document path.
    pub fn minimal(document: impl Into<PathBuf>) -> Self {
        Self {
            document: DocumentConfig {
                path: document.into(),
            },
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            llm: LlmConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }

    /// Check cross-field constraints. Called by [`load_config`].
    pub fn validate(&self) -> Result<()> {
        self.chunking.to_chunk_config()?;

        if self.retrieval.top_k < 1 {
            anyhow::bail!("retrieval.top_k must be >= 1");
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            anyhow::bail!("llm.temperature must be in [0.0, 2.0]");
        }

        if self.llm.base_url.trim().is_empty() {
            anyhow::bail!("llm.base_url must not be empty");
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_core::RetrievalError;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: Config = toml::from_str("[document]\npath = \"documento.pdf\"\n").unwrap();
        config.validate().unwrap();
        assert_eq!(config.document.path, PathBuf::from("documento.pdf"));
        assert_eq!(config.chunking.chunk_size, 800);
        assert_eq!(config.chunking.overlap, 200);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert!((config.llm.temperature - 0.2).abs() < 1e-9);
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.telegram.token_env, "TELEGRAM_BOT_TOKEN");
    }

    #[test]
    fn test_overlap_must_be_less_than_chunk_size() {
        let config: Config = toml::from_str(
            "[document]\npath = \"d.txt\"\n[chunking]\nchunk_size = 100\noverlap = 100\n",
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RetrievalError>(),
            Some(RetrievalError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_top_k_must_be_positive() {
        let mut config = Config::minimal("d.txt");
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_minimal_config_is_valid() {
        Config::minimal("documento.pdf").validate().unwrap();
    }

    #[test]
    fn test_load_config_validates() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("docchat.toml");
        std::fs::write(
            &path,
            "[document]\npath = \"d.txt\"\n[chunking]\nchunk_size = 50\noverlap = 60\n",
        )
        .unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid configuration"), "{:#}", err);
    }

    #[test]
    fn test_missing_document_section_is_rejected() {
        assert!(toml::from_str::<Config>("[retrieval]\ntop_k = 2\n").is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("docchat.toml");
        std::fs::write(
            &path,
            "[document]\npath = \"manual.txt\"\n\n[retrieval]\ntop_k = 2\n\n[llm]\nmodel = \"other\"\n",
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.retrieval.top_k, 2);
        assert_eq!(config.llm.model, "other");
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai/v1");

        assert!(load_config(&tmp.path().join("missing.toml")).is_err());
    }
}
