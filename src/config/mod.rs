use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Transcript retrieval settings
    #[serde(default)]
    pub transcript: TranscriptConfig,

    /// Chunking and model settings
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Optional translation before summarizing
    #[serde(default)]
    pub translation: TranslationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Caption language requested from YouTube
    pub language: String,

    /// Timeout for each YouTube request
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Words per chunk sent to the model
    pub chunk_size: usize,

    /// Lower bound on the model's output length
    pub min_length: u32,

    /// Word budget used when a request doesn't give one
    pub default_max_words: u32,

    /// Summarization model settings
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Inference API base URL
    pub endpoint: String,

    /// Model identifier on the inference API
    pub model_id: String,

    /// API token (HF_API_TOKEN or --hf-token take precedence)
    pub api_token: Option<String>,

    /// Where the model artifact is cached (defaults to the user cache dir)
    pub cache_path: Option<PathBuf>,

    /// Timeout for each inference call
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslationConfig {
    /// Translate transcripts before summarizing
    pub enabled: bool,

    /// Target language code
    pub target_language: String,

    /// Translation endpoint
    pub endpoint: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 300,
            min_length: 40,
            default_max_words: 100,
            model: ModelConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            model_id: "sshleifer/distilbart-cnn-12-6".to_string(),
            api_token: None,
            cache_path: None,
            request_timeout_secs: 120,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            target_language: "en".to_string(),
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            transcript: TranscriptConfig::default(),
            summarizer: SummarizerConfig::default(),
            translation: TranslationConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        Self::load_from(&config_path).await
    }

    /// Load configuration from a specific path, writing defaults there if it doesn't exist
    pub async fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs_err::read_to_string(config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path).await?;
            Ok(config)
        }
    }

    /// Save configuration to a file
    pub async fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("yt-summarizer").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.summarizer.chunk_size == 0 {
            anyhow::bail!("summarizer.chunk_size must be greater than zero");
        }

        if self.summarizer.default_max_words == 0 {
            anyhow::bail!("summarizer.default_max_words must be greater than zero");
        }

        if self.summarizer.model.model_id.trim().is_empty() {
            anyhow::bail!("summarizer.model.model_id must be configured");
        }

        url::Url::parse(&self.summarizer.model.endpoint)
            .with_context(|| format!("Invalid model endpoint: {}", self.summarizer.model.endpoint))?;

        Ok(())
    }

    /// Prefer an explicitly supplied token over the one in the file
    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.summarizer.model.api_token = Some(token);
        }
        self
    }

    /// Resolved location of the cached model artifact
    pub fn model_cache_path(&self) -> PathBuf {
        self.summarizer.model.cache_path.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join("yt-summarizer")
                .join("model.json")
        })
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Server: {}:{}", self.server.host, self.server.port);
        println!("  Transcript Language: {}", self.transcript.language);
        println!("  Chunk Size: {} words", self.summarizer.chunk_size);
        println!("  Min Model Output: {}", self.summarizer.min_length);
        println!("  Default Summary Length: {} words", self.summarizer.default_max_words);
        println!("  Model: {}", self.summarizer.model.model_id);
        println!("  Model Endpoint: {}", self.summarizer.model.endpoint);
        println!(
            "  API Token: {}",
            if self.summarizer.model.api_token.is_some() { "set" } else { "not set" }
        );
        println!("  Model Cache: {}", self.model_cache_path().display());
        println!(
            "  Translation: {}",
            if self.translation.enabled {
                format!("enabled (-> {})", self.translation.target_language)
            } else {
                "disabled".to_string()
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_config_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config::load_from(&path).await.unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(config.summarizer.chunk_size, 300);
        assert_eq!(config.summarizer.min_length, 40);
        assert_eq!(config.summarizer.default_max_words, 100);
        assert_eq!(config.transcript.language, "en");
    }

    #[tokio::test]
    async fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(&path, "server:\n  host: 0.0.0.0\n  port: 8080\n").unwrap();

        let config = Config::load_from(&path).await.unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.summarizer, SummarizerConfig::default());
    }

    #[tokio::test]
    async fn test_zero_chunk_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut config = Config::default();
        config.summarizer.chunk_size = 0;
        config.save_to(&path).await.unwrap();

        let err = Config::load_from(&path).await.unwrap_err();
        assert!(err.to_string().contains("chunk_size"));
    }

    #[test]
    fn test_with_api_token_overrides_file_value() {
        let mut config = Config::default();
        config.summarizer.model.api_token = Some("from-file".to_string());

        let config = config.with_api_token(Some("from-env".to_string()));
        assert_eq!(config.summarizer.model.api_token.as_deref(), Some("from-env"));

        let config = config.with_api_token(Some("  ".to_string()));
        assert_eq!(config.summarizer.model.api_token.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_model_cache_path_prefers_configured_path() {
        let mut config = Config::default();
        config.summarizer.model.cache_path = Some(PathBuf::from("/srv/model.json"));
        assert_eq!(config.model_cache_path(), PathBuf::from("/srv/model.json"));
    }
}
