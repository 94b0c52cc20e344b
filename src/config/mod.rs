mod env_manager;

use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::error::{AnalysisError, Result};
use std::fs;

pub use env_manager::{get_env_value, ApiKeys};

/// Default GitHub REST API base
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Extensions skipped during the tree walk unless overridden
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[
    // Images
    "jpg", "jpeg", "png", "gif", "bmp", "ico", "webp", "tiff", "psd",
    // Video and audio
    "mp4", "mov", "avi", "mkv", "webm", "mp3", "wav", "flac", "ogg",
    // Archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "jar",
    // Binaries, fonts and documents
    "exe", "dll", "so", "dylib", "bin", "class", "o", "a", "pyc",
    "woff", "woff2", "ttf", "otf", "eot", "pdf",
];

/// Main configuration struct for the application
///
/// Holds processing limits and server settings. Secrets are not stored
/// here: API keys and tokens are read from the environment each time an
/// analysis starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tree walk limits and filters
    pub walker: WalkerConfig,
    /// Content retrieval settings
    pub fetch: FetchConfig,
    /// Chunking and prompt budget settings
    pub chunking: ChunkConfig,
    /// Language model selection
    pub model: ModelConfig,
    /// Web front end and webhook settings
    pub server: ServerConfig,
}

/// Filters and bounds applied while listing repository files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkerConfig {
    /// Largest file (in bytes) that is still considered for review
    pub max_file_size: u64,
    /// File extensions (without the dot) that are never reviewed
    pub excluded_extensions: Vec<String>,
    /// Deepest directory level that is listed; root is depth 0
    pub max_depth: usize,
    /// Upper bound on the number of eligible files collected
    pub max_files: usize,
}

/// Settings for talking to the hosting API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum number of file bodies fetched at the same time
    pub max_concurrent_fetches: usize,
    /// Overall timeout applied to every network call
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    /// Base URL of the GitHub REST API
    pub api_base: String,
}

/// Settings that bound the size of each model prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Number of files submitted together in one prompt
    pub chunk_size: usize,
    /// Number of characters of each file included in a chunk prompt
    pub content_preview_chars: usize,
}

/// Supported text-generation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// OpenAI chat completions
    OpenAi,
    /// Google Gemini generateContent
    Gemini,
}

/// Language model selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Which backend to call
    pub provider: ModelProvider,
    /// Model identifier; provider default when absent
    pub model: Option<String>,
    /// Alternative API base, e.g. a proxy or compatible server
    pub api_base: Option<String>,
}

/// How concurrent analyses of the same repository interact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyPolicy {
    /// Runs proceed independently; the last one to finish wins the slot
    Independent,
    /// At most one run per repository is in flight; later requests wait
    Serialized,
}

/// Web front end and webhook settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind: String,
    /// Branches whose pushes trigger an analysis
    pub webhook_branches: Vec<String>,
    /// Policy for concurrent analyses of the same repository
    pub concurrency_policy: ConcurrencyPolicy,
}

impl Config {
    /// Loads configuration from the default config file location
    ///
    /// If the config file doesn't exist, returns the default configuration.
    /// The config file is expected to be in TOML format.
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AnalysisError::Configuration("Could not find config directory".into()))?;
        let config_path = config_dir.join("gitagent").join("config.toml");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::from_file(&config_path)
    }

    /// Reads a TOML configuration file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| AnalysisError::Configuration(format!("Failed to read config file {}: {}", path.display(), e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AnalysisError::Configuration(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies non-secret overrides from the process environment
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(base) = get_env_value("GITHUB_API_BASE_URL") {
            self.fetch.api_base = base;
        }
        if let Some(provider) = get_env_value("GITAGENT_MODEL_PROVIDER") {
            match provider.to_lowercase().as_str() {
                "gemini" => self.model.provider = ModelProvider::Gemini,
                "openai" => self.model.provider = ModelProvider::OpenAi,
                other => log::warn!("Unknown model provider '{}', keeping {:?}", other, self.model.provider),
            }
        }
        let model_var = match self.model.provider {
            ModelProvider::OpenAi => "OPENAI_MODEL",
            ModelProvider::Gemini => "GEMINI_MODEL",
        };
        if let Some(model) = get_env_value(model_var) {
            self.model.model = Some(model);
        }
        if let Some(base) = get_env_value("OPENAI_API_BASE") {
            if self.model.provider == ModelProvider::OpenAi {
                self.model.api_base = Some(base);
            }
        }
        if let Some(bind) = get_env_value("GITAGENT_BIND") {
            self.server.bind = bind;
        }
        self
    }

    /// Rejects values that would make the pipeline unusable
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(AnalysisError::Configuration("chunk_size must be at least 1".into()));
        }
        if self.fetch.max_concurrent_fetches == 0 {
            return Err(AnalysisError::Configuration("max_concurrent_fetches must be at least 1".into()));
        }
        if self.fetch.request_timeout.is_zero() {
            return Err(AnalysisError::Configuration("request_timeout must be positive".into()));
        }
        Ok(())
    }

    /// Returns true if the extension of `path` is in the excluded set
    pub fn is_excluded_file(&self, path: &str) -> bool {
        self.walker.is_excluded(path)
    }
}

impl WalkerConfig {
    /// Returns true if the extension of `path` is in the excluded set (case-insensitive)
    pub fn is_excluded(&self, path: &str) -> bool {
        let Some(extension) = Path::new(path).extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.excluded_extensions
            .iter()
            .any(|excluded| excluded.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }

    /// A file is eligible when it fits the size limit and its extension is not excluded
    pub fn is_eligible(&self, path: &str, size: u64) -> bool {
        size <= self.max_file_size && !self.is_excluded(path)
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100_000,
            excluded_extensions: DEFAULT_EXCLUDED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_depth: 32,
            max_files: 2000,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
            request_timeout: Duration::from_secs(60),
            api_base: GITHUB_API_BASE.to_string(),
        }
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 3,
            content_preview_chars: 1000,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::OpenAi,
            model: None,
            api_base: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            webhook_branches: vec!["main".to_string(), "master".to_string()],
            concurrency_policy: ConcurrencyPolicy::Independent,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            walker: WalkerConfig::default(),
            fetch: FetchConfig::default(),
            chunking: ChunkConfig::default(),
            model: ModelConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
