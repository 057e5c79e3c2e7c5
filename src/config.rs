//! Configuration management for DocuFlow.
//!
//! Settings come from a YAML file (`config.yaml` by default) with environment
//! overrides layered on top. The only required value is the Mistral API key,
//! which can be given as `mistral.token` or through `MISTRAL_API_KEY`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rate_limit::get_delay_from_env;
use crate::services::postprocess::PostProcessor;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILENAME: &str = "config.yaml";

/// Environment variable that overrides `mistral.token`.
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Placeholder token written by `docuflow init`.
pub const SAMPLE_TOKEN: &str = "your_mistral_api_key_here";

/// Environment variable pointing at an alternate config file.
pub const CONFIG_PATH_ENV: &str = "DOCUFLOW_CONFIG";

/// Environment variable overriding the delay before each OCR request.
pub const DELAY_ENV: &str = "MISTRAL_DELAY_MS";

pub const DEFAULT_MODEL: &str = "mistral-ocr-latest";
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_PORT: u16 = 7860;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown post-processor '{0}' (expected clean_thai_text or normalize_numbers)")]
    UnknownPostProcessor(String),

    #[error(
        "Mistral API key is required. Set `mistral.token` in config.yaml or the MISTRAL_API_KEY environment variable"
    )]
    MissingApiKey,
}

/// `mistral:` section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MistralConfig {
    /// API key. Overridden by `MISTRAL_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// OCR model name.
    pub model: String,
    /// API base URL (without trailing `/ocr`).
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Ask the API to return embedded page images.
    pub include_image_base64: bool,
    /// Delay before each request in milliseconds.
    pub request_delay_ms: u64,
}

impl Default for MistralConfig {
    fn default() -> Self {
        Self {
            token: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 120,
            include_image_base64: false,
            request_delay_ms: 0,
        }
    }
}

/// `server:` section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum request body size in megabytes.
    pub max_upload_mb: usize,
    /// Number of batch results kept in memory for download.
    pub max_batches: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_upload_mb: 20,
            max_batches: 32,
        }
    }
}

/// `processing:` section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Maximum OCR requests in flight at once.
    pub concurrency: usize,
    /// Post-processors applied to OCR text, in order.
    pub post_processors: Vec<String>,
    /// Characters of text shown in batch previews.
    pub preview_chars: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            post_processors: vec![
                "clean_thai_text".to_string(),
                "normalize_numbers".to_string(),
            ],
            preview_chars: 200,
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mistral: MistralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    /// Raw YAML tree, kept for dotted-path lookups.
    #[serde(skip)]
    pub raw: Option<serde_yaml::Value>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Resolve which config file to read.
    ///
    /// Priority: explicit path > `DOCUFLOW_CONFIG` > `./config.yaml`.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return expand_path(&path.to_string_lossy());
        }
        if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
            if !env_path.trim().is_empty() {
                return expand_path(&env_path);
            }
        }
        PathBuf::from(DEFAULT_CONFIG_FILENAME)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.source_path = Some(path.to_path_buf());
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file parses as null; treat it as an empty mapping.
        let raw: serde_yaml::Value = serde_yaml::from_str(contents)?;
        let raw = if raw.is_null() {
            serde_yaml::Value::Mapping(Default::default())
        } else {
            raw
        };
        let mut config: Config = serde_yaml::from_value(raw.clone())?;
        config.raw = Some(raw);
        Ok(config)
    }

    /// Look up a value by dotted key path (e.g. `mistral.token`).
    ///
    /// Returns `None` if any segment is missing, a non-mapping is traversed,
    /// or the final value is null.
    pub fn get_value(&self, key: &str) -> Option<&serde_yaml::Value> {
        let mut value = self.raw.as_ref()?;
        for segment in key.split('.') {
            value = value.as_mapping()?.get(segment)?;
        }
        if value.is_null() {
            None
        } else {
            Some(value)
        }
    }

    /// Sample configuration shown when no config file exists.
    pub fn sample() -> &'static str {
        r#"mistral:
  token: "your_mistral_api_key_here"
  # model: mistral-ocr-latest

server:
  host: 0.0.0.0
  port: 7860

processing:
  concurrency: 4
  post_processors:
    - clean_thai_text
    - normalize_numbers
"#
    }

    /// Build effective settings with environment overrides applied.
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        let post_processors = self
            .processing
            .post_processors
            .iter()
            .map(|name| {
                PostProcessor::from_name(name)
                    .ok_or_else(|| ConfigError::UnknownPostProcessor(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut mistral = self.mistral;
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                mistral.token = Some(key);
            }
        }
        mistral.request_delay_ms =
            get_delay_from_env(DELAY_ENV, mistral.request_delay_ms).as_millis() as u64;

        let mut processing = self.processing;
        processing.concurrency = processing.concurrency.max(1);

        Ok(Settings {
            mistral,
            server: self.server,
            processing,
            post_processors,
            config_path: self.source_path,
        })
    }
}

/// Expand `~` in a user-supplied path.
fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Application settings after overrides.
#[derive(Debug, Clone)]
pub struct Settings {
    pub mistral: MistralConfig,
    pub server: ServerConfig,
    pub processing: ProcessingConfig,
    pub post_processors: Vec<PostProcessor>,
    /// File the settings were loaded from, if any.
    pub config_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mistral: MistralConfig::default(),
            server: ServerConfig::default(),
            processing: ProcessingConfig::default(),
            post_processors: vec![PostProcessor::CleanThaiText, PostProcessor::NormalizeNumbers],
            config_path: None,
        }
    }
}

impl Settings {
    /// The API key, if one is configured and is not blank or the sample placeholder.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.mistral
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != SAMPLE_TOKEN)
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Token suitable for display: first four characters then a mask.
    pub fn redacted_token(&self) -> String {
        match self.api_key() {
            Ok(token) => {
                let prefix: String = token.chars().take(4).collect();
                format!("{}****", prefix)
            }
            Err(_) => "(not set)".to_string(),
        }
    }
}

/// Options controlling how settings are loaded.
#[derive(Debug, Default, Clone)]
pub struct LoadOptions {
    /// Explicit config file path (overrides discovery).
    pub config_path: Option<PathBuf>,
    /// Fail when the config file is missing instead of using defaults.
    pub require_file: bool,
}

/// Load settings from the config file with environment overrides.
///
/// A missing file is not an error unless `require_file` is set; defaults plus
/// environment variables are used instead.
pub fn load_settings_with_options(options: &LoadOptions) -> Result<Settings, ConfigError> {
    let path = Config::resolve_path(options.config_path.as_deref());
    let config = match Config::load_from_path(&path) {
        Ok(config) => config,
        Err(ConfigError::NotFound(missing)) if !options.require_file => {
            tracing::debug!("No config file at {}, using defaults", missing.display());
            Config::default()
        }
        Err(e) => return Err(e),
    };
    config.into_settings()
}
