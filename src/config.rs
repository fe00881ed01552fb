use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{
    DEFAULT_API_KEY, DEFAULT_BLOB_EXTENSION, DEFAULT_BLOB_NAME, DEFAULT_MASKED_TYPES,
    DEFAULT_MIN_INTERVAL_SECS, REDACTION_TOKEN,
};
use crate::domain::EntityType;
use crate::error::{OptimizerError, Result};
use crate::pipeline::processing::anonymize::AnonymizerConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub anonymize: AnonymizeConfig,
    pub inference: InferenceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Static key expected in the `x-api-key` header
    pub api_key: String,
    /// Minimum seconds between accepted retrievals per key
    pub min_interval_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            min_interval_secs: DEFAULT_MIN_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub blob_dir: PathBuf,
    pub log_dir: PathBuf,
    pub blob_name: String,
    pub blob_extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            blob_dir: PathBuf::from("blob_storage"),
            log_dir: PathBuf::from("logs"),
            blob_name: DEFAULT_BLOB_NAME.to_string(),
            blob_extension: DEFAULT_BLOB_EXTENSION.to_string(),
        }
    }
}

impl StorageConfig {
    /// Re-root every relative directory under `base`
    pub fn rooted_at(mut self, base: &Path) -> Self {
        self.data_dir = base.join(&self.data_dir);
        self.blob_dir = base.join(&self.blob_dir);
        self.log_dir = base.join(&self.log_dir);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizeConfig {
    pub masked_types: Vec<String>,
    pub token: String,
}

impl Default for AnonymizeConfig {
    fn default() -> Self {
        Self {
            masked_types: DEFAULT_MASKED_TYPES.iter().map(|s| s.to_string()).collect(),
            token: REDACTION_TOKEN.to_string(),
        }
    }
}

impl AnonymizeConfig {
    pub fn to_anonymizer_config(&self) -> AnonymizerConfig {
        AnonymizerConfig {
            masked_types: self.masked_types.iter().map(|l| EntityType::parse(l)).collect(),
            token: self.token.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub classifier_url: Option<String>,
    pub sentiment_url: Option<String>,
    pub ner_url: Option<String>,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
    /// Fixed seed for the unrated refinement walk; random when unset
    pub seed: Option<u64>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            classifier_url: None,
            sentiment_url: None,
            ner_url: None,
            api_token: None,
            timeout_secs: 30,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for rolling diagnostic logs
    pub dir: PathBuf,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_prefix: "data_optimizer.log".to_string(),
        }
    }
}

impl Config {
    /// Load `config.toml` (if present) and apply environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                OptimizerError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
            })?;
            Self::from_toml(&content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| OptimizerError::Config(e.to_string()))
    }

    /// Apply `OPTIMIZER_*` overrides from the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPTIMIZER_API_KEY") {
            self.auth.api_key = key;
        }
        if let Some(port) = lookup("OPTIMIZER_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| OptimizerError::Config(format!("OPTIMIZER_PORT is not a port: {}", port)))?;
        }
        if let Some(dir) = lookup("OPTIMIZER_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("OPTIMIZER_CLASSIFIER_URL") {
            self.inference.classifier_url = Some(url);
        }
        if let Some(url) = lookup("OPTIMIZER_SENTIMENT_URL") {
            self.inference.sentiment_url = Some(url);
        }
        if let Some(url) = lookup("OPTIMIZER_NER_URL") {
            self.inference.ner_url = Some(url);
        }
        if let Some(token) = lookup("OPTIMIZER_INFERENCE_TOKEN") {
            self.inference.api_token = Some(token);
        }
        Ok(())
    }
}
