use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    #[error("Unauthorized API key")]
    Unauthorized,

    #[error("Too many requests, try later")]
    RateLimited,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl OptimizerError {
    /// Short machine-readable code used in logs and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            OptimizerError::MalformedInput(_) => "malformed_input",
            OptimizerError::Classification(_) => "classification",
            OptimizerError::StorageWrite(_) => "storage_write",
            OptimizerError::Unauthorized => "unauthorized",
            OptimizerError::RateLimited => "rate_limited",
            OptimizerError::NotFound(_) => "not_found",
            OptimizerError::Config(_) => "config",
        }
    }

    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        OptimizerError::StorageWrite(format!("{}: {}", context, err))
    }
}

impl From<std::io::Error> for OptimizerError {
    fn from(err: std::io::Error) -> Self {
        OptimizerError::StorageWrite(err.to_string())
    }
}

impl From<serde_json::Error> for OptimizerError {
    fn from(err: serde_json::Error) -> Self {
        OptimizerError::StorageWrite(format!("JSON serialization failed: {}", err))
    }
}

impl From<toml::de::Error> for OptimizerError {
    fn from(err: toml::de::Error) -> Self {
        OptimizerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
