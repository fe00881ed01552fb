use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::app::ports::ArtifactStorePort;
use crate::error::{OptimizerError, Result};
use crate::infra::to_pretty_json;

/// File-based implementation of ArtifactStorePort.
/// Each artifact is one pretty-printed JSON file under `data_dir`, overwritten on write.
pub struct FsArtifactStore {
    data_dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }
}

#[async_trait]
impl ArtifactStorePort for FsArtifactStore {
    async fn write_json(&self, name: &str, value: &Value) -> Result<PathBuf> {
        let path = self.path_for(name);
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| OptimizerError::storage(&format!("create {}", self.data_dir.display()), e))?;
        let bytes = to_pretty_json(value)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| OptimizerError::storage(&format!("write {}", path.display()), e))?;
        debug!("wrote artifact to {:?}", path);
        Ok(path)
    }

    async fn read_json(&self, name: &str) -> Result<Option<Value>> {
        let path = self.path_for(name);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(OptimizerError::storage(&format!("read {}", path.display()), e)),
        };
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| OptimizerError::storage(&format!("parse {}", path.display()), e))?;
        Ok(Some(value))
    }
}
