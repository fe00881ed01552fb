use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use crate::app::ports::BlobStorePort;
use crate::domain::Record;
use crate::error::{OptimizerError, Result};
use crate::infra::to_pretty_json;
use crate::pipeline::storage::{stamp_stored_at, utc_stamp};

/// Simulated blob storage: one `<name>.<extension>` file per logical name, no versioning
pub struct FsBlobStore {
    blob_dir: PathBuf,
    extension: String,
}

impl FsBlobStore {
    pub fn new(blob_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            blob_dir: blob_dir.into(),
            extension: extension.into(),
        }
    }

    pub fn blob_path(&self, name: &str) -> PathBuf {
        self.blob_dir.join(format!("{}.{}", name, self.extension))
    }
}

#[async_trait]
impl BlobStorePort for FsBlobStore {
    async fn put_batch(&self, name: &str, records: &[Record]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.blob_dir)
            .await
            .map_err(|e| OptimizerError::storage(&format!("create {}", self.blob_dir.display()), e))?;

        let stamped = stamp_stored_at(records, &utc_stamp())?;
        let path = self.blob_path(name);
        tokio::fs::write(&path, to_pretty_json(&stamped)?)
            .await
            .map_err(|e| OptimizerError::storage(&format!("write {}", path.display()), e))?;

        info!("Data saved to simulated blob storage: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_blob_gets_shared_stored_at_and_records_stay_clean() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().join("blob_storage"), "blob");
        let records = vec![Record::new("a"), Record::new("b")];

        let path = store.put_batch("refined_data", &records).await.unwrap();
        assert_eq!(path, dir.path().join("blob_storage").join("refined_data.blob"));

        let blob: Vec<Value> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(blob.len(), 2);
        let stamp = blob[0]["stored_at"].as_str().unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
        assert_eq!(blob[1]["stored_at"], blob[0]["stored_at"]);

        let untouched = serde_json::to_value(&records[0]).unwrap();
        assert!(untouched.get("stored_at").is_none());
    }

    #[tokio::test]
    async fn test_blob_is_overwritten_wholesale() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "blob");

        store.put_batch("batch", &[Record::new("a"), Record::new("b")]).await.unwrap();
        let path = store.put_batch("batch", &[Record::new("c")]).await.unwrap();

        let blob: Vec<Value> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(blob.len(), 1);
        assert_eq!(blob[0]["text"], "c");
    }
}
