pub mod in_memory;

use std::path::PathBuf;
use tracing::info;

use crate::app::ports::{ArtifactStorePort, BlobStorePort};
use crate::constants::REFINED_DATA_FILE;
use crate::domain::Record;
use crate::error::{OptimizerError, Result};

pub use in_memory::{InMemoryActivityLog, InMemoryArtifactStore, InMemoryBlobStore};

/// Where a persisted batch ended up
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBatch {
    pub refined_path: PathBuf,
    pub blob_path: PathBuf,
    pub records: usize,
}

/// Copies of the records with a shared `stored_at` stamp (UTC, ISO-8601).
/// The records themselves are left untouched.
pub fn stamp_stored_at(records: &[Record], stored_at: &str) -> Result<Vec<serde_json::Value>> {
    records
        .iter()
        .map(|record| {
            let mut value = serde_json::to_value(record)
                .map_err(|e| OptimizerError::storage("serialize blob record", e))?;
            if let serde_json::Value::Object(map) = &mut value {
                map.insert("stored_at".to_string(), serde_json::Value::String(stored_at.to_string()));
            }
            Ok(value)
        })
        .collect()
}

/// Current UTC time in the blob stamp format
pub fn utc_stamp() -> String {
    chrono::Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Writes the finished batch to the primary refined artifact and the blob store.
pub async fn persist_batch(
    artifacts: &dyn ArtifactStorePort,
    blobs: &dyn BlobStorePort,
    blob_name: &str,
    records: &[Record],
) -> Result<StoredBatch> {
    let value = serde_json::to_value(records)
        .map_err(|e| OptimizerError::storage("serialize refined batch", e))?;
    let refined_path = artifacts.write_json(REFINED_DATA_FILE, &value).await?;
    let blob_path = blobs.put_batch(blob_name, records).await?;

    info!(
        records = records.len(),
        refined = %refined_path.display(),
        blob = %blob_path.display(),
        "stored refined batch"
    );
    Ok(StoredBatch {
        refined_path,
        blob_path,
        records: records.len(),
    })
}
