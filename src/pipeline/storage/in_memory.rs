use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::{stamp_stored_at, utc_stamp};
use crate::app::ports::{ActivityLogPort, ArtifactStorePort, BlobStorePort};
use crate::constants::DEFAULT_BLOB_EXTENSION;
use crate::domain::{LogEntry, Record};
use crate::error::{OptimizerError, Result};

/// In-memory artifact store for development/testing
#[derive(Clone, Default)]
pub struct InMemoryArtifactStore {
    artifacts: Arc<Mutex<HashMap<String, Value>>>,
    failing: Arc<Mutex<Vec<String>>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make writes to `name` fail with a storage error
    pub fn fail_writes_to(&self, name: &str) {
        self.failing.lock().unwrap().push(name.to_string());
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.artifacts.lock().unwrap().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.artifacts.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl ArtifactStorePort for InMemoryArtifactStore {
    async fn write_json(&self, name: &str, value: &Value) -> Result<PathBuf> {
        if self.failing.lock().unwrap().iter().any(|n| n == name) {
            return Err(OptimizerError::StorageWrite(format!("simulated write failure for {}", name)));
        }
        self.artifacts.lock().unwrap().insert(name.to_string(), value.clone());
        debug!("stored artifact {} in memory", name);
        Ok(PathBuf::from(format!("memory://{}", name)))
    }

    async fn read_json(&self, name: &str) -> Result<Option<Value>> {
        Ok(self.get(name))
    }
}

/// In-memory blob store; blobs are overwritten wholesale on each put
#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, Vec<Value>>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Vec<Value>> {
        self.blobs.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl BlobStorePort for InMemoryBlobStore {
    async fn put_batch(&self, name: &str, records: &[Record]) -> Result<PathBuf> {
        let stamped = stamp_stored_at(records, &utc_stamp())?;
        self.blobs.lock().unwrap().insert(name.to_string(), stamped);
        Ok(PathBuf::from(format!("memory://{}.{}", name, DEFAULT_BLOB_EXTENSION)))
    }
}

/// In-memory activity log
#[derive(Clone, Default)]
pub struct InMemoryActivityLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityLogPort for InMemoryActivityLog {
    async fn append(&self, entry: LogEntry) -> Result<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<LogEntry>> {
        Ok(self.entries.lock().unwrap().clone())
    }
}
