use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use crate::app::ports::ActivityLogPort;
use crate::domain::LogEntry;
use crate::error::{OptimizerError, Result};
use crate::infra::to_pretty_json;

/// Append-only activity log kept as one JSON array file.
///
/// Every append reads the whole file, pushes the entry and rewrites it. The
/// cycle runs under a process-wide lock so concurrent requests in this process
/// cannot drop each other's entries; writers in other processes are not
/// coordinated.
pub struct FsActivityLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FsActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<LogEntry>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| OptimizerError::storage(&format!("parse {}", self.path.display()), e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(OptimizerError::storage(&format!("read {}", self.path.display()), e)),
        }
    }
}

#[async_trait]
impl ActivityLogPort for FsActivityLog {
    async fn append(&self, entry: LogEntry) -> Result<()> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| OptimizerError::storage(&format!("create {}", parent.display()), e))?;
        }

        let mut entries = self.read_all().await?;
        debug!(action = %entry.action, records = entry.records, "appending activity log entry");
        entries.push(entry);

        tokio::fs::write(&self.path, to_pretty_json(&entries)?)
            .await
            .map_err(|e| OptimizerError::storage(&format!("write {}", self.path.display()), e))
    }

    async fn entries(&self) -> Result<Vec<LogEntry>> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn entry(action: &str, records: usize) -> LogEntry {
        LogEntry {
            timestamp: 1_700_000_000.5,
            action: action.to_string(),
            records,
        }
    }

    #[tokio::test]
    async fn test_entries_accumulate_in_order() {
        let dir = tempdir().unwrap();
        let log = FsActivityLog::new(dir.path().join("logs").join("log.json"));

        log.append(entry("optimize", 2)).await.unwrap();
        log.append(entry("retrieve", 2)).await.unwrap();

        let entries = log.entries().await.unwrap();
        assert_eq!(entries, vec![entry("optimize", 2), entry("retrieve", 2)]);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        let dir = tempdir().unwrap();
        let log = Arc::new(FsActivityLog::new(dir.path().join("log.json")));

        let mut handles = Vec::new();
        for i in 0..16 {
            let log = log.clone();
            handles.push(tokio::spawn(async move { log.append(entry("optimize", i)).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(log.entries().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_corrupt_log_is_a_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, b"{not json").unwrap();

        let err = FsActivityLog::new(&path).append(entry("optimize", 1)).await.unwrap_err();
        assert!(matches!(err, OptimizerError::StorageWrite(_)));
    }
}
