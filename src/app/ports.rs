use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

use crate::domain::{EntitySpan, LogEntry, QualityLabel, Record};
use crate::error::Result;

// Inference-side ports

#[async_trait]
pub trait EntityRecognizerPort: Send + Sync {
    /// Recognized spans in document order
    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>>;
}

#[async_trait]
pub trait QualityClassifierPort: Send + Sync {
    async fn classify(&self, text: &str) -> Result<QualityLabel>;
}

#[async_trait]
pub trait SentimentClassifierPort: Send + Sync {
    /// Top label of the sentiment model, verbatim
    async fn sentiment(&self, text: &str) -> Result<String>;
}

/// One step of the unrated refinement walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Down,
    Stay,
    Up,
}

impl Nudge {
    pub const ALL: [Nudge; 3] = [Nudge::Down, Nudge::Stay, Nudge::Up];

    pub fn delta(self) -> i64 {
        match self {
            Nudge::Down => -1,
            Nudge::Stay => 0,
            Nudge::Up => 1,
        }
    }
}

pub trait PerturbationSource: Send + Sync {
    /// Uniform draw over `{-1, 0, +1}`
    fn draw(&self) -> Nudge;
}

// Storage-side ports

#[async_trait]
pub trait ArtifactStorePort: Send + Sync {
    /// Overwrite the named JSON artifact and return where it landed
    async fn write_json(&self, name: &str, value: &Value) -> Result<PathBuf>;
    /// `Ok(None)` when the artifact was never written
    async fn read_json(&self, name: &str) -> Result<Option<Value>>;
}

#[async_trait]
pub trait BlobStorePort: Send + Sync {
    /// Write the batch under a logical name, stamping `stored_at`; returns the blob path
    async fn put_batch(&self, name: &str, records: &[Record]) -> Result<PathBuf>;
}

#[async_trait]
pub trait ActivityLogPort: Send + Sync {
    async fn append(&self, entry: LogEntry) -> Result<()>;
    async fn entries(&self) -> Result<Vec<LogEntry>>;
}
