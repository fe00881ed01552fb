use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::app::ports::{ActivityLogPort, ArtifactStorePort, BlobStorePort};
use crate::constants::{ACTION_OPTIMIZE, CLEANED_DATA_FILE, INPUT_SNAPSHOT_FILE, METADATA_FILE};
use crate::domain::{Batch, LogEntry, Record};
use crate::error::Result;
use crate::infra::inference::InferenceServices;
use crate::observability::metrics;
use crate::pipeline::processing::anonymize::{anonymize_batch, AnonymizerConfig};
use crate::pipeline::processing::enrich::enrich_batch;
use crate::pipeline::processing::metadata::extract_metadata;
use crate::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};
use crate::pipeline::processing::quality::classify_batch;
use crate::pipeline::processing::refine::{refine_batch, RefinementPath};
use crate::pipeline::storage::{persist_batch, StoredBatch};

/// Result of one successful submission
#[derive(Debug, Clone)]
pub struct OptimizeOutcome {
    pub records: Batch,
    pub stored: StoredBatch,
}

/// Runs one submitted batch through every stage, in order, and persists it.
///
/// Any stage failure aborts the remaining stages. Artifacts written before the
/// failing stage stay on disk.
pub struct OptimizeUseCase {
    normalizer: Box<dyn Normalizer + Send + Sync>,
    inference: InferenceServices,
    artifacts: Arc<dyn ArtifactStorePort>,
    blobs: Arc<dyn BlobStorePort>,
    activity_log: Arc<dyn ActivityLogPort>,
    anonymizer: AnonymizerConfig,
    blob_name: String,
}

impl OptimizeUseCase {
    pub fn new(
        inference: InferenceServices,
        artifacts: Arc<dyn ArtifactStorePort>,
        blobs: Arc<dyn BlobStorePort>,
        activity_log: Arc<dyn ActivityLogPort>,
        anonymizer: AnonymizerConfig,
        blob_name: impl Into<String>,
    ) -> Self {
        Self {
            normalizer: Box::new(DefaultNormalizer::new()),
            inference,
            artifacts,
            blobs,
            activity_log,
            anonymizer,
            blob_name: blob_name.into(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Box<dyn Normalizer + Send + Sync>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub async fn execute(&self, payload: &Value) -> Result<OptimizeOutcome> {
        let started = Instant::now();

        self.artifacts.write_json(INPUT_SNAPSHOT_FILE, payload).await?;

        let (mut records, report) = match self.normalizer.normalize(payload) {
            Ok(normalized) => normalized,
            Err(e) => {
                metrics::normalize::batch_rejected();
                return Err(e);
            }
        };
        metrics::normalize::batch_normalized(report.records, report.ratings_filled, report.timestamps_filled);
        info!(
            records = report.records,
            ratings_filled = report.ratings_filled,
            timestamps_filled = report.timestamps_filled,
            "normalized batch"
        );
        self.artifacts
            .write_json(CLEANED_DATA_FILE, &serde_json::to_value(&records)?)
            .await?;

        self.export_metadata(&records).await?;

        let sources = match classify_batch(self.inference.quality.as_ref(), &mut records).await {
            Ok(sources) => sources,
            Err(e) => {
                metrics::classify::classification_failed();
                return Err(e);
            }
        };
        for source in &sources {
            metrics::classify::record_classified(source.as_str());
        }

        let paths = refine_batch(&mut records, self.inference.perturbation.as_ref())?;
        for path in &paths {
            metrics::refine::record_refined(path.as_str());
        }
        let perturbed = paths
            .iter()
            .filter(|p| matches!(p, RefinementPath::Perturbation(_)))
            .count();
        info!(records = records.len(), perturbed, "classified and refined batch");

        let masked = anonymize_batch(self.inference.recognizer.as_ref(), &mut records, &self.anonymizer).await?;
        metrics::anonymize::spans_masked(masked);
        info!(spans = masked, "anonymized batch");

        enrich_batch(self.inference.sentiment.as_ref(), &mut records).await?;

        let stored = match persist_batch(
            self.artifacts.as_ref(),
            self.blobs.as_ref(),
            &self.blob_name,
            &records,
        )
        .await
        {
            Ok(stored) => stored,
            Err(e) => {
                metrics::storage::write_failed("batch");
                return Err(e);
            }
        };
        metrics::storage::batch_written(stored.records);

        self.activity_log
            .append(LogEntry::now(ACTION_OPTIMIZE, records.len()))
            .await?;

        metrics::pipeline::optimize_duration(started.elapsed().as_secs_f64());
        info!(
            records = records.len(),
            blob = %stored.blob_path.display(),
            "Data optimized successfully"
        );
        Ok(OptimizeOutcome { records, stored })
    }

    /// Extract and persist the metadata side artifact. Recognizer failures abort;
    /// a failed write is only reported.
    async fn export_metadata(&self, records: &[Record]) -> Result<()> {
        let entries = extract_metadata(self.inference.recognizer.as_ref(), records).await?;
        let value = serde_json::to_value(&entries)?;
        match self.artifacts.write_json(METADATA_FILE, &value).await {
            Ok(path) => info!(entries = entries.len(), path = %path.display(), "exported metadata"),
            Err(e) => {
                metrics::storage::write_failed("metadata");
                warn!(error = %e, "metadata export failed, continuing");
            }
        }
        Ok(())
    }
}
