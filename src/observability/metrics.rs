//! Metrics for the optimization service
//!
//! Every metric name lives in [`MetricName`] so recording sites never use
//! bare strings. Recording is a no-op until [`init`] installs the Prometheus
//! recorder, which keeps library use and unit tests free of global state.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::OnceLock;
use tracing::info;

use crate::error::{OptimizerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Normalize
    NormalizeBatches,
    NormalizeRecords,
    NormalizeRatingsFilled,
    NormalizeTimestampsFilled,
    NormalizeRejected,

    // Classify
    ClassifyRecords,
    ClassifyErrors,

    // Refine
    RefineRecords,

    // Anonymize
    AnonymizeSpansMasked,

    // Storage
    StorageBatchesWritten,
    StorageErrors,
    StorageBatchSize,

    // Retrieval
    RetrievalSuccess,
    RetrievalRejected,

    // Pipeline
    OptimizeDuration,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::NormalizeBatches => "optimizer_normalize_batches_total",
            MetricName::NormalizeRecords => "optimizer_normalize_records_total",
            MetricName::NormalizeRatingsFilled => "optimizer_normalize_ratings_filled_total",
            MetricName::NormalizeTimestampsFilled => "optimizer_normalize_timestamps_filled_total",
            MetricName::NormalizeRejected => "optimizer_normalize_rejected_total",

            MetricName::ClassifyRecords => "optimizer_classify_records_total",
            MetricName::ClassifyErrors => "optimizer_classify_errors_total",

            MetricName::RefineRecords => "optimizer_refine_records_total",

            MetricName::AnonymizeSpansMasked => "optimizer_anonymize_spans_masked_total",

            MetricName::StorageBatchesWritten => "optimizer_storage_batches_written_total",
            MetricName::StorageErrors => "optimizer_storage_errors_total",
            MetricName::StorageBatchSize => "optimizer_storage_batch_size",

            MetricName::RetrievalSuccess => "optimizer_retrieval_success_total",
            MetricName::RetrievalRejected => "optimizer_retrieval_rejected_total",

            MetricName::OptimizeDuration => "optimizer_optimize_duration_seconds",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            NormalizeBatches,
            NormalizeRecords,
            NormalizeRatingsFilled,
            NormalizeTimestampsFilled,
            NormalizeRejected,
            ClassifyRecords,
            ClassifyErrors,
            RefineRecords,
            AnonymizeSpansMasked,
            StorageBatchesWritten,
            StorageErrors,
            StorageBatchSize,
            RetrievalSuccess,
            RetrievalRejected,
            OptimizeDuration,
        ]
        .into_iter()
    }
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once.
pub fn init() -> Result<PrometheusHandle> {
    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| OptimizerError::Config(format!("Failed to install Prometheus recorder: {}", e)))?;
    let handle = METRICS_HANDLE.get_or_init(|| handle).clone();
    info!("Metrics system initialized");
    Ok(handle)
}

/// Prometheus text exposition, or `None` before [`init`]
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

pub mod normalize {
    use super::MetricName;

    pub fn batch_normalized(records: usize, ratings_filled: usize, timestamps_filled: usize) {
        ::metrics::counter!(MetricName::NormalizeBatches.as_str()).increment(1);
        ::metrics::counter!(MetricName::NormalizeRecords.as_str()).increment(records as u64);
        ::metrics::counter!(MetricName::NormalizeRatingsFilled.as_str()).increment(ratings_filled as u64);
        ::metrics::counter!(MetricName::NormalizeTimestampsFilled.as_str())
            .increment(timestamps_filled as u64);
    }

    pub fn batch_rejected() {
        ::metrics::counter!(MetricName::NormalizeRejected.as_str()).increment(1);
    }
}

pub mod classify {
    use super::MetricName;

    /// `source` is either `rating` or `model`
    pub fn record_classified(source: &str) {
        ::metrics::counter!(MetricName::ClassifyRecords.as_str(), "source" => source.to_string()).increment(1);
    }

    pub fn classification_failed() {
        ::metrics::counter!(MetricName::ClassifyErrors.as_str()).increment(1);
    }
}

pub mod refine {
    use super::MetricName;

    /// `path` is either `reward` or `perturbation`
    pub fn record_refined(path: &str) {
        ::metrics::counter!(MetricName::RefineRecords.as_str(), "path" => path.to_string()).increment(1);
    }
}

pub mod anonymize {
    use super::MetricName;

    pub fn spans_masked(count: usize) {
        ::metrics::counter!(MetricName::AnonymizeSpansMasked.as_str()).increment(count as u64);
    }
}

pub mod storage {
    use super::MetricName;

    pub fn batch_written(size: usize) {
        ::metrics::counter!(MetricName::StorageBatchesWritten.as_str()).increment(1);
        ::metrics::histogram!(MetricName::StorageBatchSize.as_str()).record(size as f64);
    }

    pub fn write_failed(target: &str) {
        ::metrics::counter!(MetricName::StorageErrors.as_str(), "target" => target.to_string()).increment(1);
    }
}

pub mod retrieval {
    use super::MetricName;

    pub fn served() {
        ::metrics::counter!(MetricName::RetrievalSuccess.as_str()).increment(1);
    }

    /// `reason` is the error kind that rejected the call
    pub fn rejected(reason: &str) {
        ::metrics::counter!(MetricName::RetrievalRejected.as_str(), "reason" => reason.to_string())
            .increment(1);
    }
}

pub mod pipeline {
    use super::MetricName;

    pub fn optimize_duration(secs: f64) {
        ::metrics::histogram!(MetricName::OptimizeDuration.as_str()).record(secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_names_are_unique_and_prefixed() {
        let names: Vec<&str> = MetricName::all_metrics().map(|m| m.as_str()).collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len());
        assert!(names.iter().all(|n| n.starts_with("optimizer_")));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        normalize::batch_normalized(3, 1, 2);
        classify::record_classified("rating");
        retrieval::rejected("rate_limited");
    }
}
