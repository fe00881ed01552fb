use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::ports::QualityClassifierPort;
use crate::domain::{QualityLabel, Record};
use crate::error::{OptimizerError, Result};

/// Lower bound (inclusive) of the High tier
pub const HIGH_QUALITY_MIN_RATING: f64 = 9.0;
/// Lower bound (inclusive) of the Medium tier
pub const MEDIUM_QUALITY_MIN_RATING: f64 = 6.0;

/// Supervised rating-to-quality mapping, total over all ratings.
pub fn map_rating_to_quality(rating: f64) -> QualityLabel {
    if rating >= HIGH_QUALITY_MIN_RATING {
        QualityLabel::High
    } else if rating >= MEDIUM_QUALITY_MIN_RATING {
        QualityLabel::Medium
    } else {
        QualityLabel::Low
    }
}

/// Where a record's initial label came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualitySource {
    /// Derived from the record's own rating
    Rating,
    /// Predicted by the pretrained text classifier
    Model,
}

impl QualitySource {
    pub fn as_str(self) -> &'static str {
        match self {
            QualitySource::Rating => "rating",
            QualitySource::Model => "model",
        }
    }
}

/// Label a single record, returning the chosen label and its source.
/// Never mutates the rating.
pub async fn assess_record(
    classifier: &dyn QualityClassifierPort,
    record: &Record,
) -> Result<(QualityLabel, QualitySource)> {
    match record.rating {
        Some(rating) => Ok((map_rating_to_quality(rating), QualitySource::Rating)),
        None => Ok((classifier.classify(&record.text).await?, QualitySource::Model)),
    }
}

/// Set `initial_output` on every record of the batch.
pub async fn classify_batch(
    classifier: &dyn QualityClassifierPort,
    records: &mut [Record],
) -> Result<Vec<QualitySource>> {
    let mut sources = Vec::with_capacity(records.len());
    for (index, record) in records.iter_mut().enumerate() {
        if record.initial_output.is_some() {
            return Err(OptimizerError::Classification(format!(
                "record {} already carries an initial label",
                index
            )));
        }
        let (label, source) = assess_record(classifier, record).await?;
        debug!(index, label = %label, source = source.as_str(), "initial quality label");
        record.initial_output = Some(label);
        sources.push(source);
    }
    Ok(sources)
}
