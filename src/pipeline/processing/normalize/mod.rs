use chrono::{Local, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{Batch, Record};
use crate::error::{OptimizerError, Result};

const TEXT_FIELD: &str = "text";
const RATING_FIELD: &str = "rating";
const TIMESTAMP_FIELD: &str = "timestamp";

/// Summary of the column-wise fills applied to a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationReport {
    /// Number of records in the batch
    pub records: usize,
    /// Ratings filled with the batch mean (or zero when every rating was null)
    pub ratings_filled: usize,
    /// The value used to fill missing ratings, if any were filled
    pub rating_fill_value: Option<f64>,
    /// Timestamps filled with the batch wall-clock value
    pub timestamps_filled: usize,
}

/// Trait for coercing a raw JSON payload into a uniform batch of records
pub trait Normalizer {
    fn normalize(&self, payload: &Value) -> Result<(Batch, NormalizationReport)>;
}

/// Default normalizer: single object or array of objects, mean-filled ratings,
/// wall-clock filled timestamps
#[derive(Debug, Default, Clone)]
pub struct DefaultNormalizer;

impl DefaultNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize with an explicit fill time. Every missing timestamp in the
    /// batch receives this same value.
    pub fn normalize_at(&self, payload: &Value, now: NaiveDateTime) -> Result<(Batch, NormalizationReport)> {
        let objects = as_objects(payload)?;

        let has_rating = objects.iter().any(|o| o.contains_key(RATING_FIELD));
        let has_timestamp = objects.iter().any(|o| o.contains_key(TIMESTAMP_FIELD));

        let mut batch = Vec::with_capacity(objects.len());
        for (index, object) in objects.iter().enumerate() {
            batch.push(record_from_object(index, object)?);
        }

        let mut report = NormalizationReport {
            records: batch.len(),
            ..Default::default()
        };

        if has_rating {
            let present: Vec<f64> = batch.iter().filter_map(|r| r.rating).collect();
            // Mean is computed once over the non-null ratings, before filling
            let fill = if present.is_empty() {
                0.0
            } else {
                present.iter().sum::<f64>() / present.len() as f64
            };
            for record in batch.iter_mut().filter(|r| r.rating.is_none()) {
                record.rating = Some(fill);
                report.ratings_filled += 1;
            }
            if report.ratings_filled > 0 {
                report.rating_fill_value = Some(fill);
            }
        }

        if has_timestamp {
            let fill = now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
            for record in batch.iter_mut().filter(|r| r.timestamp.is_none()) {
                record.timestamp = Some(fill.clone());
                report.timestamps_filled += 1;
            }
        }

        debug!(
            records = report.records,
            ratings_filled = report.ratings_filled,
            timestamps_filled = report.timestamps_filled,
            "normalized batch"
        );
        Ok((batch, report))
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, payload: &Value) -> Result<(Batch, NormalizationReport)> {
        self.normalize_at(payload, Local::now().naive_local())
    }
}

fn as_objects(payload: &Value) -> Result<Vec<&Map<String, Value>>> {
    match payload {
        Value::Object(object) => Ok(vec![object]),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_object().ok_or_else(|| {
                    OptimizerError::MalformedInput(format!("record {} is not a JSON object", index))
                })
            })
            .collect(),
        _ => Err(OptimizerError::MalformedInput(
            "payload must be a JSON object or an array of objects".to_string(),
        )),
    }
}

fn record_from_object(index: usize, object: &Map<String, Value>) -> Result<Record> {
    let text = match object.get(TEXT_FIELD) {
        Some(Value::String(text)) => text.clone(),
        Some(_) => {
            return Err(OptimizerError::MalformedInput(format!(
                "record {} has a non-string 'text' field",
                index
            )))
        }
        None => {
            return Err(OptimizerError::MalformedInput(format!(
                "record {} is missing the 'text' field",
                index
            )))
        }
    };

    let rating = match object.get(RATING_FIELD) {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(other) => {
            return Err(OptimizerError::MalformedInput(format!(
                "record {} has a non-numeric rating: {}",
                index, other
            )))
        }
    };

    let timestamp = match object.get(TIMESTAMP_FIELD) {
        None | Some(Value::Null) => None,
        Some(Value::String(ts)) => Some(ts.clone()),
        Some(other) => {
            return Err(OptimizerError::MalformedInput(format!(
                "record {} has a non-string timestamp: {}",
                index, other
            )))
        }
    };

    let extra = object
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), TEXT_FIELD | RATING_FIELD | TIMESTAMP_FIELD))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let mut record = Record::new(text);
    record.rating = rating;
    record.timestamp = timestamp;
    record.extra = extra;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_single_object_becomes_one_record_batch() {
        let (batch, report) = DefaultNormalizer::new()
            .normalize_at(&json!({"text": "hello", "rating": 7}), fixed_now())
            .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].rating, Some(7.0));
        assert_eq!(report.ratings_filled, 0);
    }

    #[test]
    fn test_missing_ratings_filled_with_mean_of_present() {
        let payload = json!([
            {"text": "a", "rating": 4},
            {"text": "b", "rating": null},
            {"text": "c", "rating": 8},
            {"text": "d"}
        ]);
        let (batch, report) = DefaultNormalizer::new().normalize_at(&payload, fixed_now()).unwrap();
        let ratings: Vec<f64> = batch.iter().map(|r| r.rating.unwrap()).collect();
        assert_eq!(ratings, vec![4.0, 6.0, 8.0, 6.0]);
        assert_eq!(report.ratings_filled, 2);
        assert_eq!(report.rating_fill_value, Some(6.0));
    }

    #[test]
    fn test_all_null_ratings_default_to_zero() {
        let payload = json!([{"text": "a", "rating": null}, {"text": "b", "rating": null}]);
        let (batch, _) = DefaultNormalizer::new().normalize_at(&payload, fixed_now()).unwrap();
        assert!(batch.iter().all(|r| r.rating == Some(0.0)));
    }

    #[test]
    fn test_no_rating_field_leaves_ratings_absent() {
        let payload = json!([{"text": "a"}, {"text": "b"}]);
        let (batch, report) = DefaultNormalizer::new().normalize_at(&payload, fixed_now()).unwrap();
        assert!(batch.iter().all(|r| r.rating.is_none()));
        assert_eq!(report.ratings_filled, 0);
    }

    #[test]
    fn test_missing_timestamps_share_one_fill_value() {
        let payload = json!([
            {"text": "a", "timestamp": "2023-05-05T10:00:00"},
            {"text": "b"},
            {"text": "c", "timestamp": null}
        ]);
        let (batch, report) = DefaultNormalizer::new().normalize_at(&payload, fixed_now()).unwrap();
        assert_eq!(batch[0].timestamp.as_deref(), Some("2023-05-05T10:00:00"));
        assert_eq!(batch[1].timestamp.as_deref(), Some("2024-03-01T12:30:00.000000"));
        assert_eq!(batch[1].timestamp, batch[2].timestamp);
        assert_eq!(report.timestamps_filled, 2);
    }

    #[test]
    fn test_missing_text_is_malformed() {
        let err = DefaultNormalizer::new()
            .normalize_at(&json!([{"text": "ok"}, {"rating": 3}]), fixed_now())
            .unwrap_err();
        assert!(matches!(err, OptimizerError::MalformedInput(_)));
    }

    #[test]
    fn test_scalar_payload_is_malformed() {
        let normalizer = DefaultNormalizer::new();
        assert!(matches!(
            normalizer.normalize_at(&json!("just text"), fixed_now()),
            Err(OptimizerError::MalformedInput(_))
        ));
        assert!(matches!(
            normalizer.normalize_at(&json!([{"text": "a"}, 5]), fixed_now()),
            Err(OptimizerError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_extra_fields_pass_through() {
        let (batch, _) = DefaultNormalizer::new()
            .normalize_at(&json!({"text": "a", "channel": "email"}), fixed_now())
            .unwrap();
        assert_eq!(batch[0].extra.get("channel"), Some(&json!("email")));
    }
}
