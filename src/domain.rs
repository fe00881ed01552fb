//! Data shapes shared by every pipeline stage.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Ordinal quality tier. Numeric value is always within `[0, 2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityLabel {
    #[serde(rename = "Low Quality")]
    Low,
    #[serde(rename = "Medium Quality")]
    Medium,
    #[serde(rename = "High Quality")]
    High,
}

impl QualityLabel {
    pub const MIN: i8 = 0;
    pub const MAX: i8 = 2;

    pub fn numeric(self) -> i8 {
        match self {
            QualityLabel::Low => 0,
            QualityLabel::Medium => 1,
            QualityLabel::High => 2,
        }
    }

    /// Build a label from any integer, clamping into the valid range.
    pub fn from_clamped(value: i64) -> Self {
        match value.clamp(Self::MIN as i64, Self::MAX as i64) {
            0 => QualityLabel::Low,
            1 => QualityLabel::Medium,
            _ => QualityLabel::High,
        }
    }

    /// Class index as emitted by a 3-way classifier head.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(QualityLabel::Low),
            1 => Some(QualityLabel::Medium),
            2 => Some(QualityLabel::High),
            _ => None,
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            QualityLabel::Low => "Low Quality",
            QualityLabel::Medium => "Medium Quality",
            QualityLabel::High => "High Quality",
        }
    }
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// Entity category as labelled by the recognizer (spaCy label set).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    Person,
    Email,
    Date,
    Gpe,
    Org,
    Cardinal,
    Other(String),
}

impl EntityType {
    pub fn as_label(&self) -> &str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Email => "EMAIL",
            EntityType::Date => "DATE",
            EntityType::Gpe => "GPE",
            EntityType::Org => "ORG",
            EntityType::Cardinal => "CARDINAL",
            EntityType::Other(label) => label,
        }
    }

    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "PERSON" | "PER" => EntityType::Person,
            "EMAIL" => EntityType::Email,
            "DATE" => EntityType::Date,
            "GPE" => EntityType::Gpe,
            "ORG" => EntityType::Org,
            "CARDINAL" => EntityType::Cardinal,
            other => EntityType::Other(other.to_string()),
        }
    }
}

impl From<String> for EntityType {
    fn from(label: String) -> Self {
        EntityType::parse(&label)
    }
}

impl From<EntityType> for String {
    fn from(entity_type: EntityType) -> Self {
        entity_type.as_label().to_string()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// One recognized span, serialized as a `[span_text, label]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan(pub String, pub EntityType);

impl EntitySpan {
    pub fn new(text: impl Into<String>, entity_type: EntityType) -> Self {
        Self(text.into(), entity_type)
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.1
    }
}

/// Unit of work flowing through the refinement pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Input fields outside the declared schema, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_output: Option<QualityLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refined_output: Option<QualityLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
}

impl Record {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rating: None,
            timestamp: None,
            extra: Map::new(),
            initial_output: None,
            refined_output: None,
            asset_id: None,
            sentiment: None,
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }
}

/// Side artifact produced by the entity extractor, one per input record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub text: String,
    pub entities: Vec<EntitySpan>,
    pub rating: Option<f64>,
    pub timestamp: Option<String>,
}

/// Ordered set of records produced by one submission.
pub type Batch = Vec<Record>;

/// Entry of the append-only activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unix epoch seconds
    pub timestamp: f64,
    pub action: String,
    pub records: usize,
}

impl LogEntry {
    /// Entry stamped with the current wall-clock time
    pub fn now(action: &str, records: usize) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0,
            action: action.to_string(),
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quality_label_serializes_as_display_string() {
        let value = serde_json::to_value(QualityLabel::Medium).unwrap();
        assert_eq!(value, json!("Medium Quality"));
        let back: QualityLabel = serde_json::from_value(json!("High Quality")).unwrap();
        assert_eq!(back, QualityLabel::High);
    }

    #[test]
    fn test_from_clamped_stays_in_range() {
        assert_eq!(QualityLabel::from_clamped(-3), QualityLabel::Low);
        assert_eq!(QualityLabel::from_clamped(1), QualityLabel::Medium);
        assert_eq!(QualityLabel::from_clamped(7), QualityLabel::High);
    }

    #[test]
    fn test_entity_span_serializes_as_pair() {
        let span = EntitySpan::new("Jane", EntityType::Person);
        assert_eq!(serde_json::to_value(&span).unwrap(), json!(["Jane", "PERSON"]));

        let other: EntitySpan = serde_json::from_value(json!(["Lakers", "NORP"])).unwrap();
        assert_eq!(other.entity_type(), &EntityType::Other("NORP".to_string()));
    }

    #[test]
    fn test_record_keeps_extra_fields() {
        let record: Record = serde_json::from_value(json!({
            "text": "hello",
            "rating": 7.0,
            "source": "kiosk"
        }))
        .unwrap();
        assert_eq!(record.extra.get("source"), Some(&json!("kiosk")));

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["source"], json!("kiosk"));
        assert!(out.get("asset_id").is_none());
    }
}
