//! Adapters for inference servers speaking the Hugging Face pipeline JSON shape.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::app::ports::{EntityRecognizerPort, QualityClassifierPort, SentimentClassifierPort};
use crate::domain::{EntitySpan, EntityType, QualityLabel};
use crate::error::{OptimizerError, Result};
use crate::infra::http_client::InferenceHttp;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Accepts `[[{label, score}, ..]]` (top_k=None) or a flat `[{label, score}, ..]`
pub fn parse_label_scores(value: &Value) -> Result<Vec<LabelScore>> {
    let items = match value {
        Value::Array(outer) if outer.first().map_or(false, Value::is_array) => outer[0].clone(),
        Value::Array(_) => value.clone(),
        other => {
            return Err(OptimizerError::Classification(format!(
                "unexpected classification payload: {}",
                other
            )))
        }
    };
    serde_json::from_value(items)
        .map_err(|e| OptimizerError::Classification(format!("malformed label scores: {}", e)))
}

/// Highest-scoring label; ties go to the earliest
pub fn argmax(scores: &[LabelScore]) -> Option<&LabelScore> {
    scores.iter().fold(None, |best: Option<&LabelScore>, candidate| match best {
        Some(b) if b.score >= candidate.score => Some(b),
        _ => Some(candidate),
    })
}

/// Map a 3-class head's label onto the quality enum
pub fn quality_from_label(label: &str) -> Option<QualityLabel> {
    let normalized = label.trim().to_ascii_lowercase();
    let index = normalized.strip_prefix("label_").unwrap_or(&normalized);
    if let Ok(i) = index.parse::<usize>() {
        return QualityLabel::from_index(i);
    }
    match normalized.trim_end_matches(" quality") {
        "low" => Some(QualityLabel::Low),
        "medium" => Some(QualityLabel::Medium),
        "high" => Some(QualityLabel::High),
        _ => None,
    }
}

pub struct HttpQualityClassifier {
    http: InferenceHttp,
    url: String,
}

impl HttpQualityClassifier {
    pub fn new(http: InferenceHttp, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[async_trait]
impl QualityClassifierPort for HttpQualityClassifier {
    async fn classify(&self, text: &str) -> Result<QualityLabel> {
        let scores = parse_label_scores(&self.http.infer(&self.url, text).await?)?;
        let top = argmax(&scores)
            .ok_or_else(|| OptimizerError::Classification("classifier returned no labels".to_string()))?;
        quality_from_label(&top.label).ok_or_else(|| {
            OptimizerError::Classification(format!("classifier label '{}' is not a quality class", top.label))
        })
    }
}

pub struct HttpSentimentClassifier {
    http: InferenceHttp,
    url: String,
}

impl HttpSentimentClassifier {
    pub fn new(http: InferenceHttp, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[async_trait]
impl SentimentClassifierPort for HttpSentimentClassifier {
    async fn sentiment(&self, text: &str) -> Result<String> {
        let scores = parse_label_scores(&self.http.infer(&self.url, text).await?)?;
        argmax(&scores)
            .map(|top| top.label.clone())
            .ok_or_else(|| OptimizerError::Classification("sentiment model returned no labels".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct TokenEntity {
    #[serde(alias = "entity")]
    entity_group: String,
    #[serde(default)]
    word: String,
    start: Option<usize>,
    end: Option<usize>,
}

fn entity_type_from_model(label: &str) -> EntityType {
    let bare = label
        .strip_prefix("B-")
        .or_else(|| label.strip_prefix("I-"))
        .unwrap_or(label);
    match bare {
        "LOC" => EntityType::Gpe,
        other => EntityType::parse(other),
    }
}

/// Token-classification output to spans in document order. Offsets, when
/// present, are preferred over the model's reconstructed `word`.
pub fn parse_token_entities(text: &str, value: &Value) -> Result<Vec<EntitySpan>> {
    let mut entities: Vec<TokenEntity> = serde_json::from_value(value.clone())
        .map_err(|e| OptimizerError::Classification(format!("malformed entity payload: {}", e)))?;
    entities.sort_by_key(|e| e.start.unwrap_or(usize::MAX));

    Ok(entities
        .into_iter()
        .filter_map(|e| {
            let span = match (e.start, e.end) {
                (Some(s), Some(end)) => text.get(s..end).map(str::to_string).unwrap_or(e.word),
                _ => e.word,
            };
            let span = span.trim().to_string();
            (!span.is_empty()).then(|| EntitySpan::new(span, entity_type_from_model(&e.entity_group)))
        })
        .collect())
}

pub struct HttpEntityRecognizer {
    http: InferenceHttp,
    url: String,
}

impl HttpEntityRecognizer {
    pub fn new(http: InferenceHttp, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[async_trait]
impl EntityRecognizerPort for HttpEntityRecognizer {
    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let value = self.http.infer(&self.url, text).await?;
        parse_token_entities(text, &value)
    }
}
