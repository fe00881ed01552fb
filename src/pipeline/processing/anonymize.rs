use tracing::debug;

use crate::app::ports::EntityRecognizerPort;
use crate::constants::{DEFAULT_MASKED_TYPES, REDACTION_TOKEN};
use crate::domain::{EntitySpan, EntityType, Record};
use crate::error::Result;

/// Which entity types get redacted and what replaces them
#[derive(Debug, Clone)]
pub struct AnonymizerConfig {
    pub masked_types: Vec<EntityType>,
    pub token: String,
}

impl Default for AnonymizerConfig {
    fn default() -> Self {
        Self {
            masked_types: DEFAULT_MASKED_TYPES.iter().map(|l| EntityType::parse(l)).collect(),
            token: REDACTION_TOKEN.to_string(),
        }
    }
}

impl AnonymizerConfig {
    pub fn masks(&self, entity_type: &EntityType) -> bool {
        self.masked_types.contains(entity_type)
    }
}

/// Replace every literal occurrence of each sensitive span, in the order the
/// recognizer emitted them. Substring-based: occurrences the recognizer did
/// not tag are masked too. Returns the number of spans applied.
pub fn mask_spans(text: &str, spans: &[EntitySpan], config: &AnonymizerConfig) -> (String, usize) {
    let mut masked = text.to_string();
    let mut applied = 0;
    for span in spans {
        if span.text().is_empty() || !config.masks(span.entity_type()) {
            continue;
        }
        if masked.contains(span.text()) {
            masked = masked.replace(span.text(), &config.token);
            applied += 1;
        }
    }
    (masked, applied)
}

/// Re-run the recognizer over each record and redact its text in place.
pub async fn anonymize_batch(
    recognizer: &dyn EntityRecognizerPort,
    records: &mut [Record],
    config: &AnonymizerConfig,
) -> Result<usize> {
    let mut total = 0;
    for (index, record) in records.iter_mut().enumerate() {
        let spans = recognizer.recognize(&record.text).await?;
        let (masked, applied) = mask_spans(&record.text, &spans, config);
        if applied > 0 {
            debug!(index, spans = applied, "masked sensitive spans");
        }
        record.text = masked;
        total += applied;
    }
    Ok(total)
}
