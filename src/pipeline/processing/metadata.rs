use tracing::debug;

use crate::app::ports::EntityRecognizerPort;
use crate::domain::{MetadataEntry, Record};
use crate::error::Result;

/// Run the recognizer over every record, one entry per record in input order
pub async fn extract_metadata(
    recognizer: &dyn EntityRecognizerPort,
    records: &[Record],
) -> Result<Vec<MetadataEntry>> {
    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        let entities = recognizer.recognize(&record.text).await?;
        debug!(entities = entities.len(), "extracted entities");
        entries.push(MetadataEntry {
            text: record.text.clone(),
            entities,
            rating: record.rating,
            timestamp: record.timestamp.clone(),
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntitySpan, EntityType};
    use async_trait::async_trait;

    struct FirstWordRecognizer;

    #[async_trait]
    impl EntityRecognizerPort for FirstWordRecognizer {
        async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
            Ok(text
                .split_whitespace()
                .next()
                .map(|w| vec![EntitySpan::new(w, EntityType::Person)])
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_one_entry_per_record_in_order() {
        let records = vec![
            Record::new("Jane called").with_rating(9.0),
            Record::new("Tom wrote"),
            Record::new(""),
        ];
        let entries = extract_metadata(&FirstWordRecognizer, &records).await.unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].entities, vec![EntitySpan::new("Jane", EntityType::Person)]);
        assert_eq!(entries[0].rating, Some(9.0));
        assert_eq!(entries[1].text, "Tom wrote");
        assert!(entries[2].entities.is_empty());
    }
}
