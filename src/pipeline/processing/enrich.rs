use tracing::debug;

use crate::app::ports::SentimentClassifierPort;
use crate::domain::Record;
use crate::error::Result;

/// `asset_{n:03d}`, 1-based
pub fn asset_id(index: usize) -> String {
    format!("asset_{:03}", index + 1)
}

/// Assign sequential asset ids in batch order.
pub fn assign_asset_ids(records: &mut [Record]) {
    for (index, record) in records.iter_mut().enumerate() {
        record.asset_id = Some(asset_id(index));
    }
}

/// Attach the sentiment model's top label to each (already anonymized) text.
pub async fn tag_sentiment(
    classifier: &dyn SentimentClassifierPort,
    records: &mut [Record],
) -> Result<()> {
    for record in records.iter_mut() {
        let label = classifier.sentiment(&record.text).await?;
        debug!(sentiment = %label, "tagged sentiment");
        record.sentiment = Some(label);
    }
    Ok(())
}

/// Asset ids first, then sentiment.
pub async fn enrich_batch(
    classifier: &dyn SentimentClassifierPort,
    records: &mut [Record],
) -> Result<()> {
    assign_asset_ids(records);
    tag_sentiment(classifier, records).await
}
