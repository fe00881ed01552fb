use data_optimizer::app::ports::ActivityLogPort;
use data_optimizer::config::{Config, StorageConfig};
use data_optimizer::constants::ACTIVITY_LOG_FILE;
use data_optimizer::domain::{LogEntry, QualityLabel};
use data_optimizer::infra::activity_log::FsActivityLog;
use data_optimizer::server::AppState;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::tempdir;

fn config_in(root: &Path) -> Config {
    let mut config = Config::default();
    config.storage = StorageConfig::default().rooted_at(root);
    config.inference.seed = Some(42);
    config
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_mixed_batch_end_to_end_on_disk() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let state = AppState::from_config(&config).unwrap();

    let payload = json!([
        {"text": "Jane met Tom at Acme Corp on 2024-01-01", "rating": 9.5},
        {"text": "good service", "rating": null}
    ]);
    let outcome = state.optimize.execute(&payload).await.unwrap();
    let records = &outcome.records;

    let first = &records[0];
    assert_eq!(first.initial_output, Some(QualityLabel::High));
    assert_eq!(first.refined_output, Some(QualityLabel::High));
    assert_eq!(first.text, "[MASKED] met [MASKED] at [MASKED] on [MASKED]");
    assert_eq!(first.asset_id.as_deref(), Some("asset_001"));
    assert_eq!(first.sentiment.as_deref(), Some("POSITIVE"));

    let second = &records[1];
    assert_eq!(second.asset_id.as_deref(), Some("asset_002"));
    assert!(matches!(
        second.refined_output,
        Some(QualityLabel::Low | QualityLabel::Medium | QualityLabel::High)
    ));
    assert!(second.initial_output.is_some());

    let data_dir = &config.storage.data_dir;
    assert_eq!(read_json(&data_dir.join("input_data.json")), payload);

    let cleaned = read_json(&data_dir.join("cleaned_data.json"));
    assert!(cleaned[1]["rating"].is_number());
    assert_eq!(cleaned[0]["text"], json!("Jane met Tom at Acme Corp on 2024-01-01"));

    let metadata = read_json(&data_dir.join("metadata.json"));
    assert_eq!(
        metadata[0]["entities"],
        json!([["Jane", "PERSON"], ["Tom", "PERSON"], ["Acme Corp", "ORG"], ["2024-01-01", "DATE"]])
    );
    assert_eq!(metadata[1]["entities"], json!([]));

    let refined = read_json(&data_dir.join("refined_data.json"));
    assert_eq!(refined[0]["initial_output"], json!("High Quality"));
    assert_eq!(refined[0]["refined_output"], json!("High Quality"));
    assert!(refined[0].get("stored_at").is_none());

    let blob_path = config.storage.blob_dir.join("refined_data.blob");
    assert_eq!(outcome.stored.blob_path, blob_path);
    let blob = read_json(&blob_path);
    assert_eq!(blob.as_array().unwrap().len(), 2);
    assert!(blob[0]["stored_at"].is_string());
    assert_eq!(blob[0]["stored_at"], blob[1]["stored_at"]);

    let log = FsActivityLog::new(config.storage.log_dir.join(ACTIVITY_LOG_FILE));
    let entries: Vec<LogEntry> = log.entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "optimize");
    assert_eq!(entries[0].records, 2);
    assert!(entries[0].timestamp > 1_600_000_000.0);
}

#[tokio::test]
async fn test_single_object_is_a_one_record_batch_and_resubmission_overwrites() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let state = AppState::from_config(&config).unwrap();

    state
        .optimize
        .execute(&json!([{"text": "a"}, {"text": "b"}, {"text": "c"}]))
        .await
        .unwrap();
    let outcome = state
        .optimize
        .execute(&json!({"text": "rated", "rating": 6, "channel": "email"}))
        .await
        .unwrap();
    assert_eq!(outcome.stored.records, 1);

    let refined = read_json(&config.storage.data_dir.join("refined_data.json"));
    assert_eq!(refined.as_array().unwrap().len(), 1);
    assert_eq!(refined[0]["refined_output"], json!("Medium Quality"));
    assert_eq!(refined[0]["channel"], json!("email"));

    let retrieved = state.retrieve.execute(Some("12345")).await.unwrap();
    assert_eq!(retrieved, refined);

    let log = FsActivityLog::new(config.storage.log_dir.join(ACTIVITY_LOG_FILE));
    let actions: Vec<String> = log.entries().await.unwrap().into_iter().map(|e| e.action).collect();
    assert_eq!(actions, vec!["optimize", "optimize", "retrieve"]);
}

#[tokio::test]
async fn test_masked_types_follow_configuration() {
    let dir = tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.anonymize.masked_types = vec!["PERSON".to_string()];
    let state = AppState::from_config(&config).unwrap();

    let outcome = state
        .optimize
        .execute(&json!({"text": "Jane joined Acme Corp", "rating": 3}))
        .await
        .unwrap();
    assert_eq!(outcome.records[0].text, "[MASKED] joined Acme Corp");
    assert_eq!(outcome.records[0].refined_output, Some(QualityLabel::Low));
}
