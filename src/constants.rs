// Artifact names written under the data dir
pub const INPUT_SNAPSHOT_FILE: &str = "input_data.json";
pub const CLEANED_DATA_FILE: &str = "cleaned_data.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const REFINED_DATA_FILE: &str = "refined_data.json";
pub const ACTIVITY_LOG_FILE: &str = "log.json";

pub const DEFAULT_BLOB_NAME: &str = "refined_data";
pub const DEFAULT_BLOB_EXTENSION: &str = "blob";

pub const REDACTION_TOKEN: &str = "[MASKED]";

/// spaCy-style labels removed by the anonymizer unless configured otherwise
pub const DEFAULT_MASKED_TYPES: &[&str] = &["PERSON", "EMAIL", "DATE", "GPE", "ORG", "CARDINAL"];

pub const DEFAULT_API_KEY: &str = "12345";
pub const API_KEY_HEADER: &str = "x-api-key";
pub const DEFAULT_MIN_INTERVAL_SECS: u64 = 5;

pub const ACTION_OPTIMIZE: &str = "optimize";
pub const ACTION_RETRIEVE: &str = "retrieve";

pub const SUCCESS_MESSAGE: &str = "Data optimized successfully!";
