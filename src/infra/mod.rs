pub mod activity_log;
pub mod artifact_store;
pub mod blob_store;
pub mod http_client;
pub mod inference;
pub mod rate_limiter;

use serde::Serialize;

use crate::error::{OptimizerError, Result};

/// Pretty JSON with four-space indentation, the layout of every on-disk artifact
pub(crate) fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| OptimizerError::storage("serialize artifact", e))?;
    Ok(buf)
}
