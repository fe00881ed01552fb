use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::app::ports::{ActivityLogPort, ArtifactStorePort};
use crate::constants::{ACTION_RETRIEVE, REFINED_DATA_FILE};
use crate::domain::LogEntry;
use crate::error::{OptimizerError, Result};
use crate::infra::rate_limiter::RateLimiter;
use crate::observability::metrics;

/// Process-lifetime access state: the static key and per-key call stamps
pub struct AccessContext {
    api_key: String,
    limiter: RateLimiter,
}

impl AccessContext {
    pub fn new(api_key: impl Into<String>, limiter: RateLimiter) -> Self {
        Self {
            api_key: api_key.into(),
            limiter,
        }
    }

    /// Key check first, then the interval check. Only accepted calls move the stamp.
    pub fn admit(&self, presented: Option<&str>, now: Instant) -> Result<()> {
        let key = match presented {
            Some(key) if key == self.api_key => key,
            _ => return Err(OptimizerError::Unauthorized),
        };
        self.limiter.check_at(key, now)
    }
}

/// Serves the last persisted refined batch to authenticated callers
pub struct RetrieveUseCase {
    access: AccessContext,
    artifacts: Arc<dyn ArtifactStorePort>,
    activity_log: Arc<dyn ActivityLogPort>,
}

impl RetrieveUseCase {
    pub fn new(
        access: AccessContext,
        artifacts: Arc<dyn ArtifactStorePort>,
        activity_log: Arc<dyn ActivityLogPort>,
    ) -> Self {
        Self {
            access,
            artifacts,
            activity_log,
        }
    }

    pub async fn execute(&self, api_key: Option<&str>) -> Result<Value> {
        self.execute_at(api_key, Instant::now()).await
    }

    pub async fn execute_at(&self, api_key: Option<&str>, now: Instant) -> Result<Value> {
        if let Err(e) = self.access.admit(api_key, now) {
            debug!(reason = e.kind(), "retrieval rejected");
            metrics::retrieval::rejected(e.kind());
            return Err(e);
        }

        let data = match self.artifacts.read_json(REFINED_DATA_FILE).await? {
            Some(data) => data,
            None => {
                metrics::retrieval::rejected("not_found");
                return Err(OptimizerError::NotFound(REFINED_DATA_FILE.to_string()));
            }
        };

        let records = data.as_array().map(|a| a.len()).unwrap_or(0);
        self.activity_log
            .append(LogEntry::now(ACTION_RETRIEVE, records))
            .await?;
        metrics::retrieval::served();
        info!(records, "served refined batch");
        Ok(data)
    }
}
