use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::{OptimizerError, Result};

/// Fixed-window limiter: at most one accepted call per key per `min_interval`.
///
/// Only accepted calls move the window; rejected calls leave the last
/// timestamp as it was.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_calls: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn check(&self, key: &str) -> Result<()> {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> Result<()> {
        let mut last_calls = self
            .last_calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(last) = last_calls.get(key) {
            if now.saturating_duration_since(*last) < self.min_interval {
                return Err(OptimizerError::RateLimited);
            }
        }
        last_calls.insert(key.to_string(), now);
        Ok(())
    }
}
