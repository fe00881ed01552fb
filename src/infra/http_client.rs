use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

use crate::error::{OptimizerError, Result};

/// Thin JSON-over-HTTP client shared by the remote inference adapters
#[derive(Clone)]
pub struct InferenceHttp {
    client: reqwest::Client,
    bearer_token: Option<String>,
}

impl InferenceHttp {
    pub fn new(timeout: Duration, bearer_token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OptimizerError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, bearer_token })
    }

    /// POST `{"inputs": text}` and return the decoded JSON response
    pub async fn infer(&self, url: &str, text: &str) -> Result<Value> {
        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&serde_json::json!({ "inputs": text }));
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| OptimizerError::Classification(format!("inference request to {} failed: {}", url, e)))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OptimizerError::Classification(format!(
                "inference endpoint {} returned {}: {}",
                url, status, body
            )));
        }
        resp.json::<Value>()
            .await
            .map_err(|e| OptimizerError::Classification(format!("invalid inference response from {}: {}", url, e)))
    }
}
