//! HTTP client helpers for tests.

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthResponse, TestClientError> {
        let resp = self.client.get(self.url("/api/health")).send().await?;
        expect_success(resp).await
    }

    pub async fn config(&self) -> Result<Value, TestClientError> {
        let resp = self.client.get(self.url("/api/config")).send().await?;
        expect_success(resp).await
    }

    pub async fn predict(&self, employee: &Value) -> Result<PredictResponse, TestClientError> {
        let resp = self
            .client
            .post(self.url("/api/predict-attrition"))
            .json(employee)
            .send()
            .await?;
        expect_success(resp).await
    }

    pub async fn predict_batch(&self, employees: &[Value]) -> Result<Value, TestClientError> {
        let resp = self
            .client
            .post(self.url("/api/predict-attrition-batch"))
            .json(&serde_json::json!({ "employees": employees }))
            .send()
            .await?;
        expect_success(resp).await
    }

    pub async fn evaluate(&self, employees: &[Value]) -> Result<Value, TestClientError> {
        let resp = self
            .client
            .post(self.url("/api/evaluate"))
            .json(&serde_json::json!({ "employees": employees }))
            .send()
            .await?;
        expect_success(resp).await
    }

    /// Posts raw bytes and returns status plus JSON body, whatever the status.
    pub async fn post_raw(
        &self,
        path: &str,
        body: Vec<u8>,
    ) -> Result<(u16, Value), TestClientError> {
        let resp = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }
}

async fn expect_success<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, TestClientError> {
    match resp.status().as_u16() {
        200 => Ok(resp.json().await?),
        400 => Err(TestClientError::BadRequest(resp.json().await?)),
        status => {
            let body = resp.text().await.unwrap_or_default();
            Err(TestClientError::UnexpectedStatus(status, body))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub model_loaded: bool,
    pub accuracy: String,
    pub fields: Vec<String>,
    pub artifact_fingerprint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    pub prediction: Prediction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub risk_score: f64,
    pub risk_percentage: f64,
    pub risk_category: String,
    pub factors: Vec<String>,
    pub prediction_details: Value,
    pub employee_id: String,
    pub employee_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0} - Body: {1}")]
    UnexpectedStatus(u16, String),

    #[error("Bad request: {0}")]
    BadRequest(Value),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_url_building() {
        let client = TestClient::new("http://localhost:5000");
        assert_eq!(client.url("/api/health"), "http://localhost:5000/api/health");
        assert_eq!(client.url("api/health"), "http://localhost:5000/api/health");
    }
}
