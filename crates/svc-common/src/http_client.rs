use reqwest::Client;
use std::time::Duration;

/// A client for synchronous calls to a sibling service (booking → tenant
/// for settings, booking → resource for the availability schedule), bounded
/// by a fixed deadline so a slow peer degrades the caller rather than
/// hanging it.
#[derive(Debug, Clone)]
pub struct InternalServiceClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InternalCallError {
    #[error("request to {0} failed: {1}")]
    Request(String, String),
    #[error("{0} responded with status {1}")]
    Status(String, u16),
    #[error("failed to decode response from {0}: {1}")]
    Decode(String, String),
}

impl InternalServiceClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client configuration is static and always valid");
        Self { client, base_url }
    }

    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        bearer: &str,
    ) -> Result<T, InternalCallError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| InternalCallError::Request(url.clone(), e.to_string()))?;

        if !response.status().is_success() {
            return Err(InternalCallError::Status(url, response.status().as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| InternalCallError::Decode(url, e.to_string()))
    }
}
