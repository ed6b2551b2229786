use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;

use super::constants::{self, headers};
use super::models::{ApiEnvelope, ChaptersBody, NewExerciseBody};
use super::resilience::{ResilienceConfig, RetryPolicy};
use super::RemoteDocument;
use crate::config::Settings;
use crate::content::{Chapter, Exercise};
use crate::error::NetworkError;

/// REST client for the chapter document API with connection pooling and retries
#[derive(Clone)]
pub struct ContentApiClient {
    base_url: String,
    http_client: reqwest::Client,
    retry_policy: RetryPolicy,
}

fn classify(url: &str, error: reqwest::Error) -> NetworkError {
    let url = url.to_string();
    if error.is_timeout() {
        NetworkError::Timeout { url }
    } else if error.is_decode() || error.is_body() {
        NetworkError::Decode {
            url,
            message: error.to_string(),
        }
    } else if let Some(status) = error.status() {
        NetworkError::Status {
            url,
            status: status.as_u16(),
            message: error.to_string(),
        }
    } else {
        NetworkError::Unreachable {
            url,
            message: error.to_string(),
        }
    }
}

impl ContentApiClient {
    pub fn new(base_url: impl Into<String>, resilience: ResilienceConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .timeout(resilience.request_timeout)
            .connect_timeout(resilience.connect_timeout)
            .user_agent(headers::USER_AGENT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
            retry_policy: RetryPolicy::new(resilience.retry),
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(
            settings.api_base_url.clone(),
            ResilienceConfig::from_settings(settings),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header(reqwest::header::ACCEPT, headers::ACCEPT_JSON)
            .header(headers::REQUEST_ID, uuid::Uuid::new_v4().to_string())
    }

    /// One request, decoded as JSON (an empty body decodes as `null`)
    async fn attempt<B: Serialize + Sync>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<Value, NetworkError> {
        let mut request = self.request(method, url);
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, headers::CONTENT_TYPE_JSON)
                .json(body);
        }
        let response = request.send().await.map_err(|e| classify(url, e))?;
        Self::read_json(url, response).await
    }

    /// Send with retries. Only for requests that are safe to repeat.
    async fn send_json<B: Serialize + Sync>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Value, NetworkError> {
        let url = constants::endpoint_url(&self.base_url, endpoint);
        debug!("{} {}", method, url);

        let url = url.as_str();
        self.retry_policy
            .execute(move || self.attempt(method.clone(), url, body))
            .await
    }

    /// Send exactly once: the server may have applied the request even when
    /// the answer never arrives, so a retry could apply it twice
    async fn send_json_once<B: Serialize + Sync>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Value, NetworkError> {
        let url = constants::endpoint_url(&self.base_url, endpoint);
        debug!("{} {} (no retry)", method, url);
        self.attempt(method, &url, body).await
    }

    async fn read_json(url: &str, response: Response) -> Result<Value, NetworkError> {
        let status = response.status();
        let text = response.text().await.map_err(|e| classify(url, e))?;

        if !status.is_success() {
            // Prefer the server's own `{error}` explanation when it sent one
            let message = serde_json::from_str::<ApiEnvelope>(&text)
                .map(|envelope| envelope.reason())
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("error").to_string());
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| NetworkError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    fn envelope(endpoint: &str, value: Value) -> Result<ApiEnvelope, NetworkError> {
        if value.is_null() {
            return Ok(ApiEnvelope::default());
        }
        serde_json::from_value(value).map_err(|e| NetworkError::Decode {
            url: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl RemoteDocument for ContentApiClient {
    async fn fetch_document(&self) -> Result<Value, NetworkError> {
        self.send_json::<()>(Method::GET, constants::CHAPTERS_ENDPOINT, None)
            .await
    }

    async fn save_chapters(&self, chapters: &[Chapter]) -> Result<ApiEnvelope, NetworkError> {
        info!("Saving {} chapters to {}", chapters.len(), self.base_url);
        let body = ChaptersBody {
            chapitres: chapters,
        };
        let value = self
            .send_json(Method::POST, constants::CHAPTERS_ENDPOINT, Some(&body))
            .await?;
        Self::envelope(constants::CHAPTERS_ENDPOINT, value)
    }

    async fn create_exercise(
        &self,
        step_id: &str,
        body: &NewExerciseBody,
    ) -> Result<Value, NetworkError> {
        let endpoint = constants::step_exercises_endpoint(step_id);
        // The server assigns a new id per call: never repeat this POST
        self.send_json_once(Method::POST, &endpoint, Some(body)).await
    }

    async fn update_exercise(&self, exercise: &Exercise) -> Result<Value, NetworkError> {
        let endpoint = constants::exercise_endpoint(&exercise.id);
        self.send_json(Method::PUT, &endpoint, Some(exercise)).await
    }

    async fn delete_exercise(&self, exercise_id: &str) -> Result<ApiEnvelope, NetworkError> {
        let endpoint = constants::exercise_endpoint(exercise_id);
        let value = self
            .send_json::<()>(Method::DELETE, &endpoint, None)
            .await?;
        Self::envelope(&endpoint, value)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalised() {
        let client =
            ContentApiClient::new("http://localhost:5000/api/", ResilienceConfig::disabled()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(client.describe(), "http://localhost:5000/api");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_network_error() {
        // Port 9 (discard) is closed on test machines
        let client =
            ContentApiClient::new("http://127.0.0.1:9", ResilienceConfig::disabled()).unwrap();
        let err = client.fetch_document().await.unwrap_err();
        assert!(matches!(
            err,
            NetworkError::Unreachable { .. } | NetworkError::Timeout { .. }
        ));
    }

    #[tokio::test]
    #[ignore] // needs the content API running on localhost:5000
    async fn test_live_fetch() {
        let client = ContentApiClient::from_settings(&Settings::default()).unwrap();
        let document = client.fetch_document().await.unwrap();
        assert!(document.is_array() || document.get("chapitres").is_some());
    }
}
