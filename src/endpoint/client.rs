//! HTTP client for the answer endpoint.

use std::time::Duration;

use async_trait::async_trait;

use super::request::{AnswerResponse, OutboundRequest};
use crate::config::ClientConfig;
use crate::error::EndpointError;

/// Anything that can turn an outbound request into an answer.
#[async_trait]
pub trait AnswerClient: Send + Sync {
    /// Post `request` and return the `answer` field of the response.
    async fn ask(&self, request: &OutboundRequest) -> Result<String, EndpointError>;
}

/// `AnswerClient` backed by reqwest.
pub struct HttpAnswerClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpAnswerClient {
    pub fn new(config: &ClientConfig) -> Result<Self, EndpointError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| EndpointError::Client(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout: config.request_timeout,
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> EndpointError {
        if e.is_timeout() {
            EndpointError::Timeout {
                endpoint: self.endpoint.clone(),
                timeout: self.timeout,
            }
        } else {
            EndpointError::Transport {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl AnswerClient for HttpAnswerClient {
    async fn ask(&self, request: &OutboundRequest) -> Result<String, EndpointError> {
        tracing::info!(endpoint = %self.endpoint, kind = %request.kind(), "Sending request");

        let resp = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                body = %body.chars().take(200).collect::<String>(),
                "Endpoint returned an error status"
            );
            return Err(EndpointError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        let parsed: AnswerResponse =
            serde_json::from_str(&body).map_err(|e| EndpointError::MalformedBody {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(answer_len = parsed.answer.len(), "Received answer");
        Ok(parsed.answer)
    }
}
