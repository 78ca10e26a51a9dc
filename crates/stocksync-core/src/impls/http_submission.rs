//! HTTP client for the confirm-products endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::ServerConfig;
use crate::domain::{OrderPayload, SubmissionError, SubmissionReceipt};
use crate::ports::OrderSubmissionService;

/// Body returned by `POST /api/confirm-products/`.
#[derive(Debug, Deserialize)]
struct ConfirmResponse {
    success: bool,
    #[serde(default)]
    order_number: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Longest response excerpt kept in an error message.
const BODY_EXCERPT_LEN: usize = 200;

/// Delivers orders to the warehouse server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSubmissionService {
    client: Client,
    url: String,
    csrf_token: Option<String>,
}

impl HttpSubmissionService {
    /// Create a client from configuration.
    pub fn new(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: format!(
                "{}/{}",
                config.base_url.trim_end_matches('/'),
                config.confirm_path.trim_start_matches('/')
            ),
            csrf_token: config.csrf_token.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(err: reqwest::Error) -> SubmissionError {
        if err.is_timeout() {
            SubmissionError::Timeout
        } else {
            SubmissionError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl OrderSubmissionService for HttpSubmissionService {
    async fn submit(&self, payload: &OrderPayload) -> Result<SubmissionReceipt, SubmissionError> {
        let mut request = self.client.post(&self.url).json(payload);
        if let Some(token) = &self.csrf_token {
            request = request.header("X-CSRFToken", token);
        }

        let response = request.send().await.map_err(Self::transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(Self::transport_error)?;

        match serde_json::from_str::<ConfirmResponse>(&body) {
            Ok(parsed) if parsed.success => Ok(SubmissionReceipt {
                order_number: parsed.order_number,
                message: parsed.message,
            }),
            Ok(parsed) => Err(SubmissionError::Rejected {
                status,
                message: parsed
                    .error
                    .unwrap_or_else(|| format!("request failed with HTTP {status}")),
            }),
            Err(_) => Err(SubmissionError::InvalidResponse {
                status,
                message: body.chars().take(BODY_EXCERPT_LEN).collect(),
            }),
        }
    }
}
