//! HTTP Validation Provider - Implementation of ValidationProvider over the
//! delivery provider's single-address check endpoint.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpValidationConfig::new(api_key)
//!     .with_base_url("https://api.provider.example")
//!     .with_timeout(Duration::from_secs(10));
//!
//! let provider = HttpValidationProvider::new(config)?;
//! ```
//!
//! The endpoint is `GET {base_url}/v1/validate?email=<address>` with the key
//! in `X-Api-Key`, answering `{"Verdict": .., "QueryID": .., "SuggestedCorrection": ..}`.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::EmailAddress;
use crate::domain::validation::Deliverability;
use crate::ports::{ProviderError, ProviderVerdict, ValidationProvider};

/// Configuration for the HTTP validation provider.
#[derive(Debug, Clone)]
pub struct HttpValidationConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpValidationConfig {
    pub fn new(api_key: Secret<String>) -> Self {
        Self {
            api_key,
            base_url: "http://localhost:8025".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Wire format of the check response.
#[derive(Debug, Deserialize)]
struct VerdictBody {
    #[serde(rename = "Verdict")]
    verdict: Option<String>,
    #[serde(rename = "QueryID", default)]
    query_id: Option<String>,
    #[serde(rename = "SuggestedCorrection", default)]
    suggested_correction: Option<String>,
}

/// Provider backed by the delivery provider's HTTP API.
pub struct HttpValidationProvider {
    config: HttpValidationConfig,
    client: Client,
}

impl HttpValidationProvider {
    pub fn new(config: HttpValidationConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn validate_url(&self) -> String {
        format!("{}/v1/validate", self.config.base_url.trim_end_matches('/'))
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(ProviderError::AuthenticationFailed),
            code => Err(ProviderError::Http {
                status: code,
                message: body,
            }),
        }
    }
}

/// Parses a check response body.
fn parse_verdict_body(body: &str) -> Result<ProviderVerdict, ProviderError> {
    let parsed: VerdictBody = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

    let verdict = parsed
        .verdict
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ProviderError::MalformedResponse("missing Verdict".to_string()))?;

    Ok(ProviderVerdict {
        deliverability: Deliverability::from_provider(&verdict),
        query_id: parsed.query_id.filter(|q| !q.trim().is_empty()),
        suggested_correction: parsed.suggested_correction.filter(|s| !s.trim().is_empty()),
    })
}

#[async_trait]
impl ValidationProvider for HttpValidationProvider {
    async fn verify(&self, email: &EmailAddress) -> Result<ProviderVerdict, ProviderError> {
        let response = self
            .client
            .get(self.validate_url())
            .header("X-Api-Key", self.config.api_key())
            .header("Accept", "application/json")
            .query(&[("email", email.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    ProviderError::Network(format!("Connection failed: {}", e))
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let response = self.handle_response_status(response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        parse_verdict_body(&body)
    }

    fn name(&self) -> &str {
        "http"
    }
}
