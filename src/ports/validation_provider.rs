//! ValidationProvider port - the provider's single-address deliverability query.
//!
//! The provider is an opaque oracle. Every failure mode is a `ProviderError`;
//! callers treat them uniformly as "check failed, try again next pass".

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::EmailAddress;
use crate::domain::validation::Deliverability;

/// Port for querying address deliverability.
#[async_trait]
pub trait ValidationProvider: Send + Sync {
    /// Checks one address.
    async fn verify(&self, email: &EmailAddress) -> Result<ProviderVerdict, ProviderError>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

/// Parsed answer to a deliverability query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderVerdict {
    pub deliverability: Deliverability,
    /// Provider-assigned id for this query, used as the correlation token.
    pub query_id: Option<String>,
    /// Likely-intended address when the provider spots a typo.
    pub suggested_correction: Option<String>,
}

impl ProviderVerdict {
    pub fn new(deliverability: Deliverability) -> Self {
        Self {
            deliverability,
            query_id: None,
            suggested_correction: None,
        }
    }

    pub fn with_query_id(mut self, query_id: impl Into<String>) -> Self {
        self.query_id = Some(query_id.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggested_correction = Some(suggestion.into());
        self
    }
}

/// Errors from the validation provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The call exceeded its deadline.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Provider responded with a non-success status.
    #[error("provider returned {status}: {message}")]
    Http { status: u16, message: String },

    /// Provider rejected our credentials.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Response body could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Short label for logs and counters.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Timeout { .. } => "timeout",
            ProviderError::Http { .. } => "http",
            ProviderError::AuthenticationFailed => "auth",
            ProviderError::MalformedResponse(_) => "malformed",
            ProviderError::Network(_) => "network",
        }
    }
}
