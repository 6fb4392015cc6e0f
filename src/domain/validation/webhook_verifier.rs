//! Webhook signature verification.
//!
//! Callbacks are signed with HMAC-SHA256 over `"<timestamp>.<body>"` and sent
//! in the `X-Webhook-Signature` header as `t=<unix secs>,v1=<hex digest>`.
//! Timestamps outside the acceptance window are rejected to stop replays.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

/// Maximum allowed age for signed callbacks (5 minutes).
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future timestamps (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components of the signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub v1_signature: Vec<u8>,
}

impl SignatureHeader {
    /// Parses `t=<timestamp>,v1=<signature>`. Unknown keys are ignored.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::BadRequest("invalid signature header".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::BadRequest("invalid signature timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signature = Some(hex::decode(value).map_err(|_| {
                        WebhookError::BadRequest("invalid v1 signature hex".to_string())
                    })?);
                }
                _ => {}
            }
        }

        Ok(SignatureHeader {
            timestamp: timestamp
                .ok_or_else(|| WebhookError::BadRequest("missing signature timestamp".into()))?,
            v1_signature: v1_signature
                .ok_or_else(|| WebhookError::BadRequest("missing v1 signature".into()))?,
        })
    }
}

/// Verifies signed webhook callbacks.
pub struct WebhookVerifier {
    secret: Secret<String>,
}

impl WebhookVerifier {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret }
    }

    /// Verifies `payload` against the signature header using the current time.
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<(), WebhookError> {
        self.verify_at(payload, signature_header, chrono::Utc::now().timestamp())
    }

    /// Verifies `payload` against the signature header at `now` (unix secs).
    pub fn verify_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<(), WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        let age = now
            .checked_sub(header.timestamp)
            .ok_or(WebhookError::InvalidTimestamp)?;
        if age > MAX_EVENT_AGE_SECS {
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }

        let expected = self.compute_signature(header.timestamp, payload)?;
        if !constant_time_compare(&expected, &header.v1_signature) {
            return Err(WebhookError::InvalidSignature);
        }
        Ok(())
    }

    /// Produces a header value for `payload` signed at `timestamp`.
    pub fn sign(&self, timestamp: i64, payload: &[u8]) -> Result<String, WebhookError> {
        let signature = self.compute_signature(timestamp, payload)?;
        Ok(format!("t={},v1={}", timestamp, hex::encode(signature)))
    }

    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
