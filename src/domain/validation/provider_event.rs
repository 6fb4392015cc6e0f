//! Delivery provider webhook payloads.
//!
//! Only fields relevant to reconciliation are captured; everything else in
//! the provider's envelope is ignored.

use serde::{Deserialize, Serialize};

/// Delivery provider webhook event (simplified).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderEvent {
    /// Record type, e.g. "Delivery", "Bounce".
    #[serde(rename = "RecordType", default)]
    pub record_type: Option<String>,

    /// Recipient address on Open and Delivery records.
    #[serde(rename = "Recipient", default)]
    pub recipient: Option<String>,

    /// Recipient address on Bounce and SpamComplaint records.
    #[serde(rename = "Email", default)]
    pub email: Option<String>,

    /// Provider message identifier; the correlation token.
    #[serde(rename = "MessageID", default)]
    pub message_id: Option<String>,

    #[serde(rename = "ReceivedAt", default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<String>,

    #[serde(rename = "DeliveredAt", default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<String>,

    #[serde(rename = "BouncedAt", default, skip_serializing_if = "Option::is_none")]
    pub bounced_at: Option<String>,

    /// Free-form metadata attached when the message was sent.
    #[serde(rename = "Metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Record types the normalizer understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRecordType {
    Open,
    Delivery,
    Bounce,
    SpamComplaint,
    /// Anything else (SubscriptionChange, Click, ...). Skipped, not an error.
    Unsupported(String),
}

impl ProviderRecordType {
    /// Parse record type from the payload string.
    pub fn from_str(s: &str) -> Self {
        match s {
            "Open" => Self::Open,
            "Delivery" => Self::Delivery,
            "Bounce" => Self::Bounce,
            "SpamComplaint" => Self::SpamComplaint,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Convert to the payload string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "Open",
            Self::Delivery => "Delivery",
            Self::Bounce => "Bounce",
            Self::SpamComplaint => "SpamComplaint",
            Self::Unsupported(s) => s,
        }
    }
}

impl ProviderEvent {
    /// Parses a raw webhook body.
    pub fn from_slice(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Recipient address, preferring `Recipient` over `Email`.
    pub fn recipient_address(&self) -> Option<&str> {
        self.recipient
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.email.as_deref().filter(|s| !s.trim().is_empty()))
    }

    /// Looks up a string value in the event metadata.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key)?.as_str()
    }
}

/// Builder for creating test ProviderEvent instances.
#[cfg(test)]
pub struct ProviderEventBuilder {
    event: ProviderEvent,
}

#[cfg(test)]
impl Default for ProviderEventBuilder {
    fn default() -> Self {
        Self {
            event: ProviderEvent {
                record_type: Some("Delivery".to_string()),
                recipient: Some("c1@example.com".to_string()),
                message_id: Some("m1".to_string()),
                ..ProviderEvent::default()
            },
        }
    }
}

#[cfg(test)]
impl ProviderEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_type(mut self, record_type: impl Into<String>) -> Self {
        self.event.record_type = Some(record_type.into());
        self
    }

    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.event.recipient = Some(recipient.into());
        self
    }

    pub fn without_recipient(mut self) -> Self {
        self.event.recipient = None;
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.event.email = Some(email.into());
        self
    }

    pub fn message_id(mut self, message_id: impl Into<String>) -> Self {
        self.event.message_id = Some(message_id.into());
        self
    }

    pub fn without_message_id(mut self) -> Self {
        self.event.message_id = None;
        self
    }

    pub fn delivered_at(mut self, at: impl Into<String>) -> Self {
        self.event.delivered_at = Some(at.into());
        self
    }

    pub fn bounced_at(mut self, at: impl Into<String>) -> Self {
        self.event.bounced_at = Some(at.into());
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.event.metadata = Some(metadata);
        self
    }

    pub fn build(self) -> ProviderEvent {
        self.event
    }
}
