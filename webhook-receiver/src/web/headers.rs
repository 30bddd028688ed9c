//! Webhook request headers.

use axum::http::HeaderMap;

pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Webhook-Timestamp";
pub const WEBHOOK_ID_HEADER: &str = "X-Webhook-ID";
pub const IDEMPOTENCY_KEY_HEADER: &str = "X-Idempotency-Key";

/// Set on every successfully routed webhook response.
pub const RECEIVED_HEADER: &str = "X-Webhook-Received";

/// Headers sent alongside a webhook. Blank or non-UTF-8 values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookHeaders {
    pub signature: Option<String>,
    pub timestamp: Option<String>,
    /// Informational only
    pub webhook_id: Option<String>,
    /// Informational only, no deduplication is done with it
    pub idempotency_key: Option<String>,
}

impl WebhookHeaders {
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        Self {
            signature: header_value(headers, SIGNATURE_HEADER),
            timestamp: header_value(headers, TIMESTAMP_HEADER),
            webhook_id: header_value(headers, WEBHOOK_ID_HEADER),
            idempotency_key: header_value(headers, IDEMPOTENCY_KEY_HEADER),
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
