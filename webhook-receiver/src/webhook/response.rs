//! Acknowledgment envelope returned for every request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::process::Outcome;

/// `{success, message, processed, timestamp}` body sent back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcknowledgmentResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub processed: bool,
    pub timestamp: DateTime<Utc>,
}

impl AcknowledgmentResponse {
    /// Wrap a processor outcome. The request was handled, so `success` is
    /// always true here.
    pub fn from_outcome(outcome: Outcome) -> Self {
        Self {
            success: true,
            message: outcome.message,
            processed: outcome.processed,
            timestamp: Utc::now(),
        }
    }

    /// Response for requests rejected before processing.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            processed: false,
            timestamp: Utc::now(),
        }
    }
}
