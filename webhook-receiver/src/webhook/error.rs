//! Payload failure taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

/// Failures after the signature gate.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The request body could not be read.
    #[error("failed to read request body: {0}")]
    UnreadableBody(String),

    /// The body is not a JSON object.
    #[error("invalid JSON payload: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// The body is JSON but does not fit the schema named by `data_type`.
    #[error("failed to parse {data_type} payload: {source}")]
    Decode {
        data_type: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl PayloadError {
    /// Status code used when this error ends the request.
    ///
    /// `Decode` is reported as a handled request, so it maps to 200.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PayloadError::UnreadableBody(_) | PayloadError::MalformedJson(_) => {
                StatusCode::BAD_REQUEST
            }
            PayloadError::Decode { .. } => StatusCode::OK,
        }
    }
}
