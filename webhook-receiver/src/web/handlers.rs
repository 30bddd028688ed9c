//! Webhook endpoint handlers.
//!
//! The webhook handler runs the whole pipeline inline:
//! 1. Check signature/timestamp headers and timestamp freshness
//! 2. Verify the HMAC over the raw body bytes
//! 3. Classify, decode and process the payload
//! 4. Acknowledge
//!
//! Nothing is decoded before the signature has been verified.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::web::headers::{WebhookHeaders, RECEIVED_HEADER};
use crate::web::signature::{SignatureError, SignatureVerifier};
use crate::webhook::{handle_payload, AcknowledgmentResponse, PayloadError};
use crate::Config;

/// Name reported by the health and index endpoints.
pub const SERVICE_NAME: &str = "webhook-receiver";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub verifier: Arc<SignatureVerifier>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let verifier = config.signature_verifier();
        Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        timestamp: Utc::now(),
    })
}

// =============================================================================
// Service Info
// =============================================================================

#[derive(Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: EndpointList,
}

#[derive(Serialize)]
pub struct EndpointList {
    pub health: &'static str,
    pub webhook: &'static str,
}

/// Service information endpoint. Only routed outside production.
pub async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        endpoints: EndpointList {
            health: "GET /health",
            webhook: "POST /webhook (requires signature verification)",
        },
    })
}

// =============================================================================
// Webhook
// =============================================================================

/// Webhook endpoint.
///
/// Status codes:
/// - 200: handled, including unknown types and incomplete payloads
/// - 400: unreadable body or malformed JSON
/// - 401: any signature or timestamp failure
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let headers = WebhookHeaders::from_header_map(&headers);

    info!(
        webhook_id = ?headers.webhook_id,
        idempotency_key = ?headers.idempotency_key,
        has_signature = headers.signature.is_some(),
        has_timestamp = headers.timestamp.is_some(),
        "webhook_received"
    );

    let signature = match state.verifier.check_timestamp(
        Utc::now(),
        headers.signature.as_deref(),
        headers.timestamp.as_deref(),
    ) {
        Ok(signature) => signature,
        Err(e) => return signature_failure(&headers, e),
    };

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let e = PayloadError::UnreadableBody(rejection.body_text());
            warn!(error = %e, "webhook_body_unreadable");
            return failure(e.status_code(), e.to_string());
        }
    };

    if let Err(e) = state.verifier.verify_signature(&body, signature) {
        return signature_failure(&headers, e);
    }

    let outcome = match handle_payload(&body) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(
                webhook_id = ?headers.webhook_id,
                body_length = body.len(),
                error = %e,
                "webhook_payload_rejected"
            );
            return failure(e.status_code(), e.to_string());
        }
    };

    info!(
        webhook_id = ?headers.webhook_id,
        processed = outcome.processed,
        "webhook_acknowledged"
    );

    (
        StatusCode::OK,
        [(RECEIVED_HEADER, "true")],
        Json(AcknowledgmentResponse::from_outcome(outcome)),
    )
        .into_response()
}

fn signature_failure(headers: &WebhookHeaders, error: SignatureError) -> Response {
    warn!(
        webhook_id = ?headers.webhook_id,
        error = %error,
        "webhook_signature_invalid"
    );
    failure(error.status_code(), error.to_string())
}

fn failure(status: StatusCode, message: String) -> Response {
    (status, Json(AcknowledgmentResponse::failure(message))).into_response()
}
