//! Web server module for receiving signed webhooks.
//!
//! This module provides:
//! - Signature verification over the raw request body
//! - The webhook, health and service-info handlers
//! - The router with CORS and request tracing

pub mod handlers;
pub mod headers;
pub mod router;
pub mod signature;

pub use handlers::{health, index, receive_webhook, AppState, HealthResponse, SERVICE_NAME};
pub use headers::WebhookHeaders;
pub use router::build_router;
pub use signature::{sign_payload, SignatureError, SignatureVerifier};
