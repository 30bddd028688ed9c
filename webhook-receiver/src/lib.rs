//! Webhook Receiver - signed webhook intake for energy consumption and
//! billing events.
//!
//! This library provides the modules shared by the two binaries:
//! - `webhook-receiver`: HTTP server accepting signed webhooks
//! - `webhook-send`: demo client that signs and sends sample payloads
//!
//! ## Request Flow
//!
//! ```text
//! raw body → SignatureVerifier → classify → decode → process → AcknowledgmentResponse
//! ```

pub mod config;
pub mod web;
pub mod webhook;

// Re-export commonly used types
pub use config::{Config, RunMode};
pub use web::{build_router, sign_payload, AppState, SignatureError, SignatureVerifier};
pub use webhook::{
    handle_payload, AcknowledgmentResponse, BillingEvent, ConsumptionReport, DataType, Outcome,
    PayloadError, WebhookEnvelope,
};
