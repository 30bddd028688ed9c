//! Webhook payload pipeline.
//!
//! Runs on a body that already passed signature verification:
//!
//! ```text
//! raw body → classify() → decode() → process() → Outcome
//! ```

pub mod classify;
pub mod decode;
pub mod error;
pub mod process;
pub mod response;
pub mod types;

use tracing::{info, warn};

pub use classify::classify;
pub use decode::decode;
pub use error::PayloadError;
pub use process::{process, Outcome};
pub use response::AcknowledgmentResponse;
pub use types::{
    Bill, BillingEvent, ConsumptionReport, ConsumptionSummary, ContractConsumption, DataType,
    EnergyMetrics, Payment, ReportPeriod, WebhookEnvelope,
};

/// Classify, decode and process a verified body.
///
/// Only malformed JSON is returned as an error. A body that fails to decode
/// into its variant becomes an unprocessed outcome carrying the parse error.
pub fn handle_payload(body: &[u8]) -> Result<Outcome, PayloadError> {
    let data_type = classify(body)?;
    info!(data_type = %data_type.as_str(), "webhook_classified");

    match decode(data_type, body) {
        Ok(envelope) => Ok(process(&envelope)),
        Err(e @ PayloadError::Decode { .. }) => {
            warn!(error = %e, "webhook_decode_failed");
            Ok(Outcome::rejected(e.to_string()))
        }
        Err(e) => Err(e),
    }
}
