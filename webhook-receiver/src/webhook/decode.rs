//! Second phase of decoding: the full variant shape for a classified body.

use super::error::PayloadError;
use super::types::{
    BillingEvent, ConsumptionReport, DataType, WebhookEnvelope, DATA_TYPE_BILLS,
    DATA_TYPE_CONSUMPTION,
};

/// Decode `body` into the variant selected by `data_type`.
///
/// Unknown types are not decoded at all.
pub fn decode(data_type: DataType, body: &[u8]) -> Result<WebhookEnvelope, PayloadError> {
    match data_type {
        DataType::Consumption => serde_json::from_slice::<ConsumptionReport>(body)
            .map(WebhookEnvelope::Consumption)
            .map_err(|source| PayloadError::Decode {
                data_type: DATA_TYPE_CONSUMPTION,
                source,
            }),
        DataType::Bills => serde_json::from_slice::<BillingEvent>(body)
            .map(WebhookEnvelope::Bills)
            .map_err(|source| PayloadError::Decode {
                data_type: DATA_TYPE_BILLS,
                source,
            }),
        DataType::Unknown(data_type) => Ok(WebhookEnvelope::Unknown { data_type }),
    }
}
