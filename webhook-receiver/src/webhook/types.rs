//! Webhook envelope shapes.
//!
//! Every payload carries a `data_type` discriminator. The two known families
//! are energy consumption reports (`consumption`) and billing events (`bills`).
//! Anything else is kept as [`WebhookEnvelope::Unknown`] and accepted as-is.
//!
//! Decoding is lenient about absent fields (they fall back to their defaults,
//! which the processor then flags) but strict about present fields with the
//! wrong JSON type. An explicit `null` counts as absent. Nested blocks must be
//! JSON objects; serde's derive would otherwise also accept an array.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `data_type` value for consumption reports.
pub const DATA_TYPE_CONSUMPTION: &str = "consumption";

/// `data_type` value for billing events.
pub const DATA_TYPE_BILLS: &str = "bills";

/// Result of peeking at the `data_type` discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Consumption,
    Bills,
    /// Unrecognized or absent discriminator. Empty when the field is missing
    /// or null.
    Unknown(String),
}

impl DataType {
    pub fn as_str(&self) -> &str {
        match self {
            DataType::Consumption => DATA_TYPE_CONSUMPTION,
            DataType::Bills => DATA_TYPE_BILLS,
            DataType::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for DataType {
    fn from(raw: &str) -> Self {
        match raw {
            DATA_TYPE_CONSUMPTION => DataType::Consumption,
            DATA_TYPE_BILLS => DataType::Bills,
            other => DataType::Unknown(other.to_string()),
        }
    }
}

/// A fully decoded webhook.
#[derive(Debug, Clone)]
pub enum WebhookEnvelope {
    Consumption(ConsumptionReport),
    Bills(BillingEvent),
    Unknown { data_type: String },
}

impl WebhookEnvelope {
    pub fn data_type(&self) -> &str {
        match self {
            WebhookEnvelope::Consumption(_) => DATA_TYPE_CONSUMPTION,
            WebhookEnvelope::Bills(_) => DATA_TYPE_BILLS,
            WebhookEnvelope::Unknown { data_type } => data_type,
        }
    }
}

// =============================================================================
// Consumption Reports
// =============================================================================

/// Energy consumption report for a single contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumptionReport {
    #[serde(deserialize_with = "null_as_default")]
    pub webhook_id: i64,
    /// Aggregation granularity (e.g. "hour", "day", "month")
    #[serde(deserialize_with = "null_as_default")]
    pub group_by: String,
    /// Delivery cadence (e.g. "daily")
    #[serde(deserialize_with = "null_as_default")]
    pub send_interval: String,
    #[serde(deserialize_with = "object")]
    pub period: ReportPeriod,
    /// Contract block. Sent under the `data` key.
    #[serde(rename = "data", deserialize_with = "object")]
    pub contract: ContractConsumption,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Date range covered by a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportPeriod {
    /// "2025-10-08"
    #[serde(deserialize_with = "null_as_default")]
    pub start_date: String,
    /// "2025-10-09"
    #[serde(deserialize_with = "null_as_default")]
    pub end_date: String,
}

/// Consumption data for one contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConsumption {
    #[serde(deserialize_with = "null_as_default")]
    pub contract_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub contract_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sic: String,
    /// Shape depends on `group_by`, see [`ConsumptionSummary::interpret`].
    pub consumption: Value,
}

/// Energy readings shared by every consumption row. All optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_export: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inductive_penalized: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactive_capacitive: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyConsumption {
    /// 0-23
    pub hour: u8,
    #[serde(flatten)]
    pub metrics: EnergyMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyConsumption {
    pub date: String,
    #[serde(flatten)]
    pub metrics: EnergyMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyConsumption {
    /// "2025-10"
    pub month: String,
    #[serde(flatten)]
    pub metrics: EnergyMetrics,
}

/// One day broken down into its hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateAndHourlyConsumption {
    pub date: String,
    #[serde(default)]
    pub hours: Vec<HourlyConsumption>,
}

/// Typed view over the opaque `consumption` value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsumptionSummary {
    Hourly(Vec<HourlyConsumption>),
    Daily(Vec<DailyConsumption>),
    Monthly(Vec<MonthlyConsumption>),
    DateAndHourly(Vec<DateAndHourlyConsumption>),
    /// Grouping we have no typed shape for.
    Raw(Value),
}

impl ConsumptionSummary {
    /// Interpret a `consumption` value according to the report's `group_by`.
    ///
    /// A single object is accepted as a one-row list.
    pub fn interpret(group_by: &str, consumption: &Value) -> Result<Self, serde_json::Error> {
        let summary = match group_by {
            "hour" | "hourly" => ConsumptionSummary::Hourly(rows(consumption)?),
            "day" | "daily" => ConsumptionSummary::Daily(rows(consumption)?),
            "month" | "monthly" => ConsumptionSummary::Monthly(rows(consumption)?),
            "date_hour" | "date_and_hour" => ConsumptionSummary::DateAndHourly(rows(consumption)?),
            _ => ConsumptionSummary::Raw(consumption.clone()),
        };
        Ok(summary)
    }

    /// Number of top-level rows. `Raw` counts array elements, or 1 for any
    /// other non-null value.
    pub fn len(&self) -> usize {
        match self {
            ConsumptionSummary::Hourly(v) => v.len(),
            ConsumptionSummary::Daily(v) => v.len(),
            ConsumptionSummary::Monthly(v) => v.len(),
            ConsumptionSummary::DateAndHourly(v) => v.len(),
            ConsumptionSummary::Raw(Value::Array(v)) => v.len(),
            ConsumptionSummary::Raw(Value::Null) => 0,
            ConsumptionSummary::Raw(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn rows<T: serde::de::DeserializeOwned>(value: &Value) -> Result<Vec<T>, serde_json::Error> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(_) => Ok(vec![T::deserialize(value)?]),
        _ => Vec::<T>::deserialize(value),
    }
}

// =============================================================================
// Billing Events
// =============================================================================

/// Bill became available, or was paid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub webhook_id: i64,
    /// "available" or "paid"
    #[serde(deserialize_with = "null_as_default")]
    pub trigger_type: String,
    #[serde(deserialize_with = "object")]
    pub bill: Bill,
    /// Only sent for "paid" events
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_object"
    )]
    pub payment: Option<Payment>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bill {
    #[serde(deserialize_with = "null_as_default")]
    pub bill_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub contract_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub period: String,
    #[serde(deserialize_with = "null_as_default")]
    pub total: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub xml_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payment {
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i64>,
    #[serde(
        skip_serializing_if = "String::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub payment_method: String,
}

// =============================================================================
// Field Helpers
// =============================================================================

/// Treat an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a nested block that must be a JSON object (or `null`, meaning
/// absent).
fn object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: de::DeserializeOwned + Default,
{
    Ok(optional_object(deserializer)?.unwrap_or_default())
}

fn optional_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: de::DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value @ Value::Object(_) => T::deserialize(value).map(Some).map_err(de::Error::custom),
        other => Err(de::Error::invalid_type(unexpected(&other), &"a JSON object")),
    }
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value {
        Value::Null => de::Unexpected::Unit,
        Value::Bool(b) => de::Unexpected::Bool(*b),
        Value::Number(_) => de::Unexpected::Other("number"),
        Value::String(s) => de::Unexpected::Str(s),
        Value::Array(_) => de::Unexpected::Seq,
        Value::Object(_) => de::Unexpected::Map,
    }
}
