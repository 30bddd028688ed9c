//! Per-variant validation.
//!
//! Produces the `processed` flag and the acknowledgment message. No I/O
//! happens here; a payload that decoded but is incomplete is still a
//! successful receipt, only with `processed = false`.

use tracing::{debug, info, warn};

use super::types::{BillingEvent, ConsumptionReport, ConsumptionSummary, WebhookEnvelope};

/// What the processor made of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub processed: bool,
    pub message: String,
}

impl Outcome {
    pub fn processed(message: impl Into<String>) -> Self {
        Self {
            processed: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            processed: false,
            message: message.into(),
        }
    }
}

/// Validate a decoded webhook and build its outcome.
pub fn process(envelope: &WebhookEnvelope) -> Outcome {
    match envelope {
        WebhookEnvelope::Consumption(report) => process_consumption(report),
        WebhookEnvelope::Bills(event) => process_bills(event),
        WebhookEnvelope::Unknown { data_type } => process_unknown(data_type),
    }
}

fn process_consumption(report: &ConsumptionReport) -> Outcome {
    let missing: Vec<&str> = [
        ("group_by", report.group_by.is_empty()),
        ("send_interval", report.send_interval.is_empty()),
    ]
    .into_iter()
    .filter_map(|(field, empty)| empty.then_some(field))
    .collect();

    if !missing.is_empty() {
        warn!(
            webhook_id = report.webhook_id,
            missing = ?missing,
            "consumption_webhook_incomplete"
        );
        return Outcome::rejected(format!(
            "Missing required fields for consumption webhook: {}",
            missing.join(", ")
        ));
    }

    match ConsumptionSummary::interpret(&report.group_by, &report.contract.consumption) {
        Ok(summary) => debug!(
            group_by = %report.group_by,
            rows = summary.len(),
            "consumption_summary_interpreted"
        ),
        Err(e) => debug!(
            group_by = %report.group_by,
            error = %e,
            "consumption_summary_uninterpreted"
        ),
    }

    info!(
        webhook_id = report.webhook_id,
        contract_id = report.contract.contract_id,
        group_by = %report.group_by,
        send_interval = %report.send_interval,
        period_start = %report.period.start_date,
        period_end = %report.period.end_date,
        "consumption_webhook_processed"
    );

    Outcome::processed(format!(
        "Consumption webhook processed successfully for contract {} ({})",
        report.contract.contract_id, report.contract.contract_name
    ))
}

fn process_bills(event: &BillingEvent) -> Outcome {
    if event.trigger_type.is_empty() {
        warn!(webhook_id = event.webhook_id, "bills_webhook_incomplete");
        return Outcome::rejected("Missing required fields for bills webhook: trigger_type");
    }

    // Payment details are optional even for "paid" events
    if event.trigger_type == "paid" && event.payment.is_none() {
        debug!(bill_id = event.bill.bill_id, "bills_paid_without_payment");
    }

    info!(
        webhook_id = event.webhook_id,
        trigger_type = %event.trigger_type,
        bill_id = event.bill.bill_id,
        contract_id = event.bill.contract_id,
        has_payment = event.payment.is_some(),
        "bills_webhook_processed"
    );

    Outcome::processed(format!(
        "Bills webhook processed successfully: {} event for bill {}",
        event.trigger_type, event.bill.bill_id
    ))
}

fn process_unknown(data_type: &str) -> Outcome {
    info!(data_type = %data_type, "unknown_webhook_accepted");

    if data_type.is_empty() {
        Outcome::processed("Webhook without data_type accepted without processing")
    } else {
        Outcome::processed(format!(
            "Unrecognized data_type '{}' accepted without processing",
            data_type
        ))
    }
}
