//! Webhook Send - demo client for a running receiver.
//!
//! Builds a sample payload, signs it with the shared secret and POSTs it.
//!
//! ```text
//! webhook-send [consumption | bills [available|paid]]
//! ```
//!
//! Environment: `WEBHOOK_URL` (default `http://localhost:8080/webhook`) and
//! `WEBHOOK_SECRET_KEY`.

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use webhook_receiver::config::DEV_SECRET_KEY;
use webhook_receiver::web::headers::{
    IDEMPOTENCY_KEY_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER, WEBHOOK_ID_HEADER,
};
use webhook_receiver::webhook::types::{
    Bill, ContractConsumption, Payment, ReportPeriod, DATA_TYPE_BILLS, DATA_TYPE_CONSUMPTION,
};
use webhook_receiver::{sign_payload, AcknowledgmentResponse, BillingEvent, ConsumptionReport};

const DEFAULT_URL: &str = "http://localhost:8080/webhook";

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    let url = env::var("WEBHOOK_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let secret = env::var("WEBHOOK_SECRET_KEY").unwrap_or_else(|_| {
        warn!("webhook_secret_key_not_configured_using_dev_default");
        DEV_SECRET_KEY.to_string()
    });

    let args: Vec<String> = env::args().skip(1).collect();
    let (webhook_id, payload) = match args.first().map(String::as_str) {
        None | Some("consumption") => (12345, consumption_payload()?),
        Some("bills") => {
            let trigger = args.get(1).map(String::as_str).unwrap_or("available");
            (67890, bills_payload(trigger)?)
        }
        Some(other) => bail!("unknown payload kind '{}', expected consumption or bills", other),
    };

    let body = serde_json::to_vec(&payload).context("Failed to serialize payload")?;
    let signature = sign_payload(&secret, &body);

    info!(url = %url, body_length = body.len(), "webhook_sending");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .post(&url)
        .header("Content-Type", "application/json")
        .header(SIGNATURE_HEADER, signature)
        .header(TIMESTAMP_HEADER, Utc::now().to_rfc3339())
        .header(WEBHOOK_ID_HEADER, webhook_id.to_string())
        .header(
            IDEMPOTENCY_KEY_HEADER,
            format!("{}-test-{}", payload_kind(&payload), Utc::now().timestamp()),
        )
        .body(body)
        .send()
        .await
        .context("Failed to send webhook")?;

    let status = response.status();
    let ack: AcknowledgmentResponse = response
        .json()
        .await
        .context("Failed to parse receiver response")?;

    info!(
        status = status.as_u16(),
        success = ack.success,
        processed = ack.processed,
        message = %ack.message,
        "webhook_sent"
    );

    if !(status.is_success() && ack.success) {
        bail!("receiver rejected webhook: {} {}", status, ack.message);
    }

    Ok(())
}

fn consumption_payload() -> Result<Value> {
    let report = ConsumptionReport {
        webhook_id: 12345,
        group_by: "hour".to_string(),
        send_interval: "daily".to_string(),
        period: ReportPeriod {
            start_date: "2024-01-15".to_string(),
            end_date: "2024-01-16".to_string(),
        },
        contract: ContractConsumption {
            contract_id: 1001,
            contract_name: "Contrato Demo".to_string(),
            sic: "123456789".to_string(),
            consumption: json!([
                {"hour": 0, "active_energy": 150.5, "active_export": 0.0,
                 "inductive_penalized": 10.2, "reactive_capacitive": 5.1},
                {"hour": 1, "active_energy": 145.3, "active_export": 0.0,
                 "inductive_penalized": 9.8, "reactive_capacitive": 4.9}
            ]),
        },
        timestamp: Some(Utc::now()),
    };

    tagged(DATA_TYPE_CONSUMPTION, &report)
}

fn bills_payload(trigger_type: &str) -> Result<Value> {
    let payment = (trigger_type == "paid").then(|| Payment {
        payment_date: Some(Utc::now()),
        transaction_id: Some(98765),
        payment_method: "bank_transfer".to_string(),
    });

    let event = BillingEvent {
        webhook_id: 67890,
        trigger_type: trigger_type.to_string(),
        bill: Bill {
            bill_id: 555,
            contract_id: 1001,
            period: "2024-01".to_string(),
            total: 1234.56,
            status: trigger_type.to_string(),
            xml_url: "https://example.com/bills/555.xml".to_string(),
        },
        payment,
        timestamp: Some(Utc::now()),
    };

    tagged(DATA_TYPE_BILLS, &event)
}

/// Serialize `payload` and add the `data_type` discriminator.
fn tagged<T: Serialize>(data_type: &str, payload: &T) -> Result<Value> {
    let mut value = serde_json::to_value(payload).context("Failed to serialize payload")?;
    match value.as_object_mut() {
        Some(object) => {
            object.insert("data_type".to_string(), Value::from(data_type));
            Ok(value)
        }
        None => bail!("payload did not serialize to a JSON object"),
    }
}

fn payload_kind(payload: &Value) -> &str {
    payload
        .get("data_type")
        .and_then(Value::as_str)
        .unwrap_or("webhook")
}
