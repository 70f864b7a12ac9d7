use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::InvoiceError;

/// Body of one order-queue message.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderMessage {
    pub customer: Customer,
    pub order: Order,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub full_name: String,
    pub address: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_number: String,
    /// ISO-8601 timestamp, possibly with sub-microsecond fractions.
    pub order_date: String,
    pub tax: Tax,
    pub shipping_price: f64,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tax {
    pub percentage: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub title: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub description: String,
}

/// Batch envelope delivered to the generation stage. Each record body is
/// a JSON string carrying one [`OrderMessage`].
#[derive(Debug, Clone, Deserialize)]
pub struct QueueBatch {
    #[serde(rename = "Records")]
    pub records: Vec<QueueRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueRecord {
    pub body: String,
}

/// Batch envelope delivered to the notification stage: one record per
/// created storage object, naming only its bucket and key.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageEventBatch {
    #[serde(rename = "Records")]
    pub records: Vec<StorageEventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageEventRecord {
    pub s3: StorageEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageEntity {
    pub bucket: StorageBucket,
    pub object: StorageObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageBucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageObject {
    pub key: String,
}

/// Message published to the FIFO notification queue. Deduplicated by
/// order number; the email consumer downstream needs nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMessage {
    pub order_number: String,
    pub customer_email: String,
}

/// Parses an order timestamp, truncating fractional seconds beyond
/// microsecond precision instead of rejecting them.
pub fn parse_order_date(raw: &str) -> Result<NaiveDateTime, InvoiceError> {
    let trimmed = raw.strip_suffix('Z').unwrap_or(raw);
    let truncated = match trimmed.split_once('.') {
        Some((whole, fraction)) if !fraction.is_empty() => {
            let fraction: String = fraction.chars().take(6).collect();
            format!("{whole}.{fraction}")
        }
        Some((whole, _)) => whole.to_string(),
        None => trimmed.to_string(),
    };

    NaiveDateTime::parse_from_str(&truncated, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| InvoiceError::MalformedOrderMessage(format!("invalid order date '{raw}': {e}")))
}
