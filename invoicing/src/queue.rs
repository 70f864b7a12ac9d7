use async_trait::async_trait;
use tracing::info;

use crate::{error::InvoiceError, model::NotificationMessage};

/// FIFO notification queue boundary. The queue deduplicates by
/// `deduplication_id` within its configured window; within that window
/// repeated publishes of the same order deliver at most one message.
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    async fn publish(
        &self,
        message: &NotificationMessage,
        group_id: &str,
        deduplication_id: &str,
    ) -> Result<(), InvoiceError>;
}

/// SQS-style HTTP client for a FIFO queue.
pub struct HttpNotificationQueue {
    client: reqwest::Client,
    queue_url: String,
}

impl HttpNotificationQueue {
    pub fn new(queue_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            queue_url: queue_url.into(),
        }
    }
}

#[async_trait]
impl NotificationQueue for HttpNotificationQueue {
    async fn publish(
        &self,
        message: &NotificationMessage,
        group_id: &str,
        deduplication_id: &str,
    ) -> Result<(), InvoiceError> {
        let body = serde_json::to_string(message)
            .map_err(|e| InvoiceError::NotificationPublishFailure(e.to_string()))?;

        let response = self
            .client
            .post(&self.queue_url)
            .form(&[
                ("Action", "SendMessage"),
                ("MessageBody", &body),
                ("MessageGroupId", group_id),
                ("MessageDeduplicationId", deduplication_id),
            ])
            .send()
            .await
            .map_err(|e| InvoiceError::NotificationPublishFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(InvoiceError::NotificationPublishFailure(format!(
                "queue returned status {}",
                response.status()
            )));
        }

        info!(order_number = %message.order_number, "notification published");
        Ok(())
    }
}
