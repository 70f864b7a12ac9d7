use std::sync::Arc;
use tracing::{error, info};

use crate::{
    batch::BatchResponse,
    error::InvoiceError,
    model::{NotificationMessage, StorageEventBatch, StorageEventRecord},
    queue::NotificationQueue,
    storage::{ArtifactMetadata, ObjectStorage},
};

/// Second pipeline stage: storage-created event in, deduplicated
/// notification out. Learns about the order exclusively from the
/// object's metadata tags.
pub struct NotificationStage {
    group_id: String,
    storage: Arc<dyn ObjectStorage>,
    queue: Arc<dyn NotificationQueue>,
}

impl NotificationStage {
    pub fn new(
        group_id: impl Into<String>,
        storage: Arc<dyn ObjectStorage>,
        queue: Arc<dyn NotificationQueue>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            storage,
            queue,
        }
    }

    pub async fn handle_batch(&self, batch: &StorageEventBatch) -> BatchResponse {
        let mut results = Vec::with_capacity(batch.records.len());
        for record in &batch.records {
            let result = self.process_record(record).await;
            if let Err(e) = &result {
                error!(error = %e, "notification dispatch failed for record");
            }
            results.push(result);
        }

        BatchResponse::aggregate(results, "All records processed successfully.")
    }

    pub async fn process_record(&self, record: &StorageEventRecord) -> Result<(), InvoiceError> {
        let bucket = &record.s3.bucket.name;
        let key = &record.s3.object.key;
        info!(%bucket, %key, "object upload detected");

        let tags = self.storage.head_metadata(bucket, key).await?;
        let Some(metadata) = ArtifactMetadata::from_tags(&tags) else {
            // Non-fatal: a malformed upload must not block sibling records.
            let skipped = InvoiceError::MissingArtifactMetadata {
                bucket: bucket.clone(),
                key: key.clone(),
            };
            error!(error = %skipped, "skipping record");
            return Ok(());
        };

        info!(
            order_number = %metadata.order_number,
            customer_email = %metadata.customer_email,
            "metadata retrieved"
        );

        let message = NotificationMessage {
            order_number: metadata.order_number,
            customer_email: metadata.customer_email,
        };
        self.queue
            .publish(&message, &self.group_id, &message.order_number)
            .await?;

        Ok(())
    }
}
