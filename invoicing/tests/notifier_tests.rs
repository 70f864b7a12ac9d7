
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use invoicing::error::InvoiceError;
use invoicing::model::StorageEventBatch;
use invoicing::notifier::NotificationStage;
use invoicing::storage::ORDER_NUMBER_TAG;
use mocks::{InMemoryFifoQueue, InMemoryObjectStorage, MockQueue, artifact_tags, storage_event};

const GROUP_ID: &str = "INVOICE_SENDER";

fn stage_with(storage: Arc<InMemoryObjectStorage>, queue: Arc<dyn invoicing::queue::NotificationQueue>) -> NotificationStage {
    NotificationStage::new(GROUP_ID, storage, queue)
}

#[tokio::test]
async fn tagged_object_yields_one_deduplicated_notification() {
    let storage = Arc::new(InMemoryObjectStorage::default());
    storage.seed("invoices", "A100.pdf", artifact_tags("A100", "erika@example.com"));

    let mut queue = MockQueue::new();
    queue
        .expect_publish()
        .withf(|message, group_id, deduplication_id| {
            message.order_number == "A100"
                && message.customer_email == "erika@example.com"
                && group_id == GROUP_ID
                && deduplication_id == "A100"
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let stage = stage_with(storage, Arc::new(queue));
    stage
        .process_record(&storage_event("invoices", "A100.pdf"))
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_tag_skips_record_without_error() {
    let storage = Arc::new(InMemoryObjectStorage::default());
    // Only one of the two required tags present.
    storage.seed(
        "invoices",
        "A100.pdf",
        HashMap::from([(ORDER_NUMBER_TAG.to_string(), "A100".to_string())]),
    );

    let mut queue = MockQueue::new();
    queue.expect_publish().never();

    let stage = stage_with(storage, Arc::new(queue));
    let result = stage
        .process_record(&storage_event("invoices", "A100.pdf"))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn empty_tag_value_counts_as_missing() {
    let storage = Arc::new(InMemoryObjectStorage::default());
    storage.seed("invoices", "A100.pdf", artifact_tags("A100", "   "));

    let mut queue = MockQueue::new();
    queue.expect_publish().never();

    let stage = stage_with(storage, Arc::new(queue));
    assert!(stage
        .process_record(&storage_event("invoices", "A100.pdf"))
        .await
        .is_ok());
}

#[tokio::test]
async fn middle_record_with_missing_metadata_does_not_block_siblings() {
    let storage = Arc::new(InMemoryObjectStorage::default());
    storage.seed("invoices", "A100.pdf", artifact_tags("A100", "erika@example.com"));
    storage.seed("invoices", "A200.pdf", HashMap::new());
    storage.seed("invoices", "A300.pdf", artifact_tags("A300", "max@example.com"));

    let queue = Arc::new(InMemoryFifoQueue::new(Duration::from_secs(300)));
    let stage = stage_with(storage, queue.clone());

    let batch = StorageEventBatch {
        records: vec![
            storage_event("invoices", "A100.pdf"),
            storage_event("invoices", "A200.pdf"),
            storage_event("invoices", "A300.pdf"),
        ],
    };
    let response = stage.handle_batch(&batch).await;

    assert!(response.is_success());
    let delivered = queue.delivered();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].1.order_number, "A100");
    assert_eq!(delivered[1].1.order_number, "A300");
}

#[tokio::test]
async fn publish_failure_is_fatal_and_fails_the_batch() {
    let storage = Arc::new(InMemoryObjectStorage::default());
    storage.seed("invoices", "A100.pdf", artifact_tags("A100", "erika@example.com"));

    let mut queue = MockQueue::new();
    queue
        .expect_publish()
        .times(1)
        .returning(|_, _, _| Err(InvoiceError::NotificationPublishFailure("queue down".to_string())));

    let stage = stage_with(storage, Arc::new(queue));
    let batch = StorageEventBatch {
        records: vec![storage_event("invoices", "A100.pdf")],
    };
    let response = stage.handle_batch(&batch).await;

    assert_eq!(response.status_code, 500);
    assert!(response.body.contains("queue down"));
}

#[tokio::test]
async fn unreadable_object_is_fatal() {
    let storage = Arc::new(InMemoryObjectStorage::default());
    let mut queue = MockQueue::new();
    queue.expect_publish().never();

    let stage = stage_with(storage, Arc::new(queue));
    let err = stage
        .process_record(&storage_event("invoices", "missing.pdf"))
        .await
        .unwrap_err();

    assert!(matches!(err, InvoiceError::Storage(_)));
}

#[tokio::test]
async fn duplicate_events_within_window_deliver_at_most_once() {
    let storage = Arc::new(InMemoryObjectStorage::default());
    storage.seed("invoices", "A100.pdf", artifact_tags("A100", "erika@example.com"));

    let queue = Arc::new(InMemoryFifoQueue::new(Duration::from_millis(200)));
    let stage = stage_with(storage, queue.clone());

    let event = storage_event("invoices", "A100.pdf");
    stage.process_record(&event).await.unwrap();
    stage.process_record(&event).await.unwrap();

    assert_eq!(queue.delivered().len(), 1);
}

#[tokio::test]
async fn dedup_guarantee_is_windowed_not_absolute() {
    let storage = Arc::new(InMemoryObjectStorage::default());
    storage.seed("invoices", "A100.pdf", artifact_tags("A100", "erika@example.com"));

    let queue = Arc::new(InMemoryFifoQueue::new(Duration::from_millis(50)));
    let stage = stage_with(storage, queue.clone());

    let event = storage_event("invoices", "A100.pdf");
    stage.process_record(&event).await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    stage.process_record(&event).await.unwrap();

    // Outside the deduplication window the same order can be delivered again.
    assert_eq!(queue.delivered().len(), 2);
}
