use std::{error::Error, sync::Arc};

use invoicing::{
    executable_utils::{load_config, run_notifier_server},
    notifier::NotificationStage,
    queue::HttpNotificationQueue,
    storage::HttpObjectStorage,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = load_config()?;
    common::init_tracing(&config.notifier.log_level);

    let storage = Arc::new(HttpObjectStorage::new(&config.notifier.storage_endpoint));
    let queue = Arc::new(HttpNotificationQueue::new(&config.notifier.queue_url));

    let stage = Arc::new(NotificationStage::new(
        config.notifier.message_group_id.clone(),
        storage,
        queue,
    ));

    run_notifier_server(&config.notifier.server_address, stage).await
}
