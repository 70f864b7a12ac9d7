use std::{error::Error, sync::Arc};

use invoicing::{
    document::RenderLocale,
    executable_utils::{load_config, run_generator_server},
    generator::InvoiceGenerationStage,
    renderer::HttpRenderingService,
    storage::HttpObjectStorage,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = load_config()?;
    common::init_tracing(&config.generator.log_level);

    let locale = RenderLocale::from_business(&config.business)?;
    let renderer = Arc::new(HttpRenderingService::new(
        &config.generator.renderer_url,
        &config.generator.renderer_token,
        &config.business.language_tag,
    ));
    let storage = Arc::new(HttpObjectStorage::new(&config.generator.storage_endpoint));

    let stage = Arc::new(InvoiceGenerationStage::new(
        config.business.clone(),
        locale,
        config.generator.artifact_bucket.clone(),
        renderer,
        storage,
    ));

    run_generator_server(&config.generator.server_address, stage).await
}
