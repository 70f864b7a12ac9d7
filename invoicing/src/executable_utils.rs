use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use clap::Parser;
use common::config::Config;
use http::StatusCode;
use std::{error::Error, path::Path, sync::Arc};
use tower_http::trace::TraceLayer;

use crate::{
    batch::BatchResponse,
    generator::InvoiceGenerationStage,
    model::{QueueBatch, StorageEventBatch},
    notifier::NotificationStage,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,
}

/// Loads env and config for a stage executable. A missing config file is
/// not an error: the defaults carry a complete deployment.
pub fn load_config() -> Result<Config, Box<dyn Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    if Path::new(&args.config).exists() {
        Config::load(&args.config)
    } else {
        Ok(Config::default())
    }
}

/// Serves the generation stage: `POST /events` takes one order batch and
/// answers with the batch outcome (200 all processed, 500 redeliver).
pub async fn run_generator_server(
    address: &str,
    stage: Arc<InvoiceGenerationStage>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = Router::new()
        .route("/events", post(handle_order_batch))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(stage);

    tracing::info!("starting generator service at {}", address);
    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_order_batch(
    State(stage): State<Arc<InvoiceGenerationStage>>,
    Json(batch): Json<QueueBatch>,
) -> BatchResponse {
    stage.handle_batch(&batch).await
}

/// Serves the notification stage: `POST /events` takes one batch of
/// storage-created events.
pub async fn run_notifier_server(
    address: &str,
    stage: Arc<NotificationStage>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = Router::new()
        .route("/events", post(handle_storage_event_batch))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(stage);

    tracing::info!("starting notifier service at {}", address);
    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_storage_event_batch(
    State(stage): State<Arc<NotificationStage>>,
    Json(batch): Json<StorageEventBatch>,
) -> BatchResponse {
    stage.handle_batch(&batch).await
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}
