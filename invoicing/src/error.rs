use thiserror::Error;

/// Failure modes of the two pipeline stages.
///
/// Every variant except `MissingArtifactMetadata` is fatal for the record
/// it occurs in and surfaces to the batch boundary, failing the whole
/// invocation. Missing metadata is absorbed inside the notification stage:
/// the record is logged and skipped so a malformed upload never blocks
/// unrelated orders.
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("malformed order message: {0}")]
    MalformedOrderMessage(String),

    #[error("rendering service returned status {status}: {body}")]
    RenderingServiceFailure { status: u16, body: String },

    #[error("object {bucket}/{key} is missing required metadata tags")]
    MissingArtifactMetadata { bucket: String, key: String },

    #[error("failed to publish notification: {0}")]
    NotificationPublishFailure(String),

    #[error("'{0}' is not a valid template parameter")]
    InvalidTemplateKey(String),

    #[error("object storage request failed: {0}")]
    Storage(String),

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
}
