use async_trait::async_trait;
use http::StatusCode;
use serde_json::Value;
use tracing::info;

use crate::error::InvoiceError;

/// Synchronous (request/response) boundary to the external PDF rendering
/// service. No retries live here; redelivery of the batch is the only
/// retry mechanism.
#[async_trait]
pub trait RenderingService: Send + Sync {
    async fn render(&self, request: &Value) -> Result<Vec<u8>, InvoiceError>;
}

pub struct HttpRenderingService {
    client: reqwest::Client,
    url: String,
    bearer_token: String,
    language_tag: String,
}

impl HttpRenderingService {
    pub fn new(url: impl Into<String>, bearer_token: impl Into<String>, language_tag: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            bearer_token: bearer_token.into(),
            language_tag: language_tag.into(),
        }
    }
}

#[async_trait]
impl RenderingService for HttpRenderingService {
    async fn render(&self, request: &Value) -> Result<Vec<u8>, InvoiceError> {
        let response = self
            .client
            .post(&self.url)
            .header(http::header::ACCEPT_LANGUAGE.as_str(), &self.language_tag)
            .bearer_auth(&self.bearer_token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(InvoiceError::RenderingServiceFailure {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        info!(size = bytes.len(), "received rendered document");
        Ok(bytes.to_vec())
    }
}
