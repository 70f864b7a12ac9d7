use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::error::InvoiceError;

pub const ORDER_NUMBER_TAG: &str = "order_number";
pub const CUSTOMER_EMAIL_TAG: &str = "customer_email";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// The identifying tags attached to every stored artifact. These tags are
/// the only channel between the two stages; the document body is never
/// re-parsed downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMetadata {
    pub order_number: String,
    pub customer_email: String,
}

impl ArtifactMetadata {
    pub fn to_tags(&self) -> HashMap<String, String> {
        HashMap::from([
            (ORDER_NUMBER_TAG.to_string(), self.order_number.clone()),
            (CUSTOMER_EMAIL_TAG.to_string(), self.customer_email.clone()),
        ])
    }

    /// Returns `None` when either tag is absent or empty; the caller
    /// decides whether that is fatal.
    pub fn from_tags(tags: &HashMap<String, String>) -> Option<Self> {
        let order_number = tags.get(ORDER_NUMBER_TAG)?.trim();
        let customer_email = tags.get(CUSTOMER_EMAIL_TAG)?.trim();
        if order_number.is_empty() || customer_email.is_empty() {
            return None;
        }

        Some(Self {
            order_number: order_number.to_string(),
            customer_email: customer_email.to_string(),
        })
    }
}

/// Durable object storage boundary. Writes are last-writer-wins per key,
/// which makes re-delivery of the same order safe: it overwrites the
/// same key with equivalent content.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        metadata: &ArtifactMetadata,
    ) -> Result<(), InvoiceError>;

    /// Reads back only the storage-level metadata tags, never the body.
    async fn head_metadata(&self, bucket: &str, key: &str) -> Result<HashMap<String, String>, InvoiceError>;
}

const METADATA_HEADER_PREFIX: &str = "x-amz-meta-";

/// S3-style HTTP client: PUT with metadata carried in `x-amz-meta-*`
/// headers, HEAD to read them back.
pub struct HttpObjectStorage {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpObjectStorage {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{bucket}/{key}", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        metadata: &ArtifactMetadata,
    ) -> Result<(), InvoiceError> {
        let mut request = self
            .client
            .put(self.object_url(bucket, key))
            .header(http::header::CONTENT_TYPE.as_str(), content_type);
        for (tag, value) in metadata.to_tags() {
            let name = format!("{METADATA_HEADER_PREFIX}{tag}");
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.body(bytes).send().await?;
        if !response.status().is_success() {
            return Err(InvoiceError::Storage(format!(
                "put {bucket}/{key} returned status {}",
                response.status()
            )));
        }

        debug!(%bucket, %key, "stored object");
        Ok(())
    }

    async fn head_metadata(&self, bucket: &str, key: &str) -> Result<HashMap<String, String>, InvoiceError> {
        let response = self.client.head(self.object_url(bucket, key)).send().await?;
        if !response.status().is_success() {
            return Err(InvoiceError::Storage(format!(
                "head {bucket}/{key} returned status {}",
                response.status()
            )));
        }

        let tags = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let tag = name.as_str().strip_prefix(METADATA_HEADER_PREFIX)?;
                Some((tag.to_string(), value.to_str().ok()?.to_string()))
            })
            .collect();

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_round_trips_through_tags() {
        let metadata = ArtifactMetadata {
            order_number: "A100".to_string(),
            customer_email: "erika@example.com".to_string(),
        };
        let tags = metadata.to_tags();
        assert_eq!(tags.get(ORDER_NUMBER_TAG).map(String::as_str), Some("A100"));
        assert_eq!(ArtifactMetadata::from_tags(&tags), Some(metadata));
    }

    #[tokio::test]
    async fn transport_failure_surfaces_as_http_error() {
        let storage = HttpObjectStorage::new("not a valid endpoint");
        let err = storage.head_metadata("invoices", "A100.pdf").await.unwrap_err();
        assert!(matches!(err, InvoiceError::Http(_)));
    }

    #[test]
    fn missing_or_empty_tags_yield_none() {
        let missing = HashMap::from([(ORDER_NUMBER_TAG.to_string(), "A100".to_string())]);
        assert_eq!(ArtifactMetadata::from_tags(&missing), None);

        let empty = HashMap::from([
            (ORDER_NUMBER_TAG.to_string(), "A100".to_string()),
            (CUSTOMER_EMAIL_TAG.to_string(), "  ".to_string()),
        ]);
        assert_eq!(ArtifactMetadata::from_tags(&empty), None);
    }
}
