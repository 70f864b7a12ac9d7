use chrono::Utc;
use common::config::BusinessConfig;
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    batch::BatchResponse,
    document::{InvoiceDocument, RenderLocale},
    error::InvoiceError,
    model::{OrderMessage, QueueBatch, QueueRecord, parse_order_date},
    renderer::RenderingService,
    storage::{ArtifactMetadata, ObjectStorage, PDF_CONTENT_TYPE},
};

/// First pipeline stage: order message in, rendered artifact out.
///
/// The artifact key is derived from the order number, so reprocessing the
/// same order overwrites the existing artifact instead of duplicating it.
pub struct InvoiceGenerationStage {
    business: BusinessConfig,
    locale: RenderLocale,
    bucket: String,
    renderer: Arc<dyn RenderingService>,
    storage: Arc<dyn ObjectStorage>,
}

impl InvoiceGenerationStage {
    pub fn new(
        business: BusinessConfig,
        locale: RenderLocale,
        bucket: impl Into<String>,
        renderer: Arc<dyn RenderingService>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            business,
            locale,
            bucket: bucket.into(),
            renderer,
            storage,
        }
    }

    pub async fn handle_batch(&self, batch: &QueueBatch) -> BatchResponse {
        let mut results = Vec::with_capacity(batch.records.len());
        for record in &batch.records {
            let result = self.process_record(record).await;
            if let Err(e) = &result {
                error!(error = %e, "invoice generation failed for record");
            }
            results.push(result);
        }

        BatchResponse::aggregate(results, "All invoices successfully generated and uploaded")
    }

    pub async fn process_record(&self, record: &QueueRecord) -> Result<(), InvoiceError> {
        let message: OrderMessage = serde_json::from_str(&record.body)
            .map_err(|e| InvoiceError::MalformedOrderMessage(e.to_string()))?;
        let order_number = message.order.order_number.clone();
        info!(%order_number, "received order, creating invoice");

        let document = self.build_document(&message)?;
        let request = document.to_render_request(&self.locale);

        info!(%order_number, "posting render request");
        let pdf = self.renderer.render(&request).await?;

        let metadata = ArtifactMetadata {
            order_number: order_number.clone(),
            customer_email: message.customer.email.clone(),
        };
        let key = format!("{order_number}.pdf");
        self.storage
            .put_object(&self.bucket, &key, pdf, PDF_CONTENT_TYPE, &metadata)
            .await?;

        info!(%order_number, %key, "invoice artifact stored");
        Ok(())
    }

    fn build_document(&self, message: &OrderMessage) -> Result<InvoiceDocument, InvoiceError> {
        let order = &message.order;
        let customer = &message.customer;
        let date = parse_order_date(&order.order_date)?;

        let mut document = InvoiceDocument::new(
            self.business.sender.clone(),
            format!("{}\n{}", customer.full_name, customer.address),
            order.order_number.clone(),
            date,
            self.business.currency.clone(),
        );
        document.set_logo(self.business.logo_url.clone());
        document.set_tax(order.tax.percentage, Some(self.business.tax_label.clone()));
        document.set_shipping(order.shipping_price);
        document.set_amount_paid(0.0);
        document.set_notes(
            self.business
                .notes_template
                .replace("{order_number}", &order.order_number),
        );
        document.set_terms(self.business.terms.clone());

        for item in &order.items {
            document.add_item(
                item.title.clone(),
                item.quantity,
                item.unit_price,
                item.description.clone(),
            );
        }

        let generated_at = Utc::now().with_timezone(&self.locale.timezone).naive_local();
        document.add_custom_field(
            self.business.generated_at_label.clone(),
            generated_at.format(&self.locale.date_format).to_string(),
        );
        document.add_custom_field(
            self.business.tax_reference_label.clone(),
            self.business.tax_reference_value.clone(),
        );
        document.add_custom_field(
            self.business.bank_details_label.clone(),
            self.business.bank_details_value.clone(),
        );

        Ok(document)
    }
}
