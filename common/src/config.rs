use serde::Deserialize;
use std::{error::Error, fs};

/// Fixed business identity and invoice texts. These are deployment
/// constants, not per-order data; defaults match the production setup.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BusinessConfig {
    /// Multi-line sender block printed in the invoice header.
    pub sender: String,
    pub logo_url: String,
    pub currency: String,
    pub tax_label: String,
    /// Language tag sent to the rendering service and used for formatting.
    pub language_tag: String,
    /// IANA timezone name for the generation timestamp.
    pub timezone: String,
    pub date_format: String,
    /// Notes text; `{order_number}` is interpolated per order.
    pub notes_template: String,
    pub terms: String,
    /// Label of the custom field recording the generation timestamp.
    pub generated_at_label: String,
    pub tax_reference_label: String,
    pub tax_reference_value: String,
    pub bank_details_label: String,
    pub bank_details_value: String,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            sender: "Hell Insekten & Sonnenschutz\nLochfeldstr.30\n76437 Rastatt\nTel.: 017662960342\ninfo@hell-insektenschutz.de\nwww.hell-insekten-sonnenschutz.com".to_string(),
            logo_url: "https://hell-insek-pdfs.s3.amazonaws.com/logo.webp".to_string(),
            currency: "EUR".to_string(),
            tax_label: "Umsatzsteuer".to_string(),
            language_tag: "de_DE".to_string(),
            timezone: "Europe/Berlin".to_string(),
            date_format: "%d/%m/%y %H:%M:%S".to_string(),
            notes_template: "RECHNUNG: {order_number}\nDiese Rechnung wurde für die Bestellung: {order_number} erstellt.\nVielen Dank für die gute Zusammenarbeit.".to_string(),
            terms: "Aufgrund der Maßanfertigung sind alle Elemente vom Umtausch ausgeschlossen.\nZahlungsbedingung: Zahlung bereits erfolgt.\n\nDies ist das Ende der Rechnung.".to_string(),
            generated_at_label: "Rechnungsdatum".to_string(),
            tax_reference_label: "USt-IdNr. und Steuernummer".to_string(),
            tax_reference_value: "DE354909066\n3910726980".to_string(),
            bank_details_label: "Bankverbindung".to_string(),
            bank_details_value: "Hakan Aydin\nVolksbank pur\nIBAN: DE25 6619 0000 0010 6615 10\nBIC: GENODE61KA1".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneratorConfig {
    pub renderer_url: String,
    pub renderer_token: String,
    pub storage_endpoint: String,
    pub artifact_bucket: String,
    pub server_address: String,
    pub log_level: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            renderer_url: "https://invoice-generator.com".to_string(),
            renderer_token: String::new(),
            storage_endpoint: "https://s3.eu-central-1.amazonaws.com".to_string(),
            artifact_bucket: "hell-insekten-sonnenschutz-invoices-pdf".to_string(),
            server_address: "0.0.0.0:8081".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotifierConfig {
    pub storage_endpoint: String,
    pub queue_url: String,
    /// All notifications share one FIFO group, so the queue serializes
    /// them globally. Kept as configured behavior rather than grouping
    /// per order.
    pub message_group_id: String,
    pub server_address: String,
    pub log_level: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            storage_endpoint: "https://s3.eu-central-1.amazonaws.com".to_string(),
            queue_url: "https://sqs.eu-central-1.amazonaws.com/380892414183/hell-insek-event-broker.fifo".to_string(),
            message_group_id: "INVOICE_SENDER".to_string(),
            server_address: "0.0.0.0:8082".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub business: BusinessConfig,
    pub generator: GeneratorConfig,
    pub notifier: NotifierConfig,
}

impl Config {
    pub fn load(config_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let contents = fs::read_to_string(config_path)?;
        let config = serde_yml::from_str(&contents)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_business_identity() {
        let config = Config::default();
        assert_eq!(config.business.currency, "EUR");
        assert_eq!(config.business.timezone, "Europe/Berlin");
        assert!(config.business.notes_template.contains("{order_number}"));
        assert_eq!(config.notifier.message_group_id, "INVOICE_SENDER");
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let yaml = "generator:\n  artifact_bucket: test-invoices\n";
        let config: Config = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.generator.artifact_bucket, "test-invoices");
        assert_eq!(config.generator.renderer_url, "https://invoice-generator.com");
        assert_eq!(config.business.tax_label, "Umsatzsteuer");
    }
}
