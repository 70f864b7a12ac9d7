use chrono::NaiveDateTime;
use chrono_tz::Tz;
use common::config::BusinessConfig;
use serde_json::{Map, Value, json};
use std::{error::Error, str::FromStr};
use strum_macros::{Display, EnumString};

use crate::error::InvoiceError;

/// Whitelist of section labels the rendering service allows overriding.
/// The variant's wire name doubles as the top-level request key, so an
/// override outside this enum is unrepresentable in typed code; dynamic
/// keys go through [`TemplateKey::parse`] and are rejected at assignment
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum TemplateKey {
    #[strum(serialize = "header")]
    Header,
    #[strum(serialize = "to_title")]
    ToTitle,
    #[strum(serialize = "ship_to_title")]
    ShipToTitle,
    #[strum(serialize = "invoice_number_title")]
    InvoiceNumberTitle,
    #[strum(serialize = "date_title")]
    DateTitle,
    #[strum(serialize = "payment_terms_title")]
    PaymentTermsTitle,
    #[strum(serialize = "due_date_title")]
    DueDateTitle,
    #[strum(serialize = "purchase_order_title")]
    PurchaseOrderTitle,
    #[strum(serialize = "quantity_header")]
    QuantityHeader,
    #[strum(serialize = "item_header")]
    ItemHeader,
    #[strum(serialize = "unit_cost_header")]
    UnitCostHeader,
    #[strum(serialize = "amount_header")]
    AmountHeader,
    #[strum(serialize = "subtotal_title")]
    SubtotalTitle,
    #[strum(serialize = "discounts_title")]
    DiscountsTitle,
    #[strum(serialize = "tax_title")]
    TaxTitle,
    #[strum(serialize = "shipping_title")]
    ShippingTitle,
    #[strum(serialize = "total_title")]
    TotalTitle,
    #[strum(serialize = "amount_paid_title")]
    AmountPaidTitle,
    #[strum(serialize = "balance_title")]
    BalanceTitle,
    #[strum(serialize = "terms_title")]
    TermsTitle,
    #[strum(serialize = "notes_title")]
    NotesTitle,
}

impl TemplateKey {
    /// Resolves a dynamic key (config, external input) against the
    /// whitelist.
    pub fn parse(name: &str) -> Result<Self, InvoiceError> {
        Self::from_str(name).map_err(|_| InvoiceError::InvalidTemplateKey(name.to_string()))
    }
}

/// How the tax subtotal line is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaxDisplay {
    /// Tax shown as a percentage of the subtotal.
    #[default]
    Percentage,
    /// Tax shown as an absolute amount.
    Amount,
    Hidden,
}

impl TaxDisplay {
    // The rendering service expects "%" for percentage mode and a plain
    // boolean otherwise.
    fn wire_value(self) -> Value {
        match self {
            TaxDisplay::Percentage => json!("%"),
            TaxDisplay::Amount => json!(true),
            TaxDisplay::Hidden => json!(false),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SubtotalToggles {
    pub tax: TaxDisplay,
    pub discounts: bool,
    pub shipping: bool,
}

impl Default for SubtotalToggles {
    fn default() -> Self {
        Self {
            tax: TaxDisplay::Percentage,
            discounts: false,
            shipping: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub unit_cost: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomField {
    pub name: String,
    pub value: String,
}

/// Formatting context for one serialization call. Threaded in as an
/// explicit parameter so no process-wide locale state exists to leak
/// across concurrent invocations.
#[derive(Debug, Clone)]
pub struct RenderLocale {
    pub language_tag: String,
    pub timezone: Tz,
    pub date_format: String,
}

impl Default for RenderLocale {
    fn default() -> Self {
        Self {
            language_tag: "de_DE".to_string(),
            timezone: chrono_tz::Europe::Berlin,
            date_format: "%d/%m/%y %H:%M:%S".to_string(),
        }
    }
}

impl RenderLocale {
    pub fn from_business(config: &BusinessConfig) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let timezone = config
            .timezone
            .parse::<Tz>()
            .map_err(|e| format!("invalid timezone '{}': {e}", config.timezone))?;

        Ok(Self {
            language_tag: config.language_tag.clone(),
            timezone,
            date_format: config.date_format.clone(),
        })
    }
}

/// In-memory invoice, built fresh per order and discarded after
/// serialization. Line items, custom fields and template overrides keep
/// their insertion order all the way into the rendered output.
#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    sender: String,
    recipient: String,
    ship_to: Option<String>,
    logo: Option<String>,
    number: String,
    currency: String,
    date: NaiveDateTime,
    payment_terms: Option<String>,
    due_date: Option<String>,
    discounts: f64,
    tax: f64,
    tax_title: Option<String>,
    shipping: f64,
    amount_paid: f64,
    notes: Option<String>,
    terms: Option<String>,
    items: Vec<LineItem>,
    custom_fields: Vec<CustomField>,
    toggles: SubtotalToggles,
    template: Vec<(TemplateKey, String)>,
}

impl InvoiceDocument {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        number: impl Into<String>,
        date: NaiveDateTime,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            ship_to: None,
            logo: None,
            number: number.into(),
            currency: currency.into(),
            date,
            payment_terms: None,
            due_date: None,
            discounts: 0.0,
            tax: 0.0,
            tax_title: None,
            shipping: 0.0,
            amount_paid: 0.0,
            notes: None,
            terms: None,
            items: Vec::new(),
            custom_fields: Vec::new(),
            toggles: SubtotalToggles::default(),
            template: Vec::new(),
        }
    }

    pub fn set_logo(&mut self, url: impl Into<String>) {
        self.logo = Some(url.into());
    }

    pub fn set_ship_to(&mut self, recipient: impl Into<String>) {
        self.ship_to = Some(recipient.into());
    }

    pub fn set_payment_terms(&mut self, terms: impl Into<String>) {
        self.payment_terms = Some(terms.into());
    }

    pub fn set_due_date(&mut self, due_date: impl Into<String>) {
        self.due_date = Some(due_date.into());
    }

    pub fn set_tax(&mut self, percentage: f64, title: Option<String>) {
        self.tax = percentage;
        self.tax_title = title;
    }

    pub fn set_shipping(&mut self, amount: f64) {
        self.shipping = amount;
    }

    pub fn set_discounts(&mut self, amount: f64) {
        self.discounts = amount;
    }

    pub fn set_amount_paid(&mut self, amount: f64) {
        self.amount_paid = amount;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = Some(notes.into());
    }

    pub fn set_terms(&mut self, terms: impl Into<String>) {
        self.terms = Some(terms.into());
    }

    pub fn add_item(
        &mut self,
        name: impl Into<String>,
        quantity: u32,
        unit_cost: f64,
        description: impl Into<String>,
    ) {
        self.items.push(LineItem {
            name: name.into(),
            quantity,
            unit_cost,
            description: description.into(),
        });
    }

    pub fn add_custom_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.custom_fields.push(CustomField {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Overrides one section label. Re-assigning a key replaces its value
    /// in place, keeping the original insertion position.
    pub fn set_template_text(&mut self, key: TemplateKey, value: impl Into<String>) {
        let value = value.into();
        match self.template.iter().position(|(existing, _)| *existing == key) {
            Some(index) => self.template[index].1 = value,
            None => self.template.push((key, value)),
        }
    }

    /// String-keyed variant for callers holding dynamic keys; rejects
    /// anything outside the whitelist before it can reach serialization.
    pub fn set_template_text_by_name(&mut self, name: &str, value: impl Into<String>) -> Result<(), InvoiceError> {
        let key = TemplateKey::parse(name)?;
        self.set_template_text(key, value);
        Ok(())
    }

    pub fn toggle_subtotal(&mut self, tax: TaxDisplay, discounts: bool, shipping: bool) {
        self.toggles = SubtotalToggles { tax, discounts, shipping };
    }

    /// Serializes the document into the rendering service's request body.
    ///
    /// Every field is listed explicitly with its target key: the sender
    /// block goes out as `from` and under no other name, line items and
    /// custom fields inline as plain objects, and template overrides
    /// become ordinary top-level keys. Pure; formatting comes from the
    /// passed locale, never from ambient state.
    pub fn to_render_request(&self, locale: &RenderLocale) -> Value {
        let mut body = Map::new();
        body.insert("from".to_string(), json!(self.sender));
        body.insert("to".to_string(), json!(self.recipient));
        body.insert("ship_to".to_string(), json!(self.ship_to));
        body.insert("logo".to_string(), json!(self.logo));
        body.insert("number".to_string(), json!(self.number));
        body.insert("currency".to_string(), json!(self.currency));
        body.insert(
            "date".to_string(),
            json!(self.date.format(&locale.date_format).to_string()),
        );
        body.insert("payment_terms".to_string(), json!(self.payment_terms));
        body.insert("due_date".to_string(), json!(self.due_date));
        body.insert(
            "items".to_string(),
            Value::Array(
                self.items
                    .iter()
                    .map(|item| {
                        json!({
                            "name": item.name,
                            "quantity": item.quantity,
                            "unit_cost": item.unit_cost,
                            "description": item.description,
                        })
                    })
                    .collect(),
            ),
        );
        body.insert(
            "fields".to_string(),
            json!({
                "tax": self.toggles.tax.wire_value(),
                "discounts": self.toggles.discounts,
                "shipping": self.toggles.shipping,
            }),
        );
        body.insert("discounts".to_string(), json!(self.discounts));
        body.insert("tax".to_string(), json!(self.tax));
        body.insert("tax_title".to_string(), json!(self.tax_title));
        body.insert("shipping".to_string(), json!(self.shipping));
        body.insert("amount_paid".to_string(), json!(self.amount_paid));
        body.insert("notes".to_string(), json!(self.notes));
        body.insert("terms".to_string(), json!(self.terms));
        body.insert(
            "custom_fields".to_string(),
            Value::Array(
                self.custom_fields
                    .iter()
                    .map(|field| json!({"name": field.name, "value": field.value}))
                    .collect(),
            ),
        );
        for (key, value) in &self.template {
            body.insert(key.to_string(), json!(value));
        }

        Value::Object(body)
    }
}
