//! # Invoice Model
//!
//! The record a form session edits and a render call consumes: issuer and
//! client details, an ordered list of line items, and free-text notes.
//!
//! The invoice total is never stored. [`InvoiceData::total`] derives it from
//! the items on every read, so whatever the user has edited, the preview and
//! the rendered document always agree with the item list.

mod honorific;
mod validate;

pub use honorific::{apply_name_suffix, Honorific};
pub use validate::{validate, ValidationErrors};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::TemplateConfig;

/// One billable entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    /// Any JSON number parses so that zero, negative and fractional
    /// quantities reach validation instead of failing to parse.
    pub quantity: Decimal,
    pub price: Decimal,
}

impl Default for InvoiceItem {
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: Decimal::ONE,
            price: Decimal::ZERO,
        }
    }
}

impl InvoiceItem {
    pub fn new(description: impl Into<String>, quantity: i64, price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity: Decimal::from(quantity),
            price,
        }
    }

    /// `quantity * price`, or `None` when it does not fit in a `Decimal`.
    pub fn checked_line_amount(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.price)
    }

    /// `quantity * price`, saturating at the `Decimal` bounds. Validation
    /// rejects records where saturation would kick in.
    pub fn line_amount(&self) -> Decimal {
        self.quantity.saturating_mul(self.price)
    }

    /// Take description and price from a catalog entry, keeping the quantity.
    pub fn with_suggestion(&self, suggestion: &Suggestion) -> Self {
        Self {
            description: suggestion.description.clone(),
            price: suggestion.price,
            quantity: self.quantity,
        }
    }
}

/// A quick-fill catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub description: String,
    pub price: Decimal,
}

/// A complete invoice record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceData {
    pub invoice_number: String,
    /// ISO `YYYY-MM-DD`, printed as given.
    pub date: String,

    pub company_name: String,
    pub company_address: String,
    pub company_email: String,
    pub company_phone: String,

    pub client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_phone: Option<String>,

    #[serde(default)]
    pub items: Vec<InvoiceItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Sum of `quantity * price` over `items`. Zero for an empty list.
///
/// Saturates instead of overflowing; see [`checked_total`].
pub fn recompute_total(items: &[InvoiceItem]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |total, item| total.saturating_add(item.line_amount()))
}

/// Like [`recompute_total`], but `None` if any line amount or the running
/// total overflows.
pub fn checked_total(items: &[InvoiceItem]) -> Option<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |total, item| {
        total.checked_add(item.checked_line_amount()?)
    })
}

/// `<prefix>-YYMMDD-HHMM` for the given moment.
pub fn generate_invoice_number(prefix: &str, at: NaiveDateTime) -> String {
    format!("{}-{}", prefix, at.format("%y%m%d-%H%M"))
}

impl InvoiceData {
    /// A blank record as a new form session opens it: generated number,
    /// today's date, the issuer from `config`, and one empty item.
    pub fn new_default(config: &TemplateConfig, now: NaiveDateTime) -> Self {
        Self {
            invoice_number: generate_invoice_number(&config.invoice_prefix, now),
            date: now.date().format("%Y-%m-%d").to_string(),
            company_name: config.issuer.name.clone(),
            company_address: config.issuer.address.clone(),
            company_email: config.issuer.email.clone(),
            company_phone: config.issuer.phone.clone(),
            client_name: String::new(),
            client_email: None,
            client_phone: None,
            items: vec![InvoiceItem::default()],
            notes: None,
        }
    }

    /// The derived invoice total.
    pub fn total(&self) -> Decimal {
        recompute_total(&self.items)
    }

    /// Append a blank item (`"", 1, 0`).
    pub fn add_item(&mut self) {
        self.items.push(InvoiceItem::default());
    }

    /// Remove the item at `index`, keeping the order of the rest.
    ///
    /// Removing the last remaining item is allowed while editing; an empty
    /// list is rejected by validation at submission.
    pub fn remove_item(&mut self, index: usize) -> Option<InvoiceItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Fill the item at `index` from a catalog entry. Returns false when no
    /// such item exists.
    pub fn apply_suggestion(&mut self, index: usize, suggestion: &Suggestion) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                *item = item.with_suggestion(suggestion);
                true
            }
            None => false,
        }
    }

    /// Replace the client name's honorific with `honorific`.
    pub fn toggle_honorific(&mut self, honorific: Honorific) {
        self.client_name = apply_name_suffix(&self.client_name, honorific);
    }

    /// Trim every text field and turn empty optional fields into `None`.
    pub fn normalize(&mut self) {
        fn trim(s: &mut String) {
            let trimmed = s.trim();
            if trimmed.len() != s.len() {
                *s = trimmed.to_string();
            }
        }
        fn trim_optional(field: &mut Option<String>) {
            *field = field
                .take()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
        }

        trim(&mut self.invoice_number);
        trim(&mut self.date);
        trim(&mut self.company_name);
        trim(&mut self.company_address);
        trim(&mut self.company_email);
        trim(&mut self.company_phone);
        trim(&mut self.client_name);
        trim_optional(&mut self.client_email);
        trim_optional(&mut self.client_phone);
        trim_optional(&mut self.notes);
        for item in &mut self.items {
            trim(&mut item.description);
        }
    }

    /// File name the finished document is saved under.
    ///
    /// Path separators and other characters that are not allowed in file
    /// names become `_`, so the result is always a single path component.
    pub fn file_name(&self) -> String {
        let number: String = self
            .invoice_number
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        format!("invoice-{}.pdf", number)
    }
}
