//! # Forme Invoice
//!
//! An invoice form model and a fixed-template PDF renderer.
//!
//! A form session edits one invoice record: issuer and client details, a
//! list of line items, notes. The total is always derived from the items.
//! On submission the record is validated, laid out on the template, written
//! as PDF bytes, and handed to a download sink under
//! `invoice-<invoiceNumber>.pdf`.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON / form edits)
//!       ↓
//!   [model]    : Invoice record, derived total, validation, honorifics
//!       ↓
//!   [layout]   : Fixed template; table and notes flow across pages
//!       ↓
//!   [pdf]      : Serialize to PDF bytes
//!       ↓
//!   [form]     : Submission: validate → render → save → reset
//! ```
//!
//! Template text, issuer details, currency, catalog and fonts live in
//! [`config::TemplateConfig`] so the same renderer serves the English and
//! the Traditional Chinese deployment.

pub mod config;
pub mod error;
pub mod font;
pub mod form;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

use tracing::info;

pub use config::{RenderOptions, TemplateConfig};
pub use error::InvoiceError;
pub use model::{validate, InvoiceData, InvoiceItem, ValidationErrors};

use font::FontContext;
use layout::layout_invoice;
use pdf::PdfWriter;

/// Render an invoice record to PDF bytes.
///
/// The record is rendered as given; run [`validate`] first. Fails only when
/// the configured font is unusable or the document cannot be written.
pub fn render(
    data: &InvoiceData,
    config: &TemplateConfig,
    options: &RenderOptions,
) -> Result<Vec<u8>, InvoiceError> {
    let fonts = config.font_context()?;
    render_with_fonts(data, config, options, &fonts)
}

/// Like [`render`], reusing fonts that were already loaded.
pub fn render_with_fonts(
    data: &InvoiceData,
    config: &TemplateConfig,
    options: &RenderOptions,
    fonts: &FontContext,
) -> Result<Vec<u8>, InvoiceError> {
    let layout = layout_invoice(data, config, options, fonts);
    let bytes = PdfWriter::new().write(&layout, fonts)?;
    info!(
        invoice_number = %data.invoice_number,
        pages = layout.pages.len(),
        bytes = bytes.len(),
        "rendered invoice"
    );
    Ok(bytes)
}

/// Parse a camelCase JSON invoice record and normalize its text fields.
pub fn parse_invoice(json: &str) -> Result<InvoiceData, InvoiceError> {
    let mut data: InvoiceData = serde_json::from_str(json)?;
    data.normalize();
    Ok(data)
}

/// Parse, validate and render a JSON invoice record.
pub fn render_json(
    json: &str,
    config: &TemplateConfig,
    options: &RenderOptions,
) -> Result<Vec<u8>, InvoiceError> {
    let data = parse_invoice(json)?;
    validate(&data)?;
    render(&data, config, options)
}
