//! Browser bindings. Each call takes the invoice record as camelCase JSON and
//! an optional template config as JSON; errors surface as JS `Error`s.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{parse_invoice, validate, InvoiceError, RenderOptions, TemplateConfig};

fn js_error(e: InvoiceError) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

fn template(config_json: Option<String>) -> Result<TemplateConfig, JsValue> {
    match config_json {
        Some(json) if !json.trim().is_empty() => TemplateConfig::from_json(&json).map_err(js_error),
        _ => Ok(TemplateConfig::default()),
    }
}

/// Validate and render an invoice. Returns the PDF bytes.
#[wasm_bindgen(js_name = renderInvoicePdf)]
pub fn render_invoice_pdf(json: &str, config_json: Option<String>) -> Result<Vec<u8>, JsValue> {
    let config = template(config_json)?;
    crate::render_json(json, &config, &RenderOptions::default()).map_err(js_error)
}

/// Field path → message for every failing field. Empty object when valid.
#[wasm_bindgen(js_name = validateInvoice)]
pub fn validate_invoice(json: &str) -> Result<JsValue, JsValue> {
    let data = parse_invoice(json).map_err(js_error)?;
    let errors = validate(&data).err().unwrap_or_default();
    // Plain object rather than a JS Map.
    errors
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

/// The file name a rendered invoice should be saved under.
#[wasm_bindgen(js_name = invoiceFileName)]
pub fn invoice_file_name(json: &str) -> Result<String, JsValue> {
    parse_invoice(json).map(|d| d.file_name()).map_err(js_error)
}
