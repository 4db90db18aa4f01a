//! Structured error types for the invoice pipeline.
//!
//! Validation failures carry every offending field at once. Everything else
//! (bad JSON, unusable fonts, encoding trouble, sink I/O) has its own variant
//! so the submission boundary can decide what the user gets to see.

use thiserror::Error;

use crate::model::ValidationErrors;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// JSON input failed to parse as an invoice record or template config.
    #[error("Failed to parse input: {source}{}", format_hint(.hint))]
    ParseError {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// One or more fields failed validation.
    #[error("Invoice is invalid:\n{0}")]
    Validation(ValidationErrors),
    /// A custom font could not be decoded, parsed, or embedded.
    #[error("Font error: {0}")]
    FontError(String),
    /// Layout or PDF generation failed.
    #[error("Render error: {0}")]
    RenderError(String),
    /// Writing the finished document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for InvoiceError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the invoice schema. Field names are camelCase (invoiceNumber, clientName, items[].price).".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        InvoiceError::ParseError { source: e, hint }
    }
}

impl From<ValidationErrors> for InvoiceError {
    fn from(errors: ValidationErrors) -> Self {
        InvoiceError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_carries_hint() {
        let err: InvoiceError = serde_json::from_str::<serde_json::Value>("{,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse input"));
        assert!(msg.contains("Hint: Check for trailing commas"));
    }

    #[test]
    fn validation_error_lists_fields() {
        let mut errors = ValidationErrors::default();
        errors.insert("clientName", "Client name is required");
        let msg = InvoiceError::from(errors).to_string();
        assert!(msg.contains("clientName: Client name is required"));
    }
}
