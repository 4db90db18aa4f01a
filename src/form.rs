//! # Form Session
//!
//! One editing session over one invoice record. Edits go through
//! [`InvoiceForm`] so the total preview is always [`InvoiceData::total`] of
//! the current items. [`InvoiceForm::submit`] runs the whole pipeline and
//! hands the finished document to a [`DownloadSink`]; only a successful save
//! resets the form.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{Catalog, RenderOptions, TemplateConfig};
use crate::error::InvoiceError;
use crate::font::FontContext;
use crate::model::{validate, Honorific, InvoiceData, Suggestion, ValidationErrors};

/// A finished document ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Where finished documents go.
pub trait DownloadSink {
    fn save(&self, download: &Download) -> Result<(), InvoiceError>;
}

/// Writes each download as a file in one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn save(&self, download: &Download) -> Result<(), InvoiceError> {
        let name = Path::new(&download.file_name);
        if name.file_name() != Some(name.as_os_str()) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a plain file name: {}", download.file_name),
            )
            .into());
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        fs::write(&path, &download.bytes)?;
        info!(path = %path.display(), bytes = download.bytes.len(), "saved invoice");
        Ok(())
    }
}

/// Keeps downloads in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: RefCell<Vec<Download>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.saved.borrow().clone()
    }

    pub fn take(&self) -> Vec<Download> {
        self.saved.take()
    }
}

impl DownloadSink for MemorySink {
    fn save(&self, download: &Download) -> Result<(), InvoiceError> {
        self.saved.borrow_mut().push(download.clone());
        Ok(())
    }
}

/// Why a submission did not produce a saved document.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The record has field errors; nothing was rendered.
    #[error("Please correct the highlighted fields:\n{0}")]
    Invalid(ValidationErrors),
    /// Rendering or saving failed. Details are in the log.
    #[error("Failed to generate PDF. Please try again.")]
    Failed,
}

/// An invoice being edited.
pub struct InvoiceForm {
    config: TemplateConfig,
    fonts: FontContext,
    clock: fn() -> NaiveDateTime,
    record: InvoiceData,
    errors: ValidationErrors,
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

fn optional(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl InvoiceForm {
    /// Open a session with a fresh record stamped with the local time.
    pub fn new(config: TemplateConfig) -> Result<Self, InvoiceError> {
        Self::with_clock(config, local_now)
    }

    /// Open a session that reads the time from `clock`.
    pub fn with_clock(config: TemplateConfig, clock: fn() -> NaiveDateTime) -> Result<Self, InvoiceError> {
        let fonts = config.font_context()?;
        let record = InvoiceData::new_default(&config, clock());
        Ok(Self {
            config,
            fonts,
            clock,
            record,
            errors: ValidationErrors::default(),
        })
    }

    pub fn record(&self) -> &InvoiceData {
        &self.record
    }

    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    /// The total preview.
    pub fn total(&self) -> Decimal {
        self.record.total()
    }

    /// Field errors from the last submission attempt.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn catalog(&self) -> &Catalog {
        &self.config.catalog
    }

    /// Replace the generated invoice number. The number is kept across
    /// failed submissions.
    pub fn set_invoice_number(&mut self, number: &str) {
        self.record.invoice_number = number.to_string();
    }

    pub fn set_date(&mut self, date: &str) {
        self.record.date = date.to_string();
    }

    pub fn set_client_name(&mut self, name: &str) {
        self.record.client_name = name.to_string();
    }

    pub fn set_client_email(&mut self, email: &str) {
        self.record.client_email = optional(email);
    }

    pub fn set_client_phone(&mut self, phone: &str) {
        self.record.client_phone = optional(phone);
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.record.notes = optional(notes);
    }

    pub fn toggle_honorific(&mut self, honorific: Honorific) {
        self.record.toggle_honorific(honorific);
    }

    pub fn add_item(&mut self) {
        self.record.add_item();
    }

    pub fn remove_item(&mut self, index: usize) -> bool {
        self.record.remove_item(index).is_some()
    }

    pub fn set_item_description(&mut self, index: usize, description: &str) -> bool {
        match self.record.items.get_mut(index) {
            Some(item) => {
                item.description = description.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_item_quantity(&mut self, index: usize, quantity: i64) -> bool {
        match self.record.items.get_mut(index) {
            Some(item) => {
                item.quantity = Decimal::from(quantity);
                true
            }
            None => false,
        }
    }

    pub fn set_item_price(&mut self, index: usize, price: Decimal) -> bool {
        match self.record.items.get_mut(index) {
            Some(item) => {
                item.price = price;
                true
            }
            None => false,
        }
    }

    pub fn apply_suggestion(&mut self, index: usize, suggestion: &Suggestion) -> bool {
        self.record.apply_suggestion(index, suggestion)
    }

    /// Validate, render and save the current record.
    ///
    /// On success the form starts over with a fresh record and the saved
    /// invoice number is returned. On any failure the record is left as it
    /// was so the user can fix it and submit again.
    pub fn submit(&mut self, sink: &dyn DownloadSink) -> Result<String, SubmitError> {
        let mut data = self.record.clone();
        data.normalize();

        if let Err(errors) = validate(&data) {
            warn!(
                invoice_number = %data.invoice_number,
                fields = errors.len(),
                "submission rejected"
            );
            self.errors = errors.clone();
            return Err(SubmitError::Invalid(errors));
        }
        self.errors = ValidationErrors::default();

        let now = (self.clock)();
        let options = RenderOptions { year: now.year() };
        let bytes = crate::render_with_fonts(&data, &self.config, &options, &self.fonts).map_err(|e| {
            error!(invoice_number = %data.invoice_number, error = %e, "failed to render invoice");
            SubmitError::Failed
        })?;

        let download = Download {
            file_name: data.file_name(),
            bytes,
        };
        sink.save(&download).map_err(|e| {
            error!(file_name = %download.file_name, error = %e, "failed to save invoice");
            SubmitError::Failed
        })?;

        info!(invoice_number = %data.invoice_number, "invoice submitted");
        self.record = InvoiceData::new_default(&self.config, now);
        Ok(data.invoice_number)
    }
}
