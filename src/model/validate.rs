//! Field validation for a whole record.
//!
//! Every rule runs on every call; the result maps each failing field path
//! (`clientName`, `items[2].price`) to the message shown next to that field.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidateEmail;

use super::{checked_total, InvoiceData};

/// Field path → message, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}: {}", field, message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn require(errors: &mut ValidationErrors, field: &str, value: &str, message: &str) -> bool {
    if value.trim().is_empty() {
        errors.insert(field, message);
        false
    } else {
        true
    }
}

/// Check every field of `data`. Returns all failures together.
pub fn validate(data: &InvoiceData) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    require(&mut errors, "invoiceNumber", &data.invoice_number, "Invoice number is required");
    if require(&mut errors, "date", &data.date, "Date is required")
        && NaiveDate::parse_from_str(data.date.trim(), "%Y-%m-%d").is_err()
    {
        errors.insert("date", "Date must be a valid YYYY-MM-DD date");
    }

    require(&mut errors, "companyName", &data.company_name, "Company name is required");
    require(&mut errors, "companyAddress", &data.company_address, "Company address is required");
    require(&mut errors, "companyEmail", &data.company_email, "Company email is required");
    require(&mut errors, "companyPhone", &data.company_phone, "Company phone is required");

    require(&mut errors, "clientName", &data.client_name, "Client name is required");
    if let Some(email) = data.client_email.as_ref().map(|e| e.trim().to_string()) {
        if !email.is_empty() && !email.validate_email() {
            errors.insert("clientEmail", "Invalid email address");
        }
    }

    if data.items.is_empty() {
        errors.insert("items", "At least one item is required");
    }
    for (i, item) in data.items.iter().enumerate() {
        require(
            &mut errors,
            &format!("items[{}].description", i),
            &item.description,
            "Item description is required",
        );
        if item.quantity < Decimal::ONE {
            errors.insert(format!("items[{}].quantity", i), "Minimum quantity is 1");
        } else if !item.quantity.fract().is_zero() {
            errors.insert(format!("items[{}].quantity", i), "Quantity must be a whole number");
        }
        if item.price < Decimal::ZERO {
            errors.insert(format!("items[{}].price", i), "Price cannot be negative");
        } else if item.checked_line_amount().is_none() {
            errors.insert(format!("items[{}].price", i), "Amount is too large");
        }
    }
    if !data.items.is_empty() && checked_total(&data.items).is_none() {
        errors.insert("items", "Total is too large");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
