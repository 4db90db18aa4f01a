//! # Template Configuration
//!
//! Everything about the printed invoice that belongs to the deployment rather
//! than to a single record: who issues it, what the labels say, which
//! currency symbol prefixes amounts, the quick-fill catalog, and an optional
//! custom font. Loaded from camelCase JSON; every field has a default so a
//! partial file only overrides what it names.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InvoiceError;
use crate::font::FontContext;
use crate::model::Suggestion;
use crate::style::Color;

/// Deployment-wide settings for the invoice template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateConfig {
    pub issuer: Issuer,
    pub labels: Labels,
    /// Prefix for every monetary value, e.g. `$` or `HK$`.
    pub currency_symbol: String,
    /// Large pale text drawn behind each page. `None` disables it.
    pub watermark: Option<String>,
    /// Prefix of generated invoice numbers (`<prefix>-YYMMDD-HHMM`).
    pub invoice_prefix: String,
    /// Header band, table header, and footer ornament color.
    pub accent_color: Color,
    pub catalog: Catalog,
    /// TrueType font used for all text instead of Helvetica.
    pub font: Option<FontEntry>,
}

/// The issuing company. Fixed per deployment, copied into each record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

/// Every piece of fixed text printed on the invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Labels {
    pub title: String,
    pub invoice_number: String,
    pub date: String,
    pub from: String,
    pub to: String,
    pub phone: String,
    pub email: String,
    pub description: String,
    pub quantity: String,
    pub price: String,
    pub amount: String,
    pub total: String,
    pub notes: String,
    pub thank_you: String,
    pub rights_reserved: String,
}

/// Quick-fill entries offered next to each line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Catalog {
    pub services: Vec<Suggestion>,
    pub products: Vec<Suggestion>,
}

/// A custom font to register with the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Font family name (e.g. "Noto Sans TC").
    pub family: String,
    /// Base64-encoded font data, or a data URI (e.g. "data:font/ttf;base64,...").
    pub src: String,
}

/// Per-call render settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Year printed in the copyright footer.
    pub year: i32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            year: chrono::Local::now().year(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            issuer: Issuer::default(),
            labels: Labels::default(),
            currency_symbol: "$".to_string(),
            watermark: Some("Sample Only".to_string()),
            invoice_prefix: "NNB-INV".to_string(),
            accent_color: Color::rgb8(99, 102, 241),
            catalog: Catalog::english(),
            font: None,
        }
    }
}

impl Default for Issuer {
    fn default() -> Self {
        Self {
            name: "Na Na Beauty".to_string(),
            address: "Shop S129, 2/F, Capital Plaza, 61-65 Chatham Road South, Tsim Sha Tsui, Kowloon"
                .to_string(),
            email: "info@nanabeauty.com".to_string(),
            phone: "98375219".to_string(),
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            title: "INVOICE".to_string(),
            invoice_number: "Invoice #:".to_string(),
            date: "Date:".to_string(),
            from: "From:".to_string(),
            to: "To:".to_string(),
            phone: "Phone:".to_string(),
            email: "Email:".to_string(),
            description: "Description".to_string(),
            quantity: "Quantity".to_string(),
            price: "Price".to_string(),
            amount: "Amount".to_string(),
            total: "Total:".to_string(),
            notes: "Notes:".to_string(),
            thank_you: "Thank you for your business!".to_string(),
            rights_reserved: "All rights reserved.".to_string(),
        }
    }
}

impl Labels {
    /// Traditional Chinese labels. Needs a custom font with CJK coverage.
    pub fn traditional_chinese() -> Self {
        Self {
            title: "發票".to_string(),
            invoice_number: "發票號碼：".to_string(),
            date: "日期：".to_string(),
            from: "發出人：".to_string(),
            to: "客戶：".to_string(),
            phone: "電話：".to_string(),
            email: "電郵：".to_string(),
            description: "商品描述".to_string(),
            quantity: "數量".to_string(),
            price: "單價".to_string(),
            amount: "金額".to_string(),
            total: "總計：".to_string(),
            notes: "備註：".to_string(),
            thank_you: "感謝您的惠顧！".to_string(),
            rights_reserved: "版權所有。".to_string(),
        }
    }
}

fn entry(description: &str, price: i64) -> Suggestion {
    Suggestion {
        description: description.to_string(),
        price: Decimal::from(price),
    }
}

impl Catalog {
    pub fn english() -> Self {
        Self {
            services: vec![
                entry("Basic Manicure", 380),
                entry("Hand Care Package", 480),
                entry("Foot Care Package", 580),
                entry("Gel Manicure", 480),
                entry("Gel Removal", 100),
            ],
            products: vec![
                entry("OPI Nail Polish", 150),
                entry("Hand Cream", 120),
                entry("Foot Cream", 120),
                entry("Nail Repair Serum", 180),
                entry("Nail Polish Remover", 80),
                entry("Nail File Set", 100),
            ],
        }
    }

    pub fn traditional_chinese() -> Self {
        Self {
            services: vec![
                entry("基本美甲服務", 380),
                entry("手部護理套餐", 480),
                entry("足部護理套餐", 580),
                entry("光療美甲服務", 480),
                entry("卸甲服務", 100),
            ],
            products: vec![
                entry("指甲油 OPI", 150),
                entry("手部護理霜", 120),
                entry("足部護理霜", 120),
                entry("指甲修護精華", 180),
                entry("去甲油液", 80),
                entry("指甲銼刀套裝", 100),
            ],
        }
    }

    /// Services first, then products.
    pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
        self.services.iter().chain(self.products.iter())
    }
}

impl TemplateConfig {
    /// The deployment as it ships in Hong Kong: Chinese labels, catalog and
    /// address, priced in HK dollars. Pair it with a CJK `font`.
    pub fn traditional_chinese() -> Self {
        Self {
            issuer: Issuer {
                address: "九龍尖沙咀漆咸道南61 - 65號 首都廣場2樓S129室".to_string(),
                ..Issuer::default()
            },
            labels: Labels::traditional_chinese(),
            catalog: Catalog::traditional_chinese(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, InvoiceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the fonts this template prints with.
    pub fn font_context(&self) -> Result<FontContext, InvoiceError> {
        match &self.font {
            Some(entry) => FontContext::from_source(&entry.family, &entry.src),
            None => Ok(FontContext::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = TemplateConfig::from_json(r#"{ "currencySymbol": "HK$" }"#).unwrap();
        assert_eq!(config.currency_symbol, "HK$");
        assert_eq!(config.issuer.name, "Na Na Beauty");
        assert_eq!(config.labels.total, "Total:");
        assert_eq!(config.invoice_prefix, "NNB-INV");
    }

    #[test]
    fn accent_color_accepts_hex() {
        let config = TemplateConfig::from_json(r##"{ "accentColor": "#0f766e" }"##).unwrap();
        assert_eq!(config.accent_color, Color::rgb8(15, 118, 110));
        assert!(TemplateConfig::from_json(r#"{ "accentColor": "teal" }"#).is_err());
    }

    #[test]
    fn watermark_can_be_disabled() {
        let config = TemplateConfig::from_json(r#"{ "watermark": null }"#).unwrap();
        assert!(config.watermark.is_none());
    }

    #[test]
    fn partial_labels_merge_with_defaults() {
        let config = TemplateConfig::from_json(r#"{ "labels": { "title": "RECEIPT" } }"#).unwrap();
        assert_eq!(config.labels.title, "RECEIPT");
        assert_eq!(config.labels.notes, "Notes:");
    }

    #[test]
    fn catalog_prices_parse_from_numbers() {
        let config = TemplateConfig::from_json(
            r#"{ "catalog": { "services": [{ "description": "Polish", "price": 99.5 }] } }"#,
        )
        .unwrap();
        assert_eq!(config.catalog.services.len(), 1);
        assert_eq!(config.catalog.services[0].price, Decimal::new(995, 1));
        assert!(config.catalog.products.is_empty());
    }

    #[test]
    fn chinese_preset_keeps_issuer_identity() {
        let config = TemplateConfig::traditional_chinese();
        assert_eq!(config.issuer.name, "Na Na Beauty");
        assert!(config.issuer.address.contains("首都廣場"));
        assert_eq!(config.catalog.iter().count(), 11);
    }

    #[test]
    fn default_font_context_is_standard() {
        assert!(TemplateConfig::default().font_context().is_ok());
    }
}
