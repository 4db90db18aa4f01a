//! # Font Management
//!
//! The template prints with Helvetica and Helvetica-Bold, which every PDF
//! viewer ships and which need no embedding. They only cover WinAnsi, so a
//! deployment that prints Traditional Chinese labels or addresses registers a
//! TrueType font instead; that font is parsed with ttf-parser for metrics and
//! embedded whole by the PDF writer.

pub mod metrics;

use std::collections::HashMap;

use base64::Engine as _;
use tracing::debug;

use crate::error::InvoiceError;
use crate::style::FontWeight;
pub use metrics::StandardFontMetrics;

/// Identifies one PDF font resource.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontKey {
    pub family: String,
    pub weight: FontWeight,
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the standard PDF fonts. No embedding needed.
    Standard(StandardFont),
    /// A TrueType/OpenType font that needs to be embedded.
    Custom {
        family: String,
        data: Vec<u8>,
        metrics: CustomFontMetrics,
    },
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    /// Maps characters to their glyph IDs in the font.
    pub glyph_ids: HashMap<char, u16>,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();
        let mut default_advance = 0u16;

        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    glyph_ids.insert(ch, glyph_id.0);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            glyph_ids,
        })
    }
}

/// The standard PDF fonts the template uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
        }
    }
}

/// The fonts available to one render call.
#[derive(Debug, Clone)]
pub struct FontContext {
    regular: FontData,
    bold: FontData,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    /// Helvetica for regular text, Helvetica-Bold for bold text.
    pub fn new() -> Self {
        Self {
            regular: FontData::Standard(StandardFont::Helvetica),
            bold: FontData::Standard(StandardFont::HelveticaBold),
        }
    }

    /// Use one TrueType face for every weight.
    pub fn with_custom(family: &str, data: Vec<u8>) -> Result<Self, InvoiceError> {
        let metrics = CustomFontMetrics::from_font_data(&data).ok_or_else(|| {
            InvoiceError::FontError(format!("Failed to parse TTF data for font '{}'", family))
        })?;
        debug!(family, glyphs = metrics.glyph_ids.len(), "registered custom font");
        let font = FontData::Custom {
            family: family.to_string(),
            data,
            metrics,
        };
        Ok(Self {
            regular: font.clone(),
            bold: font,
        })
    }

    /// Decode a base64 string or `data:` URI and register it as the custom face.
    pub fn from_source(family: &str, src: &str) -> Result<Self, InvoiceError> {
        let data = decode_font_source(src)?;
        Self::with_custom(family, data)
    }

    pub fn resolve(&self, weight: FontWeight) -> &FontData {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }

    /// The resource key text of this weight is written with. A custom face
    /// serves both weights, so both map to the same key.
    pub fn key_for(&self, weight: FontWeight) -> FontKey {
        match self.resolve(weight) {
            FontData::Standard(font) => FontKey {
                family: font.pdf_name().to_string(),
                weight,
            },
            FontData::Custom { family, .. } => FontKey {
                family: family.clone(),
                weight: FontWeight::Regular,
            },
        }
    }

    /// Advance width of one character in points.
    pub fn char_width(&self, ch: char, font_size: f64, weight: FontWeight) -> f64 {
        match self.resolve(weight) {
            FontData::Standard(font) => font.metrics().char_width(ch, font_size),
            FontData::Custom { metrics, .. } => metrics.char_width(ch, font_size),
        }
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64, weight: FontWeight) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size, weight))
            .sum()
    }
}

/// Decode font bytes from a data URI or a raw base64 string.
pub fn decode_font_source(src: &str) -> Result<Vec<u8>, InvoiceError> {
    let b64 = match src.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| {
                InvoiceError::FontError("Font data URI must be base64-encoded".to_string())
            })?,
        None => src,
    };
    base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| InvoiceError::FontError(format!("Invalid base64 font data: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_context_has_distinct_bold_key() {
        let ctx = FontContext::new();
        assert_eq!(ctx.key_for(FontWeight::Regular).family, "Helvetica");
        assert_eq!(ctx.key_for(FontWeight::Bold).family, "Helvetica-Bold");
    }

    #[test]
    fn measure_string_sums_widths() {
        let ctx = FontContext::new();
        let w = ctx.measure_string("ab", 10.0, FontWeight::Regular);
        let expected = ctx.char_width('a', 10.0, FontWeight::Regular)
            + ctx.char_width('b', 10.0, FontWeight::Regular);
        assert!((w - expected).abs() < 1e-9);
    }

    #[test]
    fn garbage_font_is_rejected() {
        let err = FontContext::with_custom("Broken", vec![0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, InvoiceError::FontError(_)));
    }

    #[test]
    fn data_uri_without_base64_is_rejected() {
        assert!(decode_font_source("data:font/ttf,abc").is_err());
    }

    #[test]
    fn raw_base64_decodes() {
        assert_eq!(decode_font_source("AAEC").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn data_uri_decodes() {
        assert_eq!(
            decode_font_source("data:font/ttf;base64,AAEC").unwrap(),
            vec![0, 1, 2]
        );
    }
}
