//! # Text Layout
//!
//! Line breaking and text measurement for table cells and the notes block.
//!
//! Break opportunities come from UAX#14 (unicode-linebreak), which handles
//! CJK text without spaces as well as Latin words. Widths come from the
//! FontContext. All widths here are in points.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::FontContext;
use crate::style::FontWeight;

/// Font parameters for one wrapped block.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub font_size: f64,
    pub weight: FontWeight,
}

/// Break `text` into lines no wider than `max_width` points.
///
/// Newlines are honored as hard breaks and produce empty lines when doubled.
/// A single word wider than the line is broken between characters.
pub fn wrap_text(text: &str, max_width: f64, style: TextStyle, fonts: &FontContext) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let measure = |s: &str| fonts.measure_string(s, style.font_size, style.weight);

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;
    let mut start = 0;

    for (end, opp) in linebreaks(text) {
        let raw = &text[start..end];
        start = end;

        let mandatory = matches!(opp, BreakOpportunity::Mandatory);
        let segment = if mandatory {
            raw.trim_end_matches(['\n', '\r'])
        } else {
            raw
        };

        let segment_width = measure(segment);
        // Trailing spaces may hang past the edge.
        let visible_width = measure(segment.trim_end());

        if !current.is_empty() && current_width + visible_width > max_width {
            lines.push(current.trim_end().to_string());
            current.clear();
            current_width = 0.0;
        }

        if current.is_empty() && visible_width > max_width {
            for ch in segment.chars() {
                let w = measure(ch.encode_utf8(&mut [0u8; 4]));
                if !current.is_empty() && current_width + w > max_width && !ch.is_whitespace() {
                    lines.push(current.trim_end().to_string());
                    current.clear();
                    current_width = 0.0;
                }
                current.push(ch);
                current_width += w;
            }
        } else {
            current.push_str(segment);
            current_width += segment_width;
        }

        if mandatory {
            lines.push(current.trim_end().to_string());
            current.clear();
            current_width = 0.0;
        }
    }

    if !current.is_empty() {
        lines.push(current.trim_end().to_string());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TextStyle {
        TextStyle {
            font_size: 10.0,
            weight: FontWeight::Regular,
        }
    }

    #[test]
    fn short_text_is_one_line() {
        let fonts = FontContext::new();
        assert_eq!(wrap_text("Service A", 200.0, style(), &fonts), vec!["Service A"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        let fonts = FontContext::new();
        assert!(wrap_text("", 200.0, style(), &fonts).is_empty());
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let fonts = FontContext::new();
        let lines = wrap_text("alpha beta gamma delta epsilon", 60.0, style(), &fonts);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(fonts.measure_string(line, 10.0, FontWeight::Regular) <= 60.0);
            assert!(!line.ends_with(' '));
        }
        assert_eq!(lines.join(" "), "alpha beta gamma delta epsilon");
    }

    #[test]
    fn newlines_are_hard_breaks() {
        let fonts = FontContext::new();
        let lines = wrap_text("first\n\nthird", 500.0, style(), &fonts);
        assert_eq!(lines, vec!["first", "", "third"]);
    }

    #[test]
    fn overlong_word_breaks_between_characters() {
        let fonts = FontContext::new();
        let lines = wrap_text("WWWWWWWWWWWWWWWWWWWW", 40.0, style(), &fonts);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "WWWWWWWWWWWWWWWWWWWW");
    }
}
