//! # Fixed-Template Layout
//!
//! Layout turns a validated invoice into a list of pages, each a list of
//! declarative instructions: text at a position, a filled rectangle, a line,
//! a circle, or a fragment of the line-item table. Nothing here touches PDF
//! syntax; the writer in [`crate::pdf`] is the only consumer, so the whole
//! template can be tested by inspecting instructions.
//!
//! ## Coordinates
//!
//! Millimeters on an A4 portrait page, origin at the top-left corner, y
//! growing downward. Text y is the baseline. Font sizes are in points.
//!
//! ## Flow
//!
//! Most of the template sits at fixed positions on the first page. Only the
//! table and the notes after it flow: [`PageFlow`] tracks the current page
//! and y, and opens a new page when the body limit is reached. Watermark and
//! footer are stamped on every page at the end.

pub mod invoice;
pub mod page_break;
pub mod table;

pub use invoice::{format_money, layout_invoice};
pub use table::TableEnd;

use crate::style::{Color, FontWeight, TextAlign};

/// A4 portrait, in millimeters.
pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;

/// Points per millimeter.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Baseline-to-baseline distance as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.15;

/// Convert a font size in points to millimeters.
pub fn pt_to_mm(pt: f64) -> f64 {
    pt / PT_PER_MM
}

/// Line pitch in millimeters for a font size in points.
pub fn line_height_mm(font_size: f64) -> f64 {
    pt_to_mm(font_size * LINE_HEIGHT_FACTOR)
}

/// Document information written to the PDF Info dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}

/// The laid-out document.
#[derive(Debug, Clone)]
pub struct DocumentLayout {
    pub width: f64,
    pub height: f64,
    pub pages: Vec<LayoutPage>,
    pub metadata: Metadata,
    /// Where the line-item table finished.
    pub table_end: TableEnd,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutPage {
    pub instructions: Vec<LayoutInstruction>,
}

/// One atomic placement directive.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutInstruction {
    Text(TextRun),
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Color,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Color,
    },
    Circle {
        cx: f64,
        cy: f64,
        radius: f64,
        fill: Color,
    },
    Table(TableFragment),
}

/// A single line of text anchored at (x, baseline y).
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f64,
    pub y: f64,
    pub content: String,
    pub font_size: f64,
    pub weight: FontWeight,
    pub color: Color,
    pub align: TextAlign,
}

/// The part of the line-item table that landed on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFragment {
    pub x: f64,
    pub y: f64,
    pub column_widths: Vec<f64>,
    pub rows: Vec<PlacedRow>,
    pub border_width: f64,
    pub border_color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Header,
    Body,
    Total,
}

/// A positioned table row. Cell text is already wrapped and placed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRow {
    pub kind: RowKind,
    pub y: f64,
    pub height: f64,
    pub fill: Option<Color>,
    pub cells: Vec<Vec<TextRun>>,
}

impl TableFragment {
    pub fn width(&self) -> f64 {
        self.column_widths.iter().sum()
    }

    pub fn bottom(&self) -> f64 {
        self.rows
            .last()
            .map(|r| r.y + r.height)
            .unwrap_or(self.y)
    }
}

impl LayoutPage {
    /// Every text run on the page, including table cell text.
    pub fn texts(&self) -> Vec<&TextRun> {
        let mut out = Vec::new();
        for instruction in &self.instructions {
            match instruction {
                LayoutInstruction::Text(run) => out.push(run),
                LayoutInstruction::Table(fragment) => {
                    for row in &fragment.rows {
                        for cell in &row.cells {
                            out.extend(cell.iter());
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableFragment> {
        self.instructions.iter().filter_map(|i| match i {
            LayoutInstruction::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn find_text(&self, content: &str) -> Option<&TextRun> {
        self.texts().into_iter().find(|t| t.content == content)
    }
}

impl DocumentLayout {
    pub fn find_text(&self, content: &str) -> Option<(usize, &TextRun)> {
        self.pages
            .iter()
            .enumerate()
            .find_map(|(i, p)| p.find_text(content).map(|t| (i, t)))
    }
}

/// Tracks the current page and vertical position while content flows.
#[derive(Debug)]
pub struct PageFlow {
    pages: Vec<LayoutPage>,
    /// Y where content starts on continuation pages.
    top: f64,
    /// Y content must not pass on any page.
    limit: f64,
    pub y: f64,
}

impl PageFlow {
    pub fn new(top: f64, limit: f64) -> Self {
        Self {
            pages: vec![LayoutPage::default()],
            top,
            limit,
            y: top,
        }
    }

    pub fn push(&mut self, instruction: LayoutInstruction) {
        // `pages` is never empty
        if let Some(page) = self.pages.last_mut() {
            page.instructions.push(instruction);
        }
    }

    pub fn new_page(&mut self) {
        self.pages.push(LayoutPage::default());
        self.y = self.top;
    }

    pub fn remaining(&self) -> f64 {
        self.limit - self.y
    }

    pub fn fits(&self, height: f64) -> bool {
        self.y + height <= self.limit
    }

    /// Nothing has been placed below the continuation top yet.
    pub fn at_top(&self) -> bool {
        self.y <= self.top
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn page_index(&self) -> usize {
        self.pages.len() - 1
    }

    pub fn finish(self) -> Vec<LayoutPage> {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_opens_pages_at_top() {
        let mut flow = PageFlow::new(20.0, 265.0);
        flow.y = 200.0;
        assert!(flow.fits(65.0));
        assert!(!flow.fits(65.1));
        flow.new_page();
        assert_eq!(flow.page_index(), 1);
        assert!(flow.at_top());
        assert_eq!(flow.remaining(), 245.0);
    }

    #[test]
    fn line_height_for_ten_points() {
        let h = line_height_mm(10.0);
        assert!((h - 4.057).abs() < 0.01);
    }

    #[test]
    fn texts_include_table_cells() {
        let run = |s: &str| TextRun {
            x: 0.0,
            y: 0.0,
            content: s.to_string(),
            font_size: 10.0,
            weight: FontWeight::Regular,
            color: Color::BLACK,
            align: TextAlign::Left,
        };
        let page = LayoutPage {
            instructions: vec![
                LayoutInstruction::Text(run("outside")),
                LayoutInstruction::Table(TableFragment {
                    x: 0.0,
                    y: 0.0,
                    column_widths: vec![10.0],
                    rows: vec![PlacedRow {
                        kind: RowKind::Body,
                        y: 0.0,
                        height: 5.0,
                        fill: None,
                        cells: vec![vec![run("inside")]],
                    }],
                    border_width: 0.1,
                    border_color: Color::BLACK,
                }),
            ],
        };
        assert!(page.find_text("outside").is_some());
        assert!(page.find_text("inside").is_some());
        assert_eq!(page.tables().next().map(|t| t.bottom()), Some(5.0));
    }
}
