//! # Table Flow
//!
//! Lays out a grid table row by row into a [`PageFlow`]. Cell text wraps
//! inside its column and each row is as tall as its tallest cell. Rows never
//! split; when the next rows don't fit above the page limit the table
//! continues on a new page, repeating the header row at the top.

use crate::font::FontContext;
use crate::style::{Color, FontWeight, TextAlign};
use crate::text::{wrap_text, TextStyle};

use super::page_break::{decide_break, BreakDecision, BreakRules};
use super::{
    line_height_mm, pt_to_mm, LayoutInstruction, PageFlow, PlacedRow, RowKind, TableFragment,
    TextRun, PT_PER_MM,
};

/// Visual parameters of the table.
#[derive(Debug, Clone)]
pub struct TableStyle {
    pub font_size: f64,
    /// Inner padding of every cell, in millimeters.
    pub cell_padding: f64,
    pub header_fill: Color,
    pub header_text: Color,
    pub body_fill: Color,
    pub body_text: Color,
    pub border_width: f64,
    pub border_color: Color,
}

/// One row of cell strings before layout.
#[derive(Debug, Clone)]
pub struct RowSpec {
    pub kind: RowKind,
    pub cells: Vec<String>,
}

/// A table ready to flow.
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub x: f64,
    pub width: f64,
    /// Fraction of `width` taken by each column.
    pub column_fractions: Vec<f64>,
    pub header: Vec<String>,
    pub rows: Vec<RowSpec>,
    pub style: TableStyle,
    pub break_rules: BreakRules,
}

/// Where the table finished: page index and the y just below the last row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TableEnd {
    pub page: usize,
    pub y: f64,
}

struct MeasuredRow {
    kind: RowKind,
    lines: Vec<Vec<String>>,
    height: f64,
}

impl TableSpec {
    fn column_widths(&self) -> Vec<f64> {
        self.column_fractions.iter().map(|f| self.width * f).collect()
    }

    fn text_style(&self, kind: RowKind) -> TextStyle {
        TextStyle {
            font_size: self.style.font_size,
            weight: match kind {
                RowKind::Body => FontWeight::Regular,
                RowKind::Header | RowKind::Total => FontWeight::Bold,
            },
        }
    }

    fn measure(&self, kind: RowKind, cells: &[String], widths: &[f64], fonts: &FontContext) -> MeasuredRow {
        let style = self.text_style(kind);
        let padding = self.style.cell_padding;
        let lines: Vec<Vec<String>> = cells
            .iter()
            .zip(widths)
            .map(|(text, w)| {
                let inner_pt = (w - 2.0 * padding).max(0.0) * PT_PER_MM;
                wrap_text(text, inner_pt, style, fonts)
            })
            .collect();
        let line_count = lines.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let height = 2.0 * padding + line_count as f64 * line_height_mm(self.style.font_size);
        MeasuredRow {
            kind,
            lines,
            height,
        }
    }

    fn place(&self, row: &MeasuredRow, y: f64, widths: &[f64]) -> PlacedRow {
        let style = self.text_style(row.kind);
        let (fill, color) = match row.kind {
            RowKind::Header => (self.style.header_fill, self.style.header_text),
            RowKind::Body | RowKind::Total => (self.style.body_fill, self.style.body_text),
        };
        let pitch = line_height_mm(self.style.font_size);
        let ascent = pt_to_mm(self.style.font_size) * 0.8;

        let mut cell_x = self.x;
        let mut cells = Vec::with_capacity(widths.len());
        for (i, w) in widths.iter().enumerate() {
            let runs = row
                .lines
                .get(i)
                .map(|lines| {
                    lines
                        .iter()
                        .enumerate()
                        .map(|(k, line)| TextRun {
                            x: cell_x + self.style.cell_padding,
                            y: y + self.style.cell_padding + ascent + k as f64 * pitch,
                            content: line.clone(),
                            font_size: style.font_size,
                            weight: style.weight,
                            color,
                            align: TextAlign::Left,
                        })
                        .collect()
                })
                .unwrap_or_default();
            cells.push(runs);
            cell_x += w;
        }

        PlacedRow {
            kind: row.kind,
            y,
            height: row.height,
            fill: Some(fill),
            cells,
        }
    }

    fn fragment(&self, y: f64, widths: &[f64], rows: Vec<PlacedRow>) -> TableFragment {
        TableFragment {
            x: self.x,
            y,
            column_widths: widths.to_vec(),
            rows,
            border_width: self.style.border_width,
            border_color: self.style.border_color,
        }
    }
}

/// Flow `spec` into `flow` starting at the current y.
pub fn flow_table(spec: &TableSpec, flow: &mut PageFlow, fonts: &FontContext) -> TableEnd {
    let widths = spec.column_widths();
    let header = spec.measure(RowKind::Header, &spec.header, &widths, fonts);
    let body: Vec<MeasuredRow> = spec
        .rows
        .iter()
        .map(|r| spec.measure(r.kind, &r.cells, &widths, fonts))
        .collect();
    let heights: Vec<f64> = body.iter().map(|r| r.height).collect();

    let mut next = 0;
    loop {
        let available = flow.remaining() - header.height;
        let mut count = match decide_break(available, &heights[next..], spec.break_rules) {
            BreakDecision::Place => heights.len() - next,
            BreakDecision::Split {
                units_on_current_page,
            } => units_on_current_page,
            BreakDecision::MoveToNextPage => 0,
        };
        // A row taller than a whole page still has to go somewhere.
        if count == 0 && flow.at_top() {
            count = 1.min(heights.len() - next);
        }

        if count > 0 || body.is_empty() {
            let top = flow.y;
            let mut placed = vec![spec.place(&header, top, &widths)];
            let mut y = top + header.height;
            for row in &body[next..next + count] {
                placed.push(spec.place(row, y, &widths));
                y += row.height;
            }
            flow.push(LayoutInstruction::Table(spec.fragment(top, &widths, placed)));
            flow.y = y;
            next += count;
        }

        if next >= body.len() {
            break;
        }
        flow.new_page();
    }

    TableEnd {
        page: flow.page_index(),
        y: flow.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(rows: usize) -> TableSpec {
        TableSpec {
            x: 14.0,
            width: 182.0,
            column_fractions: vec![0.46, 0.16, 0.19, 0.19],
            header: ["Description", "Quantity", "Price", "Amount"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows: (0..rows)
                .map(|i| RowSpec {
                    kind: RowKind::Body,
                    cells: vec![format!("Item {}", i), "1".into(), "$1.00".into(), "$1.00".into()],
                })
                .collect(),
            style: TableStyle {
                font_size: 10.0,
                cell_padding: 3.0,
                header_fill: Color::BLACK,
                header_text: Color::WHITE,
                body_fill: Color::WHITE,
                body_text: Color::BLACK,
                border_width: 0.1,
                border_color: Color::BLACK,
            },
            break_rules: BreakRules {
                min_orphans: 1,
                min_widows: 2,
            },
        }
    }

    fn fragments(flow: PageFlow) -> Vec<Vec<TableFragment>> {
        flow.finish()
            .into_iter()
            .map(|p| p.tables().cloned().collect())
            .collect()
    }

    #[test]
    fn small_table_stays_on_one_page() {
        let fonts = FontContext::new();
        let mut flow = PageFlow::new(20.0, 265.0);
        flow.y = 150.0;
        let end = flow_table(&spec(3), &mut flow, &fonts);
        assert_eq!(end.page, 0);
        let pages = fragments(flow);
        assert_eq!(pages.len(), 1);
        let table = &pages[0][0];
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[0].kind, RowKind::Header);
        assert!((table.bottom() - end.y).abs() < 1e-9);
        assert!((table.width() - 182.0).abs() < 1e-9);
    }

    #[test]
    fn long_table_repeats_header_on_next_page() {
        let fonts = FontContext::new();
        let mut flow = PageFlow::new(20.0, 265.0);
        flow.y = 150.0;
        let end = flow_table(&spec(40), &mut flow, &fonts);
        assert!(end.page >= 1);

        let pages = fragments(flow);
        let mut body_rows = 0;
        for page in &pages {
            assert_eq!(page.len(), 1);
            let table = &page[0];
            assert_eq!(table.rows[0].kind, RowKind::Header);
            assert!(table.bottom() <= 265.0 + 1e-9);
            body_rows += table.rows.len() - 1;
        }
        assert_eq!(body_rows, 40);
        assert_eq!(pages[1][0].y, 20.0);
    }

    #[test]
    fn last_row_is_never_alone_on_a_page() {
        let fonts = FontContext::new();
        let s = spec(30);
        for start in [150.0, 160.0, 170.0, 180.0, 190.0, 200.0] {
            let mut flow = PageFlow::new(20.0, 265.0);
            flow.y = start;
            flow_table(&s, &mut flow, &fonts);
            let pages = fragments(flow);
            let last = pages.last().and_then(|p| p.last()).unwrap();
            assert!(last.rows.len() - 1 >= 2, "start {}", start);
        }
    }

    #[test]
    fn wrapped_description_makes_row_taller() {
        let fonts = FontContext::new();
        let mut s = spec(2);
        s.rows[1].cells[0] =
            "A very long description of a service that will not fit into a single line of the column"
                .to_string();
        let mut flow = PageFlow::new(20.0, 265.0);
        flow.y = 150.0;
        flow_table(&s, &mut flow, &fonts);
        let pages = fragments(flow);
        let rows = &pages[0][0].rows;
        assert!(rows[2].height > rows[1].height);
        assert!(rows[2].cells[0].len() > 1);
    }

    #[test]
    fn empty_cells_have_no_text() {
        let fonts = FontContext::new();
        let mut s = spec(1);
        s.rows.push(RowSpec {
            kind: RowKind::Total,
            cells: vec![String::new(), String::new(), "Total:".into(), "$1.00".into()],
        });
        let mut flow = PageFlow::new(20.0, 265.0);
        flow.y = 150.0;
        flow_table(&s, &mut flow, &fonts);
        let pages = fragments(flow);
        let total = pages[0][0].rows.last().unwrap();
        assert_eq!(total.kind, RowKind::Total);
        assert!(total.cells[0].is_empty());
        assert!(total.cells[1].is_empty());
        assert_eq!(total.cells[2][0].content, "Total:");
        assert_eq!(total.cells[2][0].weight, FontWeight::Bold);
    }
}
