//! # Invoice Template
//!
//! Places one invoice record on A4 pages. The first page carries the header
//! band, invoice metadata and both party blocks at fixed positions. The
//! line-item table starts below them and flows onto continuation pages, then
//! the notes follow the table. Watermark and footer are stamped on every
//! page once the page count is known.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::config::{RenderOptions, TemplateConfig};
use crate::font::FontContext;
use crate::model::InvoiceData;
use crate::style::{Color, FontWeight, TextAlign};
use crate::text::{wrap_text, TextStyle};

use super::page_break::BreakRules;
use super::table::{flow_table, RowSpec, TableSpec, TableStyle};
use super::{
    line_height_mm, DocumentLayout, LayoutInstruction, LayoutPage, Metadata, PageFlow, RowKind,
    TextRun, PAGE_HEIGHT, PAGE_WIDTH, PT_PER_MM,
};

const CENTER_X: f64 = PAGE_WIDTH / 2.0;
const MARGIN_LEFT: f64 = 20.0;
const MARGIN_RIGHT: f64 = 190.0;
const BLOCK_PITCH: f64 = 5.0;
const ORNAMENT_RADIUS: f64 = 2.0;

const TABLE_TOP: f64 = 150.0;
const TABLE_X: f64 = 14.0;
const TABLE_WIDTH: f64 = 182.0;
const COLUMN_FRACTIONS: [f64; 4] = [0.46, 0.16, 0.19, 0.19];

/// Where flowing content starts on continuation pages.
const CONTINUATION_TOP: f64 = 20.0;
/// Flowing content stays above the footer divider.
const BODY_LIMIT: f64 = PAGE_HEIGHT - 32.0;

const NOTES_LABEL_GAP: f64 = 20.0;
const NOTES_TEXT_GAP: f64 = 25.0;
const NOTES_SIZE: f64 = 9.0;

fn text_gray() -> Color {
    Color::rgb8(75, 85, 99)
}

fn footer_gray() -> Color {
    Color::rgb8(156, 163, 175)
}

/// `<symbol><amount>` with exactly two decimals, half away from zero.
pub fn format_money(symbol: &str, amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{}{:.2}", symbol, rounded)
}

fn text(x: f64, y: f64, content: impl Into<String>, font_size: f64) -> TextRun {
    TextRun {
        x,
        y,
        content: content.into(),
        font_size,
        weight: FontWeight::Regular,
        color: text_gray(),
        align: TextAlign::Left,
    }
}

impl TextRun {
    fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }

    fn colored(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// A horizontal rule with a filled dot at each end.
fn ornament_rule(y: f64, color: Color) -> [LayoutInstruction; 3] {
    [
        LayoutInstruction::Line {
            x1: MARGIN_LEFT,
            y1: y,
            x2: MARGIN_RIGHT,
            y2: y,
            width: 0.5,
            color,
        },
        LayoutInstruction::Circle {
            cx: MARGIN_LEFT,
            cy: y,
            radius: ORNAMENT_RADIUS,
            fill: color,
        },
        LayoutInstruction::Circle {
            cx: MARGIN_RIGHT,
            cy: y,
            radius: ORNAMENT_RADIUS,
            fill: color,
        },
    ]
}

fn first_page(data: &InvoiceData, config: &TemplateConfig, flow: &mut PageFlow) {
    let labels = &config.labels;

    flow.push(LayoutInstruction::Rect {
        x: 0.0,
        y: 0.0,
        width: PAGE_WIDTH,
        height: 40.0,
        fill: config.accent_color,
    });
    for i in ornament_rule(45.0, Color::WHITE) {
        flow.push(i);
    }
    flow.push(LayoutInstruction::Text(
        text(CENTER_X, 25.0, &data.company_name, 24.0)
            .bold()
            .centered()
            .colored(Color::WHITE),
    ));
    flow.push(LayoutInstruction::Text(
        text(CENTER_X, 35.0, &labels.title, 16.0)
            .centered()
            .colored(Color::WHITE),
    ));

    flow.push(LayoutInstruction::Text(text(
        MARGIN_LEFT,
        60.0,
        format!("{} {}", labels.invoice_number, data.invoice_number),
        10.0,
    )));
    flow.push(LayoutInstruction::Text(text(
        MARGIN_LEFT,
        65.0,
        format!("{} {}", labels.date, data.date),
        10.0,
    )));

    let issuer = [
        text(MARGIN_LEFT, 0.0, &labels.from, 10.0),
        text(MARGIN_LEFT, 0.0, &data.company_name, 10.0).bold(),
        text(MARGIN_LEFT, 0.0, &data.company_address, 10.0),
        text(MARGIN_LEFT, 0.0, format!("{} {}", labels.phone, data.company_phone), 10.0),
        text(MARGIN_LEFT, 0.0, format!("{} {}", labels.email, data.company_email), 10.0),
    ];
    stack(flow, 80.0, issuer);

    let mut recipient = vec![
        text(MARGIN_LEFT, 0.0, &labels.to, 10.0),
        text(MARGIN_LEFT, 0.0, &data.client_name, 10.0).bold(),
    ];
    if let Some(phone) = present(&data.client_phone) {
        recipient.push(text(MARGIN_LEFT, 0.0, format!("{} {}", labels.phone, phone), 10.0));
    }
    if let Some(email) = present(&data.client_email) {
        recipient.push(text(MARGIN_LEFT, 0.0, format!("{} {}", labels.email, email), 10.0));
    }
    stack(flow, 120.0, recipient);
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Place runs one under the other at the block pitch, starting at `top`.
fn stack(flow: &mut PageFlow, top: f64, runs: impl IntoIterator<Item = TextRun>) {
    for (i, mut run) in runs.into_iter().enumerate() {
        run.y = top + i as f64 * BLOCK_PITCH;
        flow.push(LayoutInstruction::Text(run));
    }
}

fn item_table(data: &InvoiceData, config: &TemplateConfig) -> TableSpec {
    let labels = &config.labels;
    let symbol = &config.currency_symbol;

    let mut rows: Vec<RowSpec> = data
        .items
        .iter()
        .map(|item| RowSpec {
            kind: RowKind::Body,
            cells: vec![
                item.description.clone(),
                item.quantity.normalize().to_string(),
                format_money(symbol, item.price),
                format_money(symbol, item.line_amount()),
            ],
        })
        .collect();
    rows.push(RowSpec {
        kind: RowKind::Total,
        cells: vec![
            String::new(),
            String::new(),
            labels.total.clone(),
            format_money(symbol, data.total()),
        ],
    });

    TableSpec {
        x: TABLE_X,
        width: TABLE_WIDTH,
        column_fractions: COLUMN_FRACTIONS.to_vec(),
        header: vec![
            labels.description.clone(),
            labels.quantity.clone(),
            labels.price.clone(),
            labels.amount.clone(),
        ],
        rows,
        style: TableStyle {
            font_size: 10.0,
            cell_padding: 3.0,
            header_fill: config.accent_color,
            header_text: Color::WHITE,
            body_fill: Color::rgb8(249, 250, 251),
            body_text: text_gray(),
            border_width: 0.1,
            border_color: Color::rgb8(209, 213, 219),
        },
        // The total row always has at least one item row above it.
        break_rules: BreakRules {
            min_orphans: 1,
            min_widows: 2,
        },
    }
}

fn notes(notes: &str, config: &TemplateConfig, fonts: &FontContext, flow: &mut PageFlow) {
    let style = TextStyle {
        font_size: NOTES_SIZE,
        weight: FontWeight::Regular,
    };
    let lines = wrap_text(notes, (MARGIN_RIGHT - MARGIN_LEFT) * PT_PER_MM, style, fonts);
    let pitch = line_height_mm(NOTES_SIZE);

    let mut label_y = flow.y + NOTES_LABEL_GAP;
    let mut y = flow.y + NOTES_TEXT_GAP;
    if !flow.fits(y - flow.y) {
        flow.new_page();
        label_y = flow.top() + BLOCK_PITCH;
        y = label_y + BLOCK_PITCH;
    }
    flow.push(LayoutInstruction::Text(text(MARGIN_LEFT, label_y, &config.labels.notes, 10.0)));

    for line in lines {
        if y > BODY_LIMIT {
            flow.new_page();
            y = flow.top() + BLOCK_PITCH;
        }
        if !line.is_empty() {
            flow.push(LayoutInstruction::Text(text(MARGIN_LEFT, y, line, NOTES_SIZE)));
        }
        flow.y = y;
        y += pitch;
    }
}

fn watermark(content: &str) -> LayoutInstruction {
    LayoutInstruction::Text(
        text(CENTER_X, 148.0, content, 60.0)
            .bold()
            .centered()
            .colored(Color::rgb8(128, 128, 128).with_alpha(0.1)),
    )
}

fn footer(data: &InvoiceData, config: &TemplateConfig, options: &RenderOptions) -> Vec<LayoutInstruction> {
    let mut out: Vec<LayoutInstruction> = ornament_rule(PAGE_HEIGHT - 25.0, config.accent_color).into();
    out.push(LayoutInstruction::Text(
        text(CENTER_X, PAGE_HEIGHT - 20.0, &config.labels.thank_you, 8.0)
            .centered()
            .colored(footer_gray()),
    ));
    out.push(LayoutInstruction::Text(
        text(
            CENTER_X,
            PAGE_HEIGHT - 15.0,
            format!(
                "© {} {}. {}",
                options.year, data.company_name, config.labels.rights_reserved
            ),
            8.0,
        )
        .centered()
        .colored(footer_gray()),
    ));
    out
}

/// Lay out `data` with the template described by `config`.
///
/// The record is not re-validated; callers run [`crate::model::validate`]
/// first.
pub fn layout_invoice(
    data: &InvoiceData,
    config: &TemplateConfig,
    options: &RenderOptions,
    fonts: &FontContext,
) -> DocumentLayout {
    let mut flow = PageFlow::new(CONTINUATION_TOP, BODY_LIMIT);
    first_page(data, config, &mut flow);

    flow.y = TABLE_TOP;
    let table_end = flow_table(&item_table(data, config), &mut flow, fonts);

    if let Some(text) = present(&data.notes) {
        notes(text, config, fonts, &mut flow);
    }

    let mut pages: Vec<LayoutPage> = flow.finish();
    for page in &mut pages {
        if let Some(mark) = config.watermark.as_deref().filter(|w| !w.is_empty()) {
            page.instructions.insert(0, watermark(mark));
        }
        page.instructions.extend(footer(data, config, options));
    }

    debug!(
        invoice_number = %data.invoice_number,
        pages = pages.len(),
        "laid out invoice"
    );

    DocumentLayout {
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        pages,
        metadata: Metadata {
            title: Some(format!("{} {}", config.labels.title, data.invoice_number)),
            author: Some(data.company_name.clone()),
            subject: Some(format!("{} {}", config.labels.to, data.client_name)),
            creator: Some("forme-invoice".to_string()),
        },
        table_end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PlacedRow;
    use crate::model::InvoiceItem;

    fn record() -> InvoiceData {
        InvoiceData {
            invoice_number: "NNB-INV-2501011200".to_string(),
            date: "2025-01-01".to_string(),
            company_name: "Na Na Beauty".to_string(),
            company_address: "Tsim Sha Tsui".to_string(),
            company_email: "info@nanabeauty.com".to_string(),
            company_phone: "98375219".to_string(),
            client_name: "Test Client".to_string(),
            client_email: None,
            client_phone: None,
            items: vec![InvoiceItem::new("Service A", 2, Decimal::from(100))],
            notes: None,
        }
    }

    fn lay_out(data: &InvoiceData) -> DocumentLayout {
        layout_invoice(
            data,
            &TemplateConfig::default(),
            &RenderOptions { year: 2025 },
            &FontContext::new(),
        )
    }

    fn body_rows(layout: &DocumentLayout) -> Vec<&PlacedRow> {
        layout
            .pages
            .iter()
            .flat_map(|p| p.tables())
            .flat_map(|t| t.rows.iter())
            .filter(|r| r.kind != RowKind::Header)
            .collect()
    }

    #[test]
    fn money_has_two_decimals() {
        assert_eq!(format_money("$", Decimal::from(200)), "$200.00");
        assert_eq!(format_money("$", Decimal::new(12345, 3)), "$12.35");
        assert_eq!(format_money("HK$", Decimal::new(5, 1)), "HK$0.50");
        assert_eq!(format_money("$", Decimal::ZERO), "$0.00");
    }

    #[test]
    fn single_item_round_trip() {
        let layout = lay_out(&record());
        assert_eq!(layout.pages.len(), 1);

        let rows = body_rows(&layout);
        assert_eq!(rows.len(), 2);
        let item = &rows[0];
        assert_eq!(item.cells[0][0].content, "Service A");
        assert_eq!(item.cells[1][0].content, "2");
        assert_eq!(item.cells[2][0].content, "$100.00");
        assert_eq!(item.cells[3][0].content, "$200.00");

        let total = &rows[1];
        assert_eq!(total.kind, RowKind::Total);
        assert_eq!(total.cells[2][0].content, "Total:");
        assert_eq!(total.cells[3][0].content, "$200.00");
    }

    #[test]
    fn fixed_first_page_positions() {
        let layout = lay_out(&record());
        let page = &layout.pages[0];

        let name = page.find_text("Na Na Beauty").unwrap();
        assert_eq!((name.x, name.y, name.font_size), (105.0, 25.0, 24.0));
        assert_eq!(name.align, TextAlign::Center);
        assert_eq!(name.weight, FontWeight::Bold);

        let number = page.find_text("Invoice #: NNB-INV-2501011200").unwrap();
        assert_eq!((number.x, number.y), (20.0, 60.0));
        assert_eq!(page.find_text("Date: 2025-01-01").unwrap().y, 65.0);
        assert_eq!(page.find_text("From:").unwrap().y, 80.0);
        assert_eq!(page.find_text("Email: info@nanabeauty.com").unwrap().y, 100.0);
        assert_eq!(page.find_text("To:").unwrap().y, 120.0);

        let header_band = &page.instructions[1];
        assert!(matches!(
            header_band,
            LayoutInstruction::Rect { x, y, width, height, .. }
                if *x == 0.0 && *y == 0.0 && *width == 210.0 && *height == 40.0
        ));
        assert_eq!(page.tables().next().unwrap().y, 150.0);
    }

    #[test]
    fn watermark_is_drawn_first_and_pale() {
        let layout = lay_out(&record());
        match &layout.pages[0].instructions[0] {
            LayoutInstruction::Text(run) => {
                assert_eq!(run.content, "Sample Only");
                assert_eq!((run.x, run.y, run.font_size), (105.0, 148.0, 60.0));
                assert!(!run.color.is_opaque());
            }
            other => panic!("expected watermark, got {:?}", other),
        }
    }

    #[test]
    fn watermark_can_be_disabled() {
        let config = TemplateConfig {
            watermark: None,
            ..TemplateConfig::default()
        };
        let layout = layout_invoice(
            &record(),
            &config,
            &RenderOptions { year: 2025 },
            &FontContext::new(),
        );
        assert!(layout.find_text("Sample Only").is_none());
        assert!(matches!(
            layout.pages[0].instructions[0],
            LayoutInstruction::Rect { .. }
        ));
    }

    #[test]
    fn recipient_without_contact_is_label_and_name() {
        let layout = lay_out(&record());
        let page = &layout.pages[0];
        let below_to: Vec<&TextRun> = page
            .texts()
            .into_iter()
            .filter(|t| t.y >= 120.0 && t.y < TABLE_TOP && t.x == MARGIN_LEFT)
            .collect();
        let contents: Vec<&str> = below_to.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["To:", "Test Client"]);
    }

    #[test]
    fn recipient_lines_stack_without_gaps() {
        let mut data = record();
        data.client_email = Some("client@example.com".to_string());
        let layout = lay_out(&data);
        let page = &layout.pages[0];
        assert_eq!(page.find_text("Test Client").unwrap().y, 125.0);
        assert_eq!(page.find_text("Email: client@example.com").unwrap().y, 130.0);

        data.client_phone = Some("9123 4567".to_string());
        let layout = lay_out(&data);
        let page = &layout.pages[0];
        assert_eq!(page.find_text("Phone: 9123 4567").unwrap().y, 130.0);
        assert_eq!(page.find_text("Email: client@example.com").unwrap().y, 135.0);
    }

    #[test]
    fn no_notes_means_no_notes_instructions() {
        let layout = lay_out(&record());
        assert!(layout.find_text("Notes:").is_none());

        let mut data = record();
        data.notes = Some("   ".to_string());
        assert!(lay_out(&data).find_text("Notes:").is_none());
    }

    #[test]
    fn notes_follow_the_table() {
        let mut data = record();
        data.notes = Some("Thank you for visiting.".to_string());
        let layout = lay_out(&data);
        let end = layout.table_end;

        let (page, label) = layout.find_text("Notes:").unwrap();
        assert_eq!(page, end.page);
        assert!((label.y - (end.y + 20.0)).abs() < 1e-9);

        let (_, body) = layout.find_text("Thank you for visiting.").unwrap();
        assert!((body.y - (end.y + 25.0)).abs() < 1e-9);
        assert_eq!(body.font_size, 9.0);
    }

    #[test]
    fn footer_is_fixed_to_page_bottom() {
        let short = lay_out(&record());
        let mut data = record();
        data.items = (0..8)
            .map(|i| InvoiceItem::new(format!("Item {}", i), 1, Decimal::ONE))
            .collect();
        let longer = lay_out(&data);

        for layout in [&short, &longer] {
            let page = &layout.pages[0];
            assert_eq!(page.find_text("Thank you for your business!").unwrap().y, 277.0);
            assert_eq!(
                page.find_text("© 2025 Na Na Beauty. All rights reserved.").unwrap().y,
                282.0
            );
            assert!(page.instructions.iter().any(|i| matches!(
                i,
                LayoutInstruction::Line { y1, .. } if *y1 == 272.0
            )));
        }
    }

    #[test]
    fn long_item_list_paginates() {
        let mut data = record();
        data.items = (0..60)
            .map(|i| InvoiceItem::new(format!("Service {}", i), 1, Decimal::from(10)))
            .collect();
        data.notes = Some("Paid in full.".to_string());
        let layout = lay_out(&data);

        assert!(layout.pages.len() >= 3);
        for page in &layout.pages {
            assert!(page.find_text("Thank you for your business!").is_some());
            assert!(page.find_text("Sample Only").is_some());
            let table = page.tables().next();
            if let Some(table) = table {
                assert_eq!(table.rows[0].kind, RowKind::Header);
                assert!(table.bottom() <= BODY_LIMIT + 1e-9);
            }
        }
        // Party blocks only on the first page.
        assert_eq!(layout.find_text("From:").map(|(p, _)| p), Some(0));
        assert!(layout.pages[1].find_text("From:").is_none());

        assert_eq!(body_rows(&layout).len(), 61);
        let (page, total) = layout.find_text("$600.00").unwrap();
        assert_eq!(page, layout.table_end.page);
        assert!(total.y < layout.table_end.y);
        assert!(layout.find_text("Notes:").is_some());
    }

    #[test]
    fn notes_move_to_new_page_when_table_ends_low() {
        let mut data = record();
        // Nine items and the total fill the first page down to about y = 260.
        data.items = (0..9)
            .map(|i| InvoiceItem::new(format!("Item {}", i), 1, Decimal::ONE))
            .collect();
        data.notes = Some("Bring this invoice.".to_string());
        let layout = lay_out(&data);
        assert_eq!(layout.table_end.page, 0);
        assert!(layout.table_end.y > BODY_LIMIT - NOTES_TEXT_GAP);

        let (page, label) = layout.find_text("Notes:").unwrap();
        let (body_page, body) = layout.find_text("Bring this invoice.").unwrap();
        assert_eq!(page, 1);
        assert_eq!(body_page, 1);
        assert_eq!(label.y, CONTINUATION_TOP + BLOCK_PITCH);
        assert_eq!(body.y, CONTINUATION_TOP + 2.0 * BLOCK_PITCH);
        assert!(layout.pages[1].find_text("Thank you for your business!").is_some());
    }

    #[test]
    fn long_notes_flow_across_pages() {
        let mut data = record();
        data.notes = Some(vec!["Line of notes."; 80].join("\n"));
        let layout = lay_out(&data);
        assert!(layout.pages.len() >= 2);
        for page in &layout.pages {
            for run in page.texts() {
                if run.content == "Line of notes." {
                    assert!(run.y <= BODY_LIMIT);
                }
            }
        }
        let count: usize = layout
            .pages
            .iter()
            .map(|p| p.texts().iter().filter(|t| t.content == "Line of notes.").count())
            .sum();
        assert_eq!(count, 80);
    }

    #[test]
    fn metadata_names_invoice_and_issuer() {
        let layout = lay_out(&record());
        assert_eq!(
            layout.metadata.title.as_deref(),
            Some("INVOICE NNB-INV-2501011200")
        );
        assert_eq!(layout.metadata.author.as_deref(), Some("Na Na Beauty"));
    }
}
