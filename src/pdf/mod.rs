//! # PDF Serializer
//!
//! Takes a laid-out invoice and writes a PDF 1.7 file from scratch. The
//! subset of PDF the template needs is small: filled rectangles, stroked
//! lines, Bézier circles, text, and a transparency state for the watermark.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Layout works in millimeters with y growing down; this module converts to
//! points and flips y on the way out.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;
use tracing::debug;

use crate::error::InvoiceError;
use crate::font::{CustomFontMetrics, FontContext, FontData, FontKey};
use crate::layout::{
    DocumentLayout, LayoutInstruction, LayoutPage, Metadata, TableFragment, TextRun, PT_PER_MM,
};
use crate::style::{Color, FontWeight, TextAlign};

/// Bézier control point distance for a quarter circle of radius 1.
const KAPPA: f64 = 0.5522847498;

pub struct PdfWriter;

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Font key -> object id, in resource order (/F0, /F1, ...)
    font_objects: Vec<(FontKey, usize)>,
    /// Alpha in thousandths -> object id, in resource order (/GS0, /GS1, ...)
    gstates: Vec<(u32, usize)>,
}

struct PdfObject {
    data: Vec<u8>,
}

/// How text in one font resource is encoded in a content stream.
enum TextEncoding<'a> {
    WinAnsi,
    GlyphIds(&'a CustomFontMetrics),
}

struct PageContext<'a> {
    height_pt: f64,
    builder: &'a PdfBuilder,
    fonts: &'a FontContext,
}

fn pt(mm: f64) -> f64 {
    mm * PT_PER_MM
}

fn alpha_key(color: &Color) -> Option<u32> {
    if color.is_opaque() {
        None
    } else {
        Some((color.a.clamp(0.0, 1.0) * 1000.0).round() as u32)
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write a laid-out document to a PDF byte vector.
    pub fn write(&self, layout: &DocumentLayout, fonts: &FontContext) -> Result<Vec<u8>, InvoiceError> {
        if layout.pages.is_empty() {
            return Err(InvoiceError::RenderError("document has no pages".to_string()));
        }

        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            gstates: Vec::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, graphics states, then page objects and content streams
        for _ in 0..3 {
            builder.objects.push(PdfObject { data: vec![] });
        }

        self.register_fonts(&mut builder, &layout.pages, fonts)?;
        self.register_gstates(&mut builder, &layout.pages);

        let width_pt = pt(layout.width);
        let height_pt = pt(layout.height);
        let resources = self.build_resource_dict(&builder);

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in &layout.pages {
            let ctx = PageContext {
                height_pt,
                builder: &builder,
                fonts,
            };
            let content = self.build_content_stream(page, &ctx);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: content_data });

            let page_obj_id = builder.objects.len();
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources {} >>",
                width_pt, height_pt, content_obj_id, resources
            );
            builder.objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.objects.len();
        builder.objects.push(PdfObject {
            data: Self::build_info_dict(&layout.metadata).into_bytes(),
        });

        let bytes = self.serialize(&builder, Some(info_obj_id));
        debug!(
            pages = page_obj_ids.len(),
            fonts = builder.font_objects.len(),
            bytes = bytes.len(),
            "wrote pdf"
        );
        Ok(bytes)
    }

    fn build_info_dict(metadata: &Metadata) -> String {
        let mut info = String::from("<< ");
        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Creator", &metadata.creator),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                let _ = write!(info, "/{} {} ", name, Self::text_string(value));
            }
        }
        let _ = write!(info, "/Producer (forme-invoice {}) >>", env!("CARGO_PKG_VERSION"));
        info
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(&self, page: &LayoutPage, ctx: &PageContext) -> String {
        let mut stream = String::new();
        for instruction in &page.instructions {
            self.write_instruction(&mut stream, instruction, ctx);
        }
        stream
    }

    fn write_instruction(&self, stream: &mut String, instruction: &LayoutInstruction, ctx: &PageContext) {
        match instruction {
            LayoutInstruction::Text(run) => self.write_text(stream, run, ctx),

            LayoutInstruction::Rect {
                x,
                y,
                width,
                height,
                fill,
            } => {
                self.begin_paint(stream, fill, ctx);
                let _ = writeln!(stream, "{:.3} {:.3} {:.3} rg", fill.r, fill.g, fill.b);
                let _ = writeln!(
                    stream,
                    "{:.2} {:.2} {:.2} {:.2} re\nf\nQ",
                    pt(*x),
                    ctx.height_pt - pt(y + height),
                    pt(*width),
                    pt(*height)
                );
            }

            LayoutInstruction::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                self.begin_paint(stream, color, ctx);
                let _ = writeln!(
                    stream,
                    "{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ",
                    color.r,
                    color.g,
                    color.b,
                    pt(*width),
                    pt(*x1),
                    ctx.height_pt - pt(*y1),
                    pt(*x2),
                    ctx.height_pt - pt(*y2)
                );
            }

            LayoutInstruction::Circle {
                cx,
                cy,
                radius,
                fill,
            } => {
                self.begin_paint(stream, fill, ctx);
                let _ = writeln!(stream, "{:.3} {:.3} {:.3} rg", fill.r, fill.g, fill.b);
                self.write_circle_path(stream, pt(*cx), ctx.height_pt - pt(*cy), pt(*radius));
                let _ = writeln!(stream, "f\nQ");
            }

            LayoutInstruction::Table(fragment) => self.write_table(stream, fragment, ctx),
        }
    }

    /// Open a graphics state, selecting the transparency state if `color` needs one.
    fn begin_paint(&self, stream: &mut String, color: &Color, ctx: &PageContext) {
        let _ = writeln!(stream, "q");
        if let Some(index) = alpha_key(color).and_then(|key| ctx.builder.gstate_index(key)) {
            let _ = writeln!(stream, "/GS{} gs", index);
        }
    }

    fn write_circle_path(&self, stream: &mut String, cx: f64, cy: f64, r: f64) {
        let k = r * KAPPA;
        let _ = writeln!(stream, "{:.2} {:.2} m", cx + r, cy);
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            cx + r, cy + k, cx + k, cy + r, cx, cy + r
        );
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            cx - k, cy + r, cx - r, cy + k, cx - r, cy
        );
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            cx - r, cy - k, cx - k, cy - r, cx, cy - r
        );
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            cx + k, cy - r, cx + r, cy - k, cx + r, cy
        );
        let _ = writeln!(stream, "h");
    }

    fn write_text(&self, stream: &mut String, run: &TextRun, ctx: &PageContext) {
        if run.content.is_empty() {
            return;
        }
        let key = ctx.fonts.key_for(run.weight);
        let Some(index) = ctx.builder.font_index(&key) else {
            return;
        };

        let width = ctx.fonts.measure_string(&run.content, run.font_size, run.weight);
        let x = match run.align {
            TextAlign::Left => pt(run.x),
            TextAlign::Center => pt(run.x) - width / 2.0,
        };
        let y = ctx.height_pt - pt(run.y);

        let encoded = match Self::encoding_for(ctx.fonts, run.weight) {
            TextEncoding::WinAnsi => format!("({})", Self::encode_winansi(&run.content)),
            TextEncoding::GlyphIds(metrics) => format!("<{}>", Self::encode_glyph_ids(&run.content, metrics)),
        };

        self.begin_paint(stream, &run.color, ctx);
        let _ = writeln!(
            stream,
            "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n{} Tj\nET\nQ",
            run.color.r, run.color.g, run.color.b, index, run.font_size, x, y, encoded
        );
    }

    /// Row fills first, then the cell grid, then cell text on top.
    fn write_table(&self, stream: &mut String, fragment: &TableFragment, ctx: &PageContext) {
        let left = pt(fragment.x);
        let width = pt(fragment.width());

        for row in &fragment.rows {
            if let Some(fill) = &row.fill {
                self.begin_paint(stream, fill, ctx);
                let _ = writeln!(
                    stream,
                    "{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ",
                    fill.r,
                    fill.g,
                    fill.b,
                    left,
                    ctx.height_pt - pt(row.y + row.height),
                    width,
                    pt(row.height)
                );
            }
        }

        if fragment.border_width > 0.0 {
            let c = &fragment.border_color;
            let _ = writeln!(
                stream,
                "q\n{:.3} {:.3} {:.3} RG\n{:.2} w",
                c.r,
                c.g,
                c.b,
                pt(fragment.border_width)
            );
            for row in &fragment.rows {
                let mut x = fragment.x;
                for w in &fragment.column_widths {
                    let _ = writeln!(
                        stream,
                        "{:.2} {:.2} {:.2} {:.2} re",
                        pt(x),
                        ctx.height_pt - pt(row.y + row.height),
                        pt(*w),
                        pt(row.height)
                    );
                    x += w;
                }
            }
            let _ = writeln!(stream, "S\nQ");
        }

        for row in &fragment.rows {
            for run in row.cells.iter().flatten() {
                self.write_text(stream, run, ctx);
            }
        }
    }

    fn encoding_for(fonts: &FontContext, weight: FontWeight) -> TextEncoding<'_> {
        match fonts.resolve(weight) {
            FontData::Standard(_) => TextEncoding::WinAnsi,
            FontData::Custom { metrics, .. } => TextEncoding::GlyphIds(metrics),
        }
    }

    /// Register one font object per distinct resource key in use, in key order.
    fn register_fonts(
        &self,
        builder: &mut PdfBuilder,
        pages: &[LayoutPage],
        fonts: &FontContext,
    ) -> Result<(), InvoiceError> {
        let mut used: BTreeMap<FontKey, (FontWeight, BTreeSet<char>)> = BTreeMap::new();
        for page in pages {
            for run in page.texts() {
                let entry = used
                    .entry(fonts.key_for(run.weight))
                    .or_insert_with(|| (run.weight, BTreeSet::new()));
                entry.1.extend(run.content.chars());
            }
        }
        if used.is_empty() {
            used.insert(
                fonts.key_for(FontWeight::Regular),
                (FontWeight::Regular, BTreeSet::new()),
            );
        }

        for (key, (weight, chars)) in used {
            let obj_id = match fonts.resolve(weight) {
                FontData::Standard(std_font) => {
                    let obj_id = builder.objects.len();
                    let font_dict = format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                         /Encoding /WinAnsiEncoding >>",
                        std_font.pdf_name()
                    );
                    builder.objects.push(PdfObject {
                        data: font_dict.into_bytes(),
                    });
                    obj_id
                }
                FontData::Custom { data, metrics, .. } => {
                    Self::write_custom_font_objects(builder, &key, data, metrics, &chars)?
                }
            };
            builder.font_objects.push((key, obj_id));
        }
        Ok(())
    }

    fn register_gstates(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        let mut alphas: BTreeSet<u32> = BTreeSet::new();
        for page in pages {
            for instruction in &page.instructions {
                match instruction {
                    LayoutInstruction::Text(run) => alphas.extend(alpha_key(&run.color)),
                    LayoutInstruction::Rect { fill, .. } | LayoutInstruction::Circle { fill, .. } => {
                        alphas.extend(alpha_key(fill))
                    }
                    LayoutInstruction::Line { color, .. } => alphas.extend(alpha_key(color)),
                    LayoutInstruction::Table(fragment) => {
                        for row in &fragment.rows {
                            alphas.extend(row.fill.as_ref().and_then(alpha_key));
                            for run in row.cells.iter().flatten() {
                                alphas.extend(alpha_key(&run.color));
                            }
                        }
                    }
                }
            }
        }

        for alpha in alphas {
            let obj_id = builder.objects.len();
            let a = alpha as f64 / 1000.0;
            builder.objects.push(PdfObject {
                data: format!("<< /Type /ExtGState /ca {:.3} /CA {:.3} >>", a, a).into_bytes(),
            });
            builder.gstates.push((alpha, obj_id));
        }
    }

    /// Embed a TrueType face whole as a Type0 font with Identity-H encoding.
    /// Returns the object id of the Type0 dictionary.
    fn write_custom_font_objects(
        builder: &mut PdfBuilder,
        key: &FontKey,
        ttf_data: &[u8],
        metrics: &CustomFontMetrics,
        used_chars: &BTreeSet<char>,
    ) -> Result<usize, InvoiceError> {
        let face = ttf_parser::Face::parse(ttf_data, 0).map_err(|e| {
            InvoiceError::FontError(format!(
                "Failed to parse TTF data for font '{}': {}",
                key.family, e
            ))
        })?;

        let char_to_gid: HashMap<char, u16> = used_chars
            .iter()
            .filter_map(|ch| metrics.glyph_ids.get(ch).map(|&gid| (*ch, gid)))
            .collect();
        let pdf_font_name = Self::sanitize_font_name(&key.family);

        // 1. FontFile2 stream
        let compressed_ttf = compress_to_vec_zlib(ttf_data, 6);
        let fontfile2_id = builder.objects.len();
        let mut fontfile2_data: Vec<u8> = Vec::new();
        let _ = write!(
            fontfile2_data,
            "<< /Length {} /Length1 {} /Filter /FlateDecode >>\nstream\n",
            compressed_ttf.len(),
            ttf_data.len()
        );
        fontfile2_data.extend_from_slice(&compressed_ttf);
        fontfile2_data.extend_from_slice(b"\nendstream");
        builder.objects.push(PdfObject {
            data: fontfile2_data,
        });

        // 2. FontDescriptor
        let scale = 1000.0 / metrics.units_per_em as f64;
        let bbox = face.global_bounding_box();
        let font_descriptor_id = builder.objects.len();
        let font_descriptor_dict = format!(
            "<< /Type /FontDescriptor /FontName /{} /Flags 4 \
             /FontBBox [{} {} {} {}] /ItalicAngle 0 \
             /Ascent {} /Descent {} /CapHeight {} /StemV 80 \
             /FontFile2 {} 0 R >>",
            pdf_font_name,
            (bbox.x_min as f64 * scale) as i32,
            (bbox.y_min as f64 * scale) as i32,
            (bbox.x_max as f64 * scale) as i32,
            (bbox.y_max as f64 * scale) as i32,
            (metrics.ascender as f64 * scale) as i32,
            (metrics.descender as f64 * scale) as i32,
            (face.capital_height().unwrap_or(metrics.ascender) as f64 * scale) as i32,
            fontfile2_id,
        );
        builder.objects.push(PdfObject {
            data: font_descriptor_dict.into_bytes(),
        });

        // 3. CIDFont dictionary (DescendantFont)
        let cidfont_id = builder.objects.len();
        let default_width = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .map(|adv| (adv as f64 * scale) as u32)
            .unwrap_or(1000);
        let cidfont_dict = format!(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
             /FontDescriptor {} 0 R /DW {} /W {} \
             /CIDToGIDMap /Identity >>",
            pdf_font_name,
            font_descriptor_id,
            default_width,
            Self::build_w_array(&char_to_gid, &face),
        );
        builder.objects.push(PdfObject {
            data: cidfont_dict.into_bytes(),
        });

        // 4. ToUnicode CMap
        let tounicode_id = builder.objects.len();
        let cmap_content = Self::build_tounicode_cmap(&char_to_gid, &pdf_font_name);
        let compressed_cmap = compress_to_vec_zlib(cmap_content.as_bytes(), 6);
        let mut tounicode_data: Vec<u8> = Vec::new();
        let _ = write!(
            tounicode_data,
            "<< /Length {} /Filter /FlateDecode >>\nstream\n",
            compressed_cmap.len()
        );
        tounicode_data.extend_from_slice(&compressed_cmap);
        tounicode_data.extend_from_slice(b"\nendstream");
        builder.objects.push(PdfObject {
            data: tounicode_data,
        });

        // 5. Type0 font dictionary (the root, referenced by /Resources)
        let type0_id = builder.objects.len();
        let type0_dict = format!(
            "<< /Type /Font /Subtype /Type0 /BaseFont /{} \
             /Encoding /Identity-H \
             /DescendantFonts [{} 0 R] \
             /ToUnicode {} 0 R >>",
            pdf_font_name, cidfont_id, tounicode_id,
        );
        builder.objects.push(PdfObject {
            data: type0_dict.into_bytes(),
        });

        debug!(
            family = %key.family,
            glyphs = char_to_gid.len(),
            "embedded custom font"
        );
        Ok(type0_id)
    }

    /// Build the /W array for per-glyph widths in CIDFont.
    /// Format: [gid [width] gid [width] ...]
    fn build_w_array(char_to_gid: &HashMap<char, u16>, face: &ttf_parser::Face) -> String {
        let scale = 1000.0 / face.units_per_em() as f64;

        let gids: BTreeSet<u16> = char_to_gid.values().copied().collect();
        let mut result = String::from("[");
        for gid in gids {
            let advance = face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0);
            let _ = write!(result, " {} [{}]", gid, (advance as f64 * scale) as u32);
        }
        result.push_str(" ]");
        result
    }

    /// Build a ToUnicode CMap for text extraction/copy-paste support.
    fn build_tounicode_cmap(char_to_gid: &HashMap<char, u16>, font_name: &str) -> String {
        let mut gid_to_unicode: Vec<(u16, char)> =
            char_to_gid.iter().map(|(&ch, &gid)| (gid, ch)).collect();
        gid_to_unicode.sort();

        let mut cmap = String::new();
        let _ = writeln!(cmap, "/CIDInit /ProcSet findresource begin");
        let _ = writeln!(cmap, "12 dict begin");
        let _ = writeln!(cmap, "begincmap");
        let _ = writeln!(cmap, "/CIDSystemInfo");
        let _ = writeln!(cmap, "<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def");
        let _ = writeln!(cmap, "/CMapName /{}-UTF16 def", font_name);
        let _ = writeln!(cmap, "/CMapType 2 def");
        let _ = writeln!(cmap, "1 begincodespacerange");
        let _ = writeln!(cmap, "<0000> <FFFF>");
        let _ = writeln!(cmap, "endcodespacerange");

        // At most 100 entries per bfchar block
        for chunk in gid_to_unicode.chunks(100) {
            let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
            for &(gid, ch) in chunk {
                let _ = writeln!(cmap, "<{:04X}> <{}>", gid, Self::utf16_hex(ch));
            }
            let _ = writeln!(cmap, "endbfchar");
        }

        let _ = writeln!(cmap, "endcmap");
        let _ = writeln!(cmap, "CMapName currentdict /CMap defineresource pop");
        let _ = writeln!(cmap, "end");
        let _ = writeln!(cmap, "end");

        cmap
    }

    fn utf16_hex(ch: char) -> String {
        let mut buf = [0u16; 2];
        ch.encode_utf16(&mut buf)
            .iter()
            .map(|unit| format!("{:04X}", unit))
            .collect()
    }

    /// Strip a family name down to characters legal in a PDF name.
    fn sanitize_font_name(family: &str) -> String {
        let name: String = family
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if name.is_empty() {
            "CustomFont".to_string()
        } else {
            name
        }
    }

    fn build_resource_dict(&self, builder: &PdfBuilder) -> String {
        let fonts = builder
            .font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ");
        if builder.gstates.is_empty() {
            return format!("<< /Font << {} >> >>", fonts);
        }
        let gstates = builder
            .gstates
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/GS{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ");
        format!("<< /Font << {} >> /ExtGState << {} >> >>", fonts, gstates)
    }

    /// Escape special characters in a PDF string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// A document-info text string: literal when ASCII, UTF-16BE hex otherwise.
    fn text_string(s: &str) -> String {
        if s.is_ascii() {
            return format!("({})", Self::escape_pdf_string(s));
        }
        let mut hex = String::from("<FEFF");
        for unit in s.encode_utf16() {
            let _ = write!(hex, "{:04X}", unit);
        }
        hex.push('>');
        hex
    }

    /// Literal-string body for a standard font. Bytes above ASCII are octal
    /// escaped; characters outside WinAnsi print as `?`.
    fn encode_winansi(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for ch in s.chars() {
            let byte = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match byte {
                b'\\' | b'(' | b')' => {
                    out.push('\\');
                    out.push(byte as char);
                }
                0x20..=0x7E => out.push(byte as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", byte);
                }
            }
        }
        out
    }

    /// Hex glyph IDs for a custom font. Unmapped characters use glyph 0.
    fn encode_glyph_ids(s: &str, metrics: &CustomFontMetrics) -> String {
        s.chars()
            .map(|ch| format!("{:04X}", metrics.glyph_ids.get(&ch).copied().unwrap_or(0)))
            .collect()
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
    /// contains special mappings for smart quotes, bullets, dashes, etc.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82), // Single low-9 quotation mark
            0x0192 => Some(0x83), // Latin small letter f with hook
            0x201E => Some(0x84), // Double low-9 quotation mark
            0x2026 => Some(0x85), // Horizontal ellipsis
            0x2020 => Some(0x86), // Dagger
            0x2021 => Some(0x87), // Double dagger
            0x02C6 => Some(0x88), // Modifier letter circumflex accent
            0x2030 => Some(0x89), // Per mille sign
            0x0160 => Some(0x8A), // Latin capital letter S with caron
            0x2039 => Some(0x8B), // Single left-pointing angle quotation
            0x0152 => Some(0x8C), // Latin capital ligature OE
            0x017D => Some(0x8E), // Latin capital letter Z with caron
            0x2018 => Some(0x91), // Left single quotation mark
            0x2019 => Some(0x92), // Right single quotation mark
            0x201C => Some(0x93), // Left double quotation mark
            0x201D => Some(0x94), // Right double quotation mark
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98), // Small tilde
            0x2122 => Some(0x99), // Trade mark sign
            0x0161 => Some(0x9A), // Latin small letter s with caron
            0x203A => Some(0x9B), // Single right-pointing angle quotation
            0x0153 => Some(0x9C), // Latin small ligature oe
            0x017E => Some(0x9E), // Latin small letter z with caron
            0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: Option<usize>) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(output, "trailer\n<< /Size {} /Root 1 0 R", builder.objects.len());
        if let Some(info_id) = info_obj_id {
            let _ = write!(output, " /Info {} 0 R", info_id);
        }
        let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

        output
    }
}

impl PdfBuilder {
    fn font_index(&self, key: &FontKey) -> Option<usize> {
        self.font_objects.iter().position(|(k, _)| k == key)
    }

    fn gstate_index(&self, alpha: u32) -> Option<usize> {
        self.gstates.iter().position(|(a, _)| *a == alpha)
    }
}
