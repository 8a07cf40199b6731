// PDF exports built directly with lopdf.
//
// Layout works in points with a top-down cursor; `to_pdf_y` flips it into
// PDF's bottom-up coordinate space when operations are emitted.

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::path::Path;
use tracing::info;

use super::Rasterize;
use crate::errors::DashError;
use crate::types::ReportPayload;

// A4 portrait
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 40.0;

const REPORT_MARGIN: f32 = 56.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * REPORT_MARGIN;
/// A section never starts below this cursor position.
const SECTION_BREAK_Y: f32 = 708.0;
/// Lines never run into the footer area.
const PAGE_BOTTOM_Y: f32 = PAGE_HEIGHT - 60.0;
const FOOTER_Y: f32 = PAGE_HEIGHT - 28.0;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";
const IMAGE_NAME: &str = "Im1";

fn to_pdf_y(top_down: f32) -> f32 {
    PAGE_HEIGHT - top_down
}

/// Helvetica has no embedded metrics here; half an em per glyph is close
/// enough for centering and wrapping prose.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// The standard Type1 fonts only cover Latin-1; map the usual typographic
/// characters the report generator emits and replace the rest.
fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '*',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}

pub fn wrap_text(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let max_chars = ((max_width / (size * 0.5)).floor() as usize).max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

fn text_op(font: &str, size: f32, x: f32, top_down_y: f32, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![x.into(), to_pdf_y(top_down_y).into()]),
        Operation::new("Tj", vec![Object::string_literal(pdf_safe(text))]),
        Operation::new("ET", vec![]),
    ]
}

fn centered_x(text: &str, size: f32) -> f32 {
    ((PAGE_WIDTH - text_width(text, size)) / 2.0).max(0.0)
}

/// Image XObject to register in the page resources.
struct EmbeddedImage {
    width: u32,
    height: u32,
    jpeg: Vec<u8>,
}

fn write_document(pages: Vec<Vec<Operation>>, image: Option<EmbeddedImage>, path: &Path) -> Result<usize, DashError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });

    let mut xobjects = Dictionary::new();
    if let Some(image) = image {
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            image.jpeg,
        )
        .with_compression(false);
        let image_id = doc.add_object(stream);
        xobjects.set(IMAGE_NAME, image_id);
    }

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular_id,
            BOLD => bold_id,
        },
        "XObject" => xobjects,
    });

    let page_count = pages.len();
    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path)?;

    Ok(page_count)
}

/// Rasterize -> JPEG -> decode/measure -> compose -> save, strictly in
/// that order. Returns the number of pages written.
pub fn export_snapshot_pdf(
    region: &dyn Rasterize,
    width: u32,
    height: u32,
    title: Option<&str>,
    path: &Path,
) -> Result<usize, DashError> {
    let raster = region.rasterize(width, height)?;

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, 92).encode(raster.as_raw(), raster.width(), raster.height(), ColorType::Rgb8)?;

    let decoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)?;
    let (source_width, source_height) = (decoded.width(), decoded.height());
    if source_width == 0 || source_height == 0 {
        return Err(DashError::Export("snapshot decoded to an empty image".to_string()));
    }

    let image_width = PAGE_WIDTH - 2.0 * MARGIN;
    let image_height = image_width * source_height as f32 / source_width as f32;

    let mut first_page = Vec::new();
    let mut position = MARGIN;
    if let Some(title) = title {
        first_page.extend(text_op(BOLD, 16.0, centered_x(title, 16.0), MARGIN + 12.0, title));
        position = MARGIN + 30.0;
    }

    let draw_image = |top: f32| {
        vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    image_width.into(),
                    0.into(),
                    0.into(),
                    image_height.into(),
                    MARGIN.into(),
                    to_pdf_y(top + image_height).into(),
                ],
            ),
            Operation::new("Do", vec![IMAGE_NAME.into()]),
            Operation::new("Q", vec![]),
        ]
    };

    first_page.extend(draw_image(position));
    let mut pages = vec![first_page];

    // Taller than the first page: keep drawing the same image shifted up by
    // one page per continuation so each page shows the next slice.
    let mut height_left = image_height - (PAGE_HEIGHT - position);
    let mut offset = position;
    while height_left > 0.0 {
        offset -= PAGE_HEIGHT;
        pages.push(draw_image(offset));
        height_left -= PAGE_HEIGHT;
    }

    let page_count = write_document(
        pages,
        Some(EmbeddedImage {
            width: source_width,
            height: source_height,
            jpeg,
        }),
        path,
    )?;
    info!("Saved {}-page snapshot PDF to {}", page_count, path.display());
    Ok(page_count)
}

/// Top-down text layout across pages.
struct TextLayout {
    pages: Vec<Vec<Operation>>,
    cursor: f32,
}

impl TextLayout {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            cursor: REPORT_MARGIN,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor = REPORT_MARGIN;
    }

    fn current(&mut self) -> &mut Vec<Operation> {
        // `pages` always holds at least the first page.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn line(&mut self, font: &str, size: f32, x: f32, text: &str) {
        let line_height = size * 1.4;
        if self.cursor + line_height > PAGE_BOTTOM_Y {
            self.new_page();
        }
        self.cursor += line_height;
        let y = self.cursor;
        self.current().extend(text_op(font, size, x, y, text));
    }

    fn centered(&mut self, font: &str, size: f32, text: &str) {
        self.line(font, size, centered_x(text, size), text);
    }

    fn paragraph(&mut self, size: f32, indent: f32, text: &str) {
        for line in wrap_text(text, size, CONTENT_WIDTH - indent) {
            self.line(REGULAR, size, REPORT_MARGIN + indent, &line);
        }
    }

    fn enumerated(&mut self, size: f32, items: &[String]) {
        for (idx, item) in items.iter().enumerate() {
            let label = format!("{}. ", idx + 1);
            let indent = text_width(&label, size);
            let lines = wrap_text(item, size, CONTENT_WIDTH - indent);
            for (line_idx, line) in lines.iter().enumerate() {
                if line_idx == 0 {
                    self.line(REGULAR, size, REPORT_MARGIN, &format!("{}{}", label, line));
                } else {
                    self.line(REGULAR, size, REPORT_MARGIN + indent, line);
                }
            }
            self.gap(3.0);
        }
    }

    fn section(&mut self, heading: &str) {
        if self.cursor > SECTION_BREAK_Y {
            self.new_page();
        }
        self.gap(10.0);
        self.line(BOLD, 14.0, REPORT_MARGIN, heading);
        self.gap(4.0);
    }

    fn gap(&mut self, points: f32) {
        self.cursor += points;
    }

    fn stamp_footers(&mut self) {
        let total = self.pages.len();
        for (idx, page) in self.pages.iter_mut().enumerate() {
            let footer = format!("Page {} of {}", idx + 1, total);
            page.extend(text_op(REGULAR, 9.0, centered_x(&footer, 9.0), FOOTER_Y, &footer));
        }
    }
}

/// Text-only report: title, generation date, then the four report sections,
/// with a `Page X of Y` footer on every page. Returns the page count.
pub fn export_report_pdf(
    report: &ReportPayload,
    title: &str,
    generated_on: &str,
    path: &Path,
) -> Result<usize, DashError> {
    let mut layout = TextLayout::new();

    layout.centered(BOLD, 20.0, title);
    layout.gap(4.0);
    layout.centered(REGULAR, 10.0, &format!("Generated on {}", generated_on));
    layout.gap(10.0);

    layout.section("Executive Summary");
    layout.paragraph(11.0, 0.0, &report.summary);

    layout.section("Key Insights");
    layout.enumerated(11.0, &report.insights);

    layout.section("Recommendations");
    layout.enumerated(11.0, &report.recommendations);

    layout.section("Future Outlook");
    layout.paragraph(11.0, 0.0, &report.future_outlook);

    layout.stamp_footers();
    let page_count = write_document(layout.pages, None, path)?;
    info!("Saved {}-page report PDF to {}", page_count, path.display());
    Ok(page_count)
}
