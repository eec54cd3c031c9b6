//! PDF backend: turns a `DocumentLayout` into a PDF file with lopdf.
//!
//! The layout speaks millimetres from the top-left corner; PDF user space is points from
//! the bottom-left. `Canvas` owns that conversion so nothing else has to.
//! Only the three base-14 Helvetica faces are used, so no font program is embedded.

use std::path::Path;

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::layout::font_metrics::{to_win_ansi, FontFace, MM_PER_PT};
use crate::layout::table::{PageGeometry, Rgb, REPORT_TITLE};
use crate::layout::{DocumentLayout, PaintOp};

use super::RenderError;

const PDF_VERSION: &str = "1.5";
const PRODUCER: &str = "MaterialMind";

/// Maps layout millimetres onto PDF points for one page size.
struct Canvas {
    page_height_pt: f32,
}

impl Canvas {
    fn new(geometry: &PageGeometry) -> Self {
        Self {
            page_height_pt: pt(geometry.height_mm),
        }
    }

    fn x(&self, x_mm: f32) -> Object {
        Object::Real(pt(x_mm))
    }

    fn y(&self, y_mm: f32) -> Object {
        Object::Real(self.page_height_pt - pt(y_mm))
    }

    /// Content-stream operations for one page's paint ops.
    fn operations(&self, ops: &[PaintOp]) -> Vec<Operation> {
        let mut out = Vec::new();
        for op in ops {
            match op {
                PaintOp::BeginPage { .. } => {}
                PaintOp::Text {
                    x,
                    baseline_y,
                    text,
                    face,
                    size_pt,
                    color,
                } => {
                    out.push(Operation::new("BT", vec![]));
                    out.push(Operation::new(
                        "Tf",
                        vec![
                            Object::Name(face.resource_name().as_bytes().to_vec()),
                            Object::Real(*size_pt),
                        ],
                    ));
                    out.push(Operation::new("rg", rgb_operands(*color)));
                    out.push(Operation::new("Td", vec![self.x(*x), self.y(*baseline_y)]));
                    out.push(Operation::new(
                        "Tj",
                        vec![Object::string_literal(encode_win_ansi(text))],
                    ));
                    out.push(Operation::new("ET", vec![]));
                }
                PaintOp::Rect {
                    x,
                    y,
                    width,
                    height,
                    fill,
                    stroke_mm,
                } => {
                    // PDF rectangles grow upwards from their lower-left corner.
                    let rect = vec![
                        self.x(*x),
                        self.y(y + height),
                        Object::Real(pt(*width)),
                        Object::Real(pt(*height)),
                    ];
                    if let Some(fill) = fill {
                        out.push(Operation::new("rg", rgb_operands(*fill)));
                    }
                    if let Some(stroke) = stroke_mm {
                        out.push(Operation::new("RG", rgb_operands(Rgb::BLACK)));
                        out.push(Operation::new("w", vec![Object::Real(pt(*stroke))]));
                    }
                    out.push(Operation::new("re", rect));
                    let paint = match (fill.is_some(), stroke_mm.is_some()) {
                        (true, true) => "B",
                        (true, false) => "f",
                        (false, true) => "S",
                        (false, false) => "n",
                    };
                    out.push(Operation::new(paint, vec![]));
                }
                PaintOp::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    width_mm,
                } => {
                    out.push(Operation::new("RG", rgb_operands(Rgb::BLACK)));
                    out.push(Operation::new("w", vec![Object::Real(pt(*width_mm))]));
                    out.push(Operation::new("m", vec![self.x(*x1), self.y(*y1)]));
                    out.push(Operation::new("l", vec![self.x(*x2), self.y(*y2)]));
                    out.push(Operation::new("S", vec![]));
                }
            }
        }
        out
    }
}

/// Builds the PDF document for `layout` in memory.
pub fn build_document(
    layout: &DocumentLayout,
    geometry: &PageGeometry,
) -> Result<Document, RenderError> {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for face in FontFace::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let canvas = Canvas::new(geometry);
    let mut kids: Vec<Object> = Vec::new();
    for page_ops in layout.pages() {
        let content = Content {
            operations: canvas.operations(page_ops),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(pt(geometry.width_mm)),
                Object::Real(pt(geometry.height_mm)),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(REPORT_TITLE),
        "Producer" => Object::string_literal(PRODUCER),
        "CreationDate" => Object::string_literal(pdf_date(Utc::now())),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    Ok(doc)
}

/// Writes `layout` to `path` as a PDF.
pub fn write_pdf(
    layout: &DocumentLayout,
    geometry: &PageGeometry,
    path: &Path,
) -> Result<(), RenderError> {
    let mut doc = build_document(layout, geometry)?;
    doc.save(path)?;
    Ok(())
}

/// PDF date string, e.g. `D:20260317094500Z`.
fn pdf_date(at: DateTime<Utc>) -> String {
    at.format("D:%Y%m%d%H%M%SZ").to_string()
}

fn pt(mm: f32) -> f32 {
    mm / MM_PER_PT
}

fn rgb_operands(color: Rgb) -> Vec<Object> {
    let Rgb(r, g, b) = color;
    [r, g, b]
        .into_iter()
        .map(|c| Object::Real(f32::from(c) / 255.0))
        .collect()
}

/// WinAnsi bytes for `text`; characters the base fonts cannot show become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(|c| to_win_ansi(c).unwrap_or(b'?')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout_document, TableLayoutConfig};
    use crate::models::recommendation::{MaterialEntry, PropertyMap, RecommendationRecord};

    fn record(materials: usize) -> RecommendationRecord {
        RecommendationRecord {
            materials: (0..materials)
                .map(|i| MaterialEntry {
                    name: format!("AISI 4140 steel #{i}"),
                    properties: PropertyMap::from_iter([
                        ("density", "7.85 g/cm³"),
                        ("tensile strength", "655 MPa"),
                    ]),
                    application: "Gear shafts".to_string(),
                    rationale: "High fatigue strength after quench and temper".to_string(),
                })
                .collect(),
            general_recommendations: "Case-harden contact surfaces.".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_encode_win_ansi_replaces_unsupported_chars() {
        assert_eq!(encode_win_ansi("g/cm³"), b"g/cm\xB3".to_vec());
        assert_eq!(encode_win_ansi("σ ≥ 5"), b"? ? 5".to_vec());
        assert_eq!(encode_win_ansi("plain"), b"plain".to_vec());
    }

    #[test]
    fn test_pdf_date_format() {
        let at = DateTime::parse_from_rfc3339("2026-03-17T09:45:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(pdf_date(at), "D:20260317094500Z");
    }

    #[test]
    fn test_canvas_flips_y_axis() {
        let canvas = Canvas::new(&PageGeometry::a4_portrait());
        let Object::Real(top) = canvas.y(0.0) else {
            panic!("expected a real")
        };
        let Object::Real(bottom) = canvas.y(297.0) else {
            panic!("expected a real")
        };
        assert!((top - 841.89).abs() < 0.1);
        assert!(bottom.abs() < 0.01);
    }

    #[test]
    fn test_rgb_operands_are_unit_range() {
        let ops = rgb_operands(Rgb(224, 235, 255));
        let values: Vec<f32> = ops
            .iter()
            .map(|o| match o {
                Object::Real(v) => *v,
                other => panic!("unexpected operand {other:?}"),
            })
            .collect();
        assert!((values[0] - 224.0 / 255.0).abs() < 1e-6);
        assert!((values[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_built_document_has_one_pdf_page_per_layout_page() {
        let config = TableLayoutConfig::default();
        let layout = layout_document(&record(40), &config).unwrap();
        assert!(layout.page_count > 1);

        let doc = build_document(&layout, &config.geometry).unwrap();
        assert_eq!(doc.get_pages().len(), layout.page_count as usize);
    }

    #[test]
    fn test_write_pdf_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        let config = TableLayoutConfig::default();
        let layout = layout_document(&record(2), &config).unwrap();

        write_pdf(&layout, &config.geometry, &path).unwrap();

        let loaded = Document::load(&path).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);
    }
}
