//! Table Layout Engine — lays a `RecommendationRecord` out as paginated paint instructions.
//!
//! # Architecture
//! - `layout_document` is the entry point: record + `TableLayoutConfig` → `DocumentLayout`.
//! - Every row is measured first (`measure_row`), then painted from the same wrapped lines.
//! - Page position is an explicit `LayoutCursor` value: each painting step takes the cursor
//!   and returns the advanced one. `Painter` only collects output.
//! - Output is a flat `Vec<PaintOp>` in millimetres with a top-left origin, independent of
//!   any PDF backend. Placement records (`PlacedRow`, `PlacedBand`) sit alongside so that
//!   pagination can be checked without decoding paint ops.
//!
//! # Row height
//! `max(wrapped lines over the row's cells) * line_pitch + 2 * padding_y`, floored at
//! `min_row_height_mm`. Cell text is painted first, then one bounding rectangle and the
//! column dividers at the shared height.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::font_metrics::{get_metrics, FontFace, MM_PER_PT};
use crate::layout::wrap::wrap_text;
use crate::models::recommendation::{MaterialEntry, RecommendationRecord};

/// Title band text repeated at the top of every page.
pub const REPORT_TITLE: &str = "MaterialMind - Material Recommendation Report";
pub const GENERAL_HEADING: &str = "General Recommendations:";
pub const GENERAL_FALLBACK: &str = "No general recommendations provided.";

/// Slack for float comparisons against page edges.
const EPSILON_MM: f32 = 1e-3;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const GREY: Rgb = Rgb(128, 128, 128);
    pub const HEADER_FILL: Rgb = Rgb(224, 235, 255);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// The four table columns. Each knows its header label and how to read its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKey {
    Material,
    Properties,
    Application,
    Rationale,
}

impl ColumnKey {
    pub fn header(self) -> &'static str {
        match self {
            ColumnKey::Material => "Material",
            ColumnKey::Properties => "Properties",
            ColumnKey::Application => "Application",
            ColumnKey::Rationale => "Rationale",
        }
    }

    pub fn cell_text(self, entry: &MaterialEntry) -> String {
        match self {
            ColumnKey::Material => entry.name.clone(),
            ColumnKey::Properties => entry.properties.flatten(),
            ColumnKey::Application => entry.application.clone(),
            ColumnKey::Rationale => entry.rationale.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub key: ColumnKey,
    pub width_mm: f32,
    pub alignment: Alignment,
}

/// Physical page size and margins, all in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_left_mm: f32,
    pub margin_right_mm: f32,
    pub margin_top_mm: f32,
    pub margin_bottom_mm: f32,
}

impl PageGeometry {
    /// A4 portrait with 10 mm side/top margins and a 15 mm bottom margin.
    pub fn a4_portrait() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_left_mm: 10.0,
            margin_right_mm: 10.0,
            margin_top_mm: 10.0,
            margin_bottom_mm: 15.0,
        }
    }

    pub fn printable_width(&self) -> f32 {
        self.width_mm - self.margin_left_mm - self.margin_right_mm
    }

    /// Lowest y any body content may reach.
    pub fn printable_bottom(&self) -> f32 {
        self.height_mm - self.margin_bottom_mm
    }
}

/// Font face, size and the fixed vertical pitch of one line (or one cell, for single-line bands).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub face: FontFace,
    pub size_pt: f32,
    pub line_pitch_mm: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLayoutConfig {
    pub columns: Vec<ColumnSpec>,
    pub geometry: PageGeometry,
    /// Table body cells. `line_pitch_mm` is the row line pitch.
    pub body: TextStyle,
    /// Column header band. `line_pitch_mm` is the band height.
    pub header: TextStyle,
    /// Section headings. `line_pitch_mm` is the heading cell height.
    pub heading: TextStyle,
    pub paragraph: TextStyle,
    /// Report title band. `line_pitch_mm` is the band height.
    pub title: TextStyle,
    pub footer: TextStyle,
    pub padding_x_mm: f32,
    pub padding_y_mm: f32,
    pub min_row_height_mm: f32,
    /// Space below the title band and after each text section.
    pub section_gap_mm: f32,
    /// Distance from the bottom page edge to the top of the footer cell.
    pub footer_offset_mm: f32,
    pub border_width_mm: f32,
}

impl Default for TableLayoutConfig {
    fn default() -> Self {
        let column = |key, width_mm| ColumnSpec {
            key,
            width_mm,
            alignment: Alignment::Left,
        };
        Self {
            columns: vec![
                column(ColumnKey::Material, 35.0),
                column(ColumnKey::Properties, 60.0),
                column(ColumnKey::Application, 40.0),
                column(ColumnKey::Rationale, 55.0),
            ],
            geometry: PageGeometry::a4_portrait(),
            body: TextStyle {
                face: FontFace::Helvetica,
                size_pt: 9.0,
                line_pitch_mm: 5.0,
            },
            header: TextStyle {
                face: FontFace::HelveticaBold,
                size_pt: 10.0,
                line_pitch_mm: 10.0,
            },
            heading: TextStyle {
                face: FontFace::HelveticaBold,
                size_pt: 12.0,
                line_pitch_mm: 10.0,
            },
            paragraph: TextStyle {
                face: FontFace::Helvetica,
                size_pt: 10.0,
                line_pitch_mm: 5.0,
            },
            title: TextStyle {
                face: FontFace::HelveticaBold,
                size_pt: 15.0,
                line_pitch_mm: 10.0,
            },
            footer: TextStyle {
                face: FontFace::HelveticaOblique,
                size_pt: 8.0,
                line_pitch_mm: 10.0,
            },
            padding_x_mm: 1.5,
            padding_y_mm: 1.0,
            min_row_height_mm: 8.0,
            section_gap_mm: 10.0,
            footer_offset_mm: 15.0,
            border_width_mm: 0.3,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("Table has no columns")]
    NoColumns,

    #[error("Column {key:?} is {width_mm}mm wide, leaving no room inside its padding")]
    ColumnTooNarrow { key: ColumnKey, width_mm: f32 },

    #[error("Table is {total_mm}mm wide but only {available_mm}mm are printable")]
    TableTooWide { total_mm: f32, available_mm: f32 },

    #[error("Invalid text style: {0}")]
    InvalidStyle(String),

    #[error("Page is too short to hold the title, a header band and one row")]
    PageTooShort,
}

impl TableLayoutConfig {
    /// Checks that the configuration can lay out any record without looping or overflowing.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.columns.is_empty() {
            return Err(LayoutError::NoColumns);
        }

        for column in &self.columns {
            if column.width_mm - 2.0 * self.padding_x_mm <= 0.0 {
                return Err(LayoutError::ColumnTooNarrow {
                    key: column.key,
                    width_mm: column.width_mm,
                });
            }
        }

        let total_mm = self.table_width();
        let available_mm = self.geometry.printable_width();
        if total_mm > available_mm + EPSILON_MM {
            return Err(LayoutError::TableTooWide {
                total_mm,
                available_mm,
            });
        }

        for (name, style) in [
            ("body", &self.body),
            ("header", &self.header),
            ("heading", &self.heading),
            ("paragraph", &self.paragraph),
            ("title", &self.title),
            ("footer", &self.footer),
        ] {
            if style.size_pt <= 0.0 || style.line_pitch_mm <= 0.0 {
                return Err(LayoutError::InvalidStyle(format!(
                    "{name} needs a positive size and line pitch"
                )));
            }
        }

        let first_table_row = self.body.line_pitch_mm + 2.0 * self.padding_y_mm;
        let table_needs =
            self.header.line_pitch_mm + first_table_row.max(self.min_row_height_mm);
        let section_needs = self.heading.line_pitch_mm + self.paragraph.line_pitch_mm;
        if self.body_top() + table_needs.max(section_needs) > self.geometry.printable_bottom() {
            return Err(LayoutError::PageTooShort);
        }

        Ok(())
    }

    pub fn table_width(&self) -> f32 {
        self.columns.iter().map(|c| c.width_mm).sum()
    }

    /// First y available for content on every page, below the title band.
    pub fn body_top(&self) -> f32 {
        self.geometry.margin_top_mm + self.title.line_pitch_mm + self.section_gap_mm
    }

    /// Row height for a given number of wrapped lines.
    pub fn row_height(&self, line_count: usize) -> f32 {
        let natural = line_count as f32 * self.body.line_pitch_mm + 2.0 * self.padding_y_mm;
        natural.max(self.min_row_height_mm)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// One painting instruction. Coordinates are millimetres from the page's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PaintOp {
    /// Starts a new page. Everything after it until the next `BeginPage` belongs to it.
    BeginPage { number: u32 },
    Text {
        x: f32,
        baseline_y: f32,
        text: String,
        face: FontFace,
        size_pt: f32,
        color: Rgb,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgb>,
        stroke_mm: Option<f32>,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width_mm: f32,
    },
}

/// Where a table row (or a fragment of a split row) landed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedRow {
    pub entry_index: usize,
    pub page: u32,
    pub y: f32,
    pub height: f32,
    pub line_count: usize,
    /// True for the second and later fragments of a row split across pages.
    pub continued: bool,
}

/// Where a column header band landed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedBand {
    pub page: u32,
    pub y: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentLayout {
    pub ops: Vec<PaintOp>,
    pub page_count: u32,
    pub rows: Vec<PlacedRow>,
    pub header_bands: Vec<PlacedBand>,
}

impl DocumentLayout {
    /// Paint ops grouped per page, in page order.
    pub fn pages(&self) -> Vec<&[PaintOp]> {
        let mut pages = Vec::new();
        let mut start = None;
        for (i, op) in self.ops.iter().enumerate() {
            if matches!(op, PaintOp::BeginPage { .. }) {
                if let Some(s) = start {
                    pages.push(&self.ops[s..i]);
                }
                start = Some(i);
            }
        }
        if let Some(s) = start {
            pages.push(&self.ops[s..]);
        }
        pages
    }
}

/// Derived per-entry row: the wrapped lines of each cell and the shared height.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRow {
    pub cells: Vec<Vec<String>>,
    pub line_count: usize,
    pub height_mm: f32,
}

/// Current page and vertical position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub page: u32,
    pub y: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

/// Wraps each cell of `entry` to its column's content width and computes the row height.
pub fn measure_row(entry: &MaterialEntry, config: &TableLayoutConfig) -> LayoutRow {
    let metrics = get_metrics(config.body.face);
    let cells: Vec<Vec<String>> = config
        .columns
        .iter()
        .map(|column| {
            wrap_text(
                &column.key.cell_text(entry),
                metrics,
                config.body.size_pt,
                column.width_mm - 2.0 * config.padding_x_mm,
            )
        })
        .collect();
    let line_count = cells.iter().map(Vec::len).max().unwrap_or(0);

    LayoutRow {
        height_mm: config.row_height(line_count),
        line_count,
        cells,
    }
}

/// Lays out the full report: general recommendations, the materials table, then any
/// optional sections.
pub fn layout_document(
    record: &RecommendationRecord,
    config: &TableLayoutConfig,
) -> Result<DocumentLayout, LayoutError> {
    config.validate()?;

    let rows: Vec<LayoutRow> = record
        .materials
        .iter()
        .map(|entry| measure_row(entry, config))
        .collect();

    let general = if record.general_recommendations.trim().is_empty() {
        GENERAL_FALLBACK
    } else {
        record.general_recommendations.as_str()
    };

    let mut painter = Painter::new(config);
    let mut cursor = painter.begin_page(1);
    cursor = painter.paint_section(cursor, GENERAL_HEADING, general);
    cursor = painter.gap(cursor, config.section_gap_mm);
    cursor = painter.paint_table(cursor, &rows);

    for (heading, text) in record.optional_sections() {
        cursor = painter.gap(cursor, config.section_gap_mm);
        cursor = painter.paint_section(cursor, heading, text);
    }

    Ok(painter.finish(cursor))
}

// ────────────────────────────────────────────────────────────────────────────
// Painter
// ────────────────────────────────────────────────────────────────────────────

/// Collects paint ops and placement records. Holds no position state of its own.
struct Painter<'a> {
    config: &'a TableLayoutConfig,
    ops: Vec<PaintOp>,
    rows: Vec<PlacedRow>,
    header_bands: Vec<PlacedBand>,
}

impl<'a> Painter<'a> {
    fn new(config: &'a TableLayoutConfig) -> Self {
        Self {
            config,
            ops: Vec::new(),
            rows: Vec::new(),
            header_bands: Vec::new(),
        }
    }

    fn finish(self, cursor: LayoutCursor) -> DocumentLayout {
        DocumentLayout {
            ops: self.ops,
            page_count: cursor.page,
            rows: self.rows,
            header_bands: self.header_bands,
        }
    }

    fn fits(&self, cursor: LayoutCursor, height: f32) -> bool {
        cursor.y + height <= self.config.geometry.printable_bottom() + EPSILON_MM
    }

    fn gap(&self, cursor: LayoutCursor, gap: f32) -> LayoutCursor {
        LayoutCursor {
            y: cursor.y + gap,
            ..cursor
        }
    }

    /// Emits the page break, title band and footer; returns the cursor at the body top.
    fn begin_page(&mut self, number: u32) -> LayoutCursor {
        let config = self.config;
        let geometry = &config.geometry;
        self.ops.push(PaintOp::BeginPage { number });

        self.centered_text(
            REPORT_TITLE,
            geometry.margin_left_mm,
            geometry.printable_width(),
            geometry.margin_top_mm,
            config.title,
            Rgb::BLACK,
        );
        self.centered_text(
            &format!("Page {number}"),
            geometry.margin_left_mm,
            geometry.printable_width(),
            geometry.height_mm - config.footer_offset_mm,
            config.footer,
            Rgb::GREY,
        );

        LayoutCursor {
            page: number,
            y: config.body_top(),
        }
    }

    fn break_page(&mut self, cursor: LayoutCursor) -> LayoutCursor {
        self.begin_page(cursor.page + 1)
    }

    // ── text sections ──────────────────────────────────────────────────────

    /// Heading followed by a wrapped paragraph. Breaks line by line; the heading always
    /// keeps at least its first line on the same page.
    fn paint_section(&mut self, cursor: LayoutCursor, heading: &str, text: &str) -> LayoutCursor {
        let config = self.config;
        let style = config.paragraph;
        let lines = wrap_text(
            text,
            get_metrics(style.face),
            style.size_pt,
            config.geometry.printable_width(),
        );

        let first_line = if lines.is_empty() {
            0.0
        } else {
            style.line_pitch_mm
        };
        let lead = config.heading.line_pitch_mm + first_line;
        let mut cursor = if self.fits(cursor, lead) {
            cursor
        } else {
            self.break_page(cursor)
        };

        let x = config.geometry.margin_left_mm;
        self.text_line(heading, x, cursor.y, config.heading, Rgb::BLACK);
        cursor.y += config.heading.line_pitch_mm;

        for line in &lines {
            if !self.fits(cursor, style.line_pitch_mm) {
                cursor = self.break_page(cursor);
            }
            self.text_line(line, x, cursor.y, style, Rgb::BLACK);
            cursor.y += style.line_pitch_mm;
        }
        cursor
    }

    // ── table ──────────────────────────────────────────────────────────────

    fn paint_table(&mut self, cursor: LayoutCursor, rows: &[LayoutRow]) -> LayoutCursor {
        let config = self.config;
        let first_row = rows
            .first()
            .map(|r| r.height_mm)
            .unwrap_or(config.min_row_height_mm);

        // Keep the header band together with the first row when the row can fit a page.
        let fresh_page_room = config.geometry.printable_bottom() - config.body_top();
        let lead = config.header.line_pitch_mm
            + first_row.min(fresh_page_room - config.header.line_pitch_mm);
        let mut cursor = if self.fits(cursor, lead) {
            cursor
        } else {
            self.break_page(cursor)
        };

        cursor = self.paint_header_band(cursor);
        for (index, row) in rows.iter().enumerate() {
            cursor = self.paint_row(cursor, index, row);
        }
        cursor
    }

    fn paint_header_band(&mut self, cursor: LayoutCursor) -> LayoutCursor {
        let config = self.config;
        let height = config.header.line_pitch_mm;
        let x0 = config.geometry.margin_left_mm;

        self.ops.push(PaintOp::Rect {
            x: x0,
            y: cursor.y,
            width: config.table_width(),
            height,
            fill: Some(Rgb::HEADER_FILL),
            stroke_mm: None,
        });

        let mut x = x0;
        for column in &config.columns {
            self.centered_text(
                column.key.header(),
                x,
                column.width_mm,
                cursor.y,
                config.header,
                Rgb::BLACK,
            );
            x += column.width_mm;
        }
        self.row_borders(cursor.y, height);

        self.header_bands.push(PlacedBand {
            page: cursor.page,
            y: cursor.y,
            height,
        });
        LayoutCursor {
            y: cursor.y + height,
            ..cursor
        }
    }

    /// Paints one row, breaking the page first when it does not fit. A row taller than a
    /// fresh page is split at line boundaries, the header band repeating on every page.
    fn paint_row(&mut self, mut cursor: LayoutCursor, index: usize, row: &LayoutRow) -> LayoutCursor {
        let config = self.config;
        let pitch = config.body.line_pitch_mm;
        let mut first_line = 0usize;

        loop {
            let remaining = row.line_count - first_line;
            let height = config.row_height(remaining);

            if self.fits(cursor, height) {
                self.paint_fragment(cursor, index, row, first_line..row.line_count, height);
                return LayoutCursor {
                    y: cursor.y + height,
                    ..cursor
                };
            }

            let table_top = config.body_top() + config.header.line_pitch_mm;
            if (cursor.y - table_top).abs() > EPSILON_MM {
                cursor = self.break_page(cursor);
                cursor = self.paint_header_band(cursor);
                continue;
            }

            // Already at the top of a fresh page and still too tall: split.
            let room = config.geometry.printable_bottom() - cursor.y - 2.0 * config.padding_y_mm;
            let take = ((room + EPSILON_MM) / pitch).floor().max(1.0) as usize;
            let take = take.min(remaining);
            let fragment_height = config.row_height(take);
            self.paint_fragment(cursor, index, row, first_line..first_line + take, fragment_height);
            first_line += take;
            if first_line >= row.line_count {
                return LayoutCursor {
                    y: cursor.y + fragment_height,
                    ..cursor
                };
            }

            cursor = self.break_page(cursor);
            cursor = self.paint_header_band(cursor);
        }
    }

    fn paint_fragment(
        &mut self,
        cursor: LayoutCursor,
        index: usize,
        row: &LayoutRow,
        lines: std::ops::Range<usize>,
        height: f32,
    ) {
        let config = self.config;
        let pitch = config.body.line_pitch_mm;
        let metrics = get_metrics(config.body.face);

        let mut x = config.geometry.margin_left_mm;
        for (column, cell) in config.columns.iter().zip(&row.cells) {
            let end = lines.end.min(cell.len());
            let start = lines.start.min(end);
            for (offset, line) in cell[start..end].iter().enumerate() {
                let line_top = cursor.y + config.padding_y_mm + offset as f32 * pitch;
                let width = metrics.measure_mm(line, config.body.size_pt);
                let inner = column.width_mm - 2.0 * config.padding_x_mm;
                let line_x = x
                    + config.padding_x_mm
                    + match column.alignment {
                        Alignment::Left => 0.0,
                        Alignment::Center => (inner - width) / 2.0,
                        Alignment::Right => inner - width,
                    };
                self.text_line(line, line_x, line_top, config.body, Rgb::BLACK);
            }
            x += column.width_mm;
        }

        // Borders go on after the text, once, at the shared height.
        self.row_borders(cursor.y, height);

        self.rows.push(PlacedRow {
            entry_index: index,
            page: cursor.page,
            y: cursor.y,
            height,
            line_count: lines.len(),
            continued: lines.start > 0,
        });
    }

    /// One bounding rectangle for the row plus the dividers between columns.
    fn row_borders(&mut self, y: f32, height: f32) {
        let config = self.config;
        let x0 = config.geometry.margin_left_mm;
        self.ops.push(PaintOp::Rect {
            x: x0,
            y,
            width: config.table_width(),
            height,
            fill: None,
            stroke_mm: Some(config.border_width_mm),
        });

        let mut x = x0;
        for column in &config.columns[..config.columns.len() - 1] {
            x += column.width_mm;
            self.ops.push(PaintOp::Line {
                x1: x,
                y1: y,
                x2: x,
                y2: y + height,
                width_mm: config.border_width_mm,
            });
        }
    }

    // ── text primitives ────────────────────────────────────────────────────

    /// Paints a single line whose box starts at `top` and is `style.line_pitch_mm` tall.
    fn text_line(&mut self, text: &str, x: f32, top: f32, style: TextStyle, color: Rgb) {
        if text.is_empty() {
            return;
        }
        self.ops.push(PaintOp::Text {
            x,
            baseline_y: baseline(top, style),
            text: text.to_string(),
            face: style.face,
            size_pt: style.size_pt,
            color,
        });
    }

    fn centered_text(
        &mut self,
        text: &str,
        x: f32,
        width: f32,
        top: f32,
        style: TextStyle,
        color: Rgb,
    ) {
        let text_width = get_metrics(style.face).measure_mm(text, style.size_pt);
        self.text_line(text, x + (width - text_width) / 2.0, top, style, color);
    }
}

/// Baseline that vertically centres a line in its box.
fn baseline(top: f32, style: TextStyle) -> f32 {
    top + 0.5 * style.line_pitch_mm + 0.3 * style.size_pt * MM_PER_PT
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
