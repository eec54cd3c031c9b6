//! Terminal rendering: bordered panels and the wrapped four-column materials table.
//!
//! Everything renders to `String` so the layout can be checked without a terminal.
//! Padding is computed on plain text before any color is applied.

use std::io::IsTerminal;

use owo_colors::OwoColorize;
use serde_json::Value;
use textwrap::core::display_width;

use crate::client::{Material, RecommendationResult};

pub const DEFAULT_WIDTH: usize = 100;
/// Column titles and their share of the table width.
const COLUMNS: [(&str, usize); 4] = [
    ("Material", 35),
    ("Properties", 60),
    ("Application", 40),
    ("Rationale", 55),
];

/// Border characters per table line: "│ " before each cell, " " after it, and the closing "│".
const CHROME: usize = 3 * COLUMNS.len() + 1;

/// Narrowest width the table can be drawn at: every header on one line.
const MIN_WIDTH: usize = header_widths_total() + CHROME;

const fn header_widths_total() -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < COLUMNS.len() {
        // Titles are ASCII, so byte length is display width.
        total += COLUMNS[i].0.len();
        i += 1;
    }
    total
}

/// Directory the server writes reports into, as printed for the user.
const REPORT_DIR: &str = "outputs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Bold,
    Cyan,
    Green,
    Yellow,
    Blue,
    Red,
}

const COLUMN_TONES: [Tone; 4] = [Tone::Cyan, Tone::Green, Tone::Yellow, Tone::Blue];

/// Whether output gets ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    color: bool,
}

impl Style {
    /// Colors on for an interactive stdout unless `NO_COLOR` is set.
    pub fn detect() -> Self {
        Self {
            color: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    fn paint(self, text: &str, tone: Tone) -> String {
        if !self.color {
            return text.to_string();
        }
        match tone {
            Tone::Bold => text.bold().to_string(),
            Tone::Cyan => text.cyan().to_string(),
            Tone::Green => text.green().to_string(),
            Tone::Yellow => text.yellow().to_string(),
            Tone::Blue => text.blue().to_string(),
            Tone::Red => text.red().bold().to_string(),
        }
    }
}

/// Full report: product panel, materials table, general recommendations, optional
/// sections, then the report location.
pub fn render_result(result: &RecommendationResult, width: usize, style: Style) -> String {
    let width = width.max(MIN_WIDTH);
    let mut out = String::new();

    out.push_str(&render_panel(
        "MaterialMind Results",
        &format!("Product: {}", result.product_description),
        width,
        Tone::Green,
        style,
    ));
    out.push('\n');
    out.push_str(&style.paint("Recommended Materials", Tone::Bold));
    out.push('\n');
    out.push_str(&render_table(&result.materials, width, style));
    out.push('\n');
    out.push_str(&render_panel(
        "General Recommendations",
        &result.recommendations,
        width,
        Tone::Blue,
        style,
    ));

    for (title, text) in result.extra_sections() {
        out.push('\n');
        out.push_str(&render_panel(title, text, width, Tone::Blue, style));
    }

    if let Some(pdf_path) = result.pdf_path.as_deref().filter(|p| !p.is_empty()) {
        out.push('\n');
        out.push_str(&format!(
            "{} {REPORT_DIR}/{pdf_path}\n",
            style.paint("PDF Report generated:", Tone::Green)
        ));
    }
    out
}

/// `Error: <status> - <body>`.
pub fn render_error(status: u16, body: &str, style: Style) -> String {
    format!("{} {status} - {body}", style.paint("Error:", Tone::Red))
}

/// Property pairs, one `key: value` line each.
pub fn format_properties(material: &Material) -> String {
    material
        .properties
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{key}: {s}"),
            other => format!("{key}: {other}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inner widths of the four columns for a table `width` characters wide.
///
/// Each column first gets room for its title; what is left is shared out by column share.
pub fn column_widths(width: usize) -> [usize; 4] {
    let available = width.max(MIN_WIDTH) - CHROME;
    let total_share: usize = COLUMNS.iter().map(|(_, share)| share).sum();

    let mut widths = COLUMNS.map(|(title, _)| display_width(title));
    let spare = available - widths.iter().sum::<usize>();
    for (column, (_, share)) in widths.iter_mut().zip(COLUMNS) {
        *column += spare * share / total_share;
    }
    // Rounding leftovers go to the widest column.
    let used: usize = widths.iter().sum();
    widths[1] += available - used;
    widths
}

/// Box-drawn table with one header row and one wrapped row per material.
pub fn render_table(materials: &[Material], width: usize, style: Style) -> String {
    let widths = column_widths(width);
    let mut out = String::new();

    out.push_str(&rule('┌', '┬', '┐', &widths));
    let headers = COLUMNS.map(|(title, _)| title.to_string());
    out.push_str(&render_row(&headers, &widths, style, true));
    out.push_str(&rule('├', '┼', '┤', &widths));

    for material in materials {
        let cells = [
            material.name.clone(),
            format_properties(material),
            material.application.clone(),
            material.rationale.clone(),
        ];
        out.push_str(&render_row(&cells, &widths, style, false));
    }

    out.push_str(&rule('└', '┴', '┘', &widths));
    out
}

fn render_row(cells: &[String; 4], widths: &[usize; 4], style: Style, header: bool) -> String {
    let wrapped: Vec<Vec<String>> = cells
        .iter()
        .zip(widths)
        .map(|(text, width)| wrap_cell(text, *width))
        .collect();
    let height = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);

    let mut out = String::new();
    for line in 0..height {
        for (column, lines) in wrapped.iter().enumerate() {
            let text = lines.get(line).map(String::as_str).unwrap_or("");
            let padded = pad(text, widths[column]);
            let tone = if header {
                Tone::Bold
            } else {
                COLUMN_TONES[column]
            };
            out.push_str("│ ");
            out.push_str(&style.paint(&padded, tone));
            out.push(' ');
        }
        out.push_str("│\n");
    }
    out
}

/// Bordered panel with the title set into the top edge.
fn render_panel(title: &str, body: &str, width: usize, tone: Tone, style: Style) -> String {
    let inner = width.max(MIN_WIDTH) - 4;
    let title_width = display_width(title);
    let top_fill = (inner + 2).saturating_sub(title_width + 3);

    let mut out = format!(
        "╭─ {} {}╮\n",
        style.paint(title, tone),
        "─".repeat(top_fill)
    );
    for line in wrap_cell(body, inner) {
        out.push_str(&format!("│ {} │\n", pad(&line, inner)));
    }
    out.push_str(&format!("╰{}╯\n", "─".repeat(inner + 2)));
    out
}

fn rule(left: char, join: char, right: char, widths: &[usize; 4]) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}\n", segments.join(&join.to_string()))
}

/// Wraps to `width` columns; explicit newlines start new lines. Never returns zero lines.
fn wrap_cell(text: &str, width: usize) -> Vec<String> {
    let lines: Vec<String> = textwrap::wrap(text.trim_end(), width)
        .into_iter()
        .map(|line| line.into_owned())
        .collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn material(name: &str, rationale: &str) -> Material {
        let Value::Object(properties) = json!({"density": "7.85 g/cm3", "hardness": 220}) else {
            unreachable!()
        };
        Material {
            name: name.to_string(),
            properties,
            application: "Shaft".to_string(),
            rationale: rationale.to_string(),
        }
    }

    fn result(materials: Vec<Material>) -> RecommendationResult {
        RecommendationResult {
            product_description: "gearbox housing".to_string(),
            materials,
            recommendations: "Machine after heat treatment.".to_string(),
            pdf_path: Some("MaterialMind_Recommendation_abc.pdf".to_string()),
            alt_materials: None,
            manufacturing_considerations: Some("Allow for distortion.".to_string()),
            cost_considerations: None,
        }
    }

    #[test]
    fn test_format_properties_one_line_each() {
        let m = material("4140", "Tough");
        assert_eq!(format_properties(&m), "density: 7.85 g/cm3\nhardness: 220");
    }

    #[test]
    fn test_column_widths_fill_the_table() {
        for width in [MIN_WIDTH, 60, 80, 100, 157] {
            let widths = column_widths(width);
            assert_eq!(widths.iter().sum::<usize>() + 13, width);
            for (w, (title, _)) in widths.iter().zip(COLUMNS) {
                assert!(*w >= title.len(), "{title} squeezed to {w} at width {width}");
            }
        }
        // Too-narrow requests are clamped.
        assert_eq!(column_widths(10), column_widths(MIN_WIDTH));
        assert_eq!(MIN_WIDTH, 51);
    }

    #[test]
    fn test_table_lines_share_one_width() {
        let long = "Chosen for its combination of fatigue strength and machinability, \
                    which suits high-cycle loading of the output shaft.";
        let table = render_table(&[material("AISI 4140", long)], 80, Style::plain());

        let widths: Vec<usize> = table.lines().map(display_width).collect();
        assert!(widths.iter().all(|w| *w == 80), "{widths:?}");
        // Header, borders, and a row wrapped onto several lines.
        assert!(table.lines().count() > 5);
        assert!(table.contains("│ Material"));
        assert!(table.contains("hardness: 220"));
    }

    #[test]
    fn test_empty_materials_render_header_only() {
        for width in [0, MIN_WIDTH, 60, 100] {
            let table = render_table(&[], width, Style::plain());
            assert_eq!(table.lines().count(), 4, "width {width}:\n{table}");
            assert!(table.contains("Application"));
        }
    }

    #[test]
    fn test_result_lists_sections_and_report_path() {
        let out = render_result(&result(vec![material("4140", "Tough")]), 100, Style::plain());

        assert!(out.contains("MaterialMind Results"));
        assert!(out.contains("Product: gearbox housing"));
        assert!(out.contains("General Recommendations"));
        assert!(out.contains("Manufacturing Considerations"));
        assert!(!out.contains("Cost Considerations"));
        assert!(out.ends_with("PDF Report generated: outputs/MaterialMind_Recommendation_abc.pdf\n"));
    }

    #[test]
    fn test_panel_lines_share_one_width() {
        let panel = render_panel(
            "General Recommendations",
            "Prefer forged blanks.\nStress relieve before finish machining.",
            60,
            Tone::Blue,
            Style::plain(),
        );
        assert!(panel.lines().all(|l| display_width(l) == 60), "{panel}");
        assert_eq!(panel.lines().count(), 4);
    }

    #[test]
    fn test_render_error_format() {
        assert_eq!(
            render_error(500, r#"{"error":{"code":"UPSTREAM_ERROR"}}"#, Style::plain()),
            r#"Error: 500 - {"error":{"code":"UPSTREAM_ERROR"}}"#
        );
    }
}
