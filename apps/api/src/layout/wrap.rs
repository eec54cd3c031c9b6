//! Greedy word wrap shared by row measurement and painting.
//!
//! The layout engine wraps every cell exactly once and paints the lines it measured, so the
//! row height and the painted text can never disagree.

use crate::layout::font_metrics::FontMetricTable;

/// Wraps `text` to lines no wider than `max_width_mm` at `size_pt`.
///
/// - Explicit newlines start a new line; blank lines inside the text are kept.
/// - Trailing blank lines are dropped. Empty or whitespace-only text yields no lines.
/// - Runs of whitespace collapse to a single space.
/// - A word wider than the line is split by character.
pub fn wrap_text(
    text: &str,
    metrics: &FontMetricTable,
    size_pt: f32,
    max_width_mm: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let text = text.trim_end();
    if text.is_empty() {
        return lines;
    }

    // Compare in em units to avoid re-scaling every word.
    let max_em = max_width_mm / (size_pt * crate::layout::font_metrics::MM_PER_PT);

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_em = 0.0_f32;
        let mut any_word = false;

        for word in paragraph.split_whitespace() {
            any_word = true;
            let word_em = metrics.measure_em(word);

            if word_em > max_em {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let mut pieces = split_word(word, metrics, max_em);
                // The last piece stays open so following words can join it.
                let last = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
                line_em = metrics.measure_em(&last);
                line = last;
                continue;
            }

            let space_em = if line.is_empty() {
                0.0
            } else {
                metrics.space_width
            };

            if !line.is_empty() && line_em + space_em + word_em > max_em {
                lines.push(std::mem::take(&mut line));
                line.push_str(word);
                line_em = word_em;
            } else {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(word);
                line_em += space_em + word_em;
            }
        }

        if any_word {
            lines.push(line);
        } else {
            lines.push(String::new());
        }
    }

    lines
}

/// Splits a single over-long word into pieces that each fit `max_em`.
/// Every piece holds at least one character.
fn split_word(word: &str, metrics: &FontMetricTable, max_em: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_em = 0.0_f32;

    for c in word.chars() {
        let w = metrics.char_width(c);
        if !piece.is_empty() && piece_em + w > max_em {
            pieces.push(std::mem::take(&mut piece));
            piece_em = 0.0;
        }
        piece.push(c);
        piece_em += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
