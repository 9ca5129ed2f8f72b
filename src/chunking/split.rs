//! Character-level text splitting primitives.
//!
//! All lengths are counted in `char`s so a window never cuts a code point.

use crate::document::TableGrid;

/// Splits on blank lines (lines holding only whitespace), trimming each
/// paragraph and dropping empty ones.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if line.trim().is_empty() {
            flush_paragraph(&mut current, &mut paragraphs);
        } else {
            current.push(line);
        }
    }
    flush_paragraph(&mut current, &mut paragraphs);

    paragraphs
}

fn flush_paragraph(current: &mut Vec<&str>, paragraphs: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    let paragraph = current.join("\n");
    let trimmed = paragraph.trim();
    if !trimmed.is_empty() {
        paragraphs.push(trimmed.to_string());
    }
    current.clear();
}

/// Greedily packs consecutive paragraphs while `len(buf) + 1 + len(next) <= max_len`.
///
/// A paragraph that does not fit starts a new unit; units may still exceed
/// `max_len` when a single paragraph does.
pub fn pack_paragraphs(paragraphs: Vec<String>, max_len: usize) -> Vec<String> {
    let mut units = Vec::new();
    let mut buf = String::new();
    let mut buf_len = 0usize;

    for paragraph in paragraphs {
        let len = paragraph.chars().count();
        if buf_len + 1 + len <= max_len {
            if buf.is_empty() {
                buf = paragraph;
                buf_len = len;
            } else {
                buf.push('\n');
                buf.push_str(&paragraph);
                buf_len += 1 + len;
            }
        } else {
            if !buf.is_empty() {
                units.push(std::mem::take(&mut buf));
            }
            buf = paragraph;
            buf_len = len;
        }
    }

    if !buf.is_empty() {
        units.push(buf);
    }

    units
}

/// Slices `unit` into windows of at most `max_len` chars, adjacent windows
/// sharing exactly `overlap` chars. Units within the limit are returned whole.
///
/// Callers guarantee `overlap < max_len` so the window always advances.
pub fn sliding_window(unit: &str, max_len: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = unit.chars().collect();
    if chars.len() <= max_len {
        return vec![unit.to_string()];
    }

    let mut windows = Vec::new();
    let mut start = 0usize;
    while start < chars.len() {
        let end = (start + max_len).min(chars.len());
        windows.push(chars[start..end].iter().collect());
        if start + max_len >= chars.len() {
            break;
        }
        start = (start + max_len).saturating_sub(overlap);
    }

    windows
}

/// Renders a table as `- c1 | c2 | c3` lines, skipping rows whose cells are all blank.
pub fn flatten_table(table: &TableGrid) -> String {
    table
        .rows()
        .iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            let cells: Vec<&str> = row.iter().map(|cell| cell.trim()).collect();
            format!("- {}", cells.join(" | "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
