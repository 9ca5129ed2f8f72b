//! OCR input and normalized document types.
//!
//! [`RawElement`] mirrors the block graph emitted by the OCR engine. Everything
//! downstream of [`crate::normalize`] works on [`NormalizedDocument`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::lang::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Block kinds the reducer understands.
pub enum ElementKind {
    Line,
    Word,
    SelectionMark,
    Table,
    Cell,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
/// Bounding box normalized to the page (0.0 - 1.0).
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One node of the OCR block graph.
pub struct RawElement {
    pub id: String,
    pub kind: ElementKind,
    /// 1-based page number.
    pub page: u32,
    #[serde(default)]
    pub text: Option<String>,
    /// Selection state; only meaningful for [`ElementKind::SelectionMark`].
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    /// Ordered child references (Table -> Cell, Cell -> Word/SelectionMark).
    #[serde(default)]
    pub child_ids: Vec<String>,
    /// 1-based row index, carried by Cell nodes.
    #[serde(default)]
    pub row: Option<u32>,
    /// 1-based column index, carried by Cell nodes.
    #[serde(default)]
    pub col: Option<u32>,
}

impl RawElement {
    pub fn new(id: impl Into<String>, kind: ElementKind, page: u32) -> Self {
        Self {
            id: id.into(),
            kind,
            page,
            text: None,
            selected: false,
            bounding_box: None,
            child_ids: Vec::new(),
            row: None,
            col: None,
        }
    }

    pub fn line(id: impl Into<String>, page: u32, text: impl Into<String>) -> Self {
        Self::new(id, ElementKind::Line, page).with_text(text)
    }

    pub fn word(id: impl Into<String>, page: u32, text: impl Into<String>) -> Self {
        Self::new(id, ElementKind::Word, page).with_text(text)
    }

    pub fn selection_mark(id: impl Into<String>, page: u32, selected: bool) -> Self {
        let mut element = Self::new(id, ElementKind::SelectionMark, page);
        element.selected = selected;
        element
    }

    pub fn table<I, S>(id: impl Into<String>, page: u32, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(id, ElementKind::Table, page).with_children(cells)
    }

    pub fn cell<I, S>(id: impl Into<String>, page: u32, row: u32, col: u32, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut element = Self::new(id, ElementKind::Cell, page).with_children(children);
        element.row = Some(row);
        element.col = Some(col);
        element
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.child_ids = children.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A text line and where it sits on the page.
pub struct LineRecord {
    pub text: String,
    pub bounding_box: Option<BoundingBox>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Dense, rectangular table grid. Missing cells are empty strings.
pub struct TableGrid {
    rows: Vec<Vec<String>>,
}

impl TableGrid {
    /// Builds a grid from sparse `(row, col) -> text` entries (1-based).
    ///
    /// Returns `None` when there are no entries.
    pub fn from_cells<I>(cells: I) -> Option<Self>
    where
        I: IntoIterator<Item = ((u32, u32), String)>,
    {
        let cells: BTreeMap<(u32, u32), String> = cells.into_iter().collect();
        let max_row = cells.keys().map(|(r, _)| *r).max()?;
        let max_col = cells.keys().map(|(_, c)| *c).max()?;

        let rows = (1..=max_row)
            .map(|r| {
                (1..=max_col)
                    .map(|c| cells.get(&(r, c)).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Some(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Cell text at 1-based `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row.checked_sub(1)?)?
            .get(col.checked_sub(1)?)
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPage {
    /// 1-based page number.
    pub page_number: u32,
    pub language: Language,
    pub text: String,
    pub lines: Vec<LineRecord>,
    pub tables: Vec<TableGrid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Output of normalization, consumed by the chunker.
pub struct NormalizedDocument {
    pub doc_id: String,
    /// Opaque reference to the raw bytes (e.g. an object-store key).
    pub source_locator: String,
    /// Free-form metadata: title, department, date.
    pub metadata: BTreeMap<String, String>,
    pub pages: Vec<NormalizedPage>,
}

impl NormalizedDocument {
    pub fn page(&self, page_number: u32) -> Option<&NormalizedPage> {
        self.pages.iter().find(|p| p.page_number == page_number)
    }
}
