use std::collections::HashMap;

use tracing::debug;

use crate::document::{ElementKind, RawElement, TableGrid};

/// Rendering of a selected selection mark inside a cell.
pub const SELECTED_MARK: &str = "[X]";

/// Id lookup over one document's element set. First occurrence of an id wins.
pub struct ElementIndex<'a> {
    by_id: HashMap<&'a str, &'a RawElement>,
}

impl<'a> ElementIndex<'a> {
    pub fn new(elements: &'a [RawElement]) -> Self {
        let mut by_id = HashMap::with_capacity(elements.len());
        for element in elements {
            by_id.entry(element.id.as_str()).or_insert(element);
        }
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a RawElement> {
        self.by_id.get(id).copied()
    }

    /// Resolves `ids` in order, skipping dangling references.
    pub fn resolve<'b>(&'b self, ids: &'b [String]) -> impl Iterator<Item = &'a RawElement> + 'b {
        ids.iter().filter_map(move |id| {
            let found = self.get(id);
            if found.is_none() {
                debug!(element_id = %id, "Skipping dangling child reference");
            }
            found
        })
    }
}

/// Rebuilds the grid for one Table element.
///
/// Returns `None` when none of the table's children resolve to a Cell.
pub fn reconstruct_table(table: &RawElement, index: &ElementIndex<'_>) -> Option<TableGrid> {
    let cells = index
        .resolve(&table.child_ids)
        .filter(|child| child.kind == ElementKind::Cell)
        .map(|cell| {
            let row = cell.row.unwrap_or(1).max(1);
            let col = cell.col.unwrap_or(1).max(1);
            ((row, col), cell_text(cell, index))
        });

    let grid = TableGrid::from_cells(cells);
    if grid.is_none() {
        debug!(table_id = %table.id, "Dropping table without resolvable cells");
    }
    grid
}

/// Word texts and selected marks of a cell, space-joined and trimmed.
pub fn cell_text(cell: &RawElement, index: &ElementIndex<'_>) -> String {
    let parts: Vec<&str> = index
        .resolve(&cell.child_ids)
        .filter_map(|child| match child.kind {
            ElementKind::Word => child.text.as_deref(),
            ElementKind::SelectionMark if child.selected => Some(SELECTED_MARK),
            _ => None,
        })
        .filter(|part| !part.is_empty())
        .collect();

    parts.join(" ").trim().to_string()
}
