//! Row, column and cell mutations.
//!
//! Each operation: validates its references (invalid ones are no-ops with no
//! history entry), mutates, pushes exactly one undo entry, refreshes the view
//! and emits one notification.

use crate::action::{CellChange, GridAction};
use crate::column::Column;
use crate::events::GridEvent;
use crate::filter::Filter;
use crate::grid::Grid;
use crate::sort::SortCriterion;
use crate::value::{row_value, Row, Value};

/// One write for `Grid::update_rows`, addressed by data index.
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    pub row: usize,
    pub key: String,
    pub value: Value,
}

impl CellUpdate {
    pub fn new(row: usize, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { row, key: key.into(), value: value.into() }
    }
}

impl Grid {
    // =========================================================================
    // Cells
    // =========================================================================

    /// Store a value. Null is stored as an absent key.
    pub(crate) fn write_cell(&mut self, data_row: usize, key: &str, value: Value) {
        let Some(row) = self.rows.get_mut(data_row) else {
            return;
        };
        if value.is_null() {
            row.remove(key);
        } else {
            row.insert(key.to_string(), value);
        }
    }

    /// Build the change for a write, or None if it would change nothing.
    pub(crate) fn change_for(&self, data_row: usize, key: &str, value: Value) -> Option<CellChange> {
        let old_value = row_value(self.rows.get(data_row)?, key).clone();
        let change = CellChange { row: data_row, key: key.to_string(), old_value, new_value: value };
        (!change.is_noop()).then_some(change)
    }

    /// Write one cell by data index. Returns false if nothing changed.
    pub fn set_cell_value(&mut self, data_row: usize, key: &str, value: impl Into<Value>) -> bool {
        let Some(change) = self.change_for(data_row, key, value.into()) else {
            return false;
        };
        self.cancel_edit();
        self.write_cell(change.row, &change.key, change.new_value.clone());
        self.refresh();
        self.emit(GridEvent::CellsUpdated { changes: vec![change.clone()] });
        self.record("Edit cell", GridAction::CellEdit(change));
        true
    }

    /// Apply several writes as one undoable unit. Writes to missing rows and
    /// writes that change nothing are skipped. Returns the applied changes.
    pub fn update_rows(&mut self, updates: Vec<CellUpdate>) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for update in updates {
            if let Some(change) = self.change_for(update.row, &update.key, update.value) {
                self.write_cell(change.row, &change.key, change.new_value.clone());
                changes.push(change);
            }
        }
        if changes.is_empty() {
            return changes;
        }

        self.cancel_edit();
        self.refresh();
        self.emit(GridEvent::CellsUpdated { changes: changes.clone() });
        self.record("Update rows", GridAction::BatchEdit { changes: changes.clone(), appended_rows: 0 });
        changes
    }

    // =========================================================================
    // Rows
    // =========================================================================

    pub(crate) fn at_row_ceiling(&self) -> bool {
        self.options.max_rows.is_some_and(|max| self.rows.len() >= max)
    }

    /// Append a row. Returns its data index, or None at the row ceiling.
    pub fn add_row(&mut self, row: Row) -> Option<usize> {
        if self.at_row_ceiling() {
            log::debug!("add_row refused: row ceiling {:?} reached", self.options.max_rows);
            return None;
        }
        self.cancel_edit();

        let index = self.rows.len();
        self.rows.push(row.clone());
        self.structure_rev += 1;
        self.refresh();
        self.emit(GridEvent::RowAdded { index, row: row.clone() });
        self.record("Add row", GridAction::RowAdded { index, row });
        Some(index)
    }

    /// Delete rows by data index. Unknown and duplicate indices are ignored.
    /// Returns the number of rows removed.
    pub fn delete_rows(&mut self, data_indices: &[usize]) -> usize {
        let mut indices: Vec<usize> = data_indices
            .iter()
            .copied()
            .filter(|&i| i < self.rows.len())
            .collect();
        indices.sort_unstable();
        indices.dedup();
        if indices.is_empty() {
            return 0;
        }
        self.cancel_edit();

        let mut removed: Vec<(usize, Row)> = indices
            .iter()
            .rev()
            .map(|&i| (i, self.rows.remove(i)))
            .collect();
        removed.reverse();

        self.structure_rev += 1;
        self.refresh();
        self.emit(GridEvent::RowsDeleted { indices: indices.clone() });
        self.record("Delete rows", GridAction::RowsDeleted { rows: removed });
        indices.len()
    }

    /// Delete every row covered by the effective selection.
    pub fn delete_selected_rows(&mut self) -> usize {
        let Some(range) = self.selection.effective_range() else {
            return 0;
        };
        let data: Vec<usize> = (range.start_row..=range.end_row)
            .filter_map(|r| self.view.data_index_of(r))
            .collect();
        self.delete_rows(&data)
    }

    /// Replace the whole row set. History is cleared; filters and sort stay.
    pub fn replace_data(&mut self, rows: Vec<Row>) {
        self.cancel_edit();
        self.rows = rows;
        self.structure_rev += 1;
        self.refresh();
        self.emit(GridEvent::DataReplaced { row_count: self.rows.len() });
        self.clear_history();
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Insert a column at `index` (declared order, clamped), or append.
    /// A duplicate key is refused.
    pub fn add_column(&mut self, column: Column, index: Option<usize>) -> bool {
        if self.column_index(&column.key).is_some() {
            log::debug!("add_column refused: key '{}' already exists", column.key);
            return false;
        }
        self.cancel_edit();

        let index = index.unwrap_or(self.columns.len()).min(self.columns.len());
        let key = column.key.clone();
        self.columns.insert(index, column.clone());
        self.structure_rev += 1;
        self.refresh();
        self.emit(GridEvent::ColumnAdded { index, key });
        self.record("Add column", GridAction::ColumnAdded { index, column });
        true
    }

    /// Remove a column along with its filter, sort entry and resized width.
    /// Row values under the key are kept so undo restores them as they were.
    pub fn delete_column(&mut self, key: &str) -> bool {
        let Some(index) = self.column_index(key) else {
            return false;
        };
        self.cancel_edit();

        let shown_at = self.visible_position(index);
        let (column, filter, sort, width) = self.remove_column_at(index);
        self.refresh();
        self.release_selection_from_column(shown_at);
        self.emit(GridEvent::ColumnDeleted { index, key: key.to_string() });
        self.record("Delete column", GridAction::ColumnDeleted { index, column, filter, sort, width });
        true
    }

    /// Remove the column at `index` and purge its per-key state.
    pub(crate) fn remove_column_at(
        &mut self,
        index: usize,
    ) -> (Column, Option<Filter>, Option<(usize, SortCriterion)>, Option<f64>) {
        let column = self.columns.remove(index);
        let filter = self.filters.remove(&column.key);
        let sort = self
            .sort
            .iter()
            .position(|c| c.key == column.key)
            .map(|pos| (pos, self.sort.remove(pos)));
        let width = self.widths.remove(&column.key);
        self.structure_rev += 1;
        (column, filter, sort, width)
    }

    /// Move a column within the declared order.
    pub fn move_column(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.columns.len() || to >= self.columns.len() {
            return false;
        }
        self.cancel_edit();

        let key = self.relocate_column(from, to);
        self.refresh();
        self.emit(GridEvent::ColumnMoved { key, from, to });
        self.record("Move column", GridAction::ColumnMoved { from, to });
        true
    }

    pub(crate) fn relocate_column(&mut self, from: usize, to: usize) -> String {
        let column = self.columns.remove(from);
        let key = column.key.clone();
        self.columns.insert(to, column);
        self.structure_rev += 1;
        key
    }

    /// Set a column width, clamped to its minimum. Not recorded in history.
    pub fn resize_column(&mut self, key: &str, width: f64) -> Option<f64> {
        let width = self.column(key)?.clamp_width(width);
        self.widths.insert(key.to_string(), width);
        self.emit(GridEvent::ColumnResized { key: key.to_string(), width });
        Some(width)
    }

    /// Hide or show a column. Not recorded in history.
    pub fn set_column_hidden(&mut self, key: &str, hidden: bool) -> bool {
        let Some(index) = self.column_index(key) else {
            return false;
        };
        if self.columns[index].hidden == hidden {
            return false;
        }
        self.cancel_edit();

        let shown_at = self.visible_position(index);
        self.columns[index].hidden = hidden;
        self.structure_rev += 1;
        self.refresh();
        if hidden {
            self.release_selection_from_column(shown_at);
        }
        self.emit(GridEvent::ColumnVisibilityChanged { key: key.to_string(), hidden });
        true
    }
}
