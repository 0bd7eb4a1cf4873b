//! Edit lifecycle: begin, commit, cancel, plus the filter menu mode.
//!
//! Positions are visual. Every operation that can move rows or columns
//! cancels the open edit first, so the session position stays valid for as
//! long as the session exists.

use gridkit_core::CellPos;

use crate::action::{CellChange, GridAction};
use crate::clipboard::coerce_for_column;
use crate::column::ColumnType;
use crate::events::GridEvent;
use crate::grid::Grid;
use crate::value::{row_value, Value};

impl Grid {
    /// Data index and column key for a visual cell.
    pub(crate) fn resolve_cell(&self, pos: CellPos) -> Option<(usize, String)> {
        let data_row = self.view.data_index_of(pos.row)?;
        let key = self.visible_column(pos.col)?.key.clone();
        Some((data_row, key))
    }

    /// Start editing a visual cell, selecting it.
    ///
    /// Boolean columns never open an editor: the value is toggled and
    /// committed immediately. Any edit already open elsewhere is cancelled.
    /// Returns false if the cell is out of bounds or not editable.
    pub fn begin_edit(&mut self, row: usize, col: usize) -> bool {
        let pos = CellPos::new(row, col);
        let Some(column) = self.visible_column(col) else {
            return false;
        };
        if !self.is_column_editable(column) {
            return false;
        }
        let is_boolean = column.column_type == ColumnType::Boolean;
        let Some((data_row, key)) = self.resolve_cell(pos) else {
            return false;
        };
        if self.editing.is_editing(row, col) {
            return true;
        }

        self.cancel_edit();
        self.filter_menu = None;
        self.select_cell(row, col);

        let current = row_value(&self.rows[data_row], &key).clone();
        if is_boolean {
            let toggled = Value::Bool(!current.truthy());
            if let Some(change) = self.change_for(data_row, &key, toggled) {
                self.write_cell(data_row, &key, change.new_value.clone());
                self.refresh();
                self.emit(GridEvent::EditCommitted { position: pos, change: change.clone() });
                self.record("Edit cell", GridAction::CellEdit(change));
            }
            return true;
        }

        self.editing.start(pos, current.clone());
        self.emit(GridEvent::EditStarted { position: pos, key, value: current });
        true
    }

    /// Commit the open edit with `value`.
    ///
    /// If the column validator rejects the value the edit stays open and
    /// `EditRejected` is emitted. Returns true when the edit closed.
    pub fn commit_edit(&mut self, value: impl Into<Value>) -> bool {
        let value = value.into();
        let Some(pos) = self.editing.session().map(|s| s.position) else {
            return false;
        };
        let Some((data_row, key)) = self.resolve_cell(pos) else {
            self.cancel_edit();
            return false;
        };

        let verdict = match self.visible_column(pos.col) {
            Some(column) => column.validate(&value, &self.rows[data_row]),
            None => Ok(()),
        };
        if let Err(message) = verdict {
            log::debug!("edit at {:?} rejected: {}", pos, message);
            self.emit(GridEvent::EditRejected { position: pos, key, value, message });
            return false;
        }

        self.editing.commit();
        match self.change_for(data_row, &key, value.clone()) {
            Some(change) => {
                self.write_cell(data_row, &key, value);
                self.refresh();
                self.emit(GridEvent::EditCommitted { position: pos, change: change.clone() });
                self.record("Edit cell", GridAction::CellEdit(change));
            }
            None => {
                let current = row_value(&self.rows[data_row], &key).clone();
                let change = CellChange {
                    row: data_row,
                    key,
                    old_value: current.clone(),
                    new_value: current,
                };
                self.emit(GridEvent::EditCommitted { position: pos, change });
            }
        }
        true
    }

    /// Commit editor text, coerced for the column the way pasted text is.
    pub fn commit_edit_text(&mut self, text: &str) -> bool {
        let Some(pos) = self.editing.session().map(|s| s.position) else {
            return false;
        };
        let value = match self.visible_column(pos.col) {
            Some(column) => coerce_for_column(text, column),
            None => Value::text(text),
        };
        self.commit_edit(value)
    }

    /// Discard the open edit. Returns false if nothing was open.
    pub fn cancel_edit(&mut self) -> bool {
        let Some(session) = self.editing.cancel() else {
            return false;
        };
        let key = self
            .visible_column(session.position.col)
            .map(|c| c.key.clone())
            .unwrap_or_default();
        self.emit(GridEvent::EditCancelled { position: session.position, key });
        true
    }

    // =========================================================================
    // Filter menu
    // =========================================================================

    /// Open the filter menu for a column. Cancels any open edit.
    pub fn open_filter_menu(&mut self, key: &str) -> bool {
        if self.column(key).is_none() {
            return false;
        }
        self.cancel_edit();
        self.filter_menu = Some(key.to_string());
        true
    }

    pub fn close_filter_menu(&mut self) -> bool {
        self.filter_menu.take().is_some()
    }
}
