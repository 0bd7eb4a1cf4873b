//! Copy, cut, paste and range clearing.
//!
//! Clipboard I/O belongs to the host and may complete later, so each operation
//! runs in two phases:
//!
//! 1. `begin_*` snapshots the target into a [`ClipboardTicket`] (and for
//!    copy/cut, encodes the text to write).
//! 2. The host does the platform I/O and hands the result to `complete_*`.
//!
//! A ticket is applied against the grid as it is at completion time. If the
//! structure changed in between (rows or columns added, deleted, moved or
//! hidden) the ticket is stale: it is discarded with a `ClipboardFailed`
//! notification instead of writing to shifted coordinates.

use gridkit_core::Range;

use crate::action::{CellChange, GridAction};
use crate::clipboard::{
    coerce_for_column, decode, encode_rows, ClipboardError, ClipboardOp, ClipboardProvider, ClipboardTicket,
};
use crate::events::GridEvent;
use crate::grid::Grid;
use crate::value::{Row, Value};

impl Grid {
    fn ticket_for(&self, op: ClipboardOp, range: Range) -> ClipboardTicket {
        let keys = self.visible_column_keys();
        ClipboardTicket {
            op,
            range,
            structure_rev: self.structure_rev,
            column_keys: (range.start_col..=range.end_col)
                .filter_map(|c| keys.get(c).cloned())
                .collect(),
            data_rows: (range.start_row..=range.end_row)
                .filter_map(|r| self.view.data_index_of(r))
                .collect(),
        }
    }

    fn ticket_is_current(&self, ticket: &ClipboardTicket) -> bool {
        let anchor = ticket.anchor();
        ticket.structure_rev == self.structure_rev
            && anchor.row < self.view.visible_count()
            && anchor.col < self.visible_columns.len()
    }

    fn clipboard_failed(&mut self, op: ClipboardOp, error: ClipboardError) {
        log::warn!("clipboard {} failed: {}", op, error);
        self.emit(GridEvent::ClipboardFailed { op, error });
    }

    // =========================================================================
    // Copy / cut
    // =========================================================================

    /// Encode the effective selection for the clipboard. Fields are quoted
    /// where needed so a later paste reproduces the same cells.
    pub fn selection_text(&self) -> Option<String> {
        let range = self.selection.effective_range()?;
        Some(self.encode_ticket(&self.ticket_for(ClipboardOp::Copy, range)))
    }

    fn encode_ticket(&self, ticket: &ClipboardTicket) -> String {
        let keys: Vec<&str> = ticket.column_keys.iter().map(String::as_str).collect();
        let rows = ticket.data_rows.iter().filter_map(|&d| self.rows.get(d));
        encode_rows(rows, &keys, true)
    }

    /// Start a copy. Returns the ticket and the text to write.
    pub fn begin_copy(&mut self) -> Option<(ClipboardTicket, String)> {
        let range = self.selection.effective_range()?;
        let ticket = self.ticket_for(ClipboardOp::Copy, range);
        let text = self.encode_ticket(&ticket);
        Some((ticket, text))
    }

    pub fn complete_copy(&mut self, ticket: ClipboardTicket, result: Result<(), ClipboardError>) {
        match result {
            Ok(()) => self.emit(GridEvent::ClipboardCopied { range: ticket.range }),
            Err(e) => self.clipboard_failed(ClipboardOp::Copy, e),
        }
    }

    /// Start a cut. Nothing is cleared until the write succeeds.
    pub fn begin_cut(&mut self) -> Option<(ClipboardTicket, String)> {
        if !self.options.editable {
            return None;
        }
        let range = self.selection.effective_range()?;
        let ticket = self.ticket_for(ClipboardOp::Cut, range);
        let text = self.encode_ticket(&ticket);
        Some((ticket, text))
    }

    /// Finish a cut: on a successful write, clear the cut cells as one
    /// undoable step.
    pub fn complete_cut(&mut self, ticket: ClipboardTicket, result: Result<(), ClipboardError>) {
        if let Err(e) = result {
            self.clipboard_failed(ClipboardOp::Cut, e);
            return;
        }
        if ticket.structure_rev != self.structure_rev {
            self.clipboard_failed(ClipboardOp::Cut, ClipboardError::StaleTarget);
            return;
        }
        self.cancel_edit();

        let changes = self.clear_cells(&ticket.data_rows, &ticket.column_keys);
        self.refresh();
        self.emit(GridEvent::ClipboardCut { range: ticket.range, changes: changes.clone() });
        if !changes.is_empty() {
            self.record("Cut", GridAction::BatchEdit { changes, appended_rows: 0 });
        }
    }

    // =========================================================================
    // Paste
    // =========================================================================

    /// Start a paste at the top-left of the effective selection.
    pub fn begin_paste(&mut self) -> Option<ClipboardTicket> {
        if !self.options.editable {
            return None;
        }
        let range = self.selection.effective_range()?;
        Some(self.ticket_for(ClipboardOp::Paste, range))
    }

    /// Finish a paste with the clipboard text.
    ///
    /// The block is written starting at the ticket's anchor, left to right
    /// over visible columns (read-only columns are skipped, overflow columns
    /// dropped). Rows past the last visible row are appended to the data,
    /// stopping at the row ceiling. Value changes and appended rows form one
    /// undo entry. The pasted rectangle becomes the selection.
    pub fn complete_paste(&mut self, ticket: ClipboardTicket, result: Result<String, ClipboardError>) {
        let text = match result {
            Ok(text) => text,
            Err(e) => return self.clipboard_failed(ClipboardOp::Paste, e),
        };
        if !self.ticket_is_current(&ticket) {
            return self.clipboard_failed(ClipboardOp::Paste, ClipboardError::StaleTarget);
        }
        let matrix = decode(&text);
        if matrix.is_empty() {
            return self.clipboard_failed(ClipboardOp::Paste, ClipboardError::Empty);
        }
        self.cancel_edit();

        let anchor = ticket.anchor();
        let mut changes: Vec<CellChange> = Vec::new();
        let mut appended_rows = 0;
        let mut rows_written = 0;
        let mut widest = 0;

        for (i, fields) in matrix.iter().enumerate() {
            let visual_row = anchor.row + i;
            let data_row = match self.view.data_index_of(visual_row) {
                Some(d) => d,
                None => {
                    if self.at_row_ceiling() {
                        log::debug!("paste stopped at row ceiling {:?}", self.options.max_rows);
                        break;
                    }
                    self.rows.push(Row::default());
                    appended_rows += 1;
                    self.rows.len() - 1
                }
            };

            for (j, raw) in fields.iter().enumerate() {
                let Some(column) = self.visible_column(anchor.col + j) else {
                    break;
                };
                widest = widest.max(j + 1);
                if !self.is_column_editable(column) {
                    continue;
                }
                let key = column.key.clone();
                let value = coerce_for_column(raw, column);
                if let Some(change) = self.change_for(data_row, &key, value) {
                    self.write_cell(data_row, &key, change.new_value.clone());
                    changes.push(change);
                }
            }
            rows_written += 1;
        }

        if appended_rows > 0 {
            self.structure_rev += 1;
        }
        self.refresh();

        let range = Range::new(
            anchor.row,
            anchor.col,
            anchor.row + rows_written.max(1) - 1,
            anchor.col + widest.max(1) - 1,
        );
        let (rows, cols) = self.selection.dimensions();
        self.select_range(Range::new(
            range.start_row,
            range.start_col,
            range.end_row.min(rows.saturating_sub(1)),
            range.end_col.min(cols.saturating_sub(1)),
        ));

        self.emit(GridEvent::ClipboardPasted { range, changes: changes.clone(), appended_rows });
        if !changes.is_empty() || appended_rows > 0 {
            self.record("Paste", GridAction::BatchEdit { changes, appended_rows });
        }
    }

    // =========================================================================
    // Synchronous conveniences
    // =========================================================================

    /// Copy the selection through `provider`. Returns false if nothing is selected.
    pub fn copy_to(&mut self, provider: &mut dyn ClipboardProvider) -> bool {
        let Some((ticket, text)) = self.begin_copy() else {
            return false;
        };
        let result = provider.write_text(&text);
        self.complete_copy(ticket, result);
        true
    }

    pub fn cut_to(&mut self, provider: &mut dyn ClipboardProvider) -> bool {
        let Some((ticket, text)) = self.begin_cut() else {
            return false;
        };
        let result = provider.write_text(&text);
        self.complete_cut(ticket, result);
        true
    }

    pub fn paste_from(&mut self, provider: &mut dyn ClipboardProvider) -> bool {
        let Some(ticket) = self.begin_paste() else {
            return false;
        };
        let result = provider.read_text();
        self.complete_paste(ticket, result);
        true
    }

    // =========================================================================
    // Clear
    // =========================================================================

    /// Reset the effective selection to each column's empty value
    /// (`false`, `0` or `""`). One undo entry.
    pub fn clear_selected_cells(&mut self) -> usize {
        if !self.options.editable {
            return 0;
        }
        let Some(range) = self.selection.effective_range() else {
            return 0;
        };
        self.cancel_edit();

        let ticket = self.ticket_for(ClipboardOp::Cut, range);
        let changes = self.clear_cells(&ticket.data_rows, &ticket.column_keys);
        if changes.is_empty() {
            return 0;
        }
        self.refresh();
        self.emit(GridEvent::CellsUpdated { changes: changes.clone() });
        let count = changes.len();
        self.record("Clear", GridAction::BatchEdit { changes, appended_rows: 0 });
        count
    }

    /// Write empty values into the given cells, skipping read-only columns.
    fn clear_cells(&mut self, data_rows: &[usize], keys: &[String]) -> Vec<CellChange> {
        let empties: Vec<(String, Value)> = keys
            .iter()
            .filter_map(|k| self.column(k))
            .filter(|c| self.is_column_editable(c))
            .map(|c| (c.key.clone(), c.empty_value()))
            .collect();

        let mut changes = Vec::new();
        for &data_row in data_rows {
            for (key, empty) in &empties {
                if let Some(change) = self.change_for(data_row, key, empty.clone()) {
                    self.write_cell(data_row, key, empty.clone());
                    changes.push(change);
                }
            }
        }
        changes
    }
}
