//! Grid change notifications.
//!
//! Each event carries enough data for a listener to react without querying
//! the grid again. Row coordinates are visual unless a field says otherwise.

use gridkit_core::{CellPos, Range};

use crate::action::CellChange;
use crate::clipboard::{ClipboardError, ClipboardOp};
use crate::sort::SortCriterion;
use crate::value::{Row, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    SelectionChanged {
        active: Option<CellPos>,
        range: Option<Range>,
    },

    EditStarted {
        position: CellPos,
        key: String,
        value: Value,
    },
    /// A committed edit. `change.row` is a data index.
    EditCommitted {
        position: CellPos,
        change: CellChange,
    },
    EditCancelled {
        position: CellPos,
        key: String,
    },
    /// The column validator refused the value; the edit stays open.
    EditRejected {
        position: CellPos,
        key: String,
        value: Value,
        message: String,
    },

    /// `index` is the data index of the new row.
    RowAdded {
        index: usize,
        row: Row,
    },
    /// Data indices (before removal), ascending.
    RowsDeleted {
        indices: Vec<usize>,
    },
    /// Deleted rows put back by undo, with their data indices, ascending.
    RowsRestored {
        rows: Vec<(usize, Row)>,
    },
    CellsUpdated {
        changes: Vec<CellChange>,
    },
    /// The whole row set was swapped out.
    DataReplaced {
        row_count: usize,
    },

    ColumnAdded {
        index: usize,
        key: String,
    },
    ColumnDeleted {
        index: usize,
        key: String,
    },
    ColumnMoved {
        key: String,
        from: usize,
        to: usize,
    },
    ColumnResized {
        key: String,
        width: f64,
    },
    ColumnVisibilityChanged {
        key: String,
        hidden: bool,
    },

    SortChanged {
        criteria: Vec<SortCriterion>,
    },
    /// Keys with an active filter after the change.
    FilterChanged {
        keys: Vec<String>,
        filtered_row_count: usize,
    },

    ClipboardCopied {
        range: Range,
    },
    /// Cut finished: the clipboard was written and the range cleared.
    ClipboardCut {
        range: Range,
        changes: Vec<CellChange>,
    },
    ClipboardPasted {
        range: Range,
        changes: Vec<CellChange>,
        appended_rows: usize,
    },
    ClipboardFailed {
        op: ClipboardOp,
        error: ClipboardError,
    },

    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
    },
}

/// Listener callback.
pub type EventCallback = Box<dyn FnMut(&GridEvent)>;

/// Event queue drained with `Grid::take_events`, with typed views for tests.
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    events: Vec<GridEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: GridEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GridEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Every cell change, from edits, batch updates, cuts and pastes, in order.
    pub fn cell_changes(&self) -> Vec<&CellChange> {
        self.events
            .iter()
            .flat_map(|e| match e {
                GridEvent::EditCommitted { change, .. } => std::slice::from_ref(change),
                GridEvent::CellsUpdated { changes } => changes.as_slice(),
                GridEvent::ClipboardPasted { changes, .. } => changes.as_slice(),
                GridEvent::ClipboardCut { changes, .. } => changes.as_slice(),
                _ => [].as_slice(),
            })
            .collect()
    }

    pub fn selection_changes(&self) -> Vec<(Option<CellPos>, Option<Range>)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::SelectionChanged { active, range } => Some((*active, *range)),
                _ => None,
            })
            .collect()
    }

    pub fn clipboard_failures(&self) -> Vec<(ClipboardOp, &ClipboardError)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::ClipboardFailed { op, error } => Some((*op, error)),
                _ => None,
            })
            .collect()
    }

    /// `(can_undo, can_redo)` per availability change.
    pub fn history_changes(&self) -> Vec<(bool, bool)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::HistoryChanged { can_undo, can_redo } => Some((*can_undo, *can_redo)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(row: usize, v: f64) -> CellChange {
        CellChange {
            row,
            key: "n".into(),
            old_value: Value::Null,
            new_value: Value::Number(v),
        }
    }

    #[test]
    fn test_queue_filtering() {
        let mut q = EventQueue::new();
        q.push(GridEvent::SelectionChanged { active: Some(CellPos::new(0, 0)), range: None });
        q.push(GridEvent::EditCommitted { position: CellPos::new(0, 0), change: change(3, 1.0) });
        q.push(GridEvent::CellsUpdated { changes: vec![change(1, 2.0), change(2, 3.0)] });
        q.push(GridEvent::HistoryChanged { can_undo: true, can_redo: false });
        q.push(GridEvent::ClipboardFailed { op: ClipboardOp::Paste, error: ClipboardError::Empty });

        assert_eq!(q.len(), 5);
        let rows: Vec<usize> = q.cell_changes().iter().map(|c| c.row).collect();
        assert_eq!(rows, vec![3, 1, 2]);
        assert_eq!(q.selection_changes().len(), 1);
        assert_eq!(q.history_changes(), vec![(true, false)]);
        assert_eq!(q.clipboard_failures(), vec![(ClipboardOp::Paste, &ClipboardError::Empty)]);

        let drained = q.take();
        assert_eq!(drained.len(), 5);
        assert!(q.is_empty());
    }
}
