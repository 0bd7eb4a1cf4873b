//! Undoable grid operations.
//!
//! Every entry carries value snapshots only (old/new values, removed rows,
//! removed column state). Nothing here references live grid state, so an
//! entry stays valid no matter what happens to the grid after it was pushed.

use serde::Serialize;

use crate::column::Column;
use crate::filter::Filter;
use crate::sort::SortCriterion;
use crate::value::{Row, Value};

/// One cell write, addressed in data space.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellChange {
    /// Data index (not visual)
    pub row: usize,
    pub key: String,
    pub old_value: Value,
    pub new_value: Value,
}

impl CellChange {
    pub fn is_noop(&self) -> bool {
        self.old_value == self.new_value
    }
}

#[derive(Clone, Debug)]
pub enum GridAction {
    CellEdit(CellChange),
    /// Several cell writes as one unit. `appended_rows` empty rows are pushed
    /// to the end of the row array before the writes are applied.
    BatchEdit {
        changes: Vec<CellChange>,
        appended_rows: usize,
    },
    RowAdded {
        index: usize,
        row: Row,
    },
    /// Removed rows with their former data indices, ascending.
    RowsDeleted {
        rows: Vec<(usize, Row)>,
    },
    ColumnAdded {
        index: usize,
        column: Column,
    },
    /// A removed column plus the per-key state purged with it.
    ColumnDeleted {
        index: usize,
        column: Column,
        filter: Option<Filter>,
        sort: Option<(usize, SortCriterion)>,
        width: Option<f64>,
    },
    ColumnMoved {
        from: usize,
        to: usize,
    },
}

impl GridAction {
    /// Default history label.
    pub fn label(&self) -> &'static str {
        match self {
            GridAction::CellEdit(_) => "Edit cell",
            GridAction::BatchEdit { .. } => "Edit cells",
            GridAction::RowAdded { .. } => "Add row",
            GridAction::RowsDeleted { .. } => "Delete rows",
            GridAction::ColumnAdded { .. } => "Add column",
            GridAction::ColumnDeleted { .. } => "Delete column",
            GridAction::ColumnMoved { .. } => "Move column",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}
