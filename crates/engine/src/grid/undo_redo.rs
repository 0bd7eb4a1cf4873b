//! Undo/Redo for Grid.
//!
//! This module contains:
//! - undo() and redo()
//! - apply(), the single dispatcher that plays a `GridAction` in either
//!   direction and emits the matching domain notification

use crate::action::{CellChange, Direction, GridAction};
use crate::events::GridEvent;
use crate::grid::Grid;
use crate::value::Row;

impl Grid {
    /// Undo the last operation. Returns its label.
    pub fn undo(&mut self) -> Option<String> {
        self.step_history(Direction::Undo)
    }

    /// Redo the last undone operation. Returns its label.
    pub fn redo(&mut self) -> Option<String> {
        self.step_history(Direction::Redo)
    }

    fn step_history(&mut self, direction: Direction) -> Option<String> {
        let before = (self.history.can_undo(), self.history.can_redo());
        let entry = match direction {
            Direction::Undo => self.history.undo(),
            Direction::Redo => self.history.redo(),
        }?;
        self.cancel_edit();

        log::debug!("{:?}: {}", direction, entry.label);
        self.apply(entry.action, direction);
        self.notify_history(before);
        Some(entry.label)
    }

    /// Play `action` forwards (redo) or backwards (undo).
    fn apply(&mut self, action: GridAction, direction: Direction) {
        let undo = direction == Direction::Undo;
        match action {
            GridAction::CellEdit(change) => {
                let change = oriented(change, direction);
                self.write_cell(change.row, &change.key, change.new_value.clone());
                self.refresh();
                self.emit(GridEvent::CellsUpdated { changes: vec![change] });
            }

            GridAction::BatchEdit { changes, appended_rows } => {
                let changes: Vec<CellChange> = if undo {
                    changes.into_iter().rev().map(|c| oriented(c, direction)).collect()
                } else {
                    self.rows.extend((0..appended_rows).map(|_| Row::default()));
                    changes
                };
                for change in &changes {
                    self.write_cell(change.row, &change.key, change.new_value.clone());
                }
                if undo {
                    let keep = self.rows.len().saturating_sub(appended_rows);
                    self.rows.truncate(keep);
                }
                if appended_rows > 0 {
                    self.structure_rev += 1;
                }
                self.refresh();
                self.emit(GridEvent::CellsUpdated { changes });
            }

            GridAction::RowAdded { index, row } => {
                self.structure_rev += 1;
                if undo {
                    if index < self.rows.len() {
                        self.rows.remove(index);
                    }
                    self.refresh();
                    self.emit(GridEvent::RowsDeleted { indices: vec![index] });
                } else {
                    let index = index.min(self.rows.len());
                    self.rows.insert(index, row.clone());
                    self.refresh();
                    self.emit(GridEvent::RowAdded { index, row });
                }
            }

            GridAction::RowsDeleted { rows } => {
                self.structure_rev += 1;
                if undo {
                    let rows: Vec<(usize, Row)> = rows
                        .into_iter()
                        .map(|(index, row)| {
                            let index = index.min(self.rows.len());
                            self.rows.insert(index, row.clone());
                            (index, row)
                        })
                        .collect();
                    self.refresh();
                    self.emit(GridEvent::RowsRestored { rows });
                } else {
                    let indices: Vec<usize> = rows.iter().map(|(i, _)| *i).collect();
                    for &index in indices.iter().rev() {
                        if index < self.rows.len() {
                            self.rows.remove(index);
                        }
                    }
                    self.refresh();
                    self.emit(GridEvent::RowsDeleted { indices });
                }
            }

            GridAction::ColumnAdded { index, column } => {
                if undo {
                    let shown_at = self.column_index(&column.key).and_then(|at| {
                        let shown_at = self.visible_position(at);
                        self.remove_column_at(at);
                        shown_at
                    });
                    self.refresh();
                    self.release_selection_from_column(shown_at);
                    self.emit(GridEvent::ColumnDeleted { index, key: column.key });
                } else {
                    let index = index.min(self.columns.len());
                    let key = column.key.clone();
                    self.columns.insert(index, column);
                    self.structure_rev += 1;
                    self.refresh();
                    self.emit(GridEvent::ColumnAdded { index, key });
                }
            }

            GridAction::ColumnDeleted { index, column, filter, sort, width } => {
                let key = column.key.clone();
                if undo {
                    let index = index.min(self.columns.len());
                    self.columns.insert(index, column);
                    if let Some(filter) = filter {
                        self.filters.set(filter);
                    }
                    if let Some((pos, criterion)) = sort {
                        let pos = pos.min(self.sort.len());
                        self.sort.insert(pos, criterion);
                    }
                    if let Some(width) = width {
                        self.widths.insert(key.clone(), width);
                    }
                    self.structure_rev += 1;
                    self.refresh();
                    self.emit(GridEvent::ColumnAdded { index, key });
                } else {
                    let shown_at = self.column_index(&key).and_then(|at| {
                        let shown_at = self.visible_position(at);
                        self.remove_column_at(at);
                        shown_at
                    });
                    self.refresh();
                    self.release_selection_from_column(shown_at);
                    self.emit(GridEvent::ColumnDeleted { index, key });
                }
            }

            GridAction::ColumnMoved { from, to } => {
                let (from, to) = if undo { (to, from) } else { (from, to) };
                if from < self.columns.len() && to < self.columns.len() {
                    let key = self.relocate_column(from, to);
                    self.refresh();
                    self.emit(GridEvent::ColumnMoved { key, from, to });
                }
            }
        }
    }
}

/// The change as seen when played in `direction`: undo swaps old and new.
fn oriented(change: CellChange, direction: Direction) -> CellChange {
    match direction {
        Direction::Redo => change,
        Direction::Undo => CellChange {
            old_value: change.new_value,
            new_value: change.old_value,
            ..change
        },
    }
}
