//! Single-slot edit state.
//!
//! At most one cell is mid-edit across the whole grid. The slot does not
//! enforce commit-before-start ordering; the grid controller does.

use crate::selection::CellPos;

/// The in-flight edit: where it is and what the cell held before.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession<V> {
    pub position: CellPos,
    pub original_value: V,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditingState<V> {
    slot: Option<EditSession<V>>,
}

impl<V> Default for EditingState<V> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<V> EditingState<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an edit, overwriting whatever was in the slot.
    pub fn start(&mut self, position: CellPos, original_value: V) {
        self.slot = Some(EditSession { position, original_value });
    }

    /// Close the edit for the caller to apply.
    pub fn commit(&mut self) -> Option<EditSession<V>> {
        self.slot.take()
    }

    /// Close the edit for the caller to discard.
    pub fn cancel(&mut self) -> Option<EditSession<V>> {
        self.slot.take()
    }

    pub fn session(&self) -> Option<&EditSession<V>> {
        self.slot.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.slot.is_some()
    }

    pub fn is_editing(&self, row: usize, col: usize) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|s| s.position == CellPos::new(row, col))
    }
}
