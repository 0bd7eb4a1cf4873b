//! Bounded undo/redo history.
//!
//! Linear history: pushing a new entry discards everything on the redo side.
//! The stack stores plain data (`A`); interpreting an entry is the caller's job.

use std::collections::VecDeque;

pub const DEFAULT_MAX_SIZE: usize = 100;

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry<A> {
    pub label: String,
    pub action: A,
}

#[derive(Clone, Debug)]
pub struct UndoStack<A> {
    undo_stack: VecDeque<HistoryEntry<A>>,
    redo_stack: Vec<HistoryEntry<A>>,
    max_size: usize,
}

impl<A: Clone> Default for UndoStack<A> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

impl<A: Clone> UndoStack<A> {
    /// Create a stack holding at most `max_size` entries (minimum 1).
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Record one logical operation.
    pub fn push(&mut self, label: impl Into<String>, action: A) {
        self.undo_stack.push_back(HistoryEntry { label: label.into(), action });
        self.trim();
        self.redo_stack.clear();
    }

    /// Pop the last entry for undo. The entry moves to the redo side.
    pub fn undo(&mut self) -> Option<HistoryEntry<A>> {
        let entry = self.undo_stack.pop_back()?;
        self.redo_stack.push(entry.clone());
        Some(entry)
    }

    /// Pop from the redo side. The entry moves back onto the undo side.
    pub fn redo(&mut self) -> Option<HistoryEntry<A>> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push_back(entry.clone());
        self.trim();
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the entry `undo` would return.
    pub fn peek_undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(|e| e.label.as_str())
    }

    pub fn peek_redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.label.as_str())
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Change the bound (minimum 1), dropping the oldest entries if shrunk.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        self.trim();
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn trim(&mut self) {
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_moves_entries() {
        let mut h = UndoStack::new(10);
        assert!(!h.can_undo());
        assert!(h.undo().is_none());

        h.push("a", 1);
        h.push("b", 2);
        assert_eq!(h.peek_undo_label(), Some("b"));

        let e = h.undo().unwrap();
        assert_eq!((e.label.as_str(), e.action), ("b", 2));
        assert!(h.can_redo());

        let e = h.redo().unwrap();
        assert_eq!(e.action, 2);
        assert!(!h.can_redo());
        assert_eq!(h.undo_len(), 2);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut h = UndoStack::new(10);
        h.push("a", 1);
        h.push("b", 2);
        h.undo();
        assert!(h.can_redo());

        h.push("c", 3);
        assert!(!h.can_redo());
        assert_eq!(h.undo().unwrap().label, "c");
        assert_eq!(h.undo().unwrap().label, "a");
    }

    #[test]
    fn test_trims_oldest() {
        let mut h = UndoStack::new(3);
        for i in 0..5 {
            h.push(format!("e{}", i), i);
        }
        assert_eq!(h.undo_len(), 3);

        let labels: Vec<_> = std::iter::from_fn(|| h.undo().map(|e| e.label)).collect();
        assert_eq!(labels, vec!["e4", "e3", "e2"]);
    }

    #[test]
    fn test_set_max_size_clamps_and_trims() {
        let mut h = UndoStack::new(10);
        for i in 0..4 {
            h.push("x", i);
        }
        h.set_max_size(0);
        assert_eq!(h.max_size(), 1);
        assert_eq!(h.undo_len(), 1);
        assert_eq!(h.undo().unwrap().action, 3);
    }

    #[test]
    fn test_clear() {
        let mut h = UndoStack::new(5);
        h.push("a", ());
        h.push("b", ());
        h.undo();
        h.clear();
        assert!(!h.can_undo());
        assert!(!h.can_redo());
    }
}
