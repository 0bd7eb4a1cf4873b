//! Cell and range selection over the visual index space.
//!
//! Coordinates here are always *visual*: rows are positions after filter and
//! sort, columns are positions among the visible (non-hidden) columns. The
//! selection never looks at data; it only knows the current dimensions.
//!
//! States:
//! - empty: no active cell
//! - single: active cell, no anchor, no range
//! - range: active cell + anchor + normalized rectangle spanning both

use serde::{Deserialize, Serialize};

/// A cell coordinate in visual space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Offset by a signed delta. None if either component would go negative.
    fn offset(self, d_row: isize, d_col: isize) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add_signed(d_row)?,
            col: self.col.checked_add_signed(d_col)?,
        })
    }
}

/// A rectangular range of cells, inclusive on both ends.
///
/// Always stored normalized: `start_row <= end_row` and `start_col <= end_col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl Range {
    /// Create a new range, automatically normalizing so start <= end.
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self {
            start_row: r1.min(r2),
            start_col: c1.min(c2),
            end_row: r1.max(r2),
            end_col: c1.max(c2),
        }
    }

    /// Range spanning two corner cells in any order.
    pub fn between(a: CellPos, b: CellPos) -> Self {
        Self::new(a.row, a.col, b.row, b.col)
    }

    /// Create a single-cell range.
    pub fn single(row: usize, col: usize) -> Self {
        Self {
            start_row: row,
            start_col: col,
            end_row: row,
            end_col: col,
        }
    }

    /// Check if this range contains a cell.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row && row <= self.end_row &&
        col >= self.start_col && col <= self.end_col
    }

    pub fn start(&self) -> CellPos {
        CellPos::new(self.start_row, self.start_col)
    }

    pub fn end(&self) -> CellPos {
        CellPos::new(self.end_row, self.end_col)
    }

    pub fn row_count(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    pub fn col_count(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    /// Number of cells in this range.
    pub fn cell_count(&self) -> usize {
        self.row_count() * self.col_count()
    }

    /// Iterate over all cells in this range (row-major order).
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let start_col = self.start_col;
        let end_col = self.end_col;

        (self.start_row..=self.end_row).flat_map(move |r| {
            (start_col..=end_col).map(move |c| (r, c))
        })
    }

    /// Check if this is a single cell.
    pub fn is_single(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    /// Whether the whole range fits inside `rows x cols`.
    pub fn fits(&self, rows: usize, cols: usize) -> bool {
        self.end_row < rows && self.end_col < cols
    }
}

/// Selection state: an optional active cell plus an optional anchored range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    active: Option<CellPos>,
    anchor: Option<CellPos>,
    range: Option<Range>,
    row_count: usize,
    col_count: usize,
}

impl Selection {
    pub fn new(row_count: usize, col_count: usize) -> Self {
        Self {
            row_count,
            col_count,
            ..Self::default()
        }
    }

    pub fn active(&self) -> Option<CellPos> {
        self.active
    }

    pub fn anchor(&self) -> Option<CellPos> {
        self.anchor
    }

    /// The explicit range, if a shift-extension is in progress.
    pub fn range(&self) -> Option<Range> {
        self.range
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.row_count, self.col_count)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }

    fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.row_count && col < self.col_count
    }

    /// Update the coordinate space after filter/sort/column changes.
    ///
    /// Does not clamp: an active cell that is now out of range stays put until
    /// the caller clears it.
    pub fn set_dimensions(&mut self, row_count: usize, col_count: usize) {
        self.row_count = row_count;
        self.col_count = col_count;
    }

    /// Move the active cell, collapsing any range.
    ///
    /// Out-of-bounds requests leave everything unchanged. Returns the active
    /// cell after the call.
    pub fn set_active(&mut self, row: usize, col: usize) -> Option<CellPos> {
        if !self.in_bounds(row, col) {
            return self.active;
        }
        self.active = Some(CellPos::new(row, col));
        self.anchor = None;
        self.range = None;
        self.active
    }

    /// Move the active cell while extending a range from the anchor.
    ///
    /// The first call after a plain `set_active` pins the current active cell
    /// as anchor; later calls reuse it.
    pub fn set_active_with_range(&mut self, row: usize, col: usize) -> Option<CellPos> {
        if !self.in_bounds(row, col) {
            return self.active;
        }
        let target = CellPos::new(row, col);
        let anchor = *self.anchor.get_or_insert(self.active.unwrap_or(target));
        self.active = Some(target);
        self.range = Some(Range::between(anchor, target));
        self.active
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.anchor = None;
        self.range = None;
    }

    /// O(1) containment test against the explicit range.
    pub fn is_in_range(&self, row: usize, col: usize) -> bool {
        self.range.is_some_and(|r| r.contains(row, col))
    }

    pub fn is_active(&self, row: usize, col: usize) -> bool {
        self.active == Some(CellPos::new(row, col))
    }

    /// The range copy/cut/delete/export operate on: the explicit range, else
    /// a 1x1 range at the active cell, else None.
    pub fn effective_range(&self) -> Option<Range> {
        self.range
            .or_else(|| self.active.map(|c| Range::single(c.row, c.col)))
    }

    /// Select every cell, anchored at the top-left.
    pub fn select_all(&mut self) -> Option<CellPos> {
        if self.row_count == 0 || self.col_count == 0 {
            return self.active;
        }
        self.set_active(0, 0);
        self.set_active_with_range(self.row_count - 1, self.col_count - 1)
    }

    // -------------------------------------------------------------------------
    // Directional helpers
    // -------------------------------------------------------------------------

    /// Target for a relative step. With no active cell every step lands on (0, 0).
    fn step(&self, d_row: isize, d_col: isize) -> Option<CellPos> {
        match self.active {
            Some(pos) => pos.offset(d_row, d_col),
            None => Some(CellPos::default()),
        }
    }

    fn go(&mut self, target: Option<CellPos>, extend: bool) -> Option<CellPos> {
        match target {
            Some(t) if extend => self.set_active_with_range(t.row, t.col),
            Some(t) => self.set_active(t.row, t.col),
            None => self.active,
        }
    }

    pub fn move_up(&mut self) -> Option<CellPos> {
        self.go(self.step(-1, 0), false)
    }

    pub fn move_down(&mut self) -> Option<CellPos> {
        self.go(self.step(1, 0), false)
    }

    pub fn move_left(&mut self) -> Option<CellPos> {
        self.go(self.step(0, -1), false)
    }

    pub fn move_right(&mut self) -> Option<CellPos> {
        self.go(self.step(0, 1), false)
    }

    pub fn shift_move_up(&mut self) -> Option<CellPos> {
        self.go(self.step(-1, 0), true)
    }

    pub fn shift_move_down(&mut self) -> Option<CellPos> {
        self.go(self.step(1, 0), true)
    }

    pub fn shift_move_left(&mut self) -> Option<CellPos> {
        self.go(self.step(0, -1), true)
    }

    pub fn shift_move_right(&mut self) -> Option<CellPos> {
        self.go(self.step(0, 1), true)
    }

    /// Tab: next column, wrapping to the first column of the next row.
    pub fn move_next(&mut self) -> Option<CellPos> {
        let target = match self.active {
            None => Some(CellPos::default()),
            Some(p) if p.col + 1 < self.col_count => Some(CellPos::new(p.row, p.col + 1)),
            Some(p) => Some(CellPos::new(p.row + 1, 0)),
        };
        self.go(target, false)
    }

    /// Shift+Tab: previous column, wrapping to the last column of the previous row.
    pub fn move_prev(&mut self) -> Option<CellPos> {
        let target = match self.active {
            None => Some(CellPos::default()),
            Some(p) if p.col > 0 => Some(CellPos::new(p.row, p.col - 1)),
            Some(p) => p
                .row
                .checked_sub(1)
                .map(|row| CellPos::new(row, self.col_count.saturating_sub(1))),
        };
        self.go(target, false)
    }

    fn first_cell(&self) -> Option<CellPos> {
        Some(CellPos::default())
    }

    fn last_cell(&self) -> Option<CellPos> {
        Some(CellPos::new(
            self.row_count.checked_sub(1)?,
            self.col_count.checked_sub(1)?,
        ))
    }

    fn row_start(&self) -> Option<CellPos> {
        self.active.map(|p| CellPos::new(p.row, 0))
    }

    fn row_end(&self) -> Option<CellPos> {
        let last_col = self.col_count.checked_sub(1)?;
        self.active.map(|p| CellPos::new(p.row, last_col))
    }

    /// Ctrl+Home: first cell of the grid.
    pub fn move_to_start(&mut self) -> Option<CellPos> {
        self.go(self.first_cell(), false)
    }

    /// Ctrl+End: last cell of the grid.
    pub fn move_to_end(&mut self) -> Option<CellPos> {
        self.go(self.last_cell(), false)
    }

    pub fn move_to_row_start(&mut self) -> Option<CellPos> {
        self.go(self.row_start(), false)
    }

    pub fn move_to_row_end(&mut self) -> Option<CellPos> {
        self.go(self.row_end(), false)
    }

    pub fn shift_move_to_start(&mut self) -> Option<CellPos> {
        self.go(self.first_cell(), true)
    }

    pub fn shift_move_to_end(&mut self) -> Option<CellPos> {
        self.go(self.last_cell(), true)
    }

    pub fn shift_move_to_row_start(&mut self) -> Option<CellPos> {
        self.go(self.row_start(), true)
    }

    pub fn shift_move_to_row_end(&mut self) -> Option<CellPos> {
        self.go(self.row_end(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_normalizes() {
        let r = Range::new(5, 4, 1, 2);
        assert_eq!(r.start(), CellPos::new(1, 2));
        assert_eq!(r.end(), CellPos::new(5, 4));
        assert_eq!(r.cell_count(), 15);
        assert!(r.contains(3, 3));
        assert!(!r.contains(0, 3));
    }

    #[test]
    fn test_range_cells_row_major() {
        let cells: Vec<_> = Range::new(0, 0, 1, 1).cells().collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_set_active_out_of_bounds_is_noop() {
        let mut sel = Selection::new(3, 3);
        assert_eq!(sel.set_active(1, 1), Some(CellPos::new(1, 1)));
        assert_eq!(sel.set_active(3, 0), Some(CellPos::new(1, 1)));
        assert_eq!(sel.set_active(0, 7), Some(CellPos::new(1, 1)));
        assert_eq!(sel.active(), Some(CellPos::new(1, 1)));
    }

    #[test]
    fn test_empty_grid_rejects_everything() {
        let mut sel = Selection::new(0, 0);
        assert_eq!(sel.set_active(0, 0), None);
        assert_eq!(sel.move_down(), None);
        assert_eq!(sel.select_all(), None);
        assert!(sel.effective_range().is_none());
    }

    #[test]
    fn test_range_extension_keeps_anchor() {
        let mut sel = Selection::new(10, 10);
        sel.set_active(2, 2);
        sel.set_active_with_range(4, 5);
        assert_eq!(sel.anchor(), Some(CellPos::new(2, 2)));
        assert_eq!(sel.range(), Some(Range::new(2, 2, 4, 5)));

        // Crossing back over the anchor keeps the same anchor, range renormalizes
        sel.set_active_with_range(0, 1);
        assert_eq!(sel.anchor(), Some(CellPos::new(2, 2)));
        assert_eq!(sel.range(), Some(Range::new(0, 1, 2, 2)));
        assert!(sel.is_in_range(1, 2));
        assert!(!sel.is_in_range(3, 3));

        // Plain set_active resets the anchor
        sel.set_active(5, 5);
        assert_eq!(sel.anchor(), None);
        assert_eq!(sel.range(), None);
        sel.set_active_with_range(6, 6);
        assert_eq!(sel.anchor(), Some(CellPos::new(5, 5)));
    }

    #[test]
    fn test_range_extension_without_active_anchors_on_target() {
        let mut sel = Selection::new(4, 4);
        sel.set_active_with_range(1, 1);
        assert_eq!(sel.anchor(), Some(CellPos::new(1, 1)));
        assert_eq!(sel.range(), Some(Range::single(1, 1)));
    }

    #[test]
    fn test_effective_range() {
        let mut sel = Selection::new(5, 5);
        assert!(sel.effective_range().is_none());
        sel.set_active(3, 1);
        assert_eq!(sel.effective_range(), Some(Range::single(3, 1)));
        sel.shift_move_down();
        assert_eq!(sel.effective_range(), Some(Range::new(3, 1, 4, 1)));
        sel.clear();
        assert!(sel.effective_range().is_none());
        assert!(sel.is_empty());
    }

    #[test]
    fn test_moves_stop_at_edges() {
        let mut sel = Selection::new(2, 2);
        sel.set_active(0, 0);
        assert_eq!(sel.move_up(), Some(CellPos::new(0, 0)));
        assert_eq!(sel.move_left(), Some(CellPos::new(0, 0)));
        assert_eq!(sel.move_down(), Some(CellPos::new(1, 0)));
        assert_eq!(sel.move_down(), Some(CellPos::new(1, 0)));
        assert_eq!(sel.move_right(), Some(CellPos::new(1, 1)));
        assert_eq!(sel.move_right(), Some(CellPos::new(1, 1)));
    }

    #[test]
    fn test_move_without_active_starts_at_origin() {
        let mut sel = Selection::new(3, 3);
        assert_eq!(sel.move_down(), Some(CellPos::new(0, 0)));
        sel.clear();
        assert_eq!(sel.move_next(), Some(CellPos::new(0, 0)));
    }

    #[test]
    fn test_tab_wraps_rows() {
        let mut sel = Selection::new(2, 3);
        sel.set_active(0, 2);
        assert_eq!(sel.move_next(), Some(CellPos::new(1, 0)));
        assert_eq!(sel.move_prev(), Some(CellPos::new(0, 2)));

        // Last cell: Tab has nowhere to go
        sel.set_active(1, 2);
        assert_eq!(sel.move_next(), Some(CellPos::new(1, 2)));

        // First cell: Shift+Tab has nowhere to go
        sel.set_active(0, 0);
        assert_eq!(sel.move_prev(), Some(CellPos::new(0, 0)));
    }

    #[test]
    fn test_home_end() {
        let mut sel = Selection::new(4, 6);
        sel.set_active(2, 3);
        assert_eq!(sel.move_to_row_start(), Some(CellPos::new(2, 0)));
        assert_eq!(sel.move_to_row_end(), Some(CellPos::new(2, 5)));
        assert_eq!(sel.move_to_start(), Some(CellPos::new(0, 0)));
        assert_eq!(sel.move_to_end(), Some(CellPos::new(3, 5)));

        sel.set_active(1, 1);
        sel.shift_move_to_row_end();
        assert_eq!(sel.range(), Some(Range::new(1, 1, 1, 5)));
        sel.shift_move_to_end();
        assert_eq!(sel.range(), Some(Range::new(1, 1, 3, 5)));
    }

    #[test]
    fn test_select_all() {
        let mut sel = Selection::new(3, 2);
        sel.select_all();
        assert_eq!(sel.range(), Some(Range::new(0, 0, 2, 1)));
        assert_eq!(sel.anchor(), Some(CellPos::new(0, 0)));
    }

    #[test]
    fn test_set_dimensions_does_not_clamp() {
        let mut sel = Selection::new(10, 3);
        sel.set_active(8, 2);
        sel.set_dimensions(5, 3);
        assert_eq!(sel.active(), Some(CellPos::new(8, 2)));
        // But new moves are bounds-checked against the new shape
        assert_eq!(sel.set_active(6, 0), Some(CellPos::new(8, 2)));
    }
}
