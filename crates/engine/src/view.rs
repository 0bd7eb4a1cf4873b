//! Row view layer.
//!
//! Maps between:
//! - visual space (what the user sees: filtered, then sorted)
//! - data space (position in the row array)
//!
//! Key invariants:
//! - selection and editing only ever see visual coordinates
//! - every visual index in `[0, visible_count)` maps to exactly one data index
//! - the view is recomputed from scratch after every mutation; it is never
//!   patched in place

use crate::column::Column;
use crate::filter::{compute_filtered_indices_with, Filter, FilterError};
use crate::sort::{sort_indices, SortCriterion};
use crate::value::Row;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowView {
    /// visual row -> data row
    order: Vec<usize>,

    /// data row -> visual row (None when hidden by a filter)
    data_to_view: Vec<Option<usize>>,

    /// Rows before filtering
    total_rows: usize,
}

impl RowView {
    /// Identity mapping for N rows
    pub fn identity(row_count: usize) -> Self {
        Self::from_order((0..row_count).collect(), row_count)
    }

    /// Run the filter -> sort pipeline.
    pub fn compute<F>(
        rows: &[Row],
        filters: &[Filter],
        criteria: &[SortCriterion],
        columns: &[Column],
        on_error: F,
    ) -> Self
    where
        F: FnMut(&FilterError, &Row, &Filter),
    {
        let filtered = compute_filtered_indices_with(rows, filters, on_error);
        let order = sort_indices(rows, &filtered, criteria, columns);
        Self::from_order(order, rows.len())
    }

    fn from_order(order: Vec<usize>, total_rows: usize) -> Self {
        let mut data_to_view = vec![None; total_rows];
        for (view_row, &data_row) in order.iter().enumerate() {
            data_to_view[data_row] = Some(view_row);
        }
        Self { order, data_to_view, total_rows }
    }

    /// Number of visible rows
    pub fn visible_count(&self) -> usize {
        self.order.len()
    }

    /// Number of rows before filtering
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Map visual row to data row - O(1)
    pub fn data_index_of(&self, visual_row: usize) -> Option<usize> {
        self.order.get(visual_row).copied()
    }

    /// Map data row to visual row - O(1). None if filtered out.
    pub fn visual_index_of(&self, data_row: usize) -> Option<usize> {
        self.data_to_view.get(data_row).copied().flatten()
    }

    pub fn is_filtered(&self) -> bool {
        self.visible_count() < self.total_rows
    }

    /// Is the visible order anything other than ascending data order?
    pub fn is_sorted(&self) -> bool {
        self.order.windows(2).any(|w| w[0] > w[1])
    }

    /// visual -> data mapping, for renderers iterating a window
    pub fn order(&self) -> &[usize] {
        &self.order
    }
}
