//! Filter and sort state.
//!
//! Neither is recorded in undo history. Both cancel an in-flight edit, since
//! the edited cell's visual position may move.

use gridkit_config::SortMode;

use crate::events::GridEvent;
use crate::filter::Filter;
use crate::grid::Grid;
use crate::sort::{toggle_sort, SortCriterion};

impl Grid {
    // =========================================================================
    // Filters
    // =========================================================================

    pub fn filters(&self) -> Vec<&Filter> {
        self.filters.as_slice().iter().collect()
    }

    pub fn has_filter(&self, key: &str) -> bool {
        self.filters.contains(key)
    }

    /// Set a filter, replacing any existing filter on the same key.
    pub fn set_filter(&mut self, filter: Filter) {
        self.cancel_edit();
        self.filters.set(filter);
        self.filters_changed();
    }

    pub fn remove_filter(&mut self, key: &str) -> bool {
        if self.filters.remove(key).is_none() {
            return false;
        }
        self.cancel_edit();
        self.filters_changed();
        true
    }

    pub fn clear_filters(&mut self) {
        if self.filters.is_empty() {
            return;
        }
        self.cancel_edit();
        self.filters.clear();
        self.filters_changed();
    }

    fn filters_changed(&mut self) {
        self.refresh();
        log::debug!(
            "filters {:?}: {} of {} rows visible",
            self.filters.keys(),
            self.view.visible_count(),
            self.rows.len()
        );
        self.emit(GridEvent::FilterChanged {
            keys: self.filters.keys(),
            filtered_row_count: self.view.visible_count(),
        });
    }

    // =========================================================================
    // Sort
    // =========================================================================

    pub fn sort_criteria(&self) -> &[SortCriterion] {
        &self.sort
    }

    /// Header-click sort cycle for `key`. `additive` (shift-click) keeps the
    /// other criteria; it is ignored in single-sort mode. Unknown and
    /// unsortable columns are ignored.
    pub fn toggle_sort(&mut self, key: &str, additive: bool) -> bool {
        if !self.column(key).is_some_and(|c| c.sortable) {
            return false;
        }
        let additive = additive && self.options.sort_mode == SortMode::Multi;
        let next = toggle_sort(&self.sort, key, additive);
        self.apply_sort(next);
        true
    }

    /// Replace the sort criteria. Criteria for unknown keys are dropped.
    pub fn set_sort(&mut self, criteria: Vec<SortCriterion>) {
        let criteria = criteria
            .into_iter()
            .filter(|c| self.column(&c.key).is_some())
            .collect();
        self.apply_sort(criteria);
    }

    pub fn clear_sort(&mut self) {
        if !self.sort.is_empty() {
            self.apply_sort(Vec::new());
        }
    }

    fn apply_sort(&mut self, criteria: Vec<SortCriterion>) {
        self.cancel_edit();
        self.sort = criteria;
        self.refresh();
        self.emit(GridEvent::SortChanged { criteria: self.sort.clone() });
    }
}
