//! Grid controller.
//!
//! Owns the rows and the column schema and composes selection, editing, the
//! filter/sort view, undo history and the clipboard codec. All mutation goes
//! through this type, so the derived view is always recomputed before anything
//! reads visual coordinates.
//!
//! The `impl Grid` is split by concern:
//! - `mod.rs`: construction, queries, view refresh, selection, events
//! - `structure.rs`: rows, columns, cell writes
//! - `sort_filter.rs`: filters and sort criteria
//! - `editing.rs`: edit lifecycle and the filter menu
//! - `clipboard.rs`: two-phase copy/cut/paste, range clearing
//! - `undo_redo.rs`: history dispatch
//! - `keys.rs`: input event interpretation

mod clipboard;
mod editing;
mod keys;
mod sort_filter;
mod structure;
mod undo_redo;

pub use structure::CellUpdate;

use gridkit_config::{GridSettings, SortMode};
use gridkit_core::{visible_window, CellPos, EditingState, Range, RowWindow, Selection, ViewportMetrics};
use rustc_hash::FxHashMap;

use crate::action::GridAction;
use crate::column::{position_of, Column};
use crate::events::{EventCallback, EventQueue, GridEvent};
use crate::filter::{Filter, FilterError, FilterSet};
use crate::history::UndoStack;
use crate::input::InteractionMode;
use crate::sort::SortCriterion;
use crate::value::{row_value, Row, Value};
use crate::view::RowView;

/// Runtime options. Usually built from [`GridSettings`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridOptions {
    pub row_height: f64,
    pub header_height: f64,
    pub overscan: usize,
    /// Global editable flag, ANDed with each column's flag.
    pub editable: bool,
    /// Row ceiling for paste expansion and `add_row`.
    pub max_rows: Option<usize>,
    pub max_undo: usize,
    pub sort_mode: SortMode,
}

impl From<&GridSettings> for GridOptions {
    fn from(s: &GridSettings) -> Self {
        Self {
            row_height: s.row_height,
            header_height: s.header_height,
            overscan: s.overscan,
            editable: s.editable,
            max_rows: s.max_rows,
            max_undo: s.max_undo,
            sort_mode: s.sort_mode,
        }
    }
}

impl Default for GridOptions {
    fn default() -> Self {
        Self::from(&GridSettings::default())
    }
}

type FilterErrorHandler = Box<dyn FnMut(&FilterError, &Row, &Filter)>;

pub struct Grid {
    rows: Vec<Row>,
    columns: Vec<Column>,
    options: GridOptions,

    filters: FilterSet,
    sort: Vec<SortCriterion>,
    view: RowView,
    /// visual column -> index into `columns`
    visible_columns: Vec<usize>,
    /// Widths set through `resize_column`, by key.
    widths: FxHashMap<String, f64>,

    selection: Selection,
    editing: EditingState<Value>,
    filter_menu: Option<String>,

    history: UndoStack<GridAction>,
    /// Bumped by every row/column add, delete, move or visibility change.
    /// Clipboard tickets taken under an older revision are stale.
    structure_rev: u64,

    events: EventQueue,
    /// Queue events for `take_events`. Off once a listener is attached.
    collect_events: bool,
    listeners: Vec<EventCallback>,
    on_filter_error: Option<FilterErrorHandler>,
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("rows", &self.rows.len())
            .field("columns", &self.columns)
            .field("filters", &self.filters.keys())
            .field("sort", &self.sort)
            .field("visible_rows", &self.view.visible_count())
            .field("selection", &self.selection)
            .field("structure_rev", &self.structure_rev)
            .finish_non_exhaustive()
    }
}

impl Grid {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self::with_options(columns, rows, GridOptions::default())
    }

    pub fn with_settings(columns: Vec<Column>, rows: Vec<Row>, settings: &GridSettings) -> Self {
        Self::with_options(columns, rows, GridOptions::from(settings))
    }

    pub fn with_options(columns: Vec<Column>, rows: Vec<Row>, options: GridOptions) -> Self {
        let mut grid = Self {
            rows,
            columns,
            history: UndoStack::new(options.max_undo),
            options,
            filters: FilterSet::new(),
            sort: Vec::new(),
            view: RowView::default(),
            visible_columns: Vec::new(),
            widths: FxHashMap::default(),
            selection: Selection::default(),
            editing: EditingState::new(),
            filter_menu: None,
            structure_rev: 0,
            events: EventQueue::new(),
            collect_events: true,
            listeners: Vec::new(),
            on_filter_error: None,
        };
        grid.refresh();
        grid
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Non-hidden columns in declared order. Selection column indices
    /// address this list.
    pub fn visible_columns(&self) -> Vec<&Column> {
        self.visible_columns.iter().map(|&i| &self.columns[i]).collect()
    }

    pub fn visible_column(&self, col: usize) -> Option<&Column> {
        self.visible_columns.get(col).map(|&i| &self.columns[i])
    }

    pub fn visible_column_count(&self) -> usize {
        self.visible_columns.len()
    }

    /// Current width for `key`: the resized width if any, else the declared one.
    pub fn column_width(&self, key: &str) -> Option<f64> {
        self.widths
            .get(key)
            .copied()
            .or_else(|| self.column(key).map(|c| c.width))
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn view(&self) -> &RowView {
        &self.view
    }

    /// Rows left after filtering.
    pub fn filtered_row_count(&self) -> usize {
        self.view.visible_count()
    }

    pub fn total_row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn data_index_of(&self, visual_row: usize) -> Option<usize> {
        self.view.data_index_of(visual_row)
    }

    pub fn visual_index_of(&self, data_row: usize) -> Option<usize> {
        self.view.visual_index_of(data_row)
    }

    /// Row at a visual position.
    pub fn row_at(&self, visual_row: usize) -> Option<&Row> {
        self.data_index_of(visual_row).map(|d| &self.rows[d])
    }

    /// Value at a visual cell.
    pub fn value_at(&self, row: usize, col: usize) -> Option<&Value> {
        let key = &self.visible_column(col)?.key;
        Some(row_value(self.row_at(row)?, key))
    }

    /// Rows in visual order.
    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.view.order().iter().map(move |&d| &self.rows[d])
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn editing(&self) -> &EditingState<Value> {
        &self.editing
    }

    pub fn mode(&self) -> InteractionMode<'_> {
        if let Some(session) = self.editing.session() {
            InteractionMode::Editing(session)
        } else if let Some(key) = &self.filter_menu {
            InteractionMode::FilterMenuOpen(key)
        } else {
            InteractionMode::Idle
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &UndoStack<GridAction> {
        &self.history
    }

    pub fn structure_rev(&self) -> u64 {
        self.structure_rev
    }

    /// Window of visual rows to render for a scroll position.
    pub fn visible_window(&self, scroll_top: f64, viewport_height: f64) -> RowWindow {
        visible_window(&ViewportMetrics {
            scroll_top,
            header_height: self.options.header_height,
            row_height: self.options.row_height,
            viewport_height,
            overscan: self.options.overscan,
            total_rows: self.view.visible_count(),
        })
    }

    // =========================================================================
    // Options
    // =========================================================================

    pub fn set_editable(&mut self, editable: bool) {
        self.options.editable = editable;
        if !editable {
            self.cancel_edit();
        }
    }

    pub fn set_max_rows(&mut self, max_rows: Option<usize>) {
        self.options.max_rows = max_rows;
    }

    /// Change the history bound (minimum 1), trimming the oldest entries.
    pub fn set_max_undo(&mut self, max_undo: usize) {
        let before = self.history_state();
        self.history.set_max_size(max_undo);
        self.options.max_undo = self.history.max_size();
        self.notify_history(before);
    }

    pub(crate) fn is_column_editable(&self, column: &Column) -> bool {
        self.options.editable && column.editable
    }

    // =========================================================================
    // View refresh
    // =========================================================================

    /// Recompute visible columns and the filter -> sort view, then resync the
    /// selection dimensions. Clears the selection if it no longer fits.
    pub(crate) fn refresh(&mut self) {
        self.visible_columns = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.hidden)
            .map(|(i, _)| i)
            .collect();

        let on_error = &mut self.on_filter_error;
        self.view = RowView::compute(&self.rows, self.filters.as_slice(), &self.sort, &self.columns, |e, row, f| {
            if let Some(handler) = on_error.as_mut() {
                handler(e, row, f);
            }
        });

        let (rows, cols) = (self.view.visible_count(), self.visible_columns.len());
        self.selection.set_dimensions(rows, cols);

        let fits = |p: Option<CellPos>| p.map_or(true, |p| p.row < rows && p.col < cols);
        if !fits(self.selection.active()) || !fits(self.selection.anchor()) {
            log::debug!("selection out of bounds after refresh ({}x{}), clearing", rows, cols);
            self.selection.clear();
            self.emit_selection();
        }
    }

    /// Called for every filter predicate failure during a refresh.
    pub fn set_filter_error_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&FilterError, &Row, &Filter) + 'static,
    {
        self.on_filter_error = Some(Box::new(handler));
    }

    pub(crate) fn column_index(&self, key: &str) -> Option<usize> {
        position_of(&self.columns, key)
    }

    /// Visible column keys, in visual order.
    pub(crate) fn visible_column_keys(&self) -> Vec<String> {
        self.visible_columns.iter().map(|&i| self.columns[i].key.clone()).collect()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn select_cell(&mut self, row: usize, col: usize) -> Option<CellPos> {
        self.update_selection(|s| s.set_active(row, col))
    }

    /// Extend the selection from its anchor to `(row, col)`.
    pub fn extend_selection(&mut self, row: usize, col: usize) -> Option<CellPos> {
        self.update_selection(|s| s.set_active_with_range(row, col))
    }

    pub fn select_range(&mut self, range: Range) -> Option<CellPos> {
        self.update_selection(|s| {
            s.set_active(range.start_row, range.start_col);
            s.set_active_with_range(range.end_row, range.end_col)
        })
    }

    pub fn select_all(&mut self) -> Option<CellPos> {
        self.update_selection(Selection::select_all)
    }

    pub fn clear_selection(&mut self) {
        self.update_selection(|s| {
            s.clear();
            None
        });
    }

    /// Run a selection transition, emitting `SelectionChanged` if it changed
    /// anything.
    pub(crate) fn update_selection<F>(&mut self, f: F) -> Option<CellPos>
    where
        F: FnOnce(&mut Selection) -> Option<CellPos>,
    {
        let before = (self.selection.active(), self.selection.range());
        let active = f(&mut self.selection);
        if (self.selection.active(), self.selection.range()) != before {
            self.emit_selection();
        }
        active
    }

    /// Visual position of the column at declared `index`, if it is shown.
    pub(crate) fn visible_position(&self, index: usize) -> Option<usize> {
        self.visible_columns.iter().position(|&i| i == index)
    }

    /// Clear the selection if it covers visual column `col` or anything to its
    /// right. Call after the column left the visible set: those coordinates
    /// now name other columns.
    pub(crate) fn release_selection_from_column(&mut self, col: Option<usize>) {
        let Some(col) = col else {
            return;
        };
        let rightmost = [
            self.selection.active().map(|p| p.col),
            self.selection.anchor().map(|p| p.col),
            self.selection.range().map(|r| r.end_col),
        ]
        .into_iter()
        .flatten()
        .max();
        if rightmost.is_some_and(|c| c >= col) {
            log::debug!("visible column {} removed under the selection, clearing", col);
            self.clear_selection();
        }
    }

    fn emit_selection(&mut self) {
        self.emit(GridEvent::SelectionChanged {
            active: self.selection.active(),
            range: self.selection.range(),
        });
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Attach a listener. Events stop being queued from here on unless
    /// `set_collect_events(true)` turns the queue back on.
    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&GridEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
        self.collect_events = false;
    }

    pub fn set_collect_events(&mut self, collect: bool) {
        self.collect_events = collect;
        if !collect {
            self.events.clear();
        }
    }

    /// Drain events queued since the last call.
    pub fn take_events(&mut self) -> Vec<GridEvent> {
        self.events.take()
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub(crate) fn emit(&mut self, event: GridEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
        if self.collect_events {
            self.events.push(event);
        }
    }

    // =========================================================================
    // History bookkeeping
    // =========================================================================

    fn history_state(&self) -> (bool, bool) {
        (self.history.can_undo(), self.history.can_redo())
    }

    fn notify_history(&mut self, before: (bool, bool)) {
        let (can_undo, can_redo) = self.history_state();
        if (can_undo, can_redo) != before {
            self.emit(GridEvent::HistoryChanged { can_undo, can_redo });
        }
    }

    /// Push one undo entry for a completed operation.
    pub(crate) fn record(&mut self, label: &str, action: GridAction) {
        let before = self.history_state();
        self.history.push(label, action);
        self.notify_history(before);
    }

    pub fn clear_history(&mut self) {
        let before = self.history_state();
        self.history.clear();
        self.notify_history(before);
    }
}
