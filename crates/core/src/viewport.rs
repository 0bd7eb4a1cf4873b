//! Virtual-scroll windowing.
//!
//! Converts a scroll offset into the contiguous interval of visual rows the
//! renderer should materialize. The window covers the physical viewport plus
//! `overscan` rows on each side and is bounded by the post filter/sort row
//! count, so render cost stays flat no matter how many rows exist.

use serde::{Deserialize, Serialize};

/// Inputs to the window computation, all in pixels except the counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportMetrics {
    /// Scroll offset of the scroll container, header included.
    pub scroll_top: f64,
    /// Height of the sticky header that sits above row 0.
    pub header_height: f64,
    pub row_height: f64,
    pub viewport_height: f64,
    pub overscan: usize,
    /// Visible row count after filtering.
    pub total_rows: usize,
}

/// Half-open interval `[start, end)` of visual rows to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowWindow {
    pub start: usize,
    pub end: usize,
}

impl RowWindow {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, row: usize) -> bool {
        row >= self.start && row < self.end
    }

    pub fn rows(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// Pixel offset of the first rendered row, relative to the body top.
    pub fn offset_top(&self, row_height: f64) -> f64 {
        self.start as f64 * row_height
    }
}

/// Compute the render window.
///
/// `start = max(0, floor(adj / rh) - overscan)` and
/// `end = min(total, floor(adj / rh) + ceil(vh / rh) + overscan)` where
/// `adj` is the scroll offset minus the header height, clamped at zero.
/// A non-positive row height yields an empty window.
pub fn visible_window(m: &ViewportMetrics) -> RowWindow {
    if !(m.row_height > 0.0) || !m.row_height.is_finite() {
        return RowWindow::default();
    }

    let adjusted = (m.scroll_top - m.header_height).max(0.0);
    let first = (adjusted / m.row_height).floor() as usize;
    let in_view = (m.viewport_height.max(0.0) / m.row_height).ceil() as usize;

    let end = first
        .saturating_add(in_view)
        .saturating_add(m.overscan)
        .min(m.total_rows);
    let start = first.saturating_sub(m.overscan).min(end);

    RowWindow { start, end }
}

/// Total scrollable body height for `total_rows` rows.
pub fn content_height(total_rows: usize, row_height: f64) -> f64 {
    total_rows as f64 * row_height
}
