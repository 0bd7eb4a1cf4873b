//! Core grid types: selection over visual coordinates, the single edit slot,
//! and virtual-scroll windowing. Nothing here knows about cell values.

pub mod editing;
pub mod selection;
pub mod viewport;

pub use editing::{EditSession, EditingState};
pub use selection::{CellPos, Range, Selection};
pub use viewport::{visible_window, RowWindow, ViewportMetrics};
