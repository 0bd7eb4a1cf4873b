pub mod action;
pub mod clipboard;
pub mod column;
pub mod events;
pub mod filter;
pub mod grid;
pub mod history;
pub mod input;
pub mod sort;
pub mod value;
pub mod view;

pub use action::{CellChange, Direction, GridAction};
pub use clipboard::{ClipboardError, ClipboardOp, ClipboardProvider, ClipboardTicket, MemoryClipboard};
pub use column::{Column, ColumnType, PinSide};
pub use events::{EventQueue, GridEvent};
pub use filter::{Filter, FilterError, FilterSet, TextFilter, TextMatch};
pub use grid::{CellUpdate, Grid, GridOptions};
pub use history::{HistoryEntry, UndoStack};
pub use input::{InputEvent, InputOutcome, InteractionMode, Key, Modifiers};
pub use sort::{SortCriterion, SortDirection};
pub use value::{row, row_value, Row, Value};
pub use view::RowView;

pub use gridkit_core::{CellPos, Range, RowWindow, Selection};
