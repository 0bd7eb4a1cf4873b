// Which part of a grid an export covers

use std::path::Path;

use gridkit_engine::{Column, Grid, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportScope {
    /// Every row that passes the filters, in display order, over visible columns.
    #[default]
    Visible,
    /// The effective selection rectangle. Empty when nothing is selected.
    Selection,
}

/// Output format, usually picked from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(ExportFormat::Csv),
            "tsv" | "tab" => Some(ExportFormat::Tsv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }

    pub fn delimiter(self) -> Option<u8> {
        match self {
            ExportFormat::Csv => Some(b','),
            ExportFormat::Tsv => Some(b'\t'),
            ExportFormat::Json => None,
        }
    }
}

/// Rows and columns of `grid` covered by `scope`.
pub(crate) fn collect(grid: &Grid, scope: ExportScope) -> (Vec<&Row>, Vec<&Column>) {
    match scope {
        ExportScope::Visible => (grid.visible_rows().collect(), grid.visible_columns()),
        ExportScope::Selection => {
            let Some(range) = grid.selection().effective_range() else {
                return (Vec::new(), Vec::new());
            };
            let rows = (range.start_row..=range.end_row)
                .filter_map(|r| grid.row_at(r))
                .collect();
            let columns = (range.start_col..=range.end_col)
                .filter_map(|c| grid.visible_column(c))
                .collect();
            (rows, columns)
        }
    }
}
