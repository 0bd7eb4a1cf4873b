// Export of grid contents to delimited text and JSON

pub mod delimited;
pub mod json;
mod scope;

use std::path::Path;

use gridkit_engine::Grid;

pub use delimited::{grid_to_delimited, to_delimited};
pub use json::{grid_to_json, to_json, to_json_value};
pub use scope::{ExportFormat, ExportScope};

/// Write `scope` of `grid` to `path`, choosing the format from the extension.
pub fn export(grid: &Grid, scope: ExportScope, path: &Path) -> Result<ExportFormat, String> {
    let format = ExportFormat::from_path(path)
        .ok_or_else(|| format!("unsupported export format: {}", path.display()))?;
    match format.delimiter() {
        Some(delimiter) => delimited::export_with_delimiter(grid, scope, path, delimiter)?,
        None => json::export(grid, scope, path)?,
    }
    Ok(format)
}
