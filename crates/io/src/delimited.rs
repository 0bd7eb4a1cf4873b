// Delimited text export (CSV/TSV)

use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use gridkit_engine::{row_value, Column, Grid, Row};

use crate::scope::{collect, ExportScope};

/// Render a header line of column headers followed by one line per row.
///
/// Fields containing the delimiter, a quote or a line break are quoted with
/// embedded quotes doubled (RFC 4180). Missing values are empty fields, so a
/// one-column row with no value is an empty line. Every line ends with `\n`.
/// No columns means no output.
pub fn to_delimited<'a, I>(rows: I, columns: &[&Column], delimiter: u8) -> Result<String, String>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut builder = WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'));

    match columns {
        [] => Ok(String::new()),
        [column] => single_column(rows, column, &builder),
        _ => {
            let mut writer = builder.from_writer(Vec::new());
            writer
                .write_record(columns.iter().map(|c| c.header.as_str()))
                .map_err(|e| e.to_string())?;

            for row in rows {
                let record: Vec<String> = columns
                    .iter()
                    .map(|c| row_value(row, &c.key).to_string())
                    .collect();
                writer.write_record(&record).map_err(|e| e.to_string())?;
            }

            let bytes = writer.into_inner().map_err(|e| e.to_string())?;
            String::from_utf8(bytes).map_err(|e| e.to_string())
        }
    }
}

/// csv writes a lone empty field as `""`; here it stays an empty line.
fn single_column<'a, I>(rows: I, column: &Column, builder: &WriterBuilder) -> Result<String, String>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut out = String::new();
    push_line(&mut out, &column.header, builder)?;
    for row in rows {
        push_line(&mut out, &row_value(row, &column.key).to_string(), builder)?;
    }
    Ok(out)
}

fn push_line(out: &mut String, field: &str, builder: &WriterBuilder) -> Result<(), String> {
    if field.is_empty() {
        out.push('\n');
        return Ok(());
    }
    let mut writer = builder.from_writer(Vec::new());
    writer.write_record([field]).map_err(|e| e.to_string())?;
    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    out.push_str(&String::from_utf8(bytes).map_err(|e| e.to_string())?);
    Ok(())
}

/// Delimited text for part of a grid.
pub fn grid_to_delimited(grid: &Grid, scope: ExportScope, delimiter: u8) -> Result<String, String> {
    let (rows, columns) = collect(grid, scope);
    to_delimited(rows, &columns, delimiter)
}

pub fn export(grid: &Grid, scope: ExportScope, path: &Path) -> Result<(), String> {
    export_with_delimiter(grid, scope, path, b',')
}

pub fn export_tsv(grid: &Grid, scope: ExportScope, path: &Path) -> Result<(), String> {
    export_with_delimiter(grid, scope, path, b'\t')
}

pub fn export_with_delimiter(grid: &Grid, scope: ExportScope, path: &Path, delimiter: u8) -> Result<(), String> {
    let text = grid_to_delimited(grid, scope, delimiter)?;
    std::fs::write(path, text).map_err(|e| e.to_string())?;
    log::debug!("exported {:?} grid to {}", scope, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridkit_engine::{row, Value};

    fn columns() -> Vec<Column> {
        vec![Column::new("name", "Name"), Column::new("note", "Note")]
    }

    fn render(rows: &[Row], delimiter: u8) -> String {
        let cols = columns();
        let refs: Vec<&Column> = cols.iter().collect();
        to_delimited(rows, &refs, delimiter).unwrap()
    }

    #[test]
    fn test_header_and_rows() {
        let rows = vec![row([("name", "Ann"), ("note", "ok")]), row([("name", "Bob")])];
        assert_eq!(render(&rows, b','), "Name,Note\nAnn,ok\nBob,\n");
    }

    #[test]
    fn test_quotes_only_when_needed() {
        let rows = vec![row([
            ("name", Value::text("Doe, Jane")),
            ("note", Value::text("said \"hi\"\nthen left")),
        ])];
        assert_eq!(
            render(&rows, b','),
            "Name,Note\n\"Doe, Jane\",\"said \"\"hi\"\"\nthen left\"\n"
        );

        // A comma is plain text once the delimiter is a tab
        let rows = vec![row([("name", "Doe, Jane"), ("note", "a\tb")])];
        assert_eq!(render(&rows, b'\t'), "Name\tNote\nDoe, Jane\t\"a\tb\"\n");
    }

    #[test]
    fn test_value_formatting() {
        let cols = [Column::new("n", "N"), Column::new("b", "B")];
        let refs: Vec<&Column> = cols.iter().collect();
        let rows = vec![row([("n", Value::Number(3.0)), ("b", Value::Bool(true))])];
        assert_eq!(to_delimited(&rows, &refs, b',').unwrap(), "N,B\n3,true\n");
    }

    #[test]
    fn test_single_column_missing_value_is_empty_line() {
        let cols = [Column::new("n", "N")];
        let refs: Vec<&Column> = cols.iter().collect();
        let rows = vec![
            row([("n", "a")]),
            row([("other", "x")]),
            row([("n", "b,c")]),
            row([("n", Value::text(""))]),
        ];
        assert_eq!(to_delimited(&rows, &refs, b',').unwrap(), "N\na\n\n\"b,c\"\n\n");
    }

    #[test]
    fn test_no_columns_no_output() {
        let rows = vec![row([("name", "Ann")])];
        assert_eq!(to_delimited(&rows, &[], b',').unwrap(), "");
    }
}
