// JSON export

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use gridkit_engine::{row_value, Column, Grid, Row, Value};
use serde_json::{Map, Number, Value as Json};

use crate::scope::{collect, ExportScope};

fn cell_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => {
            // Whole numbers serialize without a fractional part
            if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                Json::Number(Number::from(*n as i64))
            } else {
                Number::from_f64(*n).map_or(Json::Null, Json::Number)
            }
        }
        Value::Text(s) => Json::String(s.clone()),
        Value::Date(_) | Value::DateTime(_) => value.to_iso8601().map_or(Json::Null, Json::String),
    }
}

/// Array of objects, one per row, keyed by column key in column order.
/// Keys a row lacks become `null`; dates are ISO 8601 strings.
pub fn to_json_value<'a, I>(rows: I, columns: &[&Column]) -> Json
where
    I: IntoIterator<Item = &'a Row>,
{
    let objects = rows
        .into_iter()
        .map(|row| {
            let object: Map<String, Json> = columns
                .iter()
                .map(|c| (c.key.clone(), cell_to_json(row_value(row, &c.key))))
                .collect();
            Json::Object(object)
        })
        .collect();
    Json::Array(objects)
}

/// Pretty-printed [`to_json_value`].
pub fn to_json<'a, I>(rows: I, columns: &[&Column]) -> Result<String, String>
where
    I: IntoIterator<Item = &'a Row>,
{
    serde_json::to_string_pretty(&to_json_value(rows, columns)).map_err(|e| e.to_string())
}

pub fn grid_to_json(grid: &Grid, scope: ExportScope) -> Result<String, String> {
    let (rows, columns) = collect(grid, scope);
    to_json(rows, &columns)
}

pub fn export(grid: &Grid, scope: ExportScope, path: &Path) -> Result<(), String> {
    let (rows, columns) = collect(grid, scope);
    let file = File::create(path).map_err(|e| e.to_string())?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, &to_json_value(rows, &columns)).map_err(|e| e.to_string())?;
    log::debug!("exported {:?} grid to {}", scope, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gridkit_engine::row;
    use serde_json::json;

    #[test]
    fn test_objects_restricted_to_columns() {
        let cols = [Column::new("id", "ID"), Column::new("name", "Name")];
        let refs: Vec<&Column> = cols.iter().collect();
        let rows = vec![
            row([("id", Value::Number(1.0)), ("name", Value::text("Ann")), ("secret", Value::text("x"))]),
            row([("id", Value::Number(2.5))]),
        ];

        assert_eq!(
            to_json_value(&rows, &refs),
            json!([
                {"id": 1, "name": "Ann"},
                {"id": 2.5, "name": null},
            ])
        );
    }

    #[test]
    fn test_key_order_follows_columns() {
        let cols = [Column::new("z", "Z"), Column::new("a", "A")];
        let refs: Vec<&Column> = cols.iter().collect();
        let rows = vec![row([("a", 1), ("z", 2)])];
        let text = to_json(&rows, &refs).unwrap();
        assert!(text.find("\"z\"").unwrap() < text.find("\"a\"").unwrap());
    }

    #[test]
    fn test_dates_are_iso8601() {
        let cols = [Column::new("d", "D"), Column::new("t", "T")];
        let refs: Vec<&Column> = cols.iter().collect();
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let rows = vec![row([
            ("d", Value::Date(date)),
            ("t", Value::DateTime(date.and_hms_opt(8, 30, 0).unwrap())),
        ])];

        assert_eq!(
            to_json_value(&rows, &refs),
            json!([{"d": "2024-03-09", "t": "2024-03-09T08:30:00.000Z"}])
        );
    }

    #[test]
    fn test_non_finite_number_is_null() {
        let cols = [Column::new("n", "N")];
        let refs: Vec<&Column> = cols.iter().collect();
        let rows = vec![row([("n", Value::Number(f64::NAN))])];
        assert_eq!(to_json_value(&rows, &refs), json!([{"n": null}]));
    }
}
