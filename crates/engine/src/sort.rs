//! Multi-key stable sort - second stage of the index pipeline.
//!
//! Sorting runs over the already-filtered subset and maps the resulting
//! permutation back through the filtered indices, so the output is always
//! `visual index -> data index`.
//!
//! Comparison rules per criterion:
//! - nulls sort last regardless of direction
//! - number: numeric order
//! - boolean: false < true (truthiness)
//! - date/datetime: epoch millis
//! - values a number/date column can't read sort after the readable ones and
//!   before nulls, in either direction, and tie among themselves
//! - text and unknown types: case-folded order, raw text as tie-breaker
//!
//! Ties fall through to the next criterion; full ties keep original order.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::column::{Column, ColumnType};
use crate::value::{row_value, Row, Value};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// One sort key. The first criterion in a list is primary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortCriterion {
    pub key: String,
    pub direction: SortDirection,
}

impl SortCriterion {
    pub fn asc(key: impl Into<String>) -> Self {
        Self { key: key.into(), direction: SortDirection::Ascending }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self { key: key.into(), direction: SortDirection::Descending }
    }
}

/// Next criteria list after a header click on `key`.
///
/// Replace mode cycles none -> asc -> desc -> none and drops other keys.
/// Additive mode appends `key` ascending, flips it to descending, then
/// removes it, leaving the other criteria in place.
pub fn toggle_sort(criteria: &[SortCriterion], key: &str, additive: bool) -> Vec<SortCriterion> {
    let existing = criteria.iter().position(|c| c.key == key);

    if !additive {
        return match existing.map(|i| criteria[i].direction) {
            None => vec![SortCriterion::asc(key)],
            Some(SortDirection::Ascending) => vec![SortCriterion::desc(key)],
            Some(SortDirection::Descending) => Vec::new(),
        };
    }

    let mut next = criteria.to_vec();
    match existing {
        None => next.push(SortCriterion::asc(key)),
        Some(i) if next[i].direction == SortDirection::Ascending => {
            next[i].direction = SortDirection::Descending;
        }
        Some(i) => {
            next.remove(i);
        }
    }
    next
}

/// Precomputed comparison key for one cell (decorate step).
#[derive(Debug, Clone)]
enum SortKey {
    Null,
    Number(Option<OrderedFloat<f64>>),
    Bool(bool),
    Millis(Option<i64>),
    Text { folded: String, raw: String },
}

impl SortKey {
    fn from_value(value: &Value, column_type: ColumnType) -> Self {
        if value.is_null() {
            return SortKey::Null;
        }
        match column_type {
            ColumnType::Number => SortKey::Number(value.as_f64().map(OrderedFloat)),
            ColumnType::Boolean => SortKey::Bool(value.truthy()),
            ColumnType::Date | ColumnType::DateTime => SortKey::Millis(value.epoch_millis()),
            ColumnType::Text => {
                let raw = value.to_string();
                SortKey::Text { folded: raw.to_lowercase(), raw }
            }
        }
    }

    /// 0 for comparable values, 1 for unreadable numbers/dates, 2 for nulls.
    fn rank(&self) -> u8 {
        match self {
            SortKey::Null => 2,
            SortKey::Number(None) | SortKey::Millis(None) => 1,
            _ => 0,
        }
    }

    /// Ascending comparison of two comparable keys of the same column.
    fn cmp_present(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(Some(a)), SortKey::Number(Some(b))) => a.cmp(b),
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Millis(Some(a)), SortKey::Millis(Some(b))) => a.cmp(b),
            (
                SortKey::Text { folded: fa, raw: ra },
                SortKey::Text { folded: fb, raw: rb },
            ) => fa.cmp(fb).then_with(|| ra.cmp(rb)),
            _ => Ordering::Equal,
        }
    }
}

/// Compare two values under one criterion. Nulls go last in both directions,
/// unreadable numbers/dates just before them.
pub fn compare_values(a: &Value, b: &Value, column_type: ColumnType, direction: SortDirection) -> Ordering {
    compare_keys(
        &SortKey::from_value(a, column_type),
        &SortKey::from_value(b, column_type),
        direction,
    )
}

fn compare_keys(a: &SortKey, b: &SortKey, direction: SortDirection) -> Ordering {
    match (a.rank(), b.rank()) {
        (0, 0) => {
            let ord = a.cmp_present(b);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        }
        (ra, rb) => ra.cmp(&rb),
    }
}

fn column_type_of(columns: &[Column], key: &str) -> ColumnType {
    columns
        .iter()
        .find(|c| c.key == key)
        .map_or(ColumnType::Text, |c| c.column_type)
}

/// Sort a subset of data indices. Returns the same indices in visual order.
pub fn sort_indices(
    rows: &[Row],
    indices: &[usize],
    criteria: &[SortCriterion],
    columns: &[Column],
) -> Vec<usize> {
    if criteria.is_empty() {
        return indices.to_vec();
    }

    let types: Vec<ColumnType> = criteria
        .iter()
        .map(|c| column_type_of(columns, &c.key))
        .collect();

    // Decorate: one key vector per position in the subset
    let mut decorated: Vec<(Vec<SortKey>, usize)> = indices
        .iter()
        .map(|&data_row| {
            let keys = criteria
                .iter()
                .zip(&types)
                .map(|(c, &t)| SortKey::from_value(row_value(&rows[data_row], &c.key), t))
                .collect();
            (keys, data_row)
        })
        .collect();

    // Stable: equal keys keep filtered order
    decorated.sort_by(|(ka, _), (kb, _)| {
        ka.iter()
            .zip(kb)
            .zip(criteria)
            .map(|((a, b), c)| compare_keys(a, b, c.direction))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    decorated.into_iter().map(|(_, data_row)| data_row).collect()
}

/// Permutation of all rows: `result[visual] = data`. Empty criteria yield identity.
pub fn compute_sorted_indices(rows: &[Row], criteria: &[SortCriterion], columns: &[Column]) -> Vec<usize> {
    let identity: Vec<usize> = (0..rows.len()).collect();
    sort_indices(rows, &identity, criteria, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::row;
    use chrono::NaiveDate;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("n", "N").with_type(ColumnType::Number),
            Column::new("t", "T"),
            Column::new("b", "B").with_type(ColumnType::Boolean),
            Column::new("d", "D").with_type(ColumnType::Date),
        ]
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let rows = vec![row([("n", 3)]), row([("n", 1)])];
        assert_eq!(compute_sorted_indices(&rows, &[], &columns()), vec![0, 1]);
    }

    #[test]
    fn test_numeric_sort() {
        let rows = vec![row([("n", 30)]), row([("n", 10)]), row([("n", 20)])];
        let cols = columns();
        assert_eq!(compute_sorted_indices(&rows, &[SortCriterion::asc("n")], &cols), vec![1, 2, 0]);
        assert_eq!(compute_sorted_indices(&rows, &[SortCriterion::desc("n")], &cols), vec![0, 2, 1]);
    }

    #[test]
    fn test_nulls_last_both_directions() {
        let rows = vec![row([("k", Value::Null)]), row([("k", 1)])];
        let cols = vec![Column::new("k", "K").with_type(ColumnType::Number)];
        assert_eq!(compute_sorted_indices(&rows, &[SortCriterion::desc("k")], &cols), vec![1, 0]);
        assert_eq!(compute_sorted_indices(&rows, &[SortCriterion::asc("k")], &cols), vec![1, 0]);

        // Missing key behaves like null
        let rows = vec![Row::default(), row([("k", 5)]), row([("k", 2)])];
        assert_eq!(compute_sorted_indices(&rows, &[SortCriterion::desc("k")], &cols), vec![1, 2, 0]);
    }

    #[test]
    fn test_stability_and_tie_breakers() {
        let rows = vec![
            row([("t", Value::text("b")), ("n", Value::Number(2.0))]),
            row([("t", Value::text("a")), ("n", Value::Number(1.0))]),
            row([("t", Value::text("b")), ("n", Value::Number(1.0))]),
            row([("t", Value::text("a")), ("n", Value::Number(1.0))]),
        ];
        let cols = columns();

        // Single key: ties keep original order
        assert_eq!(compute_sorted_indices(&rows, &[SortCriterion::asc("t")], &cols), vec![1, 3, 0, 2]);

        // Secondary key breaks ties
        let criteria = [SortCriterion::asc("t"), SortCriterion::desc("n")];
        assert_eq!(compute_sorted_indices(&rows, &criteria, &cols), vec![1, 3, 0, 2]);
        let criteria = [SortCriterion::desc("n"), SortCriterion::asc("t")];
        assert_eq!(compute_sorted_indices(&rows, &criteria, &cols), vec![0, 1, 3, 2]);
    }

    #[test]
    fn test_text_is_case_folded() {
        let rows = vec![row([("t", "banana")]), row([("t", "Apple")]), row([("t", "cherry")])];
        assert_eq!(compute_sorted_indices(&rows, &[SortCriterion::asc("t")], &columns()), vec![1, 0, 2]);
    }

    #[test]
    fn test_boolean_and_date_comparators() {
        let cols = columns();
        let rows = vec![row([("b", true)]), row([("b", false)])];
        assert_eq!(compute_sorted_indices(&rows, &[SortCriterion::asc("b")], &cols), vec![1, 0]);

        let d = |y, m, day| Value::Date(NaiveDate::from_ymd_opt(y, m, day).unwrap());
        let rows = vec![
            row([("d", d(2024, 5, 1))]),
            row([("d", Value::text("2023-01-15"))]),
            row([("d", d(2023, 12, 31))]),
        ];
        assert_eq!(compute_sorted_indices(&rows, &[SortCriterion::asc("d")], &cols), vec![1, 2, 0]);
    }

    #[test]
    fn test_invalid_date_sorts_before_nulls() {
        let cols = columns();
        let rows = vec![
            row([("d", Value::Null)]),
            row([("d", Value::text("2024-02-01"))]),
            row([("d", Value::text("garbage"))]),
            row([("d", Value::text("2024-01-01"))]),
            row([("d", Value::text("junk"))]),
        ];
        assert_eq!(
            compare_values(&Value::text("garbage"), &Value::text("junk"), ColumnType::Date, SortDirection::Ascending),
            Ordering::Equal
        );
        assert_eq!(compute_sorted_indices(&rows, &[SortCriterion::asc("d")], &cols), vec![3, 1, 2, 4, 0]);
        assert_eq!(compute_sorted_indices(&rows, &[SortCriterion::desc("d")], &cols), vec![1, 3, 2, 4, 0]);
    }

    #[test]
    fn test_unknown_column_sorts_as_text() {
        let rows = vec![row([("x", "b")]), row([("x", "a")])];
        assert_eq!(compute_sorted_indices(&rows, &[SortCriterion::asc("x")], &[]), vec![1, 0]);
    }

    #[test]
    fn test_sort_subset_maps_back_to_data_indices() {
        let rows = vec![
            row([("n", 5)]),
            row([("n", 1)]),
            row([("n", 4)]),
            row([("n", 2)]),
        ];
        // Filtered subset excludes data row 1
        let subset = [0, 2, 3];
        assert_eq!(sort_indices(&rows, &subset, &[SortCriterion::asc("n")], &columns()), vec![3, 2, 0]);
    }

    #[test]
    fn test_toggle_cycle_replace_mode() {
        let c = toggle_sort(&[], "a", false);
        assert_eq!(c, vec![SortCriterion::asc("a")]);
        let c = toggle_sort(&c, "a", false);
        assert_eq!(c, vec![SortCriterion::desc("a")]);
        let c = toggle_sort(&c, "a", false);
        assert!(c.is_empty());

        // Clicking another column replaces the sort
        let c = toggle_sort(&[SortCriterion::asc("a")], "b", false);
        assert_eq!(c, vec![SortCriterion::asc("b")]);
    }

    #[test]
    fn test_toggle_cycle_additive_mode() {
        let base = vec![SortCriterion::asc("a")];
        let c = toggle_sort(&base, "b", true);
        assert_eq!(c, vec![SortCriterion::asc("a"), SortCriterion::asc("b")]);
        let c = toggle_sort(&c, "b", true);
        assert_eq!(c, vec![SortCriterion::asc("a"), SortCriterion::desc("b")]);
        let c = toggle_sort(&c, "b", true);
        assert_eq!(c, vec![SortCriterion::asc("a")]);
    }
}
