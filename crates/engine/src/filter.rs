//! Row filters - first stage of the index pipeline.
//!
//! A filter is a per-column predicate over `(value, row)`. Filters compose
//! with AND; at most one filter exists per column key. The pipeline output is
//! the list of data indices that pass every filter, in original order.
//!
//! Predicates that fail (return `Err`) let the row through: hiding data on a
//! broken predicate is worse than showing too much.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::{row_value, Row, Value};

/// Error raised by a filter predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterError {
    pub message: String,
}

impl FilterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "filter predicate failed: {}", self.message)
    }
}

impl std::error::Error for FilterError {}

pub type Predicate = Arc<dyn Fn(&Value, &Row) -> Result<bool, FilterError> + Send + Sync>;

/// How a text filter compares a cell's display string with its needle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextMatch {
    Contains,
    Excludes,
    Prefix,
    Suffix,
    Exact,
    NotExact,
}

impl TextMatch {
    fn test(self, haystack: &str, needle: &str) -> bool {
        match self {
            TextMatch::Contains => haystack.contains(needle),
            TextMatch::Excludes => !haystack.contains(needle),
            TextMatch::Prefix => haystack.starts_with(needle),
            TextMatch::Suffix => haystack.ends_with(needle),
            TextMatch::Exact => haystack == needle,
            TextMatch::NotExact => haystack != needle,
        }
    }
}

/// Text predicate for `Filter::text`. Case-insensitive unless asked otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFilter {
    pub how: TextMatch,
    pub needle: String,
    pub case_sensitive: bool,
}

impl TextFilter {
    pub fn new(how: TextMatch, needle: impl Into<String>) -> Self {
        Self { how, needle: needle.into(), case_sensitive: false }
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    pub fn matches(&self, text: &str) -> bool {
        if self.case_sensitive {
            self.how.test(text, &self.needle)
        } else {
            self.how.test(&text.to_lowercase(), &self.needle.to_lowercase())
        }
    }
}

/// A predicate bound to a column key.
#[derive(Clone)]
pub struct Filter {
    pub key: String,
    predicate: Predicate,
}

impl Filter {
    pub fn new<F>(key: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value, &Row) -> Result<bool, FilterError> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Keep rows whose value equals `expected`.
    pub fn equals(key: impl Into<String>, expected: Value) -> Self {
        Self::new(key, move |v, _| Ok(*v == expected))
    }

    /// Keep rows whose stringified value satisfies a text predicate.
    /// Null values never match.
    pub fn text(key: impl Into<String>, text_filter: TextFilter) -> Self {
        Self::new(key, move |v, _| {
            Ok(!v.is_null() && text_filter.matches(&v.to_string()))
        })
    }

    /// Case-insensitive substring match.
    pub fn contains(key: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::text(key, TextFilter::new(TextMatch::Contains, needle))
    }

    /// Keep rows whose numeric value lies within the inclusive bounds.
    /// Non-numeric values never match.
    pub fn range(key: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(key, move |v, _| {
            Ok(v.as_f64().is_some_and(|n| {
                min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi)
            }))
        })
    }

    /// Run the predicate against a row.
    pub fn test(&self, row: &Row) -> Result<bool, FilterError> {
        (self.predicate)(row_value(row, &self.key), row)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("key", &self.key).finish_non_exhaustive()
    }
}

/// Active filters, one per key, in the order they were first set.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a filter, replacing any existing filter on the same key.
    /// Returns the replaced filter.
    pub fn set(&mut self, filter: Filter) -> Option<Filter> {
        match self.filters.iter_mut().find(|f| f.key == filter.key) {
            Some(slot) => Some(std::mem::replace(slot, filter)),
            None => {
                self.filters.push(filter);
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Filter> {
        let pos = self.filters.iter().position(|f| f.key == key)?;
        Some(self.filters.remove(pos))
    }

    pub fn get(&self, key: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn keys(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.key.clone()).collect()
    }

    pub fn as_slice(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Data indices of rows passing every filter, in original order.
/// Predicate failures are logged and the row is kept.
pub fn compute_filtered_indices(rows: &[Row], filters: &[Filter]) -> Vec<usize> {
    compute_filtered_indices_with(rows, filters, |_, _, _| {})
}

/// Like `compute_filtered_indices`, reporting predicate failures to `on_error`.
pub fn compute_filtered_indices_with<F>(rows: &[Row], filters: &[Filter], mut on_error: F) -> Vec<usize>
where
    F: FnMut(&FilterError, &Row, &Filter),
{
    if filters.is_empty() {
        return (0..rows.len()).collect();
    }

    rows.iter()
        .enumerate()
        .filter(|(data_row, row)| {
            filters.iter().all(|filter| match filter.test(row) {
                Ok(pass) => pass,
                Err(e) => {
                    log::warn!("filter on '{}' failed for row {}: {}", filter.key, data_row, e);
                    on_error(&e, row, filter);
                    true
                }
            })
        })
        .map(|(data_row, _)| data_row)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::row;

    fn fruit_rows() -> Vec<Row> {
        vec![
            row([("name", Value::text("Apple")), ("qty", Value::Number(3.0))]),
            row([("name", Value::text("banana")), ("qty", Value::Number(12.0))]),
            row([("name", Value::text("Cherry")), ("qty", Value::Null)]),
            row([("name", Value::text("apricot")), ("qty", Value::Number(7.0))]),
        ]
    }

    #[test]
    fn test_no_filters_is_identity() {
        let rows = fruit_rows();
        assert_eq!(compute_filtered_indices(&rows, &[]), vec![0, 1, 2, 3]);
        assert!(compute_filtered_indices(&[], &[]).is_empty());
    }

    #[test]
    fn test_filters_compose_with_and() {
        let rows = fruit_rows();
        let filters = vec![
            Filter::contains("name", "ap"),
            Filter::range("qty", Some(5.0), None),
        ];
        assert_eq!(compute_filtered_indices(&rows, &filters), vec![3]);
    }

    #[test]
    fn test_range_excludes_non_numeric() {
        let rows = fruit_rows();
        let filters = vec![Filter::range("qty", None, Some(100.0))];
        assert_eq!(compute_filtered_indices(&rows, &filters), vec![0, 1, 3]);
    }

    #[test]
    fn test_failing_predicate_fails_open() {
        let rows = fruit_rows();
        let filters = vec![Filter::new("qty", |v, _| match v {
            Value::Number(n) => Ok(*n > 5.0),
            _ => Err(FilterError::new("qty is not a number")),
        })];

        let mut failures = Vec::new();
        let result = compute_filtered_indices_with(&rows, &filters, |e, row, f| {
            failures.push((e.message.clone(), row_value(row, "name").to_string(), f.key.clone()));
        });

        // Row 2 has a null qty: the predicate errors and the row is kept
        assert_eq!(result, vec![1, 2, 3]);
        assert_eq!(failures, vec![(
            "qty is not a number".to_string(),
            "Cherry".to_string(),
            "qty".to_string(),
        )]);
    }

    #[test]
    fn test_filter_set_replaces_per_key() {
        let mut set = FilterSet::new();
        assert!(set.set(Filter::contains("name", "a")).is_none());
        assert!(set.set(Filter::range("qty", Some(1.0), None)).is_none());
        assert!(set.set(Filter::contains("name", "b")).is_some());
        assert_eq!(set.len(), 2);
        assert_eq!(set.keys(), vec!["name".to_string(), "qty".to_string()]);

        let rows = fruit_rows();
        assert_eq!(compute_filtered_indices(&rows, set.as_slice()), vec![1]);

        assert!(set.remove("name").is_some());
        assert!(set.remove("name").is_none());
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_text_filter_modes() {
        assert!(TextFilter::new(TextMatch::Prefix, "ap").matches("Apple"));
        assert!(TextFilter::new(TextMatch::Suffix, "LE").matches("apple"));
        assert!(TextFilter::new(TextMatch::Excludes, "x").matches("apple"));
        assert!(TextFilter::new(TextMatch::Exact, "APPLE").matches("apple"));
        assert!(!TextFilter::new(TextMatch::NotExact, "APPLE").matches("apple"));

        let strict = TextFilter::new(TextMatch::Exact, "Apple").case_sensitive();
        assert!(!strict.matches("apple"));
        assert!(strict.matches("Apple"));
        assert!(TextFilter::new(TextMatch::Contains, "pp").case_sensitive().matches("apple"));
    }

    #[test]
    fn test_text_filter_skips_null() {
        let rows = vec![row([("name", Value::Null)]), row([("name", "x")])];
        let filters = vec![Filter::text("name", TextFilter::new(TextMatch::Excludes, "y"))];
        assert_eq!(compute_filtered_indices(&rows, &filters), vec![1]);
    }
}
