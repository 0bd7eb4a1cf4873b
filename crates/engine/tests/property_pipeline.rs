// Property-based tests for the filter -> sort pipeline, the clipboard codec
// and viewport windowing.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use gridkit_core::{visible_window, ViewportMetrics};
use gridkit_engine::clipboard::{decode, encode_quoted};
use gridkit_engine::filter::compute_filtered_indices;
use gridkit_engine::sort::compute_sorted_indices;
use gridkit_engine::{row, Column, ColumnType, Filter, Range, Row, SortCriterion, Value};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Cell value for a number column: mostly numbers, sometimes null or junk text.
fn arb_number_cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        6 => (-50i32..50).prop_map(Value::from),
        1 => Just(Value::Null),
        1 => "[a-z]{1,3}".prop_map(Value::Text),
    ]
}

fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(
        (arb_number_cell(), "[a-zA-Z]{0,4}").prop_map(|(n, t)| row([("n", n), ("t", Value::Text(t))])),
        0..60,
    )
}

fn columns() -> Vec<Column> {
    vec![
        Column::new("n", "N").with_type(ColumnType::Number),
        Column::new("t", "T"),
    ]
}

/// Field text including the characters that force quoting. Bare `\r` is left
/// out: decoding normalizes it to `\n`.
fn arb_field() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-z0-9 ]{0,6}",
        1 => "[a-z\t\n\"]{1,6}",
    ]
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn no_filters_is_identity(rows in arb_rows()) {
        let result = compute_filtered_indices(&rows, &[]);
        prop_assert_eq!(result, (0..rows.len()).collect::<Vec<_>>());
    }

    #[test]
    fn filtered_indices_are_in_range_and_increasing(
        rows in arb_rows(),
        lo in -50.0f64..50.0,
        needle in "[a-z]{0,1}",
    ) {
        let filters = vec![
            Filter::range("n", Some(lo), None),
            Filter::contains("t", needle),
        ];
        let result = compute_filtered_indices(&rows, &filters);
        prop_assert!(result.iter().all(|&i| i < rows.len()));
        prop_assert!(result.windows(2).all(|w| w[0] < w[1]));
    }
}

// ---------------------------------------------------------------------------
// Sort
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn sorted_indices_are_a_permutation(rows in arb_rows(), desc in any::<bool>()) {
        let criterion = if desc { SortCriterion::desc("n") } else { SortCriterion::asc("n") };
        let mut result = compute_sorted_indices(&rows, &[criterion, SortCriterion::asc("t")], &columns());
        result.sort_unstable();
        prop_assert_eq!(result, (0..rows.len()).collect::<Vec<_>>());
    }

    #[test]
    fn descending_reverses_distinct_keys(keys in prop::collection::hash_set(-1000i64..1000, 0..40)) {
        let rows: Vec<Row> = keys.iter().map(|&k| row([("n", k)])).collect();
        let asc = compute_sorted_indices(&rows, &[SortCriterion::asc("n")], &columns());
        let mut desc = compute_sorted_indices(&rows, &[SortCriterion::desc("n")], &columns());
        desc.reverse();
        prop_assert_eq!(asc, desc);
    }

    #[test]
    fn ties_keep_original_order(keys in prop::collection::vec(0i32..4, 0..60), desc in any::<bool>()) {
        let rows: Vec<Row> = keys.iter().map(|&k| row([("n", k)])).collect();
        let criterion = if desc { SortCriterion::desc("n") } else { SortCriterion::asc("n") };
        let result = compute_sorted_indices(&rows, &[criterion], &columns());
        for w in result.windows(2) {
            if keys[w[0]] == keys[w[1]] {
                prop_assert!(w[0] < w[1]);
            }
        }
    }

    #[test]
    fn nulls_sort_last_in_both_directions(rows in arb_rows(), desc in any::<bool>()) {
        let criterion = if desc { SortCriterion::desc("n") } else { SortCriterion::asc("n") };
        let result = compute_sorted_indices(&rows, &[criterion], &columns());
        let first_null = result.iter().position(|&i| rows[i]["n"].is_null());
        if let Some(p) = first_null {
            prop_assert!(result[p..].iter().all(|&i| rows[i]["n"].is_null()));
        }
    }
}

#[test]
fn null_sorts_after_number_when_descending() {
    let rows = vec![row([("k", Value::Null)]), row([("k", 1)])];
    let cols = vec![Column::new("k", "K").with_type(ColumnType::Number)];
    assert_eq!(compute_sorted_indices(&rows, &[SortCriterion::desc("k")], &cols), vec![1, 0]);
}

// ---------------------------------------------------------------------------
// Clipboard
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn quoted_encode_decodes_to_same_matrix(
        matrix in (1usize..5, 1usize..4).prop_flat_map(|(r, c)| {
            prop::collection::vec(prop::collection::vec(arb_field(), c), r)
        })
    ) {
        let keys: Vec<String> = (0..matrix[0].len()).map(|c| format!("c{}", c)).collect();
        let cols: Vec<Column> = keys.iter().map(|k| Column::new(k.as_str(), k.as_str())).collect();
        let rows: Vec<Row> = matrix
            .iter()
            .map(|fields| row(keys.iter().cloned().zip(fields.iter().cloned())))
            .collect();

        let range = Range::new(0, 0, rows.len() - 1, cols.len() - 1);
        let mut decoded = decode(&encode_quoted(&rows, &cols, &range));

        // A lone empty field on the last line reads as the trailing empty row
        if cols.len() == 1 && matrix.last().is_some_and(|r| r[0].is_empty()) {
            decoded.push(vec![String::new()]);
        }
        prop_assert_eq!(decoded, matrix);
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn window_is_bounded_and_covers_viewport(
        scroll in 0u32..400_000,
        viewport_height in 100u32..1200,
        total_rows in 0usize..20_000,
    ) {
        let (row_height, header_height, overscan) = (32.0, 40.0, 5);
        let m = ViewportMetrics {
            scroll_top: scroll as f64,
            header_height,
            row_height,
            viewport_height: viewport_height as f64,
            overscan,
            total_rows,
        };
        let w = visible_window(&m);

        let in_view = (viewport_height as f64 / row_height).ceil() as usize;
        prop_assert!(w.len() <= in_view + 2 * overscan);
        prop_assert!(w.end <= total_rows);

        let adjusted = (scroll as f64 - header_height).max(0.0);
        let first = (adjusted / row_height).floor() as usize;
        let last = (((adjusted + viewport_height as f64) / row_height).ceil() as usize).min(total_rows);
        for r in first.min(last)..last {
            prop_assert!(w.contains(r), "row {} not in {:?}", r, w);
        }
    }
}

#[test]
fn window_stays_small_for_large_row_counts() {
    for total_rows in [100usize, 10_000, 1_000_000] {
        let w = visible_window(&ViewportMetrics {
            scroll_top: 5_000.0,
            header_height: 40.0,
            row_height: 32.0,
            viewport_height: 800.0,
            overscan: 5,
            total_rows,
        });
        assert!(w.len() < 60, "{} rows -> {:?}", total_rows, w);
    }
}
