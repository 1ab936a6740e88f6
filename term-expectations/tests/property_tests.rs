//! Property-based tests for result formatting and aggregation.
//!
//! These check invariants that must hold for any evidence:
//! - histogram counts sum to the number of scanned values
//! - histogram entries are ordered by descending count
//! - partial lists never exceed the configured limit
//! - percentages stay consistent with the counts
//! - formatting is deterministic
//! - uniqueness evaluation agrees with a naive occurrence count

use arrow::array::{ArrayRef, Int64Array};
use proptest::prelude::*;
use std::sync::Arc;
use term_expectations::core::{
    aggregate_unexpected, MapOutputFormatter, ResultFormat, ResultFormatLevel, RowIndex,
    RowValue, UnexpectedEvidence, UnexpectedValue, Value,
};
use term_expectations::dataset::Dataset;
use term_expectations::expectations::{ColumnValuesUnique, MapExpectation};

fn scalar_values() -> impl Strategy<Value = Vec<UnexpectedValue>> {
    prop::collection::vec(
        prop_oneof![
            (0i64..5).prop_map(Value::Int),
            "[a-c]".prop_map(Value::Str),
            Just(Value::Null),
        ]
        .prop_map(UnexpectedValue::Scalar),
        0..60,
    )
}

fn row_values() -> impl Strategy<Value = Vec<UnexpectedValue>> {
    prop::collection::vec(
        (0i64..3, "[xy]").prop_map(|(k, s)| {
            let row = RowValue::from_pairs([("k", Value::Int(k)), ("s", Value::Str(s))]).unwrap();
            UnexpectedValue::Row(row)
        }),
        0..40,
    )
}

fn evidence_for(values: Vec<UnexpectedValue>, missing: usize) -> UnexpectedEvidence {
    let count = values.len();
    UnexpectedEvidence::new(
        count + missing,
        count,
        values,
        (0..count).map(RowIndex::from).collect(),
    )
}

proptest! {
    #[test]
    fn prop_histogram_counts_sum_to_scanned(values in scalar_values(), limit in 0usize..30) {
        let counts = aggregate_unexpected(&values, Some(limit)).unwrap();
        let total: usize = counts.iter().map(|c| c.count).sum();
        prop_assert_eq!(total, limit.min(values.len()));

        let unbounded = aggregate_unexpected(&values, None).unwrap();
        let total: usize = unbounded.iter().map(|c| c.count).sum();
        prop_assert_eq!(total, values.len());
    }

    #[test]
    fn prop_histogram_descending_and_distinct(values in row_values()) {
        let counts = aggregate_unexpected(&values, None).unwrap();
        for pair in counts.windows(2) {
            prop_assert!(pair[0].count >= pair[1].count);
            prop_assert_ne!(&pair[0].value, &pair[1].value);
        }
        prop_assert!(counts.iter().all(|c| c.count > 0));
    }

    #[test]
    fn prop_partial_lists_bounded(
        values in scalar_values(),
        limit in 0usize..25,
        missing in 0usize..10
    ) {
        let n = values.len();
        let format = ResultFormat::builder(ResultFormatLevel::Summary)
            .partial_unexpected_count(limit)
            .build()
            .unwrap();
        let details = MapOutputFormatter::new(format)
            .format(false, &evidence_for(values, missing))
            .unwrap()
            .result
            .unwrap();

        prop_assert_eq!(details.partial_unexpected_list.len(), limit.min(n));
        prop_assert_eq!(
            details.partial_unexpected_index_list.as_ref().map(Vec::len),
            Some(limit.min(n))
        );
        prop_assert!(details.unexpected_list.is_none());
        prop_assert_eq!(details.missing_count, missing);
    }

    #[test]
    fn prop_complete_keeps_everything(values in row_values()) {
        let evidence = evidence_for(values.clone(), 0);
        let details = MapOutputFormatter::new(ResultFormat::complete())
            .format(false, &evidence)
            .unwrap()
            .result
            .unwrap();

        prop_assert_eq!(&details.partial_unexpected_list, &values);
        prop_assert_eq!(details.unexpected_list.as_ref(), Some(&values));
        let total: usize = details
            .partial_unexpected_counts
            .as_ref()
            .map(|c| c.iter().map(|vc| vc.count).sum())
            .unwrap_or(0);
        prop_assert_eq!(total, values.len());
    }

    #[test]
    fn prop_percentages_consistent(values in scalar_values(), missing in 0usize..20) {
        let n = values.len();
        let details = MapOutputFormatter::new(ResultFormat::basic())
            .format(false, &evidence_for(values, missing))
            .unwrap()
            .result
            .unwrap();

        prop_assert_eq!(details.unexpected_percent, details.unexpected_percent_nonmissing);
        prop_assert!(details.unexpected_percent_total <= details.unexpected_percent_nonmissing);
        prop_assert!((0.0..=100.0).contains(&details.missing_percent));
        if n == 0 {
            prop_assert_eq!(details.unexpected_percent, 0.0);
        } else {
            prop_assert_eq!(details.unexpected_percent, 100.0);
        }
    }

    #[test]
    fn prop_formatting_is_deterministic(values in scalar_values()) {
        let evidence = evidence_for(values, 3);
        let formatter = MapOutputFormatter::new(ResultFormat::summary());
        let first = serde_json::to_string(&formatter.format(false, &evidence).unwrap()).unwrap();
        let second = serde_json::to_string(&formatter.format(false, &evidence).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_index_mismatch_always_rejected(values in scalar_values(), extra in 1usize..4) {
        let n = values.len();
        let evidence = UnexpectedEvidence::new(
            n + 10,
            n + 5,
            values,
            (0..n + extra).map(RowIndex::from).collect(),
        );
        prop_assert!(MapOutputFormatter::new(ResultFormat::boolean_only())
            .format(true, &evidence)
            .is_err());
    }

    #[test]
    fn prop_uniqueness_matches_naive_count(
        column in prop::collection::vec(prop::option::of(0i64..8), 0..50)
    ) {
        let dataset = Dataset::from_columns(vec![(
            "v",
            Arc::new(Int64Array::from(column.clone())) as ArrayRef,
        )])
        .unwrap();
        let evaluation = ColumnValuesUnique::new("v").unwrap().evaluate(&dataset).unwrap();

        let expected: Vec<usize> = column
            .iter()
            .enumerate()
            .filter_map(|(row, v)| {
                let v = (*v)?;
                (column.iter().filter(|o| **o == Some(v)).count() > 1).then_some(row)
            })
            .collect();
        prop_assert_eq!(evaluation.unexpected_rows, expected);
        prop_assert_eq!(evaluation.nonnull_count, column.iter().filter(|v| v.is_some()).count());
    }
}
