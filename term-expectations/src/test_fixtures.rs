//! Common test fixtures for expectation scenarios.
//!
//! These build small Arrow record batches that mirror typical data-quality
//! situations: composite keys with repeated combinations, columns with missing
//! values, and labelled rows.

use crate::dataset::Dataset;
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use chrono::NaiveDate;
use std::sync::Arc;

/// Builds a date, panicking on invalid input. Test use only.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

fn days_since_epoch(d: NaiveDate) -> i32 {
    (d - date(1970, 1, 1)).num_days() as i32
}

/// Five rows keyed by `(foreign_key_1, foreign_key_2, start_date)` where the
/// combination `(1, 2, 2021-01-02)` occurs at rows 2 and 3.
///
/// `start_date` is a `Date32` column.
pub fn compound_key_dataset() -> Dataset {
    let dates = [
        date(2021, 1, 1),
        date(2021, 1, 1),
        date(2021, 1, 2),
        date(2021, 1, 2),
        date(2021, 1, 1),
    ];
    Dataset::from_columns(vec![
        (
            "foreign_key_1",
            Arc::new(Int64Array::from(vec![1, 1, 1, 1, 1])) as ArrayRef,
        ),
        (
            "foreign_key_2",
            Arc::new(Int64Array::from(vec![1, 2, 2, 2, 3])) as ArrayRef,
        ),
        (
            "start_date",
            Arc::new(Date32Array::from(
                dates.iter().copied().map(days_since_epoch).collect::<Vec<_>>(),
            )) as ArrayRef,
        ),
    ])
    .expect("valid fixture batch")
}

/// Ten customers with gaps in `email` and `score`, labelled by `customer_id`.
pub fn customers_dataset() -> Dataset {
    Dataset::from_columns(vec![
        (
            "customer_id",
            Arc::new(StringArray::from(vec![
                "c-01", "c-02", "c-03", "c-04", "c-05", "c-06", "c-07", "c-08", "c-09", "c-10",
            ])) as ArrayRef,
        ),
        (
            "email",
            Arc::new(StringArray::from(vec![
                Some("alice@example.com"),
                Some("bob@example.com"),
                None,
                Some("alice@example.com"),
                Some("eve@example"),
                None,
                Some("grace@example.com"),
                Some("bob@example.com"),
                Some("ivan@example.com"),
                Some("alice@example.com"),
            ])) as ArrayRef,
        ),
        (
            "tier",
            Arc::new(StringArray::from(vec![
                "gold", "silver", "gold", "bronze", "platinum", "silver", "gold", "gold",
                "unknown", "silver",
            ])) as ArrayRef,
        ),
        (
            "score",
            Arc::new(Float64Array::from(vec![
                Some(85.5),
                Some(92.0),
                None,
                Some(78.5),
                Some(101.0),
                Some(-3.0),
                Some(76.0),
                None,
                Some(f64::NAN),
                Some(83.5),
            ])) as ArrayRef,
        ),
    ])
    .expect("valid fixture batch")
    .with_index_column("customer_id")
    .expect("fixture index column exists")
}
