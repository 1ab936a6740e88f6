//! Compound uniqueness over Arrow data with date and timestamp key columns.
//!
//! The same logical data is validated twice: once with `start_date` as a
//! `Date32` column and once after casting it to a nanosecond timestamp. The
//! unexpected rows are identical; only the rendering of the date differs.

use arrow::array::{ArrayRef, Date32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;
use term_expectations::core::ResultFormat;
use term_expectations::dataset::Dataset;
use term_expectations::expectations::CompoundColumnsUnique;
use term_expectations::validator::{Validator, ValidatorConfig};

fn days(year: i32, month: u32, day: u32) -> i32 {
    let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    (date - epoch).num_days() as i32
}

fn key_dataset() -> Dataset {
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
            Arc::new(Date32Array::from(vec![
                days(2021, 1, 1),
                days(2021, 1, 1),
                days(2021, 1, 2),
                days(2021, 1, 2),
                days(2021, 1, 1),
            ])) as ArrayRef,
        ),
    ])
    .unwrap()
}

fn expectation() -> CompoundColumnsUnique {
    CompoundColumnsUnique::new(vec!["foreign_key_1", "foreign_key_2", "start_date"]).unwrap()
}

fn expected_result(start_date: &str) -> serde_json::Value {
    json!({
        "exception_info": {
            "raised_exception": false,
            "exception_traceback": null,
            "exception_message": null
        },
        "expectation_config": {
            "expectation_type": "expect_compound_columns_to_be_unique",
            "kwargs": {
                "column_list": ["foreign_key_1", "foreign_key_2", "start_date"],
                "batch_id": []
            },
            "meta": {}
        },
        "success": false,
        "result": {
            "element_count": 5,
            "unexpected_count": 2,
            "unexpected_percent": 40.0,
            "partial_unexpected_list": [
                {"foreign_key_1": 1, "foreign_key_2": 2, "start_date": start_date},
                {"foreign_key_1": 1, "foreign_key_2": 2, "start_date": start_date}
            ],
            "missing_count": 0,
            "missing_percent": 0.0,
            "unexpected_percent_total": 40.0,
            "unexpected_percent_nonmissing": 40.0
        },
        "meta": {}
    })
}

#[test]
fn test_date_column_keys() {
    let result = Validator::new(key_dataset())
        .validate(&expectation())
        .unwrap();
    assert_eq!(result.to_json_value().unwrap(), expected_result("2021-01-02"));
}

#[test]
fn test_timestamp_column_keys() {
    let dataset = key_dataset()
        .with_column_cast("start_date", &DataType::Timestamp(TimeUnit::Nanosecond, None))
        .unwrap();
    let result = Validator::new(dataset).validate(&expectation()).unwrap();
    assert_eq!(
        result.to_json_value().unwrap(),
        expected_result("2021-01-02T00:00:00")
    );
}

#[test]
fn test_batch_id_is_recorded() {
    let config = ValidatorConfig::default().with_batch_id("orders-2021-01");
    let result = Validator::with_config(key_dataset(), config)
        .validate(&expectation())
        .unwrap();
    assert_eq!(
        result.expectation_config.kwargs["batch_id"],
        "orders-2021-01"
    );
}

#[test]
fn test_complete_level_renders_full_rows() {
    let format = ResultFormat::builder(term_expectations::core::ResultFormatLevel::Complete)
        .include_unexpected_rows(true)
        .build()
        .unwrap();
    let dataset = key_dataset();
    let expectation =
        CompoundColumnsUnique::new(vec!["foreign_key_1", "start_date"]).unwrap();

    let result = Validator::with_config(
        dataset,
        ValidatorConfig::default().with_result_format(format),
    )
    .validate(&expectation)
    .unwrap();
    let json = result.to_json_value().unwrap();

    // (1, 2021-01-01) occurs at rows 0, 1, 4 and (1, 2021-01-02) at rows 2, 3.
    assert_eq!(json["result"]["unexpected_count"], 5);
    assert_eq!(json["result"]["unexpected_index_list"], json!([0, 1, 2, 3, 4]));
    assert_eq!(
        json["result"]["partial_unexpected_counts"],
        json!([
            {"value": [1, "2021-01-01"], "count": 3},
            {"value": [1, "2021-01-02"], "count": 2}
        ])
    );
    assert_eq!(
        json["result"]["unexpected_rows"][0],
        json!({"foreign_key_1": 1, "foreign_key_2": 1, "start_date": "2021-01-01"})
    );
    assert_eq!(
        json["result"]["unexpected_rows"][4],
        json!({"foreign_key_1": 1, "foreign_key_2": 3, "start_date": "2021-01-01"})
    );
}

#[test]
fn test_unexpected_rows_with_repeated_labels() {
    let dataset = Dataset::from_columns(vec![
        ("id", Arc::new(StringArray::from(vec!["a", "a", "b"])) as ArrayRef),
        ("k", Arc::new(Int64Array::from(vec![7, 9, 9])) as ArrayRef),
    ])
    .unwrap()
    .with_index_column("id")
    .unwrap();
    let format = ResultFormat::builder(term_expectations::core::ResultFormatLevel::Complete)
        .include_unexpected_rows(true)
        .build()
        .unwrap();

    let result = Validator::with_config(
        dataset,
        ValidatorConfig::default().with_result_format(format),
    )
    .validate(&CompoundColumnsUnique::new(vec!["k"]).unwrap())
    .unwrap();
    let json = result.to_json_value().unwrap();

    // Row 0 also carries label "a" but holds k = 7 and passes.
    assert_eq!(json["result"]["unexpected_list"], json!([{"k": 9}, {"k": 9}]));
    assert_eq!(json["result"]["unexpected_index_list"], json!(["a", "b"]));
    assert_eq!(
        json["result"]["unexpected_rows"],
        json!([{"id": "a", "k": 9}, {"id": "b", "k": 9}])
    );
}
