//! # term-expectations - Map Expectations for Arrow Data
//!
//! term-expectations evaluates row-level data quality rules ("map
//! expectations") against Arrow record batches and reports the evidence in a
//! bounded, deterministic shape controlled by a result format.
//!
//! ## Overview
//!
//! A map expectation classifies every row as in or out of its domain and as
//! expected or unexpected. The evidence (counts, unexpected values in row
//! order, and their row identifiers) is formatted at one of four verbosity
//! levels:
//!
//! - `BOOLEAN_ONLY`: success flag only
//! - `BASIC`: counts, percentages and a truncated sample of unexpected values
//! - `SUMMARY`: adds the sample's row identifiers and a value histogram
//! - `COMPLETE`: adds the full unexpected value and identifier lists, and
//!   optionally the full unexpected rows
//!
//! ## Quick Start
//!
//! ```rust
//! use arrow::array::{ArrayRef, Int64Array, StringArray};
//! use std::sync::Arc;
//! use term_expectations::prelude::*;
//! use term_expectations::expectations::{ColumnValuesMatchRegex, CompoundColumnsUnique};
//!
//! # fn main() -> term_expectations::prelude::Result<()> {
//! let dataset = Dataset::from_columns(vec![
//!     ("order_id", Arc::new(Int64Array::from(vec![1, 1, 2])) as ArrayRef),
//!     ("line_no", Arc::new(Int64Array::from(vec![1, 1, 1])) as ArrayRef),
//!     ("email", Arc::new(StringArray::from(vec!["a@x.io", "b@x.io", "nope"])) as ArrayRef),
//! ])?;
//!
//! let suite = ExpectationSuite::builder("orders")
//!     .expectation(CompoundColumnsUnique::new(vec!["order_id", "line_no"])?)
//!     .expectation_with_format(
//!         ColumnValuesMatchRegex::new("email", r"^[^@]+@[^@]+$")?,
//!         ResultFormat::summary(),
//!     )
//!     .build();
//!
//! let config = ValidatorConfig::default().with_result_format(ResultFormat::complete());
//! let result = Validator::with_config(dataset, config).run_suite(&suite)?;
//!
//! assert!(!result.success);
//! assert_eq!(result.results[0].unexpected_count(), Some(2));
//! println!("{}", result.to_human()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Formatting evidence directly
//!
//! The result formatter does not need a dataset:
//!
//! ```rust
//! use term_expectations::core::{
//!     MapOutputFormatter, ResultFormat, RowIndex, UnexpectedEvidence, Value,
//! };
//!
//! let evidence = UnexpectedEvidence::new(
//!     4,
//!     4,
//!     vec![Value::from("x").into(), Value::from("x").into()],
//!     vec![RowIndex::from(0), RowIndex::from(3)],
//! );
//! let output = MapOutputFormatter::new(ResultFormat::summary())
//!     .format(false, &evidence)
//!     .unwrap();
//! assert_eq!(output.result.unwrap().partial_unexpected_counts.unwrap()[0].count, 2);
//! ```
//!
//! ## Architecture
//!
//! - **`core`**: values, result format policy, histogram aggregation, result
//!   formatting and validation result types
//! - **`dataset`**: Arrow-backed tabular data with typed cell access
//! - **`expectations`**: the `MapExpectation` trait and built-in expectations
//! - **`validator`**: expectation suites and the validator that runs them
//! - **`formatters`**: JSON, console and Markdown reports
//! - **`logging`**: `tracing` configuration

pub mod core;
pub mod dataset;
pub mod error;
pub mod expectations;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod validator;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
