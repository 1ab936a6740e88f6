//! Core types: values, result format policy, aggregation and result formatting.
//!
//! The map-expectation result pipeline lives here:
//!
//! 1. an expectation collects [`UnexpectedEvidence`] (counts, unexpected values,
//!    row identifiers);
//! 2. [`MapOutputFormatter`] turns it into a [`MapOutput`] shaped by a
//!    [`ResultFormat`], calling [`aggregate_unexpected`] for value histograms;
//! 3. the validator wraps the output in an [`ExpectationValidationResult`].

pub mod aggregate;
pub mod map_output;
pub mod result_format;
pub mod validation_result;
pub mod value;

pub use aggregate::{aggregate_unexpected, ValueCount};
pub use map_output::{
    percent, MapOutput, MapOutputFormatter, MapResultDetails, RowRenderer, UnexpectedEvidence,
};
pub use result_format::{
    ResultFormat, ResultFormatBuilder, ResultFormatLevel, DEFAULT_PARTIAL_UNEXPECTED_COUNT,
};
pub use validation_result::{
    ExceptionInfo, ExpectationConfiguration, ExpectationValidationResult, SuiteStatistics,
    SuiteValidationResult,
};
pub use value::{NormalizedValue, RowIndex, RowValue, ScalarKey, UnexpectedValue, Value};
