//! Prelude for commonly used types and traits in term-expectations.

pub use crate::core::{
    MapOutputFormatter, ResultFormat, ResultFormatLevel, RowIndex, RowValue, UnexpectedEvidence,
    UnexpectedValue, Value,
};
pub use crate::dataset::Dataset;
pub use crate::error::{ErrorContext, Result, TermError};
pub use crate::expectations::MapExpectation;
pub use crate::formatters::{FormatterConfig, ResultFormatter};
pub use crate::logging::LogConfig;
pub use crate::validator::{ExpectationSuite, Validator, ValidatorConfig};
