//! Pattern matching on string columns.

use super::{
    column_kwargs, column_list, evaluate_cells, validate_mostly, MapExpectation, RowEvaluation,
    ValueShape,
};
use crate::core::Value;
use crate::dataset::Dataset;
use crate::prelude::*;
use ::regex::Regex;
use serde_json::{Map, Value as JsonValue};

/// `expect_column_values_to_match_regex`: non-missing strings the pattern does
/// not match are unexpected.
///
/// The pattern is unanchored, so it may match anywhere in the value.
#[derive(Debug, Clone)]
pub struct ColumnValuesMatchRegex {
    columns: Vec<String>,
    regex: Regex,
    mostly: Option<f64>,
}

impl ColumnValuesMatchRegex {
    /// # Errors
    ///
    /// `Configuration` when the pattern does not compile.
    pub fn new(column: impl Into<String>, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| TermError::Configuration(format!("invalid regex '{pattern}': {e}")))?;
        Ok(Self {
            columns: column_list([column])?,
            regex,
            mostly: None,
        })
    }

    pub fn with_mostly(mut self, mostly: f64) -> Result<Self> {
        self.mostly = Some(validate_mostly(mostly)?);
        Ok(self)
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl MapExpectation for ColumnValuesMatchRegex {
    fn expectation_type(&self) -> &'static str {
        "expect_column_values_to_match_regex"
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn mostly(&self) -> Option<f64> {
        self.mostly
    }

    fn value_shape(&self) -> ValueShape {
        ValueShape::Scalar
    }

    fn kwargs(&self) -> Map<String, JsonValue> {
        let mut kwargs = column_kwargs(&self.columns[0], self.mostly);
        kwargs.insert("regex".to_string(), JsonValue::from(self.pattern()));
        kwargs
    }

    fn evaluate(&self, dataset: &Dataset) -> Result<RowEvaluation> {
        evaluate_cells(dataset, &self.columns[0], |value| match value {
            Value::Str(s) => Ok(!self.regex.is_match(s)),
            other => Err(TermError::type_mismatch("string", other.type_name())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::customers_dataset;

    #[test]
    fn test_email_pattern() {
        let expectation =
            ColumnValuesMatchRegex::new("email", r"^[^@]+@[^@]+\.[a-z]+$").unwrap();
        let evaluation = expectation.evaluate(&customers_dataset()).unwrap();
        assert_eq!(evaluation.nonnull_count, 8);
        assert_eq!(evaluation.unexpected_rows, vec![4]);
    }

    #[test]
    fn test_unanchored_match() {
        let expectation = ColumnValuesMatchRegex::new("tier", "ol").unwrap();
        let evaluation = expectation.evaluate(&customers_dataset()).unwrap();
        // Only "gold" contains "ol".
        assert_eq!(evaluation.unexpected_rows, vec![1, 3, 4, 5, 8, 9]);
    }

    #[test]
    fn test_non_string_column() {
        let expectation = ColumnValuesMatchRegex::new("score", ".*").unwrap();
        assert!(matches!(
            expectation.evaluate(&customers_dataset()),
            Err(TermError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            ColumnValuesMatchRegex::new("email", "(unclosed"),
            Err(TermError::Configuration(_))
        ));
    }

    #[test]
    fn test_kwargs() {
        let kwargs = ColumnValuesMatchRegex::new("email", "@").unwrap().kwargs();
        assert_eq!(kwargs["regex"], "@");
        assert_eq!(kwargs["column"], "email");
    }
}
