//! Completeness of a single column.

use super::{column_kwargs, column_list, validate_mostly, MapExpectation, RowEvaluation, ValueShape};
use crate::dataset::Dataset;
use crate::prelude::*;
use serde_json::{Map, Value as JsonValue};

/// `expect_column_values_to_not_be_null`: missing cells are unexpected.
///
/// Every row is in the domain, so the result never reports missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValuesNotNull {
    columns: Vec<String>,
    mostly: Option<f64>,
}

impl ColumnValuesNotNull {
    pub fn new(column: impl Into<String>) -> Result<Self> {
        Ok(Self {
            columns: column_list([column])?,
            mostly: None,
        })
    }

    pub fn with_mostly(mut self, mostly: f64) -> Result<Self> {
        self.mostly = Some(validate_mostly(mostly)?);
        Ok(self)
    }
}

impl MapExpectation for ColumnValuesNotNull {
    fn expectation_type(&self) -> &'static str {
        "expect_column_values_to_not_be_null"
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
        column_kwargs(&self.columns[0], self.mostly)
    }

    fn evaluate(&self, dataset: &Dataset) -> Result<RowEvaluation> {
        let values = dataset.column_values(&self.columns[0])?;
        Ok(RowEvaluation {
            element_count: values.len(),
            nonnull_count: values.len(),
            unexpected_rows: values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_missing())
                .map(|(row, _)| row)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expectations::calc_map_success;
    use crate::test_fixtures::customers_dataset;

    #[test]
    fn test_null_and_nan_cells() {
        let expectation = ColumnValuesNotNull::new("score").unwrap();
        let evaluation = expectation.evaluate(&customers_dataset()).unwrap();
        assert_eq!(evaluation.element_count, 10);
        assert_eq!(evaluation.nonnull_count, 10);
        assert_eq!(evaluation.unexpected_rows, vec![2, 7, 8]);
        assert!(!calc_map_success(10, 3, expectation.mostly()));
    }

    #[test]
    fn test_mostly_tolerates_gaps() {
        let expectation = ColumnValuesNotNull::new("email")
            .unwrap()
            .with_mostly(0.8)
            .unwrap();
        let evaluation = expectation.evaluate(&customers_dataset()).unwrap();
        assert_eq!(evaluation.unexpected_count(), 2);
        assert!(calc_map_success(
            evaluation.nonnull_count,
            evaluation.unexpected_count(),
            expectation.mostly()
        ));
    }
}
