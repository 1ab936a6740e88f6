//! Set membership of a single column.

use super::{
    column_kwargs, column_list, evaluate_cells, validate_mostly, MapExpectation, RowEvaluation,
    ValueShape,
};
use crate::core::{ScalarKey, Value};
use crate::dataset::Dataset;
use crate::prelude::*;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;

/// `expect_column_values_to_be_in_set`: non-missing values outside
/// `value_set` are unexpected.
///
/// Membership is exact: `Int(1)` and `Float(1.0)` are different values.
///
/// # Examples
///
/// ```rust
/// use term_expectations::expectations::ColumnValuesInSet;
///
/// let expectation = ColumnValuesInSet::new("tier", vec!["gold", "silver"]).unwrap();
/// assert!(ColumnValuesInSet::new("tier", Vec::<&str>::new()).is_err());
/// # let _ = expectation;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValuesInSet {
    columns: Vec<String>,
    value_set: Vec<Value>,
    keys: HashSet<ScalarKey>,
    mostly: Option<f64>,
}

impl ColumnValuesInSet {
    /// # Errors
    ///
    /// `Configuration` for an empty set or an empty column name,
    /// `Normalization` for list members.
    pub fn new<I, V>(column: impl Into<String>, value_set: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let value_set: Vec<Value> = value_set.into_iter().map(Into::into).collect();
        if value_set.is_empty() {
            return Err(TermError::Configuration(
                "value_set must contain at least one value".to_string(),
            ));
        }
        let keys = value_set
            .iter()
            .map(ScalarKey::from_value)
            .collect::<Result<HashSet<_>>>()?;
        Ok(Self {
            columns: column_list([column])?,
            value_set,
            keys,
            mostly: None,
        })
    }

    pub fn with_mostly(mut self, mostly: f64) -> Result<Self> {
        self.mostly = Some(validate_mostly(mostly)?);
        Ok(self)
    }

    pub fn value_set(&self) -> &[Value] {
        &self.value_set
    }
}

impl MapExpectation for ColumnValuesInSet {
    fn expectation_type(&self) -> &'static str {
        "expect_column_values_to_be_in_set"
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
        let value_set = self
            .value_set
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap_or_default();
        kwargs.insert("value_set".to_string(), JsonValue::Array(value_set));
        kwargs
    }

    fn evaluate(&self, dataset: &Dataset) -> Result<RowEvaluation> {
        evaluate_cells(dataset, &self.columns[0], |value| {
            Ok(!self.keys.contains(&ScalarKey::from_value(value)?))
        })
    }
}
