//! Range checks on a single column.

use super::{
    column_kwargs, column_list, evaluate_cells, validate_mostly, MapExpectation, RowEvaluation,
    ValueShape,
};
use crate::core::Value;
use crate::dataset::Dataset;
use crate::prelude::*;
use serde_json::{Map, Value as JsonValue};
use std::cmp::Ordering;

/// `expect_column_values_to_be_between`: non-missing values outside the
/// bounds are unexpected.
///
/// Bounds are inclusive unless made strict. Integers and floats compare with
/// each other, dates compare with timestamps at midnight, strings compare
/// lexicographically.
///
/// # Examples
///
/// ```rust
/// use term_expectations::expectations::ColumnValuesBetween;
///
/// let expectation = ColumnValuesBetween::new("score", Some(0.0.into()), Some(100.0.into()))
///     .unwrap()
///     .strict_max(true);
/// assert!(ColumnValuesBetween::new("score", None, None).is_err());
/// # let _ = expectation;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValuesBetween {
    columns: Vec<String>,
    min_value: Option<Value>,
    max_value: Option<Value>,
    strict_min: bool,
    strict_max: bool,
    mostly: Option<f64>,
}

impl ColumnValuesBetween {
    /// # Errors
    ///
    /// `Configuration` when both bounds are absent, missing, incomparable, or
    /// `min_value > max_value`.
    pub fn new(
        column: impl Into<String>,
        min_value: Option<Value>,
        max_value: Option<Value>,
    ) -> Result<Self> {
        let columns = column_list([column])?;
        if min_value.is_none() && max_value.is_none() {
            return Err(TermError::Configuration(
                "At least one of min_value or max_value must be specified".to_string(),
            ));
        }
        if min_value.iter().chain(max_value.iter()).any(Value::is_missing) {
            return Err(TermError::Configuration(
                "Bounds must not be null or NaN".to_string(),
            ));
        }
        if let (Some(min), Some(max)) = (&min_value, &max_value) {
            match min.compare(max) {
                Some(Ordering::Greater) => {
                    return Err(TermError::Configuration(format!(
                        "min_value {min} is greater than max_value {max}"
                    )))
                }
                None => {
                    return Err(TermError::Configuration(format!(
                        "min_value of type {} cannot be compared with max_value of type {}",
                        min.type_name(),
                        max.type_name()
                    )))
                }
                _ => {}
            }
        }
        Ok(Self {
            columns,
            min_value,
            max_value,
            strict_min: false,
            strict_max: false,
            mostly: None,
        })
    }

    pub fn strict_min(mut self, strict: bool) -> Self {
        self.strict_min = strict;
        self
    }

    pub fn strict_max(mut self, strict: bool) -> Self {
        self.strict_max = strict;
        self
    }

    pub fn with_mostly(mut self, mostly: f64) -> Result<Self> {
        self.mostly = Some(validate_mostly(mostly)?);
        Ok(self)
    }

    fn is_out_of_range(&self, value: &Value) -> Result<bool> {
        if let Some(min) = &self.min_value {
            let ordering = compare_to_bound(value, min)?;
            if ordering == Ordering::Less || (self.strict_min && ordering == Ordering::Equal) {
                return Ok(true);
            }
        }
        if let Some(max) = &self.max_value {
            let ordering = compare_to_bound(value, max)?;
            if ordering == Ordering::Greater || (self.strict_max && ordering == Ordering::Equal) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn compare_to_bound(value: &Value, bound: &Value) -> Result<Ordering> {
    value
        .compare(bound)
        .ok_or_else(|| TermError::type_mismatch(bound.type_name(), value.type_name()))
}

fn bound_json(bound: &Option<Value>) -> JsonValue {
    bound
        .as_ref()
        .and_then(|v| serde_json::to_value(v).ok())
        .unwrap_or(JsonValue::Null)
}

impl MapExpectation for ColumnValuesBetween {
    fn expectation_type(&self) -> &'static str {
        "expect_column_values_to_be_between"
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
        kwargs.insert("min_value".to_string(), bound_json(&self.min_value));
        kwargs.insert("max_value".to_string(), bound_json(&self.max_value));
        kwargs.insert("strict_min".to_string(), JsonValue::from(self.strict_min));
        kwargs.insert("strict_max".to_string(), JsonValue::from(self.strict_max));
        kwargs
    }

    fn evaluate(&self, dataset: &Dataset) -> Result<RowEvaluation> {
        evaluate_cells(dataset, &self.columns[0], |value| self.is_out_of_range(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{compound_key_dataset, customers_dataset, date};

    #[test]
    fn test_numeric_range() {
        let expectation =
            ColumnValuesBetween::new("score", Some(Value::Int(0)), Some(Value::Int(100))).unwrap();
        let evaluation = expectation.evaluate(&customers_dataset()).unwrap();
        assert_eq!(evaluation.nonnull_count, 7);
        assert_eq!(evaluation.unexpected_rows, vec![4, 5]);
    }

    #[test]
    fn test_strict_bounds() {
        let inclusive =
            ColumnValuesBetween::new("score", Some(Value::Float(76.0)), None).unwrap();
        assert_eq!(
            inclusive
                .evaluate(&customers_dataset())
                .unwrap()
                .unexpected_rows,
            vec![5]
        );

        let strict = inclusive.strict_min(true);
        assert_eq!(
            strict.evaluate(&customers_dataset()).unwrap().unexpected_rows,
            vec![5, 6]
        );

        let strict_max = ColumnValuesBetween::new("score", None, Some(Value::Float(92.0)))
            .unwrap()
            .strict_max(true);
        assert_eq!(
            strict_max
                .evaluate(&customers_dataset())
                .unwrap()
                .unexpected_rows,
            vec![1, 4]
        );
    }

    #[test]
    fn test_date_range() {
        let expectation = ColumnValuesBetween::new(
            "start_date",
            None,
            Some(Value::Date(date(2021, 1, 1))),
        )
        .unwrap();
        let evaluation = expectation.evaluate(&compound_key_dataset()).unwrap();
        assert_eq!(evaluation.unexpected_rows, vec![2, 3]);
    }

    #[test]
    fn test_incomparable_cell_is_type_mismatch() {
        let expectation =
            ColumnValuesBetween::new("tier", Some(Value::Int(0)), None).unwrap();
        assert!(matches!(
            expectation.evaluate(&customers_dataset()),
            Err(TermError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_constructor_validation() {
        assert!(ColumnValuesBetween::new("score", None, None).is_err());
        assert!(
            ColumnValuesBetween::new("score", Some(Value::Int(5)), Some(Value::Int(1))).is_err()
        );
        assert!(ColumnValuesBetween::new("score", Some(Value::Int(1)), Some("z".into())).is_err());
        assert!(ColumnValuesBetween::new("score", Some(Value::Float(f64::NAN)), None).is_err());
    }

    #[test]
    fn test_kwargs() {
        let kwargs = ColumnValuesBetween::new("score", Some(Value::Int(0)), None)
            .unwrap()
            .kwargs();
        assert_eq!(kwargs["min_value"], 0);
        assert_eq!(kwargs["max_value"], JsonValue::Null);
        assert_eq!(kwargs["strict_min"], false);
    }
}
