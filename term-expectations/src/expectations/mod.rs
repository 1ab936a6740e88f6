//! Map expectations evaluated row by row against a [`Dataset`].
//!
//! A [`MapExpectation`] decides, per row, whether the row is in its domain
//! (non-missing) and whether it violates the rule. The validator turns the
//! resulting [`RowEvaluation`] into [`UnexpectedEvidence`] with
//! [`collect_evidence`] and hands it to the result formatter.

use crate::core::{ExpectationConfiguration, UnexpectedEvidence, UnexpectedValue};
use crate::dataset::Dataset;
use crate::prelude::*;
use serde_json::{Map, Value as JsonValue};
use std::fmt::Debug;

pub mod between;
pub mod column_unique;
pub mod compound_unique;
pub mod in_set;
pub mod match_regex;
pub mod not_null;

pub use between::ColumnValuesBetween;
pub use column_unique::ColumnValuesUnique;
pub use compound_unique::{CompoundColumnsUnique, IgnoreRowIf};
pub use in_set::ColumnValuesInSet;
pub use match_regex::ColumnValuesMatchRegex;
pub use not_null::ColumnValuesNotNull;

/// Shape of the values reported for unexpected rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// The single checked column's value.
    Scalar,
    /// A row of the checked columns, in declared order.
    Row,
}

/// Outcome of evaluating a map expectation over every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowEvaluation {
    /// Rows considered.
    pub element_count: usize,
    /// Rows inside the expectation's domain.
    pub nonnull_count: usize,
    /// Positions of violating rows, ascending.
    pub unexpected_rows: Vec<usize>,
}

impl RowEvaluation {
    pub fn unexpected_count(&self) -> usize {
        self.unexpected_rows.len()
    }
}

/// A rule evaluated independently per row.
pub trait MapExpectation: Debug + Send + Sync {
    /// Snake-case expectation name.
    fn expectation_type(&self) -> &'static str;

    /// Checked columns, in declared order.
    fn columns(&self) -> &[String];

    /// Minimum fraction of in-domain rows that must comply.
    fn mostly(&self) -> Option<f64>;

    fn value_shape(&self) -> ValueShape;

    /// Parameters recorded in the expectation configuration.
    fn kwargs(&self) -> Map<String, JsonValue>;

    /// Classifies every row of the dataset.
    fn evaluate(&self, dataset: &Dataset) -> Result<RowEvaluation>;

    /// Type and parameters as reported in validation results.
    fn configuration(&self) -> ExpectationConfiguration {
        ExpectationConfiguration::new(self.expectation_type(), self.kwargs())
    }
}

/// Map-expectation success rule.
///
/// An empty domain succeeds. Otherwise the compliant fraction must reach
/// `mostly`, or every in-domain row must comply when `mostly` is unset.
pub fn calc_map_success(
    nonnull_count: usize,
    unexpected_count: usize,
    mostly: Option<f64>,
) -> bool {
    if nonnull_count == 0 {
        return true;
    }
    match mostly {
        Some(mostly) => {
            let compliant = nonnull_count.saturating_sub(unexpected_count);
            compliant as f64 / nonnull_count as f64 >= mostly
        }
        None => unexpected_count == 0,
    }
}

/// Rejects `mostly` outside `[0, 1]`.
pub(crate) fn validate_mostly(mostly: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&mostly) {
        return Err(TermError::Configuration(format!(
            "mostly must be between 0.0 and 1.0, got {mostly}"
        )));
    }
    Ok(mostly)
}

/// Collects column names, rejecting an empty list.
pub(crate) fn column_list<I, S>(columns: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
    if columns.is_empty() {
        return Err(TermError::Configuration(
            "At least one column must be specified".to_string(),
        ));
    }
    if columns.iter().any(|c| c.trim().is_empty()) {
        return Err(TermError::Configuration(
            "Column names must not be empty".to_string(),
        ));
    }
    Ok(columns)
}

/// Base kwargs for single-column expectations.
pub(crate) fn column_kwargs(column: &str, mostly: Option<f64>) -> Map<String, JsonValue> {
    let mut kwargs = Map::new();
    kwargs.insert("column".to_string(), JsonValue::from(column));
    if let Some(mostly) = mostly {
        kwargs.insert("mostly".to_string(), JsonValue::from(mostly));
    }
    kwargs
}

/// Evaluates a per-cell predicate over one column.
///
/// Missing cells are outside the domain; `is_unexpected` sees every other cell.
pub(crate) fn evaluate_cells<F>(
    dataset: &Dataset,
    column: &str,
    mut is_unexpected: F,
) -> Result<RowEvaluation>
where
    F: FnMut(&crate::core::Value) -> Result<bool>,
{
    let values = dataset.column_values(column)?;
    let mut evaluation = RowEvaluation {
        element_count: values.len(),
        ..RowEvaluation::default()
    };
    for (row, value) in values.iter().enumerate() {
        if value.is_missing() {
            continue;
        }
        evaluation.nonnull_count += 1;
        if is_unexpected(value)? {
            evaluation.unexpected_rows.push(row);
        }
    }
    Ok(evaluation)
}

/// Builds formatter evidence from an evaluation: unexpected values in row
/// order, shaped per [`MapExpectation::value_shape`], with aligned row
/// identifiers and row positions.
pub fn collect_evidence(
    expectation: &dyn MapExpectation,
    dataset: &Dataset,
    evaluation: &RowEvaluation,
) -> Result<UnexpectedEvidence> {
    let columns = expectation.columns();
    let mut values = Vec::with_capacity(evaluation.unexpected_count());
    let mut indices = Vec::with_capacity(evaluation.unexpected_count());

    for &row in &evaluation.unexpected_rows {
        let value = match expectation.value_shape() {
            ValueShape::Scalar => {
                let column = columns.first().ok_or_else(|| {
                    TermError::Internal(format!(
                        "{} declares no columns",
                        expectation.expectation_type()
                    ))
                })?;
                UnexpectedValue::Scalar(dataset.value(column, row)?)
            }
            ValueShape::Row => UnexpectedValue::Row(dataset.row_values(columns, row)?),
        };
        values.push(value);
        indices.push(dataset.row_index(row)?);
    }

    Ok(UnexpectedEvidence::new(
        evaluation.element_count,
        evaluation.nonnull_count,
        values,
        indices,
    )
    .with_positions(evaluation.unexpected_rows.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RowIndex, Value};
    use crate::test_fixtures::{compound_key_dataset, customers_dataset};

    #[test]
    fn test_success_without_mostly() {
        assert!(calc_map_success(5, 0, None));
        assert!(!calc_map_success(5, 1, None));
    }

    #[test]
    fn test_success_with_mostly() {
        assert!(calc_map_success(10, 2, Some(0.8)));
        assert!(!calc_map_success(10, 3, Some(0.8)));
        assert!(calc_map_success(10, 10, Some(0.0)));
    }

    #[test]
    fn test_empty_domain_succeeds() {
        assert!(calc_map_success(0, 0, None));
        assert!(calc_map_success(0, 0, Some(1.0)));
    }

    #[test]
    fn test_mostly_range() {
        assert_eq!(validate_mostly(0.5).unwrap(), 0.5);
        assert!(validate_mostly(1.5).is_err());
        assert!(validate_mostly(-0.1).is_err());
        assert!(validate_mostly(f64::NAN).is_err());
    }

    #[test]
    fn test_column_list_validation() {
        assert!(column_list(Vec::<String>::new()).is_err());
        assert!(column_list(vec![" "]).is_err());
        assert_eq!(column_list(vec!["a", "b"]).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_evaluate_cells_skips_missing() {
        let dataset = customers_dataset();
        let evaluation =
            evaluate_cells(&dataset, "score", |v| Ok(matches!(v, Value::Float(f) if *f > 100.0)))
                .unwrap();
        assert_eq!(evaluation.element_count, 10);
        // Two nulls and one NaN are outside the domain.
        assert_eq!(evaluation.nonnull_count, 7);
        assert_eq!(evaluation.unexpected_rows, vec![4]);
    }

    #[test]
    fn test_collect_evidence_uses_labels_and_shapes() {
        let dataset = customers_dataset();
        let expectation = ColumnValuesNotNull::new("email").unwrap();
        let evaluation = expectation.evaluate(&dataset).unwrap();
        let evidence = collect_evidence(&expectation, &dataset, &evaluation).unwrap();

        assert_eq!(evidence.unexpected_count, 2);
        assert_eq!(
            evidence.unexpected_index_list,
            vec![RowIndex::from("c-03"), RowIndex::from("c-06")]
        );
        assert_eq!(evidence.unexpected_positions, Some(vec![2, 5]));
        assert_eq!(
            evidence.unexpected_list,
            vec![
                UnexpectedValue::Scalar(Value::Null),
                UnexpectedValue::Scalar(Value::Null)
            ]
        );
        evidence.validate().unwrap();
    }

    #[test]
    fn test_collect_evidence_row_shape() {
        let dataset = compound_key_dataset();
        let expectation =
            CompoundColumnsUnique::new(vec!["foreign_key_1", "foreign_key_2"]).unwrap();
        let evaluation = expectation.evaluate(&dataset).unwrap();
        let evidence = collect_evidence(&expectation, &dataset, &evaluation).unwrap();

        assert_eq!(evidence.unexpected_count, 3);
        match &evidence.unexpected_list[0] {
            UnexpectedValue::Row(row) => {
                assert_eq!(row.columns(), &["foreign_key_1", "foreign_key_2"]);
                assert_eq!(row.get("foreign_key_2"), Some(&Value::Int(2)));
            }
            other => panic!("expected a row value, got {other:?}"),
        }
        assert_eq!(
            evidence.unexpected_index_list,
            vec![RowIndex::from(1i64), RowIndex::from(2i64), RowIndex::from(3i64)]
        );
    }

    #[test]
    fn test_default_configuration() {
        let expectation = ColumnValuesUnique::new("email").unwrap().with_mostly(0.9).unwrap();
        let config = expectation.configuration();
        assert_eq!(config.expectation_type, "expect_column_values_to_be_unique");
        assert_eq!(config.kwargs["column"], "email");
        assert_eq!(config.kwargs["mostly"], 0.9);
    }
}
