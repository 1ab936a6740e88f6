//! Single-column uniqueness.

use super::{column_kwargs, column_list, validate_mostly, MapExpectation, RowEvaluation, ValueShape};
use crate::core::ScalarKey;
use crate::dataset::Dataset;
use crate::prelude::*;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

/// `expect_column_values_to_be_unique`: non-missing values occurring more than
/// once are unexpected, at every occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValuesUnique {
    columns: Vec<String>,
    mostly: Option<f64>,
}

impl ColumnValuesUnique {
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

impl MapExpectation for ColumnValuesUnique {
    fn expectation_type(&self) -> &'static str {
        "expect_column_values_to_be_unique"
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

        let mut keys = Vec::with_capacity(values.len());
        let mut occurrences: HashMap<ScalarKey, usize> = HashMap::new();
        for value in &values {
            if value.is_missing() {
                keys.push(None);
                continue;
            }
            let key = ScalarKey::from_value(value)?;
            *occurrences.entry(key.clone()).or_insert(0) += 1;
            keys.push(Some(key));
        }

        Ok(RowEvaluation {
            element_count: values.len(),
            nonnull_count: keys.iter().filter(|k| k.is_some()).count(),
            unexpected_rows: keys
                .iter()
                .enumerate()
                .filter_map(|(row, key)| {
                    let count = occurrences.get(key.as_ref()?).copied().unwrap_or(0);
                    (count > 1).then_some(row)
                })
                .collect(),
        })
    }
}
