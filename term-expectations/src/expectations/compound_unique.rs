//! Uniqueness of value combinations across several columns.

use super::{column_list, validate_mostly, MapExpectation, RowEvaluation, ValueShape};
use crate::core::{ScalarKey, Value};
use crate::dataset::Dataset;
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Which rows are left out of the uniqueness check because of missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreRowIf {
    /// Skip rows where every checked column is missing.
    #[default]
    AllValuesAreMissing,
    /// Skip rows where any checked column is missing.
    AnyValueIsMissing,
    /// Check every row; missing values compare equal to each other.
    Never,
}

impl IgnoreRowIf {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreRowIf::AllValuesAreMissing => "all_values_are_missing",
            IgnoreRowIf::AnyValueIsMissing => "any_value_is_missing",
            IgnoreRowIf::Never => "never",
        }
    }

    fn ignores(&self, values: &[Value]) -> bool {
        match self {
            IgnoreRowIf::AllValuesAreMissing => values.iter().all(Value::is_missing),
            IgnoreRowIf::AnyValueIsMissing => values.iter().any(Value::is_missing),
            IgnoreRowIf::Never => false,
        }
    }
}

impl fmt::Display for IgnoreRowIf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IgnoreRowIf {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all_values_are_missing" => Ok(IgnoreRowIf::AllValuesAreMissing),
            "any_value_is_missing" => Ok(IgnoreRowIf::AnyValueIsMissing),
            "never" => Ok(IgnoreRowIf::Never),
            other => Err(TermError::Configuration(format!(
                "unknown ignore_row_if option '{other}'"
            ))),
        }
    }
}

/// `expect_compound_columns_to_be_unique`: every row whose combination of
/// values occurs more than once is unexpected, including the first occurrence.
///
/// # Examples
///
/// ```rust
/// use term_expectations::expectations::{CompoundColumnsUnique, IgnoreRowIf};
///
/// let expectation = CompoundColumnsUnique::new(vec!["order_id", "line_no"])
///     .unwrap()
///     .with_ignore_row_if(IgnoreRowIf::AnyValueIsMissing);
/// assert!(CompoundColumnsUnique::new(Vec::<String>::new()).is_err());
/// # let _ = expectation;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundColumnsUnique {
    columns: Vec<String>,
    /// `None` until set explicitly; only explicit settings appear in kwargs.
    ignore_row_if: Option<IgnoreRowIf>,
    mostly: Option<f64>,
}

impl CompoundColumnsUnique {
    /// # Errors
    ///
    /// `Configuration` when no column (or an empty column name) is given.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            columns: column_list(columns)?,
            ignore_row_if: None,
            mostly: None,
        })
    }

    pub fn with_ignore_row_if(mut self, ignore_row_if: IgnoreRowIf) -> Self {
        self.ignore_row_if = Some(ignore_row_if);
        self
    }

    pub fn with_mostly(mut self, mostly: f64) -> Result<Self> {
        self.mostly = Some(validate_mostly(mostly)?);
        Ok(self)
    }

    pub fn ignore_row_if(&self) -> IgnoreRowIf {
        self.ignore_row_if.unwrap_or_default()
    }
}

impl MapExpectation for CompoundColumnsUnique {
    fn expectation_type(&self) -> &'static str {
        "expect_compound_columns_to_be_unique"
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn mostly(&self) -> Option<f64> {
        self.mostly
    }

    fn value_shape(&self) -> ValueShape {
        ValueShape::Row
    }

    fn kwargs(&self) -> Map<String, JsonValue> {
        let mut kwargs = Map::new();
        kwargs.insert(
            "column_list".to_string(),
            JsonValue::from(self.columns.clone()),
        );
        if let Some(ignore_row_if) = self.ignore_row_if {
            kwargs.insert(
                "ignore_row_if".to_string(),
                JsonValue::from(ignore_row_if.as_str()),
            );
        }
        if let Some(mostly) = self.mostly {
            kwargs.insert("mostly".to_string(), JsonValue::from(mostly));
        }
        kwargs
    }

    fn evaluate(&self, dataset: &Dataset) -> Result<RowEvaluation> {
        let columns = self
            .columns
            .iter()
            .map(|c| dataset.column_values(c))
            .collect::<Result<Vec<_>>>()?;
        let element_count = dataset.num_rows();
        let ignore_row_if = self.ignore_row_if();

        let mut keys: Vec<Option<Vec<ScalarKey>>> = Vec::with_capacity(element_count);
        let mut occurrences: HashMap<Vec<ScalarKey>, usize> = HashMap::new();
        for row in 0..element_count {
            let values: Vec<Value> = columns.iter().map(|col| col[row].clone()).collect();
            if ignore_row_if.ignores(&values) {
                keys.push(None);
                continue;
            }
            let key = values
                .iter()
                .map(ScalarKey::from_value)
                .collect::<Result<Vec<_>>>()?;
            *occurrences.entry(key.clone()).or_insert(0) += 1;
            keys.push(Some(key));
        }

        let nonnull_count = keys.iter().filter(|k| k.is_some()).count();
        let unexpected_rows = keys
            .iter()
            .enumerate()
            .filter_map(|(row, key)| {
                let key = key.as_ref()?;
                (occurrences.get(key).copied().unwrap_or(0) > 1).then_some(row)
            })
            .collect();

        Ok(RowEvaluation {
            element_count,
            nonnull_count,
            unexpected_rows,
        })
    }
}
