//! Map-expectation result formatting.
//!
//! [`MapOutputFormatter`] turns the raw evidence of a map expectation (counts,
//! the ordered unexpected values and their row identifiers) into a bounded,
//! deterministic [`MapOutput`] whose shape is controlled by a [`ResultFormat`].
//! Formatting is pure: no I/O, no logging, no shared state.

use super::aggregate::{aggregate_unexpected, ValueCount};
use super::result_format::{ResultFormat, ResultFormatLevel};
use super::value::{RowIndex, RowValue, UnexpectedValue};
use crate::prelude::*;
use serde::Serialize;

/// Renders the full row behind a row identifier.
///
/// Used for `include_unexpected_rows`; the formatter itself never looks at the
/// dataset.
pub trait RowRenderer {
    /// Returns every column of the row identified by `index`.
    fn render_row(&self, index: &RowIndex) -> Result<RowValue>;

    /// Returns every column of the row at a zero-based position.
    ///
    /// Used instead of [`RowRenderer::render_row`] when the evidence carries
    /// row positions, since labels need not be unique.
    fn render_row_at(&self, position: usize) -> Result<RowValue> {
        Err(TermError::NotSupported(format!("rendering row {position} by position")))
    }
}

/// Raw evidence collected by a map expectation.
#[derive(Debug, Clone, PartialEq)]
pub struct UnexpectedEvidence {
    /// Total number of rows considered, including missing ones.
    pub element_count: usize,
    /// Rows with a non-missing value for the checked column(s).
    pub nonnull_count: usize,
    /// Number of rows that violated the expectation.
    pub unexpected_count: usize,
    /// Unexpected values in row order.
    pub unexpected_list: Vec<UnexpectedValue>,
    /// Row identifiers aligned with `unexpected_list`.
    pub unexpected_index_list: Vec<RowIndex>,
    /// Zero-based row positions aligned with `unexpected_list`, when known.
    pub unexpected_positions: Option<Vec<usize>>,
}

impl UnexpectedEvidence {
    /// Creates evidence whose unexpected count is the length of the value list.
    pub fn new(
        element_count: usize,
        nonnull_count: usize,
        unexpected_list: Vec<UnexpectedValue>,
        unexpected_index_list: Vec<RowIndex>,
    ) -> Self {
        Self {
            element_count,
            nonnull_count,
            unexpected_count: unexpected_list.len(),
            unexpected_list,
            unexpected_index_list,
            unexpected_positions: None,
        }
    }

    /// Attaches the row positions behind `unexpected_index_list`.
    pub fn with_positions(mut self, positions: Vec<usize>) -> Self {
        self.unexpected_positions = Some(positions);
        self
    }

    /// Overrides the declared unexpected count.
    pub fn with_unexpected_count(mut self, unexpected_count: usize) -> Self {
        self.unexpected_count = unexpected_count;
        self
    }

    /// Checks the count and length invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::InvariantViolation`] describing the first broken
    /// invariant.
    pub fn validate(&self) -> Result<()> {
        if self.unexpected_list.len() != self.unexpected_count {
            return Err(TermError::invariant_violation(format!(
                "unexpected_count is {} but unexpected_list has {} entries",
                self.unexpected_count,
                self.unexpected_list.len()
            )));
        }
        if self.unexpected_index_list.len() != self.unexpected_count {
            return Err(TermError::invariant_violation(format!(
                "unexpected_count is {} but unexpected_index_list has {} entries",
                self.unexpected_count,
                self.unexpected_index_list.len()
            )));
        }
        if let Some(positions) = &self.unexpected_positions {
            if positions.len() != self.unexpected_count {
                return Err(TermError::invariant_violation(format!(
                    "unexpected_count is {} but unexpected_positions has {} entries",
                    self.unexpected_count,
                    positions.len()
                )));
            }
        }
        if self.nonnull_count > self.element_count {
            return Err(TermError::invariant_violation(format!(
                "nonnull_count {} exceeds element_count {}",
                self.nonnull_count, self.element_count
            )));
        }
        if self.unexpected_count > self.nonnull_count {
            return Err(TermError::invariant_violation(format!(
                "unexpected_count {} exceeds nonnull_count {}",
                self.unexpected_count, self.nonnull_count
            )));
        }
        Ok(())
    }
}

/// Detail fields of a map-expectation result.
///
/// Fields that a level does not include are `None` and are omitted when
/// serialized; fields a level does include are always present, even if empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapResultDetails {
    pub element_count: usize,
    pub missing_count: usize,
    pub missing_percent: f64,
    pub unexpected_count: usize,
    /// Same as `unexpected_percent_nonmissing`.
    pub unexpected_percent: f64,
    pub unexpected_percent_total: f64,
    pub unexpected_percent_nonmissing: f64,
    pub partial_unexpected_list: Vec<UnexpectedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_unexpected_index_list: Option<Vec<RowIndex>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_unexpected_counts: Option<Vec<ValueCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unexpected_list: Option<Vec<UnexpectedValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unexpected_index_list: Option<Vec<RowIndex>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unexpected_rows: Option<Vec<RowValue>>,
}

/// The formatted output of one map-expectation evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapOutput {
    pub success: bool,
    /// Absent at `BOOLEAN_ONLY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MapResultDetails>,
}

impl MapOutput {
    /// Renders the output as a JSON value.
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// `100 * numerator / denominator`, or 0.0 for an empty denominator.
///
/// The multiplication is exact for any realistic count, so the division is
/// the only rounding step.
pub fn percent(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        (numerator as f64 * 100.0) / denominator as f64
    }
}

/// Formats map-expectation evidence according to a [`ResultFormat`].
///
/// # Examples
///
/// ```rust
/// use term_expectations::core::{
///     MapOutputFormatter, ResultFormat, RowIndex, RowValue, UnexpectedEvidence, Value,
/// };
///
/// let row = RowValue::from_pairs([("foreign_key_1", 1), ("foreign_key_2", 2)]).unwrap();
/// let evidence = UnexpectedEvidence::new(
///     5,
///     5,
///     vec![row.clone().into(), row.clone().into(), row.into()],
///     vec![RowIndex::from(1), RowIndex::from(2), RowIndex::from(3)],
/// );
///
/// let output = MapOutputFormatter::new(ResultFormat::complete())
///     .format(false, &evidence)
///     .unwrap();
/// let details = output.result.unwrap();
/// assert_eq!(details.unexpected_percent, 60.0);
/// assert_eq!(details.partial_unexpected_counts.unwrap()[0].count, 3);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MapOutputFormatter {
    format: ResultFormat,
}

impl MapOutputFormatter {
    /// Creates a formatter for the given policy.
    pub fn new(format: ResultFormat) -> Self {
        Self { format }
    }

    /// The policy this formatter applies.
    pub fn result_format(&self) -> &ResultFormat {
        &self.format
    }

    /// Formats evidence without row rendering.
    ///
    /// # Errors
    ///
    /// [`TermError::InvariantViolation`] on inconsistent evidence,
    /// [`TermError::Normalization`] if the histogram cannot be built, and
    /// [`TermError::Configuration`] if the policy asks for unexpected rows,
    /// which need [`MapOutputFormatter::format_with_rows`].
    pub fn format(&self, success: bool, evidence: &UnexpectedEvidence) -> Result<MapOutput> {
        self.format_with_rows(success, evidence, None)
    }

    /// Formats evidence, rendering full rows through `renderer` when the
    /// policy includes unexpected rows.
    pub fn format_with_rows(
        &self,
        success: bool,
        evidence: &UnexpectedEvidence,
        renderer: Option<&dyn RowRenderer>,
    ) -> Result<MapOutput> {
        evidence.validate()?;

        let level = self.format.level();
        if level == ResultFormatLevel::BooleanOnly {
            return Ok(MapOutput {
                success,
                result: None,
            });
        }

        let limit = self.format.partial_limit();
        let missing_count = evidence.element_count - evidence.nonnull_count;
        let unexpected_percent_nonmissing =
            percent(evidence.unexpected_count, evidence.nonnull_count);

        let mut details = MapResultDetails {
            element_count: evidence.element_count,
            missing_count,
            missing_percent: percent(missing_count, evidence.element_count),
            unexpected_count: evidence.unexpected_count,
            unexpected_percent: unexpected_percent_nonmissing,
            unexpected_percent_total: percent(evidence.unexpected_count, evidence.element_count),
            unexpected_percent_nonmissing,
            partial_unexpected_list: truncated(&evidence.unexpected_list, limit),
            partial_unexpected_index_list: None,
            partial_unexpected_counts: None,
            unexpected_list: None,
            unexpected_index_list: None,
            unexpected_rows: None,
        };

        if level.is_at_least(ResultFormatLevel::Summary) {
            details.partial_unexpected_index_list =
                Some(truncated(&evidence.unexpected_index_list, limit));
            details.partial_unexpected_counts =
                Some(aggregate_unexpected(&evidence.unexpected_list, limit)?);
        }

        if level == ResultFormatLevel::Complete {
            details.unexpected_list = Some(evidence.unexpected_list.clone());
            details.unexpected_index_list = Some(evidence.unexpected_index_list.clone());

            if self.format.include_unexpected_rows() {
                let renderer = renderer.ok_or_else(|| {
                    TermError::Configuration(
                        "include_unexpected_rows is set but no row renderer was supplied"
                            .to_string(),
                    )
                })?;
                let rows = match &evidence.unexpected_positions {
                    Some(positions) => positions
                        .iter()
                        .map(|&position| renderer.render_row_at(position))
                        .collect::<Result<Vec<_>>>()?,
                    None => evidence
                        .unexpected_index_list
                        .iter()
                        .map(|index| renderer.render_row(index))
                        .collect::<Result<Vec<_>>>()?,
                };
                details.unexpected_rows = Some(rows);
            }
        }

        Ok(MapOutput {
            success,
            result: Some(details),
        })
    }
}

fn truncated<T: Clone>(items: &[T], limit: Option<usize>) -> Vec<T> {
    match limit {
        Some(n) => items.iter().take(n).cloned().collect(),
        None => items.to_vec(),
    }
}
