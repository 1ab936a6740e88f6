//! Result format policy: how much unexpected-value evidence a result carries.

use crate::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Default maximum number of sample values kept in `partial_*` fields.
pub const DEFAULT_PARTIAL_UNEXPECTED_COUNT: usize = 20;

/// Verbosity level of a map-expectation result.
///
/// Levels are ordered by increasing detail, and every level includes all the
/// fields of the levels below it.
///
/// ```rust
/// use term_expectations::core::ResultFormatLevel;
///
/// assert!(ResultFormatLevel::Complete > ResultFormatLevel::Summary);
/// assert!(ResultFormatLevel::Basic.is_at_least(ResultFormatLevel::Basic));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultFormatLevel {
    /// Only the `success` flag.
    BooleanOnly = 0,
    /// Counts, percentages and a truncated sample of unexpected values.
    #[default]
    Basic = 1,
    /// Basic plus truncated row identifiers and a value histogram.
    Summary = 2,
    /// Everything, untruncated.
    Complete = 3,
}

impl ResultFormatLevel {
    /// Returns the canonical upper-case name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultFormatLevel::BooleanOnly => "BOOLEAN_ONLY",
            ResultFormatLevel::Basic => "BASIC",
            ResultFormatLevel::Summary => "SUMMARY",
            ResultFormatLevel::Complete => "COMPLETE",
        }
    }

    /// Checks if this level is at least as detailed as another level.
    pub fn is_at_least(&self, other: ResultFormatLevel) -> bool {
        *self >= other
    }
}

impl fmt::Display for ResultFormatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResultFormatLevel {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BOOLEAN_ONLY" => Ok(ResultFormatLevel::BooleanOnly),
            "BASIC" => Ok(ResultFormatLevel::Basic),
            "SUMMARY" => Ok(ResultFormatLevel::Summary),
            "COMPLETE" => Ok(ResultFormatLevel::Complete),
            other => Err(TermError::Configuration(format!(
                "unknown result format '{other}', expected one of \
                 BOOLEAN_ONLY, BASIC, SUMMARY, COMPLETE"
            ))),
        }
    }
}

/// A validated result format policy.
///
/// Construct it with [`ResultFormat::builder`] or one of the level shortcuts;
/// every constructor goes through the same validation.
///
/// # Examples
///
/// ```rust
/// use term_expectations::core::{ResultFormat, ResultFormatLevel};
///
/// let format = ResultFormat::builder(ResultFormatLevel::Complete)
///     .partial_unexpected_count(5)
///     .include_unexpected_rows(true)
///     .build()
///     .unwrap();
/// assert_eq!(format.partial_unexpected_count(), 5);
///
/// // Rows can only be rendered at COMPLETE.
/// assert!(ResultFormat::builder(ResultFormatLevel::Basic)
///     .include_unexpected_rows(true)
///     .build()
///     .is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultFormat {
    level: ResultFormatLevel,
    partial_unexpected_count: usize,
    include_unexpected_rows: bool,
}

impl ResultFormat {
    /// Starts building a result format at the given level.
    pub fn builder(level: ResultFormatLevel) -> ResultFormatBuilder {
        ResultFormatBuilder {
            level,
            partial_unexpected_count: DEFAULT_PARTIAL_UNEXPECTED_COUNT,
            include_unexpected_rows: false,
        }
    }

    /// A format with default options at the given level.
    pub fn with_level(level: ResultFormatLevel) -> Self {
        Self {
            level,
            partial_unexpected_count: DEFAULT_PARTIAL_UNEXPECTED_COUNT,
            include_unexpected_rows: false,
        }
    }

    /// `BOOLEAN_ONLY` with default options.
    pub fn boolean_only() -> Self {
        Self::with_level(ResultFormatLevel::BooleanOnly)
    }

    /// `BASIC` with default options.
    pub fn basic() -> Self {
        Self::with_level(ResultFormatLevel::Basic)
    }

    /// `SUMMARY` with default options.
    pub fn summary() -> Self {
        Self::with_level(ResultFormatLevel::Summary)
    }

    /// `COMPLETE` with default options.
    pub fn complete() -> Self {
        Self::with_level(ResultFormatLevel::Complete)
    }

    /// The verbosity level.
    pub fn level(&self) -> ResultFormatLevel {
        self.level
    }

    /// Maximum number of entries in `partial_*` fields below `COMPLETE`.
    pub fn partial_unexpected_count(&self) -> usize {
        self.partial_unexpected_count
    }

    /// Whether `COMPLETE` results render the full unexpected rows.
    pub fn include_unexpected_rows(&self) -> bool {
        self.include_unexpected_rows
    }

    /// The truncation limit applied to partial fields, `None` at `COMPLETE`.
    pub fn partial_limit(&self) -> Option<usize> {
        if self.level == ResultFormatLevel::Complete {
            None
        } else {
            Some(self.partial_unexpected_count)
        }
    }
}

impl Default for ResultFormat {
    fn default() -> Self {
        Self::basic()
    }
}

impl fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (partial_unexpected_count={}, include_unexpected_rows={})",
            self.level, self.partial_unexpected_count, self.include_unexpected_rows
        )
    }
}

impl FromStr for ResultFormat {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self> {
        ResultFormatLevel::from_str(s).map(Self::with_level)
    }
}

/// Builder for [`ResultFormat`].
#[derive(Debug, Clone)]
pub struct ResultFormatBuilder {
    level: ResultFormatLevel,
    partial_unexpected_count: usize,
    include_unexpected_rows: bool,
}

impl ResultFormatBuilder {
    /// Sets the maximum number of sample entries in partial fields.
    pub fn partial_unexpected_count(mut self, count: usize) -> Self {
        self.partial_unexpected_count = count;
        self
    }

    /// Sets whether full unexpected rows are rendered.
    pub fn include_unexpected_rows(mut self, include: bool) -> Self {
        self.include_unexpected_rows = include;
        self
    }

    /// Validates the options and builds the format.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Configuration`] when `include_unexpected_rows` is
    /// requested below `COMPLETE`.
    pub fn build(self) -> Result<ResultFormat> {
        if self.include_unexpected_rows && self.level != ResultFormatLevel::Complete {
            return Err(TermError::Configuration(format!(
                "include_unexpected_rows requires result format COMPLETE, got {}",
                self.level
            )));
        }
        Ok(ResultFormat {
            level: self.level,
            partial_unexpected_count: self.partial_unexpected_count,
            include_unexpected_rows: self.include_unexpected_rows,
        })
    }
}

/// Wire form of a result format: a bare level or an options object.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ResultFormatRepr {
    Level(ResultFormatLevel),
    Options {
        result_format: ResultFormatLevel,
        #[serde(default = "default_partial_unexpected_count")]
        partial_unexpected_count: usize,
        #[serde(default)]
        include_unexpected_rows: bool,
    },
}

fn default_partial_unexpected_count() -> usize {
    DEFAULT_PARTIAL_UNEXPECTED_COUNT
}

impl TryFrom<ResultFormatRepr> for ResultFormat {
    type Error = TermError;

    fn try_from(repr: ResultFormatRepr) -> Result<Self> {
        match repr {
            ResultFormatRepr::Level(level) => Ok(Self::with_level(level)),
            ResultFormatRepr::Options {
                result_format,
                partial_unexpected_count,
                include_unexpected_rows,
            } => ResultFormat::builder(result_format)
                .partial_unexpected_count(partial_unexpected_count)
                .include_unexpected_rows(include_unexpected_rows)
                .build(),
        }
    }
}

impl Serialize for ResultFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ResultFormatRepr::Options {
            result_format: self.level,
            partial_unexpected_count: self.partial_unexpected_count,
            include_unexpected_rows: self.include_unexpected_rows,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResultFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = ResultFormatRepr::deserialize(deserializer)?;
        ResultFormat::try_from(repr).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(ResultFormatLevel::Complete > ResultFormatLevel::Summary);
        assert!(ResultFormatLevel::Summary > ResultFormatLevel::Basic);
        assert!(ResultFormatLevel::Basic > ResultFormatLevel::BooleanOnly);
        assert!(!ResultFormatLevel::Basic.is_at_least(ResultFormatLevel::Summary));
    }

    #[test]
    fn test_level_from_str_is_case_insensitive() {
        assert_eq!(
            "summary".parse::<ResultFormatLevel>().unwrap(),
            ResultFormatLevel::Summary
        );
        assert_eq!(
            " BOOLEAN_ONLY ".parse::<ResultFormatLevel>().unwrap(),
            ResultFormatLevel::BooleanOnly
        );
        let err = "VERBOSE".parse::<ResultFormatLevel>().unwrap_err();
        assert!(err.to_string().contains("unknown result format 'VERBOSE'"));
    }

    #[test]
    fn test_defaults() {
        let format = ResultFormat::default();
        assert_eq!(format.level(), ResultFormatLevel::Basic);
        assert_eq!(format.partial_unexpected_count(), 20);
        assert!(!format.include_unexpected_rows());
        assert_eq!(format.partial_limit(), Some(20));
        assert_eq!(ResultFormat::complete().partial_limit(), None);
    }

    #[test]
    fn test_include_rows_requires_complete() {
        for level in [
            ResultFormatLevel::BooleanOnly,
            ResultFormatLevel::Basic,
            ResultFormatLevel::Summary,
        ] {
            let result = ResultFormat::builder(level)
                .include_unexpected_rows(true)
                .build();
            assert!(matches!(result, Err(TermError::Configuration(_))));
        }
        assert!(ResultFormat::builder(ResultFormatLevel::Complete)
            .include_unexpected_rows(true)
            .build()
            .is_ok());
    }

    #[test]
    fn test_deserialize_bare_level() {
        let format: ResultFormat = serde_json::from_str("\"SUMMARY\"").unwrap();
        assert_eq!(format, ResultFormat::summary());
    }

    #[test]
    fn test_deserialize_options_object() {
        let format: ResultFormat = serde_json::from_value(serde_json::json!({
            "result_format": "COMPLETE",
            "partial_unexpected_count": 20,
            "include_unexpected_rows": false
        }))
        .unwrap();
        assert_eq!(format.level(), ResultFormatLevel::Complete);
        assert_eq!(format.partial_unexpected_count(), 20);

        let format: ResultFormat =
            serde_json::from_str(r#"{"result_format": "BASIC", "partial_unexpected_count": 3}"#)
                .unwrap();
        assert_eq!(format.partial_unexpected_count(), 3);
    }

    #[test]
    fn test_deserialize_rejects_invalid_options() {
        let err = serde_json::from_str::<ResultFormat>(
            r#"{"result_format": "BASIC", "include_unexpected_rows": true}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("include_unexpected_rows"));

        assert!(serde_json::from_str::<ResultFormat>(
            r#"{"result_format": "SUMMARY", "partial_unexpected_count": -1}"#
        )
        .is_err());
        assert!(serde_json::from_str::<ResultFormat>("\"VERBOSE\"").is_err());
    }

    #[test]
    fn test_serialize_round_trips_through_options_object() {
        let format = ResultFormat::builder(ResultFormatLevel::Summary)
            .partial_unexpected_count(7)
            .build()
            .unwrap();
        let json = serde_json::to_value(format).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "result_format": "SUMMARY",
                "partial_unexpected_count": 7,
                "include_unexpected_rows": false
            })
        );
    }
}
