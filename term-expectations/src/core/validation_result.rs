//! Validation result types.

use super::map_output::{MapOutput, MapResultDetails};
use crate::prelude::*;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::error::Error as _;

/// The configuration an expectation was evaluated with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectationConfiguration {
    /// Snake-case expectation name, e.g. `expect_compound_columns_to_be_unique`.
    pub expectation_type: String,
    /// Expectation parameters.
    pub kwargs: Map<String, JsonValue>,
    /// Free-form metadata supplied by the caller.
    pub meta: Map<String, JsonValue>,
}

impl ExpectationConfiguration {
    /// Creates a configuration with empty metadata.
    pub fn new(expectation_type: impl Into<String>, kwargs: Map<String, JsonValue>) -> Self {
        Self {
            expectation_type: expectation_type.into(),
            kwargs,
            meta: Map::new(),
        }
    }

    /// Attaches a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// Whether evaluating an expectation raised an error that was caught.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExceptionInfo {
    pub raised_exception: bool,
    pub exception_traceback: Option<String>,
    pub exception_message: Option<String>,
}

impl ExceptionInfo {
    /// Records a caught error. The traceback is the error's source chain.
    pub fn from_error(err: &TermError) -> Self {
        let mut chain = vec![err.to_string()];
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        Self {
            raised_exception: true,
            exception_traceback: Some(chain.join("\n")),
            exception_message: Some(err.to_string()),
        }
    }
}

/// The outcome of validating one expectation against a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectationValidationResult {
    pub success: bool,
    pub expectation_config: ExpectationConfiguration,
    /// Serialized as `{}` when there are no details.
    #[serde(serialize_with = "serialize_details")]
    pub result: Option<MapResultDetails>,
    pub meta: Map<String, JsonValue>,
    pub exception_info: ExceptionInfo,
}

fn serialize_details<S: Serializer>(
    details: &Option<MapResultDetails>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match details {
        Some(details) => details.serialize(serializer),
        None => Map::new().serialize(serializer),
    }
}

impl ExpectationValidationResult {
    /// Wraps a formatted map output.
    pub fn from_map_output(config: ExpectationConfiguration, output: MapOutput) -> Self {
        Self {
            success: output.success,
            expectation_config: config,
            result: output.result,
            meta: Map::new(),
            exception_info: ExceptionInfo::default(),
        }
    }

    /// A failed result carrying a caught error.
    pub fn from_error(config: ExpectationConfiguration, err: &TermError) -> Self {
        Self {
            success: false,
            expectation_config: config,
            result: None,
            meta: Map::new(),
            exception_info: ExceptionInfo::from_error(err),
        }
    }

    /// Number of unexpected values, if the result carries details.
    pub fn unexpected_count(&self) -> Option<usize> {
        self.result.as_ref().map(|r| r.unexpected_count)
    }

    /// Renders the result as a JSON value.
    pub fn to_json_value(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Aggregate statistics over a suite run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteStatistics {
    pub evaluated_expectations: usize,
    pub successful_expectations: usize,
    pub unsuccessful_expectations: usize,
    /// `None` when nothing was evaluated.
    pub success_percent: Option<f64>,
}

impl SuiteStatistics {
    /// Computes statistics from individual results.
    pub fn from_results(results: &[ExpectationValidationResult]) -> Self {
        let evaluated = results.len();
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            evaluated_expectations: evaluated,
            successful_expectations: successful,
            unsuccessful_expectations: evaluated - successful,
            success_percent: if evaluated == 0 {
                None
            } else {
                Some(super::map_output::percent(successful, evaluated))
            },
        }
    }
}

/// The outcome of running an expectation suite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteValidationResult {
    pub suite_name: String,
    /// Timestamp of the run (RFC 3339).
    pub run_time: String,
    pub success: bool,
    pub statistics: SuiteStatistics,
    pub results: Vec<ExpectationValidationResult>,
}

impl SuiteValidationResult {
    /// Builds a suite result; the suite succeeds when every expectation does.
    pub fn new(suite_name: impl Into<String>, results: Vec<ExpectationValidationResult>) -> Self {
        Self {
            suite_name: suite_name.into(),
            run_time: chrono::Utc::now().to_rfc3339(),
            success: results.iter().all(|r| r.success),
            statistics: SuiteStatistics::from_results(&results),
            results,
        }
    }

    /// Results that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &ExpectationValidationResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Formats the result as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        use crate::formatters::{JsonFormatter, ResultFormatter};
        JsonFormatter::new().format(self)
    }

    /// Formats the result for console display.
    pub fn to_human(&self) -> Result<String> {
        use crate::formatters::{HumanFormatter, ResultFormatter};
        HumanFormatter::new().format(self)
    }
}
