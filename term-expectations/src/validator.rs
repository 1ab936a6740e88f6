//! Runs map expectations against a dataset and assembles validation results.
//!
//! # Examples
//!
//! ```rust
//! use arrow::array::{ArrayRef, Int64Array};
//! use std::sync::Arc;
//! use term_expectations::prelude::*;
//! use term_expectations::expectations::ColumnValuesUnique;
//!
//! let dataset = Dataset::from_columns(vec![(
//!     "id",
//!     Arc::new(Int64Array::from(vec![1, 2, 2])) as ArrayRef,
//! )])
//! .unwrap();
//!
//! let suite = ExpectationSuite::builder("ids")
//!     .expectation(ColumnValuesUnique::new("id").unwrap())
//!     .build();
//!
//! let result = Validator::new(dataset).run_suite(&suite).unwrap();
//! assert!(!result.success);
//! assert_eq!(result.results[0].unexpected_count(), Some(2));
//! ```

use crate::core::{
    ExpectationValidationResult, MapOutput, MapOutputFormatter, ResultFormat, RowRenderer,
    SuiteValidationResult,
};
use crate::dataset::Dataset;
use crate::expectations::{calc_map_success, collect_evidence, MapExpectation};
use crate::logging::truncate_field;
use crate::prelude::*;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Number of unexpected values included in the debug sample.
const LOGGED_VALUE_SAMPLE: usize = 5;

/// How a [`Validator`] evaluates and reports expectations.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorConfig {
    /// Result format used when an expectation has no override.
    pub result_format: ResultFormat,
    /// Turn evaluation errors into failed results instead of returning them.
    pub catch_exceptions: bool,
    /// Batch identifier recorded in every expectation's kwargs; an empty
    /// list is recorded when unset.
    pub batch_id: Option<String>,
    /// Logging detail.
    pub log: LogConfig,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            result_format: ResultFormat::default(),
            catch_exceptions: false,
            batch_id: None,
            log: LogConfig::default(),
        }
    }
}

impl ValidatorConfig {
    /// Summary results with caught exceptions, for unattended runs.
    pub fn lenient() -> Self {
        Self {
            result_format: ResultFormat::summary(),
            catch_exceptions: true,
            ..Self::default()
        }
    }

    /// Complete results with verbose logging.
    pub fn debug() -> Self {
        Self {
            result_format: ResultFormat::complete(),
            log: LogConfig::verbose(),
            ..Self::default()
        }
    }

    pub fn with_result_format(mut self, result_format: ResultFormat) -> Self {
        self.result_format = result_format;
        self
    }

    pub fn with_catch_exceptions(mut self, catch_exceptions: bool) -> Self {
        self.catch_exceptions = catch_exceptions;
        self
    }

    pub fn with_batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

/// An expectation plus an optional result format override.
#[derive(Debug, Clone)]
pub struct SuiteEntry {
    pub expectation: Arc<dyn MapExpectation>,
    pub result_format: Option<ResultFormat>,
}

/// A named, ordered collection of expectations.
#[derive(Debug, Clone)]
pub struct ExpectationSuite {
    name: String,
    description: Option<String>,
    entries: Vec<SuiteEntry>,
}

impl ExpectationSuite {
    pub fn builder(name: impl Into<String>) -> ExpectationSuiteBuilder {
        ExpectationSuiteBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn entries(&self) -> &[SuiteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`ExpectationSuite`].
#[derive(Debug)]
pub struct ExpectationSuiteBuilder {
    name: String,
    description: Option<String>,
    entries: Vec<SuiteEntry>,
}

impl ExpectationSuiteBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            entries: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an expectation reported with the validator's result format.
    pub fn expectation(mut self, expectation: impl MapExpectation + 'static) -> Self {
        self.entries.push(SuiteEntry {
            expectation: Arc::new(expectation),
            result_format: None,
        });
        self
    }

    /// Adds an expectation with its own result format.
    pub fn expectation_with_format(
        mut self,
        expectation: impl MapExpectation + 'static,
        result_format: ResultFormat,
    ) -> Self {
        self.entries.push(SuiteEntry {
            expectation: Arc::new(expectation),
            result_format: Some(result_format),
        });
        self
    }

    pub fn build(self) -> ExpectationSuite {
        ExpectationSuite {
            name: self.name,
            description: self.description,
            entries: self.entries,
        }
    }
}

/// Evaluates expectations against one dataset.
#[derive(Debug, Clone)]
pub struct Validator {
    dataset: Dataset,
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(dataset: Dataset) -> Self {
        Self::with_config(dataset, ValidatorConfig::default())
    }

    pub fn with_config(dataset: Dataset, config: ValidatorConfig) -> Self {
        Self { dataset, config }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validates with the configured result format.
    pub fn validate(
        &self,
        expectation: &dyn MapExpectation,
    ) -> Result<ExpectationValidationResult> {
        let format = self.config.result_format;
        self.validate_with_format(expectation, &format)
    }

    /// Validates with an explicit result format.
    ///
    /// # Errors
    ///
    /// Evaluation and formatting errors, unless `catch_exceptions` is set, in
    /// which case they become a failed result carrying `exception_info`.
    #[instrument(skip(self, expectation, format), fields(
        expectation_type = expectation.expectation_type(),
        columns = ?expectation.columns(),
        result_format = %format.level()
    ))]
    pub fn validate_with_format(
        &self,
        expectation: &dyn MapExpectation,
        format: &ResultFormat,
    ) -> Result<ExpectationValidationResult> {
        let mut configuration = expectation.configuration();
        let batch_id = match &self.config.batch_id {
            Some(batch_id) => JsonValue::from(batch_id.as_str()),
            None => JsonValue::Array(Vec::new()),
        };
        configuration.kwargs.insert("batch_id".to_string(), batch_id);

        match self.evaluate(expectation, format) {
            Ok(output) => {
                info!(
                    expectation_type = expectation.expectation_type(),
                    success = output.success,
                    unexpected_count = output.result.as_ref().map(|r| r.unexpected_count),
                    "Expectation evaluated"
                );
                Ok(ExpectationValidationResult::from_map_output(
                    configuration,
                    output,
                ))
            }
            Err(err) if self.config.catch_exceptions => {
                warn!(
                    expectation_type = expectation.expectation_type(),
                    error = %err,
                    "Expectation raised an error; recording it in the result"
                );
                Ok(ExpectationValidationResult::from_error(configuration, &err))
            }
            Err(err) => {
                error!(
                    expectation_type = expectation.expectation_type(),
                    error = %err,
                    "Expectation evaluation failed"
                );
                Err(err)
            }
        }
    }

    fn evaluate(
        &self,
        expectation: &dyn MapExpectation,
        format: &ResultFormat,
    ) -> Result<MapOutput> {
        let start = Instant::now();
        let evaluation = expectation.evaluate(&self.dataset)?;
        let success = calc_map_success(
            evaluation.nonnull_count,
            evaluation.unexpected_count(),
            expectation.mostly(),
        );

        crate::log_expectation!(
            self.config.log,
            expectation_type = expectation.expectation_type(),
            element_count = evaluation.element_count,
            nonnull_count = evaluation.nonnull_count,
            unexpected_count = evaluation.unexpected_count(),
            mostly = ?expectation.mostly(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Rows classified"
        );

        let evidence = collect_evidence(expectation, &self.dataset, &evaluation)?;

        if self.config.log.log_unexpected_values && !evidence.unexpected_list.is_empty() {
            let sample = evidence
                .unexpected_list
                .iter()
                .take(LOGGED_VALUE_SAMPLE)
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            debug!(
                expectation_type = expectation.expectation_type(),
                sample = %truncate_field(&sample, self.config.log.max_field_length),
                "Unexpected value sample"
            );
        }

        MapOutputFormatter::new(*format).format_with_rows(
            success,
            &evidence,
            Some(&self.dataset as &dyn RowRenderer),
        )
    }

    /// Validates every expectation of a suite, in order.
    #[instrument(
        skip(self, suite),
        fields(suite.name = %suite.name(), suite.expectations = suite.len())
    )]
    pub fn run_suite(&self, suite: &ExpectationSuite) -> Result<SuiteValidationResult> {
        info!(
            suite.name = %suite.name(),
            suite.expectations = suite.len(),
            dataset.rows = self.dataset.num_rows(),
            "Starting expectation suite"
        );
        let start = Instant::now();

        let results = suite
            .entries()
            .iter()
            .map(|entry| {
                let format = entry.result_format.unwrap_or(self.config.result_format);
                crate::perf_debug!(
                    self.config.log,
                    expectation_type = entry.expectation.expectation_type(),
                    result_format = %format.level(),
                    overridden = entry.result_format.is_some(),
                    "Running expectation"
                );
                self.validate_with_format(entry.expectation.as_ref(), &format)
            })
            .collect::<Result<Vec<_>>>()?;

        let result = SuiteValidationResult::new(suite.name(), results);
        info!(
            suite.name = %suite.name(),
            suite.success = result.success,
            statistics.successful = result.statistics.successful_expectations,
            statistics.unsuccessful = result.statistics.unsuccessful_expectations,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Expectation suite completed"
        );
        Ok(result)
    }
}
