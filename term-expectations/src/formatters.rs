//! Report formatting for suite validation results.
//!
//! Formatters turn a [`SuiteValidationResult`] into JSON for tooling, a
//! console summary for people, or Markdown for reports.
//!
//! # Examples
//!
//! ```rust
//! use term_expectations::core::SuiteValidationResult;
//! use term_expectations::formatters::{FormatterConfig, HumanFormatter, ResultFormatter};
//!
//! let result = SuiteValidationResult::new("empty", vec![]);
//! let output = HumanFormatter::with_config(FormatterConfig::minimal())
//!     .format(&result)
//!     .unwrap();
//! assert!(output.contains("Validation PASSED"));
//! ```

use crate::core::{ExpectationValidationResult, SuiteValidationResult};
use crate::prelude::*;
use serde_json::Value as JsonValue;
use std::fmt::Write;

/// Options shared by all formatters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterConfig {
    /// Include suite statistics
    pub include_statistics: bool,
    /// Include one entry per expectation
    pub include_results: bool,
    /// Only list expectations that did not succeed
    pub failures_only: bool,
    /// Maximum number of expectation entries (`None` for all)
    pub max_results: Option<usize>,
    /// Maximum number of histogram entries shown per expectation
    pub max_values: usize,
    /// Use ANSI colors (human formatter)
    pub use_colors: bool,
    /// Include the run timestamp
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_statistics: true,
            include_results: true,
            failures_only: false,
            max_results: None,
            max_values: 5,
            use_colors: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Statistics only.
    pub fn minimal() -> Self {
        Self {
            include_statistics: true,
            include_results: false,
            failures_only: false,
            max_results: Some(0),
            max_values: 0,
            use_colors: false,
            include_timestamps: false,
        }
    }

    /// Plain output with bounded length for CI logs.
    pub fn ci() -> Self {
        Self {
            include_statistics: true,
            include_results: true,
            failures_only: true,
            max_results: Some(50),
            max_values: 10,
            use_colors: false,
            include_timestamps: true,
        }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn with_max_values(mut self, max: usize) -> Self {
        self.max_values = max;
        self
    }

    pub fn with_max_results(mut self, max: Option<usize>) -> Self {
        self.max_results = max;
        self
    }

    pub fn with_failures_only(mut self, failures_only: bool) -> Self {
        self.failures_only = failures_only;
        self
    }

    fn selected<'a>(
        &self,
        result: &'a SuiteValidationResult,
    ) -> Vec<&'a ExpectationValidationResult> {
        let limit = self.max_results.unwrap_or(usize::MAX);
        result
            .results
            .iter()
            .filter(|r| !self.failures_only || !r.success)
            .take(limit)
            .collect()
    }
}

/// Converts a suite result into a textual representation.
///
/// # Examples
///
/// ```rust
/// use term_expectations::core::SuiteValidationResult;
/// use term_expectations::formatters::ResultFormatter;
///
/// struct OneLine;
///
/// impl ResultFormatter for OneLine {
///     fn format(
///         &self,
///         result: &SuiteValidationResult,
///     ) -> term_expectations::prelude::Result<String> {
///         Ok(format!("{}: {}", result.suite_name, result.success))
///     }
/// }
///
/// let line = OneLine.format(&SuiteValidationResult::new("orders", vec![])).unwrap();
/// assert_eq!(line, "orders: true");
/// ```
pub trait ResultFormatter {
    /// Formats a suite result.
    fn format(&self, result: &SuiteValidationResult) -> Result<String>;

    /// Formats a suite result with explicit options.
    fn format_with_config(
        &self,
        result: &SuiteValidationResult,
        _config: &FormatterConfig,
    ) -> Result<String> {
        self.format(result)
    }
}

/// Emits the suite result as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to pretty-print.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFormatter for JsonFormatter {
    fn format(&self, result: &SuiteValidationResult) -> Result<String> {
        self.format_with_config(result, &self.config)
    }

    fn format_with_config(
        &self,
        result: &SuiteValidationResult,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut value = serde_json::to_value(result)?;
        if let JsonValue::Object(map) = &mut value {
            if !config.include_timestamps {
                map.remove("run_time");
            }
            if !config.include_statistics {
                map.remove("statistics");
            }
            if config.include_results {
                let selected = config
                    .selected(result)
                    .into_iter()
                    .map(serde_json::to_value)
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                map.insert("results".to_string(), JsonValue::Array(selected));
            } else {
                map.remove("results");
            }
        }

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(rendered)
    }
}

/// Console summary with optional ANSI colors.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn paint(text: &str, color: &str, use_colors: bool) -> String {
    if use_colors {
        format!("\x1b[{color}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

/// `column` or `column_list` kwargs rendered for display.
fn column_label(result: &ExpectationValidationResult) -> Option<String> {
    let kwargs = &result.expectation_config.kwargs;
    if let Some(JsonValue::String(column)) = kwargs.get("column") {
        return Some(column.clone());
    }
    match kwargs.get("column_list") {
        Some(JsonValue::Array(columns)) => Some(
            columns
                .iter()
                .map(|c| c.as_str().map(str::to_string).unwrap_or_else(|| c.to_string()))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    }
}

fn top_values(result: &ExpectationValidationResult, max_values: usize) -> Option<String> {
    let counts = result.result.as_ref()?.partial_unexpected_counts.as_ref()?;
    if counts.is_empty() || max_values == 0 {
        return None;
    }
    let mut rendered = counts
        .iter()
        .take(max_values)
        .map(|vc| format!("{} ({})", vc.value, vc.count))
        .collect::<Vec<_>>()
        .join(", ");
    if counts.len() > max_values {
        rendered.push_str(&format!(", ... {} more", counts.len() - max_values));
    }
    Some(rendered)
}

impl ResultFormatter for HumanFormatter {
    fn format(&self, result: &SuiteValidationResult) -> Result<String> {
        self.format_with_config(result, &self.config)
    }

    fn format_with_config(
        &self,
        result: &SuiteValidationResult,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        let colors = config.use_colors;

        writeln!(output)?;
        if result.success {
            writeln!(output, "✅ {}", paint("Validation PASSED", "32", colors))?;
        } else {
            writeln!(output, "❌ {}", paint("Validation FAILED", "31", colors))?;
        }
        writeln!(output)?;
        writeln!(output, "Suite: {}", result.suite_name)?;
        if config.include_timestamps {
            writeln!(output, "Run time: {}", result.run_time)?;
        }

        if config.include_statistics {
            let stats = &result.statistics;
            writeln!(output)?;
            writeln!(output, "📊 Summary Statistics:")?;
            writeln!(output, "   Evaluated: {}", stats.evaluated_expectations)?;
            writeln!(
                output,
                "   ✅ Successful: {}",
                paint(&stats.successful_expectations.to_string(), "32", colors)
            )?;
            writeln!(
                output,
                "   ❌ Unsuccessful: {}",
                paint(&stats.unsuccessful_expectations.to_string(), "31", colors)
            )?;
            match stats.success_percent {
                Some(pct) => writeln!(output, "   Success Rate: {pct:.1}%")?,
                None => writeln!(output, "   Success Rate: n/a")?,
            }
        }

        let selected = config.selected(result);
        if config.include_results && !selected.is_empty() {
            writeln!(output)?;
            writeln!(output, "🔍 Expectations:")?;
            for entry in &selected {
                let symbol = if entry.success { "✅" } else { "❌" };
                let name = &entry.expectation_config.expectation_type;
                match column_label(entry) {
                    Some(columns) => writeln!(output, "   {symbol} {name} ({columns})")?,
                    None => writeln!(output, "   {symbol} {name}")?,
                }

                if entry.exception_info.raised_exception {
                    let message = entry
                        .exception_info
                        .exception_message
                        .as_deref()
                        .unwrap_or("unknown error");
                    writeln!(output, "      Exception: {}", paint(message, "31", colors))?;
                    continue;
                }
                if let Some(details) = &entry.result {
                    writeln!(
                        output,
                        "      Unexpected: {} of {} ({:.1}% of non-missing)",
                        details.unexpected_count,
                        details.element_count,
                        details.unexpected_percent
                    )?;
                    if details.missing_count > 0 {
                        writeln!(
                            output,
                            "      Missing: {} ({:.1}%)",
                            details.missing_count, details.missing_percent
                        )?;
                    }
                }
                if let Some(values) = top_values(entry, config.max_values) {
                    writeln!(output, "      Top unexpected values: {values}")?;
                }
            }

            let total = result
                .results
                .iter()
                .filter(|r| !config.failures_only || !r.success)
                .count();
            if total > selected.len() {
                writeln!(output)?;
                writeln!(
                    output,
                    "   ... and {} more expectations",
                    total - selected.len()
                )?;
            }
        }

        writeln!(output)?;
        Ok(output)
    }
}

/// Markdown report with a summary table and one row per expectation.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 2,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the base heading level (1 to 6).
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 6);
        self
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFormatter for MarkdownFormatter {
    fn format(&self, result: &SuiteValidationResult) -> Result<String> {
        self.format_with_config(result, &self.config)
    }

    fn format_with_config(
        &self,
        result: &SuiteValidationResult,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        let h = "#".repeat(self.heading_level as usize);

        let status = if result.success { "PASSED" } else { "FAILED" };
        writeln!(output, "{h} Validation Report - {status}")?;
        writeln!(output)?;
        writeln!(output, "**Suite:** {}", result.suite_name)?;
        if config.include_timestamps {
            writeln!(output, "**Run time:** {}", result.run_time)?;
        }

        if config.include_statistics {
            let stats = &result.statistics;
            writeln!(output)?;
            writeln!(output, "{h}# Summary")?;
            writeln!(output)?;
            writeln!(output, "| Metric | Value |")?;
            writeln!(output, "|--------|-------|")?;
            writeln!(output, "| Evaluated | {} |", stats.evaluated_expectations)?;
            writeln!(output, "| Successful | {} |", stats.successful_expectations)?;
            writeln!(output, "| Unsuccessful | {} |", stats.unsuccessful_expectations)?;
            if let Some(pct) = stats.success_percent {
                writeln!(output, "| Success Rate | {pct:.1}% |")?;
            }
        }

        let selected = config.selected(result);
        if config.include_results && !selected.is_empty() {
            writeln!(output)?;
            writeln!(output, "{h}# Expectations")?;
            writeln!(output)?;
            writeln!(output, "| Status | Expectation | Columns | Unexpected |")?;
            writeln!(output, "|--------|-------------|---------|------------|")?;
            for entry in selected {
                let status = if entry.success { "✅" } else { "❌" };
                let unexpected = match (&entry.result, entry.exception_info.raised_exception) {
                    (_, true) => "error".to_string(),
                    (Some(details), false) => format!(
                        "{} ({:.1}%)",
                        details.unexpected_count, details.unexpected_percent
                    ),
                    (None, false) => "-".to_string(),
                };
                writeln!(
                    output,
                    "| {status} | `{}` | {} | {unexpected} |",
                    entry.expectation_config.expectation_type,
                    column_label(entry).unwrap_or_default()
                )?;
            }
        }

        Ok(output)
    }
}
