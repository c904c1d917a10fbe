//! Error types for the popstat analysis pipeline.
//!
//! One error type per stage:
//!
//! - [`CsvError`] - Reading and decoding delimited text files
//! - [`ReshapeError`] - Wide to long reshaping (schema errors)
//! - [`ConfigError`] - Loading and validating an [`crate::config::AnalysisConfig`]
//! - [`ChartError`] - Building and rendering charts
//! - [`ExportError`] - Writing and re-reading the processed long table
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::Year;

// =============================================================================
// CSV Loading Errors
// =============================================================================

/// Errors while loading a delimited text file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Input file does not exist.
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the file content.
    #[error("Failed to decode content as {0}")]
    EncodingError(String),

    /// Malformed delimited text.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),

    /// Nothing left after the preamble.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Header row is blank.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// A column the loader depends on is absent from the header.
    #[error("Missing column '{0}' in CSV header")]
    MissingColumn(String),
}

// =============================================================================
// Reshape Errors
// =============================================================================

/// Schema errors raised while reshaping a wide table.
#[derive(Debug, Error, PartialEq)]
pub enum ReshapeError {
    /// A requested year column is not in the wide table.
    #[error("Schema error: year column '{0}' not found in input")]
    MissingColumn(Year),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading an analysis configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration is not valid JSON or does not deserialize.
    #[error("Config JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration does not match the embedded schema.
    #[error("Invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// Year range start is after its end.
    #[error("Empty year range: {start} > {end}")]
    EmptyYearRange { start: Year, end: Year },
}

// =============================================================================
// Chart Errors
// =============================================================================

/// Errors while building or writing a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    /// Failed to write the chart file.
    #[error("Failed to write chart: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to serialize the chart description.
    #[error("Chart JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// None of the requested series has any data point.
    #[error("No data to plot for chart '{0}'")]
    NoData(String),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing or re-reading the processed long table.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Filesystem error.
    #[error("Export IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV serialization or deserialization error.
    #[error("Export CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Summary JSON serialization error.
    #[error("Export JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run_analysis`].
/// It wraps all lower-level errors and adds pipeline-specific variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Reshape (schema) error.
    #[error("Reshape error: {0}")]
    Reshape(#[from] ReshapeError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Chart error.
    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// The long table has no record to analyze.
    #[error("No records to analyze")]
    EmptyInput,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV loading.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for reshaping.
pub type ReshapeResult<T> = Result<T, ReshapeError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for chart operations.
pub type ChartResult<T> = Result<T, ChartError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
