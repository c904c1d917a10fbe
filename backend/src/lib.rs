//! # popstat - World Bank population analysis
//!
//! popstat reshapes a World Bank population export (one column per year) into
//! a long (country, year, population) table, computes year-over-year growth
//! rates per country, prints summary statistics, renders charts and exports
//! the processed table.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Wide CSV   │────▶│   Parser    │────▶│   Reshape   │────▶│   Growth    │
//! │ (preamble)  │     │  (auto-enc) │     │ (wide→long) │     │ (per ctry)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                          ┌─────────────┬─────────────┬─────────────┘
//!                          ▼             ▼             ▼
//!                      Summary        Charts      Processed CSV
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use popstat::{run_analysis, render_summary, AnalysisConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnalysisConfig::from_json_file("analysis.json")?;
//!     let result = run_analysis(&config)?;
//!     print!("{}", render_summary(&result.summary));
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`logs`] - Progress log sink with broadcast subscribers
//! - [`config`] - Analysis configuration
//! - [`models`] - Wide and long table records
//! - [`parser`] - CSV parsing with auto-detection
//! - [`metadata`] - Country and indicator side files
//! - [`transform`] - Reshape, growth and pipeline
//! - [`report`] - Summary statistics
//! - [`chart`] - Chart descriptions and SVG rendering
//! - [`export`] - Processed table CSV
//! - [`validation`] - Configuration schema validation

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Configuration
pub mod config;
pub mod validation;

// Parsing
pub mod metadata;
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod chart;
pub mod export;
pub mod report;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ChartError, ConfigError, CsvError, ExportError, PipelineError, PipelineResult, ReshapeError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{GrowthRecord, LongRecord, WideRecord, WideTable, Year};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{AnalysisConfig, MetadataPaths, OutputPaths, YearRange};
pub use validation::{is_valid, validate, validate_analysis_config};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file_auto,
    ParseResult,
};
pub use metadata::Metadata;

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{detect_year_columns, growth_rates, pct_change, reshape, year_columns};

// =============================================================================
// Re-exports - Report, Charts and Export
// =============================================================================

pub use chart::{ChartKind, ChartSpec};
pub use export::{read_long_csv_file, write_growth_csv, write_growth_csv_file, write_population_csv};
pub use report::{basic_analysis, render_summary, CountryPopulation, Summary};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    create_visualizations, exclude_aggregates, load_data, load_table, run_analysis,
    AnalysisResult, ChartOutput, CsvInfo, LoadedData,
};

// =============================================================================
// Re-exports - Logs
// =============================================================================

pub use logs::{LogEntry, LogLevel, LOG_BROADCASTER};
