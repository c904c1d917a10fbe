//! Analysis configuration.
//!
//! [`AnalysisConfig::default`] reproduces the fixed World Bank setup: input
//! and metadata file names, the 1960..=2023 year range, the charted
//! countries and the output file names. A JSON file can override any subset
//! of the fields; it is checked against `schemas/analysis-config.json`
//! before being deserialized.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::models::Year;
use crate::validation::validate_analysis_config;

/// World Bank total population export.
pub const DEFAULT_INPUT: &str = "API_SP.POP.TOTL_DS2_en_csv_v2_2590.csv";
pub const DEFAULT_COUNTRY_METADATA: &str = "Metadata_Country_API_SP.POP.TOTL_DS2_en_csv_v2_2590.csv";
pub const DEFAULT_INDICATOR_METADATA: &str =
    "Metadata_Indicator_API_SP.POP.TOTL_DS2_en_csv_v2_2590.csv";

/// Lines before the header row in World Bank exports.
pub const DEFAULT_SKIP_ROWS: usize = 4;

/// Inclusive range of year columns to reshape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: Year,
    pub end: Year,
}

impl YearRange {
    fn check(&self) -> ConfigResult<()> {
        if self.start > self.end {
            return Err(ConfigError::EmptyYearRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Years in ascending order.
    pub fn years(&self) -> Vec<Year> {
        (self.start..=self.end).collect()
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self { start: 1960, end: 2023 }
    }
}

/// Side files loaded next to the main table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataPaths {
    pub country: Option<PathBuf>,
    pub indicator: Option<PathBuf>,
}

impl Default for MetadataPaths {
    fn default() -> Self {
        Self {
            country: Some(PathBuf::from(DEFAULT_COUNTRY_METADATA)),
            indicator: Some(PathBuf::from(DEFAULT_INDICATOR_METADATA)),
        }
    }
}

/// Where the run writes its artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPaths {
    pub processed_csv: PathBuf,
    pub trends_chart: PathBuf,
    pub top_countries_chart: PathBuf,
    pub growth_chart: PathBuf,
    /// Also write each chart's Chart.js description into this directory
    pub chart_json_dir: Option<PathBuf>,
    /// Also write the summary statistics as JSON
    pub summary_json: Option<PathBuf>,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            processed_csv: PathBuf::from("processed_population_data.csv"),
            trends_chart: PathBuf::from("population_trends.svg"),
            top_countries_chart: PathBuf::from("top_countries.svg"),
            growth_chart: PathBuf::from("growth_rates.svg"),
            chart_json_dir: None,
            summary_json: None,
        }
    }
}

impl OutputPaths {
    /// Re-root every relative output path under `dir`.
    pub fn in_dir(self, dir: &Path) -> Self {
        let root = |p: PathBuf| if p.is_absolute() { p } else { dir.join(p) };
        Self {
            processed_csv: root(self.processed_csv),
            trends_chart: root(self.trends_chart),
            top_countries_chart: root(self.top_countries_chart),
            growth_chart: root(self.growth_chart),
            chart_json_dir: self.chart_json_dir.map(root),
            summary_json: self.summary_json.map(root),
        }
    }

    /// Files always produced by a full run, in write order.
    pub fn artifacts(&self) -> Vec<&Path> {
        vec![
            self.trends_chart.as_path(),
            self.top_countries_chart.as_path(),
            self.growth_chart.as_path(),
            self.processed_csv.as_path(),
        ]
    }
}

/// Everything a run needs, passed explicitly to each stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input_path: PathBuf,
    pub metadata_paths: MetadataPaths,
    pub skip_rows: usize,
    pub year_range: YearRange,
    /// Countries drawn on the population trend chart
    pub trend_countries: Vec<String>,
    /// Countries drawn on the growth rate chart
    pub growth_countries: Vec<String>,
    /// Rows in the console top list
    pub top_n_summary: usize,
    /// Bars in the top countries chart
    pub top_n_chart: usize,
    /// Drop regional aggregates (empty `Region` in the country metadata)
    pub exclude_aggregates: bool,
    pub output_paths: OutputPaths,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT),
            metadata_paths: MetadataPaths::default(),
            skip_rows: DEFAULT_SKIP_ROWS,
            year_range: YearRange::default(),
            trend_countries: vec![
                "India".to_string(),
                "China".to_string(),
                "United States".to_string(),
                "Nigeria".to_string(),
            ],
            growth_countries: vec!["India".to_string(), "China".to_string()],
            top_n_summary: 10,
            top_n_chart: 15,
            exclude_aggregates: false,
            output_paths: OutputPaths::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a configuration from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        validate_analysis_config(&value).map_err(ConfigError::Invalid)?;

        let config: Self = serde_json::from_value(value)?;
        config.year_range.check()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
