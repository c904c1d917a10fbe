//! High-level pipeline: load → reshape → analyze → chart → save.
//!
//! # Example
//!
//! ```rust,ignore
//! use popstat::{run_analysis, render_summary, AnalysisConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let result = run_analysis(&AnalysisConfig::default())?;
//!     print!("{}", render_summary(&result.summary));
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::chart::{self, ChartSpec};
use crate::config::AnalysisConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::export::{write_growth_csv_file, write_summary_json};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::metadata::Metadata;
use crate::models::{GrowthRecord, LongRecord, WideTable, Year};
use crate::parser::parse_csv_file_auto;
use crate::report::{basic_analysis, records_for_year, top_n, Summary};
use super::growth::growth_rates;
use super::reshape::{reshape, year_columns};

/// Input file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
    pub year_columns: Vec<Year>,
}

/// Everything derived at load time.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub table: WideTable,
    pub long: Vec<LongRecord>,
    pub metadata: Metadata,
    pub csv_info: CsvInfo,
}

/// A chart and where it was written.
#[derive(Debug, Clone)]
pub struct ChartOutput {
    pub spec: ChartSpec,
    pub path: PathBuf,
}

/// Result of a complete analysis run
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub summary: Summary,
    /// Long table with growth rates, in export order
    pub growth: Vec<GrowthRecord>,
    pub charts: Vec<ChartOutput>,
    /// Every file written, in write order
    pub written: Vec<PathBuf>,
    pub csv_info: CsvInfo,
}

/// Load the wide table from a delimited file.
pub fn load_table(path: &Path, skip_rows: usize) -> PipelineResult<(WideTable, CsvInfo)> {
    log_info(format!("📖 Reading {}", path.display()));
    let parsed = parse_csv_file_auto(path, skip_rows)?;
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parsed.delimiter)));

    let table = WideTable::from_parsed(&parsed)?;
    log_success(format!(
        "Read {} rows, {} year columns",
        table.len(),
        table.year_columns.len()
    ));

    let csv_info = CsvInfo {
        encoding: parsed.encoding.clone(),
        delimiter: parsed.delimiter,
        headers: parsed.headers.clone(),
        row_count: table.len(),
        year_columns: table.year_columns.clone(),
    };
    Ok((table, csv_info))
}

/// Drop rows whose country code is a regional or income aggregate.
pub fn exclude_aggregates(mut table: WideTable, metadata: &Metadata) -> WideTable {
    if metadata.countries.is_empty() {
        log_warning("No country metadata loaded, aggregates kept");
        return table;
    }

    let aggregates = metadata.aggregate_codes();
    let before = table.len();
    table
        .records
        .retain(|r| !r.code.as_deref().is_some_and(|c| aggregates.contains(c)));
    log_success(format!("Excluded {} aggregate rows", before - table.len()));
    table
}

/// Load the main table and its side files, then reshape over the configured years.
pub fn load_data(config: &AnalysisConfig) -> PipelineResult<LoadedData> {
    let (table, csv_info) = load_table(&config.input_path, config.skip_rows)?;
    let metadata = Metadata::load(&config.metadata_paths)?;

    let table = if config.exclude_aggregates {
        exclude_aggregates(table, &metadata)
    } else {
        table
    };

    let years = year_columns(&table, &config.year_range)?;
    let long = reshape(&table, &years)?;
    log_success(format!(
        "Reshaped {} countries x {} years into {} rows",
        table.len(),
        years.len(),
        long.len()
    ));

    Ok(LoadedData {
        table,
        long,
        metadata,
        csv_info,
    })
}

/// Build the three charts and write them as SVG (and Chart.js JSON when configured).
pub fn create_visualizations(
    long: &[LongRecord],
    growth: &[GrowthRecord],
    latest_year: Year,
    config: &AnalysisConfig,
) -> PipelineResult<Vec<ChartOutput>> {
    log_info("📊 Rendering charts...");
    let paths = &config.output_paths;

    let trends = chart::population_trends(long, &config.trend_countries)?;
    let ranking = top_n(records_for_year(long, latest_year), config.top_n_chart);
    let top = chart::top_countries(&ranking, latest_year)?;
    let growth_chart = chart::growth_rates(growth, &config.growth_countries)?;

    let mut outputs = Vec::new();
    for (spec, path) in [
        (trends, &paths.trends_chart),
        (top, &paths.top_countries_chart),
        (growth_chart, &paths.growth_chart),
    ] {
        spec.write_svg(path)?;
        log_info_indent(format!("{} → {}", spec.title(), path.display()), 1);

        if let Some(ref dir) = paths.chart_json_dir {
            let json_path = dir.join(path.with_extension("json").file_name().unwrap_or_default());
            spec.write_json(&json_path)?;
        }

        outputs.push(ChartOutput {
            spec,
            path: path.clone(),
        });
    }
    Ok(outputs)
}

/// Run the full analysis described by `config`.
pub fn run_analysis(config: &AnalysisConfig) -> PipelineResult<AnalysisResult> {
    let data = load_data(config)?;

    let summary = basic_analysis(
        &data.long,
        config.top_n_summary,
        data.metadata.indicator_name(),
    )
    .ok_or(PipelineError::EmptyInput)?;

    log_info("📈 Computing growth rates...");
    let growth = growth_rates(&data.long);
    let defined = growth.iter().filter(|r| r.growth_rate.is_some()).count();
    log_success(format!("{} of {} rows have a growth rate", defined, growth.len()));

    let charts = create_visualizations(&data.long, &growth, summary.latest_year, config)?;
    let mut written: Vec<PathBuf> = charts.iter().map(|c| c.path.clone()).collect();

    let paths = &config.output_paths;
    write_growth_csv_file(&paths.processed_csv, &growth)?;
    written.push(paths.processed_csv.clone());

    if let Some(ref path) = paths.summary_json {
        write_summary_json(path, &summary)?;
        written.push(path.clone());
    }

    log_success("Analysis complete");
    Ok(AnalysisResult {
        summary,
        growth,
        charts,
        written,
        csv_info: data.csv_info,
    })
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
