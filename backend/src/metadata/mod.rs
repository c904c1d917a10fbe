//! Country and indicator metadata side files.
//!
//! World Bank exports ship two companion files next to the data table:
//!
//! - country metadata: `Country Code`, `Region`, `IncomeGroup`, `SpecialNotes`, `TableName`
//! - indicator metadata: `INDICATOR_CODE`, `INDICATOR_NAME`, `SOURCE_NOTE`, `SOURCE_ORGANIZATION`
//!
//! They are not needed for reshaping. The country file tells regional
//! aggregates ("World", "High income", ...) apart from countries: aggregates
//! have no `Region`. The indicator file names the measured series.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::config::MetadataPaths;
use crate::error::{CsvError, CsvResult};
use crate::logs::log_success;
use crate::parser::{parse_csv_file_auto, ParseResult};

/// One row of the country metadata file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryMetadata {
    pub code: String,
    pub region: Option<String>,
    pub income_group: Option<String>,
    pub special_notes: Option<String>,
    pub table_name: Option<String>,
}

impl CountryMetadata {
    /// Regional and income aggregates carry no region.
    pub fn is_aggregate(&self) -> bool {
        self.region.is_none()
    }
}

/// One row of the indicator metadata file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorMetadata {
    pub code: String,
    pub name: String,
    pub source_note: Option<String>,
    pub source_organization: Option<String>,
}

/// Both side files. Either may be absent.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub countries: Vec<CountryMetadata>,
    pub indicators: Vec<IndicatorMetadata>,
    /// Raw rows of the country file, every column kept
    pub country_records: Vec<Value>,
    /// Raw rows of the indicator file, every column kept
    pub indicator_records: Vec<Value>,
}

impl Metadata {
    /// Load the configured side files. A configured file that is missing is an error.
    pub fn load(paths: &MetadataPaths) -> CsvResult<Self> {
        let mut metadata = Metadata::default();

        if let Some(ref path) = paths.country {
            let parsed = parse_csv_file_auto(path, 0)?;
            metadata.countries = countries_from_parsed(&parsed)?;
            metadata.country_records = parsed.records();
            log_success(format!("Loaded {} country metadata rows", metadata.countries.len()));
        }

        if let Some(ref path) = paths.indicator {
            let parsed = parse_csv_file_auto(path, 0)?;
            metadata.indicators = indicators_from_parsed(&parsed)?;
            metadata.indicator_records = parsed.records();
            log_success(format!("Loaded {} indicator metadata rows", metadata.indicators.len()));
        }

        Ok(metadata)
    }

    /// Codes of every aggregate row.
    pub fn aggregate_codes(&self) -> HashSet<&str> {
        self.countries
            .iter()
            .filter(|c| c.is_aggregate())
            .map(|c| c.code.as_str())
            .collect()
    }

    /// Name of the first indicator, if the indicator file was loaded.
    pub fn indicator_name(&self) -> Option<&str> {
        self.indicators.first().map(|i| i.name.as_str())
    }
}

fn required(parsed: &ParseResult, name: &str) -> CsvResult<usize> {
    parsed
        .column_index(name)
        .ok_or_else(|| CsvError::MissingColumn(name.to_string()))
}

fn optional_cell(row: &[String], idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.get(i))
        .filter(|v| !v.is_empty())
        .cloned()
}

/// Typed rows of a parsed country metadata file.
pub fn countries_from_parsed(parsed: &ParseResult) -> CsvResult<Vec<CountryMetadata>> {
    let code = required(parsed, "Country Code")?;
    let region = parsed.column_index("Region");
    let income = parsed.column_index("IncomeGroup");
    let notes = parsed.column_index("SpecialNotes");
    let table_name = parsed.column_index("TableName");

    Ok(parsed
        .rows
        .iter()
        .map(|row| CountryMetadata {
            code: row.get(code).cloned().unwrap_or_default(),
            region: optional_cell(row, region),
            income_group: optional_cell(row, income),
            special_notes: optional_cell(row, notes),
            table_name: optional_cell(row, table_name),
        })
        .collect())
}

/// Typed rows of a parsed indicator metadata file.
pub fn indicators_from_parsed(parsed: &ParseResult) -> CsvResult<Vec<IndicatorMetadata>> {
    let code = required(parsed, "INDICATOR_CODE")?;
    let name = required(parsed, "INDICATOR_NAME")?;
    let note = parsed.column_index("SOURCE_NOTE");
    let org = parsed.column_index("SOURCE_ORGANIZATION");

    Ok(parsed
        .rows
        .iter()
        .map(|row| IndicatorMetadata {
            code: row.get(code).cloned().unwrap_or_default(),
            name: row.get(name).cloned().unwrap_or_default(),
            source_note: optional_cell(row, note),
            source_organization: optional_cell(row, org),
        })
        .collect())
}
