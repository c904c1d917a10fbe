//! Domain models for the popstat pipeline.
//!
//! - [`WideTable`] / [`WideRecord`] - One row per country, one value per year column
//! - [`LongRecord`] - One row per (country, year) observation
//! - [`GrowthRecord`] - A long record with its year-over-year growth rate

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CsvError, CsvResult};
use crate::parser::ParseResult;

/// Calendar year of an observation.
pub type Year = i32;

/// Header of the country name column in World Bank exports.
pub const COUNTRY_NAME_COLUMN: &str = "Country Name";

/// Header of the ISO country code column in World Bank exports.
pub const COUNTRY_CODE_COLUMN: &str = "Country Code";

static YEAR_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("Invalid year header pattern"));

/// Parse a header as a year column identifier (`"1960"` -> `1960`).
pub fn parse_year_header(header: &str) -> Option<Year> {
    let header = header.trim();
    if YEAR_HEADER.is_match(header) {
        header.parse().ok()
    } else {
        None
    }
}

/// Parse a population cell.
///
/// Empty and non-numeric cells become `None`; nothing is coerced to zero.
pub fn parse_population(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Wide format
// =============================================================================

/// One country row of the wide table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideRecord {
    /// Country name, treated as an opaque identifier.
    pub country: String,
    /// ISO code when the source carries one.
    pub code: Option<String>,
    /// Value for each year column of the table.
    pub values: BTreeMap<Year, Option<f64>>,
}

impl WideRecord {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            code: None,
            values: BTreeMap::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_value(mut self, year: Year, value: Option<f64>) -> Self {
        self.values.insert(year, value);
        self
    }

    /// Value of a year column; `None` for null cells and absent columns.
    pub fn value(&self, year: Year) -> Option<f64> {
        self.values.get(&year).copied().flatten()
    }
}

/// A table with one row per country and one column per year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WideTable {
    /// Year columns in header order.
    pub year_columns: Vec<Year>,
    /// Country rows in file order.
    pub records: Vec<WideRecord>,
}

impl WideTable {
    pub fn new(year_columns: Vec<Year>) -> Self {
        Self {
            year_columns,
            records: Vec::new(),
        }
    }

    /// Append a row, filling every year column the row does not carry with null.
    pub fn push(&mut self, mut record: WideRecord) {
        for year in &self.year_columns {
            record.values.entry(*year).or_insert(None);
        }
        self.records.push(record);
    }

    pub fn has_year(&self, year: Year) -> bool {
        self.year_columns.contains(&year)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Build a wide table from parsed CSV rows.
    ///
    /// `Country Name` becomes the country identifier and every 4-digit header
    /// becomes a year column. Other columns (`Indicator Name`, trailing
    /// unnamed column, ...) are dropped.
    pub fn from_parsed(parsed: &ParseResult) -> CsvResult<Self> {
        let country_idx = parsed
            .column_index(COUNTRY_NAME_COLUMN)
            .ok_or_else(|| CsvError::MissingColumn(COUNTRY_NAME_COLUMN.to_string()))?;
        let code_idx = parsed.column_index(COUNTRY_CODE_COLUMN);

        let year_idx: Vec<(usize, Year)> = parsed
            .headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| parse_year_header(h).map(|y| (i, y)))
            .collect();

        let mut table = WideTable::new(year_idx.iter().map(|(_, y)| *y).collect());

        for row in &parsed.rows {
            let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");

            let mut record = WideRecord::new(cell(country_idx));
            if let Some(code) = code_idx.map(cell).filter(|c| !c.is_empty()) {
                record = record.with_code(code);
            }
            for (i, year) in &year_idx {
                record.values.insert(*year, parse_population(cell(*i)));
            }
            table.push(record);
        }

        Ok(table)
    }
}

// =============================================================================
// Long format
// =============================================================================

/// One (country, year) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRecord {
    pub country: String,
    pub year: Year,
    pub population: Option<f64>,
}

impl LongRecord {
    pub fn new(country: impl Into<String>, year: Year, population: Option<f64>) -> Self {
        Self {
            country: country.into(),
            year,
            population,
        }
    }
}

/// A long record extended with its year-over-year growth rate in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRecord {
    pub country: String,
    pub year: Year,
    pub population: Option<f64>,
    pub growth_rate: Option<f64>,
}

impl GrowthRecord {
    pub fn from_long(record: LongRecord, growth_rate: Option<f64>) -> Self {
        Self {
            country: record.country,
            year: record.year,
            population: record.population,
            growth_rate,
        }
    }

    /// Drop the growth rate.
    pub fn to_long(&self) -> LongRecord {
        LongRecord::new(self.country.clone(), self.year, self.population)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(headers: &[&str], rows: &[&[&str]]) -> ParseResult {
        ParseResult {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
            encoding: "utf-8".to_string(),
            delimiter: ',',
        }
    }

    #[test]
    fn test_parse_year_header() {
        assert_eq!(parse_year_header("1960"), Some(1960));
        assert_eq!(parse_year_header(" 2023 "), Some(2023));
        assert_eq!(parse_year_header("Country Name"), None);
        assert_eq!(parse_year_header("19601"), None);
        assert_eq!(parse_year_header(""), None);
    }

    #[test]
    fn test_parse_population_keeps_nulls() {
        assert_eq!(parse_population("100"), Some(100.0));
        assert_eq!(parse_population(" 54608.0 "), Some(54608.0));
        assert_eq!(parse_population(""), None);
        assert_eq!(parse_population(".."), None);
        assert_eq!(parse_population("n/a"), None);
        assert_eq!(parse_population("NaN"), None);
        assert_eq!(parse_population("0"), Some(0.0));
    }

    #[test]
    fn test_from_parsed_drops_non_year_columns() {
        let p = parsed(
            &["Country Name", "Country Code", "Indicator Name", "1960", "1961", ""],
            &[
                &["Aruba", "ABW", "Population, total", "54608", "55811", ""],
                &["Korea, Rep.", "KOR", "Population, total", "", "abc", ""],
            ],
        );
        let table = WideTable::from_parsed(&p).unwrap();

        assert_eq!(table.year_columns, vec![1960, 1961]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].country, "Aruba");
        assert_eq!(table.records[0].code.as_deref(), Some("ABW"));
        assert_eq!(table.records[0].value(1961), Some(55811.0));
        assert_eq!(table.records[1].value(1960), None);
        assert_eq!(table.records[1].value(1961), None);
        assert_eq!(table.records[1].values.len(), 2);
    }

    #[test]
    fn test_from_parsed_short_rows_are_null_filled() {
        let p = parsed(&["Country Name", "Country Code", "1960", "1961"], &[&["X", "", "1"]]);
        let table = WideTable::from_parsed(&p).unwrap();
        assert_eq!(table.records[0].code, None);
        assert_eq!(table.records[0].value(1960), Some(1.0));
        assert_eq!(table.records[0].values.get(&1961), Some(&None));
    }

    #[test]
    fn test_from_parsed_requires_country_column() {
        let p = parsed(&["Name", "1960"], &[&["X", "1"]]);
        let err = WideTable::from_parsed(&p).unwrap_err();
        assert!(matches!(err, CsvError::MissingColumn(ref c) if c == "Country Name"));
    }

    #[test]
    fn test_push_fills_missing_years() {
        let mut table = WideTable::new(vec![2000, 2001]);
        table.push(WideRecord::new("X").with_value(2000, Some(5.0)));
        assert_eq!(table.records[0].values.len(), 2);
        assert_eq!(table.records[0].value(2001), None);
    }
}
