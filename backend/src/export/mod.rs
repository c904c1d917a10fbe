//! Processed long table export.
//!
//! Columns: `Country,Year,Population[,Growth Rate]`, one row per
//! (country, year). Null values are written as empty fields.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::ExportResult;
use crate::models::{GrowthRecord, LongRecord, Year};
use crate::report::Summary;

const POPULATION_HEADERS: [&str; 3] = ["Country", "Year", "Population"];
const GROWTH_HEADERS: [&str; 4] = ["Country", "Year", "Population", "Growth Rate"];

#[derive(Debug, Serialize, Deserialize)]
struct ExportRow {
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Year")]
    year: Year,
    #[serde(rename = "Population")]
    population: Option<f64>,
    #[serde(rename = "Growth Rate", default, skip_serializing)]
    growth_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
struct GrowthRow<'a> {
    country: &'a str,
    year: Year,
    population: Option<f64>,
    growth_rate: Option<f64>,
}

/// Write `Country,Year,Population` rows.
pub fn write_population_csv<W: Write>(writer: W, records: &[LongRecord]) -> ExportResult<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(POPULATION_HEADERS)?;
    for record in records {
        wtr.serialize(ExportRow {
            country: record.country.clone(),
            year: record.year,
            population: record.population,
            growth_rate: None,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `Country,Year,Population,Growth Rate` rows.
pub fn write_growth_csv<W: Write>(writer: W, records: &[GrowthRecord]) -> ExportResult<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(GROWTH_HEADERS)?;
    for record in records {
        wtr.serialize(GrowthRow {
            country: &record.country,
            year: record.year,
            population: record.population,
            growth_rate: record.growth_rate,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the processed table to a file, creating parent directories.
pub fn write_growth_csv_file(path: &Path, records: &[GrowthRecord]) -> ExportResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_growth_csv(File::create(path)?, records)
}

/// Read an exported table back. The growth column is optional.
pub fn read_long_csv<R: Read>(reader: R) -> ExportResult<Vec<GrowthRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize::<ExportRow>() {
        let row = row?;
        records.push(GrowthRecord {
            country: row.country,
            year: row.year,
            population: row.population,
            growth_rate: row.growth_rate,
        });
    }
    Ok(records)
}

pub fn read_long_csv_file(path: &Path) -> ExportResult<Vec<GrowthRecord>> {
    read_long_csv(File::open(path)?)
}

/// Write the summary as pretty JSON.
pub fn write_summary_json(path: &Path, summary: &Summary) -> ExportResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn key(r: &GrowthRecord) -> (String, Year, Option<u64>) {
        (r.country.clone(), r.year, r.population.map(f64::to_bits))
    }

    fn sample() -> Vec<GrowthRecord> {
        vec![
            GrowthRecord::from_long(LongRecord::new("Korea, Rep.", 1960, Some(25_012_374.0)), None),
            GrowthRecord::from_long(LongRecord::new("Aruba", 1960, None), None),
            GrowthRecord::from_long(LongRecord::new("Korea, Rep.", 1961, Some(25_765_673.0)), Some(3.011_692_1)),
            GrowthRecord::from_long(LongRecord::new("Tiny", 1961, Some(0.5)), None),
        ]
    }

    #[test]
    fn test_growth_csv_layout() {
        let mut buf = Vec::new();
        write_growth_csv(&mut buf, &sample()[..2]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Country,Year,Population,Growth Rate"));
        assert_eq!(lines.next(), Some("\"Korea, Rep.\",1960,25012374.0,"));
        assert_eq!(lines.next(), Some("Aruba,1960,,"));
    }

    #[test]
    fn test_header_written_for_empty_table() {
        let mut buf = Vec::new();
        write_population_csv(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Country,Year,Population\n");
    }

    #[test]
    fn test_round_trip_preserves_records() {
        let records = sample();
        let mut buf = Vec::new();
        write_growth_csv(&mut buf, &records).unwrap();

        let back = read_long_csv(buf.as_slice()).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn test_population_round_trip_is_order_independent() {
        let long: Vec<LongRecord> = sample().iter().map(GrowthRecord::to_long).collect();
        let mut buf = Vec::new();
        write_population_csv(&mut buf, &long).unwrap();

        let mut back = read_long_csv(buf.as_slice()).unwrap();
        back.reverse();
        assert!(back.iter().all(|r| r.growth_rate.is_none()));

        let expected: HashSet<_> = sample().iter().map(key).collect();
        let actual: HashSet<_> = back.iter().map(key).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("processed.csv");
        write_growth_csv_file(&path, &sample()).unwrap();
        assert_eq!(read_long_csv_file(&path).unwrap().len(), 4);
    }

    #[test]
    fn test_summary_json() {
        let records = vec![LongRecord::new("India", 2023, Some(1_428_627_663.0))];
        let summary = crate::report::basic_analysis(&records, 5, None).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("summary.json");
        write_summary_json(&path, &summary).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["latest_year"], 2023);
        assert_eq!(value["top_countries"][0]["country"], "India");
    }

    #[test]
    fn test_bad_year_is_an_error() {
        let data = "Country,Year,Population\nX,abc,1\n";
        assert!(read_long_csv(data.as_bytes()).is_err());
    }
}
