//! Summary statistics for the latest year of a long table.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fmt::Write;

use crate::models::{LongRecord, Year};

/// A country and its population for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryPopulation {
    pub country: String,
    pub population: f64,
}

/// Statistics printed by the `BASIC STATISTICS` section.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub latest_year: Year,
    /// Rows of the latest year, null populations included
    pub total_countries: usize,
    /// Sum of the non-null populations of the latest year
    pub global_population: f64,
    pub top_countries: Vec<CountryPopulation>,
    pub indicator: Option<String>,
    pub generated_at: String,
}

/// Highest year present in the table.
pub fn latest_year(records: &[LongRecord]) -> Option<Year> {
    records.iter().map(|r| r.year).max()
}

pub fn records_for_year(records: &[LongRecord], year: Year) -> Vec<&LongRecord> {
    records.iter().filter(|r| r.year == year).collect()
}

/// The `n` largest populations, descending. Nulls are skipped; ties keep input order.
pub fn top_n<'a>(records: impl IntoIterator<Item = &'a LongRecord>, n: usize) -> Vec<CountryPopulation> {
    let mut ranked: Vec<CountryPopulation> = records
        .into_iter()
        .filter_map(|r| {
            r.population.map(|population| CountryPopulation {
                country: r.country.clone(),
                population,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.population.total_cmp(&a.population));
    ranked.truncate(n);
    ranked
}

/// Compute the summary. `None` when the table is empty.
pub fn basic_analysis(records: &[LongRecord], top: usize, indicator: Option<&str>) -> Option<Summary> {
    let latest_year = latest_year(records)?;
    let latest = records_for_year(records, latest_year);

    Some(Summary {
        latest_year,
        total_countries: latest.len(),
        global_population: latest.iter().filter_map(|r| r.population).sum(),
        top_countries: top_n(latest, top),
        indicator: indicator.map(String::from),
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

/// Console rendering of a summary.
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== BASIC STATISTICS ===");
    if let Some(ref indicator) = summary.indicator {
        let _ = writeln!(out, "Indicator: {}", indicator);
    }
    let _ = writeln!(out, "\nLatest year available: {}", summary.latest_year);
    let _ = writeln!(out, "Total countries: {}", summary.total_countries);
    let _ = writeln!(
        out,
        "Global population: {:.2} billion",
        summary.global_population / 1e9
    );

    let _ = writeln!(out, "\nTop {} Countries:", summary.top_countries.len());
    let width = summary
        .top_countries
        .iter()
        .map(|c| c.country.chars().count())
        .max()
        .unwrap_or(0)
        .max("Country".len());
    let _ = writeln!(out, "{:<width$}  {:>15}", "Country", "Population", width = width);
    for entry in &summary.top_countries {
        let _ = writeln!(
            out,
            "{:<width$}  {:>15}",
            entry.country,
            format_population(entry.population),
            width = width
        );
    }
    out
}

/// Whole numbers without a fraction, anything else as is.
pub fn format_population(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<LongRecord> {
        vec![
            LongRecord::new("India", 2022, Some(1_417_173_173.0)),
            LongRecord::new("China", 2022, Some(1_412_175_000.0)),
            LongRecord::new("India", 2023, Some(1_428_627_663.0)),
            LongRecord::new("China", 2023, Some(1_410_710_000.0)),
            LongRecord::new("Nowhere", 2023, None),
            LongRecord::new("Aruba", 2023, Some(106_277.0)),
        ]
    }

    #[test]
    fn test_latest_year() {
        assert_eq!(latest_year(&table()), Some(2023));
        assert_eq!(latest_year(&[]), None);
    }

    #[test]
    fn test_basic_analysis() {
        let summary = basic_analysis(&table(), 10, Some("Population, total")).unwrap();

        assert_eq!(summary.latest_year, 2023);
        assert_eq!(summary.total_countries, 4);
        assert_eq!(summary.global_population, 1_428_627_663.0 + 1_410_710_000.0 + 106_277.0);
        assert_eq!(summary.top_countries.len(), 3);
        assert_eq!(summary.top_countries[0].country, "India");
        assert_eq!(summary.top_countries[2].country, "Aruba");
        assert_eq!(summary.indicator.as_deref(), Some("Population, total"));
    }

    #[test]
    fn test_empty_table_has_no_summary() {
        assert!(basic_analysis(&[], 10, None).is_none());
    }

    #[test]
    fn test_top_n_ties_keep_input_order() {
        let records = vec![
            LongRecord::new("A", 2000, Some(5.0)),
            LongRecord::new("B", 2000, Some(9.0)),
            LongRecord::new("C", 2000, Some(5.0)),
            LongRecord::new("D", 2000, Some(1.0)),
        ];
        let top: Vec<String> = top_n(&records, 3).into_iter().map(|c| c.country).collect();
        assert_eq!(top, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_render_summary() {
        let summary = basic_analysis(&table(), 2, None).unwrap();
        let text = render_summary(&summary);

        assert!(text.contains("=== BASIC STATISTICS ==="));
        assert!(text.contains("Latest year available: 2023"));
        assert!(text.contains("Total countries: 4"));
        assert!(text.contains("Global population: 2.84 billion"));
        assert!(text.contains("Top 2 Countries:"));
        assert!(text.contains("1428627663"));
        assert!(!text.contains("Aruba"));
    }

    #[test]
    fn test_format_population() {
        assert_eq!(format_population(54608.0), "54608");
        assert_eq!(format_population(12.5), "12.5");
    }
}
