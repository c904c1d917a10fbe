//! Wide to long reshaping.
//!
//! ```text
//! Wide table (one row per country)        Long table (one row per country-year)
//! ┌─────────┬──────┬──────┐              ┌─────────┬──────┬────────────┐
//! │ Country │ 1960 │ 1961 │              │ Country │ Year │ Population │
//! ├─────────┼──────┼──────┤      →       ├─────────┼──────┼────────────┤
//! │ X       │  100 │  110 │              │ X       │ 1960 │ 100        │
//! │ Y       │      │    7 │              │ Y       │ 1960 │ (null)     │
//! └─────────┴──────┴──────┘              │ X       │ 1961 │ 110        │
//!                                        │ Y       │ 1961 │ 7          │
//!                                        └─────────┴──────┴────────────┘
//! ```
//!
//! Output is year-major: all rows of the first requested year, then the next.

use crate::config::YearRange;
use crate::error::{ReshapeError, ReshapeResult};
use crate::models::{LongRecord, WideTable, Year};

/// Reshape `table` over the requested year columns.
///
/// Produces exactly `table.len() * years.len()` records. Null cells stay
/// null. Fails on the first year that is not a column of the table.
pub fn reshape(table: &WideTable, years: &[Year]) -> ReshapeResult<Vec<LongRecord>> {
    if let Some(missing) = years.iter().find(|y| !table.has_year(**y)) {
        return Err(ReshapeError::MissingColumn(*missing));
    }

    let mut long = Vec::with_capacity(table.len() * years.len());
    for &year in years {
        for record in &table.records {
            long.push(LongRecord::new(record.country.clone(), year, record.value(year)));
        }
    }
    Ok(long)
}

/// The configured years, checked against the table's columns.
pub fn year_columns(table: &WideTable, range: &YearRange) -> ReshapeResult<Vec<Year>> {
    let years = range.years();
    if let Some(missing) = years.iter().find(|y| !table.has_year(**y)) {
        return Err(ReshapeError::MissingColumn(*missing));
    }
    Ok(years)
}

/// Every year column of the table, ascending.
pub fn detect_year_columns(table: &WideTable) -> Vec<Year> {
    let mut years = table.year_columns.clone();
    years.sort_unstable();
    years.dedup();
    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WideRecord;
    use std::collections::HashSet;

    fn sample_table() -> WideTable {
        let mut table = WideTable::new(vec![1960, 1961, 1962]);
        table.push(
            WideRecord::new("X")
                .with_value(1960, Some(100.0))
                .with_value(1961, Some(110.0))
                .with_value(1962, Some(121.0)),
        );
        table.push(
            WideRecord::new("Y")
                .with_value(1960, None)
                .with_value(1961, Some(7.0))
                .with_value(1962, Some(0.0)),
        );
        table
    }

    #[test]
    fn test_example_row() {
        let mut table = WideTable::new(vec![1960, 1961]);
        table.push(
            WideRecord::new("X")
                .with_value(1960, Some(100.0))
                .with_value(1961, Some(110.0)),
        );

        let long = reshape(&table, &[1960, 1961]).unwrap();
        assert_eq!(
            long,
            vec![
                LongRecord::new("X", 1960, Some(100.0)),
                LongRecord::new("X", 1961, Some(110.0)),
            ]
        );
    }

    #[test]
    fn test_cardinality_is_rows_times_years() {
        let table = sample_table();
        for years in [vec![], vec![1961], vec![1960, 1962], vec![1960, 1961, 1962]] {
            let long = reshape(&table, &years).unwrap();
            assert_eq!(long.len(), table.len() * years.len());
        }
    }

    #[test]
    fn test_unique_country_year_keys() {
        let long = reshape(&sample_table(), &[1960, 1961, 1962]).unwrap();
        let keys: HashSet<(&str, Year)> = long.iter().map(|r| (r.country.as_str(), r.year)).collect();
        assert_eq!(keys.len(), long.len());
    }

    #[test]
    fn test_values_match_wide_cells() {
        let table = sample_table();
        let long = reshape(&table, &[1960, 1961, 1962]).unwrap();
        for record in &long {
            let wide = table.records.iter().find(|w| w.country == record.country).unwrap();
            assert_eq!(wide.value(record.year), record.population);
        }
    }

    #[test]
    fn test_nulls_pass_through() {
        let long = reshape(&sample_table(), &[1960]).unwrap();
        assert_eq!(long[1], LongRecord::new("Y", 1960, None));
    }

    #[test]
    fn test_year_major_order() {
        let long = reshape(&sample_table(), &[1961, 1960]).unwrap();
        let order: Vec<(&str, Year)> = long.iter().map(|r| (r.country.as_str(), r.year)).collect();
        assert_eq!(order, vec![("X", 1961), ("Y", 1961), ("X", 1960), ("Y", 1960)]);
    }

    #[test]
    fn test_duplicate_countries_kept() {
        let mut table = WideTable::new(vec![2000]);
        table.push(WideRecord::new("Dup").with_value(2000, Some(1.0)));
        table.push(WideRecord::new("Dup").with_value(2000, Some(2.0)));

        let long = reshape(&table, &[2000]).unwrap();
        assert_eq!(long.len(), 2);
    }

    #[test]
    fn test_missing_year_is_schema_error() {
        let err = reshape(&sample_table(), &[1960, 1999]).unwrap_err();
        assert_eq!(err, ReshapeError::MissingColumn(1999));
    }

    #[test]
    fn test_year_columns_from_range() {
        let table = sample_table();
        assert_eq!(
            year_columns(&table, &YearRange { start: 1960, end: 1961 }).unwrap(),
            vec![1960, 1961]
        );
        assert_eq!(
            year_columns(&table, &YearRange { start: 1960, end: 1963 }).unwrap_err(),
            ReshapeError::MissingColumn(1963)
        );
    }

    #[test]
    fn test_detect_year_columns_sorted() {
        let table = WideTable::new(vec![1962, 1960, 1961]);
        assert_eq!(detect_year_columns(&table), vec![1960, 1961, 1962]);
    }
}
