//! Year-over-year growth rate per country.
//!
//! Records are partitioned by country and each partition is ordered by year.
//! The growth of a record is the percentage change from the record before it
//! in its partition. It is null for the first year of a country, and whenever
//! either value is null or the previous value is zero.

use std::collections::HashMap;

use crate::models::{GrowthRecord, LongRecord};

/// Percentage change from `prev` to `curr`.
pub fn pct_change(prev: Option<f64>, curr: Option<f64>) -> Option<f64> {
    match (prev, curr) {
        (Some(prev), Some(curr)) if prev != 0.0 => {
            let rate = (curr - prev) / prev * 100.0;
            rate.is_finite().then_some(rate)
        }
        _ => None,
    }
}

/// Attach a growth rate to every record. Output keeps the input order.
pub fn growth_rates(records: &[LongRecord]) -> Vec<GrowthRecord> {
    let mut partitions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        partitions.entry(record.country.as_str()).or_default().push(idx);
    }

    let mut rates: Vec<Option<f64>> = vec![None; records.len()];
    for indices in partitions.values_mut() {
        // stable: equal years keep input order
        indices.sort_by_key(|&i| records[i].year);
        for pair in indices.windows(2) {
            rates[pair[1]] = pct_change(records[pair[0]].population, records[pair[1]].population);
        }
    }

    records
        .iter()
        .zip(rates)
        .map(|(record, rate)| GrowthRecord::from_long(record.clone(), rate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn rate_of(out: &[GrowthRecord], country: &str, year: i32) -> Option<f64> {
        out.iter()
            .find(|r| r.country == country && r.year == year)
            .and_then(|r| r.growth_rate)
    }

    #[test]
    fn test_example_growth() {
        let records = vec![
            LongRecord::new("X", 1960, Some(100.0)),
            LongRecord::new("X", 1961, Some(110.0)),
        ];
        let out = growth_rates(&records);

        assert_eq!(out[0].growth_rate, None);
        assert!((out[1].growth_rate.unwrap() - 10.0).abs() < TOLERANCE);
        assert_eq!(out[1].population, Some(110.0));
    }

    #[test]
    fn test_first_year_is_null_regardless_of_order() {
        let records = vec![
            LongRecord::new("A", 2001, Some(200.0)),
            LongRecord::new("B", 2000, Some(5.0)),
            LongRecord::new("A", 2000, Some(100.0)),
        ];
        let out = growth_rates(&records);

        assert_eq!(rate_of(&out, "A", 2000), None);
        assert_eq!(rate_of(&out, "B", 2000), None);
        assert!((rate_of(&out, "A", 2001).unwrap() - 100.0).abs() < TOLERANCE);
        // input order preserved
        assert_eq!(out[0].year, 2001);
        assert_eq!(out[2].country, "A");
    }

    #[test]
    fn test_null_and_zero_previous_values() {
        let records = vec![
            LongRecord::new("Z", 2000, Some(0.0)),
            LongRecord::new("Z", 2001, Some(10.0)),
            LongRecord::new("Z", 2002, None),
            LongRecord::new("Z", 2003, Some(12.0)),
            LongRecord::new("Z", 2004, Some(15.0)),
        ];
        let out = growth_rates(&records);

        assert_eq!(out[1].growth_rate, None); // previous is zero
        assert_eq!(out[2].growth_rate, None); // current is null
        assert_eq!(out[3].growth_rate, None); // previous is null
        assert!((out[4].growth_rate.unwrap() - 25.0).abs() < TOLERANCE);
        assert!(out.iter().all(|r| r.growth_rate.map_or(true, f64::is_finite)));
    }

    #[test]
    fn test_partitions_are_independent() {
        let base = vec![
            LongRecord::new("A", 2000, Some(50.0)),
            LongRecord::new("A", 2001, Some(55.0)),
        ];
        let mut with_other = base.clone();
        with_other.push(LongRecord::new("B", 2000, Some(1.0)));
        with_other.push(LongRecord::new("B", 2001, Some(0.0)));

        let alone = growth_rates(&base);
        let mixed = growth_rates(&with_other);
        assert_eq!(alone[..], mixed[..2]);
        assert!((rate_of(&mixed, "B", 2001).unwrap() + 100.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_formula_matches_definition() {
        let values = [3.0, 7.5, 7.5, 1.25, 1e9, 1.5e9];
        let records: Vec<LongRecord> = values
            .iter()
            .enumerate()
            .map(|(i, v)| LongRecord::new("C", 1990 + i as i32, Some(*v)))
            .collect();
        let out = growth_rates(&records);

        for i in 1..values.len() {
            let expected = 100.0 * (values[i] - values[i - 1]) / values[i - 1];
            assert!((out[i].growth_rate.unwrap() - expected).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_pct_change() {
        assert_eq!(pct_change(None, Some(1.0)), None);
        assert_eq!(pct_change(Some(1.0), None), None);
        assert_eq!(pct_change(Some(0.0), Some(1.0)), None);
        assert_eq!(pct_change(Some(-0.0), Some(1.0)), None);
        assert_eq!(pct_change(Some(4.0), Some(2.0)), Some(-50.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(growth_rates(&[]).is_empty());
    }
}
