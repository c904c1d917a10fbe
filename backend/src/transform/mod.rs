//! Transformation module.
//!
//! - Reshape: wide year columns to long (country, year, population) rows
//! - Growth: year-over-year growth rate per country
//! - Pipeline: load, analyze, chart and export

pub mod growth;
pub mod reshape;
pub mod pipeline;

pub use growth::{growth_rates, pct_change};
pub use reshape::{detect_year_columns, reshape, year_columns};
pub use pipeline::*;
