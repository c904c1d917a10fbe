//! Chart descriptions for the three analysis charts.
//!
//! A [`ChartSpec`] serializes to Chart.js-compatible JSON and is rendered
//! to an SVG image by [`svg::render`].
//!
//! - [`population_trends`] - population in millions per year, one line per country
//! - [`top_countries`] - horizontal bars for the most populated countries of one year
//! - [`growth_rates`] - annual growth rate in percent, one line per country

pub mod svg;

use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::{ChartError, ChartResult};
use crate::logs::log_warning;
use crate::models::{GrowthRecord, LongRecord, Year};
use crate::report::CountryPopulation;

/// Line colours, cycled per dataset.
pub const LINE_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

/// Anchors of the viridis colour map, dark to light.
const VIRIDIS: [(u8, u8, u8); 6] = [
    (68, 1, 84),
    (65, 68, 135),
    (42, 120, 142),
    (34, 168, 132),
    (122, 209, 81),
    (253, 231, 37),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// One series.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    /// One value per label; `None` leaves a gap
    pub data: Vec<Option<f64>>,
    pub border_color: String,
    /// Per-point fill colours (bars)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub background_color: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TitleOptions {
    pub display: bool,
    pub text: String,
}

impl TitleOptions {
    fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self { display: !text.is_empty(), text }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AxisOptions {
    pub title: TitleOptions,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScaleOptions {
    pub x: AxisOptions,
    pub y: AxisOptions,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    /// `"y"` for horizontal bars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_axis: Option<String>,
    pub title: TitleOptions,
    pub scales: ScaleOptions,
}

/// A complete chart, Chart.js layout.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

impl ChartSpec {
    fn new(kind: ChartKind, title: &str, x_title: &str, y_title: &str) -> Self {
        Self {
            kind,
            data: ChartData { labels: Vec::new(), datasets: Vec::new() },
            options: ChartOptions {
                index_axis: None,
                title: TitleOptions::new(title),
                scales: ScaleOptions {
                    x: AxisOptions { title: TitleOptions::new(x_title) },
                    y: AxisOptions { title: TitleOptions::new(y_title) },
                },
            },
        }
    }

    pub fn title(&self) -> &str {
        &self.options.title.text
    }

    /// Bars run along the x axis, categories along y.
    pub fn is_horizontal(&self) -> bool {
        self.options.index_axis.as_deref() == Some("y")
    }

    pub fn to_json(&self) -> ChartResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the SVG rendering.
    pub fn write_svg(&self, path: &Path) -> ChartResult<()> {
        ensure_parent(path)?;
        fs::write(path, svg::render(self))?;
        Ok(())
    }

    /// Write the Chart.js description.
    pub fn write_json(&self, path: &Path) -> ChartResult<()> {
        ensure_parent(path)?;
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> ChartResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Colour of the `i`-th of `n` bars on the viridis map.
pub fn viridis(i: usize, n: usize) -> String {
    let t = if n <= 1 { 0.0 } else { i as f64 / (n - 1) as f64 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let lo = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - lo as f64;
    let (a, b) = (VIRIDIS[lo], VIRIDIS[lo + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    format!("#{:02x}{:02x}{:02x}", mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// One line per country over a shared year axis.
///
/// Countries without any point are skipped with a warning. If none is left
/// the chart keeps its title and axes and has no dataset.
fn line_chart<F>(mut spec: ChartSpec, countries: &[String], points: F) -> ChartResult<ChartSpec>
where
    F: Fn(&str) -> Vec<(Year, Option<f64>)>,
{
    let series: Vec<(&String, Vec<(Year, Option<f64>)>)> = countries
        .iter()
        .filter_map(|country| {
            let pts = points(country.as_str());
            if pts.iter().all(|(_, v)| v.is_none()) {
                log_warning(format!("No data for '{}' in chart '{}'", country, spec.title()));
                None
            } else {
                Some((country, pts))
            }
        })
        .collect();

    if series.is_empty() {
        log_warning(format!("Nothing to plot in chart '{}'", spec.title()));
        return Ok(spec);
    }

    let years: BTreeSet<Year> = series
        .iter()
        .flat_map(|(_, pts)| pts.iter().map(|(y, _)| *y))
        .collect();
    spec.data.labels = years.iter().map(|y| y.to_string()).collect();

    for (i, (country, pts)) in series.into_iter().enumerate() {
        let data = years
            .iter()
            .map(|year| pts.iter().find(|(y, _)| y == year).and_then(|(_, v)| *v))
            .collect();
        spec.data.datasets.push(ChartDataset {
            label: country.clone(),
            data,
            border_color: LINE_COLORS[i % LINE_COLORS.len()].to_string(),
            background_color: Vec::new(),
        });
    }

    Ok(spec)
}

/// Population in millions, one line per requested country.
pub fn population_trends(records: &[LongRecord], countries: &[String]) -> ChartResult<ChartSpec> {
    let (first, last) = match (
        records.iter().map(|r| r.year).min(),
        records.iter().map(|r| r.year).max(),
    ) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(ChartError::NoData("Population Trends".to_string())),
    };

    let spec = ChartSpec::new(
        ChartKind::Line,
        &format!("Population Trends ({}-{})", first, last),
        "Year",
        "Population (Millions)",
    );

    line_chart(spec, countries, |country| {
        let mut pts: Vec<(Year, Option<f64>)> = records
            .iter()
            .filter(|r| r.country == country)
            .map(|r| (r.year, r.population.map(|p| p / 1e6)))
            .collect();
        pts.sort_by_key(|(y, _)| *y);
        pts
    })
}

/// Horizontal bars for the given ranking.
pub fn top_countries(ranking: &[CountryPopulation], year: Year) -> ChartResult<ChartSpec> {
    let title = format!("Top {} Countries by Population ({})", ranking.len(), year);
    let mut spec = ChartSpec::new(ChartKind::Bar, &title, "Population", "");
    spec.options.index_axis = Some("y".to_string());
    if ranking.is_empty() {
        log_warning(format!("Nothing to plot in chart '{}'", title));
        return Ok(spec);
    }

    spec.data.labels = ranking.iter().map(|c| c.country.clone()).collect();
    spec.data.datasets.push(ChartDataset {
        label: "Population".to_string(),
        data: ranking.iter().map(|c| Some(c.population)).collect(),
        border_color: viridis(0, 1),
        background_color: (0..ranking.len()).map(|i| viridis(i, ranking.len())).collect(),
    });
    Ok(spec)
}

/// Annual growth rate in percent, one line per requested country.
pub fn growth_rates(records: &[GrowthRecord], countries: &[String]) -> ChartResult<ChartSpec> {
    let spec = ChartSpec::new(
        ChartKind::Line,
        "Annual Population Growth Rate (%)",
        "Year",
        "Growth Rate %",
    );

    line_chart(spec, countries, |country| {
        let mut pts: Vec<(Year, Option<f64>)> = records
            .iter()
            .filter(|r| r.country == country)
            .map(|r| (r.year, r.growth_rate))
            .collect();
        pts.sort_by_key(|(y, _)| *y);
        pts
    })
}
