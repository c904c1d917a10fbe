//! SVG rendering of a [`ChartSpec`].
//!
//! Line charts draw one polyline per dataset over evenly spaced labels and
//! break the line where a value is missing. Bar charts draw one bar per
//! label, horizontally when the spec's index axis is `y`.

use std::fmt::Write;

use super::{ChartKind, ChartSpec};

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 600.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 40.0;
const LEGEND_WIDTH: f64 = 170.0;
const FONT: &str = "DejaVu Sans, Arial, sans-serif";
const GRID_COLOR: &str = "#b0b0b0";
const MAX_X_LABELS: usize = 16;

/// Plot area in pixels.
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl Frame {
    fn width(&self) -> f64 {
        self.right - self.left
    }

    fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Linear mapping from data values to pixels.
#[derive(Debug, Clone, Copy)]
struct Scale {
    min: f64,
    max: f64,
    from: f64,
    to: f64,
}

impl Scale {
    fn map(&self, v: f64) -> f64 {
        self.from + (v - self.min) / (self.max - self.min) * (self.to - self.from)
    }
}

/// Render the chart as a standalone SVG document.
pub fn render(spec: &ChartSpec) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}">"#,
        w = WIDTH,
        h = HEIGHT,
        font = FONT
    );
    let _ = writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#);

    match spec.kind {
        ChartKind::Line => render_line(spec, &mut out),
        ChartKind::Bar if spec.is_horizontal() => render_horizontal_bars(spec, &mut out),
        ChartKind::Bar => render_vertical_bars(spec, &mut out),
    }

    out.push_str("</svg>\n");
    out
}

fn render_line(spec: &ChartSpec, out: &mut String) {
    let legend = !spec.data.datasets.is_empty();
    let frame = Frame {
        left: MARGIN_LEFT,
        top: MARGIN_TOP,
        right: WIDTH - MARGIN_RIGHT - if legend { LEGEND_WIDTH } else { 0.0 },
        bottom: HEIGHT - MARGIN_BOTTOM,
    };
    draw_titles(spec, &frame, out);

    let values = spec.data.datasets.iter().flat_map(|d| d.data.iter().flatten().copied());
    let ticks = nice_ticks(values, 6);
    let y = Scale {
        min: ticks[0],
        max: ticks[ticks.len() - 1],
        from: frame.bottom,
        to: frame.top,
    };
    draw_value_grid_y(&ticks, &y, &frame, out);

    let n = spec.data.labels.len();
    let x_at = |i: usize| {
        if n <= 1 {
            frame.left + frame.width() / 2.0
        } else {
            frame.left + i as f64 * frame.width() / (n - 1) as f64
        }
    };
    let every = n.div_ceil(MAX_X_LABELS).max(1);
    for (i, label) in spec.data.labels.iter().enumerate().step_by(every) {
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="middle">{}</text>"#,
            x_at(i),
            frame.bottom + 18.0,
            escape(label)
        );
    }
    draw_axes(&frame, out);

    for dataset in &spec.data.datasets {
        let mut path = String::new();
        let mut pen_down = false;
        for (i, value) in dataset.data.iter().enumerate() {
            match value {
                Some(v) => {
                    let cmd = if pen_down { 'L' } else { 'M' };
                    let _ = write!(path, "{}{:.1},{:.1} ", cmd, x_at(i), y.map(*v));
                    pen_down = true;
                }
                None => pen_down = false,
            }
        }
        let _ = writeln!(
            out,
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="2" stroke-opacity="0.9"/>"#,
            path.trim_end(),
            dataset.border_color
        );

        // isolated points would not show as a line
        for (i, value) in dataset.data.iter().enumerate() {
            let prev = i.checked_sub(1).and_then(|j| dataset.data[j]);
            let next = dataset.data.get(i + 1).copied().flatten();
            if let (Some(v), None, None) = (value, prev, next) {
                let _ = writeln!(
                    out,
                    r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{}"/>"#,
                    x_at(i),
                    y.map(*v),
                    dataset.border_color
                );
            }
        }
    }

    if legend {
        draw_legend(spec, frame.right + 20.0, frame.top, out);
    }
}

fn render_horizontal_bars(spec: &ChartSpec, out: &mut String) {
    let longest = spec.data.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let frame = Frame {
        left: MARGIN_LEFT.max(longest as f64 * 7.5 + 20.0),
        top: MARGIN_TOP,
        right: WIDTH - MARGIN_RIGHT,
        bottom: HEIGHT - MARGIN_BOTTOM,
    };
    draw_titles(spec, &frame, out);

    let Some(dataset) = spec.data.datasets.first() else {
        draw_axes(&frame, out);
        return;
    };

    let ticks = nice_ticks(dataset.data.iter().flatten().copied().chain([0.0]), 6);
    let x = Scale {
        min: ticks[0],
        max: ticks[ticks.len() - 1],
        from: frame.left,
        to: frame.right,
    };
    for tick in &ticks {
        let px = x.map(*tick);
        let _ = writeln!(
            out,
            r#"<line x1="{px:.1}" y1="{:.1}" x2="{px:.1}" y2="{:.1}" stroke="{}" stroke-opacity="0.3"/>"#,
            frame.top,
            frame.bottom,
            GRID_COLOR
        );
        let _ = writeln!(
            out,
            r#"<text x="{px:.1}" y="{:.1}" font-size="12" text-anchor="middle">{}</text>"#,
            frame.bottom + 18.0,
            format_tick(*tick)
        );
    }

    let n = spec.data.labels.len().max(1);
    let band = frame.height() / n as f64;
    let zero = x.map(0.0);
    for (i, label) in spec.data.labels.iter().enumerate() {
        let top = frame.top + i as f64 * band;
        if let Some(Some(v)) = dataset.data.get(i) {
            let end = x.map(*v);
            let _ = writeln!(
                out,
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                zero.min(end),
                top + band * 0.1,
                (end - zero).abs(),
                band * 0.8,
                bar_color(dataset, i)
            );
        }
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            frame.left - 8.0,
            top + band / 2.0,
            escape(label)
        );
    }
    draw_axes(&frame, out);
}

fn render_vertical_bars(spec: &ChartSpec, out: &mut String) {
    let frame = Frame {
        left: MARGIN_LEFT,
        top: MARGIN_TOP,
        right: WIDTH - MARGIN_RIGHT,
        bottom: HEIGHT - MARGIN_BOTTOM,
    };
    draw_titles(spec, &frame, out);

    let Some(dataset) = spec.data.datasets.first() else {
        draw_axes(&frame, out);
        return;
    };

    let ticks = nice_ticks(dataset.data.iter().flatten().copied().chain([0.0]), 6);
    let y = Scale {
        min: ticks[0],
        max: ticks[ticks.len() - 1],
        from: frame.bottom,
        to: frame.top,
    };
    draw_value_grid_y(&ticks, &y, &frame, out);

    let n = spec.data.labels.len().max(1);
    let band = frame.width() / n as f64;
    let zero = y.map(0.0);
    for (i, label) in spec.data.labels.iter().enumerate() {
        let left = frame.left + i as f64 * band;
        if let Some(Some(v)) = dataset.data.get(i) {
            let end = y.map(*v);
            let _ = writeln!(
                out,
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                left + band * 0.1,
                zero.min(end),
                band * 0.8,
                (end - zero).abs(),
                bar_color(dataset, i)
            );
        }
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="middle">{}</text>"#,
            left + band / 2.0,
            frame.bottom + 18.0,
            escape(label)
        );
    }
    draw_axes(&frame, out);
}

fn bar_color(dataset: &super::ChartDataset, i: usize) -> &str {
    dataset
        .background_color
        .get(i)
        .map(String::as_str)
        .unwrap_or(&dataset.border_color)
}

fn draw_titles(spec: &ChartSpec, frame: &Frame, out: &mut String) {
    let options = &spec.options;
    if options.title.display {
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" font-size="20" text-anchor="middle">{}</text>"#,
            (frame.left + frame.right) / 2.0,
            MARGIN_TOP / 2.0 + 6.0,
            escape(&options.title.text)
        );
    }
    if options.scales.x.title.display {
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" font-size="15" text-anchor="middle">{}</text>"#,
            (frame.left + frame.right) / 2.0,
            HEIGHT - 20.0,
            escape(&options.scales.x.title.text)
        );
    }
    if options.scales.y.title.display {
        let cy = (frame.top + frame.bottom) / 2.0;
        let _ = writeln!(
            out,
            r#"<text x="22" y="{cy:.1}" font-size="15" text-anchor="middle" transform="rotate(-90 22 {cy:.1})">{}</text>"#,
            escape(&options.scales.y.title.text)
        );
    }
}

fn draw_value_grid_y(ticks: &[f64], y: &Scale, frame: &Frame, out: &mut String) {
    for tick in ticks {
        let py = y.map(*tick);
        let _ = writeln!(
            out,
            r#"<line x1="{:.1}" y1="{py:.1}" x2="{:.1}" y2="{py:.1}" stroke="{}" stroke-opacity="0.3"/>"#,
            frame.left,
            frame.right,
            GRID_COLOR
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{py:.1}" font-size="12" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            frame.left - 8.0,
            format_tick(*tick)
        );
    }
}

fn draw_axes(frame: &Frame, out: &mut String) {
    let _ = writeln!(
        out,
        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="black"/>"#,
        frame.left,
        frame.top,
        frame.width(),
        frame.height()
    );
}

fn draw_legend(spec: &ChartSpec, x: f64, top: f64, out: &mut String) {
    for (i, dataset) in spec.data.datasets.iter().enumerate() {
        let y = top + 10.0 + i as f64 * 22.0;
        let _ = writeln!(
            out,
            r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}" stroke-width="3"/>"#,
            x,
            x + 24.0,
            dataset.border_color
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{y:.1}" font-size="13" dominant-baseline="middle">{}</text>"#,
            x + 32.0,
            escape(&dataset.label)
        );
    }
}

/// Evenly spaced round tick values covering every value.
///
/// Always returns at least two ticks.
pub fn nice_ticks(values: impl IntoIterator<Item = f64>, target: usize) -> Vec<f64> {
    let (mut lo, mut hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if !lo.is_finite() {
        return vec![0.0, 1.0];
    }
    if lo == hi {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
        lo -= pad;
        hi += pad;
    }

    let raw = (hi - lo) / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let start = (lo / step).floor() * step;
    let mut ticks = Vec::new();
    let mut k = 0.0;
    loop {
        let tick = start + k * step;
        ticks.push(tick);
        if tick >= hi - step * 1e-9 {
            break;
        }
        k += 1.0;
    }
    if ticks.len() < 2 {
        ticks.push(start + step);
    }
    ticks
}

/// Axis label: `1.4B`, `250M`, `12.5`, `0`.
pub fn format_tick(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else {
        (value, "")
    };
    let text = format!("{:.2}", scaled);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    let text = if text == "-0" { "0" } else { text };
    format!("{}{}", text, suffix)
}

/// Escape text content for XML.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{population_trends, top_countries};
    use crate::models::LongRecord;
    use crate::report::CountryPopulation;

    #[test]
    fn test_nice_ticks_cover_range() {
        let ticks = nice_ticks([3.0, 97.0], 5);
        assert_eq!(ticks.first(), Some(&0.0));
        assert!(*ticks.last().unwrap() >= 97.0);
        assert!(ticks.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_nice_ticks_degenerate_inputs() {
        assert_eq!(nice_ticks(std::iter::empty(), 5), vec![0.0, 1.0]);
        let flat = nice_ticks([5.0, 5.0], 5);
        assert!(flat.len() >= 2);
        assert!(flat[0] <= 5.0 && *flat.last().unwrap() >= 5.0);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(1.4e9), "1.4B");
        assert_eq!(format_tick(250e6), "250M");
        assert_eq!(format_tick(12.5), "12.5");
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(-2.0), "-2");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("Latin America & Caribbean <x>"), "Latin America &amp; Caribbean &lt;x&gt;");
    }

    #[test]
    fn test_line_chart_breaks_on_gaps() {
        let records = vec![
            LongRecord::new("A", 2000, Some(1e6)),
            LongRecord::new("A", 2001, None),
            LongRecord::new("A", 2002, Some(3e6)),
            LongRecord::new("A", 2003, Some(4e6)),
        ];
        let spec = population_trends(&records, &["A".to_string()]).unwrap();
        let svg = render(&spec);

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Population Trends (2000-2003)"));
        // two segments: the isolated first point and the 2002-2003 line
        let path = svg.lines().find(|l| l.starts_with("<path")).unwrap();
        assert_eq!(path.matches('M').count(), 2);
        assert_eq!(svg.matches("<circle").count(), 1);
    }

    #[test]
    fn test_horizontal_bars() {
        let ranking = vec![
            CountryPopulation { country: "India".into(), population: 1.4e9 },
            CountryPopulation { country: "Trinidad & Tobago".into(), population: 1.5e6 },
        ];
        let svg = render(&top_countries(&ranking, 2023).unwrap());

        assert_eq!(svg.matches("<rect").count(), 2 + 2);
        assert!(svg.contains("Trinidad &amp; Tobago"));
        assert!(svg.contains("#440154"));
    }
}
