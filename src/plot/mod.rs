//! Visualization of the raw samples.
//!
//! Renderers receive plain `(time, temperature)` series, one per core, and draw
//! them on shared axes:
//!
//! - `ascii`: fixed-size terminal chart
//! - `svg`: Plotters SVG file
//!
//! The interactive viewer (`crate::tui`) draws the same series.

use std::path::PathBuf;

use crate::domain::TemperatureSeries;
use crate::error::AppError;

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;

pub const CHART_TITLE: &str = "CPU Core Temperatures";
pub const X_LABEL: &str = "Time in Seconds";
pub const Y_LABEL: &str = "Core Temperature";

/// One labelled line of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Something that can display the sample series of every core at once.
pub trait PlotRenderer {
    fn render(&mut self, series: &[ChartSeries]) -> Result<(), AppError>;
}

/// One chart series per core, labelled `core N`.
pub fn chart_series(series: &TemperatureSeries) -> Vec<ChartSeries> {
    series
        .cores
        .iter()
        .map(|core| ChartSeries {
            label: core.core.to_string(),
            points: series.points(core),
        })
        .collect()
}

/// Shared axis bounds over all series: `([x0, x1], [y0, y1])`.
///
/// Returns `None` when there are no finite points or a range is empty.
pub fn bounds(series: &[ChartSeries]) -> Option<([f64; 2], [f64; 2])> {
    let mut x = [f64::INFINITY, f64::NEG_INFINITY];
    let mut y = [f64::INFINITY, f64::NEG_INFINITY];
    for &(px, py) in series.iter().flat_map(|s| s.points.iter()) {
        if !(px.is_finite() && py.is_finite()) {
            continue;
        }
        x = [x[0].min(px), x[1].max(px)];
        y = [y[0].min(py), y[1].max(py)];
    }
    if !(x[0].is_finite() && x[1].is_finite() && y[0].is_finite() && y[1].is_finite()) {
        return None;
    }
    if x[1] <= x[0] {
        x = [x[0] - 0.5, x[1] + 0.5];
    }
    if y[1] <= y[0] {
        y = [y[0] - 0.5, y[1] + 0.5];
    }
    Some((x, y))
}

/// Prints the ASCII chart to stdout.
#[derive(Debug, Clone)]
pub struct AsciiPlot {
    pub width: usize,
    pub height: usize,
}

impl PlotRenderer for AsciiPlot {
    fn render(&mut self, series: &[ChartSeries]) -> Result<(), AppError> {
        println!("{}", render_ascii_chart(series, self.width, self.height));
        Ok(())
    }
}

/// Writes an SVG chart file.
#[derive(Debug, Clone)]
pub struct SvgPlot {
    pub path: PathBuf,
    pub size: (u32, u32),
}

impl PlotRenderer for SvgPlot {
    fn render(&mut self, series: &[ChartSeries]) -> Result<(), AppError> {
        write_svg_chart(&self.path, series, self.size)
    }
}
