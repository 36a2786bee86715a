//! Plotters-powered SVG chart: scatter + line per core on shared axes.

use std::fmt::Display;
use std::path::Path;

use plotters::prelude::*;

use crate::error::AppError;
use crate::plot::{CHART_TITLE, ChartSeries, X_LABEL, Y_LABEL, bounds};

/// Write the combined chart to `path`.
pub fn write_svg_chart(path: &Path, series: &[ChartSeries], size: (u32, u32)) -> Result<(), AppError> {
    let ([x0, x1], [y0, y1]) = bounds(series).ok_or_else(|| AppError::new(4, "Nothing to plot."))?;
    let err = |e: &dyn Display| AppError::new(2, format!("Failed to render SVG chart '{}': {e}", path.display()));

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| err(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(CHART_TITLE, ("sans-serif", 20))
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(|e| err(&e))?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .draw()
        .map_err(|e| err(&e))?;

    for (idx, s) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();

        chart
            .draw_series(LineSeries::new(s.points.iter().copied(), &color))
            .map_err(|e| err(&e))?
            .label(s.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));

        chart
            .draw_series(s.points.iter().map(|&p| Circle::new(p, 3, color.filled())))
            .map_err(|e| err(&e))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| err(&e))?;

    root.present().map_err(|e| err(&e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_svg_with_legend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        let series = vec![
            ChartSeries {
                label: "core 0".to_string(),
                points: vec![(0.0, 40.0), (30.0, 42.0), (60.0, 44.0)],
            },
            ChartSeries {
                label: "core 1".to_string(),
                points: vec![(0.0, 45.0), (30.0, 43.0), (60.0, 47.0)],
            },
        ];

        write_svg_chart(&path, &series, (640, 480)).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains(CHART_TITLE));
        assert!(svg.contains("core 1"));
    }

    #[test]
    fn empty_series_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_svg_chart(&dir.path().join("x.svg"), &[], (100, 100)).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
