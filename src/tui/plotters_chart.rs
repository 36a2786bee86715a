//! Plotters-powered temperature chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`,
//! which keeps the terminal chart visually consistent with the SVG export.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::plot::ChartSeries;

/// High-contrast line colors, one per core (cycled).
pub const CORE_COLORS: [RGBColor; 4] = [
    RGBColor(0, 255, 255),
    RGBColor(255, 200, 0),
    RGBColor(0, 255, 0),
    RGBColor(255, 0, 255),
];

const DIM: RGBColor = RGBColor(110, 110, 110);

/// A render-only chart description; series and bounds are computed outside the render call.
pub struct CoreChart<'a> {
    pub series: &'a [ChartSeries],
    /// Index of the highlighted core; every other core is drawn dimmed.
    pub selected: usize,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

pub fn core_color(idx: usize) -> RGBColor {
    CORE_COLORS[idx % CORE_COLORS.len()]
}

impl<'a> Widget for CoreChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are noise at terminal resolution; axes + labels are enough.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{v:.1}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Dimmed cores first so the selected one stays on top.
            for (idx, s) in self.series.iter().enumerate() {
                if idx != self.selected {
                    chart.draw_series(LineSeries::new(s.points.iter().copied(), &DIM))?;
                }
            }

            if let Some(s) = self.series.get(self.selected) {
                let color = core_color(self.selected);
                chart.draw_series(LineSeries::new(s.points.iter().copied(), &color))?;
                // `Circle` radii are mis-scaled by the ratatui backend; pixels render as clean dots.
                chart.draw_series(s.points.iter().map(|&p| Pixel::new(p, WHITE)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
