//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - samples: the core's digit (`0`, `1`, ...)
//! - lines joining consecutive samples: `-`

use crate::plot::{ChartSeries, bounds};

/// Render all series on shared axes.
pub fn render_ascii_chart(series: &[ChartSeries], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((x_bounds, y_bounds)) = bounds(series) else {
        return "Plot: no data\n".to_string();
    };
    let [t_min, t_max] = x_bounds;
    let (y_min, y_max) = pad_range(y_bounds[0], y_bounds[1], 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so samples can overlay them.
    for s in series {
        let cells: Vec<(usize, usize)> = s
            .points
            .iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|&(x, y)| (map_x(x, t_min, t_max, width), map_y(y, y_min, y_max, height)))
            .collect();
        for pair in cells.windows(2) {
            draw_line(&mut grid, pair[0], pair[1], '-');
        }
    }

    for (idx, s) in series.iter().enumerate() {
        let ch = glyph(idx);
        for &(x, y) in &s.points {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            grid[map_y(y, y_min, y_max, height)][map_x(x, t_min, t_max, width)] = ch;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: time=[{t_min:.1}, {t_max:.1}] | temp=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let legend: Vec<String> = series
        .iter()
        .enumerate()
        .map(|(idx, s)| format!("{}={}", glyph(idx), s.label))
        .collect();
    out.push_str(&format!("Legend: {}\n", legend.join(", ")));

    out
}

fn glyph(idx: usize) -> char {
    char::from_digit((idx % 10) as u32, 10).unwrap_or('*')
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
