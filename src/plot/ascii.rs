//! ASCII plotting for terminal output.
//!
//! Deterministic, fixed-size text rendering of `ChartSeries`:
//! - `render_bar_chart`: horizontal bars, one per label (first series only)
//! - `render_line_chart`: grid plot over the label axis, one glyph per series

use crate::report::ChartSeries;

const SERIES_GLYPHS: [char; 6] = ['o', '*', '+', 'x', '#', '@'];

/// Horizontal bars scaled to `width` columns. Negative values draw no bar.
pub fn render_bar_chart(title: &str, chart: &ChartSeries, width: usize) -> String {
    let mut out = format!("{title}\n");
    let Some(series) = chart.series.first() else {
        out.push_str("  (no data)\n");
        return out;
    };
    if chart.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let width = width.max(10);
    let label_w = chart
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .min(20);
    let max = series
        .values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    for (label, value) in chart.labels.iter().zip(series.values.iter()) {
        let len = if max > 0.0 && value.is_finite() && *value > 0.0 {
            ((value / max) * width as f64).round() as usize
        } else {
            0
        };
        let line = format!(
            "{:<label_w$} |{:<width$} {:.2}",
            clip(label, label_w),
            "#".repeat(len.min(width)),
            value,
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Grid plot with x = label position, y = value. Series are drawn in order,
/// so later series overwrite earlier ones where they cross.
pub fn render_line_chart(title: &str, chart: &ChartSeries, width: usize, height: usize) -> String {
    let mut out = format!("{title}\n");
    if chart.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let width = width.max(10);
    let height = height.max(5);
    let n = chart.labels.len();

    let (y_min, y_max) = y_range(chart).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for (s_idx, series) in chart.series.iter().enumerate() {
        let glyph = SERIES_GLYPHS[s_idx % SERIES_GLYPHS.len()];
        let mut prev = None;
        for (i, &v) in series.values.iter().enumerate().take(n) {
            if !v.is_finite() {
                prev = None;
                continue;
            }
            let x = map_x(i, n, width);
            let y = map_y(v, y_min, y_max, height);
            if let Some((x0, y0)) = prev {
                draw_line(&mut grid, x0, y0, x, y, '.');
            }
            prev = Some((x, y));
        }
        for (i, &v) in series.values.iter().enumerate().take(n) {
            if v.is_finite() {
                grid[map_y(v, y_min, y_max, height)][map_x(i, n, width)] = glyph;
            }
        }
    }

    out.push_str(&format!("y=[{y_min:.2}, {y_max:.2}]\n"));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out.push_str(&format!(
        "x: {} .. {}\n",
        chart.labels.first().map(String::as_str).unwrap_or(""),
        chart.labels.last().map(String::as_str).unwrap_or(""),
    ));
    for (s_idx, series) in chart.series.iter().enumerate() {
        out.push_str(&format!(
            "  {} {}\n",
            SERIES_GLYPHS[s_idx % SERIES_GLYPHS.len()],
            series.name
        ));
    }
    out
}

fn y_range(chart: &ChartSeries) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for v in chart.series.iter().flat_map(|s| s.values.iter()) {
        if v.is_finite() {
            min_y = min_y.min(*v);
            max_y = max_y.max(*v);
        }
    }
    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        // Flat series: open a unit band around the value.
        Some((min_y - 0.5, max_y + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

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

fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
