//! ASCII plotting for terminal output.
//!
//! A fixed-size character grid, deterministic so it can be golden-tested.
//! Each series draws its curve with `-` and its measured points with its own
//! glyph; points overwrite curves.

use crate::domain::CircuitFamily;
use crate::experiment::FamilyFit;
use crate::math::linspace;

/// One data set on the terminal plot.
#[derive(Debug, Clone)]
pub struct AsciiSeries {
    pub label: String,
    pub glyph: char,
    pub points: Vec<(f64, f64)>,
    pub curve: Vec<(f64, f64)>,
}

impl AsciiSeries {
    /// Measured OTOC points plus the fitted decay, when the fit succeeded.
    pub fn from_family(ff: &FamilyFit) -> Self {
        let points: Vec<(f64, f64)> = ff
            .series
            .depths
            .iter()
            .copied()
            .zip(ff.series.values.iter().copied())
            .collect();
        let curve = match (ff.decay(), x_range(&points)) {
            (Some(fit), Some((lo, hi))) => linspace(lo, hi, 60)
                .into_iter()
                .map(|t| (t, fit.predict(t)))
                .collect(),
            _ => Vec::new(),
        };
        Self {
            label: ff.series.family.display_name().to_string(),
            glyph: family_glyph(ff.series.family),
            points,
            curve,
        }
    }
}

pub fn family_glyph(family: CircuitFamily) -> char {
    match family {
        CircuitFamily::Chaotic => '*',
        CircuitFamily::Integrable => 'o',
        CircuitFamily::Intermediate => '+',
        CircuitFamily::KickedIsing => 'k',
        CircuitFamily::Syk => 's',
        CircuitFamily::Floquet => 'f',
    }
}

/// Render all series on one grid with a range header and a legend.
/// `axes` names the x and y quantities in the header.
pub fn render_ascii_plot(
    series: &[AsciiSeries],
    axes: (&str, &str),
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let xs: Vec<(f64, f64)> = series
        .iter()
        .flat_map(|s| s.points.iter().chain(&s.curve).copied())
        .collect();
    let (x_min, x_max) = x_range(&xs).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(&xs).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for s in series {
        draw_curve(&mut grid, &s.curve, (x_min, x_max), (y_min, y_max));
    }
    for s in series {
        for &(x, y) in &s.points {
            if !y.is_finite() {
                continue;
            }
            let col = map_x(x, x_min, x_max, width);
            let row = map_y(y, y_min, y_max, height);
            grid[row][col] = s.glyph;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {}=[{x_min:.1}, {x_max:.1}] | {}=[{y_min:.3}, {y_max:.3}]\n",
        axes.0, axes.1
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    let legend: Vec<String> = series
        .iter()
        .map(|s| format!("{} {}", s.glyph, s.label))
        .collect();
    out.push_str(&legend.join("   "));
    out.push('\n');
    out
}

fn x_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &(x, _) in points {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    (min_x.is_finite() && max_x.is_finite() && max_x > min_x).then_some((min_x, max_x))
}

fn y_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points.iter().filter(|p| p.1.is_finite()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    (min_y.is_finite() && max_y.is_finite() && max_y > min_y).then_some((min_y, max_y))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let pad = ((max - min).abs() * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // row 0 is the top of the plot
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], xr: (f64, f64), yr: (f64, f64)) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve.iter().filter(|p| p.1.is_finite()) {
        let col = map_x(x, xr.0, xr.1, width);
        let row = map_y(y, yr.0, yr.1, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, '-'),
            None => grid[row][col] = '-',
        }
        prev = Some((col, row));
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OtocSeries;
    use crate::fit::{DEFAULT_T_EFF, FitOptions};

    #[test]
    fn plot_golden_snapshot_small() {
        let series = AsciiSeries {
            label: "Chaotic".to_string(),
            glyph: '*',
            points: vec![(1.0, 0.1), (10.0, 0.2)],
            curve: linspace(1.0, 10.0, 10).into_iter().map(|x| (x, 0.1)).collect(),
        };

        let txt = render_ascii_plot(&[series], ("depth", "otoc"), 10, 5);
        let expected = concat!(
            "Plot: depth=[1.0, 10.0] | otoc=[0.095, 0.205]\n",
            "         *\n",
            "\n",
            "\n",
            "\n",
            "*---------\n",
            "* Chaotic\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn failed_fit_draws_points_only() {
        let ff = FamilyFit::new(
            OtocSeries::new(CircuitFamily::Syk, &[1, 2], vec![0.4, 0.3]),
            &FitOptions::hardware_decay(),
            DEFAULT_T_EFF,
        );
        let s = AsciiSeries::from_family(&ff);
        assert!(s.curve.is_empty());
        assert_eq!(s.points.len(), 2);
        assert_eq!(s.glyph, 's');
    }

    #[test]
    fn tiny_grid_is_clamped() {
        let txt = render_ascii_plot(&[], ("x", "y"), 2, 2);
        // header + 5 rows + legend
        assert_eq!(txt.lines().count(), 7);
    }
}
