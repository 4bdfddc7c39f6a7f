use kurbo::Point;

use crate::{canvas::Canvas, color::Rgba};

/// Vertices of a star polygon: `points` outer tips starting straight up,
/// alternating with inner vertices at `inner_radius`.
pub fn star_points(
    center_x: f32,
    center_y: f32,
    outer_radius: f32,
    inner_radius: f32,
    points: u32,
) -> Vec<Point> {
    let n = points.max(2) as usize;
    let mut out = Vec::with_capacity(n * 2);
    let mut angle = -std::f32::consts::FRAC_PI_2;
    let step = std::f32::consts::PI / n as f32;
    for i in 0..n * 2 {
        let radius = if i % 2 == 0 {
            outer_radius
        } else {
            inner_radius
        };
        out.push(Point::new(
            f64::from(center_x + radius * angle.cos()),
            f64::from(center_y + radius * angle.sin()),
        ));
        angle += step;
    }
    out
}

const SUBSAMPLES: u32 = 4;

/// Fill a closed polygon with even-odd scanline coverage, 4x4 supersampled.
///
/// Deterministic: sample positions are fixed fractions of the pixel grid and
/// crossings are sorted with a total order, so identical inputs always yield
/// identical coverage.
pub fn fill_polygon(canvas: &mut Canvas, vertices: &[Point], color: Rgba) {
    if vertices.len() < 3 {
        return;
    }

    let min_y = vertices.iter().map(|p| p.y).fold(f64::MAX, f64::min);
    let max_y = vertices.iter().map(|p| p.y).fold(f64::MIN, f64::max);
    let y0 = (min_y.floor().max(0.0)) as u32;
    let y1 = (max_y.ceil().max(0.0) as u32).min(canvas.height());
    if y0 >= y1 {
        return;
    }

    let width = canvas.width() as usize;
    let mut coverage = vec![0u8; width];
    let mut crossings: Vec<f64> = Vec::with_capacity(vertices.len());

    for py in y0..y1 {
        coverage.iter_mut().for_each(|c| *c = 0);
        for sub in 0..SUBSAMPLES {
            let sample_y = f64::from(py) + (f64::from(sub) + 0.5) / f64::from(SUBSAMPLES);
            crossings.clear();
            for i in 0..vertices.len() {
                let a = vertices[i];
                let b = vertices[(i + 1) % vertices.len()];
                if (a.y <= sample_y) == (b.y <= sample_y) {
                    continue;
                }
                let t = (sample_y - a.y) / (b.y - a.y);
                crossings.push(a.x + t * (b.x - a.x));
            }
            crossings.sort_by(f64::total_cmp);
            for pair in crossings.chunks_exact(2) {
                accumulate_span(&mut coverage, pair[0], pair[1], width);
            }
        }
        for (px, &cov) in coverage.iter().enumerate() {
            if cov > 0 {
                let total = SUBSAMPLES * SUBSAMPLES;
                let frac = f32::from(cov.min(total as u8)) / total as f32;
                let x = px as i64;
                // single-pixel blended fill through the canvas clip path
                canvas.fill_rect(
                    x,
                    i64::from(py),
                    1,
                    1,
                    color.with_alpha_scaled(frac),
                );
            }
        }
    }
}

/// Add horizontal subsample hits for the span [x_start, x_end) to `coverage`.
fn accumulate_span(coverage: &mut [u8], x_start: f64, x_end: f64, width: usize) {
    let step = 1.0 / f64::from(SUBSAMPLES);
    let first = (x_start.max(0.0) / step).ceil() as i64;
    let last = (x_end.min(width as f64) / step).ceil() as i64;
    for s in first..last {
        let sample_x = (s as f64 + 0.5) * step;
        let px = sample_x as usize;
        if px < width {
            coverage[px] = coverage[px].saturating_add(1);
        }
    }
}
