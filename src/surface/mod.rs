pub mod cpu;

use crate::common::color::Color;
use crate::common::simulation::LightSegment;
use crate::common::vector::Vector2;

/// After a `LightSegment` is produced, it is drawn onto a `Surface`. Each tracer owns its own
/// surface for the duration of a render, so surfaces only need to be `Send`; the `Simulator`
/// merges them once their tracer has finished.
///
/// Implementations only provide `plot`. Segments are rasterised with integer Bresenham steps:
/// the starting pixel is lit, the final pixel is not, so the consecutive segments of a photon's
/// path light their shared pixel exactly once.
pub trait Surface: Send {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Adds `color` to the pixel at `(x, y)`. Out of bounds pixels are ignored.
    fn plot(&mut self, x: i64, y: i64, color: Color);

    fn draw_segment(&mut self, segment: &LightSegment) {
        // One pixel of margin so clipped endpoints always land off the raster.
        let max = Vector2::new(self.width() as f64 + 1.0, self.height() as f64 + 1.0);
        let (from, to) = match clip(segment.from, segment.to, Vector2::new(-1.0, -1.0), max) {
            Some(clipped) => clipped,
            None => return,
        };

        let (mut x, mut y) = (from.x.floor() as i64, from.y.floor() as i64);
        let (x_end, y_end) = (to.x.floor() as i64, to.y.floor() as i64);

        let dx = (x_end - x).abs();
        let dy = -(y_end - y).abs();
        let step_x = if x < x_end { 1 } else { -1 };
        let step_y = if y < y_end { 1 } else { -1 };
        let mut err = dx + dy;

        while x != x_end || y != y_end {
            self.plot(x, y, segment.color);
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += step_x;
            }
            if e2 <= dx {
                err += dx;
                y += step_y;
            }
        }
    }
}

/// Liang-Barsky clip of `from -> to` against the box `[min, max]`. `None` when the segment misses
/// the box or either endpoint is not finite.
fn clip(from: Vector2, to: Vector2, min: Vector2, max: Vector2) -> Option<(Vector2, Vector2)> {
    if !from.is_finite() || !to.is_finite() {
        return None;
    }

    let delta = to - from;
    let checks = [
        (-delta.x, from.x - min.x),
        (delta.x, max.x - from.x),
        (-delta.y, from.y - min.y),
        (delta.y, max.y - from.y),
    ];

    let mut t_start: f64 = 0.0;
    let mut t_end: f64 = 1.0;
    for &(p, q) in checks.iter() {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t_end {
                return None;
            }
            t_start = t_start.max(r);
        } else {
            if r < t_start {
                return None;
            }
            t_end = t_end.min(r);
        }
    }

    Some((from + delta * t_start, from + delta * t_end))
}
