use crate::common::color::Color;
use crate::error::DimensionMismatch;
use crate::surface::Surface;

/// A plain grid of accumulated radiance, row major.
#[derive(Clone, Debug, PartialEq)]
pub struct CpuSurface {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl CpuSurface {
    pub fn new(width: usize, height: usize) -> CpuSurface {
        CpuSurface {
            width: width,
            height: height,
            pixels: vec![Color::BLACK; width * height],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[x + y * self.width])
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.iter_mut() {
            *pixel = Color::BLACK;
        }
    }

    /// Adds every pixel of `other` onto this surface.
    pub fn merge(&mut self, other: &CpuSurface) -> Result<(), DimensionMismatch> {
        if self.width != other.width || self.height != other.height {
            return Err(DimensionMismatch {
                expected: (self.width, self.height),
                actual: (other.width, other.height),
            });
        }
        for (mine, theirs) in self.pixels.iter_mut().zip(other.pixels.iter()) {
            *mine += *theirs;
        }
        Ok(())
    }

    /// Sum of the intensity of every pixel.
    pub fn total_intensity(&self) -> f64 {
        self.pixels.iter().map(|p| p.intensity()).sum()
    }
}

impl Surface for CpuSurface {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn plot(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        self.pixels[x as usize + y as usize * self.width] += color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::simulation::LightSegment;
    use crate::common::vector::Vector2;
    use approx::assert_relative_eq;

    #[test]
    fn plot_accumulates_and_ignores_out_of_bounds() {
        let mut surface = CpuSurface::new(4, 3);
        surface.plot(1, 2, Color::new(0.5, 0.0, 0.0));
        surface.plot(1, 2, Color::new(0.75, 0.0, 1.0));
        surface.plot(-1, 0, Color::WHITE);
        surface.plot(4, 0, Color::WHITE);
        surface.plot(0, 3, Color::WHITE);

        assert_eq!(surface.pixel(1, 2), Some(Color::new(1.25, 0.0, 1.0)));
        assert_eq!(surface.pixel(4, 0), None);
        let lit = surface.pixels().iter().filter(|p| !p.is_black()).count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn segments_partly_outside_still_draw_inside() {
        let mut surface = CpuSurface::new(5, 5);
        surface.draw_segment(&LightSegment {
            from: Vector2::new(-3.5, 2.5),
            to: Vector2::new(8.5, 2.5),
            color: Color::WHITE,
        });
        for x in 0..5 {
            assert_eq!(surface.pixel(x, 2), Some(Color::WHITE));
        }
        assert_relative_eq!(surface.total_intensity(), 5.0 * 3f64.sqrt());
    }

    #[test]
    fn merge_adds_pixels() {
        let mut a = CpuSurface::new(2, 2);
        let mut b = CpuSurface::new(2, 2);
        a.plot(0, 0, Color::new(1.0, 0.0, 0.0));
        b.plot(0, 0, Color::new(0.0, 1.0, 0.0));
        b.plot(1, 1, Color::WHITE);

        a.merge(&b).unwrap();
        assert_eq!(a.pixel(0, 0), Some(Color::new(1.0, 1.0, 0.0)));
        assert_eq!(a.pixel(1, 1), Some(Color::WHITE));
    }

    #[test]
    fn merging_black_changes_nothing() {
        let mut a = CpuSurface::new(3, 2);
        a.plot(2, 1, Color::new(0.2, 0.4, 0.6));
        let before = a.clone();
        a.merge(&CpuSurface::new(3, 2)).unwrap();
        assert_eq!(a, before);
    }

    #[test]
    fn merge_rejects_other_dimensions() {
        let mut a = CpuSurface::new(3, 2);
        let err = a.merge(&CpuSurface::new(2, 3)).unwrap_err();
        assert_eq!(err.expected, (3, 2));
        assert_eq!(err.actual, (2, 3));
    }

    #[test]
    fn clear_zeroes() {
        let mut a = CpuSurface::new(2, 2);
        a.plot(1, 0, Color::WHITE);
        a.clear();
        assert_eq!(a.total_intensity(), 0.0);
    }
}
