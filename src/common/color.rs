use std::ops::{Add, AddAssign, Mul};

/// Unclamped linear radiance. Values only get clamped when converted to a raster.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    pub fn new(r: f64, g: f64, b: f64) -> Color {
        Color { r: r, g: g, b: b }
    }

    /// Euclidean norm of the three channels.
    pub fn intensity(&self) -> f64 {
        (self.r * self.r + self.g * self.g + self.b * self.b).sqrt()
    }

    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    /// Approximate colour of monochromatic light, `wavelength` in nanometres. Anything outside
    /// the visible band (380nm to 780nm) is black.
    pub fn from_wavelength(wavelength: f64) -> Color {
        const GAMMA: f64 = 0.8;

        let (red, green, blue) = if wavelength >= 380.0 && wavelength < 440.0 {
            (-(wavelength - 440.0) / (440.0 - 380.0), 0.0, 1.0)
        } else if wavelength >= 440.0 && wavelength < 490.0 {
            (0.0, (wavelength - 440.0) / (490.0 - 440.0), 1.0)
        } else if wavelength >= 490.0 && wavelength < 510.0 {
            (0.0, 1.0, -(wavelength - 510.0) / (510.0 - 490.0))
        } else if wavelength >= 510.0 && wavelength < 580.0 {
            ((wavelength - 510.0) / (580.0 - 510.0), 1.0, 0.0)
        } else if wavelength >= 580.0 && wavelength < 645.0 {
            (1.0, -(wavelength - 645.0) / (645.0 - 580.0), 0.0)
        } else if wavelength >= 645.0 && wavelength <= 780.0 {
            (1.0, 0.0, 0.0)
        } else {
            return Color::BLACK;
        };

        // Falloff near the limits of vision.
        let factor = if wavelength < 420.0 {
            0.3 + 0.7 * (wavelength - 380.0) / (420.0 - 380.0)
        } else if wavelength < 700.0 {
            1.0
        } else {
            0.3 + 0.7 * (780.0 - wavelength) / (780.0 - 700.0)
        };

        Color::new(
            (red * factor).powf(GAMMA),
            (green * factor).powf(GAMMA),
            (blue * factor).powf(GAMMA),
        )
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, other: Color) -> Color {
        Color::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, other: Color) {
        self.r += other.r;
        self.g += other.g;
        self.b += other.b;
    }
}

/// Componentwise, used for attenuation by a surface's reflectivity.
impl Mul for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Color {
        Color::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, scalar: f64) -> Color {
        Color::new(self.r * scalar, self.g * scalar, self.b * scalar)
    }
}
