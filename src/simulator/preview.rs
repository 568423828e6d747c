use image::{Rgb, RgbImage};

use crate::common::color::Color;
use crate::surface::cpu::CpuSurface;
use crate::surface::Surface;

/// Converts accumulated radiance into a display pixel: `channel * 255 * exposure`, clamped.
pub fn tone_map(color: Color, exposure: f64) -> Rgb<u8> {
    let scale = 255.0 * exposure;
    let channel = |value: f64| (value * scale).max(0.0).min(255.0) as u8;
    Rgb([channel(color.r), channel(color.g), channel(color.b)])
}

/// Nearest neighbour resample of the whole surface to `width` x `height`.
pub fn resample(surface: &CpuSurface, width: u32, height: u32, exposure: f64) -> RgbImage {
    let (source_width, source_height) = (surface.width(), surface.height());
    RgbImage::from_fn(width, height, |x, y| {
        let sx = x as usize * source_width / width as usize;
        let sy = y as usize * source_height / height as usize;
        tone_map(surface.pixel(sx, sy).unwrap_or(Color::BLACK), exposure)
    })
}

/// The last preview handed out, kept until the pixels or the requested geometry change.
pub struct PreviewCache {
    image: RgbImage,
    zoom: f64,
    valid: bool,
}

impl PreviewCache {
    pub fn new() -> PreviewCache {
        PreviewCache {
            image: RgbImage::new(0, 0),
            zoom: 1.0,
            valid: false,
        }
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn is_valid_for(&self, width: u32, height: u32, zoom: f64) -> bool {
        self.valid && self.image.width() == width && self.image.height() == height && self.zoom == zoom
    }

    /// Renders a `width` x `height` region where each preview pixel `(x, y)` shows surface pixel
    /// `(x / zoom, y / zoom)`. Preview pixels past the edge of the surface stay black.
    pub fn render(&mut self, surface: &CpuSurface, width: u32, height: u32, zoom: f64, exposure: f64) -> &RgbImage {
        if !self.is_valid_for(width, height, zoom) {
            self.image = RgbImage::from_fn(width, height, |x, y| {
                let sx = (x as f64 / zoom) as usize;
                let sy = (y as f64 / zoom) as usize;
                tone_map(surface.pixel(sx, sy).unwrap_or(Color::BLACK), exposure)
            });
            self.zoom = zoom;
            self.valid = true;
        }
        &self.image
    }
}

impl Default for PreviewCache {
    fn default() -> PreviewCache {
        PreviewCache::new()
    }
}
