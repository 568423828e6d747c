use rand::Rng;

use crate::common::color::Color;
use crate::common::vector::Vector2;

/// Photons carrying less than this are no longer worth simulating.
pub const EXTINCTION_INTENSITY: f64 = 0.004;

/// A single simulated particle of light.
#[derive(Clone, Debug)]
pub struct Photon {
    pub position: Vector2,

    /// Unit length, except for photons emitted with a partial spread.
    pub direction: Vector2,

    /// Radiance carried, attenuated at every bounce.
    pub color: Color,

    /// Index into `Space::objects` of the last object bounced off. Keeps a photon that is still
    /// within contact distance from bouncing off the same object again on the next step.
    pub last_collision: Option<usize>,
}

impl Photon {
    pub fn new(position: Vector2, direction: Vector2, color: Color) -> Photon {
        Photon {
            position: position,
            direction: direction,
            color: color,
            last_collision: None,
        }
    }

    pub fn extinguish(&mut self) {
        self.color = Color::BLACK;
    }

    pub fn is_extinguished(&self) -> bool {
        self.color.intensity() < EXTINCTION_INTENSITY
    }
}

/// The path travelled by a photon during one step, in pixel coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightSegment {
    pub from: Vector2,
    pub to: Vector2,
    pub color: Color,
}

/// Uniform point inside the unit disk, by rejection.
pub fn random_in_unit_disk<R: Rng>(rng: &mut R) -> Vector2 {
    loop {
        let p = Vector2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        if p.x * p.x + p.y * p.y <= 1.0 {
            return p;
        }
    }
}

/// Uniformly distributed direction.
pub fn random_unit_vector<R: Rng>(rng: &mut R) -> Vector2 {
    loop {
        let p = random_in_unit_disk(rng);
        // The origin has no direction.
        if !p.is_zero() {
            return p.normalize();
        }
    }
}
