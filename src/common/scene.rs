use crate::common::color::Color;
use crate::common::vector::{dot, Vector2};

/// Everything a render needs to know about the world. Workers share a `Space` read-only for the
/// duration of a render.
#[derive(Clone, Debug, Default)]
pub struct Space {
    /// Extent of the domain. Photons leaving `[0, size.x) x [0, size.y)` are discarded.
    pub size: Vector2,
    pub objects: Vec<Object>,
    pub spawners: Vec<Spawner>,
}

impl Space {
    pub fn new(size: Vector2) -> Space {
        Space {
            size: size,
            objects: Vec::new(),
            spawners: Vec::new(),
        }
    }

    /// Index of the nearest object and the distance to it. `(None, inf)` for an empty scene.
    pub fn closest_object(&self, point: Vector2) -> (Option<usize>, f64) {
        let mut closest = None;
        let mut min = f64::INFINITY;
        for (i, object) in self.objects.iter().enumerate() {
            let dist = object.shape.distance_to(point);
            if dist < min {
                min = dist;
                closest = Some(i);
            }
        }
        (closest, min)
    }

    pub fn min_distance(&self, point: Vector2) -> f64 {
        self.closest_object(point).1
    }

    /// Half-open domain test. Non-finite points are never inside.
    pub fn contains(&self, point: Vector2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x < self.size.x && point.y < self.size.y
    }

    /// Rescales spawner ratios so they sum to 1. No-op when there is nothing to scale.
    pub fn normalize_ratios(&mut self) {
        let total: f64 = self.spawners.iter().map(|s| s.ratio).sum();
        if total <= 0.0 {
            return;
        }
        for spawner in self.spawners.iter_mut() {
            spawner.ratio /= total;
        }
    }
}

#[derive(Clone, Debug)]
pub struct Object {
    pub shape: Shape,
    pub material: Material,
}

// Shapes

#[derive(Clone, Debug)]
pub enum Shape {
    Line(LineSegment),
}

impl Shape {
    pub fn distance_to(&self, point: Vector2) -> f64 {
        match *self {
            Shape::Line(ref line) => line.distance_to(point),
        }
    }

    /// Unit normal. Not oriented towards `point`; see `LineSegment::normal_at`.
    pub fn normal_at(&self, point: Vector2) -> Vector2 {
        match *self {
            Shape::Line(ref line) => line.normal_at(point),
        }
    }
}

/// A finite segment. `a` and `b` must differ.
#[derive(Clone, Debug, PartialEq)]
pub struct LineSegment {
    pub a: Vector2,
    pub b: Vector2,
}

impl LineSegment {
    pub fn new(a: Vector2, b: Vector2) -> LineSegment {
        LineSegment { a: a, b: b }
    }

    pub fn distance_to(&self, p: Vector2) -> f64 {
        let pa = p - self.a;
        let ba = self.b - self.a;
        let h = (dot(pa, ba) / dot(ba, ba)).max(0.0).min(1.0);
        (pa - ba * h).length()
    }

    /// Always the same perpendicular of `b - a`, whichever side `_point` is on.
    pub fn normal_at(&self, _point: Vector2) -> Vector2 {
        (self.b - self.a).perpendicular().normalize()
    }

    pub fn is_degenerate(&self) -> bool {
        (self.b - self.a).is_zero()
    }
}

// Materials

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Acts as a percentage of each color to reflect.
    pub reflectivity: Color,

    /// A value from 0 to 1 indicating how much to deviate from the angle of reflection.
    pub roughness: f64,
}

// Spawners

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SpawnerKind {
    /// Uniform over a rectangle centred on the spawner, `size` being its full extent.
    Square,
    /// Uniform over a disk centred on the spawner, radius in `size.x`.
    Circle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Spawner {
    pub kind: SpawnerKind,
    pub position: Vector2,
    pub size: Vector2,
    pub color: Color,

    /// Share of the photon budget. Normalised across the scene at load time.
    pub ratio: f64,

    pub direction: Vector2,

    /// 1 emits in every direction, 0 only along `direction`.
    pub spread: f64,

    /// Optional emission band in nanometres, tinting `color` per photon.
    pub wavelength: Option<(f64, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(ax: f64, ay: f64, bx: f64, by: f64) -> LineSegment {
        LineSegment::new(Vector2::new(ax, ay), Vector2::new(bx, by))
    }

    fn object(segment: LineSegment) -> Object {
        Object {
            shape: Shape::Line(segment),
            material: Material {
                reflectivity: Color::WHITE,
                roughness: 0.0,
            },
        }
    }

    #[test]
    fn distance_zero_on_segment() {
        let l = line(25.0, 25.0, 75.0, 25.0);
        assert_eq!(l.distance_to(Vector2::new(25.0, 25.0)), 0.0);
        assert_eq!(l.distance_to(Vector2::new(40.0, 25.0)), 0.0);
        assert_eq!(l.distance_to(Vector2::new(75.0, 25.0)), 0.0);
    }

    #[test]
    fn distance_perpendicular_offset() {
        let l = line(0.0, 0.0, 10.0, 0.0);
        assert_eq!(l.distance_to(Vector2::new(5.0, 3.0)), 3.0);
        assert_eq!(l.distance_to(Vector2::new(2.5, -0.25)), 0.25);

        let diagonal = line(0.0, 0.0, 4.0, 4.0);
        assert_relative_eq!(diagonal.distance_to(Vector2::new(0.0, 4.0)), 8f64.sqrt());
    }

    #[test]
    fn distance_clamps_to_endpoints() {
        let l = line(0.0, 0.0, 10.0, 0.0);
        assert_relative_eq!(l.distance_to(Vector2::new(13.0, 4.0)), 5.0);
        assert_relative_eq!(l.distance_to(Vector2::new(-3.0, -4.0)), 5.0);
    }

    #[test]
    fn normal_ignores_query_side() {
        let l = line(0.0, 0.0, 10.0, 0.0);
        let above = l.normal_at(Vector2::new(5.0, 1.0));
        let below = l.normal_at(Vector2::new(5.0, -1.0));
        assert_eq!(above, below);
        assert_relative_eq!(above.length(), 1.0);
        assert_relative_eq!(dot(above, Vector2::new(1.0, 0.0)), 0.0);
    }

    #[test]
    fn closest_object_picks_nearest() {
        let mut space = Space::new(Vector2::new(100.0, 100.0));
        space.objects.push(object(line(0.0, 10.0, 100.0, 10.0)));
        space.objects.push(object(line(0.0, 50.0, 100.0, 50.0)));

        let (index, dist) = space.closest_object(Vector2::new(50.0, 40.0));
        assert_eq!(index, Some(1));
        assert_relative_eq!(dist, 10.0);
        assert_relative_eq!(space.min_distance(Vector2::new(50.0, 12.0)), 2.0);
    }

    #[test]
    fn empty_space_has_no_closest() {
        let space = Space::new(Vector2::new(10.0, 10.0));
        let (index, dist) = space.closest_object(Vector2::new(1.0, 1.0));
        assert!(index.is_none());
        assert!(dist.is_infinite());
        assert!(space.min_distance(Vector2::ZERO).is_infinite());
    }

    #[test]
    fn contains_is_half_open() {
        let space = Space::new(Vector2::new(10.0, 20.0));
        assert!(space.contains(Vector2::new(0.0, 0.0)));
        assert!(space.contains(Vector2::new(9.99, 19.99)));
        assert!(!space.contains(Vector2::new(10.0, 5.0)));
        assert!(!space.contains(Vector2::new(5.0, 20.0)));
        assert!(!space.contains(Vector2::new(-0.01, 5.0)));
        assert!(!space.contains(Vector2::new(f64::NAN, 5.0)));
    }

    #[test]
    fn ratios_normalise_to_one() {
        let mut space = Space::new(Vector2::new(10.0, 10.0));
        for ratio in &[3.0, 1.0, 0.5] {
            space.spawners.push(Spawner {
                kind: SpawnerKind::Square,
                position: Vector2::new(5.0, 5.0),
                size: Vector2::new(1.0, 1.0),
                color: Color::WHITE,
                ratio: *ratio,
                direction: Vector2::ZERO,
                spread: 1.0,
                wavelength: None,
            });
        }
        space.normalize_ratios();
        let total: f64 = space.spawners.iter().map(|s| s.ratio).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        assert_relative_eq!(space.spawners[1].ratio, 1.0 / 4.5);
    }
}
