//! Reads scene descriptions.
//!
//! ```json
//! {
//!     "size": [100, 100],
//!     "lines": [
//!         { "a": [25, 25], "b": [75, 25], "reflectivity": [1, 1, 1], "roughness": 0.2 }
//!     ],
//!     "spawners": [
//!         { "type": "circle", "position": [50, 50], "size": 1, "color": [1, 0, 0],
//!           "ratio": 1, "spread": 0, "direction": [0, -1] }
//!     ]
//! }
//! ```
//!
//! Optional values: `roughness` (0), `spread` (1), `direction` (required in practice whenever
//! `spread` is below 1) and `wavelength`, a `[min, max]` band in nanometres.

use std::fs;
use std::path::Path;

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::common::color::Color;
use crate::common::scene::{LineSegment, Material, Object, Shape, Space, Spawner, SpawnerKind};
use crate::common::vector::Vector2;
use crate::error::SceneError;

const VISIBLE_MIN: f64 = 380.0;
const VISIBLE_MAX: f64 = 780.0;

pub fn load_scene_file<P: AsRef<Path>>(path: P) -> Result<Space, SceneError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source: source,
    })?;
    load_scene(&source)
}

/// Parses and validates a whole scene. Nothing is returned unless every value checks out, and
/// spawner ratios come back normalised.
pub fn load_scene(source: &str) -> Result<Space, SceneError> {
    let root: Value = serde_json::from_str(source)?;
    let root = object(&root, "scene")?;

    let size = vector(field(root, "", "size")?, "size")?;
    if !(size.x > 0.0 && size.y > 0.0) {
        return Err(invalid("size", "both dimensions must be positive"));
    }

    let mut space = Space::new(size);
    for (i, line) in array(field(root, "", "lines")?, "lines")?.iter().enumerate() {
        space.objects.push(parse_line(line, &format!("lines[{}]", i))?);
    }
    for (i, spawner) in array(field(root, "", "spawners")?, "spawners")?.iter().enumerate() {
        space.spawners.push(parse_spawner(spawner, &format!("spawners[{}]", i))?);
    }
    space.normalize_ratios();

    debug!(
        "loaded {}x{} scene with {} lines and {} spawners",
        size.x,
        size.y,
        space.objects.len(),
        space.spawners.len()
    );
    Ok(space)
}

fn parse_line(value: &Value, path: &str) -> Result<Object, SceneError> {
    let line = object(value, path)?;

    let segment = LineSegment::new(
        vector(field(line, path, "a")?, &join(path, "a"))?,
        vector(field(line, path, "b")?, &join(path, "b"))?,
    );
    if segment.is_degenerate() {
        return Err(invalid(path, "a and b must differ"));
    }

    let reflectivity = color(field(line, path, "reflectivity")?, &join(path, "reflectivity"))?;
    if reflectivity.r > 1.0 || reflectivity.g > 1.0 || reflectivity.b > 1.0 {
        return Err(invalid(&join(path, "reflectivity"), "components must not exceed 1"));
    }

    let roughness = match line.get("roughness") {
        Some(value) => unit_interval(value, &join(path, "roughness"))?,
        None => 0.0,
    };

    Ok(Object {
        shape: Shape::Line(segment),
        material: Material {
            reflectivity: reflectivity,
            roughness: roughness,
        },
    })
}

fn parse_spawner(value: &Value, path: &str) -> Result<Spawner, SceneError> {
    let spawner = object(value, path)?;

    let position = vector(field(spawner, path, "position")?, &join(path, "position"))?;

    let kind_path = join(path, "type");
    let kind = match field(spawner, path, "type")? {
        Value::String(kind) if kind == "square" => SpawnerKind::Square,
        Value::String(kind) if kind == "circle" => SpawnerKind::Circle,
        Value::String(kind) => {
            return Err(invalid(&kind_path, &format!("unknown spawner type \"{}\"", kind)));
        }
        _ => return Err(mistyped(&kind_path, "string")),
    };

    let size_path = join(path, "size");
    let size_value = field(spawner, path, "size")?;
    let size = match (kind, size_value) {
        (SpawnerKind::Circle, Value::Number(_)) => Vector2::new(number(size_value, &size_path)?, 0.0),
        (SpawnerKind::Circle, _) => {
            let size = vector(size_value, &size_path).map_err(|_| mistyped(&size_path, "number or array of 2 numbers"))?;
            Vector2::new(size.x, 0.0)
        }
        (SpawnerKind::Square, _) => vector(size_value, &size_path)?,
    };
    match kind {
        SpawnerKind::Circle if !(size.x > 0.0) => return Err(invalid(&size_path, "radius must be positive")),
        SpawnerKind::Square if size.x < 0.0 || size.y < 0.0 => {
            return Err(invalid(&size_path, "must not be negative"));
        }
        _ => (),
    }

    let color = color(field(spawner, path, "color")?, &join(path, "color"))?;

    let ratio_path = join(path, "ratio");
    let ratio = number(field(spawner, path, "ratio")?, &ratio_path)?;
    if !(ratio > 0.0) {
        return Err(invalid(&ratio_path, "must be positive"));
    }

    let spread = match spawner.get("spread") {
        Some(value) => unit_interval(value, &join(path, "spread"))?,
        None => 1.0,
    };

    let direction_path = join(path, "direction");
    let direction = match spawner.get("direction") {
        Some(value) => vector(value, &direction_path)?,
        None => Vector2::ZERO,
    };
    if spread < 1.0 && direction.is_zero() {
        return Err(invalid(&direction_path, "a non-zero direction is needed when spread is below 1"));
    }
    let direction = if direction.is_zero() { direction } else { direction.normalize() };

    let wavelength = match spawner.get("wavelength") {
        Some(value) => Some(wavelength_band(value, &join(path, "wavelength"))?),
        None => None,
    };

    Ok(Spawner {
        kind: kind,
        position: position,
        size: size,
        color: color,
        ratio: ratio,
        direction: direction,
        spread: spread,
        wavelength: wavelength,
    })
}

fn wavelength_band(value: &Value, path: &str) -> Result<(f64, f64), SceneError> {
    let band = vector(value, path)?;
    if band.x < VISIBLE_MIN || band.y > VISIBLE_MAX {
        return Err(invalid(path, &format!("must lie within {}nm to {}nm", VISIBLE_MIN, VISIBLE_MAX)));
    }
    if band.x > band.y {
        return Err(invalid(path, "minimum is above maximum"));
    }
    Ok((band.x, band.y))
}

// Value helpers. `path` is the dotted location used in error messages.

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn field<'a>(object: &'a Map<String, Value>, path: &str, key: &str) -> Result<&'a Value, SceneError> {
    object.get(key).ok_or_else(|| SceneError::Missing { field: join(path, key) })
}

fn object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SceneError> {
    value.as_object().ok_or_else(|| mistyped(path, "object"))
}

fn array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, SceneError> {
    value.as_array().ok_or_else(|| mistyped(path, "array"))
}

fn number(value: &Value, path: &str) -> Result<f64, SceneError> {
    value.as_f64().ok_or_else(|| mistyped(path, "number"))
}

/// Fixed size numeric tuples go through serde; any shape mismatch is a type error at `path`.
fn numbers<T: DeserializeOwned>(value: &Value, path: &str, expected: &'static str) -> Result<T, SceneError> {
    serde_json::from_value(value.clone()).map_err(|_| mistyped(path, expected))
}

fn vector(value: &Value, path: &str) -> Result<Vector2, SceneError> {
    let [x, y]: [f64; 2] = numbers(value, path, "array of 2 numbers")?;
    Ok(Vector2::new(x, y))
}

fn color(value: &Value, path: &str) -> Result<Color, SceneError> {
    let c: [f64; 3] = numbers(value, path, "array of 3 numbers")?;
    if c.iter().any(|&channel| channel < 0.0) {
        return Err(invalid(path, "components must not be negative"));
    }
    Ok(Color::new(c[0], c[1], c[2]))
}

fn unit_interval(value: &Value, path: &str) -> Result<f64, SceneError> {
    let n = number(value, path)?;
    if n < 0.0 || n > 1.0 {
        return Err(invalid(path, "must be between 0 and 1"));
    }
    Ok(n)
}

fn mistyped(path: &str, expected: &'static str) -> SceneError {
    SceneError::Mistyped {
        field: path.to_string(),
        expected: expected,
    }
}

fn invalid(path: &str, reason: &str) -> SceneError {
    SceneError::Invalid {
        field: path.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SCENE: &str = r#"{
        "size": [100, 80],
        "lines": [
            { "a": [25, 25], "b": [75, 25], "reflectivity": [1, 0.5, 0] },
            { "a": [0, 0], "b": [0, 10], "reflectivity": [0.2, 0.2, 0.2], "roughness": 0.75 }
        ],
        "spawners": [
            { "type": "circle", "position": [50, 50], "size": 2, "color": [1, 0, 0],
              "ratio": 3, "spread": 0, "direction": [0, -4] },
            { "type": "square", "position": [10, 10], "size": [4, 2], "color": [0, 2, 0],
              "ratio": 1, "wavelength": [500, 600] }
        ]
    }"#;

    fn error_for(source: &str) -> SceneError {
        load_scene(source).unwrap_err()
    }

    #[test]
    fn loads_a_full_scene() {
        let space = load_scene(SCENE).unwrap();
        assert_eq!(space.size, Vector2::new(100.0, 80.0));
        assert_eq!(space.objects.len(), 2);
        assert_eq!(space.objects[0].material.roughness, 0.0);
        assert_eq!(space.objects[0].material.reflectivity, Color::new(1.0, 0.5, 0.0));
        assert_eq!(space.objects[1].material.roughness, 0.75);

        let circle = &space.spawners[0];
        assert_eq!(circle.kind, SpawnerKind::Circle);
        assert_eq!(circle.size.x, 2.0);
        assert_eq!(circle.direction, Vector2::new(0.0, -1.0));
        assert_eq!(circle.spread, 0.0);
        assert_relative_eq!(circle.ratio, 0.75);

        let square = &space.spawners[1];
        assert_eq!(square.kind, SpawnerKind::Square);
        assert_eq!(square.size, Vector2::new(4.0, 2.0));
        assert_eq!(square.spread, 1.0);
        assert_eq!(square.direction, Vector2::ZERO);
        assert_eq!(square.wavelength, Some((500.0, 600.0)));
        assert_relative_eq!(circle.ratio + square.ratio, 1.0);
    }

    #[test]
    fn missing_size() {
        match error_for(r#"{ "lines": [], "spawners": [] }"#) {
            SceneError::Missing { field } => assert_eq!(field, "size"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn missing_nested_field_names_its_path() {
        let source = r#"{ "size": [1, 1], "lines": [
            { "a": [0, 0], "b": [1, 0], "reflectivity": [1, 1, 1] },
            { "a": [0, 0], "b": [1, 0] }
        ], "spawners": [] }"#;
        match error_for(source) {
            SceneError::Missing { field } => assert_eq!(field, "lines[1].reflectivity"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn mistyped_values() {
        match error_for(r#"{ "size": "big", "lines": [], "spawners": [] }"#) {
            SceneError::Mistyped { field, expected } => {
                assert_eq!(field, "size");
                assert_eq!(expected, "array of 2 numbers");
            }
            other => panic!("unexpected error {:?}", other),
        }
        match error_for(r#"{ "size": [1, 2, 3], "lines": [], "spawners": [] }"#) {
            SceneError::Mistyped { field, .. } => assert_eq!(field, "size"),
            other => panic!("unexpected error {:?}", other),
        }
        match error_for(r#"{ "size": [1, 1], "lines": [{ "a": [0, "x"], "b": [1, 0], "reflectivity": [1, 1, 1] }], "spawners": [] }"#) {
            SceneError::Mistyped { field, .. } => assert_eq!(field, "lines[0].a"),
            other => panic!("unexpected error {:?}", other),
        }
        match error_for(r#"{ "size": [1, 1], "lines": {}, "spawners": [] }"#) {
            SceneError::Mistyped { field, .. } => assert_eq!(field, "lines"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn invalid_values() {
        let cases = [
            (r#"{ "size": [0, 1], "lines": [], "spawners": [] }"#, "size"),
            (
                r#"{ "size": [1, 1], "lines": [{ "a": [0, 0], "b": [0, 0], "reflectivity": [1, 1, 1] }], "spawners": [] }"#,
                "lines[0]",
            ),
            (
                r#"{ "size": [1, 1], "lines": [{ "a": [0, 0], "b": [1, 0], "reflectivity": [1, 1, 1], "roughness": 2 }], "spawners": [] }"#,
                "lines[0].roughness",
            ),
            (
                r#"{ "size": [1, 1], "lines": [], "spawners": [{ "type": "hexagon", "position": [0, 0], "size": 1, "color": [1, 1, 1], "ratio": 1 }] }"#,
                "spawners[0].type",
            ),
            (
                r#"{ "size": [1, 1], "lines": [], "spawners": [{ "type": "circle", "position": [0, 0], "size": 1, "color": [1, 1, 1], "ratio": 0 }] }"#,
                "spawners[0].ratio",
            ),
            (
                r#"{ "size": [1, 1], "lines": [], "spawners": [{ "type": "circle", "position": [0, 0], "size": 0, "color": [1, 1, 1], "ratio": 1 }] }"#,
                "spawners[0].size",
            ),
            (
                r#"{ "size": [1, 1], "lines": [], "spawners": [{ "type": "square", "position": [0, 0], "size": [1, -1], "color": [1, 1, 1], "ratio": 1 }] }"#,
                "spawners[0].size",
            ),
            (
                r#"{ "size": [1, 1], "lines": [], "spawners": [{ "type": "circle", "position": [0, 0], "size": 1, "color": [1, 1, 1], "ratio": 1, "spread": 0.5 }] }"#,
                "spawners[0].direction",
            ),
            (
                r#"{ "size": [1, 1], "lines": [], "spawners": [{ "type": "circle", "position": [0, 0], "size": 1, "color": [1, 1, 1], "ratio": 1, "wavelength": [600, 500] }] }"#,
                "spawners[0].wavelength",
            ),
        ];
        for &(source, expected_field) in cases.iter() {
            match error_for(source) {
                SceneError::Invalid { field, .. } => assert_eq!(field, expected_field),
                other => panic!("unexpected error {:?} for {}", other, source),
            }
        }
    }

    #[test]
    fn syntax_errors() {
        match error_for("{ size: ") {
            SceneError::Syntax(_) => (),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn error_messages_name_the_field() {
        let message = error_for(r#"{ "size": [1, 1], "spawners": [] }"#).to_string();
        assert_eq!(message, "missing value: lines");
    }

    #[test]
    fn missing_file() {
        match load_scene_file("/nonexistent/scene.json") {
            Err(SceneError::Io { path, .. }) => assert_eq!(path, Path::new("/nonexistent/scene.json")),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
