//! Simulates 2D light transport. Photons leave the scene's spawners, march through a distance
//! field of line segments, bounce and scatter off them, and every step they take is drawn into
//! an image. Rendering is split across tracer threads whose images are summed by a `Simulator`.

pub mod common;
pub mod error;
pub mod loader;
pub mod session;
pub mod simulator;
pub mod surface;
pub mod tracer;

pub use crate::common::color::Color;
pub use crate::common::scene::{LineSegment, Material, Object, Shape, Space, Spawner, SpawnerKind};
pub use crate::common::vector::Vector2;
pub use crate::error::{SceneError, SessionError};
pub use crate::session::Session;
pub use crate::simulator::{RenderSettings, Simulator};
