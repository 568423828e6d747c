pub mod color;
pub mod scene;
pub mod simulation;
pub mod vector;
