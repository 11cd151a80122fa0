pub use kurbo::{Point, Vec2};

/// Unit vector pointing up (positive y).
pub const UP: Vec2 = Vec2::new(0.0, 1.0);
/// Unit vector pointing down.
pub const DOWN: Vec2 = Vec2::new(0.0, -1.0);
/// Unit vector pointing left.
pub const LEFT: Vec2 = Vec2::new(-1.0, 0.0);
/// Unit vector pointing right.
pub const RIGHT: Vec2 = Vec2::new(1.0, 0.0);
/// The zero vector.
pub const ORIGIN: Vec2 = Vec2::ZERO;
