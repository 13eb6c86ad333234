//! Geometry primitives shared by every moving object in the game
//!
//! Positions and sizes use f32 because several movement profiles (sine drift,
//! bobbing) produce sub-pixel steps that must accumulate without rounding away.
//! Conversion to integer pixel coordinates happens only at the render backend.
//!
//! # Architecture
//!
//! - `Position` / `Size`: plain value types, no identity
//! - `Rect`: axis-aligned rectangle with intersection/containment tests
//! - All tests are pure functions of their inputs

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Position { x, y }
    }
}

/// Width/height pair in world units (pixels at scale 1).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Size { width, height }
    }
}

/// Axis-aligned bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_parts(position: Position, size: Size) -> Self {
        Rect::new(position.x, position.y, size.width, size.height)
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Checks whether two rectangles overlap.
    ///
    /// The intervals are half-open on both axes, so rectangles that merely
    /// touch along an edge do NOT intersect. This matters for off-screen
    /// removal: an entity sitting exactly on the viewport border is already
    /// outside.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Checks whether `other` lies entirely inside this rectangle.
    ///
    /// Unlike `intersects`, containment is inclusive of edges: a rectangle
    /// contains itself.
    #[allow(dead_code)] // Exposed for tests
    pub fn contains(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.x + self.width >= other.x + other.width
            && self.y <= other.y
            && self.y + self.height >= other.y + other.height
    }

    /// Checks whether a point lies inside this rectangle (left/top edge
    /// inclusive, right/bottom edge exclusive).
    #[allow(dead_code)] // Reserved for mouse picking in menus
    pub fn contains_position(&self, position: Position) -> bool {
        self.x <= position.x
            && self.x + self.width > position.x
            && self.y <= position.y
            && self.y + self.height > position.y
    }
}
