use nalgebra::Point2;

pub mod camera;
pub mod minimap;
pub mod renderer;

pub use camera::*;
pub use minimap::*;
pub use renderer::*;

pub type CanvasPoint = Point2<f32>;

pub const CANVAS_WIDTH: f32 = 800.0;
pub const CANVAS_HEIGHT: f32 = 600.0;

pub const NEAR_PLANE_M: f32 = 0.1;
pub const FAR_PLANE_M: f32 = 200.0;
/// Added to view depth before the perspective divide.
pub const NEAR_OFFSET_M: f32 = 0.1;

pub const CAMERA_HEIGHT_ABOVE_TRACK_M: f32 = 1.1;
pub const CAMERA_DISTANCE_BEHIND_CAR_M: f32 = 1.1;

/// Axis-aligned canvas rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn centre(&self) -> CanvasPoint {
        CanvasPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: &CanvasPoint) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}
