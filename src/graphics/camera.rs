use super::{CanvasPoint, FAR_PLANE_M, NEAR_OFFSET_M, NEAR_PLANE_M};
use crate::simulation::{Car, CAR_FORWARD_VELOCITY_MAX_MS, CAR_LATERAL_ACCELERATION_MSS};
use crate::track::{Point, Vec3};
use std::f32::consts::PI;

/// Largest bank angle, reached at full steer and top speed.
pub const ROLL_MAX: f32 = PI / 6.0;
/// Per-frame roll step while the driver is steering.
pub const ROLL_STEP_STEERING: f32 = PI / 40.0;
/// Per-frame roll step while the camera levels out.
pub const ROLL_STEP_CENTRING: f32 = PI / 70.0;

/// A camera that can only yaw, pitch and roll. Roll is purely a canvas-space effect.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point,

    yaw: f32,
    sine_yaw: f32,
    cosine_yaw: f32,

    pitch: f32,
    sine_pitch: f32,
    cosine_pitch: f32,

    roll: f32,
    sine_roll: f32,
    cosine_roll: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Point::origin(),
            yaw: 0.0,
            sine_yaw: 0.0,
            cosine_yaw: 1.0,
            pitch: 0.0,
            sine_pitch: 0.0,
            cosine_pitch: 1.0,
            roll: 0.0,
            sine_roll: 0.0,
            cosine_roll: 1.0,
        }
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        (self.sine_yaw, self.cosine_yaw) = yaw.sin_cos();
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch;
        (self.sine_pitch, self.cosine_pitch) = pitch.sin_cos();
    }

    pub fn set_roll(&mut self, roll: f32) {
        self.roll = roll;
        (self.sine_roll, self.cosine_roll) = roll.sin_cos();
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn roll(&self) -> f32 {
        self.roll
    }

    pub fn sin_cos_yaw(&self) -> (f32, f32) {
        (self.sine_yaw, self.cosine_yaw)
    }

    pub fn sin_cos_pitch(&self) -> (f32, f32) {
        (self.sine_pitch, self.cosine_pitch)
    }

    pub fn sin_cos_roll(&self) -> (f32, f32) {
        (self.sine_roll, self.cosine_roll)
    }

    pub fn world_to_view(&self, world: &Point) -> Vec3 {
        let relative = *world - self.position;
        let (mut x, mut y, mut z) = (relative.x, relative.y, relative.z);

        (x, z) = (
            x * self.cosine_yaw - z * self.sine_yaw,
            x * self.sine_yaw + z * self.cosine_yaw,
        );

        // Race cameras only pitch on hills
        if self.pitch != 0.0 {
            (y, z) = (
                y * self.cosine_pitch - z * self.sine_pitch,
                y * self.sine_pitch + z * self.cosine_pitch,
            );
        }

        Vec3::new(x, y, z)
    }

    /// Banks into the turn in proportion to steering and speed, easing towards the target
    /// without overshooting it.
    pub fn bank(&mut self, car: &Car) {
        let steer = car.acceleration.x / -CAR_LATERAL_ACCELERATION_MSS;
        let strength = steer * (car.velocity.y / CAR_FORWARD_VELOCITY_MAX_MS);
        let desired = strength * ROLL_MAX;

        if self.roll == desired {
            return;
        }

        let step = if strength == 0.0 {
            ROLL_STEP_CENTRING
        } else {
            ROLL_STEP_STEERING
        };
        let roll = if self.roll < desired {
            (self.roll + step).min(desired)
        } else {
            (self.roll - step).max(desired)
        };
        self.set_roll(roll);
    }
}

/// The 2D drawing surface that view-space points are projected onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn centre(&self) -> CanvasPoint {
        CanvasPoint::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether a view-space point lies between the near and far planes.
    pub fn is_drawable(view: &Vec3) -> bool {
        view.z >= NEAR_PLANE_M && view.z < FAR_PLANE_M
    }

    /// Perspective divide with Y flipped. Callers cull with `is_drawable` first.
    pub fn view_to_canvas(&self, view: &Vec3) -> CanvasPoint {
        let distance = view.z + NEAR_OFFSET_M;
        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;
        CanvasPoint::new(
            half_width * (view.x / distance + 1.0),
            half_height * (-view.y / distance + 1.0),
        )
    }

    /// Projects a world point, or `None` when it falls outside the view frustum depth.
    pub fn project(&self, camera: &Camera, world: &Point) -> Option<CanvasPoint> {
        let view = camera.world_to_view(world);
        Self::is_drawable(&view).then(|| self.view_to_canvas(&view))
    }

    /// Rotates a canvas point about the canvas centre by the camera's roll.
    pub fn roll_about_centre(&self, camera: &Camera, point: CanvasPoint) -> CanvasPoint {
        let centre = self.centre();
        let (sine, cosine) = camera.sin_cos_roll();
        let x = point.x - centre.x;
        let y = point.y - centre.y;
        CanvasPoint::new(
            x * cosine - y * sine + centre.x,
            x * sine + y * cosine + centre.y,
        )
    }
}
