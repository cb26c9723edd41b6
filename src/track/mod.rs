use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use thiserror::Error;

pub mod bounds;
pub mod builder;
pub mod curve;

pub use bounds::*;
pub use builder::*;
pub use curve::*;

pub type Vec3 = Vector3<f32>;
pub type Point = Point3<f32>;

/// Arc length between consecutive segments, in metres. Longitudinal car positions are
/// measured in multiples of this.
pub const SEGMENT_SPACING_M: f32 = 0.4;
pub const TRACK_WIDTH_M: f32 = 5.0;
pub const TRACK_HEIGHT_M: f32 = 0.7;
/// Control points at or below this height switch the ground surface, anything higher the
/// elevated one.
pub const GROUND_LEVEL_M: f32 = 0.02;

pub const DEFAULT_GROUND_SURFACE: Surface = Surface::Gravel;
pub const DEFAULT_ELEVATED_SURFACE: Surface = Surface::Log;

pub fn track_size() -> Vec3 {
    Vec3::new(TRACK_WIDTH_M, TRACK_HEIGHT_M, SEGMENT_SPACING_M)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    StartLine,
    Gravel,
    Sand,
    Rock,
    Log,
}

#[derive(Debug, Error, PartialEq)]
pub enum TrackError {
    #[error("track '{name}' needs at least 2 control points, got {count}")]
    TooFewControlPoints { name: String, count: usize },
    #[error("track '{name}' has a non-finite value in control point {index}")]
    NonFiniteControlPoint { name: String, index: usize },
    #[error("track '{name}' must have at least one lap")]
    InvalidLaps { name: String },
    #[error("track '{name}' produced no segments")]
    NoSegments { name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlPoint {
    pub position: Point,
    pub tangent: Vec3,
    /// Ground texture used from this point onward.
    pub surface: Option<Surface>,
}

impl ControlPoint {
    pub fn new(position: [f32; 3], tangent: [f32; 3]) -> Self {
        Self {
            position: Point::from(position),
            tangent: Vec3::from(tangent),
            surface: None,
        }
    }

    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.surface = Some(surface);
        self
    }

    fn is_finite(&self) -> bool {
        self.position.coords.iter().chain(self.tangent.iter()).all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackSegment {
    pub position: Point,
    /// Radians, `atan2(dx, dz)` of the direction of travel.
    pub heading: f32,
    pub surface: Surface,
}

/// A built, read-only track.
#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    pub laps: u32,
    control_points: Vec<ControlPoint>,
    curves: Vec<HermiteCurve>,
    segments: Vec<TrackSegment>,
    bounds: BoundingBox,
}

impl Track {
    /// Builds the segment sequence for a cyclic list of control points.
    pub fn build(
        name: impl Into<String>,
        laps: u32,
        control_points: Vec<ControlPoint>,
    ) -> Result<Self, TrackError> {
        let name = name.into();

        if control_points.len() < 2 {
            return Err(TrackError::TooFewControlPoints {
                name,
                count: control_points.len(),
            });
        }
        if laps == 0 {
            return Err(TrackError::InvalidLaps { name });
        }
        if let Some(index) = control_points.iter().position(|cp| !cp.is_finite()) {
            return Err(TrackError::NonFiniteControlPoint { name, index });
        }

        let built = TrackBuilder::new(SEGMENT_SPACING_M).build(&control_points);
        if built.segments.is_empty() {
            return Err(TrackError::NoSegments { name });
        }

        log::debug!(
            "Track '{}' built: {} control points, {} segments, {:.1}m",
            name,
            control_points.len(),
            built.segments.len(),
            built.segments.len() as f32 * SEGMENT_SPACING_M
        );

        Ok(Self {
            name,
            laps,
            control_points,
            curves: built.curves,
            segments: built.segments,
            bounds: built.bounds,
        })
    }

    /// Number of segments; never zero.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn length_m(&self) -> f32 {
        self.len() as f32 * SEGMENT_SPACING_M
    }

    pub fn segments(&self) -> &[TrackSegment] {
        &self.segments
    }

    pub fn control_points(&self) -> &[ControlPoint] {
        &self.control_points
    }

    /// Curve `i` runs from control point `i` to control point `i + 1` (wrapping).
    pub fn curves(&self) -> &[HermiteCurve] {
        &self.curves
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Wraps any segment index, including negative ones, onto the loop.
    pub fn wrap_index(&self, index: i64) -> usize {
        index.rem_euclid(self.len() as i64) as usize
    }

    pub fn segment(&self, index: i64) -> &TrackSegment {
        &self.segments[self.wrap_index(index)]
    }

    /// Signed bend between the segment at `position` and the one after it.
    pub fn turn_angle(&self, position: f32) -> f32 {
        let index = position.floor() as i64;
        heading_delta(self.segment(index).heading, self.segment(index + 1).heading)
    }

    /// Signed bend between the segment at `position` and the one `look_ahead` segments on.
    pub fn bend_ahead(&self, position: f32, look_ahead: i64) -> f32 {
        let index = position.floor() as i64;
        heading_delta(self.segment(index).heading, self.segment(index + look_ahead).heading)
    }

    /// Centre-line point and heading at a fractional track position.
    pub fn interpolate(&self, track_position: f32) -> (Point, f32) {
        let index = track_position.floor() as i64;
        let t = track_position - index as f32;
        let from = self.segment(index);
        let to = self.segment(index + 1);

        let heading = from.heading + t * heading_delta(from.heading, to.heading);
        let position = from.position + (to.position - from.position) * t;
        (position, heading)
    }
}

/// Difference `to - from` wrapped into `(-PI, PI]`.
pub fn heading_delta(from: f32, to: f32) -> f32 {
    let mut delta = (to - from) % (2.0 * PI);
    if delta > PI {
        delta -= 2.0 * PI;
    } else if delta <= -PI {
        delta += 2.0 * PI;
    }
    delta
}

/// Heading of a direction vector, measured in the ground plane from +Z towards +X.
pub fn heading_of(direction: &Vec3) -> f32 {
    direction.x.atan2(direction.z)
}
