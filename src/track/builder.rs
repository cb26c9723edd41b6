use std::f32::consts::PI;
use super::{
    heading_of, BoundingBox, ControlPoint, HermiteCurve, Surface, TrackSegment,
    DEFAULT_ELEVATED_SURFACE, DEFAULT_GROUND_SURFACE, GROUND_LEVEL_M,
};

/// Output of a build pass.
#[derive(Debug, Clone)]
pub struct BuiltTrack {
    pub curves: Vec<HermiteCurve>,
    pub segments: Vec<TrackSegment>,
    pub bounds: BoundingBox,
}

/// Walks the Hermite curves between consecutive control points and emits a segment every
/// `spacing` metres of chord length.
pub struct TrackBuilder {
    spacing: f32,
}

impl TrackBuilder {
    pub fn new(spacing: f32) -> Self {
        Self { spacing }
    }

    /// Subdivision estimate for one curve: `PI * chord / (4 * spacing)`.
    pub fn estimate_subdivisions(&self, start: &ControlPoint, end: &ControlPoint) -> f32 {
        nalgebra::distance(&start.position, &end.position) * PI / (4.0 * self.spacing)
    }

    /// Builds a closed loop; the last control point connects back to the first.
    pub fn build(&self, control_points: &[ControlPoint]) -> BuiltTrack {
        let mut curves = Vec::with_capacity(control_points.len());
        let mut segments: Vec<TrackSegment> = Vec::new();
        let mut bounds = BoundingBox::new();

        let Some(first) = control_points.first() else {
            return BuiltTrack { curves, segments, bounds };
        };

        let mut current = first.position;
        let mut ground = DEFAULT_GROUND_SURFACE;
        let mut elevated = DEFAULT_ELEVATED_SURFACE;

        let count = control_points.len();
        for (i, start) in control_points.iter().enumerate() {
            let end = &control_points[(i + 1) % count];

            if let Some(surface) = start.surface {
                if start.position.y <= GROUND_LEVEL_M {
                    ground = surface;
                } else {
                    elevated = surface;
                }
            }

            let curve = HermiteCurve::new(&start.position, &end.position, &start.tangent, &end.tangent);
            let subdivisions = self.estimate_subdivisions(start, end);

            // Coincident endpoints give zero subdivisions and the loop below never runs.
            let mut step = 1.0_f32;
            while step <= subdivisions {
                let candidate = curve.point(step / subdivisions);
                let chord = candidate - current;
                let distance = chord.norm();

                if distance.is_finite() && distance >= self.spacing && distance > 0.0 {
                    current += chord * (self.spacing / distance);

                    let surface = if segments.is_empty() {
                        Surface::StartLine
                    } else if current.y <= GROUND_LEVEL_M {
                        ground
                    } else {
                        elevated
                    };

                    segments.push(TrackSegment {
                        position: current,
                        heading: heading_of(&chord),
                        surface,
                    });
                    bounds.add(&current);
                } else {
                    step += 1.0;
                }
            }

            curves.push(curve);
        }

        BuiltTrack { curves, segments, bounds }
    }
}
