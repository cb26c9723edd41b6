use super::{Camera, Canvas, CanvasPoint, Rect, NEAR_OFFSET_M};
use crate::simulation::{CarId, Race};
use crate::track::{Axis, HermiteCurve, Point, Track, TRACK_WIDTH_M};
use nalgebra::Vector2;
use std::f32::consts::PI;

/// Points sampled along each curve for outline drawing.
pub fn samples_per_curve(control_points: usize) -> usize {
    (80 / control_points.max(1)).max(6)
}

fn sample_curves<T>(track: &Track, mut sample: impl FnMut(&HermiteCurve, f32) -> Option<T>) -> Vec<T> {
    let samples = samples_per_curve(track.control_points().len());
    let mut points = Vec::with_capacity(samples * track.curves().len());
    for curve in track.curves() {
        for j in 0..samples {
            if let Some(point) = sample(curve, j as f32 / samples as f32) {
                points.push(point);
            }
        }
    }
    points
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub car: CarId,
    /// 1-based race position.
    pub place: usize,
    pub is_human: bool,
    pub position: CanvasPoint,
}

/// Top-down outline of the track fitted into a canvas rectangle.
#[derive(Debug, Clone)]
pub struct MiniMap {
    rect: Rect,
    track_centre: Point,
    scale: f32,
    outline: Vec<CanvasPoint>,
}

impl MiniMap {
    pub fn new(track: &Track, rect: Rect) -> Self {
        let bounds = track.bounds();
        let fits = [
            (rect.width, bounds.extent(Axis::X)),
            (rect.height, bounds.extent(Axis::Z)),
        ];
        let scale = fits
            .iter()
            .filter(|(_, extent)| *extent > 0.0)
            .map(|(room, extent)| room / extent)
            .fold(f32::INFINITY, f32::min);

        let mut map = Self {
            rect,
            track_centre: bounds.centre().unwrap_or_else(Point::origin),
            scale: if scale.is_finite() { scale } else { 1.0 },
            outline: Vec::new(),
        };

        let mut outline = sample_curves(track, |curve, t| Some(map.project(&curve.point(t))));
        if let Some(first) = outline.first().copied() {
            outline.push(first);
        }
        map.outline = outline;
        map
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Closed polyline of the centre line.
    pub fn outline(&self) -> &[CanvasPoint] {
        &self.outline
    }

    /// Ground-plane projection; world +Z is up the map.
    pub fn project(&self, point: &Point) -> CanvasPoint {
        let origin = self.rect.centre();
        CanvasPoint::new(
            origin.x + (point.x - self.track_centre.x) * self.scale,
            origin.y - (point.z - self.track_centre.z) * self.scale,
        )
    }

    /// One marker per car at its current segment, in race order.
    pub fn markers(&self, race: &Race) -> Vec<MapMarker> {
        let track = race.track();
        race.standings()
            .iter()
            .enumerate()
            .filter_map(|(index, id)| {
                let car = race.car(*id)?;
                let segment = track.segment(race.track_position(car).floor() as i64);
                Some(MapMarker {
                    car: car.id,
                    place: index + 1,
                    is_human: car.is_human(),
                    position: self.project(&segment.position),
                })
            })
            .collect()
    }
}

/// Pitched, orbiting wireframe of a track for the track-selection screen.
#[derive(Debug, Clone)]
pub struct TrackOverview {
    camera: Camera,
    canvas: Canvas,
    offset: Vector2<f32>,
    radius: f32,
    /// Left and right track edges, relative to the track centre.
    edges: [Vec<Point>; 2],
    base: [Point; 4],
}

impl TrackOverview {
    pub const PITCH: f32 = -PI / 4.0;
    /// Margin around the track edges covered by the base.
    pub const BASE_BORDER_M: f32 = 15.0;

    pub fn new(track: &Track, canvas: Canvas) -> Self {
        let bounds = track.bounds();
        let centre = bounds.centre().unwrap_or_else(Point::origin);
        let radius = bounds.extent(Axis::X).max(bounds.extent(Axis::Z)) + 20.0;
        let half_width = TRACK_WIDTH_M / 2.0;

        let samples = sample_curves(track, |curve, t| {
            let tangent = curve.tangent(t).try_normalize(f32::EPSILON)? * half_width;
            let p = curve.point(t) - centre.coords;
            Some((
                Point::new(p.x - tangent.z, p.y, p.z + tangent.x),
                Point::new(p.x + tangent.z, p.y, p.z - tangent.x),
            ))
        });
        let (left, right): (Vec<Point>, Vec<Point>) = samples.into_iter().unzip();

        let border = Self::BASE_BORDER_M + half_width;
        let min = bounds.min().unwrap_or(centre);
        let max = bounds.max().unwrap_or(centre);
        let y = min.y - centre.y;
        let (x1, z1) = (min.x - centre.x - border, min.z - centre.z - border);
        let (x2, z2) = (max.x - centre.x + border, max.z - centre.z + border);

        let mut camera = Camera::new();
        camera.set_pitch(Self::PITCH);
        camera.position.y = radius;

        let mut overview = Self {
            camera,
            canvas,
            offset: Vector2::new(canvas.width / 4.0, canvas.height / 4.0),
            radius,
            edges: [left, right],
            base: [
                Point::new(x1, y, z1),
                Point::new(x2, y, z1),
                Point::new(x2, y, z2),
                Point::new(x1, y, z2),
            ],
        };
        overview.set_rotation(0.0);
        overview
    }

    /// Orbits the camera to `theta` radians around the track, looking at its centre.
    pub fn set_rotation(&mut self, theta: f32) {
        self.camera.set_yaw(theta);
        let (sine, cosine) = self.camera.sin_cos_yaw();
        self.camera.position.x = -self.radius * sine;
        self.camera.position.z = -self.radius * cosine;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    fn project(&self, point: &Point) -> Option<CanvasPoint> {
        let view = self.camera.world_to_view(point);
        if view.z + NEAR_OFFSET_M <= 0.0 {
            return None;
        }
        Some(self.canvas.view_to_canvas(&view) + self.offset)
    }

    fn project_closed(&self, points: &[Point]) -> Vec<CanvasPoint> {
        let mut projected: Vec<CanvasPoint> = points.iter().filter_map(|p| self.project(p)).collect();
        if let Some(first) = projected.first().copied() {
            projected.push(first);
        }
        projected
    }

    /// Closed outline of the ground the track sits on.
    pub fn base(&self) -> Vec<CanvasPoint> {
        self.project_closed(&self.base)
    }

    /// Closed polylines for the left and right track edges.
    pub fn edges(&self) -> [Vec<CanvasPoint>; 2] {
        [self.project_closed(&self.edges[0]), self.project_closed(&self.edges[1])]
    }

    /// Start line, across the first sample of each edge.
    pub fn start_line(&self) -> Option<(CanvasPoint, CanvasPoint)> {
        let left = self.project(self.edges[0].first()?)?;
        let right = self.project(self.edges[1].first()?)?;
        Some((left, right))
    }
}
