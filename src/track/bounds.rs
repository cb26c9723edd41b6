use super::{Point, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Running axis-aligned box. The first point added initialises both corners, later points
/// only widen it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingBox {
    extents: Option<(Point, Point)>,
}

impl BoundingBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, point: &Point) {
        self.extents = Some(match self.extents {
            None => (*point, *point),
            Some((min, max)) => (min.inf(point), max.sup(point)),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.extents.is_none()
    }

    pub fn min(&self) -> Option<Point> {
        self.extents.map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<Point> {
        self.extents.map(|(_, max)| max)
    }

    pub fn centre(&self) -> Option<Point> {
        self.extents.map(|(min, max)| nalgebra::center(&min, &max))
    }

    /// Size along `axis`, zero for an empty box.
    pub fn extent(&self, axis: Axis) -> f32 {
        self.size()[axis.index()]
    }

    pub fn size(&self) -> Vec3 {
        match self.extents {
            Some((min, max)) => max - min,
            None => Vec3::zeros(),
        }
    }
}
