use nalgebra::{Matrix3x4, Matrix4, Vector4};
use super::{Point, Vec3};

/// Cubic Hermite basis, rows ordered (p1, p2, t1, t2), columns (t³, t², t, 1).
fn hermite_basis() -> Matrix4<f32> {
    Matrix4::new(
        2.0, -3.0, 0.0, 1.0,
        -2.0, 3.0, 0.0, 0.0,
        1.0, -2.0, 1.0, 0.0,
        1.0, -1.0, 0.0, 0.0,
    )
}

/// First derivative of the basis, columns (t², t, 1, unused).
fn hermite_derivative() -> Matrix4<f32> {
    Matrix4::new(
        6.0, -6.0, 0.0, 0.0,
        -6.0, 6.0, 0.0, 0.0,
        3.0, -4.0, 1.0, 0.0,
        3.0, -2.0, 0.0, 0.0,
    )
}

/// One Hermite segment between two control points.
///
/// Each row of `coefficients` holds the cubic coefficients of one spatial axis, so a point is
/// a single matrix-vector product with `(t³, t², t, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct HermiteCurve {
    coefficients: Matrix3x4<f32>,
    derivative: Matrix3x4<f32>,
}

impl HermiteCurve {
    pub fn new(start: &Point, end: &Point, start_tangent: &Vec3, end_tangent: &Vec3) -> Self {
        let geometry = Matrix3x4::from_columns(&[
            start.coords,
            end.coords,
            *start_tangent,
            *end_tangent,
        ]);

        Self {
            coefficients: geometry * hermite_basis(),
            derivative: geometry * hermite_derivative(),
        }
    }

    /// Point on the curve for `0 <= t <= 1`.
    pub fn point(&self, t: f32) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        Point::from(self.coefficients * Vector4::new(t3, t2, t, 1.0))
    }

    /// Unnormalised tangent at `t`.
    pub fn tangent(&self, t: f32) -> Vec3 {
        self.derivative * Vector4::new(t * t, t, 1.0, 0.0)
    }
}
