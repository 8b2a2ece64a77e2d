use super::*;
use crate::quaternion::UnitQuaternion;
use nalgebra::{Matrix3, Vector3};
use std::ops::Mul;

/// A 3x3 direction cosine matrix.
///
/// Built from a [`UnitQuaternion`] it is the active rotation matrix, so
/// `R * v` rotates `v` and `Rᵀ * v` transforms it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationMatrix(pub Matrix3<f64>);

impl RotationMatrix {
    pub fn get_value(&self) -> Matrix3<f64> {
        self.0
    }
}

impl From<Matrix3<f64>> for RotationMatrix {
    fn from(value: Matrix3<f64>) -> Self {
        Self(value)
    }
}

impl From<&UnitQuaternion> for RotationMatrix {
    fn from(q: &UnitQuaternion) -> Self {
        let (s, x, y, z) = (q.0.s, q.0.x, q.0.y, q.0.z);

        Self(Matrix3::new(
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y - s * z),
            2.0 * (x * z + s * y),
            2.0 * (x * y + s * z),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z - s * x),
            2.0 * (x * z - s * y),
            2.0 * (y * z + s * x),
            1.0 - 2.0 * (x * x + y * y),
        ))
    }
}

impl RotationTrait for RotationMatrix {
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.0 * v
    }

    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.0.transpose() * v
    }

    fn inv(&self) -> Self {
        Self(self.0.transpose())
    }

    fn identity() -> Self {
        Self(Matrix3::identity())
    }
}

impl Mul<RotationMatrix> for RotationMatrix {
    type Output = Self;
    fn mul(self, rhs: RotationMatrix) -> Self {
        Self(self.0 * rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;
    const TOL: f64 = 1e-12;

    #[test]
    fn test_rotation_matrix_from_quaternion_x() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::x(), PI / 2.0).unwrap();
        let r = RotationMatrix::from(&q);

        let v = r.rotate(&Vector3::new(0.0, 1.0, 0.0));
        assert_abs_diff_eq!(v[0], 0.0, epsilon = TOL);
        assert_abs_diff_eq!(v[1], 0.0, epsilon = TOL);
        assert_abs_diff_eq!(v[2], 1.0, epsilon = TOL);
    }

    #[test]
    fn test_rotation_matrix_is_orthonormal() {
        let q = UnitQuaternion::new(0.5, -0.3, 0.7, 0.2).unwrap();
        let r = RotationMatrix::from(&q).get_value();
        let product = r * r.transpose();

        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(product[(i, j)], expected, epsilon = TOL);
            }
        }
        assert_abs_diff_eq!(r.determinant(), 1.0, epsilon = TOL);
    }

    #[test]
    fn test_composition_matches_quaternion_product() {
        let q1 = UnitQuaternion::from_axis_angle(&Vector3::z(), 0.4).unwrap();
        let q2 = UnitQuaternion::from_axis_angle(&Vector3::new(1.0, 1.0, 0.0), -1.1).unwrap();
        let v = Vector3::new(0.3, 0.1, -2.0);

        let by_quaternion = (q1 * q2).rotate(&v);
        let by_matrix = (RotationMatrix::from(&q1) * RotationMatrix::from(&q2)).rotate(&v);

        assert_abs_diff_eq!(by_quaternion[0], by_matrix[0], epsilon = TOL);
        assert_abs_diff_eq!(by_quaternion[1], by_matrix[1], epsilon = TOL);
        assert_abs_diff_eq!(by_quaternion[2], by_matrix[2], epsilon = TOL);
    }

    #[test]
    fn test_inverse_is_transpose() {
        let q = UnitQuaternion::new(0.5, -0.3, 0.7, 0.2).unwrap();
        let r = RotationMatrix::from(&q);
        let product = (r * r.inv()).get_value();
        let identity = RotationMatrix::identity().get_value();

        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(product[(i, j)], identity[(i, j)], epsilon = TOL);
            }
        }
    }
}
