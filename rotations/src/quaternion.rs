use super::*;
use crate::rotation_matrix::RotationMatrix;
use nalgebra::{Vector3, Vector4};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg};
use thiserror::Error;

/// A quaternion stored scalar first: `(s, x, y, z)`.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Errors that can occur when creating a `Quaternion`.
#[derive(Debug, Clone, Error, Copy, PartialEq)]
pub enum QuaternionErrors {
    #[error("got zero magnitude quaternion")]
    ZeroMagnitude,
    #[error("got non-finite quaternion component")]
    NonFinite,
    #[error("quaternion norm {0} is not within tolerance of 1")]
    NotUnit(f64),
}

impl Quaternion {
    /// The quaternion representing no rotation.
    pub const IDENTITY: Self = Self { s: 1.0, x: 0.0, y: 0.0, z: 0.0 };

    /// Norm below which a quaternion is treated as collapsed and cannot be normalized.
    pub const MIN_NORM: f64 = 1e-12;

    /// Creates a new `Quaternion`, no normalization is performed.
    pub fn new(s: f64, x: f64, y: f64, z: f64) -> Self {
        Self { s, x, y, z }
    }

    /// Embeds a vector as a pure (zero scalar) quaternion.
    pub fn pure(v: &Vector3<f64>) -> Self {
        Self::new(0.0, v[0], v[1], v[2])
    }

    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn dot(&self, other: &Quaternion) -> f64 {
        self.s * other.s + self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn mag(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn conjugate(&self) -> Quaternion {
        Quaternion::new(self.s, -self.x, -self.y, -self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.s.is_finite() && self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn normalize(&self) -> Result<Self, QuaternionErrors> {
        if !self.is_finite() {
            return Err(QuaternionErrors::NonFinite);
        }
        let mag = self.mag();
        if mag < Self::MIN_NORM {
            return Err(QuaternionErrors::ZeroMagnitude);
        }
        Ok(Quaternion::new(
            self.s / mag,
            self.x / mag,
            self.y / mag,
            self.z / mag,
        ))
    }
}

/// Hamilton product `q1 ⊗ q2`, scalar first. The result is not normalized.
pub fn quaternion_multiply(q1: &Quaternion, q2: &Quaternion) -> Quaternion {
    Quaternion::new(
        q1.s * q2.s - q1.x * q2.x - q1.y * q2.y - q1.z * q2.z,
        q1.s * q2.x + q1.x * q2.s + q1.y * q2.z - q1.z * q2.y,
        q1.s * q2.y - q1.x * q2.z + q1.y * q2.s + q1.z * q2.x,
        q1.s * q2.z + q1.x * q2.y - q1.y * q2.x + q1.z * q2.s,
    )
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Self;

    /// Hamilton product, see [`quaternion_multiply`].
    fn mul(self, rhs: Self) -> Self {
        quaternion_multiply(&self, &rhs)
    }
}

impl Mul<f64> for Quaternion {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.s * rhs, self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Add<Quaternion> for Quaternion {
    type Output = Self;

    /// Component-wise sum. Only meaningful for adding a scaled derivative to a
    /// quaternion state during integration, the result must be renormalized.
    fn add(self, rhs: Self) -> Self {
        Self::new(self.s + rhs.s, self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign<Quaternion> for Quaternion {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.s, -self.x, -self.y, -self.z)
    }
}

impl From<[f64; 4]> for Quaternion {
    fn from(q: [f64; 4]) -> Self {
        Self::new(q[0], q[1], q[2], q[3])
    }
}

impl From<Quaternion> for [f64; 4] {
    fn from(q: Quaternion) -> Self {
        [q.s, q.x, q.y, q.z]
    }
}

impl From<Vector4<f64>> for Quaternion {
    fn from(q: Vector4<f64>) -> Self {
        Self::new(q[0], q[1], q[2], q[3])
    }
}

impl fmt::Debug for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quaternion ")?;
        writeln!(f, "   s: {: >10.6}", self.s)?;
        writeln!(f, "   x: {: >10.6}", self.x)?;
        writeln!(f, "   y: {: >10.6}", self.y)?;
        writeln!(f, "   z: {: >10.6}", self.z)?;
        Ok(())
    }
}

/// A quaternion known to have unit norm.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitQuaternion(pub Quaternion);

impl UnitQuaternion {
    pub const IDENTITY: Self = Self(Quaternion::IDENTITY);

    /// Creates a unit quaternion by normalizing `(s, x, y, z)`.
    pub fn new(s: f64, x: f64, y: f64, z: f64) -> Result<Self, QuaternionErrors> {
        Ok(Self(Quaternion::new(s, x, y, z).normalize()?))
    }

    /// Accepts `q` only if its norm is already within `tol` of 1, then removes the
    /// residual so the stored value is exactly unit.
    pub fn from_near_unit(q: Quaternion, tol: f64) -> Result<Self, QuaternionErrors> {
        if !q.is_finite() {
            return Err(QuaternionErrors::NonFinite);
        }
        let mag = q.mag();
        if (mag - 1.0).abs() > tol {
            return Err(QuaternionErrors::NotUnit(mag));
        }
        Ok(Self(q.normalize()?))
    }

    /// Rotation of `angle` radians about `axis`. The axis does not need to be unit length.
    pub fn from_axis_angle(axis: &Vector3<f64>, angle: f64) -> Result<Self, QuaternionErrors> {
        let norm = axis.norm();
        if norm < f64::EPSILON {
            return Err(QuaternionErrors::ZeroMagnitude);
        }
        let u = axis / norm;
        let (sin, cos) = (angle / 2.0).sin_cos();
        Self::new(cos, u[0] * sin, u[1] * sin, u[2] * sin)
    }

    pub fn quaternion(&self) -> &Quaternion {
        &self.0
    }
}

impl Default for UnitQuaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TryFrom<Quaternion> for UnitQuaternion {
    type Error = QuaternionErrors;
    fn try_from(value: Quaternion) -> Result<Self, QuaternionErrors> {
        Ok(Self(value.normalize()?))
    }
}

impl From<UnitQuaternion> for Quaternion {
    fn from(value: UnitQuaternion) -> Self {
        value.0
    }
}

impl Mul<UnitQuaternion> for UnitQuaternion {
    type Output = Self;
    fn mul(self, rhs: UnitQuaternion) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl RotationTrait for UnitQuaternion {
    /// Active rotation `q ⊗ v ⊗ q*`.
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        RotationMatrix::from(self).rotate(v)
    }

    /// Passive rotation `q* ⊗ v ⊗ q`.
    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64> {
        RotationMatrix::from(self).transform(v)
    }

    fn inv(&self) -> Self {
        // conjugate of a unit quaternion is still unit
        UnitQuaternion(self.0.conjugate())
    }

    fn identity() -> Self {
        Self::IDENTITY
    }
}
