pub mod quaternion;
pub mod rotation_matrix;

use nalgebra::Vector3;

pub mod prelude {
    pub use crate::quaternion::*;
    pub use crate::rotation_matrix::*;
    pub use crate::RotationTrait;
}

/// Trait defining rotation and transformation operations.
///
/// Conventions used throughout the workspace:
/// * `rotate` is the active rotation ("alibi"). For a port orientation it takes a
///   vector expressed in port axes and returns the same vector in body axes. For
///   the spacecraft attitude it maps body axes to inertial axes.
/// * `transform` is the passive rotation ("alias"), the inverse of `rotate`.
pub trait RotationTrait {
    /// Rotates a vector by the rotation.
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64>;

    /// Transforms a vector by the rotation, i.e. expresses it in the rotated axes.
    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64>;

    fn inv(&self) -> Self;

    fn identity() -> Self;
}
