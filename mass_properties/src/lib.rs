use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MassPropertiesErrors {
    #[error("mass cannot be less than or equal to zero, got {0}")]
    MassLessThanOrEqualToZero(f64),
    #[error("inertia tensor has non-finite entries")]
    NonFinite,
    #[error("inertia tensor is not symmetric (max asymmetry {0})")]
    NotSymmetric(f64),
    #[error("inertia tensor is not positive definite")]
    NotPositiveDefinite,
    #[error("inertia tensor is singular")]
    Singular,
}

/// A body frame inertia tensor in kg·m².
///
/// Validated once at construction: finite, symmetric, positive definite and
/// invertible. The inverse is cached since the tensor never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inertia {
    matrix: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

impl Inertia {
    /// Relative tolerance on `|I - Iᵀ|` compared to the largest entry.
    pub const SYMMETRY_TOL: f64 = 1e-9;

    pub fn new(
        ixx: f64,
        iyy: f64,
        izz: f64,
        ixy: f64,
        ixz: f64,
        iyz: f64,
    ) -> Result<Self, MassPropertiesErrors> {
        Self::from_matrix(Matrix3::new(
            ixx, ixy, ixz, ixy, iyy, iyz, ixz, iyz, izz,
        ))
    }

    pub fn diagonal(ixx: f64, iyy: f64, izz: f64) -> Result<Self, MassPropertiesErrors> {
        Self::new(ixx, iyy, izz, 0.0, 0.0, 0.0)
    }

    pub fn from_rows(rows: [[f64; 3]; 3]) -> Result<Self, MassPropertiesErrors> {
        Self::from_matrix(Matrix3::from_fn(|i, j| rows[i][j]))
    }

    pub fn from_matrix(matrix: Matrix3<f64>) -> Result<Self, MassPropertiesErrors> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(MassPropertiesErrors::NonFinite);
        }

        let scale = matrix.amax();
        let asymmetry = (matrix - matrix.transpose()).amax();
        if asymmetry > Self::SYMMETRY_TOL * scale {
            return Err(MassPropertiesErrors::NotSymmetric(asymmetry));
        }

        if matrix.cholesky().is_none() {
            return Err(MassPropertiesErrors::NotPositiveDefinite);
        }

        let inverse = matrix
            .try_inverse()
            .ok_or(MassPropertiesErrors::Singular)?;
        if inverse.iter().any(|v| !v.is_finite()) {
            return Err(MassPropertiesErrors::Singular);
        }

        Ok(Self { matrix, inverse })
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    pub fn inverse(&self) -> &Matrix3<f64> {
        &self.inverse
    }

    /// `I⁻¹ · τ`
    pub fn angular_acceleration(&self, torque: &Vector3<f64>) -> Vector3<f64> {
        self.inverse * torque
    }
}

/// Mass and inertia of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    pub mass: f64,
    pub inertia: Inertia,
}

impl MassProperties {
    pub fn new(mass: f64, inertia: Inertia) -> Result<Self, MassPropertiesErrors> {
        if !mass.is_finite() || mass <= f64::EPSILON {
            return Err(MassPropertiesErrors::MassLessThanOrEqualToZero(mass));
        }
        Ok(Self { mass, inertia })
    }
}

/// Serializable form of [`MassProperties`] used in configuration files.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MassPropertiesBuilder {
    pub mass: f64,
    pub inertia: [[f64; 3]; 3],
}

impl MassPropertiesBuilder {
    pub fn build(&self) -> Result<MassProperties, MassPropertiesErrors> {
        MassProperties::new(self.mass, Inertia::from_rows(self.inertia)?)
    }
}
