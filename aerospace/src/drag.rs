use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::AerospaceErrors;

/// Simplified drag torque: a flat plate whose center of pressure is offset from
/// the center of mass by `cp_offset`.
///
/// The torque magnitude is `0.5 * Cd * A * rho * |v|^2 * cp_offset` and it acts
/// along `v̂ × ẑ` in the body frame. This is an approximation, not a panel model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AerodynamicDrag {
    pub drag_coefficient: f64,
    /// m²
    pub area: f64,
    /// m
    pub cp_offset: f64,
}

impl Default for AerodynamicDrag {
    fn default() -> Self {
        // short cylinder
        Self {
            drag_coefficient: 1.15,
            area: 0.01,
            cp_offset: 0.01,
        }
    }
}

impl AerodynamicDrag {
    pub fn validate(&self) -> Result<(), AerospaceErrors> {
        for (name, value) in [
            ("drag_coefficient", self.drag_coefficient),
            ("area", self.area),
            ("cp_offset", self.cp_offset),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AerospaceErrors::InvalidDragParameter(name, value));
            }
        }
        Ok(())
    }

    /// Torque in Nm for the body frame velocity relative to the air (m/s) and the
    /// air density (kg/m³). Zero when the velocity is zero or along body z.
    pub fn torque(&self, velocity: &Vector3<f64>, air_density: f64) -> Vector3<f64> {
        let speed = velocity.magnitude();
        if speed == 0.0 {
            return Vector3::zeros();
        }
        let axis = (velocity / speed).cross(&Vector3::z());
        let axis_norm = axis.magnitude();
        if axis_norm < f64::EPSILON {
            return Vector3::zeros();
        }
        let force = 0.5 * self.drag_coefficient * self.area * air_density * speed.powi(2);
        force * self.cp_offset * axis / axis_norm
    }
}
