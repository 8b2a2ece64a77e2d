use nalgebra::Vector3;
use thiserror::Error;

pub mod dipole;

pub use dipole::Dipole;

/// μT to T
pub const MICROTESLA_TO_TESLA: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum MagneticErrors {
    #[error("field requested at the dipole center")]
    AtDipoleCenter,
    #[error("position must be finite")]
    NonFinitePosition,
}

/// Torque in Nm on a magnetic moment `m` (A·m²) in a field `b` given in μT.
///
/// Both vectors must be expressed in the same frame, the torque comes back in
/// that frame.
pub fn magnetic_torque(moment: &Vector3<f64>, field_ut: &Vector3<f64>) -> Vector3<f64> {
    moment.cross(&(field_ut * MICROTESLA_TO_TESLA))
}
