//! Environment models for a spacecraft in low earth orbit.
//!
//! The orbit is not propagated dynamically. [`OrbitEnvironment`] evaluates an
//! analytic circular orbit and samples the field, density and sun direction at the
//! resulting position.

pub mod atmosphere;
pub mod drag;
pub mod environment;
pub mod orbit;

use magnetics::MagneticErrors;
use nalgebra::Vector3;
use thiserror::Error;

pub use drag::AerodynamicDrag;
pub use environment::OrbitEnvironment;
pub use orbit::{CircularOrbit, CircularOrbitBuilder};

/// km³/s²
pub const EARTH_MU: f64 = 398600.4418;
/// equatorial radius, km
pub const EARTH_RADIUS: f64 = 6378.137;
/// rad/s
pub const EARTH_ROTATION_RATE: f64 = 7.2921159e-5;

#[derive(Debug, Error)]
pub enum AerospaceErrors {
    #[error("altitude must be greater than 0 km, got {0}")]
    NonPositiveAltitude(f64),
    #[error("orbit angles must be finite")]
    NonFiniteAngle,
    #[error("drag parameter '{0}' must be non-negative and finite, got {1}")]
    InvalidDragParameter(&'static str, f64),
    #[error("environment dt must be greater than 0, got {0}")]
    NonPositiveDt(f64),
    #[error("MagneticErrors: {0}")]
    Magnetic(#[from] MagneticErrors),
}

/// Everything the spacecraft needs to know about its surroundings at one instant.
/// Vectors are in the inertial frame.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvironmentSample {
    /// seconds since the start of the run
    pub time: f64,
    /// km
    pub position: Vector3<f64>,
    /// km/s
    pub velocity: Vector3<f64>,
    /// μT
    pub magnetic_field: Vector3<f64>,
    /// kg/m³
    pub air_density: f64,
    /// unit vector toward the sun
    pub sun_direction: Vector3<f64>,
}

/// Source of environment data, advanced once per simulation tick.
pub trait Environment {
    fn advance(&mut self, dt: f64) -> Result<(), AerospaceErrors>;

    fn sample(&self) -> Result<EnvironmentSample, AerospaceErrors>;
}
