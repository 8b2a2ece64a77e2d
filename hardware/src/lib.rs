//! Sensor and actuator models mounted on the spacecraft.
//!
//! Ports only own their calibration: mounting, sensitivity, bias, noise and
//! limits. They never touch spacecraft state, they return values that the caller
//! applies.

pub mod actuator;
pub mod port;
pub mod sensor;

use rotations::prelude::QuaternionErrors;
use thiserror::Error;
use uncertainty::UncertaintyErrors;

pub use actuator::{Actuator, magnetorquer::Magnetorquer, reaction_wheel::ReactionWheel};
pub use port::{PortBuilder, PortDescriptor};
pub use sensor::{Sensor, magnetometer::Magnetometer, sun_sensor::SunSensor};

#[derive(Debug, Error)]
pub enum HardwareErrors {
    #[error("port '{0}' is defined more than once")]
    DuplicateName(String),
    #[error("port name cannot be empty")]
    EmptyName,
    #[error("port '{0}' has a non-finite position or bias")]
    NonFinite(String),
    #[error("port '{name}' orientation: {source}")]
    Orientation {
        name: String,
        source: QuaternionErrors,
    },
    #[error("port '{name}' noise: {source}")]
    Noise {
        name: String,
        source: UncertaintyErrors,
    },
    #[error("port '{0}' limit must be greater than 0, got {1}")]
    NonPositiveLimit(String, f64),
    #[error("port '{0}' sensitivity must be greater than 0, got {1}")]
    NonPositiveSensitivity(String, f64),
}
