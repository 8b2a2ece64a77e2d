use nalgebra::Vector3;
use rand::rngs::SmallRng;
use rotations::RotationTrait;
use serde::{Deserialize, Serialize};
use uncertainty::NoiseBuilder;

use super::{Sensor, SensorErrorModel, SensorErrorModelBuilder};
use crate::{HardwareErrors, PortBuilder, PortDescriptor};

/// Frame the magnetometer reports in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MagnetometerFrame {
    /// The mounting orientation is ignored and the field is reported in body axes.
    #[default]
    Body,
    /// The field is rotated into the sensor axes using the mounting orientation.
    Sensor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MagnetometerBuilder {
    pub port: PortBuilder,
    #[serde(default)]
    pub errors: SensorErrorModelBuilder,
    #[serde(default)]
    pub frame: MagnetometerFrame,
}

impl MagnetometerBuilder {
    pub fn new(port: PortBuilder) -> Self {
        Self {
            port,
            errors: SensorErrorModelBuilder::default(),
            frame: MagnetometerFrame::default(),
        }
    }

    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.errors.sensitivity = sensitivity;
        self
    }

    /// Constant bias in μT.
    pub fn with_bias(mut self, bias: [f64; 3]) -> Self {
        self.errors.bias = bias;
        self
    }

    /// Zero mean gaussian noise, `std` in μT.
    pub fn with_noise_normal(mut self, std: f64) -> Self {
        self.errors.noise = NoiseBuilder::new_normal(0.0, std);
        self
    }

    pub fn with_frame(mut self, frame: MagnetometerFrame) -> Self {
        self.frame = frame;
        self
    }

    pub fn build(&self, rng: &mut SmallRng) -> Result<Magnetometer, HardwareErrors> {
        let port = self.port.build()?;
        let errors = self.errors.build(&port.name, rng)?;
        Ok(Magnetometer {
            port,
            errors,
            frame: self.frame,
        })
    }
}

/// Three axis magnetometer reading the local field in μT.
#[derive(Debug, Clone)]
pub struct Magnetometer {
    port: PortDescriptor,
    errors: SensorErrorModel,
    frame: MagnetometerFrame,
}

impl Magnetometer {
    pub fn frame(&self) -> MagnetometerFrame {
        self.frame
    }
}

impl Sensor for Magnetometer {
    fn port(&self) -> &PortDescriptor {
        &self.port
    }

    fn read(&mut self, magnetic_field_body: &Vector3<f64>) -> Vector3<f64> {
        let field = match self.frame {
            MagnetometerFrame::Body => *magnetic_field_body,
            MagnetometerFrame::Sensor => self.port.orientation.transform(magnetic_field_body),
        };
        self.errors.apply(&field)
    }
}
