use nalgebra::Vector3;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use uncertainty::{Noise, NoiseBuilder};

use crate::{HardwareErrors, PortDescriptor, port::check_finite};

pub mod magnetometer;
pub mod sun_sensor;

/// A device producing a noisy measurement of a true body frame quantity.
pub trait Sensor {
    fn port(&self) -> &PortDescriptor;

    /// Every call draws fresh noise.
    fn read(&mut self, true_value: &Vector3<f64>) -> Vector3<f64>;
}

fn unity() -> f64 {
    1.0
}

/// Error model shared by the vector sensors:
/// `measurement = sensitivity * v + bias + noise`, noise independent per axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorErrorModelBuilder {
    #[serde(default = "unity")]
    pub sensitivity: f64,
    #[serde(default)]
    pub bias: [f64; 3],
    #[serde(default)]
    pub noise: NoiseBuilder,
}

impl Default for SensorErrorModelBuilder {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            bias: [0.0; 3],
            noise: NoiseBuilder::None,
        }
    }
}

impl SensorErrorModelBuilder {
    pub fn build(
        &self,
        name: &str,
        rng: &mut SmallRng,
    ) -> Result<SensorErrorModel, HardwareErrors> {
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            return Err(HardwareErrors::NonPositiveSensitivity(
                name.to_string(),
                self.sensitivity,
            ));
        }
        check_finite(name, &self.bias)?;
        let noise = self
            .noise
            .build(rng)
            .map_err(|source| HardwareErrors::Noise {
                name: name.to_string(),
                source,
            })?;
        Ok(SensorErrorModel {
            sensitivity: self.sensitivity,
            bias: Vector3::from(self.bias),
            noise,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SensorErrorModel {
    sensitivity: f64,
    bias: Vector3<f64>,
    noise: Noise,
}

impl SensorErrorModel {
    pub fn apply(&mut self, v: &Vector3<f64>) -> Vector3<f64> {
        self.sensitivity * v + self.bias + self.noise.sample_vector()
    }
}
