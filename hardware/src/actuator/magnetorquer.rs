use nalgebra::Vector3;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use uncertainty::{Noise, NoiseBuilder};

use super::Actuator;
use crate::{HardwareErrors, PortBuilder, PortDescriptor, port::check_finite};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MagnetorquerBuilder {
    pub port: PortBuilder,
    /// A·m²
    pub max_magnetic_moment: f64,
    #[serde(default)]
    pub bias: [f64; 3],
    #[serde(default)]
    pub noise: NoiseBuilder,
}

impl MagnetorquerBuilder {
    pub fn new(port: PortBuilder, max_magnetic_moment: f64) -> Self {
        Self {
            port,
            max_magnetic_moment,
            bias: [0.0; 3],
            noise: NoiseBuilder::None,
        }
    }

    pub fn with_bias(mut self, bias: [f64; 3]) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_noise_normal(mut self, std: f64) -> Self {
        self.noise = NoiseBuilder::new_normal(0.0, std);
        self
    }

    pub fn build(&self, rng: &mut SmallRng) -> Result<Magnetorquer, HardwareErrors> {
        let port = self.port.build()?;
        if !self.max_magnetic_moment.is_finite() || self.max_magnetic_moment <= 0.0 {
            return Err(HardwareErrors::NonPositiveLimit(
                port.name,
                self.max_magnetic_moment,
            ));
        }
        check_finite(&port.name, &self.bias)?;
        let noise = self
            .noise
            .build(rng)
            .map_err(|source| HardwareErrors::Noise {
                name: port.name.clone(),
                source,
            })?;
        Ok(Magnetorquer {
            port,
            max_magnetic_moment: self.max_magnetic_moment,
            bias: Vector3::from(self.bias),
            noise,
            magnetic_moment: Vector3::zeros(),
        })
    }
}

/// Three axis magnetorquer. Commands and output moments are in body axes, A·m².
#[derive(Debug, Clone)]
pub struct Magnetorquer {
    port: PortDescriptor,
    max_magnetic_moment: f64,
    bias: Vector3<f64>,
    noise: Noise,
    magnetic_moment: Vector3<f64>,
}

impl Magnetorquer {
    pub fn max_magnetic_moment(&self) -> f64 {
        self.max_magnetic_moment
    }

    /// Moment produced by the last command.
    pub fn magnetic_moment(&self) -> Vector3<f64> {
        self.magnetic_moment
    }
}

impl Actuator for Magnetorquer {
    type Command = Vector3<f64>;
    type Output = Vector3<f64>;

    fn port(&self) -> &PortDescriptor {
        &self.port
    }

    /// The produced moment is scaled down along its own direction whenever its
    /// magnitude exceeds the limit, so the direction is preserved.
    fn apply(&mut self, commanded_moment: Vector3<f64>) -> Vector3<f64> {
        let actual = commanded_moment + self.bias + self.noise.sample_vector();
        let magnitude = actual.norm();
        let moment = if magnitude > self.max_magnetic_moment {
            tracing::debug!(
                torquer = %self.port.name,
                requested = magnitude,
                limit = self.max_magnetic_moment,
                "magnetorquer saturated"
            );
            actual * (self.max_magnetic_moment / magnitude)
        } else {
            actual
        };
        self.magnetic_moment = moment;
        moment
    }
}
