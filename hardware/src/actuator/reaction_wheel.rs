use nalgebra::Vector3;
use rand::rngs::SmallRng;
use rotations::RotationTrait;
use serde::{Deserialize, Serialize};
use uncertainty::{Noise, NoiseBuilder};

use super::Actuator;
use crate::{HardwareErrors, PortBuilder, PortDescriptor};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReactionWheelBuilder {
    pub port: PortBuilder,
    /// Nm
    pub max_torque: f64,
    #[serde(default)]
    pub bias: f64,
    #[serde(default)]
    pub noise: NoiseBuilder,
}

impl ReactionWheelBuilder {
    pub fn new(port: PortBuilder, max_torque: f64) -> Self {
        Self {
            port,
            max_torque,
            bias: 0.0,
            noise: NoiseBuilder::None,
        }
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_noise_normal(mut self, std: f64) -> Self {
        self.noise = NoiseBuilder::new_normal(0.0, std);
        self
    }

    pub fn build(&self, rng: &mut SmallRng) -> Result<ReactionWheel, HardwareErrors> {
        let port = self.port.build()?;
        if !self.max_torque.is_finite() || self.max_torque <= 0.0 {
            return Err(HardwareErrors::NonPositiveLimit(port.name, self.max_torque));
        }
        if !self.bias.is_finite() {
            return Err(HardwareErrors::NonFinite(port.name));
        }
        let noise = self
            .noise
            .build(rng)
            .map_err(|source| HardwareErrors::Noise {
                name: port.name.clone(),
                source,
            })?;
        Ok(ReactionWheel {
            port,
            max_torque: self.max_torque,
            bias: self.bias,
            noise,
            torque: 0.0,
        })
    }
}

/// Single axis reaction wheel. The spin axis is the port x axis.
#[derive(Debug, Clone)]
pub struct ReactionWheel {
    port: PortDescriptor,
    max_torque: f64,
    bias: f64,
    noise: Noise,
    /// last delivered scalar torque, Nm
    torque: f64,
}

impl ReactionWheel {
    pub fn max_torque(&self) -> f64 {
        self.max_torque
    }

    /// Spin axis in body axes.
    pub fn spin_axis(&self) -> Vector3<f64> {
        self.port.orientation.rotate(&Vector3::x())
    }

    /// Scalar torque delivered by the last command.
    pub fn torque(&self) -> f64 {
        self.torque
    }
}

impl Actuator for ReactionWheel {
    type Command = f64;
    type Output = Vector3<f64>;

    fn port(&self) -> &PortDescriptor {
        &self.port
    }

    /// Torque on the body in Nm. Bias and noise are added before the limit, so
    /// the delivered magnitude never exceeds `max_torque`.
    fn apply(&mut self, commanded_torque: f64) -> Vector3<f64> {
        let actual = commanded_torque + self.bias + self.noise.sample();
        let clipped = actual.clamp(-self.max_torque, self.max_torque);
        if clipped != actual {
            tracing::debug!(
                wheel = %self.port.name,
                requested = actual,
                delivered = clipped,
                "reaction wheel saturated"
            );
        }
        self.torque = clipped;
        self.port.orientation.rotate(&Vector3::new(clipped, 0.0, 0.0))
    }
}
