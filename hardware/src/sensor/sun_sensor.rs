use nalgebra::Vector3;
use rand::rngs::SmallRng;
use rotations::RotationTrait;
use serde::{Deserialize, Serialize};
use uncertainty::NoiseBuilder;

use super::{Sensor, SensorErrorModel, SensorErrorModelBuilder};
use crate::{HardwareErrors, PortBuilder, PortDescriptor};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SunSensorBuilder {
    pub port: PortBuilder,
    #[serde(default)]
    pub errors: SensorErrorModelBuilder,
}

impl SunSensorBuilder {
    pub fn new(port: PortBuilder) -> Self {
        Self {
            port,
            errors: SensorErrorModelBuilder::default(),
        }
    }

    pub fn with_noise_normal(mut self, std: f64) -> Self {
        self.errors.noise = NoiseBuilder::new_normal(0.0, std);
        self
    }

    pub fn with_bias(mut self, bias: [f64; 3]) -> Self {
        self.errors.bias = bias;
        self
    }

    pub fn build(&self, rng: &mut SmallRng) -> Result<SunSensor, HardwareErrors> {
        let port = self.port.build()?;
        let errors = self.errors.build(&port.name, rng)?;
        Ok(SunSensor { port, errors })
    }
}

/// Reports the sun direction in sensor axes.
///
/// The reading is a biased, noisy direction. It is not renormalized, so callers
/// must not assume unit length.
#[derive(Debug, Clone)]
pub struct SunSensor {
    port: PortDescriptor,
    errors: SensorErrorModel,
}

impl Sensor for SunSensor {
    fn port(&self) -> &PortDescriptor {
        &self.port
    }

    fn read(&mut self, sun_direction_body: &Vector3<f64>) -> Vector3<f64> {
        let sun_direction_sensor = self.port.orientation.transform(sun_direction_body);
        self.errors.apply(&sun_direction_sensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    const TOL: f64 = 1e-12;

    #[test]
    fn test_sun_sensor_rotates_into_sensor_frame() {
        let mut rng = SmallRng::seed_from_u64(0);
        // 20 degrees about z
        let half = 10.0f64.to_radians();
        let port = PortBuilder::new("sun")
            .with_position([0.5, 0.0, 0.0])
            .with_orientation([half.cos(), 0.0, 0.0, half.sin()]);
        let mut sensor = SunSensorBuilder::new(port).build(&mut rng).unwrap();

        let reading = sensor.read(&Vector3::new(1.0, 0.0, 0.0));
        let angle = 20.0f64.to_radians();
        assert_abs_diff_eq!(reading[0], angle.cos(), epsilon = TOL);
        assert_abs_diff_eq!(reading[1], -angle.sin(), epsilon = TOL);
        assert_abs_diff_eq!(reading[2], 0.0, epsilon = TOL);
    }

    #[test]
    fn test_noisy_reading_differs_from_truth() {
        let mut rng = SmallRng::seed_from_u64(4);
        let port = PortBuilder::new("sun").with_position([0.0, 1.0, 0.0]);
        let mut sensor = SunSensorBuilder::new(port)
            .with_noise_normal(0.02)
            .build(&mut rng)
            .unwrap();

        let sun = Vector3::new(1.0, 0.0, 0.0);
        let reading = sensor.read(&sun);
        assert_ne!(reading, sun);
        assert!((reading - sun).norm() < 0.2);
    }
}
