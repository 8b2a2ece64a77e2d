use magnetics::Dipole;
use nalgebra::Vector3;
use std::f64::consts::PI;

use crate::{
    AerospaceErrors, EARTH_RADIUS, EARTH_ROTATION_RATE, Environment, EnvironmentSample,
    atmosphere,
    orbit::{CircularOrbit, rotation_x, rotation_z},
};

/// Obliquity of the ecliptic, rad
const OBLIQUITY: f64 = 23.439 * PI / 180.0;
/// Julian year, s
const YEAR: f64 = 31_557_600.0;

/// Analytic low earth orbit environment.
///
/// Position and velocity come from a [`CircularOrbit`], the field from a centered
/// dipole fixed to the rotating earth, the density from the tabulated atmosphere
/// and the sun direction from the mean solar longitude.
#[derive(Clone, Debug)]
pub struct OrbitEnvironment {
    orbit: CircularOrbit,
    dipole: Dipole,
    time: f64,
    /// earth rotation angle at t = 0, rad
    pub initial_earth_angle: f64,
    /// mean solar longitude at t = 0, rad
    pub initial_sun_longitude: f64,
}

impl OrbitEnvironment {
    pub fn new(orbit: CircularOrbit) -> Self {
        Self {
            orbit,
            dipole: Dipole::earth(),
            time: 0.0,
            initial_earth_angle: 0.0,
            initial_sun_longitude: 0.0,
        }
    }

    pub fn with_dipole(mut self, dipole: Dipole) -> Self {
        self.dipole = dipole;
        self
    }

    pub fn orbit(&self) -> &CircularOrbit {
        &self.orbit
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    fn earth_angle(&self) -> f64 {
        self.initial_earth_angle + EARTH_ROTATION_RATE * self.time
    }

    fn sun_direction(&self) -> Vector3<f64> {
        let longitude = self.initial_sun_longitude + 2.0 * PI * self.time / YEAR;
        rotation_x(OBLIQUITY) * Vector3::new(longitude.cos(), longitude.sin(), 0.0)
    }

    /// Inertial field in μT at inertial position `r` km.
    fn magnetic_field(&self, r: &Vector3<f64>) -> Result<Vector3<f64>, AerospaceErrors> {
        let to_inertial = rotation_z(self.earth_angle());
        let r_fixed = to_inertial.transpose() * (r * 1e3);
        let b_fixed = self.dipole.calculate(&r_fixed)?;
        Ok(to_inertial * b_fixed)
    }
}

impl Environment for OrbitEnvironment {
    fn advance(&mut self, dt: f64) -> Result<(), AerospaceErrors> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(AerospaceErrors::NonPositiveDt(dt));
        }
        self.time += dt;
        tracing::trace!(time = self.time, "environment advanced");
        Ok(())
    }

    fn sample(&self) -> Result<EnvironmentSample, AerospaceErrors> {
        let (position, velocity) = self.orbit.state(self.time);
        let magnetic_field = self.magnetic_field(&position)?;
        let altitude = position.magnitude() - EARTH_RADIUS;
        Ok(EnvironmentSample {
            time: self.time,
            position,
            velocity,
            magnetic_field,
            air_density: atmosphere::density(altitude),
            sun_direction: self.sun_direction(),
        })
    }
}
