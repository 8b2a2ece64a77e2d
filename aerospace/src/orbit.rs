use nalgebra::{Matrix3, Vector3};
use rotations::prelude::RotationMatrix;
use rotations::RotationTrait;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::{AerospaceErrors, EARTH_MU, EARTH_RADIUS};

/// Circular orbit as it appears in configuration. Angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircularOrbitBuilder {
    /// km above the equatorial radius
    pub altitude: f64,
    #[serde(default)]
    pub inclination: f64,
    #[serde(default)]
    pub raan: f64,
    /// argument of latitude at t = 0
    #[serde(default)]
    pub argument_of_latitude: f64,
}

impl CircularOrbitBuilder {
    pub fn build(&self) -> Result<CircularOrbit, AerospaceErrors> {
        CircularOrbit::new(
            self.altitude,
            self.inclination.to_radians(),
            self.raan.to_radians(),
            self.argument_of_latitude.to_radians(),
        )
    }
}

/// Two body circular orbit around the earth.
#[derive(Clone, Debug)]
pub struct CircularOrbit {
    /// km
    pub radius: f64,
    pub inclination: f64,
    pub raan: f64,
    /// argument of latitude at t = 0, rad
    pub argument_of_latitude: f64,
    /// mean motion, rad/s
    pub mean_motion: f64,
    /// perifocal to inertial
    perifocal: RotationMatrix,
}

impl CircularOrbit {
    pub fn new(
        altitude: f64,
        inclination: f64,
        raan: f64,
        argument_of_latitude: f64,
    ) -> Result<Self, AerospaceErrors> {
        if !altitude.is_finite() || altitude <= 0.0 {
            return Err(AerospaceErrors::NonPositiveAltitude(altitude));
        }
        if ![inclination, raan, argument_of_latitude]
            .iter()
            .all(|a| a.is_finite())
        {
            return Err(AerospaceErrors::NonFiniteAngle);
        }
        let radius = EARTH_RADIUS + altitude;
        let mean_motion = (EARTH_MU / radius.powi(3)).sqrt();
        let perifocal = RotationMatrix::from(rotation_z(raan) * rotation_x(inclination));
        Ok(Self {
            radius,
            inclination,
            raan,
            argument_of_latitude,
            mean_motion,
            perifocal,
        })
    }

    /// seconds
    pub fn period(&self) -> f64 {
        2.0 * PI / self.mean_motion
    }

    /// km/s
    pub fn speed(&self) -> f64 {
        self.radius * self.mean_motion
    }

    pub fn altitude(&self) -> f64 {
        self.radius - EARTH_RADIUS
    }

    /// Inertial position (km) and velocity (km/s) at `t` seconds.
    pub fn state(&self, t: f64) -> (Vector3<f64>, Vector3<f64>) {
        let u = self.argument_of_latitude + self.mean_motion * t;
        let (sin_u, cos_u) = u.sin_cos();
        let r = self.perifocal.rotate(&Vector3::new(cos_u, sin_u, 0.0)) * self.radius;
        let v = self.perifocal.rotate(&Vector3::new(-sin_u, cos_u, 0.0)) * self.speed();
        (r, v)
    }
}

/// Active rotation about z.
pub(crate) fn rotation_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Active rotation about x.
pub(crate) fn rotation_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c)
}
