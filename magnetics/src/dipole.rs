use std::f64::consts::PI;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::MagneticErrors;

/// Mean earth radius used by the gauss coefficients, m
pub const EARTH_REFERENCE_RADIUS: f64 = 6.3712e6;

/// Centered dipole model of a planetary field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dipole {
    /// dipole moment scaled by μ0/4π, T·m³
    m: Vector3<f64>,
}

impl Dipole {
    /// Earth dipole from the first order IGRF 2020 coefficients.
    pub fn earth() -> Self {
        Self::from_gh(EARTH_REFERENCE_RADIUS, [-29404.8, -1450.9], 4652.5)
    }

    /// Dipole from the pole location. `moment` in gauss at radius `a` (m),
    /// `lat` and `lon` of the north geomagnetic pole in degrees.
    pub fn from_pole(a: f64, moment: f64, lat: f64, lon: f64) -> Self {
        let lat = lat * PI / 180.0;
        let lon = lon * PI / 180.0;
        let gauss_to_tesla = 1e-4;
        let m = moment * gauss_to_tesla * a.powi(3);
        // markley/crassidis with latitude in [-pi/2, pi/2]
        let m = m * Vector3::new(
            -lat.cos() * lon.cos(),
            -lat.cos() * lon.sin(),
            -lat.sin(),
        );
        Self { m }
    }

    /// Dipole from the degree one gauss coefficients `[g10, g11]` and `h11` in nT.
    pub fn from_gh(a: f64, g: [f64; 2], h: f64) -> Self {
        let nt_to_tesla = 1e-9;
        let m = nt_to_tesla * a.powi(3) * Vector3::new(g[1], h, g[0]);
        Self { m }
    }

    /// Field in μT at `r` (m), both in the planet fixed frame.
    pub fn calculate(&self, r: &Vector3<f64>) -> Result<Vector3<f64>, MagneticErrors> {
        if r.iter().any(|v| !v.is_finite()) {
            return Err(MagneticErrors::NonFinitePosition);
        }
        let r_mag = r.magnitude();
        if r_mag == 0.0 {
            return Err(MagneticErrors::AtDipoleCenter);
        }
        let b = (3.0 * self.m.dot(r) * r - r_mag.powi(2) * self.m) / r_mag.powi(5);
        Ok(b * 1e6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    const TOL: f64 = 1e-9;

    #[test]
    fn test_dipole_gh() {
        let r = Vector3::new(7e6, 0.0, 0.0);
        let dipole = Dipole::from_gh(EARTH_REFERENCE_RADIUS, [-29554.63, -1669.05], 5077.99);
        let b = dipole.calculate(&r).unwrap();

        assert_abs_diff_eq!(b[0], -2.5169172529558114, epsilon = TOL);
        assert_abs_diff_eq!(b[1], -3.8287890240966663, epsilon = TOL);
        assert_abs_diff_eq!(b[2], 22.284101180829042, epsilon = TOL);
    }

    #[test]
    fn test_dipole_pole_close_to_gh() {
        let r = Vector3::new(7e6, 0.0, 0.0);
        let dipole = Dipole::from_pole(EARTH_REFERENCE_RADIUS, 0.306, 80.65, -72.68);
        let b = dipole.calculate(&r).unwrap();

        assert_relative_eq!(b[0], -2.5169172529558114, max_relative = 0.2);
        assert_relative_eq!(b[1], -3.8287890240966663, max_relative = 0.2);
        assert_relative_eq!(b[2], 22.284101180829042, max_relative = 0.1);
    }

    #[test]
    fn test_field_falls_off_with_cube_of_radius() {
        let dipole = Dipole::earth();
        let near = dipole.calculate(&Vector3::new(7e6, 0.0, 0.0)).unwrap();
        let far = dipole.calculate(&Vector3::new(14e6, 0.0, 0.0)).unwrap();
        assert_relative_eq!(near.norm() / far.norm(), 8.0, max_relative = 1e-12);
    }

    #[test]
    fn test_center_is_rejected() {
        let dipole = Dipole::earth();
        assert_eq!(
            dipole.calculate(&Vector3::zeros()),
            Err(MagneticErrors::AtDipoleCenter)
        );
    }
}
