use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PdErrors {
    #[error("pd gain '{0}' must be non-negative and finite, got {1}")]
    InvalidGain(&'static str, f64),
    #[error("pd dt must be greater than 0, got {0}")]
    NonPositiveDt(f64),
}

/// Proportional derivative law, `u = kp * e + kd * ė` per axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PdController {
    pub kp: f64,
    pub kd: f64,
}

impl PdController {
    pub fn new(kp: f64, kd: f64) -> Result<Self, PdErrors> {
        let pd = Self { kp, kd };
        pd.validate()?;
        Ok(pd)
    }

    pub fn validate(&self) -> Result<(), PdErrors> {
        if !self.kp.is_finite() || self.kp < 0.0 {
            return Err(PdErrors::InvalidGain("kp", self.kp));
        }
        if !self.kd.is_finite() || self.kd < 0.0 {
            return Err(PdErrors::InvalidGain("kd", self.kd));
        }
        Ok(())
    }

    pub fn compute_torque(&self, error: &Vector3<f64>, error_rate: &Vector3<f64>) -> Vector3<f64> {
        self.kp * error + self.kd * error_rate
    }
}

/// Rate damping on top of a [`PdController`]: drives the body rate to zero.
///
/// The error is `-ω` and its rate `-(ω - ω_prev) / dt`. The first call has no
/// previous rate and uses a zero error rate.
#[derive(Clone, Debug)]
pub struct RateDamping {
    pd: PdController,
    previous_rate: Option<Vector3<f64>>,
}

impl RateDamping {
    pub fn new(pd: PdController) -> Self {
        Self {
            pd,
            previous_rate: None,
        }
    }

    /// Body frame torque command in Nm.
    pub fn command(
        &mut self,
        angular_velocity: &Vector3<f64>,
        dt: f64,
    ) -> Result<Vector3<f64>, PdErrors> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(PdErrors::NonPositiveDt(dt));
        }
        let error = -angular_velocity;
        let error_rate = match self.previous_rate {
            Some(previous) => -(angular_velocity - previous) / dt,
            None => Vector3::zeros(),
        };
        self.previous_rate = Some(*angular_velocity);
        Ok(self.pd.compute_torque(&error, &error_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    const TOL: f64 = 1e-12;

    #[test]
    fn test_compute_torque() {
        let pd = PdController::new(2.0, 0.5).unwrap();
        let torque = pd.compute_torque(&Vector3::new(1.0, -1.0, 0.0), &Vector3::new(0.0, 2.0, 4.0));
        assert_abs_diff_eq!(torque[0], 2.0, epsilon = TOL);
        assert_abs_diff_eq!(torque[1], -1.0, epsilon = TOL);
        assert_abs_diff_eq!(torque[2], 2.0, epsilon = TOL);
    }

    #[test]
    fn test_rate_damping_opposes_rate() {
        let mut damping = RateDamping::new(PdController::new(0.1, 1.0).unwrap());
        let first = damping.command(&Vector3::new(0.2, 0.0, 0.0), 1.0).unwrap();
        assert_abs_diff_eq!(first[0], -0.02, epsilon = TOL);

        // rate increased by 0.1 over one second
        let second = damping.command(&Vector3::new(0.3, 0.0, 0.0), 1.0).unwrap();
        assert_abs_diff_eq!(second[0], -0.03 - 0.1, epsilon = TOL);
    }

    #[test]
    fn test_rejects_negative_gain() {
        assert_eq!(
            PdController::new(-1.0, 0.0),
            Err(PdErrors::InvalidGain("kp", -1.0))
        );
    }
}
