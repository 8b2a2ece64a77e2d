use mass_properties::MassProperties;
use nalgebra::Vector3;
use rotations::{
    RotationTrait,
    prelude::{Quaternion, QuaternionErrors, UnitQuaternion},
};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RigidBodyErrors {
    #[error("initial attitude: {0}")]
    InitialAttitude(QuaternionErrors),
    #[error("initial angular velocity must be finite")]
    InitialRateNonFinite,
    #[error("dt must be finite and greater than 0, got {0}")]
    NonPositiveDt(f64),
    #[error("angular velocity became non-finite")]
    RateNonFinite,
    #[error("attitude collapsed during integration: {0}")]
    AttitudeCollapse(QuaternionErrors),
}

/// Attitude and rate of a rigid spacecraft plus the torque accumulated during the
/// current tick.
///
/// The attitude is a scalar first unit quaternion rotating body axes onto inertial
/// axes, so `rotate` takes a body vector to the inertial frame. Angular velocity is
/// expressed in the body frame in rad/s, torque in the body frame in Nm.
#[derive(Debug, Clone)]
pub struct RigidBodyState {
    mass_properties: MassProperties,
    attitude: UnitQuaternion,
    angular_velocity: Vector3<f64>,
    torque: Vector3<f64>,
}

impl RigidBodyState {
    /// How far from unit norm an initial attitude may be before it is rejected.
    pub const ATTITUDE_TOL: f64 = 1e-6;

    pub fn new(
        mass_properties: MassProperties,
        attitude: Quaternion,
        angular_velocity: Vector3<f64>,
    ) -> Result<Self, RigidBodyErrors> {
        let attitude = UnitQuaternion::from_near_unit(attitude, Self::ATTITUDE_TOL)
            .map_err(RigidBodyErrors::InitialAttitude)?;
        if angular_velocity.iter().any(|w| !w.is_finite()) {
            return Err(RigidBodyErrors::InitialRateNonFinite);
        }
        Ok(Self {
            mass_properties,
            attitude,
            angular_velocity,
            torque: Vector3::zeros(),
        })
    }

    /// Adds a body frame torque contribution to the current tick.
    pub fn apply_torque(&mut self, torque: &Vector3<f64>) {
        self.torque += torque;
    }

    /// Advances the state by `dt` seconds and clears the torque accumulator.
    ///
    /// Semi-implicit Euler: the rate is updated first from the accumulated torque,
    /// then the attitude is propagated with the updated rate using
    /// `q̇ = ½ q ⊗ [0, ω]` and renormalized.
    pub fn step(&mut self, dt: f64) -> Result<(), RigidBodyErrors> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(RigidBodyErrors::NonPositiveDt(dt));
        }

        let alpha = self
            .mass_properties
            .inertia
            .angular_acceleration(&self.torque);
        let omega = self.angular_velocity + alpha * dt;
        if omega.iter().any(|w| !w.is_finite()) {
            return Err(RigidBodyErrors::RateNonFinite);
        }

        let q = self.attitude.0;
        let q_dot = (q * Quaternion::pure(&omega)) * 0.5;
        let q_next = (q + q_dot * dt)
            .normalize()
            .map_err(RigidBodyErrors::AttitudeCollapse)?;

        trace!(
            dt,
            torque = ?self.torque.as_slice(),
            omega = ?omega.as_slice(),
            "rigid body step"
        );

        self.angular_velocity = omega;
        self.attitude = UnitQuaternion(q_next);
        self.torque = Vector3::zeros();
        Ok(())
    }

    pub fn attitude(&self) -> &UnitQuaternion {
        &self.attitude
    }

    pub fn angular_velocity(&self) -> &Vector3<f64> {
        &self.angular_velocity
    }

    /// Torque accumulated so far in the current tick.
    pub fn accumulated_torque(&self) -> &Vector3<f64> {
        &self.torque
    }

    pub fn mass_properties(&self) -> &MassProperties {
        &self.mass_properties
    }

    /// Expresses an inertial frame vector in body axes.
    pub fn inertial_to_body(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.attitude.transform(v)
    }

    /// Expresses a body frame vector in inertial axes.
    pub fn body_to_inertial(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.attitude.rotate(v)
    }

    /// Body frame angular momentum `I ω`.
    pub fn angular_momentum(&self) -> Vector3<f64> {
        self.mass_properties.inertia.matrix() * self.angular_velocity
    }

    /// `½ ωᵀ I ω`
    pub fn rotational_kinetic_energy(&self) -> f64 {
        0.5 * self.angular_velocity.dot(&self.angular_momentum())
    }
}
