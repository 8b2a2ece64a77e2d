use hardware::{Actuator, Magnetometer, Magnetorquer, Sensor};
use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BDotErrors {
    #[error("b-dot controller needs at least one magnetometer")]
    NoMagnetometers,
    #[error("b-dot controller needs at least one magnetorquer")]
    NoMagnetorquers,
    #[error("b-dot gain must be greater than 0, got {0}")]
    NonPositiveGain(f64),
    #[error("b-dot dt must be greater than 0, got {0}")]
    NonPositiveDt(f64),
    #[error("cannot average an empty set of magnetometer readings")]
    NoReadings,
}

/// Field history of the controller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum BDotState {
    /// No field sample yet, the next derivative is zero.
    #[default]
    Uninitialized,
    Running { previous_field: Vector3<f64> },
}

/// Everything one control cycle produced.
#[derive(Clone, Debug, PartialEq)]
pub struct BDotOutput {
    /// averaged measured field, μT
    pub field: Vector3<f64>,
    /// μT/s
    pub b_dot: Vector3<f64>,
    /// A·m²
    pub commanded_moment: Vector3<f64>,
    /// actual moment of each magnetorquer in registration order, A·m²
    pub applied_moments: Vec<Vector3<f64>>,
}

/// Arithmetic mean of a set of field readings.
pub fn average_field(readings: &[Vector3<f64>]) -> Result<Vector3<f64>, BDotErrors> {
    if readings.is_empty() {
        return Err(BDotErrors::NoReadings);
    }
    let sum: Vector3<f64> = readings.iter().sum();
    Ok(sum / readings.len() as f64)
}

/// Detumbling controller commanding `m = -gain * ḃ` to every magnetorquer.
#[derive(Debug)]
pub struct BDotController<S = Magnetometer, A = Magnetorquer>
where
    S: Sensor,
    A: Actuator<Command = Vector3<f64>, Output = Vector3<f64>>,
{
    magnetometers: Vec<S>,
    magnetorquers: Vec<A>,
    gain: f64,
    state: BDotState,
}

impl<S, A> BDotController<S, A>
where
    S: Sensor,
    A: Actuator<Command = Vector3<f64>, Output = Vector3<f64>>,
{
    pub fn new(
        magnetometers: Vec<S>,
        magnetorquers: Vec<A>,
        gain: f64,
    ) -> Result<Self, BDotErrors> {
        if magnetometers.is_empty() {
            return Err(BDotErrors::NoMagnetometers);
        }
        if magnetorquers.is_empty() {
            return Err(BDotErrors::NoMagnetorquers);
        }
        if !gain.is_finite() || gain <= 0.0 {
            return Err(BDotErrors::NonPositiveGain(gain));
        }
        Ok(Self {
            magnetometers,
            magnetorquers,
            gain,
            state: BDotState::Uninitialized,
        })
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn state(&self) -> BDotState {
        self.state
    }

    /// Drops the field history, the next derivative will be zero again.
    pub fn reset(&mut self) {
        self.state = BDotState::Uninitialized;
    }

    /// Reads every magnetometer against the true body field (μT) and averages the
    /// measurements.
    pub fn read_magnetic_field(
        &mut self,
        magnetic_field_body: &Vector3<f64>,
    ) -> Result<Vector3<f64>, BDotErrors> {
        let readings: Vec<Vector3<f64>> = self
            .magnetometers
            .iter_mut()
            .map(|magnetometer| magnetometer.read(magnetic_field_body))
            .collect();
        average_field(&readings)
    }

    /// Finite difference of the field. The first sample only seeds the history
    /// and returns zero.
    pub fn compute_b_dot(
        &mut self,
        field: &Vector3<f64>,
        dt: f64,
    ) -> Result<Vector3<f64>, BDotErrors> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(BDotErrors::NonPositiveDt(dt));
        }
        let b_dot = match self.state {
            BDotState::Uninitialized => Vector3::zeros(),
            BDotState::Running { previous_field } => (field - previous_field) / dt,
        };
        self.state = BDotState::Running {
            previous_field: *field,
        };
        Ok(b_dot)
    }

    pub fn commanded_moment(&self, b_dot: &Vector3<f64>) -> Vector3<f64> {
        -self.gain * b_dot
    }

    /// Sends the same commanded moment to every magnetorquer and returns what each
    /// one actually produced, in registration order.
    pub fn apply_control(&mut self, b_dot: &Vector3<f64>) -> Vec<Vector3<f64>> {
        let command = self.commanded_moment(b_dot);
        self.magnetorquers
            .iter_mut()
            .map(|magnetorquer| magnetorquer.apply(command))
            .collect()
    }

    /// One full control cycle: read, differentiate, command.
    pub fn update(
        &mut self,
        magnetic_field_body: &Vector3<f64>,
        dt: f64,
    ) -> Result<BDotOutput, BDotErrors> {
        let field = self.read_magnetic_field(magnetic_field_body)?;
        let b_dot = self.compute_b_dot(&field, dt)?;
        let commanded_moment = self.commanded_moment(&b_dot);
        let applied_moments = self.apply_control(&b_dot);
        tracing::trace!(?field, ?b_dot, ?commanded_moment, "b-dot update");
        Ok(BDotOutput {
            field,
            b_dot,
            commanded_moment,
            applied_moments,
        })
    }
}
