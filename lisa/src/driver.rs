use aerospace::{AerodynamicDrag, AerospaceErrors, Environment, OrbitEnvironment};
use control::{BDotController, BDotErrors, PdErrors, RateDamping};
use dynamics::{RigidBodyErrors, RigidBodyState};
use hardware::{Actuator, ReactionWheel, Sensor, SunSensor};
use magnetics::magnetic_torque;
use nalgebra::Vector3;
use thiserror::Error;
use tracing::{info, trace};
use uncertainty::master_rng;

use crate::{
    config::{ConfigErrors, SimulationConfig},
    telemetry::{Telemetry, TelemetrySample},
};

/// Why a single tick failed.
#[derive(Debug, Error)]
pub enum TickErrors {
    #[error("AerospaceErrors: {0}")]
    Environment(#[from] AerospaceErrors),
    #[error("BDotErrors: {0}")]
    BDot(#[from] BDotErrors),
    #[error("PdErrors: {0}")]
    Pd(#[from] PdErrors),
    #[error("RigidBodyErrors: {0}")]
    RigidBody(#[from] RigidBodyErrors),
}

#[derive(Debug, Error)]
pub enum SimulationErrors {
    #[error("ConfigErrors: {0}")]
    Config(#[from] ConfigErrors),
    #[error("tick {tick}: {source}")]
    Tick { tick: usize, source: TickErrors },
}

/// One spacecraft, its hardware and its environment, advanced in fixed ticks.
///
/// Every tick runs in the same order: sample the environment, read the sensors,
/// update the controllers, apply the actuators, accumulate control and
/// disturbance torques, integrate the rigid body, advance the environment.
pub struct Simulation<E: Environment = OrbitEnvironment> {
    dt: f64,
    steps: usize,
    tick: usize,
    seed: u64,
    body: RigidBodyState,
    environment: E,
    bdot: BDotController,
    sun_sensors: Vec<SunSensor>,
    reaction_wheels: Vec<ReactionWheel>,
    rate_damping: Option<RateDamping>,
    drag: Option<AerodynamicDrag>,
    telemetry: Telemetry,
}

impl Simulation<OrbitEnvironment> {
    /// `seed` overrides the configured seed.
    pub fn new(config: &SimulationConfig, seed: Option<u64>) -> Result<Self, ConfigErrors> {
        let environment = OrbitEnvironment::new(config.orbit.build()?);
        Self::with_environment(config, seed, environment)
    }
}

impl<E: Environment> Simulation<E> {
    pub fn with_environment(
        config: &SimulationConfig,
        seed: Option<u64>,
        environment: E,
    ) -> Result<Self, ConfigErrors> {
        config.validate()?;

        let (mut rng, seed) = master_rng(seed.or(config.simulation.seed));
        let magnetometers = config
            .magnetometers
            .iter()
            .map(|builder| builder.build(&mut rng))
            .collect::<Result<Vec<_>, _>>()?;
        let sun_sensors = config
            .sun_sensors
            .iter()
            .map(|builder| builder.build(&mut rng))
            .collect::<Result<Vec<_>, _>>()?;
        let magnetorquers = config
            .magnetorquers
            .iter()
            .map(|builder| builder.build(&mut rng))
            .collect::<Result<Vec<_>, _>>()?;
        let reaction_wheels = config
            .reaction_wheels
            .iter()
            .map(|builder| builder.build(&mut rng))
            .collect::<Result<Vec<_>, _>>()?;

        let sun_sensor_names = sun_sensors
            .iter()
            .map(|sensor| sensor.port().name.clone())
            .collect();
        let steps = config.simulation.steps;

        Ok(Self {
            dt: config.simulation.dt,
            steps,
            tick: 0,
            seed,
            body: config.satellite.build()?,
            environment,
            bdot: BDotController::new(magnetometers, magnetorquers, config.bdot.gain)?,
            sun_sensors,
            reaction_wheels,
            rate_damping: config.rate_damping.map(RateDamping::new),
            drag: config.drag,
            telemetry: Telemetry::with_capacity(sun_sensor_names, steps),
        })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Master seed actually used, report it to reproduce the run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_finished(&self) -> bool {
        self.tick >= self.steps
    }

    pub fn body(&self) -> &RigidBodyState {
        &self.body
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Advances one tick. A failure names the tick and stops the run.
    pub fn step(&mut self) -> Result<(), SimulationErrors> {
        let tick = self.tick;
        self.advance()
            .map_err(|source| SimulationErrors::Tick { tick, source })?;
        self.tick += 1;
        Ok(())
    }

    /// Runs every remaining tick.
    pub fn run(&mut self) -> Result<&Telemetry, SimulationErrors> {
        info!(
            seed = self.seed,
            steps = self.steps,
            dt = self.dt,
            "starting simulation"
        );
        while !self.is_finished() {
            self.step()?;
        }
        info!(
            rate = self.body.angular_velocity().norm(),
            kinetic_energy = self.body.rotational_kinetic_energy(),
            "simulation complete"
        );
        Ok(&self.telemetry)
    }

    fn advance(&mut self) -> Result<(), TickErrors> {
        let dt = self.dt;
        let environment = self.environment.sample()?;
        let magnetic_field = self.body.inertial_to_body(&environment.magnetic_field);
        let sun_direction = self.body.inertial_to_body(&environment.sun_direction);

        let sun_readings: Vec<Vector3<f64>> = self
            .sun_sensors
            .iter_mut()
            .map(|sensor| sensor.read(&sun_direction))
            .collect();

        let bdot = self.bdot.update(&magnetic_field, dt)?;
        let applied_moment: Vector3<f64> = bdot.applied_moments.iter().sum();
        let magnetic = magnetic_torque(&applied_moment, &magnetic_field);

        let wheel_command = match &mut self.rate_damping {
            Some(damping) => damping.command(self.body.angular_velocity(), dt)?,
            None => Vector3::zeros(),
        };
        let wheel_torque: Vector3<f64> = self
            .reaction_wheels
            .iter_mut()
            .map(|wheel| {
                let command = wheel_command.dot(&wheel.spin_axis());
                wheel.apply(command)
            })
            .sum();
        let control_torque = magnetic + wheel_torque;

        let disturbance_torque = match &self.drag {
            Some(drag) => {
                // relative to the air, km/s to m/s
                let velocity = self.body.inertial_to_body(&(environment.velocity * 1e3));
                drag.torque(&velocity, environment.air_density)
            }
            None => Vector3::zeros(),
        };

        self.telemetry.record(TelemetrySample {
            tick: self.tick,
            time: environment.time,
            attitude: *self.body.attitude().quaternion(),
            angular_velocity: *self.body.angular_velocity(),
            magnetic_field,
            measured_field: bdot.field,
            b_dot: bdot.b_dot,
            commanded_moment: bdot.commanded_moment,
            applied_moment,
            control_torque,
            disturbance_torque,
            sun_readings,
            kinetic_energy: self.body.rotational_kinetic_energy(),
        });

        self.body.apply_torque(&magnetic);
        self.body.apply_torque(&wheel_torque);
        self.body.apply_torque(&disturbance_torque);
        self.body.step(dt)?;
        self.environment.advance(dt)?;

        trace!(
            tick = self.tick,
            rate = self.body.angular_velocity().norm(),
            "tick complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerospace::EnvironmentSample;
    use approx::assert_abs_diff_eq;
    const TOL: f64 = 1e-12;

    /// Fixed inertial field, velocity and sun.
    struct ConstantEnvironment {
        time: f64,
        field: Vector3<f64>,
        velocity: Vector3<f64>,
        air_density: f64,
    }

    impl ConstantEnvironment {
        fn new() -> Self {
            Self {
                time: 0.0,
                field: Vector3::new(30.0, 0.0, 0.0),
                velocity: Vector3::new(0.0, 7.6, 0.0),
                air_density: 0.0,
            }
        }
    }

    impl Environment for ConstantEnvironment {
        fn advance(&mut self, dt: f64) -> Result<(), AerospaceErrors> {
            self.time += dt;
            Ok(())
        }

        fn sample(&self) -> Result<EnvironmentSample, AerospaceErrors> {
            Ok(EnvironmentSample {
                time: self.time,
                position: Vector3::new(6878.0, 0.0, 0.0),
                velocity: self.velocity,
                magnetic_field: self.field,
                air_density: self.air_density,
                sun_direction: Vector3::x(),
            })
        }
    }

    const CONFIG: &str = r#"
(
    satellite: (
        mass: 4.0,
        inertia: ((0.02, 0.0, 0.0), (0.0, 0.02, 0.0), (0.0, 0.0, 0.02)),
        angular_velocity: (0.0, 0.0, 0.1),
    ),
    orbit: (altitude: 500.0),
    magnetometers: [(port: (name: "mag"))],
    sun_sensors: [(port: (name: "sun"))],
    magnetorquers: [(port: (name: "mtq"), max_magnetic_moment: 0.05)],
    reaction_wheels: [(port: (name: "rw_x"), max_torque: 0.001)],
    bdot: (gain: 0.01),
    simulation: (dt: 1.0, steps: 5, seed: Some(3)),
)
"#;

    fn simulation() -> Simulation<ConstantEnvironment> {
        let config = SimulationConfig::from_ron_str(CONFIG).unwrap();
        Simulation::with_environment(&config, None, ConstantEnvironment::new()).unwrap()
    }

    #[test]
    fn test_first_tick_has_no_control() {
        let mut sim = simulation();
        sim.step().unwrap();
        let sample = &sim.telemetry().samples()[0];
        assert_eq!(sample.b_dot, Vector3::zeros());
        assert_eq!(sample.control_torque, Vector3::zeros());
        // no torque, spin about a principal axis is unchanged
        assert_abs_diff_eq!(sim.body().angular_velocity()[2], 0.1, epsilon = TOL);
        assert_eq!(sim.tick(), 1);
    }

    #[test]
    fn test_run_records_every_tick() {
        let mut sim = simulation();
        let telemetry = sim.run().unwrap();
        assert_eq!(telemetry.len(), 5);
        assert_eq!(telemetry.samples()[4].tick, 4);
        assert_abs_diff_eq!(telemetry.samples()[4].time, 4.0, epsilon = TOL);
        assert!(sim.is_finished());
        assert_eq!(sim.seed(), 3);
    }

    #[test]
    fn test_bdot_opposes_spin() {
        let mut sim = simulation();
        let initial = sim.body().rotational_kinetic_energy();
        sim.run().unwrap();
        let last = sim.telemetry().last().unwrap();
        // field rotating in the body frame produces a moment and a torque
        assert!(last.b_dot.norm() > 0.0);
        assert!(last.control_torque.norm() > 0.0);
        assert!(sim.body().rotational_kinetic_energy() < initial);
    }

    #[test]
    fn test_sun_reading_in_body_frame() {
        let mut sim = simulation();
        sim.step().unwrap();
        let reading = sim.telemetry().samples()[0].sun_readings[0];
        assert_abs_diff_eq!(reading[0], 1.0, epsilon = TOL);
        assert_abs_diff_eq!(reading[1], 0.0, epsilon = TOL);
    }

    #[test]
    fn test_failure_names_tick() {
        let config = SimulationConfig::from_ron_str(CONFIG).unwrap();
        let mut sim =
            Simulation::with_environment(&config, None, ConstantEnvironment::new()).unwrap();
        sim.step().unwrap();
        sim.dt = -1.0;
        match sim.step() {
            Err(SimulationErrors::Tick { tick, source }) => {
                assert_eq!(tick, 1);
                assert!(matches!(source, TickErrors::BDot(BDotErrors::NonPositiveDt(_))));
            }
            other => panic!("expected a tick failure, got {other:?}"),
        }
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let quiet = r#"(port: (name: "mag"))"#;
        let noisy = r#"(port: (name: "mag"), errors: (noise: Gaussian(mean: 0.0, std: 0.5)))"#;
        let config = SimulationConfig::from_ron_str(&CONFIG.replace(quiet, noisy)).unwrap();
        let run = |seed| {
            let environment = ConstantEnvironment::new();
            let mut sim = Simulation::with_environment(&config, Some(seed), environment).unwrap();
            sim.run().unwrap();
            *sim.body().angular_velocity()
        };
        assert_eq!(run(11), run(11));
        assert_ne!(run(11), run(12));
    }

    #[test]
    fn test_wheels_damp_rate() {
        let wheels = r#"reaction_wheels: [
        (port: (name: "rw_x"), max_torque: 0.001),
        (
            port: (name: "rw_y", orientation: (0.7071067811865476, 0.0, 0.0, 0.7071067811865476)),
            max_torque: 0.001,
        ),
        (
            port: (name: "rw_z", orientation: (0.7071067811865476, 0.0, -0.7071067811865476, 0.0)),
            max_torque: 0.001,
        ),
    ],
    rate_damping: Some((kp: 0.01, kd: 0.0)),"#;
        let text = CONFIG
            .replace(r#"reaction_wheels: [(port: (name: "rw_x"), max_torque: 0.001)],"#, wheels)
            .replace("(0.0, 0.0, 0.1)", "(0.02, -0.03, 0.05)")
            .replace("steps: 5", "steps: 20");
        let config = SimulationConfig::from_ron_str(&text).unwrap();
        let mut sim =
            Simulation::with_environment(&config, None, ConstantEnvironment::new()).unwrap();
        let initial = *sim.body().angular_velocity();

        sim.step().unwrap();
        // no field rate yet, the wheels carry the whole command
        let torque = sim.telemetry().samples()[0].control_torque;
        assert!(torque.norm() > 0.0);
        assert!(torque.dot(&initial) < 0.0);
        assert_abs_diff_eq!(torque[0], -0.01 * 0.02, epsilon = TOL);
        assert_abs_diff_eq!(torque[1], 0.01 * 0.03, epsilon = TOL);
        assert_abs_diff_eq!(torque[2], -0.01 * 0.05, epsilon = TOL);

        sim.run().unwrap();
        assert!(sim.body().angular_velocity().norm() < 0.01 * initial.norm());
    }

    #[test]
    fn test_drag_uses_body_frame_velocity() {
        let yawed = r#"attitude: (0.7071067811865476, 0.0, 0.0, 0.7071067811865476),
        angular_velocity: (0.0, 0.0, 0.1),"#;
        let drag = r#"bdot: (gain: 0.01),
    drag: Some((drag_coefficient: 2.2, area: 0.03, cp_offset: 0.02)),"#;
        let text = CONFIG
            .replace("angular_velocity: (0.0, 0.0, 0.1),", yawed)
            .replace("bdot: (gain: 0.01),", drag);
        let config = SimulationConfig::from_ron_str(&text).unwrap();
        let mut environment = ConstantEnvironment::new();
        environment.air_density = 1e-11;
        let mut sim = Simulation::with_environment(&config, None, environment).unwrap();

        let drag = config.drag.unwrap();
        let velocity = sim.body().inertial_to_body(&(Vector3::new(0.0, 7.6, 0.0) * 1e3));
        let expected = drag.torque(&velocity, 1e-11);
        sim.step().unwrap();

        let torque = sim.telemetry().samples()[0].disturbance_torque;
        // inertial +y is body +x after the 90 degree yaw
        assert_abs_diff_eq!(velocity[0], 7600.0, epsilon = 1e-9);
        assert_abs_diff_eq!(torque, expected, epsilon = TOL);
        assert_abs_diff_eq!(torque[1], -3.81216e-7, epsilon = TOL);
        assert_abs_diff_eq!(torque[0], 0.0, epsilon = TOL);
        assert_abs_diff_eq!(torque[2], 0.0, epsilon = TOL);
    }
}
