use aerospace::{AerodynamicDrag, AerospaceErrors, CircularOrbitBuilder};
use control::{BDotErrors, PdController, PdErrors};
use dynamics::{RigidBodyErrors, RigidBodyState};
use hardware::{
    HardwareErrors,
    actuator::{magnetorquer::MagnetorquerBuilder, reaction_wheel::ReactionWheelBuilder},
    port::check_unique_names,
    sensor::{magnetometer::MagnetometerBuilder, sun_sensor::SunSensorBuilder},
};
use mass_properties::{MassPropertiesBuilder, MassPropertiesErrors};
use nalgebra::Vector3;
use rand::{SeedableRng, rngs::SmallRng};
use ron::ser::{PrettyConfig, to_string_pretty};
use rotations::prelude::Quaternion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigErrors {
    #[error("could not read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid RON: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("could not serialize configuration: {0}")]
    Serialize(#[from] ron::Error),
    #[error("simulation dt must be finite and greater than 0, got {0}")]
    NonPositiveDt(f64),
    #[error("simulation needs at least one step")]
    ZeroSteps,
    #[error("AerospaceErrors: {0}")]
    Aerospace(#[from] AerospaceErrors),
    #[error("BDotErrors: {0}")]
    BDot(#[from] BDotErrors),
    #[error("HardwareErrors: {0}")]
    Hardware(#[from] HardwareErrors),
    #[error("MassPropertiesErrors: {0}")]
    MassProperties(#[from] MassPropertiesErrors),
    #[error("PdErrors: {0}")]
    Pd(#[from] PdErrors),
    #[error("RigidBodyErrors: {0}")]
    RigidBody(#[from] RigidBodyErrors),
}

fn identity() -> [f64; 4] {
    Quaternion::IDENTITY.into()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SatelliteConfig {
    /// kg
    pub mass: f64,
    /// kg·m², row major
    pub inertia: [[f64; 3]; 3],
    /// body to inertial, scalar first `[q0, q1, q2, q3]`
    #[serde(default = "identity")]
    pub attitude: [f64; 4],
    /// body frame, rad/s
    #[serde(default)]
    pub angular_velocity: [f64; 3],
}

impl SatelliteConfig {
    pub fn build(&self) -> Result<RigidBodyState, ConfigErrors> {
        let mass_properties = MassPropertiesBuilder {
            mass: self.mass,
            inertia: self.inertia,
        }
        .build()?;
        Ok(RigidBodyState::new(
            mass_properties,
            self.attitude.into(),
            Vector3::from(self.angular_velocity),
        )?)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BDotConfig {
    pub gain: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SimulationOptions {
    /// s
    pub dt: f64,
    pub steps: usize,
    /// master seed, drawn at random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// A complete run, as loaded from a `.ron` file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub satellite: SatelliteConfig,
    pub orbit: CircularOrbitBuilder,
    #[serde(default)]
    pub magnetometers: Vec<MagnetometerBuilder>,
    #[serde(default)]
    pub sun_sensors: Vec<SunSensorBuilder>,
    #[serde(default)]
    pub magnetorquers: Vec<MagnetorquerBuilder>,
    #[serde(default)]
    pub reaction_wheels: Vec<ReactionWheelBuilder>,
    pub bdot: BDotConfig,
    #[serde(default)]
    pub rate_damping: Option<PdController>,
    #[serde(default)]
    pub drag: Option<AerodynamicDrag>,
    pub simulation: SimulationOptions,
}

impl SimulationConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigErrors> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigErrors::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigErrors> {
        Ok(ron::from_str(contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigErrors> {
        let ron_string = to_string_pretty(self, PrettyConfig::new())?;
        std::fs::write(path, ron_string).map_err(|source| ConfigErrors::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Every construction check, run before the first tick.
    pub fn validate(&self) -> Result<(), ConfigErrors> {
        let dt = self.simulation.dt;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ConfigErrors::NonPositiveDt(dt));
        }
        if self.simulation.steps == 0 {
            return Err(ConfigErrors::ZeroSteps);
        }
        self.satellite.build()?;
        self.orbit.build()?;
        if self.magnetometers.is_empty() {
            return Err(BDotErrors::NoMagnetometers.into());
        }
        if self.magnetorquers.is_empty() {
            return Err(BDotErrors::NoMagnetorquers.into());
        }
        if !self.bdot.gain.is_finite() || self.bdot.gain <= 0.0 {
            return Err(BDotErrors::NonPositiveGain(self.bdot.gain).into());
        }
        if let Some(pd) = &self.rate_damping {
            pd.validate()?;
        }
        if let Some(drag) = &self.drag {
            drag.validate()?;
        }
        check_unique_names(self.port_names())?;

        // builds are cheap, the seed does not matter here
        let mut rng = SmallRng::seed_from_u64(0);
        for magnetometer in &self.magnetometers {
            magnetometer.build(&mut rng)?;
        }
        for sun_sensor in &self.sun_sensors {
            sun_sensor.build(&mut rng)?;
        }
        for magnetorquer in &self.magnetorquers {
            magnetorquer.build(&mut rng)?;
        }
        for wheel in &self.reaction_wheels {
            wheel.build(&mut rng)?;
        }
        Ok(())
    }

    fn port_names(&self) -> impl Iterator<Item = &str> {
        self.magnetometers
            .iter()
            .map(|m| m.port.name.as_str())
            .chain(self.sun_sensors.iter().map(|s| s.port.name.as_str()))
            .chain(self.magnetorquers.iter().map(|m| m.port.name.as_str()))
            .chain(self.reaction_wheels.iter().map(|w| w.port.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
(
    satellite: (
        mass: 4.0,
        inertia: ((0.02, 0.0, 0.0), (0.0, 0.02, 0.0), (0.0, 0.0, 0.01)),
        attitude: (1.0, 0.0, 0.0, 0.0),
        angular_velocity: (0.1, -0.05, 0.08),
    ),
    orbit: (altitude: 500.0, inclination: 97.4),
    magnetometers: [
        (port: (name: "mag"), errors: (noise: Gaussian(mean: 0.0, std: 0.05))),
    ],
    sun_sensors: [
        (port: (name: "sun_px", orientation: (0.7071067811865476, 0.0, 0.0, 0.7071067811865476))),
    ],
    magnetorquers: [
        (port: (name: "mtq"), max_magnetic_moment: 0.05),
    ],
    bdot: (gain: 0.01),
    drag: Some((drag_coefficient: 2.2, area: 0.03, cp_offset: 0.02)),
    simulation: (dt: 1.0, steps: 10, seed: Some(7)),
)
"#;

    #[test]
    fn test_parse_config() {
        let config = SimulationConfig::from_ron_str(CONFIG).unwrap();
        assert_eq!(config.magnetometers.len(), 1);
        assert_eq!(config.sun_sensors[0].port.name, "sun_px");
        assert_eq!(config.magnetorquers[0].max_magnetic_moment, 0.05);
        assert!(config.reaction_wheels.is_empty());
        assert!(config.rate_damping.is_none());
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.orbit.raan, 0.0);
        config.validate().unwrap();
    }

    #[test]
    fn test_ron_round_trip() {
        let config = SimulationConfig::from_ron_str(CONFIG).unwrap();
        let text = to_string_pretty(&config, PrettyConfig::new()).unwrap();
        let again = SimulationConfig::from_ron_str(&text).unwrap();
        assert_eq!(again.satellite.inertia, config.satellite.inertia);
        assert_eq!(again.magnetometers, config.magnetometers);
    }

    #[test]
    fn test_validation_failures() {
        let base = SimulationConfig::from_ron_str(CONFIG).unwrap();

        let mut config = base.clone();
        config.simulation.dt = 0.0;
        assert!(matches!(config.validate(), Err(ConfigErrors::NonPositiveDt(_))));

        let mut config = base.clone();
        config.magnetorquers.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigErrors::BDot(BDotErrors::NoMagnetorquers))
        ));

        let mut config = base.clone();
        config.satellite.inertia[0][1] = 0.5;
        assert!(matches!(config.validate(), Err(ConfigErrors::MassProperties(_))));

        let mut config = base.clone();
        config.satellite.attitude = [0.9, 0.0, 0.0, 0.0];
        assert!(matches!(config.validate(), Err(ConfigErrors::RigidBody(_))));

        let mut config = base.clone();
        config.sun_sensors[0].port.name = "mag".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigErrors::Hardware(HardwareErrors::DuplicateName(_)))
        ));

        let mut config = base;
        config.magnetometers[0].errors.noise = uncertainty::NoiseBuilder::new_normal(0.0, -0.1);
        assert!(matches!(
            config.validate(),
            Err(ConfigErrors::Hardware(HardwareErrors::Noise { .. }))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let config = SimulationConfig::from_ron_str(CONFIG).unwrap();
        let dir = std::env::temp_dir().join(format!("lisa_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("saved.ron");

        config.save(&path).unwrap();
        let loaded = SimulationConfig::load(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        loaded.validate().unwrap();
        assert_eq!(loaded.satellite.inertia, config.satellite.inertia);
        assert_eq!(loaded.satellite.angular_velocity, config.satellite.angular_velocity);
        assert_eq!(loaded.magnetometers, config.magnetometers);
        assert_eq!(loaded.sun_sensors[0].port.name, "sun_px");
        assert_eq!(loaded.drag, config.drag);
        assert_eq!(loaded.simulation.seed, Some(7));
    }

    #[test]
    fn test_save_to_missing_directory() {
        let config = SimulationConfig::from_ron_str(CONFIG).unwrap();
        let result = config.save(Path::new("/nonexistent/lisa.ron"));
        assert!(matches!(result, Err(ConfigErrors::Write { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = SimulationConfig::load(Path::new("/nonexistent/lisa.ron"));
        assert!(matches!(result, Err(ConfigErrors::Read { .. })));
    }
}
