use csv::Writer;
use nalgebra::Vector3;
use rotations::prelude::Quaternion;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryErrors {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// State and commands at the start of one tick. Vectors are body frame unless
/// named otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct TelemetrySample {
    pub tick: usize,
    /// s
    pub time: f64,
    pub attitude: Quaternion,
    /// rad/s
    pub angular_velocity: Vector3<f64>,
    /// true field, μT
    pub magnetic_field: Vector3<f64>,
    /// averaged measured field, μT
    pub measured_field: Vector3<f64>,
    /// μT/s
    pub b_dot: Vector3<f64>,
    /// A·m²
    pub commanded_moment: Vector3<f64>,
    /// sum of all magnetorquer outputs, A·m²
    pub applied_moment: Vector3<f64>,
    /// magnetic plus reaction wheel torque, Nm
    pub control_torque: Vector3<f64>,
    /// Nm
    pub disturbance_torque: Vector3<f64>,
    /// one reading per sun sensor in configuration order
    pub sun_readings: Vec<Vector3<f64>>,
    /// J
    pub kinetic_energy: f64,
}

/// In memory record of a run.
#[derive(Clone, Debug, Default)]
pub struct Telemetry {
    sun_sensor_names: Vec<String>,
    samples: Vec<TelemetrySample>,
}

fn vector_headers(headers: &mut Vec<String>, name: &str) {
    for axis in ["x", "y", "z"] {
        headers.push(format!("{name}_{axis}"));
    }
}

fn push_vector(record: &mut Vec<String>, v: &Vector3<f64>) {
    record.extend(v.iter().map(|x| x.to_string()));
}

impl Telemetry {
    pub fn new(sun_sensor_names: Vec<String>) -> Self {
        Self {
            sun_sensor_names,
            samples: Vec::new(),
        }
    }

    pub fn with_capacity(sun_sensor_names: Vec<String>, capacity: usize) -> Self {
        Self {
            sun_sensor_names,
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, sample: TelemetrySample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[TelemetrySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&TelemetrySample> {
        self.samples.last()
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["tick".to_string(), "time".to_string()];
        for q in ["q0", "q1", "q2", "q3"] {
            headers.push(q.to_string());
        }
        for name in [
            "w",
            "b",
            "b_meas",
            "b_dot",
            "m_cmd",
            "m_applied",
            "tau_control",
            "tau_disturbance",
        ] {
            vector_headers(&mut headers, name);
        }
        for name in &self.sun_sensor_names {
            vector_headers(&mut headers, &format!("sun_{name}"));
        }
        headers.push("kinetic_energy".to_string());
        headers
    }

    fn row(sample: &TelemetrySample) -> Vec<String> {
        let mut record = vec![sample.tick.to_string(), sample.time.to_string()];
        let q: [f64; 4] = sample.attitude.into();
        record.extend(q.iter().map(|x| x.to_string()));
        for v in [
            &sample.angular_velocity,
            &sample.magnetic_field,
            &sample.measured_field,
            &sample.b_dot,
            &sample.commanded_moment,
            &sample.applied_moment,
            &sample.control_torque,
            &sample.disturbance_torque,
        ] {
            push_vector(&mut record, v);
        }
        for reading in &sample.sun_readings {
            push_vector(&mut record, reading);
        }
        record.push(sample.kinetic_energy.to_string());
        record
    }

    /// Writes one header row and one row per sample.
    pub fn write_csv(&self, path: &Path) -> Result<(), TelemetryErrors> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = Writer::from_path(path)?;
        writer.write_record(self.headers())?;
        for sample in &self.samples {
            writer.write_record(Self::row(sample))?;
        }
        writer.flush()?;
        Ok(())
    }
}
