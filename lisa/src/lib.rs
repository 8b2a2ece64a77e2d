//! Single spacecraft attitude simulation: configuration, the per tick driver and
//! telemetry export.

pub mod config;
pub mod driver;
pub mod telemetry;

pub use config::{ConfigErrors, SimulationConfig};
pub use driver::{Simulation, SimulationErrors, TickErrors};
pub use telemetry::{Telemetry, TelemetryErrors, TelemetrySample};
