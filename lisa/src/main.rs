use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use lisa::{Simulation, SimulationConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Spacecraft attitude and detumbling simulation", long_about = None)]
struct Cli {
    /// Simulation configuration (.ron)
    #[arg(short, long)]
    config: PathBuf,
    /// Directory for telemetry.csv
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Master seed, overrides the configured one
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init();

    let cli = Cli::parse();
    let config = SimulationConfig::load(&cli.config)?;
    let mut sim = Simulation::new(&config, cli.seed)?;

    let initial_rate = sim.body().angular_velocity().norm();
    let initial_energy = sim.body().rotational_kinetic_energy();
    info!(
        config = %cli.config.display(),
        seed = sim.seed(),
        steps = sim.steps(),
        dt = sim.dt(),
        rate = initial_rate,
        kinetic_energy = initial_energy,
        "starting simulation"
    );

    let progress = ProgressBar::new(sim.steps() as u64);
    progress.set_style(ProgressStyle::with_template(
        "{bar:50} {pos:>7}/{len:7} remaining: {eta}",
    )?);
    while !sim.is_finished() {
        sim.step()?;
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!(
        rate = sim.body().angular_velocity().norm(),
        kinetic_energy = sim.body().rotational_kinetic_energy(),
        "simulation complete"
    );

    if let Some(output) = &cli.output {
        let path = output.join("telemetry.csv");
        sim.telemetry().write_csv(&path)?;
        info!(path = %path.display(), samples = sim.telemetry().len(), "telemetry written");
    }
    Ok(())
}
