//! Charged Particle Simulation
//!
//! Loads an experiment file and prints every frame of the run.

mod datum;
mod experiment;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use particle_simulation::TextSink;

#[derive(Parser, Debug)]
#[command(version, about = "Simulate charged particles under electrostatic and gravitational forces")]
struct Args {
    /// Log pipeline lifecycle and flow control
    #[arg(short, long)]
    verbose: bool,

    /// Experiment file to run
    #[arg(short, long)]
    file: PathBuf,

    /// Write frames here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = experiment::load(&args.file)
        .with_context(|| format!("failed to load experiment {}", args.file.display()))?;

    let out: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };
    let mut sink = TextSink::new(BufWriter::new(out));

    let summary = particle_simulation::run(&config, &mut sink)
        .with_context(|| format!("simulation \"{}\" failed", config.title))?;
    log::debug!("{summary:?}");
    Ok(())
}
