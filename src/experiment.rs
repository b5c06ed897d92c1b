//! Experiment files
//!
//! An experiment is a list of `key: value;` entries with `#` line comments:
//!
//! ```text
//! title: Example Experiment;
//! delta: 1ms;
//! limit: 30 fr.;
//! system:
//! 0m, 0m, 0m/s, 0m/s, +1e, pm  # proton
//! 1m, 1m, 0m/s, 0m/s, -1e, em; # electron
//! ```
//!
//! Recoverable problems (unknown keys, bad units, short particle lines) are
//! logged and the load carries on. Only missing entries fail it.

use std::fs;
use std::path::{Path, PathBuf};

use glam::DVec2;
use particle_physics::{Particle, ATOMIC_MASS_UNIT, ELEMENTARY_CHARGE};
use particle_simulation::{ConfigError, SimulationConfig};

use crate::datum::parse_datum;

const TIME_UNITS: &[&str] = &["s"];
const FRAME_UNITS: &[&str] = &["fr."];
const LENGTH_UNITS: &[&str] = &["m"];
const VELOCITY_UNITS: &[&str] = &["m/s"];
const CHARGE_UNITS: &[&str] = &["C", "e"];
const MASS_UNITS: &[&str] = &["g", "u"];

/// Data per particle line: location, velocity, charge, mass
const PARTICLE_FIELDS: usize = 6;

#[derive(thiserror::Error, Debug)]
pub enum ExperimentError {
    #[error("could not read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a regular file")]
    NotAFile { path: PathBuf },

    #[error("experiment is missing: {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },

    #[error("experiment is not runnable")]
    Config(#[from] ConfigError),
}

/// Read and parse the experiment at `path`.
pub fn load(path: &Path) -> Result<SimulationConfig, ExperimentError> {
    let metadata = fs::metadata(path).map_err(|source| ExperimentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !metadata.is_file() {
        return Err(ExperimentError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    let source = fs::read_to_string(path).map_err(|source| ExperimentError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config = parse(&source)?;
    log::info!(
        "loaded \"{}\" from {}: {} particles",
        config.title,
        path.display(),
        config.particle_count()
    );
    Ok(config)
}

#[derive(Default)]
struct Entries {
    title: Option<String>,
    dt: Option<f64>,
    frame_limit: Option<u64>,
    particles: Vec<Particle>,
}

/// Parse experiment text into a runnable configuration.
pub fn parse(source: &str) -> Result<SimulationConfig, ExperimentError> {
    let mut entries = Entries::default();
    let mut scanner = Scanner::new(source);

    while let Some(key) = scanner.key() {
        let Some(value) = scanner.value() else {
            log::warn!("unexpected end of file while reading \"{key}\"");
            break;
        };
        match key.as_str() {
            "title" => entries.title = Some(value.trim().to_owned()),
            "delta" => {
                let dt = parse_datum(&value, TIME_UNITS).value;
                if dt > 0.0 {
                    entries.dt = Some(dt);
                } else {
                    log::warn!("time step must be positive, discarding {dt}");
                }
            }
            "limit" => {
                let limit = parse_datum(&value, FRAME_UNITS).value.ceil();
                if limit >= 1.0 {
                    // Saturating float-to-int cast.
                    entries.frame_limit = Some(limit as u64);
                } else {
                    log::warn!("frame limit must be positive, discarding {limit}");
                }
            }
            "system" => entries.particles = parse_system(&value),
            other => log::warn!("unknown key \"{other}\", skipping it"),
        }
    }

    let mut missing = Vec::new();
    if entries.particles.is_empty() {
        missing.push("system");
    }
    if entries.title.as_deref().is_none_or(str::is_empty) {
        missing.push("title");
    }
    if entries.dt.is_none() {
        missing.push("delta");
    }
    if entries.frame_limit.is_none() {
        missing.push("limit");
    }
    if !missing.is_empty() {
        for item in &missing {
            log::error!("experiment {item} not specified");
        }
        return Err(ExperimentError::Incomplete { missing });
    }

    Ok(SimulationConfig::new(
        entries.title.unwrap_or_default(),
        entries.dt.unwrap_or_default(),
        entries.frame_limit.unwrap_or_default(),
        entries.particles,
    )?)
}

fn parse_system(block: &str) -> Vec<Particle> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, line)| parse_particle(index, line))
        .collect()
}

fn parse_particle(index: usize, line: &str) -> Particle {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < PARTICLE_FIELDS {
        log::warn!(
            "particle {index}: data incomplete, {} of {PARTICLE_FIELDS} values given; the rest are zero",
            fields.len()
        );
    } else if fields.len() > PARTICLE_FIELDS {
        log::warn!("particle {index}: too much data, skipping the excess");
    }
    let field = |i: usize, units: &[&str]| fields.get(i).map(|text| parse_datum(text, units));

    let value = |i: usize, units: &[&str]| field(i, units).map_or(0.0, |datum| datum.value);
    let location = DVec2::new(value(0, LENGTH_UNITS), value(1, LENGTH_UNITS));
    let velocity = DVec2::new(value(2, VELOCITY_UNITS), value(3, VELOCITY_UNITS));

    let charge = match field(4, CHARGE_UNITS) {
        Some(datum) if datum.unit == 1 => datum.value * ELEMENTARY_CHARGE,
        Some(datum) => datum.value,
        None => 0.0,
    };
    let mass = match field(5, MASS_UNITS) {
        Some(datum) if datum.unit == 1 => datum.value * ATOMIC_MASS_UNIT,
        Some(datum) => datum.value * 1e-3,
        None => 0.0,
    };

    Particle::new(location, velocity, charge, mass)
}

/// Splits experiment text into keys and `;`-terminated values, dropping
/// comments along the way.
struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self { rest: source }
    }

    fn skip_comment(&mut self) {
        self.rest = match self.rest.find('\n') {
            Some(end) => &self.rest[end..],
            None => "",
        };
    }

    /// The next key, or `None` at the end of input.
    fn key(&mut self) -> Option<String> {
        let mut key = String::new();
        loop {
            let mut chars = self.rest.chars();
            let c = match chars.next() {
                Some(c) => c,
                None => {
                    if !key.trim().is_empty() {
                        log::warn!("unexpected end of file after \"{}\"", key.trim());
                    }
                    return None;
                }
            };
            match c {
                '#' => self.skip_comment(),
                ':' => {
                    self.rest = chars.as_str();
                    return Some(key.trim().to_owned());
                }
                _ => {
                    key.push(c);
                    self.rest = chars.as_str();
                }
            }
        }
    }

    /// Everything up to the next `;` outside a comment, or `None` if the
    /// input ends first.
    fn value(&mut self) -> Option<String> {
        let mut value = String::new();
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            match c {
                '#' => self.skip_comment(),
                ';' => {
                    self.rest = chars.as_str();
                    return Some(value);
                }
                _ => {
                    value.push(c);
                    self.rest = chars.as_str();
                }
            }
        }
    }
}
