//! Error types for the simulation pipeline

use std::io;

use particle_physics::IntegrateError;

use crate::params::ConfigError;
use crate::store::StoreError;

/// Fatal conditions that stop a simulation run
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SimulationError {
    /// The configuration failed validation; the pipeline never started
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The integrator could not produce a frame
    #[error("integration failed: {0}")]
    Integrate(#[from] IntegrateError),

    /// The frame store rejected a frame
    #[error("frame store: {0}")]
    Store(#[from] StoreError),

    /// The output sink failed while writing a frame
    #[error("could not write frame {sequence}")]
    Sink {
        sequence: u64,
        #[source]
        source: io::Error,
    },

    /// A pipeline thread could not be started
    #[error("could not start the {role} thread")]
    Spawn {
        role: &'static str,
        #[source]
        source: io::Error,
    },

    /// A pipeline thread panicked
    #[error("the {role} thread panicked")]
    RolePanicked { role: &'static str },

    /// The renderer's cursor points at a frame that is not stored
    #[error("frame {index} is missing from the store")]
    MissingFrame { index: u64 },
}
