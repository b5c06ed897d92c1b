//! Pipeline orchestration
//!
//! A run starts the compiler and renderer on their own threads and runs the
//! discarder on the calling thread:
//!
//! ```text
//!  compiler ──publish──► FrameStore ──emit──► renderer ──► FrameSink
//!     ▲                      │                   │
//!     └── FlowControl ◄──────┼── pause/resume ───┘
//!                            ▼
//!                        discarder (calling thread)
//! ```
//!
//! Shutdown is cooperative: whichever role stops the pipeline flips
//! `running`, the others notice within one iteration, and the calling thread
//! joins both workers before releasing what is left of the store.

use std::thread;

use particle_physics::Frame;

use crate::compiler::{self, CompileReport};
use crate::discarder;
use crate::error::SimulationError;
use crate::flow::FlowControl;
use crate::params::SimulationConfig;
use crate::renderer::{self, RenderReport};
use crate::sink::FrameSink;
use crate::state::PipelineState;
use crate::store::{FrameStore, StoreStats};

/// Shared handles every role works through.
#[derive(Clone, Copy)]
pub(crate) struct Pipeline<'a> {
    pub(crate) config: &'a SimulationConfig,
    pub(crate) state: &'a PipelineState,
    pub(crate) flow: &'a FlowControl,
    pub(crate) store: &'a FrameStore,
}

impl Pipeline<'_> {
    fn shutdown(&self) {
        self.state.stop();
        self.flow.close();
    }
}

/// Shuts the pipeline down if the owning role unwinds, so the other roles
/// are never left waiting on it.
struct ShutdownOnPanic<'a> {
    role: &'static str,
    pipeline: Pipeline<'a>,
}

impl Drop for ShutdownOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            log::error!("{} panicked; sending signal to stop", self.role);
            self.pipeline.shutdown();
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames handed to the sink
    pub frames_emitted: u64,
    /// Frames integrated by the compiler
    pub frames_compiled: u64,
    /// Highest lookahead the compiler reached
    pub peak_lookahead: usize,
    /// Times the renderer paused the compiler
    pub compiler_pauses: u64,
    /// Frames freed by the discarder while the pipeline ran
    pub frames_reclaimed: u64,
    /// Frame store accounting after teardown
    pub store: StoreStats,
}

/// A configured experiment, ready to run.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the pipeline to completion, emitting frames into `sink`.
    pub fn run<S: FrameSink + Send + ?Sized>(&self, sink: &mut S) -> Result<RunSummary, SimulationError> {
        let initial = Frame::initial(&self.config.particles)?;
        run_from(&self.config, initial, sink)
    }
}

/// Validate `config` and run it; see [`Simulation::run`].
pub fn run<S: FrameSink + Send + ?Sized>(
    config: &SimulationConfig,
    sink: &mut S,
) -> Result<RunSummary, SimulationError> {
    config.validate()?;
    let initial = Frame::initial(&config.particles)?;
    run_from(config, initial, sink)
}

fn run_from<S: FrameSink + Send + ?Sized>(
    config: &SimulationConfig,
    initial: Frame,
    sink: &mut S,
) -> Result<RunSummary, SimulationError> {
    let state = PipelineState::new();
    let flow = FlowControl::new();
    let store = FrameStore::new();
    let pipeline = Pipeline {
        config,
        state: &state,
        flow: &flow,
        store: &store,
    };

    log::info!(
        "running \"{}\": {} particles, dt = {:e} s, {} frames",
        config.title,
        config.particle_count(),
        config.dt,
        config.frame_limit
    );

    let outcome = thread::scope(move |scope| {
        let compiler = thread::Builder::new()
            .name("compiler".into())
            .spawn_scoped(scope, move || {
                let _guard = ShutdownOnPanic {
                    role: "compiler",
                    pipeline,
                };
                compiler::compile(&pipeline, initial)
            })
            .map_err(|source| SimulationError::Spawn {
                role: "compiler",
                source,
            })?;

        let spawned = thread::Builder::new()
            .name("renderer".into())
            .spawn_scoped(scope, move || {
                let _guard = ShutdownOnPanic {
                    role: "renderer",
                    pipeline,
                };
                renderer::render(&pipeline, sink)
            });
        let renderer = match spawned {
            Ok(handle) => handle,
            Err(source) => {
                pipeline.shutdown();
                // The spawn failure is what gets reported.
                let _ = compiler.join();
                return Err(SimulationError::Spawn {
                    role: "renderer",
                    source,
                });
            }
        };

        let reclaimed = discarder::discard(&pipeline);

        let compiled: Result<CompileReport, SimulationError> = compiler
            .join()
            .map_err(|_| SimulationError::RolePanicked { role: "compiler" })
            .and_then(|report| report);
        let rendered: Result<RenderReport, SimulationError> = renderer
            .join()
            .map_err(|_| SimulationError::RolePanicked { role: "renderer" })
            .and_then(|report| report);
        Ok((reclaimed, compiled, rendered))
    });

    let released = store.clear();
    log::debug!("released {released} frames at teardown");

    let (frames_reclaimed, compiled, rendered) = outcome?;
    let compiled = compiled?;
    let rendered = rendered?;

    let summary = RunSummary {
        frames_emitted: rendered.frames,
        frames_compiled: compiled.frames,
        peak_lookahead: compiled.peak_lookahead,
        compiler_pauses: rendered.pauses,
        frames_reclaimed,
        store: store.stats(),
    };
    log::info!(
        "finished \"{}\": {} frames emitted, {} compiled, compiler paused {} times",
        config.title,
        summary.frames_emitted,
        summary.frames_compiled,
        summary.compiler_pauses
    );
    Ok(summary)
}
