//! Compiler: the producing role
//!
//! Integrates the working frame, publishes it, and moves on to its
//! successor until the pipeline stops or the flow is closed.

use particle_physics::{integrate, Frame};

use crate::error::SimulationError;
use crate::flow::PAUSE_AT;
use crate::simulation::Pipeline;

/// What the compiler did before it exited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Frames integrated and published
    pub frames: u64,
    /// Highest lookahead reached after a publish
    pub peak_lookahead: usize,
}

enum Step {
    Published { lookahead: usize, finite: bool },
    Stopped,
}

pub(crate) fn compile(pipeline: &Pipeline<'_>, initial: Frame) -> Result<CompileReport, SimulationError> {
    let Pipeline {
        config,
        state,
        flow,
        store,
    } = *pipeline;

    log::debug!("compiler: initialized");

    let mut working = initial;
    let mut report = CompileReport::default();
    let mut reported_non_finite = false;

    let result = loop {
        if !state.wait_for_headroom(PAUSE_AT) {
            break Ok(());
        }

        let step = flow.step(|| -> Result<Step, SimulationError> {
            if !state.is_running() {
                return Ok(Step::Stopped);
            }
            let next = integrate(&mut working, &config.particles, config.dt)?;
            let done = std::mem::replace(&mut working, next);
            let finite = done.is_finite();
            // Forces are written before the frame becomes visible.
            store.publish(done)?;
            Ok(Step::Published {
                lookahead: state.frame_compiled(),
                finite,
            })
        });

        match step {
            None | Some(Ok(Step::Stopped)) => break Ok(()),
            Some(Ok(Step::Published { lookahead, finite })) => {
                report.frames += 1;
                report.peak_lookahead = report.peak_lookahead.max(lookahead);
                if !finite && !reported_non_finite {
                    reported_non_finite = true;
                    log::warn!(
                        "compiler: frame {} has non-finite values (coincident particles?)",
                        report.frames - 1
                    );
                }
            }
            Some(Err(err)) => {
                log::error!("compiler: {err}; sending signal to stop");
                state.stop();
                break Err(err);
            }
        }
    };

    log::debug!("compiler: terminated after {} frames", report.frames);
    result.map(|()| report)
}
