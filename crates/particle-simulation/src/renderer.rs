//! Renderer: the consuming and pacing role
//!
//! Walks the frames in order and hands each to the sink. It also paces the
//! compiler: once the compiler is [`PAUSE_AT`] frames ahead it is paused
//! until the renderer has caught up to within [`RESUME_BELOW`].

use crate::error::SimulationError;
use crate::flow::{PAUSE_AT, READY_AT, RESUME_BELOW};
use crate::simulation::Pipeline;
use crate::sink::FrameSink;

/// What the renderer did before it exited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Frames handed to the sink
    pub frames: u64,
    /// Times the compiler was paused
    pub pauses: u64,
}

pub(crate) fn render<S: FrameSink + ?Sized>(
    pipeline: &Pipeline<'_>,
    sink: &mut S,
) -> Result<RenderReport, SimulationError> {
    let Pipeline {
        config,
        state,
        flow,
        store,
    } = *pipeline;

    log::debug!("renderer: initialized");

    let mut report = RenderReport::default();
    let mut cursor = 0u64;
    let mut paused = false;

    let result = loop {
        // Classify on a snapshot; the compiler only ever raises lookahead
        // and never past PAUSE_AT, so acting on it after release is sound.
        let mut ahead = state.lookahead();
        if paused {
            if ahead < RESUME_BELOW {
                log::debug!("renderer: caught up to compiler, resuming it");
                flow.resume();
                paused = false;
            }
        } else if ahead >= PAUSE_AT {
            log::debug!("renderer: too far behind compiler, pausing it");
            flow.pause();
            paused = true;
            report.pauses += 1;
        }
        if !paused && ahead < READY_AT {
            ahead = state.wait_for_lookahead(READY_AT);
        }

        if ahead == 0 {
            // Only reachable once the pipeline has stopped: nothing is left
            // to render.
            log::debug!("renderer: compiler stopped and every compiled frame is rendered");
            state.stop();
            break Ok(());
        }

        let sequence = report.frames + 1;
        if sequence > config.frame_limit {
            log::debug!(
                "renderer: limit of {} reached; sending signal to stop",
                config.frame_limit
            );
            state.stop();
            break Ok(());
        }

        {
            let Some(frame) = store.get(cursor) else {
                state.stop();
                break Err(SimulationError::MissingFrame { index: cursor });
            };
            if let Err(source) = sink.emit(sequence, &frame) {
                log::error!("renderer: could not write frame {sequence}; sending signal to stop");
                state.stop();
                break Err(SimulationError::Sink { sequence, source });
            }
        }

        report.frames = sequence;
        state.frame_rendered();
        cursor += 1;
    };

    if paused {
        log::debug!("renderer: releasing paused compiler before exit");
        flow.resume();
    }

    let result = result.and_then(|()| {
        sink.finish().map_err(|source| SimulationError::Sink {
            sequence: report.frames,
            source,
        })
    });

    log::debug!("renderer: terminated after {} frames", report.frames);
    result.map(|()| report)
}
