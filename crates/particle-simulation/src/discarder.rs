//! Discarder: frees frames the renderer is done with
//!
//! Runs on the controlling thread. `pending_reclaim` is only raised after the
//! renderer has released a frame, so popping that many frames from the head
//! never reaches the renderer's cursor.

use crate::simulation::Pipeline;

pub(crate) fn discard(pipeline: &Pipeline<'_>) -> u64 {
    let Pipeline { state, store, .. } = *pipeline;

    log::debug!("discarder: initialized");

    let mut reclaimed = 0u64;
    while let Some(pending) = state.take_reclaimable() {
        let freed = store.reclaim(pending);
        if freed != pending {
            log::warn!("discarder: {pending} frames were reclaimable but only {freed} were stored");
        }
        reclaimed += freed as u64;
        log::trace!("discarder: freed {freed} frames, head is now {}", store.head());
    }

    log::debug!("discarder: terminated after freeing {reclaimed} frames");
    reclaimed
}
