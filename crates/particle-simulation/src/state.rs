//! Guarded counters shared by the pipeline roles
//!
//! Every value lives behind its own mutex and is only read or written while
//! that mutex is held. Each guard carries a condition variable that is
//! signalled on every change, so waiting roles block instead of polling.

use parking_lot::{Condvar, Mutex};

/// A value behind its own lock, with change notification.
#[derive(Debug, Default)]
pub struct Guarded<T> {
    value: Mutex<T>,
    changed: Condvar,
}

impl<T: Copy> Guarded<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
            changed: Condvar::new(),
        }
    }

    pub fn get(&self) -> T {
        *self.value.lock()
    }

    /// Apply `f` under the lock and return the new value.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> T {
        let mut guard = self.value.lock();
        f(&mut *guard);
        self.changed.notify_all();
        *guard
    }

    /// Block until `f` returns `Some`, re-evaluating after every change.
    ///
    /// `f` runs with the lock held and may modify the value. It may also read
    /// other guards, as long as those are never held while this one is taken.
    pub fn wait_map<R>(&self, mut f: impl FnMut(&mut T) -> Option<R>) -> R {
        let mut guard = self.value.lock();
        loop {
            if let Some(result) = f(&mut *guard) {
                self.changed.notify_all();
                return result;
            }
            self.changed.wait(&mut guard);
        }
    }

    /// Wake waiters so they re-check conditions that involve other state.
    pub fn notify(&self) {
        let _guard = self.value.lock();
        self.changed.notify_all();
    }
}

/// The three counters the compiler, renderer and discarder coordinate
/// through.
///
/// Lock order: `lookahead` or `pending_reclaim` may be held while `running`
/// is read, never the other way round.
#[derive(Debug)]
pub struct PipelineState {
    running: Guarded<bool>,
    lookahead: Guarded<usize>,
    pending_reclaim: Guarded<usize>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineState {
    pub fn new() -> Self {
        Self {
            running: Guarded::new(true),
            lookahead: Guarded::new(0),
            pending_reclaim: Guarded::new(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Request cooperative shutdown. Idempotent; returns true for the call
    /// that actually stopped the pipeline.
    pub fn stop(&self) -> bool {
        let mut was_running = false;
        self.running.update(|running| {
            was_running = *running;
            *running = false;
        });
        // `running` is released before these are taken (lock order).
        self.lookahead.notify();
        self.pending_reclaim.notify();
        was_running
    }

    /// Frames compiled but not yet rendered
    pub fn lookahead(&self) -> usize {
        self.lookahead.get()
    }

    /// Frames rendered but not yet reclaimed
    pub fn pending_reclaim(&self) -> usize {
        self.pending_reclaim.get()
    }

    /// Compiler side: one more frame is complete. Returns the new lookahead.
    pub(crate) fn frame_compiled(&self) -> usize {
        self.lookahead.update(|ahead| *ahead += 1)
    }

    /// Renderer side: the cursor frame has been emitted and is now
    /// reclaimable.
    pub(crate) fn frame_rendered(&self) {
        self.lookahead.update(|ahead| {
            debug_assert!(*ahead > 0, "rendered a frame that was never compiled");
            *ahead -= 1;
        });
        self.pending_reclaim.update(|pending| *pending += 1);
    }

    /// Compiler side: block while `lookahead` is at `ceiling`.
    /// Returns false once the pipeline has stopped.
    pub(crate) fn wait_for_headroom(&self, ceiling: usize) -> bool {
        self.lookahead.wait_map(|ahead| {
            let running = self.running.get();
            (*ahead < ceiling || !running).then_some(running)
        })
    }

    /// Renderer side: block until at least `ready` frames are ahead, or the
    /// pipeline has stopped. Returns the lookahead seen on wake-up.
    pub(crate) fn wait_for_lookahead(&self, ready: usize) -> usize {
        self.lookahead
            .wait_map(|ahead| (*ahead >= ready || !self.running.get()).then_some(*ahead))
    }

    /// Discarder side: block until frames are reclaimable and take them all,
    /// resetting the count. `None` once the pipeline has stopped and nothing
    /// is left to reclaim.
    pub(crate) fn take_reclaimable(&self) -> Option<usize> {
        self.pending_reclaim.wait_map(|pending| {
            if *pending > 0 {
                Some(Some(std::mem::take(pending)))
            } else if !self.running.get() {
                Some(None)
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_update_returns_new_value() {
        let counter = Guarded::new(4usize);
        assert_eq!(counter.update(|v| *v += 3), 7);
        assert_eq!(counter.get(), 7);
        counter.update(|v| *v = 1);
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let state = PipelineState::new();
        assert!(state.is_running());
        assert!(state.stop());
        assert!(!state.stop());
        assert!(!state.is_running());
    }

    #[test]
    fn test_frame_accounting() {
        let state = PipelineState::new();
        assert_eq!(state.frame_compiled(), 1);
        assert_eq!(state.frame_compiled(), 2);
        state.frame_rendered();
        assert_eq!(state.lookahead(), 1);
        assert_eq!(state.pending_reclaim(), 1);
        assert_eq!(state.take_reclaimable(), Some(1));
        assert_eq!(state.pending_reclaim(), 0);
    }

    #[test]
    fn test_stop_wakes_reclaim_waiter() {
        let state = PipelineState::new();
        thread::scope(|s| {
            let waiter = s.spawn(|| state.take_reclaimable());
            thread::sleep(Duration::from_millis(20));
            state.stop();
            assert_eq!(waiter.join().unwrap(), None);
        });
    }

    #[test]
    fn test_lookahead_waiter_wakes_on_compiled_frames() {
        let state = PipelineState::new();
        thread::scope(|s| {
            let waiter = s.spawn(|| state.wait_for_lookahead(2));
            state.frame_compiled();
            thread::sleep(Duration::from_millis(10));
            state.frame_compiled();
            assert_eq!(waiter.join().unwrap(), 2);
        });
    }

    #[test]
    fn test_headroom_waiter_sees_shutdown() {
        let state = PipelineState::new();
        for _ in 0..3 {
            state.frame_compiled();
        }
        assert!(state.wait_for_headroom(4));
        thread::scope(|s| {
            let waiter = s.spawn(|| state.wait_for_headroom(3));
            thread::sleep(Duration::from_millis(20));
            state.stop();
            assert!(!waiter.join().unwrap());
        });
    }
}
