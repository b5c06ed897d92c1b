//! Producer flow control
//!
//! [`FlowControl`] is the production permit. The compiler holds it for the
//! duration of one integration step; the renderer takes it away with
//! [`FlowControl::pause`] when the compiler has run too far ahead and hands
//! it back with [`FlowControl::resume`] once it has caught up. Only one of
//! the two can hold it at a time.
//!
//! ```text
//! lookahead:  0 ─ 1 ─ 2 ──────────────── 8
//!                     │ render           │ pause compiler
//!             wait ◄──┘   resume below 3 ┘
//! ```

use parking_lot::{Condvar, Mutex};

/// The compiler is paused once it is this many frames ahead. Also the hard
/// ceiling on lookahead.
pub const PAUSE_AT: usize = 8;

/// A paused compiler is resumed once lookahead drops below this.
pub const RESUME_BELOW: usize = 3;

/// The renderer waits until at least this many frames are ahead.
pub const READY_AT: usize = 2;

#[derive(Debug, Default)]
struct FlowState {
    paused: bool,
    stepping: bool,
    closed: bool,
}

#[derive(Debug, Default)]
pub struct FlowControl {
    state: Mutex<FlowState>,
    changed: Condvar,
}

impl FlowControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one production step while holding the permit.
    ///
    /// Blocks while paused. Returns `None` without running `step` once the
    /// flow has been closed.
    pub fn step<R>(&self, step: impl FnOnce() -> R) -> Option<R> {
        {
            let mut state = self.state.lock();
            while state.paused && !state.closed {
                self.changed.wait(&mut state);
            }
            if state.closed {
                return None;
            }
            state.stepping = true;
        }

        let _permit = Permit(self);
        Some(step())
    }

    /// Take the permit away from the producer.
    ///
    /// Waits for an in-flight step to finish, so on return the producer is
    /// guaranteed to be between steps. Returns false if already paused.
    pub fn pause(&self) -> bool {
        let mut state = self.state.lock();
        while state.stepping {
            self.changed.wait(&mut state);
        }
        let newly_paused = !state.paused;
        state.paused = true;
        newly_paused
    }

    /// Hand the permit back. Harmless if the producer has already exited.
    pub fn resume(&self) {
        let mut state = self.state.lock();
        state.paused = false;
        self.changed.notify_all();
    }

    /// Release any waiting producer for good; later steps return `None`.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.paused = false;
        self.changed.notify_all();
    }

    #[cfg(test)]
    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }
}

/// Clears `stepping` when a step ends, including by panic.
struct Permit<'a>(&'a FlowControl);

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        let mut state = self.0.state.lock();
        state.stepping = false;
        self.0.changed.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_step_runs_when_not_paused() {
        let flow = FlowControl::new();
        assert_eq!(flow.step(|| 42), Some(42));
    }

    #[test]
    fn test_pause_twice_reports_once() {
        let flow = FlowControl::new();
        assert!(flow.pause());
        assert!(!flow.pause());
        assert!(flow.is_paused());
        flow.resume();
        assert!(!flow.is_paused());
    }

    #[test]
    fn test_paused_producer_waits_for_resume() {
        let flow = FlowControl::new();
        let steps = AtomicUsize::new(0);
        flow.pause();

        thread::scope(|s| {
            let producer = s.spawn(|| flow.step(|| steps.fetch_add(1, Ordering::SeqCst)));
            thread::sleep(Duration::from_millis(30));
            assert_eq!(steps.load(Ordering::SeqCst), 0);
            flow.resume();
            assert_eq!(producer.join().unwrap(), Some(0));
        });
        assert_eq!(steps.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pause_waits_for_in_flight_step() {
        let flow = FlowControl::new();
        let progress = AtomicUsize::new(0);

        thread::scope(|s| {
            s.spawn(|| {
                flow.step(|| {
                    progress.store(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(30));
                    progress.store(2, Ordering::SeqCst);
                })
            });
            while progress.load(Ordering::SeqCst) == 0 {
                thread::yield_now();
            }
            flow.pause();
            assert_eq!(progress.load(Ordering::SeqCst), 2);
            flow.resume();
        });
    }

    #[test]
    fn test_close_releases_paused_producer() {
        let flow = FlowControl::new();
        flow.pause();
        thread::scope(|s| {
            let producer = s.spawn(|| flow.step(|| ()));
            thread::sleep(Duration::from_millis(10));
            flow.close();
            assert_eq!(producer.join().unwrap(), None);
        });
    }
}
