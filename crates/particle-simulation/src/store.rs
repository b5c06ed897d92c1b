//! Frame store
//!
//! Frames are kept in a queue indexed by frame number. The compiler appends
//! at the tail, the renderer reads at its own cursor, and the discarder pops
//! from the head:
//!
//! ```text
//!   head                cursor                 tail
//!    │ rendered, pending │ compiled, not rendered │
//!    ▼                   ▼                        ▼
//!   [ n ][ n+1 ] ... [ c ][ c+1 ] ...       [ t-1 ]
//! ```

use std::collections::{TryReserveError, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use particle_physics::Frame;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("frame {got} published out of order, expected frame {expected}")]
    OutOfOrder { expected: u64, got: u64 },

    #[error("could not grow the frame store to hold frame {index}")]
    Allocation {
        index: u64,
        #[source]
        source: TryReserveError,
    },
}

/// Counters describing what happened to every frame that passed through
/// the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Frames appended by the compiler
    pub published: u64,
    /// Frames popped from the head by the discarder
    pub reclaimed: u64,
    /// Frames dropped at teardown
    pub released: u64,
    /// Reclaimed frames still referenced elsewhere at the time
    pub reclaimed_in_use: u64,
}

#[derive(Debug, Default)]
struct Inner {
    head: u64,
    frames: VecDeque<Arc<Frame>>,
    stats: StoreStats,
}

#[derive(Debug, Default)]
pub struct FrameStore {
    inner: Mutex<Inner>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed frame. Its index must be the current tail.
    pub fn publish(&self, frame: Frame) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock();
        let expected = inner.head + inner.frames.len() as u64;
        let index = frame.index();
        if index != expected {
            return Err(StoreError::OutOfOrder {
                expected,
                got: index,
            });
        }
        inner
            .frames
            .try_reserve(1)
            .map_err(|source| StoreError::Allocation { index, source })?;
        inner.frames.push_back(Arc::new(frame));
        inner.stats.published += 1;
        Ok(index)
    }

    /// Shared handle to frame `index`, if it is still stored.
    pub fn get(&self, index: u64) -> Option<Arc<Frame>> {
        let inner = self.inner.lock();
        let offset = index.checked_sub(inner.head)?;
        inner.frames.get(usize::try_from(offset).ok()?).cloned()
    }

    /// Free up to `count` frames from the head. Returns how many were freed.
    ///
    /// Frames are dropped after the store lock is released.
    pub fn reclaim(&self, count: usize) -> usize {
        let freed = self.detach_head(count);
        freed.len()
    }

    /// Unlink up to `count` frames from the head and hand them back, so the
    /// caller frees them without holding the lock.
    fn detach_head(&self, count: usize) -> Vec<Arc<Frame>> {
        let mut inner = self.inner.lock();
        let count = count.min(inner.frames.len());
        let freed: Vec<Arc<Frame>> = inner.frames.drain(..count).collect();
        let in_use = freed.iter().filter(|frame| Arc::strong_count(frame) > 1).count();
        inner.stats.reclaimed_in_use += in_use as u64;
        inner.head += count as u64;
        inner.stats.reclaimed += count as u64;
        freed
    }

    /// Drop every remaining frame. Returns how many were released.
    pub fn clear(&self) -> usize {
        let released = {
            let mut inner = self.inner.lock();
            let released = std::mem::take(&mut inner.frames);
            inner.head += released.len() as u64;
            inner.stats.released += released.len() as u64;
            released
        };
        released.len()
    }

    /// Index of the oldest stored frame
    pub fn head(&self) -> u64 {
        self.inner.lock().head
    }

    /// Index the next published frame must carry
    pub fn tail(&self) -> u64 {
        let inner = self.inner.lock();
        inner.head + inner.frames.len() as u64
    }

    pub fn len(&self) -> usize {
        self.inner.lock().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().frames.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        self.inner.lock().stats
    }
}
