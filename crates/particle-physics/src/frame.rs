//! Frames: one time step's snapshots for the whole system

use crate::integrator::IntegrateError;
use crate::particle::{Particle, Snapshot};
use bytemuck::Zeroable;

/// Snapshots for every particle at one time step, index-aligned with the
/// particle list.
///
/// `index` is the frame's position in the sequence, starting at 0 for the
/// initial configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index: u64,
    snapshots: Vec<Snapshot>,
}

impl Frame {
    /// Frame 0: initial locations and velocities, zero forces.
    pub fn initial(particles: &[Particle]) -> Result<Self, IntegrateError> {
        let mut snapshots = allocate_snapshots(particles.len())?;
        for (snapshot, particle) in snapshots.iter_mut().zip(particles) {
            *snapshot = Snapshot::at_rest(particle.location, particle.velocity);
        }
        Ok(Self {
            index: 0,
            snapshots,
        })
    }

    /// Zeroed successor of `self`, to be filled by the integrator.
    pub(crate) fn successor(&self) -> Result<Self, IntegrateError> {
        Ok(Self {
            index: self.index + 1,
            snapshots: allocate_snapshots(self.snapshots.len())?,
        })
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub(crate) fn snapshots_mut(&mut self) -> &mut [Snapshot] {
        &mut self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// True when every component of every snapshot is finite
    pub fn is_finite(&self) -> bool {
        self.snapshots.iter().all(Snapshot::is_finite)
    }
}

/// Fallible allocation so that running out of memory surfaces as an error
/// the pipeline can shut down on.
fn allocate_snapshots(count: usize) -> Result<Vec<Snapshot>, IntegrateError> {
    let mut snapshots = Vec::new();
    snapshots
        .try_reserve_exact(count)
        .map_err(|source| IntegrateError::Allocation {
            particles: count,
            source,
        })?;
    snapshots.resize(count, Snapshot::zeroed());
    Ok(snapshots)
}
