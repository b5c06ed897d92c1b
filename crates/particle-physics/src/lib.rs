//! # Particle Physics
//!
//! Point particles with charge and mass, the electrostatic and gravitational
//! pair forces between them, and the per-frame integrator that advances a
//! [`Frame`] of snapshots by one time step.

pub mod constants;
pub mod forces;
pub mod frame;
pub mod integrator;
pub mod particle;

pub use constants::*;
pub use forces::*;
pub use frame::*;
pub use integrator::*;
pub use particle::*;
