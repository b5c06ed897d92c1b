//! Semi-implicit Euler integrator
//!
//! Each step evaluates the all-pairs electrostatic and gravitational forces
//! at the current frame, records them (and the resulting acceleration) in
//! that frame, then builds the successor frame:
//!
//! ```text
//! v' = v + a·Δt
//! x' = x + v'·Δt
//! ```
//!
//! The location update uses the *new* velocity. Swapping the order turns this
//! into explicit Euler, which drifts in energy over long runs.

use std::collections::TryReserveError;

use crate::constants::{G, K};
use crate::forces::inverse_square;
use crate::frame::Frame;
use crate::particle::Particle;
use glam::DVec2;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrateError {
    /// A frame's snapshot storage could not be allocated
    #[error("could not allocate a frame for {particles} particles")]
    Allocation {
        particles: usize,
        #[source]
        source: TryReserveError,
    },

    /// The frame does not hold one snapshot per particle
    #[error("frame holds {frame} snapshots but the system has {particles} particles")]
    ParticleCountMismatch { frame: usize, particles: usize },
}

/// Fill `frame`'s force and acceleration fields and return its successor.
///
/// `frame` must have its locations and velocities set. Cost is O(n²) in the
/// number of particles.
pub fn integrate(frame: &mut Frame, particles: &[Particle], dt: f64) -> Result<Frame, IntegrateError> {
    if frame.len() != particles.len() {
        return Err(IntegrateError::ParticleCountMismatch {
            frame: frame.len(),
            particles: particles.len(),
        });
    }

    let mut next = frame.successor()?;
    let current = frame.snapshots_mut();

    for (i, particle) in particles.iter().enumerate() {
        let location = current[i].location;
        let mut electrostatic = DVec2::ZERO;
        let mut gravitational = DVec2::ZERO;

        for (j, other) in particles.iter().enumerate() {
            // No self-interaction
            if j == i {
                continue;
            }
            let radius = current[j].location - location;
            electrostatic -= inverse_square(radius, other.charge);
            gravitational += inverse_square(radius, other.mass);
        }

        let snapshot = &mut current[i];
        snapshot.electrostatic = electrostatic * (K * particle.charge);
        snapshot.gravitational = gravitational * (G * particle.mass);
        snapshot.acceleration = snapshot.net_force() / particle.mass;

        let velocity = snapshot.velocity + snapshot.acceleration * dt;
        let successor = &mut next.snapshots_mut()[i];
        successor.velocity = velocity;
        successor.location = location + velocity * dt;
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lone_particle_is_inertial() {
        let particles = [Particle::new_proton(DVec2::new(3.0, -2.0)).with_velocity(DVec2::new(1.0, 0.5))];
        let mut frame = Frame::initial(&particles).unwrap();
        let next = integrate(&mut frame, &particles, 0.5).unwrap();

        let s = frame.snapshots()[0];
        assert_eq!(s.electrostatic, DVec2::ZERO);
        assert_eq!(s.gravitational, DVec2::ZERO);
        assert_eq!(s.acceleration, DVec2::ZERO);

        let n = next.snapshots()[0];
        assert_eq!(n.velocity, DVec2::new(1.0, 0.5));
        assert_eq!(n.location, DVec2::new(3.5, -1.75));
    }

    #[test]
    fn test_location_uses_new_velocity() {
        // Two neutral unit masses one metre apart; gravity is the only force.
        let particles = [
            Particle::new(DVec2::ZERO, DVec2::ZERO, 0.0, 1.0),
            Particle::new(DVec2::new(1.0, 0.0), DVec2::ZERO, 0.0, 1.0),
        ];
        let dt = 2.0;
        let mut frame = Frame::initial(&particles).unwrap();
        let next = integrate(&mut frame, &particles, dt).unwrap();

        let a = frame.snapshots()[0].acceleration;
        assert_eq!(a, DVec2::new(G, 0.0));
        let n = next.snapshots()[0];
        assert_eq!(n.velocity, a * dt);
        // Explicit Euler would leave the location unchanged after one step.
        assert_eq!(n.location, a * dt * dt);
    }

    #[test]
    fn test_mismatched_frame_is_rejected() {
        let particles = [Particle::new_proton(DVec2::ZERO), Particle::new_electron(DVec2::ONE)];
        let mut frame = Frame::initial(&particles[..1]).unwrap();
        let err = integrate(&mut frame, &particles, 1.0).unwrap_err();
        assert_eq!(
            err,
            IntegrateError::ParticleCountMismatch {
                frame: 1,
                particles: 2
            }
        );
    }

    #[test]
    fn test_coincident_particles_propagate_non_finite() {
        let particles = [Particle::new_proton(DVec2::ONE), Particle::new_electron(DVec2::ONE)];
        let mut frame = Frame::initial(&particles).unwrap();
        let next = integrate(&mut frame, &particles, 1.0).unwrap();
        assert!(!frame.is_finite());
        assert!(!next.is_finite());
    }
}
