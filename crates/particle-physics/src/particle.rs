//! Particle and snapshot types

use bytemuck::{Pod, Zeroable};
use glam::DVec2;

/// A charged, massive point particle as loaded from an experiment.
///
/// Particles are the immutable initial system: the pipeline reads their
/// charge and mass every step but never writes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Initial location, m
    pub location: DVec2,
    /// Initial velocity, m/s
    pub velocity: DVec2,
    /// Charge, C
    pub charge: f64,
    /// Mass, kg
    pub mass: f64,
}

impl Particle {
    pub fn new(location: DVec2, velocity: DVec2, charge: f64, mass: f64) -> Self {
        Self {
            location,
            velocity,
            charge,
            mass,
        }
    }

    /// Create a proton at rest
    pub fn new_proton(location: DVec2) -> Self {
        Self::new(
            location,
            DVec2::ZERO,
            crate::constants::ELEMENTARY_CHARGE,
            crate::constants::PROTON_MASS,
        )
    }

    /// Create a neutron at rest
    pub fn new_neutron(location: DVec2) -> Self {
        Self::new(location, DVec2::ZERO, 0.0, crate::constants::NEUTRON_MASS)
    }

    /// Create an electron at rest
    pub fn new_electron(location: DVec2) -> Self {
        Self::new(
            location,
            DVec2::ZERO,
            -crate::constants::ELEMENTARY_CHARGE,
            crate::constants::ELECTRON_MASS,
        )
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: DVec2) -> Self {
        self.velocity = velocity;
        self
    }
}

/// Per-particle state computed for one frame.
///
/// Forces and acceleration describe the particle at this frame's location;
/// velocity and location are the state the forces were evaluated at.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Snapshot {
    /// Electrostatic force, N
    pub electrostatic: DVec2,
    /// Gravitational force, N
    pub gravitational: DVec2,
    /// Acceleration, m/s²
    pub acceleration: DVec2,
    /// Velocity, m/s
    pub velocity: DVec2,
    /// Location, m
    pub location: DVec2,
}

impl Snapshot {
    /// Kinematic state only; force and acceleration fields are zero.
    pub fn at_rest(location: DVec2, velocity: DVec2) -> Self {
        Self {
            location,
            velocity,
            ..Self::zeroed()
        }
    }

    /// Net force acting on the particle
    pub fn net_force(&self) -> DVec2 {
        self.electrostatic + self.gravitational
    }

    pub fn is_finite(&self) -> bool {
        self.electrostatic.is_finite()
            && self.gravitational.is_finite()
            && self.acceleration.is_finite()
            && self.velocity.is_finite()
            && self.location.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_rest_zeroes_dynamics() {
        let s = Snapshot::at_rest(DVec2::new(1.0, 2.0), DVec2::new(3.0, 4.0));
        assert_eq!(s.electrostatic, DVec2::ZERO);
        assert_eq!(s.gravitational, DVec2::ZERO);
        assert_eq!(s.acceleration, DVec2::ZERO);
        assert_eq!(s.location, DVec2::new(1.0, 2.0));
        assert_eq!(s.velocity, DVec2::new(3.0, 4.0));
    }

    #[test]
    fn test_electron_charge_is_negative() {
        let e = Particle::new_electron(DVec2::ZERO);
        let p = Particle::new_proton(DVec2::ZERO);
        assert!(e.charge < 0.0);
        assert_eq!(e.charge, -p.charge);
        assert!(p.mass > e.mass);
    }

    #[test]
    fn test_non_finite_snapshot() {
        let mut s = Snapshot::zeroed();
        assert!(s.is_finite());
        s.acceleration.x = f64::NAN;
        assert!(!s.is_finite());
    }
}
