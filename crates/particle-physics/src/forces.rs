//! Pairwise force laws
//!
//! Both forces are inverse-square along the line joining the two particles.
//! There is no softening: coincident particles divide by zero and the result
//! is non-finite.

use crate::constants::{G, K};
use crate::particle::Particle;
use glam::DVec2;

/// Field-like term `source · r̂ / r²` for a radius vector pointing from the
/// particle being acted on towards the source.
#[inline]
pub fn inverse_square(radius: DVec2, source: f64) -> DVec2 {
    let r = radius.length();
    radius * (source / (r * r) / r)
}

/// Electrostatic force on `p1` (at `at1`) from `p2` (at `at2`)
/// F = k * q1 * q2 / r², repulsive for like charges
pub fn electrostatic_force(p1: &Particle, at1: DVec2, p2: &Particle, at2: DVec2) -> DVec2 {
    -inverse_square(at2 - at1, p2.charge) * (K * p1.charge)
}

/// Gravitational force on `p1` (at `at1`) from `p2` (at `at2`)
/// F = G * m1 * m2 / r², always attractive
pub fn gravitational_force(p1: &Particle, at1: DVec2, p2: &Particle, at2: DVec2) -> DVec2 {
    inverse_square(at2 - at1, p2.mass) * (G * p1.mass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs())
    }

    #[test]
    fn test_like_charges_repel() {
        let p = Particle::new_proton(DVec2::ZERO);
        let f = electrostatic_force(&p, DVec2::ZERO, &p, DVec2::new(2.0, 0.0));
        assert!(f.x < 0.0);
        assert_eq!(f.y, 0.0);
        assert!(close(f.x.abs(), K * ELEMENTARY_CHARGE * ELEMENTARY_CHARGE / 4.0));
    }

    #[test]
    fn test_opposite_charges_attract() {
        let p = Particle::new_proton(DVec2::ZERO);
        let e = Particle::new_electron(DVec2::ZERO);
        let f = electrostatic_force(&p, DVec2::ZERO, &e, DVec2::new(0.0, 3.0));
        assert!(f.y > 0.0);
        assert!(close(f.y, K * ELEMENTARY_CHARGE * ELEMENTARY_CHARGE / 9.0));
    }

    #[test]
    fn test_gravity_attracts() {
        let n = Particle::new_neutron(DVec2::ZERO);
        let f = gravitational_force(&n, DVec2::ZERO, &n, DVec2::new(-1.0, 0.0));
        assert!(f.x < 0.0);
        assert!(close(f.x.abs(), G * NEUTRON_MASS * NEUTRON_MASS));
    }

    #[test]
    fn test_newtons_third_law() {
        let p = Particle::new_proton(DVec2::ZERO);
        let e = Particle::new_electron(DVec2::ZERO);
        let a = DVec2::new(0.5, -1.0);
        let b = DVec2::new(2.0, 3.0);
        let f_pe = electrostatic_force(&p, a, &e, b);
        let f_ep = electrostatic_force(&e, b, &p, a);
        assert!(close(f_pe.x, -f_ep.x));
        assert!(close(f_pe.y, -f_ep.y));
    }

    #[test]
    fn test_coincident_particles_are_not_finite() {
        let p = Particle::new_proton(DVec2::ZERO);
        let f = electrostatic_force(&p, DVec2::ONE, &p, DVec2::ONE);
        assert!(!f.is_finite());
        let g = gravitational_force(&p, DVec2::ONE, &p, DVec2::ONE);
        assert!(!g.is_finite());
    }
}
