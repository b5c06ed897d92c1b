//! Physical constants used by the force laws and the experiment units
//!
//! Values are SI. The mass constants are in kilograms; the experiment parser
//! scales them to grams when they are used as named constants.

/// Coulomb constant (k = 1/(4πε₀)), N·m²/C²
pub const K: f64 = 8_987_551_787.0;

/// Gravitational constant, N·m²/kg²
pub const G: f64 = 6.67428e-11;

/// Elementary charge, C
pub const ELEMENTARY_CHARGE: f64 = 1.60217646e-19;

/// Unified atomic mass unit, kg
pub const ATOMIC_MASS_UNIT: f64 = 1.66053873e-27;

/// Proton mass, kg
pub const PROTON_MASS: f64 = 1.67262158e-27;

/// Neutron mass, kg
pub const NEUTRON_MASS: f64 = 1.67492716e-27;

/// Electron mass, kg
pub const ELECTRON_MASS: f64 = 9.10938188e-31;
