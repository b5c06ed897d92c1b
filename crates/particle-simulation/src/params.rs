//! Simulation configuration

use particle_physics::Particle;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("the system has no particles")]
    NoParticles,

    #[error("time step must be positive and finite, got {dt}")]
    InvalidTimeStep { dt: f64 },

    #[error("frame limit must be at least 1")]
    ZeroFrameLimit,
}

/// Everything the pipeline needs to run an experiment.
///
/// Built once before the pipeline starts and only read afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub title: String,
    /// Time step, s
    pub dt: f64,
    /// Number of frames to emit
    pub frame_limit: u64,
    pub particles: Vec<Particle>,
}

impl SimulationConfig {
    /// Build a validated configuration.
    pub fn new(
        title: impl Into<String>,
        dt: f64,
        frame_limit: u64,
        particles: Vec<Particle>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            title: title.into(),
            dt,
            frame_limit,
            particles,
        };
        config.validate()?;
        Ok(config)
    }

    /// Structural checks only; physical plausibility is the caller's concern.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particles.is_empty() {
            return Err(ConfigError::NoParticles);
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::InvalidTimeStep { dt: self.dt });
        }
        if self.frame_limit == 0 {
            return Err(ConfigError::ZeroFrameLimit);
        }
        Ok(())
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn one_particle() -> Vec<Particle> {
        vec![Particle::new_proton(DVec2::ZERO)]
    }

    #[test]
    fn test_valid_config() {
        let config = SimulationConfig::new("ok", 1e-3, 10, one_particle()).unwrap();
        assert_eq!(config.particle_count(), 1);
        assert_eq!(config.title, "ok");
    }

    #[test]
    fn test_rejects_empty_system() {
        assert_eq!(
            SimulationConfig::new("empty", 1e-3, 10, Vec::new()),
            Err(ConfigError::NoParticles)
        );
    }

    #[test]
    fn test_rejects_bad_time_step() {
        for dt in [0.0, -1.0, f64::INFINITY] {
            assert_eq!(
                SimulationConfig::new("dt", dt, 10, one_particle()),
                Err(ConfigError::InvalidTimeStep { dt })
            );
        }
        assert!(matches!(
            SimulationConfig::new("dt", f64::NAN, 10, one_particle()),
            Err(ConfigError::InvalidTimeStep { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_limit() {
        assert_eq!(
            SimulationConfig::new("limit", 1.0, 0, one_particle()),
            Err(ConfigError::ZeroFrameLimit)
        );
    }
}
