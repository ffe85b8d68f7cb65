//! Numerical and physical parameters for a run
//!
//! `SimulationConfig` holds everything that stays fixed for the lifetime of a
//! run: G, particle mass, softening, dimension, particle count, step size,
//! number of recorded samples and the monitored radius. The defaults are the
//! constants of the cold-collapse setup (1000 particles, G = 2, eps = 0.1).

use serde::Deserialize;

use crate::error::{Result, SimError};

/// How pairwise forces are attributed to the two particles of a pair
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForcePairing {
    /// f(i, j) goes to i and -f(i, j) to j. Conserves momentum
    #[default]
    #[serde(rename = "symmetric")]
    Symmetric,

    /// Particle i only feels particles j > i, and j gets nothing back.
    /// Kept to reproduce legacy density curves; does not conserve momentum
    #[serde(rename = "reference")]
    Reference,
}

/// Serial double loop or rayon reduction over particle indices
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceEvaluation {
    #[serde(rename = "serial")]
    Serial,

    #[default]
    #[serde(rename = "parallel")]
    Parallel,
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub G: f64,                      // gravitational constant
    pub mass: f64,                   // per-particle mass
    pub softening: f64,              // epsilon, keeps the force finite at zero separation
    pub dimension: usize,            // spatial dimension D
    pub num_particles: usize,        // N
    pub h: f64,                      // step size
    pub steps: usize,                // recorded samples S (step 0 included)
    pub monitor_radius: f64,         // r0 for the density diagnostic
    pub pairing: ForcePairing,       // pair attribution policy
    pub evaluation: ForceEvaluation, // serial or parallel accumulation
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            G: 2.0,
            mass: 1.0,
            softening: 0.1,
            dimension: 3,
            num_particles: 1000,
            h: 0.01,
            steps: 100,
            monitor_radius: 1.0,
            pairing: ForcePairing::default(),
            evaluation: ForceEvaluation::default(),
        }
    }
}

impl SimulationConfig {
    /// Reject parameters that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.num_particles == 0 {
            return Err(config_error("particle count must be positive"));
        }
        if self.steps == 0 {
            return Err(config_error("step count must be positive"));
        }
        if self.dimension == 0 {
            return Err(config_error("dimension must be positive"));
        }
        positive("mass", self.mass)?;
        positive("softening", self.softening)?;
        positive("step size", self.h)?;
        positive("monitor radius", self.monitor_radius)?;
        if !self.G.is_finite() {
            return Err(config_error(format!("gravitational constant must be finite, got {}", self.G)));
        }
        Ok(())
    }

    /// Time of the last recorded sample, 0 when there is none
    pub fn t_end(&self) -> f64 {
        self.steps.saturating_sub(1) as f64 * self.h
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(config_error(format!("{name} must be finite and positive, got {value}")));
    }
    Ok(())
}

fn config_error(msg: impl Into<String>) -> SimError {
    SimError::Configuration(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SimulationConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.num_particles, 1000);
        assert!((cfg.t_end() - 0.99).abs() < 1e-12);
    }

    #[test]
    fn t_end_of_zero_steps_is_zero() {
        let cfg = SimulationConfig { steps: 0, ..Default::default() };
        assert_eq!(cfg.t_end(), 0.0);
        assert!(cfg.validate().is_err());
        let cfg = SimulationConfig { steps: 1, ..Default::default() };
        assert_eq!(cfg.t_end(), 0.0);
    }

    #[test]
    fn rejects_non_positive_parameters() {
        let bad = [
            SimulationConfig { num_particles: 0, ..Default::default() },
            SimulationConfig { steps: 0, ..Default::default() },
            SimulationConfig { dimension: 0, ..Default::default() },
            SimulationConfig { mass: 0.0, ..Default::default() },
            SimulationConfig { softening: -0.1, ..Default::default() },
            SimulationConfig { h: 0.0, ..Default::default() },
            SimulationConfig { monitor_radius: 0.0, ..Default::default() },
            SimulationConfig { mass: f64::NAN, ..Default::default() },
            SimulationConfig { G: f64::INFINITY, ..Default::default() },
        ];
        for cfg in bad {
            assert!(
                matches!(cfg.validate(), Err(SimError::Configuration(_))),
                "accepted {:?}",
                cfg
            );
        }
    }
}
