//! Configuration types for loading simulation scenarios from YAML.
//!
//! A scenario consists of:
//!
//! - [`ParametersConfig`] – physical constants, step size and run length
//! - [`InitialConfig`]    – how the initial population is produced
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! Every parameter is optional; missing ones take the values of the cold-collapse
//! setup (1000 particles in a 10×10×10 box, G = 2).
//!
//! # YAML format
//!
//! ```yaml
//! parameters:
//!   G: 2.0                  # gravitational constant
//!   m: 1.0                  # mass of every particle
//!   epsilon: 0.1            # softening length
//!   dimension: 3
//!   num_particles: 1000
//!   h: 0.01                 # step size
//!   steps: 100              # recorded samples, step 0 included
//!   monitor_radius: 1.0     # radius of the density diagnostic
//!   pairing: "symmetric"    # or "reference"
//!   evaluation: "parallel"  # or "serial"
//!
//! initial:
//!   kind: uniform_cube
//!   size: 10.0
//!   seed: 42
//! ```
//!
//! or an explicit list of bodies:
//!
//! ```yaml
//! initial:
//!   kind: bodies
//!   bodies:
//!     - x: [ 1.0, 0.0, 0.0 ]
//!     - x: [ -1.0, 0.0, 0.0 ]
//!       v: [ 0.0, 0.1, 0.0 ]
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::simulation::params::{ForceEvaluation, ForcePairing, SimulationConfig};

/// Global numerical and physical parameters for a scenario
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ParametersConfig {
    pub G: f64,                       // gravitational constant
    pub m: f64,                       // mass of every particle
    pub epsilon: f64,                 // softening length
    pub dimension: usize,             // spatial dimension
    pub num_particles: Option<usize>, // inferred from `bodies` when absent
    pub h: f64,                       // time step size
    pub steps: usize,                 // number of recorded samples
    pub monitor_radius: f64,          // radius for the density diagnostic
    pub pairing: ForcePairing,        // force attribution policy
    pub evaluation: ForceEvaluation,  // serial or rayon accumulation
}

impl Default for ParametersConfig {
    fn default() -> Self {
        let d = SimulationConfig::default();
        Self {
            G: d.G,
            m: d.mass,
            epsilon: d.softening,
            dimension: d.dimension,
            num_particles: None,
            h: d.h,
            steps: d.steps,
            monitor_radius: d.monitor_radius,
            pairing: d.pairing,
            evaluation: d.evaluation,
        }
    }
}

impl ParametersConfig {
    /// Runtime config; `num_particles` falls back to `default_count`
    pub fn to_simulation_config(&self, default_count: usize) -> SimulationConfig {
        SimulationConfig {
            G: self.G,
            mass: self.m,
            softening: self.epsilon,
            dimension: self.dimension,
            num_particles: self.num_particles.unwrap_or(default_count),
            h: self.h,
            steps: self.steps,
            monitor_radius: self.monitor_radius,
            pairing: self.pairing,
            evaluation: self.evaluation,
        }
    }
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct BodyConfig {
    pub x: Vec<f64>,         // initial position
    pub v: Option<Vec<f64>>, // initial velocity, zero when absent
}

/// Where the initial population comes from
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialConfig {
    /// Uniform coordinates in [-size/2, size/2) per axis, at rest
    UniformCube { size: f64, seed: u64 },

    /// Explicit positions (and optional velocities)
    Bodies { bodies: Vec<BodyConfig> },
}

impl Default for InitialConfig {
    fn default() -> Self {
        InitialConfig::UniformCube { size: 10.0, seed: 0 }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ScenarioConfig {
    pub parameters: ParametersConfig, // physical and numerical parameters
    pub initial: InitialConfig,       // initial condition
}

/// Parse a scenario from a YAML string
pub fn parse_scenario(yaml: &str) -> Result<ScenarioConfig> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load a scenario from a YAML file
pub fn load_scenario(path: impl AsRef<Path>) -> Result<ScenarioConfig> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    Ok(serde_yaml::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = parse_scenario("{}").unwrap();
        let sim = cfg.parameters.to_simulation_config(1000);
        assert_eq!(sim, SimulationConfig::default());
        assert!(matches!(cfg.initial, InitialConfig::UniformCube { size, seed: 0 } if size == 10.0));
    }

    #[test]
    fn parses_bodies_and_policies() {
        let yaml = r#"
parameters:
  G: 1.0
  epsilon: 0.05
  pairing: reference
  evaluation: serial
initial:
  kind: bodies
  bodies:
    - x: [1.0, 0.0, 0.0]
    - x: [-1.0, 0.0, 0.0]
      v: [0.0, 0.5, 0.0]
"#;
        let cfg = parse_scenario(yaml).unwrap();
        assert_eq!(cfg.parameters.G, 1.0);
        assert_eq!(cfg.parameters.epsilon, 0.05);
        assert_eq!(cfg.parameters.pairing, ForcePairing::Reference);
        assert_eq!(cfg.parameters.evaluation, ForceEvaluation::Serial);
        match cfg.initial {
            InitialConfig::Bodies { bodies } => {
                assert_eq!(bodies.len(), 2);
                assert!(bodies[0].v.is_none());
                assert_eq!(bodies[1].v.as_deref(), Some(&[0.0, 0.5, 0.0][..]));
            }
            other => panic!("unexpected initial config {:?}", other),
        }
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        assert!(parse_scenario("parameters:\n  gravity: 1.0\n").is_err());
    }
}
