//! Build runnable scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a `Scenario`:
//! - validated run parameters (`SimulationConfig`)
//! - the initial population, either sampled uniformly in a cube or listed
//!   body by body
//!
//! The sampler is deterministic for a given seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::config::{BodyConfig, InitialConfig, ScenarioConfig};
use crate::error::{Result, SimError};
use crate::simulation::engine::{CancellationToken, RunReport, Simulation};
use crate::simulation::params::SimulationConfig;
use crate::simulation::states::{NVec, Particle};

/// `n` particles at rest with every coordinate uniform in `[-size/2, size/2)`
pub fn uniform_cube(n: usize, dimension: usize, size: f64, seed: u64) -> Result<Vec<Particle>> {
    if dimension == 0 {
        return Err(SimError::Configuration("dimension must be positive".into()));
    }
    if !(size.is_finite() && size > 0.0) {
        return Err(SimError::Configuration(format!(
            "cube size must be finite and positive, got {size}"
        )));
    }

    let half = size / 2.0;
    let mut rng = StdRng::seed_from_u64(seed);
    let particles = (0..n)
        .map(|_| {
            let x = NVec::from_fn(dimension, |_, _| rng.random_range(-half..half));
            Particle::at_rest(x)
        })
        .collect();
    Ok(particles)
}

/// A configuration paired with its initial population
#[derive(Debug, Clone)]
pub struct Scenario {
    pub config: SimulationConfig,
    pub particles: Vec<Particle>,
}

impl Scenario {
    pub fn build(cfg: ScenarioConfig) -> Result<Self> {
        let (config, particles) = match &cfg.initial {
            InitialConfig::UniformCube { size, seed } => {
                let config = cfg.parameters.to_simulation_config(SimulationConfig::default().num_particles);
                config.validate()?;
                let particles = uniform_cube(config.num_particles, config.dimension, *size, *seed)?;
                (config, particles)
            }
            InitialConfig::Bodies { bodies } => {
                let config = cfg.parameters.to_simulation_config(bodies.len());
                config.validate()?;
                if config.num_particles != bodies.len() {
                    return Err(SimError::Configuration(format!(
                        "num_particles is {} but {} bodies are listed",
                        config.num_particles,
                        bodies.len()
                    )));
                }
                let particles = bodies
                    .iter()
                    .map(|bc| body_to_particle(bc, config.dimension))
                    .collect::<Result<Vec<_>>>()?;
                (config, particles)
            }
        };
        Ok(Self { config, particles })
    }

    /// A simulation that has already taken the population and recorded step 0
    pub fn into_simulation(self) -> Result<Simulation> {
        let mut sim = Simulation::new(self.config)?;
        sim.initialize(self.particles)?;
        Ok(sim)
    }

    /// Build, run to completion (or cancellation) and report
    pub fn run(self, cancel: &CancellationToken) -> Result<RunReport> {
        let mut sim = self.into_simulation()?;
        sim.run(cancel)?;
        sim.into_report()
    }
}

fn body_to_particle(bc: &BodyConfig, dimension: usize) -> Result<Particle> {
    if bc.x.len() != dimension {
        return Err(SimError::DimensionMismatch {
            expected: dimension,
            found: bc.x.len(),
        });
    }
    let x = NVec::from_column_slice(&bc.x);
    match &bc.v {
        Some(v) => Particle::new(x, NVec::from_column_slice(v)),
        None => Ok(Particle::at_rest(x)),
    }
}
