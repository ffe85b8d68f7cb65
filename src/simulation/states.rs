//! Core state types for the N-body simulation.
//!
//! - `Particle`: position, velocity and the derived radius
//! - `SimulationState`: the particle population plus time and step index
//! - `DensityTimeSeries`: the (time, density) diagnostic
//! - `Snapshot`: (x, y) projection handed to observers after each step
//!
//! Mass is uniform and lives in `SimulationConfig`, not in the particle.

use nalgebra::DVector;

use crate::error::{Result, SimError};
use crate::simulation::radius::radius_of;
use crate::simulation::vector::check_dims;

/// Dimension is chosen at runtime, so vectors are heap-backed
pub type NVec = DVector<f64>;

/// A point mass.
///
/// Position and radius are private so that the radius is always the norm of
/// the stored position: every method that moves the particle recomputes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    x: NVec, // position
    v: NVec, // velocity
    r: f64,  // |x|
}

impl Particle {
    pub fn new(x: NVec, v: NVec) -> Result<Self> {
        check_dims(&x, &v)?;
        let r = radius_of(&x);
        Ok(Self { x, v, r })
    }

    /// Particle with zero velocity
    pub fn at_rest(x: NVec) -> Self {
        let v = NVec::zeros(x.len());
        let r = radius_of(&x);
        Self { x, v, r }
    }

    pub fn position(&self) -> &NVec {
        &self.x
    }

    pub fn velocity(&self) -> &NVec {
        &self.v
    }

    pub fn radius(&self) -> f64 {
        self.r
    }

    pub fn dimension(&self) -> usize {
        self.x.len()
    }

    /// Replace the position; the radius follows
    pub fn set_position(&mut self, x: NVec) -> Result<()> {
        check_dims(&self.x, &x)?;
        self.x = x;
        self.r = radius_of(&self.x);
        Ok(())
    }

    /// v += a * h
    pub(crate) fn kick(&mut self, a: &NVec, h: f64) -> Result<()> {
        check_dims(&self.v, a)?;
        self.v.axpy(h, a, 1.0);
        Ok(())
    }

    /// x += v * h, then refresh the radius
    pub(crate) fn drift(&mut self, h: f64) {
        self.x.axpy(h, &self.v, 1.0);
        self.r = radius_of(&self.x);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub particles: Vec<Particle>, // population, fixed size for a run
    pub t: f64,                   // time
    pub step: usize,              // number of advancing steps taken
}

impl SimulationState {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self {
            particles,
            t: 0.0,
            step: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Sum of all velocities times the uniform mass
    pub fn momentum(&self, mass: f64) -> Option<NVec> {
        let dim = self.particles.first()?.dimension();
        let mut p = NVec::zeros(dim);
        for particle in &self.particles {
            p.axpy(mass, particle.velocity(), 1.0);
        }
        Some(p)
    }

    /// True if any position or velocity component is NaN or infinite
    pub fn has_non_finite(&self) -> bool {
        self.particles.iter().any(|p| {
            p.position().iter().chain(p.velocity().iter()).any(|c| !c.is_finite())
        })
    }

    /// Check that every particle has `dimension` components
    pub fn check_dimension(&self, dimension: usize) -> Result<()> {
        for p in &self.particles {
            if p.position().len() != dimension {
                return Err(SimError::DimensionMismatch {
                    expected: dimension,
                    found: p.position().len(),
                });
            }
            if p.velocity().len() != dimension {
                return Err(SimError::DimensionMismatch {
                    expected: dimension,
                    found: p.velocity().len(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensitySample {
    pub time: f64,
    pub density: f64,
}

/// Density inside the monitored radius, one sample per recorded step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DensityTimeSeries {
    samples: Vec<DensitySample>,
}

impl DensityTimeSeries {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            samples: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, time: f64, density: f64) {
        self.samples.push(DensitySample { time, density });
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[DensitySample] {
        &self.samples
    }

    pub fn last(&self) -> Option<&DensitySample> {
        self.samples.last()
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.time)
    }

    pub fn densities(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.density)
    }
}

/// Read-only view of the population for scatter plots
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub step: usize,
    pub time: f64,
    pub xy: Vec<[f64; 2]>, // y is 0 for one-dimensional runs
}

impl Snapshot {
    pub fn capture(state: &SimulationState) -> Self {
        let xy = state
            .particles
            .iter()
            .map(|p| {
                let x = p.position();
                [
                    x.get(0).copied().unwrap_or(0.0),
                    x.get(1).copied().unwrap_or(0.0),
                ]
            })
            .collect();
        Self {
            step: state.step,
            time: state.t,
            xy,
        }
    }
}
