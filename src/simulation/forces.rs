//! Force contributors for the n-body engine
//!
//! Defines the [`ForceTerm`] trait, the [`ForceSet`] that sums terms into a
//! per-particle accumulator, and direct-sum softened gravity with both a
//! serial pair loop and a rayon reduction over particle indices.

use rayon::prelude::*;

use crate::error::{Result, SimError};
use crate::simulation::params::{ForceEvaluation, ForcePairing, SimulationConfig};
use crate::simulation::states::{NVec, Particle};
use crate::simulation::vector::{add_assign_scaled, sub};

/// Collection of force terms.
/// Contributions of every term are summed into one force vector per particle
pub struct ForceSet {
    terms: Vec<Box<dyn ForceTerm + Send + Sync>>,
}

impl Default for ForceSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a force term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: ForceTerm + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total forces for all particles
    /// - `out[i]` is zeroed, then every term adds its contribution
    pub fn accumulate_forces(&self, particles: &[Particle], out: &mut [NVec]) -> Result<()> {
        check_buffer(particles, out)?;
        for f in out.iter_mut() {
            f.fill(0.0);
        }
        for term in &self.terms {
            term.accumulate(particles, out)?;
        }
        Ok(())
    }
}

/// One accumulator slot per particle
fn check_buffer(particles: &[Particle], out: &[NVec]) -> Result<()> {
    if out.len() != particles.len() {
        return Err(SimError::DimensionMismatch {
            expected: particles.len(),
            found: out.len(),
        });
    }
    Ok(())
}

/// A force source. Implementations add into `out[i]`, never overwrite it
pub trait ForceTerm {
    fn accumulate(&self, particles: &[Particle], out: &mut [NVec]) -> Result<()>;
}

/// Newtonian gravity between equal masses with Plummer softening
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct SoftenedGravity {
    pub G: f64,                      // gravitational constant
    pub mass: f64,                   // mass of every particle
    pub softening: f64,              // epsilon
    pub pairing: ForcePairing,       // who receives f(i, j)
    pub evaluation: ForceEvaluation, // serial or parallel
}

impl SoftenedGravity {
    pub fn from_config(cfg: &SimulationConfig) -> Self {
        Self {
            G: cfg.G,
            mass: cfg.mass,
            softening: cfg.softening,
            pairing: cfg.pairing,
            evaluation: cfg.evaluation,
        }
    }

    /// Force on a particle at `x1` exerted by a particle at `x2`.
    ///
    /// f = G m² d / (|d|² + eps²)^(3/2) with d = x2 - x1, so the force points
    /// toward `x2`. Swapping the arguments negates the result exactly.
    pub fn pair_force(&self, x1: &NVec, x2: &NVec) -> Result<NVec> {
        let d = sub(x2, x1)?;
        let dist = (d.norm_squared() + self.softening * self.softening).sqrt();
        let coef = self.G * self.mass * self.mass / (dist * dist * dist);
        Ok(d * coef)
    }

    /// Net force on particle `i` under the configured pairing
    fn net_force_on(&self, i: usize, particles: &[Particle]) -> Result<NVec> {
        let xi = particles[i].position();
        let mut total = NVec::zeros(xi.len());
        let first = match self.pairing {
            ForcePairing::Symmetric => 0,
            ForcePairing::Reference => i + 1,
        };
        for (j, other) in particles.iter().enumerate().skip(first) {
            if j == i {
                continue;
            }
            let f = self.pair_force(xi, other.position())?;
            add_assign_scaled(&mut total, &f, 1.0)?;
        }
        Ok(total)
    }

    fn accumulate_serial(&self, particles: &[Particle], out: &mut [NVec]) -> Result<()> {
        let n = particles.len();

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            for j in (i + 1)..n {
                let f = self.pair_force(particles[i].position(), particles[j].position())?;
                add_assign_scaled(&mut out[i], &f, 1.0)?;
                if self.pairing == ForcePairing::Symmetric {
                    add_assign_scaled(&mut out[j], &f, -1.0)?;
                }
            }
        }
        Ok(())
    }

    fn accumulate_parallel(&self, particles: &[Particle], out: &mut [NVec]) -> Result<()> {
        // one independent row sum per particle, no shared accumulators
        let totals = (0..particles.len())
            .into_par_iter()
            .map(|i| self.net_force_on(i, particles))
            .collect::<Result<Vec<NVec>>>()?;

        for (acc, f) in out.iter_mut().zip(totals.iter()) {
            add_assign_scaled(acc, f, 1.0)?;
        }
        Ok(())
    }
}

impl ForceTerm for SoftenedGravity {
    fn accumulate(&self, particles: &[Particle], out: &mut [NVec]) -> Result<()> {
        check_buffer(particles, out)?;
        if particles.len() < 2 {
            return Ok(());
        }
        match self.evaluation {
            ForceEvaluation::Serial => self.accumulate_serial(particles, out),
            ForceEvaluation::Parallel => self.accumulate_parallel(particles, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gravity(pairing: ForcePairing, evaluation: ForceEvaluation) -> SoftenedGravity {
        SoftenedGravity {
            G: 1.0,
            mass: 1.0,
            softening: 0.1,
            pairing,
            evaluation,
        }
    }

    fn v(c: &[f64]) -> NVec {
        NVec::from_column_slice(c)
    }

    #[test]
    fn pair_force_matches_formula() {
        let g = gravity(ForcePairing::Symmetric, ForceEvaluation::Serial);
        let f = g.pair_force(&v(&[0.0, 0.0, 0.0]), &v(&[2.0, 0.0, 0.0])).unwrap();
        let dist = (4.0f64 + 0.01).sqrt();
        assert!((f[0] - 2.0 / dist.powi(3)).abs() < 1e-15);
        assert_eq!(f[1], 0.0);
        assert_eq!(f[2], 0.0);
    }

    #[test]
    fn coincident_particles_feel_no_force() {
        let g = gravity(ForcePairing::Symmetric, ForceEvaluation::Serial);
        let f = g.pair_force(&v(&[1.0, 1.0]), &v(&[1.0, 1.0])).unwrap();
        assert!(f.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn serial_and_parallel_agree() {
        let ps: Vec<Particle> = (0..12)
            .map(|i| {
                let t = i as f64;
                Particle::at_rest(v(&[(t * 0.37).sin() * 3.0, (t * 0.13).cos() * 3.0, (t * 0.7).sin()]))
            })
            .collect();

        for pairing in [ForcePairing::Symmetric, ForcePairing::Reference] {
            let mut serial = vec![NVec::zeros(3); ps.len()];
            let mut parallel = vec![NVec::zeros(3); ps.len()];
            gravity(pairing, ForceEvaluation::Serial).accumulate(&ps, &mut serial).unwrap();
            gravity(pairing, ForceEvaluation::Parallel).accumulate(&ps, &mut parallel).unwrap();
            for (a, b) in serial.iter().zip(parallel.iter()) {
                assert!((a - b).norm() < 1e-12, "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn reference_pairing_leaves_last_particle_untouched() {
        let ps = vec![Particle::at_rest(v(&[1.0, 0.0])), Particle::at_rest(v(&[-1.0, 0.0]))];
        let mut out = vec![NVec::zeros(2); 2];
        gravity(ForcePairing::Reference, ForceEvaluation::Serial)
            .accumulate(&ps, &mut out)
            .unwrap();
        assert!(out[0][0] < 0.0);
        assert_eq!(out[1], NVec::zeros(2));
    }

    #[test]
    fn force_set_zeroes_before_accumulating() {
        let set = ForceSet::new().with(gravity(ForcePairing::Symmetric, ForceEvaluation::Serial));
        let ps = vec![Particle::at_rest(v(&[0.0]))];
        let mut out = vec![v(&[5.0])];
        set.accumulate_forces(&ps, &mut out).unwrap();
        assert_eq!(out[0][0], 0.0);
    }

    #[test]
    fn short_force_buffer_is_rejected() {
        let ps: Vec<Particle> = [[1.0, 0.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 2.0, 0.0]]
            .iter()
            .map(|c| Particle::at_rest(v(c)))
            .collect();

        for evaluation in [ForceEvaluation::Serial, ForceEvaluation::Parallel] {
            let set = ForceSet::new().with(gravity(ForcePairing::Symmetric, evaluation));
            let mut out = vec![NVec::zeros(3); 2];
            assert!(
                matches!(
                    set.accumulate_forces(&ps, &mut out),
                    Err(SimError::DimensionMismatch { expected: 3, found: 2 })
                ),
                "{:?} accepted a short buffer",
                evaluation
            );
            let mut out = vec![NVec::zeros(3); 4];
            assert!(gravity(ForcePairing::Symmetric, evaluation).accumulate(&ps, &mut out).is_err());
        }
    }

    /// Constant push along the first axis, used to check that terms add up
    struct UniformField(f64);

    impl ForceTerm for UniformField {
        fn accumulate(&self, _particles: &[Particle], out: &mut [NVec]) -> Result<()> {
            for f in out.iter_mut() {
                f[0] += self.0;
            }
            Ok(())
        }
    }

    #[test]
    fn force_set_sums_all_terms() {
        let ps = vec![Particle::at_rest(v(&[1.0, 0.0])), Particle::at_rest(v(&[-1.0, 0.0]))];
        let g = gravity(ForcePairing::Symmetric, ForceEvaluation::Serial);

        let mut gravity_only = vec![NVec::zeros(2); 2];
        ForceSet::new().with(g.clone()).accumulate_forces(&ps, &mut gravity_only).unwrap();

        let set = ForceSet::new().with(g).with(UniformField(0.25)).with(UniformField(0.5));
        assert_eq!(set.len(), 3);
        let mut combined = vec![NVec::zeros(2); 2];
        set.accumulate_forces(&ps, &mut combined).unwrap();

        for (a, b) in gravity_only.iter().zip(combined.iter()) {
            assert!((b[0] - (a[0] + 0.75)).abs() < 1e-15);
            assert_eq!(b[1], a[1]);
        }
    }
}
