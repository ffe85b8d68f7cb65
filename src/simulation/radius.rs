//! Radius analysis: distance from the origin, ordering by it, and the mass
//! density enclosed by a sphere around the origin.

use std::cmp::Ordering;
use std::f64::consts::PI;

use crate::error::{Result, SimError};
use crate::simulation::states::{NVec, Particle};

/// Euclidean norm of a position
pub fn radius_of(position: &NVec) -> f64 {
    position.norm()
}

/// Stable sort, farthest particle first. NaN radii go to the end
pub fn sort_by_radius_desc(particles: &mut [Particle]) {
    particles.sort_by(|a, b| descending(a.radius(), b.radius()));
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.total_cmp(&a),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

/// Enclosed mass over sphere volume.
///
/// Counts particles with radius strictly below `r`. `r` must be finite and
/// positive; there is no volume to divide by otherwise.
pub fn density_within(r: f64, particles: &[Particle], mass: f64) -> Result<f64> {
    if !(r.is_finite() && r > 0.0) {
        return Err(SimError::NumericDegenerate(format!(
            "density radius must be finite and positive, got {r}"
        )));
    }
    let inside = particles.iter().filter(|p| p.radius() < r).count();
    let volume = 4.0 * PI * r.powi(3) / 3.0;
    Ok(inside as f64 * mass / volume)
}
