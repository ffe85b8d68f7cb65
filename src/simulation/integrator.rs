//! Fixed-step time integrator for the particle system
//!
//! Semi-implicit (symplectic) Euler: every velocity is kicked with the forces
//! of the current positions, then every position drifts with the new velocity.

use crate::error::{Result, SimError};
use crate::simulation::states::{NVec, SimulationState};
use crate::simulation::vector::check_dims;

/// Advance `state` by one step of size `h`.
///
/// `forces[i]` is the net force on particle `i` evaluated at the current
/// positions; it is divided by `mass` to get the acceleration. Radii are
/// refreshed as part of the drift, and `t`/`step` advance by one step.
pub fn semi_implicit_euler(state: &mut SimulationState, forces: &[NVec], mass: f64, h: f64) -> Result<()> {
    if forces.len() != state.particles.len() {
        return Err(SimError::DimensionMismatch {
            expected: state.particles.len(),
            found: forces.len(),
        });
    }

    // all dimensions checked before any particle moves
    for (p, f) in state.particles.iter().zip(forces.iter()) {
        check_dims(p.velocity(), f)?;
    }

    let inv_m = mass.recip();

    // Kick: v_n+1 = v_n + dt * F_n / m, for every particle before any drift
    for (p, f) in state.particles.iter_mut().zip(forces.iter()) {
        p.kick(&(f * inv_m), h)?;
    }

    // Drift: x_n+1 = x_n + dt * v_n+1
    for p in state.particles.iter_mut() {
        p.drift(h);
    }

    state.t += h;
    state.step += 1;
    Ok(())
}
