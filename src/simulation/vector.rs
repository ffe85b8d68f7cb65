//! Fixed-dimension vector helpers
//!
//! Thin wrappers over nalgebra that turn a length mismatch into
//! [`SimError::DimensionMismatch`] instead of a panic.

use crate::error::{Result, SimError};
use crate::simulation::states::NVec;

/// Fail unless `a` and `b` have the same length
pub fn check_dims(a: &NVec, b: &NVec) -> Result<()> {
    if a.len() != b.len() {
        return Err(SimError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(())
}

/// c[i] = a[i] + b[i]
pub fn add(a: &NVec, b: &NVec) -> Result<NVec> {
    check_dims(a, b)?;
    Ok(a + b)
}

/// c[i] = a[i] - b[i]
pub fn sub(a: &NVec, b: &NVec) -> Result<NVec> {
    check_dims(a, b)?;
    Ok(a - b)
}

/// c[i] = v[i] * s
pub fn scale(v: &NVec, s: f64) -> NVec {
    v * s
}

/// acc[i] += v[i] * s, in place
pub fn add_assign_scaled(acc: &mut NVec, v: &NVec, s: f64) -> Result<()> {
    check_dims(acc, v)?;
    acc.axpy(s, v, 1.0);
    Ok(())
}
