//! Numerical Tolerance Configuration
//!
//! The algebra and cascade routines take their tolerances from a
//! [`Tolerances`] value instead of compiled-in constants, so callers (and
//! tests) can tighten or loosen the edge behavior.
//!
//! - `tiny` governs root classification and round-trip checks: coefficients
//!   and discriminants with magnitude below `tiny` are treated as zero.
//! - `delta` governs reporting: a pole and a zero closer than `delta` are
//!   cancelled out of the reported pole/zero lists (the underlying factors
//!   are never modified by this).
//!
//! ## Example
//!
//! ```rust
//! use iirdes_core::config::Tolerances;
//!
//! let tol = Tolerances::default();
//! assert_eq!(tol.tiny, 1e-6);
//! assert_eq!(tol.delta, 0.01);
//!
//! let strict = Tolerances { tiny: 1e-12, ..Default::default() };
//! assert!(strict.tiny < tol.tiny);
//! ```

use serde::{Deserialize, Serialize};

/// Tolerances threaded through the algebra and filter routines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Magnitudes below this are treated as zero (root classification,
    /// degenerate coefficient detection, round-trip checks).
    pub tiny: f64,
    /// Pole/zero pairs closer than this are cancelled from reported lists.
    pub delta: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            tiny: 1e-6,
            delta: 0.01,
        }
    }
}

impl Tolerances {
    /// True if `x` is indistinguishable from zero at this tolerance.
    #[inline]
    pub fn is_zero(&self, x: f64) -> bool {
        x.abs() <= self.tiny
    }
}
