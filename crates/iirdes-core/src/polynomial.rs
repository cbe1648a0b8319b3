//! Polynomial Algebra
//!
//! Coefficient-sequence routines backing the biquad factor machinery:
//! convolution products, synthetic division, a numerically careful quadratic
//! solver, and Bairstow-style quartic splitting. Except where noted,
//! coefficient slices are in **ascending** power order (`c[0] + c[1]*x + ...`),
//! matching how factors store their numerators and denominators.
//!
//! The quadratic solver classifies its result (conjugate pair, repeated real,
//! distinct reals, or a degenerate case) because the caller needs to know
//! whether to book the roots as a [`ConjugatePair`] or as singles.
//!
//! ## Example
//!
//! ```rust
//! use iirdes_core::polynomial::{multiply, solve_quadratic, QuadraticRoots};
//!
//! let product = multiply(&[1.0, 1.0], &[1.0, 1.0]);
//! assert_eq!(product, vec![1.0, 2.0, 1.0]);
//!
//! // x^2 + 1 = 0 -> +/- j
//! match solve_quadratic(1.0, 0.0, 1.0, 1e-9) {
//!     QuadraticRoots::Conjugate(pair) => assert_eq!(pair.value().im, 1.0),
//!     other => panic!("expected conjugate pair, got {:?}", other),
//! }
//! ```

use crate::pole_zero::ConjugatePair;
use num_complex::Complex64;

/// Iteration budget for the quartic-splitting refinement.
pub const QUARTIC_MAX_ITERATIONS: usize = 20;

/// Multiply two polynomials given as ascending coefficient sequences.
///
/// Result length is `p.len() + q.len() - 1`.
pub fn multiply(p: &[f64], q: &[f64]) -> Vec<f64> {
    if p.is_empty() || q.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; p.len() + q.len() - 1];
    for (i, &pi) in p.iter().enumerate() {
        for (j, &qj) in q.iter().enumerate() {
            out[i + j] += pi * qj;
        }
    }
    out
}

/// Build the monic polynomial with the given roots.
///
/// Returns coefficients **highest power first**. The root set must be closed
/// under conjugation (lone complex roots would produce complex coefficients;
/// only the real parts are kept).
pub fn roots_to_polynomial(roots: &[Complex64]) -> Vec<f64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        // Multiply the running polynomial by (x - root).
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }
    coeffs.iter().map(|c| c.re).collect()
}

/// Divide `u` by `v` (both ascending), returning `(quotient, remainder)`.
///
/// The divisor's leading coefficient must be nonzero. The remainder has
/// length `v.len() - 1` (possibly with zero entries).
///
/// # Panics
///
/// Panics if `v` is empty, its leading coefficient is zero, or
/// `u.len() < v.len()`.
pub fn divide(u: &[f64], v: &[f64]) -> (Vec<f64>, Vec<f64>) {
    assert!(!v.is_empty(), "divisor must not be empty");
    let vl = *v.last().unwrap();
    assert!(vl != 0.0, "divisor leading coefficient must be nonzero");
    assert!(u.len() >= v.len(), "dividend degree below divisor degree");

    let mut rem = u.to_vec();
    let qlen = u.len() - v.len() + 1;
    let mut quot = vec![0.0; qlen];
    for k in (0..qlen).rev() {
        let q = rem[k + v.len() - 1] / vl;
        quot[k] = q;
        for (j, &vj) in v.iter().enumerate() {
            rem[k + j] -= q * vj;
        }
    }
    rem.truncate(v.len() - 1);
    (quot, rem)
}

/// Evaluate an ascending coefficient sequence at a complex point.
pub fn eval(coeffs: &[f64], x: Complex64) -> Complex64 {
    let mut acc = Complex64::new(0.0, 0.0);
    for &c in coeffs.iter().rev() {
        acc = acc * x + c;
    }
    acc
}

/// Classified result of solving `a*x^2 + b*x + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuadraticRoots {
    /// Negative discriminant: a complex-conjugate pair.
    Conjugate(ConjugatePair),
    /// Two distinct real roots.
    DistinctReal(f64, f64),
    /// A repeated real root.
    RepeatedReal(f64),
    /// Degenerate (effectively linear): one finite real root.
    SingleReal(f64),
    /// Degenerate: no finite root at all (constant, or identically zero).
    NoFiniteRoot,
}

impl QuadraticRoots {
    /// Number of finite roots in this classification.
    pub fn count(&self) -> usize {
        match self {
            QuadraticRoots::Conjugate(_)
            | QuadraticRoots::DistinctReal(_, _)
            | QuadraticRoots::RepeatedReal(_) => 2,
            QuadraticRoots::SingleReal(_) => 1,
            QuadraticRoots::NoFiniteRoot => 0,
        }
    }
}

/// Solve `a*x^2 + b*x + c = 0`, treating magnitudes below `eps` as zero.
///
/// Every near-zero combination of the three coefficients has its own closed
/// form; the general case classifies by discriminant and uses the
/// cancellation-avoiding `q = -(b + sign(b)*sqrt(disc))/2` formulation for
/// distinct real roots.
pub fn solve_quadratic(a: f64, b: f64, c: f64, eps: f64) -> QuadraticRoots {
    let a0 = a.abs() <= eps;
    let b0 = b.abs() <= eps;
    let c0 = c.abs() <= eps;

    match (a0, b0, c0) {
        // Identically zero: every x is a root, none is distinguished.
        (true, true, true) => {
            tracing::warn!("solve_quadratic on an identically zero polynomial");
            QuadraticRoots::NoFiniteRoot
        }
        // Nonzero constant: no root.
        (true, true, false) => QuadraticRoots::NoFiniteRoot,
        // b*x = 0.
        (true, false, true) => QuadraticRoots::SingleReal(0.0),
        // Linear: b*x + c = 0.
        (true, false, false) => QuadraticRoots::SingleReal(-c / b),
        // a*x^2 = 0.
        (false, true, true) => QuadraticRoots::RepeatedReal(0.0),
        // a*x^2 + c = 0: pure square root, real or imaginary.
        (false, true, false) => {
            let r = -c / a;
            if r > 0.0 {
                let s = r.sqrt();
                QuadraticRoots::DistinctReal(s, -s)
            } else {
                QuadraticRoots::Conjugate(ConjugatePair::new(0.0, (-r).sqrt()))
            }
        }
        // x * (a*x + b) = 0.
        (false, false, true) => QuadraticRoots::DistinctReal(0.0, -b / a),
        // Full quadratic.
        (false, false, false) => {
            let disc = b * b - 4.0 * a * c;
            if disc < -eps {
                QuadraticRoots::Conjugate(ConjugatePair::new(
                    -b / (2.0 * a),
                    (-disc).sqrt() / (2.0 * a).abs(),
                ))
            } else if disc.abs() <= eps {
                QuadraticRoots::RepeatedReal(-b / (2.0 * a))
            } else {
                let q = -0.5 * (b + b.signum() * disc.sqrt());
                QuadraticRoots::DistinctReal(q / a, c / q)
            }
        }
    }
}

/// Result of splitting a quartic into two quadratic factors.
///
/// Both factors are ascending `[c0, c1, c2]`. Their product reproduces the
/// input quartic exactly when `converged` is true, and to the best available
/// precision otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuarticFactors {
    pub first: [f64; 3],
    pub second: [f64; 3],
    /// False if the refinement exhausted its iteration budget; the factors
    /// are then the last (best-effort) estimate.
    pub converged: bool,
    pub iterations: usize,
}

/// Split a quartic (ascending, 5 coefficients, nonzero leading term) into two
/// quadratics by Bairstow-style Newton refinement of a trial divisor
/// `x^2 + u*x + v`.
///
/// Convergence requires both corrections to fall below `eps` relative to the
/// current values, within [`QUARTIC_MAX_ITERATIONS`] steps. Non-convergence
/// is recoverable: the last estimate is returned with `converged == false`
/// and a warning is logged, so callers can decide whether degraded precision
/// matters.
///
/// # Panics
///
/// Panics if the leading coefficient is zero.
pub fn factor_quartic(coeffs: &[f64; 5], eps: f64) -> QuarticFactors {
    let lead = coeffs[4];
    assert!(lead != 0.0, "quartic leading coefficient must be nonzero");

    // Normalize to a monic descending quartic x^4 + p3 x^3 + p2 x^2 + p1 x + p0.
    let p3 = coeffs[3] / lead;
    let p2 = coeffs[2] / lead;
    let p1 = coeffs[1] / lead;
    let p0 = coeffs[0] / lead;

    // Asymmetric start: u = p3/2 sits on a line where the Jacobian loses
    // rank for some quartics, so offset away from it.
    let mut u = p3 / 2.0 + 1.0;
    let mut v = p0.abs().sqrt() + 0.5;
    let mut converged = false;
    let mut iterations = 0;
    let mut q1 = 0.0;
    let mut q0 = 0.0;

    for iter in 0..QUARTIC_MAX_ITERATIONS {
        iterations = iter + 1;

        // Synthetic division of the quartic by x^2 + u*x + v:
        // quotient x^2 + q1*x + q0, remainder r1*x + r0.
        q1 = p3 - u;
        q0 = p2 - v - u * q1;
        let r1 = p1 - u * q0 - v * q1;
        let r0 = p0 - v * q0;

        // Newton step on (r1, r0) as functions of (u, v).
        let dr1_du = -q0 + u * q1 - u * u + v;
        let dr1_dv = u - q1;
        let dr0_du = v * q1 - v * u;
        let dr0_dv = -q0 + v;

        let det = dr1_du * dr0_dv - dr1_dv * dr0_du;
        if det.abs() < 1e-12 * (1.0 + u.abs() + v.abs()) {
            // Singular Jacobian: nudge the divisor off the degenerate spot.
            u += 0.5;
            v += 1.0;
            continue;
        }
        let du = (-r1 * dr0_dv + r0 * dr1_dv) / det;
        let dv = (-dr1_du * r0 + dr0_du * r1) / det;

        u += du;
        v += dv;

        if du.abs() <= eps * u.abs().max(1.0) && dv.abs() <= eps * v.abs().max(1.0) {
            // Recompute the quotient against the settled divisor.
            q1 = p3 - u;
            q0 = p2 - v - u * q1;
            converged = true;
            break;
        }
    }

    if !converged {
        // Align the quotient with the final divisor estimate.
        q1 = p3 - u;
        q0 = p2 - v - u * q1;
        tracing::warn!(
            iterations,
            "quartic factoring did not converge; using last estimate"
        );
    }

    QuarticFactors {
        first: [v, u, 1.0],
        second: [lead * q0, lead * q1, lead],
        converged,
        iterations,
    }
}
