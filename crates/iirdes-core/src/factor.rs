//! Biquad Factor — One Second-Order Section
//!
//! A [`Factor`] is a transfer-function section with numerator and denominator
//! polynomials of order <= 2 plus a scalar gain. Poles and zeros are derived
//! quantities: they are re-solved whenever a polynomial changes, and a
//! polynomial is regenerated whenever one of its roots is moved, so the two
//! representations stay consistent to within the configured tolerance.
//!
//! The analog (s-domain) and digital (z-domain) variants of the source's
//! class hierarchy are collapsed into a [`Domain`] tag. The conventions
//! differ in two places:
//!
//! - coefficients are ascending in `s` for analog factors and ascending in
//!   `z^-1` for digital ones;
//! - an order deficit between numerator and denominator puts roots at
//!   infinity in the s-domain and at the origin in the z-domain.
//!
//! Digital factors additionally carry a ring-buffer delay line and evaluate
//! samples with the direct-form-II recursion.
//!
//! ## Example
//!
//! ```rust
//! use iirdes_core::config::Tolerances;
//! use iirdes_core::factor::{Domain, Factor};
//!
//! // H(z) = 1 / (1 - 0.5 z^-1): a single decaying pole at z = 0.5.
//! let mut factor = Factor::new(
//!     Domain::Digital,
//!     vec![1.0],
//!     vec![1.0, -0.5],
//!     1.0,
//!     Tolerances::default(),
//! )
//! .unwrap();
//!
//! let y0 = factor.compute_output(1.0);
//! let y1 = factor.compute_output(0.0);
//! assert!((y0 - 1.0).abs() < 1e-12);
//! assert!((y1 - 0.5).abs() < 1e-12);
//! ```

use crate::config::Tolerances;
use crate::error::FilterError;
use crate::polynomial::{self, QuadraticRoots};
use crate::pole_zero::RootLoc;
use num_complex::Complex64;

/// Transfer-function domain of a factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// s-domain (analog). No per-sample state.
    Analog,
    /// z-domain (digital). Carries a delay line for direct-form-II evaluation.
    Digital,
}

/// Ring-buffer delay line for direct-form-II state.
///
/// `get(0)` is the most recently pushed value; pushing rotates the buffer so
/// the oldest entry is overwritten. All operations are no-ops on a
/// zero-length line (order-0 sections have no state).
#[derive(Debug, Clone, PartialEq)]
struct DelayLine {
    buf: Vec<f64>,
    first: usize,
}

impl DelayLine {
    fn new(len: usize) -> Self {
        Self {
            buf: vec![0.0; len],
            first: 0,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    fn get(&self, i: usize) -> f64 {
        self.buf[(self.first + i) % self.buf.len()]
    }

    #[inline]
    fn push(&mut self, value: f64) {
        let n = self.buf.len();
        if n == 0 {
            return;
        }
        self.first = (self.first + n - 1) % n;
        self.buf[self.first] = value;
    }

    fn reset(&mut self) {
        self.buf.fill(0.0);
        self.first = 0;
    }

    fn snapshot(&self) -> Vec<f64> {
        (0..self.buf.len()).map(|i| self.get(i)).collect()
    }

    fn install(&mut self, values: &[f64]) {
        self.buf.clear();
        self.buf.extend_from_slice(values);
        self.first = 0;
    }
}

/// A numerator/denominator/gain section with derived poles and zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    domain: Domain,
    numerator: Vec<f64>,
    denominator: Vec<f64>,
    gain: f64,
    tol: Tolerances,
    zeros: Vec<RootLoc>,
    poles: Vec<RootLoc>,
    state: DelayLine,
}

impl Factor {
    /// Construct a factor and immediately solve its poles and zeros.
    ///
    /// Coefficients are ascending (in `s` or `z^-1` depending on `domain`)
    /// and must have length 1 to 3; anything longer is an
    /// [`FilterError::UnsupportedOrder`].
    pub fn new(
        domain: Domain,
        numerator: Vec<f64>,
        denominator: Vec<f64>,
        gain: f64,
        tol: Tolerances,
    ) -> Result<Self, FilterError> {
        assert!(!numerator.is_empty(), "numerator must not be empty");
        assert!(!denominator.is_empty(), "denominator must not be empty");
        if numerator.len() > 3 {
            return Err(FilterError::UnsupportedOrder(numerator.len()));
        }
        if denominator.len() > 3 {
            return Err(FilterError::UnsupportedOrder(denominator.len()));
        }

        let state_len = numerator.len().max(denominator.len()) - 1;
        let mut factor = Self {
            domain,
            numerator,
            denominator,
            gain,
            tol,
            zeros: Vec::new(),
            poles: Vec::new(),
            state: DelayLine::new(match domain {
                Domain::Analog => 0,
                Domain::Digital => state_len,
            }),
        };
        factor.solve_roots();
        Ok(factor)
    }

    /// The identity section: `H = 1`.
    pub fn unity(domain: Domain, tol: Tolerances) -> Self {
        Self::new(domain, vec![1.0], vec![1.0], 1.0, tol).unwrap()
    }

    /// A pure gain section (used as the bilinear stage's aggregate-gain
    /// pseudo-factor).
    pub fn gain_only(domain: Domain, gain: f64, tol: Tolerances) -> Self {
        Self::new(domain, vec![1.0], vec![1.0], gain, tol).unwrap()
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn numerator(&self) -> &[f64] {
        &self.numerator
    }

    pub fn denominator(&self) -> &[f64] {
        &self.denominator
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn set_gain(&mut self, gain: f64) {
        self.gain = gain;
    }

    /// Section order: `max(num_len, den_len) - 1`.
    pub fn order(&self) -> usize {
        self.numerator.len().max(self.denominator.len()) - 1
    }

    /// The zero slots (conjugate pairs occupy one slot).
    pub fn zeros(&self) -> &[RootLoc] {
        &self.zeros
    }

    /// The pole slots (conjugate pairs occupy one slot).
    pub fn poles(&self) -> &[RootLoc] {
        &self.poles
    }

    /// Concrete zero locations (pairs expanded).
    pub fn zero_locations(&self) -> Vec<Complex64> {
        let mut out = Vec::new();
        for slot in &self.zeros {
            slot.push_locations(&mut out);
        }
        out
    }

    /// Concrete pole locations (pairs expanded).
    pub fn pole_locations(&self) -> Vec<Complex64> {
        let mut out = Vec::new();
        for slot in &self.poles {
            slot.push_locations(&mut out);
        }
        out
    }

    /// True if `loc` coincides with one of this factor's poles.
    pub fn has_pole(&self, loc: Complex64) -> bool {
        self.poles.iter().any(|s| s.matches(loc, self.tol.tiny))
    }

    /// True if `loc` coincides with one of this factor's zeros.
    pub fn has_zero(&self, loc: Complex64) -> bool {
        self.zeros.iter().any(|s| s.matches(loc, self.tol.tiny))
    }

    /// Replace the numerator polynomial (ascending, length 1-3) and re-solve
    /// the zeros. The delay line is reallocated if the section order changed.
    pub fn set_numerator(&mut self, numerator: Vec<f64>) -> Result<(), FilterError> {
        assert!(!numerator.is_empty(), "numerator must not be empty");
        if numerator.len() > 3 {
            return Err(FilterError::UnsupportedOrder(numerator.len()));
        }
        self.numerator = numerator;
        self.refresh();
        Ok(())
    }

    /// Replace the denominator polynomial (ascending, length 1-3) and
    /// re-solve the poles. The delay line is reallocated if the section
    /// order changed.
    pub fn set_denominator(&mut self, denominator: Vec<f64>) -> Result<(), FilterError> {
        assert!(!denominator.is_empty(), "denominator must not be empty");
        if denominator.len() > 3 {
            return Err(FilterError::UnsupportedOrder(denominator.len()));
        }
        self.denominator = denominator;
        self.refresh();
        Ok(())
    }

    /// Move the pole at `slot` to `loc` and regenerate the denominator.
    ///
    /// A `Real` slot stays on the real axis (only `loc.re` is used); a
    /// conjugate-pair slot resets its representative and the mirror root
    /// follows. Moving a root at infinity to a finite location raises the
    /// polynomial order, which fails with `UnsupportedOrder` beyond
    /// quadratic.
    pub fn move_pole(&mut self, slot: usize, loc: Complex64) -> Result<(), FilterError> {
        if slot >= self.poles.len() {
            return Err(FilterError::ElementNotFound { factor: 0, slot });
        }
        // Work on a copy so a failed rebuild leaves the factor untouched;
        // refresh() re-derives the slots from the new polynomial.
        let mut slots = self.poles.clone();
        Self::move_slot(&mut slots, slot, loc);
        let scale = leading_coefficient(&self.denominator, self.domain);
        self.denominator = self.rebuild_from_slots(&slots, scale)?;
        self.refresh();
        Ok(())
    }

    /// Move the zero at `slot` to `loc` and regenerate the numerator.
    pub fn move_zero(&mut self, slot: usize, loc: Complex64) -> Result<(), FilterError> {
        if slot >= self.zeros.len() {
            return Err(FilterError::ElementNotFound { factor: 0, slot });
        }
        let mut slots = self.zeros.clone();
        Self::move_slot(&mut slots, slot, loc);
        let scale = leading_coefficient(&self.numerator, self.domain);
        self.numerator = self.rebuild_from_slots(&slots, scale)?;
        self.refresh();
        Ok(())
    }

    fn move_slot(slots: &mut [RootLoc], slot: usize, loc: Complex64) {
        match &mut slots[slot] {
            RootLoc::Real(r) => *r = loc.re,
            RootLoc::Pair(pair) => pair.set_value(loc),
            RootLoc::Infinity => {
                slots[slot] = RootLoc::Real(loc.re);
            }
        }
    }

    /// Rebuild an ascending polynomial from the finite roots in `slots`,
    /// preserving `scale` as the leading coefficient.
    fn rebuild_from_slots(&self, slots: &[RootLoc], scale: f64) -> Result<Vec<f64>, FilterError> {
        let mut roots = Vec::new();
        for slot in slots {
            if let RootLoc::Infinity = slot {
                continue;
            }
            slot.push_locations(&mut roots);
        }
        if roots.len() > 2 {
            return Err(FilterError::UnsupportedOrder(roots.len() + 1));
        }
        // highest power first, monic
        let monic = polynomial::roots_to_polynomial(&roots);
        let coeffs: Vec<f64> = match self.domain {
            // Ascending in s.
            Domain::Analog => monic.iter().rev().map(|c| c * scale).collect(),
            // A descending z polynomial reads directly as ascending z^-1.
            Domain::Digital => monic.iter().map(|c| c * scale).collect(),
        };
        Ok(coeffs)
    }

    /// Re-solve roots and reallocate state after a polynomial change.
    fn refresh(&mut self) {
        self.solve_roots();
        if let Domain::Digital = self.domain {
            let want = self.order();
            if self.state.len() != want {
                self.state = DelayLine::new(want);
            }
        }
    }

    fn solve_roots(&mut self) {
        match self.domain {
            Domain::Analog => {
                let mut zeros = solve_analog(&self.numerator, self.tol.tiny);
                let mut poles = solve_analog(&self.denominator, self.tol.tiny);
                let nz: usize = zeros.iter().map(|s| s.count()).sum();
                let np: usize = poles.iter().map(|s| s.count()).sum();
                // Roots pushed to infinity make up any order deficit.
                for _ in nz..np {
                    zeros.push(RootLoc::Infinity);
                }
                for _ in np..nz {
                    poles.push(RootLoc::Infinity);
                }
                self.zeros = zeros;
                self.poles = poles;
            }
            Domain::Digital => {
                let len = self.numerator.len().max(self.denominator.len());
                self.zeros = solve_digital(&self.numerator, len, self.tol.tiny);
                self.poles = solve_digital(&self.denominator, len, self.tol.tiny);
            }
        }
    }

    // ------------------------------------------------------------------
    // Digital evaluation
    // ------------------------------------------------------------------

    /// Direct-form-II recursion for one sample (digital factors only).
    ///
    /// The input is scaled by the gain, the new internal value is formed by
    /// subtracting the weighted feedback of prior states and dividing by the
    /// leading denominator coefficient, the output is the weighted sum of
    /// numerator taps over current and past states, and the delay line then
    /// rotates.
    pub fn compute_output(&mut self, input: f64) -> f64 {
        debug_assert!(matches!(self.domain, Domain::Digital));
        if self.state.len() == 0 {
            return self.gain * input * self.numerator[0] / self.denominator[0];
        }

        let mut acc = self.gain * input;
        for i in 1..self.denominator.len() {
            acc -= self.denominator[i] * self.state.get(i - 1);
        }
        let w = acc / self.denominator[0];

        let mut output = self.numerator[0] * w;
        for i in 1..self.numerator.len() {
            output += self.numerator[i] * self.state.get(i - 1);
        }

        self.state.push(w);
        output
    }

    /// Zero the delay line.
    pub fn reset_state(&mut self) {
        self.state.reset();
    }

    /// Current delay-line contents, most recent first.
    pub fn state(&self) -> Vec<f64> {
        self.state.snapshot()
    }

    /// Install a delay-line state (most recent first). The length must match
    /// the section order exactly.
    pub fn set_state(&mut self, values: &[f64]) -> Result<(), FilterError> {
        if values.len() != self.state.len() {
            return Err(FilterError::InvalidStateSize {
                expected: self.state.len(),
                got: values.len(),
            });
        }
        self.state.install(values);
        Ok(())
    }

    /// True if every pole lies strictly inside the unit circle (digital
    /// stability criterion).
    pub fn is_stable(&self) -> bool {
        self.pole_locations()
            .iter()
            .all(|p| !p.is_infinite() && p.norm() < 1.0)
    }
}

/// The coefficient of the highest power present: the last nonzero entry of
/// an ascending-in-s sequence, the first of an ascending-in-`z^-1` one.
fn leading_coefficient(coeffs: &[f64], domain: Domain) -> f64 {
    let found = match domain {
        Domain::Analog => coeffs.iter().rev().find(|c| **c != 0.0),
        Domain::Digital => coeffs.iter().find(|c| **c != 0.0),
    };
    found.copied().unwrap_or(1.0)
}

/// Solve an ascending-in-s polynomial (length <= 3) for its finite roots.
fn solve_analog(coeffs: &[f64], eps: f64) -> Vec<RootLoc> {
    match coeffs.len() {
        1 => Vec::new(),
        2 => {
            if coeffs[1].abs() <= eps {
                Vec::new()
            } else {
                vec![RootLoc::Real(-coeffs[0] / coeffs[1])]
            }
        }
        _ => classify(polynomial::solve_quadratic(
            coeffs[2], coeffs[1], coeffs[0], eps,
        )),
    }
}

/// Solve an ascending-in-`z^-1` polynomial for its roots in `z`.
///
/// The sequence is padded to the section length `len`, under which it reads
/// directly as a descending polynomial in `z`; order deficits then surface
/// as roots at the origin.
fn solve_digital(coeffs: &[f64], len: usize, eps: f64) -> Vec<RootLoc> {
    let mut c = [0.0; 3];
    c[..coeffs.len()].copy_from_slice(coeffs);
    match len {
        1 => Vec::new(),
        2 => {
            if c[0].abs() <= eps {
                Vec::new()
            } else {
                vec![RootLoc::Real(-c[1] / c[0])]
            }
        }
        _ => classify(polynomial::solve_quadratic(c[0], c[1], c[2], eps)),
    }
}

fn classify(roots: QuadraticRoots) -> Vec<RootLoc> {
    match roots {
        QuadraticRoots::Conjugate(pair) => vec![RootLoc::Pair(pair)],
        QuadraticRoots::DistinctReal(a, b) => vec![RootLoc::Real(a), RootLoc::Real(b)],
        QuadraticRoots::RepeatedReal(r) => vec![RootLoc::Real(r), RootLoc::Real(r)],
        QuadraticRoots::SingleReal(r) => vec![RootLoc::Real(r)],
        QuadraticRoots::NoFiniteRoot => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::eval;

    fn tol() -> Tolerances {
        Tolerances::default()
    }

    #[test]
    fn test_rejects_cubic() {
        let err = Factor::new(
            Domain::Analog,
            vec![1.0, 0.0, 0.0, 1.0],
            vec![1.0],
            1.0,
            tol(),
        )
        .unwrap_err();
        assert_eq!(err, FilterError::UnsupportedOrder(4));
    }

    #[test]
    fn test_analog_zeros_at_infinity() {
        // 1 / (1 + 2s + s^2): two poles at -1, both zeros at infinity.
        let factor = Factor::new(
            Domain::Analog,
            vec![1.0],
            vec![1.0, 2.0, 1.0],
            1.0,
            tol(),
        )
        .unwrap();

        let poles = factor.pole_locations();
        assert_eq!(poles.len(), 2);
        for p in &poles {
            assert!((p.re + 1.0).abs() < 1e-6, "pole {:?}", p);
            assert!(p.im.abs() < 1e-6);
        }
        let zeros = factor.zero_locations();
        assert_eq!(zeros.len(), 2);
        assert!(zeros.iter().all(|z| z.is_infinite()));
    }

    #[test]
    fn test_analog_conjugate_poles() {
        // 1 / (1 + s^2): poles at +/- j.
        let factor = Factor::new(Domain::Analog, vec![1.0], vec![1.0, 0.0, 1.0], 1.0, tol())
            .unwrap();
        assert_eq!(factor.poles().len(), 1);
        match factor.poles()[0] {
            RootLoc::Pair(pair) => {
                assert!((pair.value() - Complex64::new(0.0, 1.0)).norm() < 1e-9);
            }
            other => panic!("expected pair, got {:?}", other),
        }
    }

    #[test]
    fn test_digital_zeros_at_origin() {
        // 1 / (1 + d1 z^-1 + d2 z^-2): zeros fall at z = 0.
        let factor = Factor::new(
            Domain::Digital,
            vec![1.0],
            vec![1.0, -0.2, 0.4],
            1.0,
            tol(),
        )
        .unwrap();
        let zeros = factor.zero_locations();
        assert_eq!(zeros.len(), 2);
        for z in &zeros {
            assert!(z.norm() < 1e-9, "origin zero expected, got {:?}", z);
        }
    }

    #[test]
    fn test_move_pole_round_trip() {
        // Single real pole at -1; move it to -3 and check both views agree.
        let mut factor =
            Factor::new(Domain::Analog, vec![1.0], vec![1.0, 1.0], 1.0, tol()).unwrap();
        factor.move_pole(0, Complex64::new(-3.0, 0.0)).unwrap();

        let poles = factor.pole_locations();
        assert_eq!(poles.len(), 1);
        assert!((poles[0].re + 3.0).abs() < 1e-6);
        assert!(poles[0].im.abs() < 1e-6);

        // Regenerated denominator vanishes at the new pole.
        let at_pole = eval(factor.denominator(), Complex64::new(-3.0, 0.0));
        assert!(at_pole.norm() < 1e-9, "residual {:?}", at_pole);
    }

    #[test]
    fn test_move_pair_regenerates_conjugate() {
        let mut factor = Factor::new(Domain::Analog, vec![1.0], vec![2.0, 2.0, 1.0], 1.0, tol())
            .unwrap();
        // Poles at -1 +/- j; move the pair to -0.5 +/- 0.25j.
        factor.move_pole(0, Complex64::new(-0.5, 0.25)).unwrap();
        let den = factor.denominator().to_vec();
        // (s + 0.5)^2 + 0.0625 = s^2 + s + 0.3125, ascending.
        assert!((den[0] - 0.3125).abs() < 1e-9, "{:?}", den);
        assert!((den[1] - 1.0).abs() < 1e-9);
        assert!((den[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_move_missing_slot() {
        let mut factor =
            Factor::new(Domain::Analog, vec![1.0], vec![1.0, 1.0], 1.0, tol()).unwrap();
        let err = factor.move_pole(3, Complex64::new(0.0, 0.0)).unwrap_err();
        assert_eq!(err, FilterError::ElementNotFound { factor: 0, slot: 3 });
    }

    #[test]
    fn test_compute_output_one_pole() {
        // H(z) = 1/(1 - 0.5 z^-1): impulse response 0.5^n.
        let mut factor = Factor::new(
            Domain::Digital,
            vec![1.0],
            vec![1.0, -0.5],
            1.0,
            tol(),
        )
        .unwrap();

        let mut expected = 1.0;
        for n in 0..8 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            let y = factor.compute_output(x);
            assert!((y - expected).abs() < 1e-12, "n={} y={}", n, y);
            expected *= 0.5;
        }
    }

    #[test]
    fn test_compute_output_fir_taps() {
        // H(z) = 0.5 + 0.5 z^-1.
        let mut factor = Factor::new(
            Domain::Digital,
            vec![0.5, 0.5],
            vec![1.0],
            1.0,
            tol(),
        )
        .unwrap();
        assert!((factor.compute_output(1.0) - 0.5).abs() < 1e-12);
        assert!((factor.compute_output(0.0) - 0.5).abs() < 1e-12);
        assert!(factor.compute_output(0.0).abs() < 1e-12);
    }

    #[test]
    fn test_gain_scales_input() {
        let mut factor = Factor::new(
            Domain::Digital,
            vec![1.0, 0.0, 0.0],
            vec![1.0, 0.0, 0.0],
            2.0,
            tol(),
        )
        .unwrap();
        assert!((factor.compute_output(1.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_state_size_checked() {
        let mut factor = Factor::new(
            Domain::Digital,
            vec![1.0, 0.0, 0.5],
            vec![1.0, -0.3, 0.2],
            1.0,
            tol(),
        )
        .unwrap();
        assert_eq!(factor.state().len(), 2);

        let err = factor.set_state(&[1.0]).unwrap_err();
        assert_eq!(err, FilterError::InvalidStateSize { expected: 2, got: 1 });

        factor.set_state(&[0.25, -0.5]).unwrap();
        assert_eq!(factor.state(), vec![0.25, -0.5]);

        factor.reset_state();
        assert_eq!(factor.state(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_state_reallocated_on_order_change() {
        let mut factor = Factor::new(
            Domain::Digital,
            vec![1.0],
            vec![1.0, -0.5],
            1.0,
            tol(),
        )
        .unwrap();
        assert_eq!(factor.state().len(), 1);

        factor.set_denominator(vec![1.0, -0.5, 0.25]).unwrap();
        assert_eq!(factor.state().len(), 2);
    }

    #[test]
    fn test_stability() {
        let stable = Factor::new(
            Domain::Digital,
            vec![1.0],
            vec![1.0, -0.5, 0.25],
            1.0,
            tol(),
        )
        .unwrap();
        assert!(stable.is_stable());

        let unstable = Factor::new(
            Domain::Digital,
            vec![1.0],
            vec![1.0, -3.0, 2.25],
            1.0,
            tol(),
        )
        .unwrap();
        assert!(!unstable.is_stable());
    }

    #[test]
    fn test_membership() {
        let factor =
            Factor::new(Domain::Analog, vec![1.0], vec![1.0, 1.0], 1.0, tol()).unwrap();
        assert!(factor.has_pole(Complex64::new(-1.0, 0.0)));
        assert!(!factor.has_pole(Complex64::new(1.0, 0.0)));
        assert!(factor.has_zero(crate::pole_zero::infinity()));
    }

    #[test]
    fn test_unity_factor() {
        let mut unity = Factor::unity(Domain::Digital, tol());
        assert_eq!(unity.order(), 0);
        assert!((unity.compute_output(0.75) - 0.75).abs() < 1e-12);
    }
}
