//! Digital Filter — z-Domain Cascade with Evaluation
//!
//! A [`DigitalFilter`] is an ordered cascade of z-domain biquad factors. On
//! top of the algebraic container it provides the run-time surface: sample
//! streaming through the direct-form-II sections (in cascade order; the
//! order fixed at design time matters for intermediate rounding), impulse
//! response extraction, and frequency-domain queries evaluated from the
//! pole-zero-gain description.
//!
//! ## Example
//!
//! ```rust,ignore
//! use iirdes_core::prelude::*;
//!
//! let mut filter = design_real_iir(
//!     MappingMethod::Bilinear,
//!     ApproximationMethod::Butterworth,
//!     BandType::Lowpass,
//!     &[0.2, 0.3],
//!     &[0.99, 0.1],
//!     1.0,
//! )
//! .unwrap();
//!
//! let impulse = filter.get_impulse_response();
//! assert_eq!(impulse.len(), 50);
//! ```

use crate::cascade::CascadeCore;
use crate::config::Tolerances;
use crate::error::FilterError;
use crate::factor::{Domain, Factor};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Default number of impulse-response taps.
pub const DEFAULT_IMPULSE_TAPS: usize = 50;
/// Default number of frequency-response grid points.
pub const DEFAULT_RESPONSE_POINTS: usize = 150;

/// A digital (z-domain) cascade of biquad factors with evaluation state.
#[derive(Debug, Clone)]
pub struct DigitalFilter {
    pub(crate) core: CascadeCore,
    impulse_taps: usize,
    response_points: usize,
}

impl DigitalFilter {
    /// Create a filter holding the unit transfer function.
    pub fn new(tol: Tolerances) -> Self {
        Self {
            core: CascadeCore::new(Domain::Digital, tol),
            impulse_taps: DEFAULT_IMPULSE_TAPS,
            response_points: DEFAULT_RESPONSE_POINTS,
        }
    }

    pub fn tolerances(&self) -> Tolerances {
        self.core.tol
    }

    /// Append a factor to the cascade.
    ///
    /// # Panics
    ///
    /// Panics if the factor is not a digital factor.
    pub fn add_factor(&mut self, factor: Factor) {
        self.core.add_factor(factor);
    }

    /// Remove and return the factor at `index`.
    pub fn remove_factor(&mut self, index: usize) -> Factor {
        self.core.remove_factor(index)
    }

    /// Swap in a whole factor list (bilinear mapping stage).
    pub(crate) fn replace_factors(&mut self, factors: Vec<Factor>) {
        self.core.replace_factors(factors);
    }

    /// Reset to the unit transfer function.
    pub fn clear(&mut self) {
        self.core.clear();
    }

    pub fn factors(&self) -> &[Factor] {
        self.core.factors()
    }

    pub fn num_sections(&self) -> usize {
        self.core.len()
    }

    /// Filter order (sum of section orders).
    pub fn order(&self) -> usize {
        self.core.order()
    }

    /// Move the pole addressed by `(factor, slot)` to `loc`.
    pub fn move_pole(
        &mut self,
        factor: usize,
        slot: usize,
        loc: Complex64,
    ) -> Result<(), FilterError> {
        self.core.move_pole(factor, slot, loc)
    }

    /// Move the zero addressed by `(factor, slot)` to `loc`.
    pub fn move_zero(
        &mut self,
        factor: usize,
        slot: usize,
        loc: Complex64,
    ) -> Result<(), FilterError> {
        self.core.move_zero(factor, slot, loc)
    }

    // ------------------------------------------------------------------
    // Aggregate queries
    // ------------------------------------------------------------------

    /// Reported poles (near-coincident pole/zero pairs cancelled).
    pub fn get_poles(&mut self) -> Vec<Complex64> {
        self.core.aggregate().poles.clone()
    }

    /// Reported zeros (near-coincident pole/zero pairs cancelled).
    pub fn get_zeroes(&mut self) -> Vec<Complex64> {
        self.core.aggregate().zeros.clone()
    }

    /// Aggregate numerator (ascending in `z^-1`; gain kept separate).
    pub fn get_numerator(&mut self) -> Vec<f64> {
        self.core.aggregate().numerator.clone()
    }

    /// Aggregate denominator (ascending in `z^-1`).
    pub fn get_denominator(&mut self) -> Vec<f64> {
        self.core.aggregate().denominator.clone()
    }

    /// Aggregate gain: the product of factor gains.
    pub fn get_gain(&mut self) -> f64 {
        self.core.aggregate().gain
    }

    /// True if every section's poles lie strictly inside the unit circle.
    pub fn is_stable(&self) -> bool {
        self.core.factors().iter().all(|f| f.is_stable())
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    /// Filter one sample through the cascade.
    pub fn get_output(&mut self, sample: f64) -> f64 {
        self.core.output_sample(sample)
    }

    /// Filter a block of samples.
    pub fn get_response(&mut self, samples: &[f64]) -> Vec<f64> {
        samples.iter().map(|&s| self.get_output(s)).collect()
    }

    /// Zero every section's delay line.
    pub fn reset_state(&mut self) {
        self.core.reset_state();
    }

    /// Number of taps [`Self::get_impulse_response`] produces.
    pub fn impulse_taps(&self) -> usize {
        self.impulse_taps
    }

    pub fn set_impulse_taps(&mut self, taps: usize) {
        assert!(taps > 0, "impulse response needs at least one tap");
        self.impulse_taps = taps;
    }

    /// Number of grid points [`Self::get_frequency_response`] produces.
    pub fn response_points(&self) -> usize {
        self.response_points
    }

    pub fn set_response_points(&mut self, points: usize) {
        assert!(points > 1, "frequency grid needs at least two points");
        self.response_points = points;
    }

    /// Excite the cascade with a unit impulse and record the output.
    ///
    /// The delay lines are saved and restored around the run, so streaming
    /// evaluation is not perturbed.
    pub fn get_impulse_response(&mut self) -> Vec<f64> {
        let saved = self.core.state_snapshot();
        self.core.reset_state();

        let mut response = Vec::with_capacity(self.impulse_taps);
        for n in 0..self.impulse_taps {
            let x = if n == 0 { 1.0 } else { 0.0 };
            response.push(self.core.output_sample(x));
        }

        self.core
            .state_restore(&saved)
            .expect("snapshot matches its own cascade");
        response
    }

    /// Evaluate the transfer function at one point on the unit circle,
    /// `z = e^(j*theta)`, from the aggregate pole-zero-gain description.
    pub fn frequency_response_at(&mut self, theta: f64) -> Complex64 {
        let agg = self.core.aggregate();
        let lead = if agg.denominator[0] != 0.0 {
            agg.numerator[0] / agg.denominator[0]
        } else {
            1.0
        };
        let z = Complex64::new(theta.cos(), theta.sin());

        let mut h = Complex64::new(agg.gain * lead, 0.0);
        for &zero in &agg.zeros {
            h *= z - zero;
        }
        for &pole in &agg.poles {
            h /= z - pole;
        }
        h
    }

    /// Evaluate the pole-zero-gain description on a uniform grid spanning
    /// `[-pi, pi)`.
    pub fn get_frequency_response(&mut self) -> Vec<Complex64> {
        let n = self.response_points;
        (0..n)
            .map(|i| {
                let theta = -PI + 2.0 * PI * (i as f64) / (n as f64);
                self.frequency_response_at(theta)
            })
            .collect()
    }

    /// Magnitude response in dB at normalized radian frequency `theta`.
    pub fn magnitude_response_db(&mut self, theta: f64) -> f64 {
        20.0 * self.frequency_response_at(theta).norm().max(1e-300).log10()
    }

    /// Phase response in radians at normalized radian frequency `theta`.
    pub fn phase_response(&mut self, theta: f64) -> f64 {
        let h = self.frequency_response_at(theta);
        h.im.atan2(h.re)
    }

    /// Group delay in samples at `theta`, by numerical differentiation of
    /// the phase response.
    pub fn group_delay_at(&mut self, theta: f64) -> f64 {
        let dtheta = 1e-4;
        let p1 = self.phase_response(theta - dtheta);
        let p2 = self.phase_response(theta + dtheta);

        let mut dp = p2 - p1;
        if dp > PI {
            dp -= 2.0 * PI;
        } else if dp < -PI {
            dp += 2.0 * PI;
        }
        -dp / (2.0 * dtheta)
    }
}

impl Default for DigitalFilter {
    fn default() -> Self {
        Self::new(Tolerances::default())
    }
}
