//! Analog Filter — s-Domain Cascade
//!
//! An [`AnalogFilter`] is an ordered cascade of s-domain biquad factors plus
//! the prototype bookkeeping the frequency-transform stage consumes: the
//! recorded prototype cutoff (`analog_fc`) for lowpass/highpass shaping, and
//! the center/width pair for bandpass/bandstop shaping.
//!
//! The aggregate transfer function, gain, and pole/zero lists are cached and
//! recomputed lazily after mutations, so the query methods take `&mut self`.
//! Callers that need concurrent reads must serialize them against mutation
//! (the engine itself is single-threaded).

use crate::cascade::CascadeCore;
use crate::config::Tolerances;
use crate::error::FilterError;
use crate::factor::{Domain, Factor};
use num_complex::Complex64;

/// An analog (s-domain) cascade of biquad factors.
#[derive(Debug, Clone)]
pub struct AnalogFilter {
    pub(crate) core: CascadeCore,
    analog_fc: f64,
    freq_center: f64,
    freq_width: f64,
}

impl AnalogFilter {
    /// Create a filter holding the unit transfer function.
    pub fn new(tol: Tolerances) -> Self {
        Self {
            core: CascadeCore::new(Domain::Analog, tol),
            analog_fc: 1.0,
            freq_center: 0.0,
            freq_width: 0.0,
        }
    }

    /// The prototype's true analog cutoff frequency.
    pub fn analog_fc(&self) -> f64 {
        self.analog_fc
    }

    pub fn set_analog_fc(&mut self, fc: f64) {
        self.analog_fc = fc;
    }

    /// Geometric-mean center frequency for band transforms.
    pub fn freq_center(&self) -> f64 {
        self.freq_center
    }

    pub fn set_freq_center(&mut self, fo: f64) {
        self.freq_center = fo;
    }

    /// Bandwidth for band transforms.
    pub fn freq_width(&self) -> f64 {
        self.freq_width
    }

    pub fn set_freq_width(&mut self, width: f64) {
        self.freq_width = width;
    }

    pub fn tolerances(&self) -> Tolerances {
        self.core.tol
    }

    /// Append a factor to the cascade.
    ///
    /// # Panics
    ///
    /// Panics if the factor is not an analog factor.
    pub fn add_factor(&mut self, factor: Factor) {
        self.core.add_factor(factor);
    }

    /// Remove and return the factor at `index`.
    pub fn remove_factor(&mut self, index: usize) -> Factor {
        self.core.remove_factor(index)
    }

    /// Swap in a whole factor list (synthesis and transform stages).
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

    /// Number of cascade sections.
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

    /// Reported poles (near-coincident pole/zero pairs cancelled).
    pub fn get_poles(&mut self) -> Vec<Complex64> {
        self.core.aggregate().poles.clone()
    }

    /// Reported zeros (near-coincident pole/zero pairs cancelled).
    pub fn get_zeroes(&mut self) -> Vec<Complex64> {
        self.core.aggregate().zeros.clone()
    }

    /// Aggregate numerator: the product of all factor numerators (ascending
    /// in `s`; the gain is kept separate).
    pub fn get_numerator(&mut self) -> Vec<f64> {
        self.core.aggregate().numerator.clone()
    }

    /// Aggregate denominator (ascending in `s`).
    pub fn get_denominator(&mut self) -> Vec<f64> {
        self.core.aggregate().denominator.clone()
    }

    /// Aggregate gain: the product of factor gains.
    pub fn get_gain(&mut self) -> f64 {
        self.core.aggregate().gain
    }
}

impl Default for AnalogFilter {
    fn default() -> Self {
        Self::new(Tolerances::default())
    }
}
