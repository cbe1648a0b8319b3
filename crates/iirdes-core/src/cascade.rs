//! Cascade Container Core
//!
//! Shared machinery behind [`crate::analog::AnalogFilter`] and
//! [`crate::digital::DigitalFilter`]: an ordered factor list representing a
//! product of transfer functions, with lazily computed aggregates.
//!
//! Cascade order matters for sample-by-sample evaluation (intermediate
//! rounding differs) but not for the algebraic aggregates, which are plain
//! polynomial products. Every mutation invalidates the cached aggregates;
//! they are recomputed on the next query.
//!
//! The *reported* pole/zero lists cancel near-coincident pole/zero pairs
//! (closer than the `delta` tolerance) without touching the factors that own
//! them: cancellation is a reporting concern, not an algebraic rewrite.

use crate::config::Tolerances;
use crate::error::FilterError;
use crate::factor::{Domain, Factor};
use crate::polynomial;
use num_complex::Complex64;

#[derive(Debug, Clone)]
pub(crate) struct Aggregate {
    pub numerator: Vec<f64>,
    pub denominator: Vec<f64>,
    pub gain: f64,
    pub poles: Vec<Complex64>,
    pub zeros: Vec<Complex64>,
}

/// Ordered factor cascade with cached aggregates.
#[derive(Debug, Clone)]
pub(crate) struct CascadeCore {
    pub domain: Domain,
    pub tol: Tolerances,
    factors: Vec<Factor>,
    cache: Option<Aggregate>,
}

impl CascadeCore {
    /// A fresh cascade holds the unit transfer function.
    pub fn new(domain: Domain, tol: Tolerances) -> Self {
        Self {
            domain,
            tol,
            factors: vec![Factor::unity(domain, tol)],
            cache: None,
        }
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Filter order: the sum of section orders.
    pub fn order(&self) -> usize {
        self.factors.iter().map(|f| f.order()).sum()
    }

    pub fn add_factor(&mut self, factor: Factor) {
        assert!(
            factor.domain() == self.domain,
            "factor domain does not match cascade domain"
        );
        self.factors.push(factor);
        self.cache = None;
    }

    /// Remove and return the factor at `index`.
    pub fn remove_factor(&mut self, index: usize) -> Factor {
        assert!(index < self.factors.len(), "factor index out of range");
        self.cache = None;
        self.factors.remove(index)
    }

    /// Drop every factor, returning to the unit transfer function.
    pub fn clear(&mut self) {
        self.factors = vec![Factor::unity(self.domain, self.tol)];
        self.cache = None;
    }

    /// Replace the whole factor list (used by the transform stages).
    pub fn replace_factors(&mut self, factors: Vec<Factor>) {
        assert!(!factors.is_empty(), "cascade must keep at least one factor");
        assert!(
            factors.iter().all(|f| f.domain() == self.domain),
            "factor domain does not match cascade domain"
        );
        self.factors = factors;
        self.cache = None;
    }

    /// Move a pole addressed by `(factor, slot)`.
    pub fn move_pole(
        &mut self,
        factor: usize,
        slot: usize,
        loc: Complex64,
    ) -> Result<(), FilterError> {
        if factor >= self.factors.len() {
            return Err(FilterError::ElementNotFound { factor, slot });
        }
        self.cache = None;
        self.factors[factor]
            .move_pole(slot, loc)
            .map_err(|e| retag(e, factor))
    }

    /// Move a zero addressed by `(factor, slot)`.
    pub fn move_zero(
        &mut self,
        factor: usize,
        slot: usize,
        loc: Complex64,
    ) -> Result<(), FilterError> {
        if factor >= self.factors.len() {
            return Err(FilterError::ElementNotFound { factor, slot });
        }
        self.cache = None;
        self.factors[factor]
            .move_zero(slot, loc)
            .map_err(|e| retag(e, factor))
    }

    /// Thread one sample through every factor in cascade order.
    ///
    /// Evaluation touches only the delay lines, so the algebraic caches
    /// stay valid.
    pub fn output_sample(&mut self, input: f64) -> f64 {
        let mut acc = input;
        for factor in &mut self.factors {
            acc = factor.compute_output(acc);
        }
        acc
    }

    /// Zero every factor's delay line.
    pub fn reset_state(&mut self) {
        for factor in &mut self.factors {
            factor.reset_state();
        }
    }

    /// Capture every factor's delay-line contents.
    pub fn state_snapshot(&self) -> Vec<Vec<f64>> {
        self.factors.iter().map(|f| f.state()).collect()
    }

    /// Restore delay lines captured by [`Self::state_snapshot`].
    pub fn state_restore(&mut self, states: &[Vec<f64>]) -> Result<(), FilterError> {
        assert_eq!(states.len(), self.factors.len(), "snapshot factor count mismatch");
        for (factor, state) in self.factors.iter_mut().zip(states.iter()) {
            factor.set_state(state)?;
        }
        Ok(())
    }

    /// The cached aggregate, recomputing it if a mutation invalidated it.
    pub fn aggregate(&mut self) -> &Aggregate {
        if self.cache.is_none() {
            self.cache = Some(self.compute_aggregate());
        }
        self.cache.as_ref().unwrap()
    }

    fn compute_aggregate(&self) -> Aggregate {
        let mut numerator = vec![1.0];
        let mut denominator = vec![1.0];
        let mut gain = 1.0;
        let mut poles = Vec::new();
        let mut zeros = Vec::new();

        for factor in &self.factors {
            numerator = polynomial::multiply(&numerator, factor.numerator());
            denominator = polynomial::multiply(&denominator, factor.denominator());
            gain *= factor.gain();
            poles.extend(factor.pole_locations());
            zeros.extend(factor.zero_locations());
        }

        cancel_coincident(&mut poles, &mut zeros, self.tol.delta);

        Aggregate {
            numerator,
            denominator,
            gain,
            poles,
            zeros,
        }
    }
}

fn retag(err: FilterError, factor: usize) -> FilterError {
    match err {
        FilterError::ElementNotFound { slot, .. } => FilterError::ElementNotFound { factor, slot },
        other => other,
    }
}

/// Strike pole/zero pairs closer than `delta` from both lists.
fn cancel_coincident(poles: &mut Vec<Complex64>, zeros: &mut Vec<Complex64>, delta: f64) {
    let mut i = 0;
    while i < poles.len() {
        let p = poles[i];
        let hit = zeros.iter().position(|&z| {
            if p.is_infinite() || z.is_infinite() {
                p.is_infinite() && z.is_infinite()
            } else {
                (p - z).norm() < delta
            }
        });
        match hit {
            Some(j) => {
                poles.remove(i);
                zeros.remove(j);
            }
            None => i += 1,
        }
    }
}
