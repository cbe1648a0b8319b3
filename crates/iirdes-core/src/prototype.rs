//! Analog Lowpass Prototype Synthesis
//!
//! Classical approximation methods that turn band-edge specifications into a
//! unit-cutoff analog lowpass prototype: a fresh [`AnalogFilter`] holding
//! `ceil(order / 2)` biquad sections plus the recorded true cutoff frequency
//! (`analog_fc`) the frequency-transform stage scales by.
//!
//! Band edges arrive here already prewarped to the analog axis (the design
//! entry point applies `tan`-based prewarping before calling in). Gains are
//! linear magnitudes in (0, 1].
//!
//! Order-rounding quirks are intentional: Butterworth rounds to the nearest
//! integer and forces the order even, while both Chebyshev variants truncate
//! their order formula. See DESIGN.md for the rationale.

use crate::analog::AnalogFilter;
use crate::config::Tolerances;
use crate::factor::{Domain, Factor};

/// Synthesize a Butterworth lowpass prototype.
///
/// The order comes from the attenuation ratio of the two edges, rounded to
/// the nearest integer and forced even; poles sit uniformly on the left
/// half of the unit circle and are grouped into conjugate-pair quadratic
/// sections with unit numerators. The recorded cutoff solves the design
/// equation at the stop edge.
///
/// # Panics
///
/// Panics unless `0 < pass_edge < stop_edge` and both gains are in (0, 1)
/// with `stop_gain < pass_gain`.
pub fn butterworth(
    pass_edge: f64,
    pass_gain: f64,
    stop_edge: f64,
    stop_gain: f64,
    tol: Tolerances,
) -> AnalogFilter {
    validate_edges(pass_edge, pass_gain, stop_edge, stop_gain);

    let pass_atten = 1.0 / (pass_gain * pass_gain) - 1.0;
    let stop_atten = 1.0 / (stop_gain * stop_gain) - 1.0;

    let exact = (pass_atten / stop_atten).ln() / (2.0 * (pass_edge / stop_edge).ln());
    let mut order = exact.round() as usize;
    if order % 2 == 1 {
        order += 1;
    }
    let order = order.max(2);

    // Solve the same design equation at the stop edge for the true cutoff.
    let cutoff = stop_edge / stop_atten.powf(1.0 / (2.0 * order as f64));

    tracing::debug!(order, cutoff, "butterworth prototype");

    let n = order as f64;
    let mut sections = Vec::with_capacity(order / 2);
    for k in 0..order / 2 {
        // theta_k = pi * (2k + N + 1) / (2N): left-half-plane upper poles.
        let theta = std::f64::consts::PI * (2 * k + order + 1) as f64 / (2.0 * n);
        sections.push(unit_pole_pair(theta.cos(), tol));
    }

    let mut filter = AnalogFilter::new(tol);
    filter.replace_factors(sections);
    filter.set_analog_fc(cutoff);
    filter
}

/// Synthesize a Chebyshev Type I lowpass prototype.
///
/// Equiripple passband: poles lie on an ellipse parameterized by
/// `sinh`/`cosh` of `asinh(1/eps) / N`; all zeros are at infinity. Each
/// section is normalized to unit DC gain; even orders get the ripple-floor
/// gain applied at the filter level. The recorded cutoff is the passband
/// edge.
pub fn chebyshev1(
    pass_edge: f64,
    pass_gain: f64,
    stop_edge: f64,
    stop_gain: f64,
    tol: Tolerances,
) -> AnalogFilter {
    validate_edges(pass_edge, pass_gain, stop_edge, stop_gain);

    let eps = (1.0 / (pass_gain * pass_gain) - 1.0).sqrt();
    let order = chebyshev_order(eps, stop_gain, stop_edge / pass_edge);
    let beta = (1.0 / eps).asinh() / order as f64;

    tracing::debug!(order, beta, "chebyshev-1 prototype");

    let n = order as f64;
    let mut sections = Vec::with_capacity((order + 1) / 2);
    for k in 0..order / 2 {
        let mu = std::f64::consts::PI * (2 * k + 1) as f64 / (2.0 * n);
        let re = -beta.sinh() * mu.sin();
        let im = beta.cosh() * mu.cos();
        let mut section = pair_section_normalized(re, im, tol);
        if k == 0 && order % 2 == 0 {
            // Even orders ride the ripple at DC.
            section.set_gain(1.0 / (1.0 + eps * eps).sqrt());
        }
        sections.push(section);
    }
    if order % 2 == 1 {
        sections.push(real_pole_section(-beta.sinh(), tol));
    }

    let mut filter = AnalogFilter::new(tol);
    filter.replace_factors(sections);
    filter.set_analog_fc(pass_edge);
    filter
}

/// Synthesize a Chebyshev Type II (inverse Chebyshev) lowpass prototype.
///
/// Equiripple stopband: the prototype is normalized to a unit stop edge,
/// with finite zeros at `1/cos(mu_k)` on the imaginary axis and poles that
/// are the inversions of the Type-I pole set. Odd orders produce one real
/// pole whose paired zero sits at infinity. The recorded cutoff is the stop
/// edge.
pub fn chebyshev2(
    pass_edge: f64,
    pass_gain: f64,
    stop_edge: f64,
    stop_gain: f64,
    tol: Tolerances,
) -> AnalogFilter {
    validate_edges(pass_edge, pass_gain, stop_edge, stop_gain);

    let pass_eps = (1.0 / (pass_gain * pass_gain) - 1.0).sqrt();
    let order = chebyshev_order(pass_eps, stop_gain, stop_edge / pass_edge);

    // Stopband-referenced ripple parameter.
    let eps = 1.0 / (1.0 / (stop_gain * stop_gain) - 1.0).sqrt();
    let beta = (1.0 / eps).asinh() / order as f64;

    tracing::debug!(order, beta, "chebyshev-2 prototype");

    let n = order as f64;
    let mut sections = Vec::with_capacity((order + 1) / 2);
    for k in 0..order / 2 {
        let mu = std::f64::consts::PI * (2 * k + 1) as f64 / (2.0 * n);
        // Type-I pole, then invert for the Type-II location.
        let re = -beta.sinh() * mu.sin();
        let im = beta.cosh() * mu.cos();
        let mag_sq = re * re + im * im;
        let q_re = re / mag_sq;
        let q_im = im / mag_sq;

        // Finite zero on the imaginary axis at the unit stop edge.
        let w = 1.0 / mu.cos();
        let q_mag_sq = q_re * q_re + q_im * q_im;
        let numerator = vec![w * w, 0.0, 1.0];
        let denominator = vec![q_mag_sq, -2.0 * q_re, 1.0];
        let gain = q_mag_sq / (w * w);
        sections.push(Factor::new(Domain::Analog, numerator, denominator, gain, tol).unwrap());
    }
    if order % 2 == 1 {
        // Real Type-I pole at -sinh(beta) inverts to -1/sinh(beta); its
        // zero escapes to infinity.
        sections.push(real_pole_section(-1.0 / beta.sinh(), tol));
    }

    let mut filter = AnalogFilter::new(tol);
    filter.replace_factors(sections);
    filter.set_analog_fc(stop_edge);
    filter
}

/// Shared Chebyshev order formula, truncated (not rounded up).
fn chebyshev_order(eps: f64, stop_gain: f64, selectivity: f64) -> usize {
    let exact = (1.0 / (stop_gain * eps)).acosh() / selectivity.acosh();
    (exact as usize).max(1)
}

fn validate_edges(pass_edge: f64, pass_gain: f64, stop_edge: f64, stop_gain: f64) {
    assert!(
        pass_edge > 0.0 && stop_edge > pass_edge,
        "edges must satisfy 0 < pass < stop"
    );
    assert!(
        pass_gain > 0.0 && pass_gain < 1.0 && stop_gain > 0.0 && stop_gain < pass_gain,
        "gains must satisfy 0 < stop < pass < 1"
    );
}

/// Conjugate-pair section for a unit-magnitude pole: `1 / (1 - 2*re*s + s^2)`.
fn unit_pole_pair(re: f64, tol: Tolerances) -> Factor {
    Factor::new(
        Domain::Analog,
        vec![1.0],
        vec![1.0, -2.0 * re, 1.0],
        1.0,
        tol,
    )
    .unwrap()
}

/// Conjugate-pair section with unit DC gain for an arbitrary pole.
fn pair_section_normalized(re: f64, im: f64, tol: Tolerances) -> Factor {
    let mag_sq = re * re + im * im;
    Factor::new(
        Domain::Analog,
        vec![mag_sq],
        vec![mag_sq, -2.0 * re, 1.0],
        1.0,
        tol,
    )
    .unwrap()
}

/// Real-pole section with unit DC gain: `(-r) / (s - r)` for `r < 0`.
fn real_pole_section(r: f64, tol: Tolerances) -> Factor {
    Factor::new(Domain::Analog, vec![-r], vec![-r, 1.0], 1.0, tol).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::eval;
    use num_complex::Complex64;

    fn tol() -> Tolerances {
        Tolerances::default()
    }

    fn dc_gain(filter: &mut AnalogFilter) -> f64 {
        let num = filter.get_numerator();
        let den = filter.get_denominator();
        let zero = Complex64::new(0.0, 0.0);
        filter.get_gain() * (eval(&num, zero) / eval(&den, zero)).re
    }

    #[test]
    fn test_butterworth_even_order() {
        let filter = butterworth(0.65, 0.99, 1.02, 0.1, tol());
        let order = filter.order();
        assert!(order >= 2);
        assert_eq!(order % 2, 0, "order forced even, got {}", order);
        assert_eq!(filter.num_sections(), order / 2);
    }

    #[test]
    fn test_butterworth_poles_on_unit_circle() {
        let mut filter = butterworth(0.65, 0.99, 1.02, 0.1, tol());
        for p in filter.get_poles() {
            assert!((p.norm() - 1.0).abs() < 1e-9, "pole {:?}", p);
            assert!(p.re < 0.0, "pole in right half-plane: {:?}", p);
        }
    }

    #[test]
    fn test_butterworth_unit_dc_gain() {
        let mut filter = butterworth(0.65, 0.99, 1.02, 0.1, tol());
        assert!((dc_gain(&mut filter) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_butterworth_cutoff_between_edges() {
        let filter = butterworth(0.65, 0.99, 1.02, 0.1, tol());
        let fc = filter.analog_fc();
        assert!(fc > 0.65 && fc < 1.02, "cutoff {}", fc);
    }

    #[test]
    fn test_butterworth_cutoff_meets_stop_spec() {
        // At the stop edge the unit-cutoff prototype scaled by fc gives
        // |H|^2 = 1 / (1 + (ws/fc)^(2N)) = stop_gain^2 by construction.
        let filter = butterworth(0.65, 0.99, 1.02, 0.1, tol());
        let n = filter.order() as f64;
        let fc = filter.analog_fc();
        let mag_sq = 1.0 / (1.0 + (1.02_f64 / fc).powf(2.0 * n));
        assert!((mag_sq.sqrt() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_chebyshev1_pole_count_and_dc() {
        let mut filter = chebyshev1(0.65, 0.9, 1.1, 0.05, tol());
        let order = filter.order();
        assert!(order >= 1);
        assert_eq!(filter.num_sections(), (order + 1) / 2);
        assert_eq!(filter.get_poles().len(), order);
        // Zeros are all at infinity.
        assert!(filter.get_zeroes().iter().all(|z| z.is_infinite()));

        let dc = dc_gain(&mut filter);
        if order % 2 == 1 {
            assert!((dc - 1.0).abs() < 1e-9, "odd-order DC {}", dc);
        } else {
            let eps = (1.0 / (0.9_f64 * 0.9) - 1.0).sqrt();
            let expected = 1.0 / (1.0 + eps * eps).sqrt();
            assert!((dc - expected).abs() < 1e-9, "even-order DC {}", dc);
        }
    }

    #[test]
    fn test_chebyshev1_poles_left_half_plane() {
        let mut filter = chebyshev1(0.65, 0.9, 1.1, 0.05, tol());
        for p in filter.get_poles() {
            assert!(p.re < 0.0, "pole {:?}", p);
        }
        assert_eq!(filter.analog_fc(), 0.65);
    }

    #[test]
    fn test_chebyshev2_zeros_on_imaginary_axis() {
        let mut filter = chebyshev2(0.55, 0.95, 1.0, 0.05, tol());
        let finite: Vec<_> = filter
            .get_zeroes()
            .into_iter()
            .filter(|z| !z.is_infinite())
            .collect();
        assert!(!finite.is_empty());
        for z in finite {
            assert!(z.re.abs() < 1e-9, "zero off the imaginary axis: {:?}", z);
            // Finite zeros sit at or beyond the unit stop edge.
            assert!(z.im.abs() >= 1.0 - 1e-9, "zero {:?}", z);
        }
        assert_eq!(filter.analog_fc(), 1.0);
    }

    #[test]
    fn test_chebyshev2_unit_dc_gain() {
        let mut filter = chebyshev2(0.55, 0.95, 1.0, 0.05, tol());
        assert!((dc_gain(&mut filter) - 1.0).abs() < 1e-9);
        for p in filter.get_poles() {
            assert!(p.re < 0.0, "pole {:?}", p);
        }
    }

    #[test]
    fn test_chebyshev_order_truncates() {
        // The formula truncates rather than rounding up; feeding a spec whose
        // exact order is fractional must floor it.
        let eps = (1.0 / (0.9_f64 * 0.9) - 1.0).sqrt();
        let exact = (1.0 / (0.05 * eps)).acosh() / (1.1_f64 / 0.65).acosh();
        assert_eq!(chebyshev_order(eps, 0.05, 1.1 / 0.65), exact as usize);
    }
}
