//! Frequency-Axis Transforms
//!
//! In-place rewrites that reshape a unit-cutoff analog lowpass prototype
//! into the requested band shape by substituting for `s` in every factor:
//!
//! - lowpass: `s -> s/fc`
//! - highpass: `s -> fc/s`
//! - bandpass: `s -> (s^2 + fo^2) / (B*s)`
//! - bandstop: `s -> B*s / (s^2 + fo^2)`
//!
//! The lowpass/highpass substitutions consume the filter's recorded cutoff
//! (`analog_fc`); the band substitutions consume the center/width pair. Band
//! substitutions lift each quadratic section to a quartic, which is split
//! back into two quadratics with the Bairstow machinery, doubling section
//! count and filter order. First-order sections become a single second-order
//! section (order still doubles).
//!
//! A quartic split that exhausts its iteration budget still applies its
//! best-effort factors; the transform then reports
//! [`FilterError::NonConvergence`] so callers can detect the degraded
//! precision. Each source section writes to its own pair of result slots.

use crate::analog::AnalogFilter;
use crate::error::FilterError;
use crate::factor::{Domain, Factor};
use crate::polynomial::{self, QuarticFactors};

/// Rewrite the prototype into a lowpass with cutoff `analog_fc`.
pub fn to_lowpass(filter: &mut AnalogFilter) {
    let fc = filter.analog_fc();
    assert!(fc > 0.0, "cutoff must be positive");

    let tol = filter.tolerances();
    let mut factors = Vec::with_capacity(filter.num_sections());
    for factor in filter.factors() {
        let num = scale_by_cutoff(factor.numerator(), fc);
        let den = scale_by_cutoff(factor.denominator(), fc);
        factors.push(
            Factor::new(Domain::Analog, num, den, factor.gain(), tol)
                .expect("lowpass scaling preserves length"),
        );
    }
    filter.replace_factors(factors);
}

/// Rewrite the prototype into a highpass with cutoff `analog_fc`.
///
/// The substitution `s -> fc/s` reverses each polynomial (padded to the
/// factor's common length) with matching powers of `fc`.
pub fn to_highpass(filter: &mut AnalogFilter) {
    let fc = filter.analog_fc();
    assert!(fc > 0.0, "cutoff must be positive");

    let tol = filter.tolerances();
    let mut factors = Vec::with_capacity(filter.num_sections());
    for factor in filter.factors() {
        let len = factor.numerator().len().max(factor.denominator().len());
        let num = reverse_with_powers(factor.numerator(), len, fc);
        let den = reverse_with_powers(factor.denominator(), len, fc);
        factors.push(
            Factor::new(Domain::Analog, num, den, factor.gain(), tol)
                .expect("highpass reversal preserves length"),
        );
    }
    filter.replace_factors(factors);
}

/// Rewrite the prototype into a bandpass around `freq_center` with width
/// `freq_width`.
///
/// Applies best-effort results even on non-convergence (see module docs).
pub fn to_bandpass(filter: &mut AnalogFilter) -> Result<(), FilterError> {
    band_transform(filter, false)
}

/// Rewrite the prototype into a bandstop around `freq_center` with width
/// `freq_width`.
pub fn to_bandstop(filter: &mut AnalogFilter) -> Result<(), FilterError> {
    band_transform(filter, true)
}

fn band_transform(filter: &mut AnalogFilter, stop: bool) -> Result<(), FilterError> {
    let fo = filter.freq_center();
    let width = filter.freq_width();
    assert!(fo > 0.0, "center frequency must be positive");
    assert!(width > 0.0, "bandwidth must be positive");

    let tol = filter.tolerances();
    let mut factors = Vec::with_capacity(filter.num_sections() * 2);
    let mut failure: Option<FilterError> = None;

    for factor in filter.factors() {
        let order = factor.order();
        match order {
            0 => factors.push(factor.clone()),
            1 => {
                let num = lift_first_order(factor.numerator(), fo, width, stop);
                let den = lift_first_order(factor.denominator(), fo, width, stop);
                factors.push(
                    Factor::new(Domain::Analog, num, den, factor.gain(), tol)
                        .expect("first-order lift is quadratic"),
                );
            }
            _ => {
                let (num_a, num_b) =
                    split_second_order(factor.numerator(), fo, width, stop, tol.tiny, &mut failure);
                let (den_a, den_b) = split_second_order(
                    factor.denominator(),
                    fo,
                    width,
                    stop,
                    tol.tiny,
                    &mut failure,
                );
                factors.push(
                    Factor::new(Domain::Analog, num_a, den_a, factor.gain(), tol)
                        .expect("band split is quadratic"),
                );
                factors.push(
                    Factor::new(Domain::Analog, num_b, den_b, 1.0, tol)
                        .expect("band split is quadratic"),
                );
            }
        }
    }

    filter.replace_factors(factors);
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// `s -> s/fc`: divide the degree-`i` coefficient by `fc^i`.
fn scale_by_cutoff(coeffs: &[f64], fc: f64) -> Vec<f64> {
    coeffs
        .iter()
        .enumerate()
        .map(|(i, &c)| c / fc.powi(i as i32))
        .collect()
}

/// `s -> fc/s`: pad to `len`, then swap coefficient order with powers of fc.
fn reverse_with_powers(coeffs: &[f64], len: usize, fc: f64) -> Vec<f64> {
    let mut padded = vec![0.0; len];
    padded[..coeffs.len()].copy_from_slice(coeffs);
    (0..len)
        .map(|i| padded[len - 1 - i] * fc.powi((len - 1 - i) as i32))
        .collect()
}

/// Lift a first-order polynomial through the band substitution, producing
/// the quadratic it becomes after clearing denominators.
fn lift_first_order(coeffs: &[f64], fo: f64, width: f64, stop: bool) -> Vec<f64> {
    let mut c = [0.0; 2];
    c[..coeffs.len()].copy_from_slice(coeffs);
    let (c0, c1) = (c[0], c[1]);
    if stop {
        // c0*(s^2 + fo^2) + c1*B*s
        vec![c0 * fo * fo, c1 * width, c0]
    } else {
        // c0*B*s + c1*(s^2 + fo^2)
        vec![c1 * fo * fo, c0 * width, c1]
    }
}

/// Lift a second-order polynomial through the band substitution and split
/// the resulting quartic into two quadratics.
///
/// Constant and linear polynomials split in closed form; true quadratics go
/// through the Bairstow refinement, recording any non-convergence in
/// `failure`.
fn split_second_order(
    coeffs: &[f64],
    fo: f64,
    width: f64,
    stop: bool,
    eps: f64,
    failure: &mut Option<FilterError>,
) -> (Vec<f64>, Vec<f64>) {
    let mut c = [0.0; 3];
    c[..coeffs.len()].copy_from_slice(coeffs);
    let (c0, c1, c2) = (c[0], c[1], c[2]);
    let fo2 = fo * fo;

    let degree = if c2.abs() > eps {
        2
    } else if c1.abs() > eps {
        1
    } else {
        0
    };

    if stop {
        match degree {
            // c0*(s^2 + fo^2)^2
            0 => (vec![c0 * fo2, 0.0, c0], vec![fo2, 0.0, 1.0]),
            // (s^2 + fo^2) * (c0*s^2 + c1*B*s + c0*fo^2)
            1 => (
                vec![fo2, 0.0, 1.0],
                vec![c0 * fo2, c1 * width, c0],
            ),
            _ => {
                // c0*(s^2+fo^2)^2 + c1*B*s*(s^2+fo^2) + c2*B^2*s^2
                let quartic = [
                    c0 * fo2 * fo2,
                    c1 * width * fo2,
                    2.0 * c0 * fo2 + c2 * width * width,
                    c1 * width,
                    c0,
                ];
                split_quartic(&quartic, eps, failure)
            }
        }
    } else {
        match degree {
            // c0*B^2*s^2
            0 => (vec![0.0, c0 * width], vec![0.0, width]),
            // B*s * (c1*s^2 + c0*B*s + c1*fo^2)
            1 => (vec![0.0, width], vec![c1 * fo2, c0 * width, c1]),
            _ => {
                // c0*B^2*s^2 + c1*B*s*(s^2+fo^2) + c2*(s^2+fo^2)^2
                let quartic = [
                    c2 * fo2 * fo2,
                    c1 * width * fo2,
                    c0 * width * width + 2.0 * c2 * fo2,
                    c1 * width,
                    c2,
                ];
                split_quartic(&quartic, eps, failure)
            }
        }
    }
}

fn split_quartic(
    quartic: &[f64; 5],
    eps: f64,
    failure: &mut Option<FilterError>,
) -> (Vec<f64>, Vec<f64>) {
    let QuarticFactors {
        first,
        second,
        converged,
        iterations,
    } = polynomial::factor_quartic(quartic, eps);
    if !converged && failure.is_none() {
        *failure = Some(FilterError::NonConvergence { iterations });
    }
    (first.to_vec(), second.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tolerances;
    use crate::polynomial::{eval, multiply};
    use num_complex::Complex64;

    fn tol() -> Tolerances {
        Tolerances::default()
    }

    fn filter_with(sections: Vec<Factor>) -> AnalogFilter {
        let mut filter = AnalogFilter::new(tol());
        filter.replace_factors(sections);
        filter
    }

    fn section(num: Vec<f64>, den: Vec<f64>) -> Factor {
        Factor::new(Domain::Analog, num, den, 1.0, tol()).unwrap()
    }

    fn response(filter: &mut AnalogFilter, s: Complex64) -> Complex64 {
        let num = filter.get_numerator();
        let den = filter.get_denominator();
        eval(&num, s) / eval(&den, s) * filter.get_gain()
    }

    #[test]
    fn test_lowpass_scales_coefficients() {
        let mut filter = filter_with(vec![section(vec![1.0], vec![1.0, 0.5, 1.0])]);
        filter.set_analog_fc(2.0);
        to_lowpass(&mut filter);

        let den = filter.get_denominator();
        assert!((den[0] - 1.0).abs() < 1e-12);
        assert!((den[1] - 0.25).abs() < 1e-12);
        assert!((den[2] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_lowpass_moves_cutoff() {
        // Unit-cutoff one-pole scaled to fc = 2: |H(j2)| = 1/sqrt(2).
        let mut filter = filter_with(vec![section(vec![1.0], vec![1.0, 1.0])]);
        filter.set_analog_fc(2.0);
        to_lowpass(&mut filter);

        let mag = response(&mut filter, Complex64::new(0.0, 2.0)).norm();
        assert!((mag - 1.0 / 2.0_f64.sqrt()).abs() < 1e-9, "mag {}", mag);
    }

    #[test]
    fn test_highpass_first_order() {
        // 1/(1+s) with fc = 2 becomes s/(s+2).
        let mut filter = filter_with(vec![section(vec![1.0], vec![1.0, 1.0])]);
        filter.set_analog_fc(2.0);
        to_highpass(&mut filter);

        let num = filter.get_numerator();
        let den = filter.get_denominator();
        assert_eq!(num, vec![0.0, 1.0]);
        assert_eq!(den, vec![2.0, 1.0]);

        // Blocks DC, passes high frequencies.
        assert!(response(&mut filter, Complex64::new(0.0, 0.0)).norm() < 1e-12);
        let hf = response(&mut filter, Complex64::new(0.0, 1e6)).norm();
        assert!((hf - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_highpass_quadratic_reversal() {
        let mut filter = filter_with(vec![section(vec![1.0], vec![1.0, 1.4, 1.0])]);
        filter.set_analog_fc(3.0);
        to_highpass(&mut filter);

        // den (1 + 1.4s + s^2) -> (9 + 4.2s + s^2) after s -> 3/s,
        // numerator 1 -> s^2.
        let num = filter.get_numerator();
        let den = filter.get_denominator();
        assert_eq!(num, vec![0.0, 0.0, 1.0]);
        assert!((den[0] - 9.0).abs() < 1e-12);
        assert!((den[1] - 4.2).abs() < 1e-12);
        assert!((den[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bandpass_first_order_section() {
        // 1/(1+s), fo = 1, B = 0.5 -> 0.5s / (s^2 + 0.5s + 1).
        let mut filter = filter_with(vec![section(vec![1.0], vec![1.0, 1.0])]);
        filter.set_freq_center(1.0);
        filter.set_freq_width(0.5);
        to_bandpass(&mut filter).unwrap();

        // Trailing zero: the numerator is B*s, padded to the quadratic
        // section shape (one zero at the origin, one at infinity).
        assert_eq!(filter.get_numerator(), vec![0.0, 0.5, 0.0]);
        assert_eq!(filter.get_denominator(), vec![1.0, 0.5, 1.0]);

        // Unity at the center frequency, zero at DC.
        let center = response(&mut filter, Complex64::new(0.0, 1.0)).norm();
        assert!((center - 1.0).abs() < 1e-9, "center {}", center);
        assert!(response(&mut filter, Complex64::new(0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_bandpass_doubles_quadratic_sections() {
        let den = vec![1.0, 2.0_f64.sqrt(), 1.0];
        let mut filter = filter_with(vec![section(vec![1.0], den.clone())]);
        filter.set_freq_center(1.0);
        filter.set_freq_width(0.2);
        to_bandpass(&mut filter).unwrap();

        assert_eq!(filter.num_sections(), 2);
        assert_eq!(filter.order(), 4);

        // The two new denominators multiply back to the lifted quartic.
        let product = {
            let f = filter.factors();
            multiply(f[0].denominator(), f[1].denominator())
        };
        let b = 0.2;
        let expected = [
            1.0,
            2.0_f64.sqrt() * b,
            b * b + 2.0,
            2.0_f64.sqrt() * b,
            1.0,
        ];
        for (p, e) in product.iter().zip(expected.iter()) {
            assert!((p - e).abs() < 1e-5, "{} vs {}", p, e);
        }

        // Band edges: |H| = 1 at fo, small far outside the band.
        let center = response(&mut filter, Complex64::new(0.0, 1.0)).norm();
        assert!((center - 1.0).abs() < 1e-4, "center {}", center);
        let far = response(&mut filter, Complex64::new(0.0, 5.0)).norm();
        assert!(far < 0.01, "far {}", far);
    }

    #[test]
    fn test_bandstop_first_order_section() {
        // 1/(1+s), fo = 2, B = 0.5: notch at s = 2j, unity at DC.
        let mut filter = filter_with(vec![section(vec![1.0], vec![1.0, 1.0])]);
        filter.set_freq_center(2.0);
        filter.set_freq_width(0.5);
        to_bandstop(&mut filter).unwrap();

        assert_eq!(filter.get_numerator(), vec![4.0, 0.0, 1.0]);
        assert_eq!(filter.get_denominator(), vec![4.0, 0.5, 1.0]);

        assert!(response(&mut filter, Complex64::new(0.0, 2.0)).norm() < 1e-12);
        let dc = response(&mut filter, Complex64::new(0.0, 0.0)).norm();
        assert!((dc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bandstop_doubles_quadratic_sections() {
        let mut filter = filter_with(vec![section(vec![1.0], vec![1.0, 2.0_f64.sqrt(), 1.0])]);
        filter.set_freq_center(1.0);
        filter.set_freq_width(0.3);
        to_bandstop(&mut filter).unwrap();

        assert_eq!(filter.num_sections(), 2);
        assert_eq!(filter.order(), 4);

        // Deep notch at the center, unity at DC.
        assert!(response(&mut filter, Complex64::new(0.0, 1.0)).norm() < 1e-6);
        let dc = response(&mut filter, Complex64::new(0.0, 0.0)).norm();
        assert!((dc - 1.0).abs() < 1e-4, "dc {}", dc);
    }

    #[test]
    fn test_band_transform_keeps_gain_product() {
        let mut a = Factor::new(
            Domain::Analog,
            vec![1.0],
            vec![1.0, 2.0_f64.sqrt(), 1.0],
            1.0,
            tol(),
        )
        .unwrap();
        a.set_gain(0.75);
        let mut filter = filter_with(vec![a]);
        filter.set_freq_center(1.0);
        filter.set_freq_width(0.2);
        to_bandpass(&mut filter).unwrap();

        assert!((filter.get_gain() - 0.75).abs() < 1e-12);
    }
}
