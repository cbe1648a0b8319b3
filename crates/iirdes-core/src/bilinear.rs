//! Bilinear Mapping — Analog to Digital
//!
//! Maps every analog biquad through the substitution
//! `s = 2*fs*(z - 1)/(z + 1)` using closed-form coefficient formulas: with
//! `c = 2*fs`, an ascending polynomial `a0 + a1*s + a2*s^2` becomes the
//! `z^-1`-ascending sequence
//!
//! ```text
//! [ a2*c^2 + a1*c + a0,  2*(a0 - a2*c^2),  a2*c^2 - a1*c + a0 ]
//! ```
//!
//! (the first entry is `4*a2*fs^2 + 2*a1*fs + a0`, the polynomial evaluated
//! at `s = c`). Both
//! polynomials of a factor are padded to the section's common length first,
//! so the `(z + 1)` lift cancels correctly between numerator and denominator.
//!
//! Each digital section is normalized to unit leading coefficients; the
//! per-section gains (and the analog factor gains) are collected into a
//! single trailing gain-only pseudo-factor on the new [`DigitalFilter`].

use crate::analog::AnalogFilter;
use crate::digital::DigitalFilter;
use crate::factor::{Domain, Factor};

/// Map an analog cascade to a digital one at sampling frequency `fs`.
///
/// # Panics
///
/// Panics if `fs` is not positive.
pub fn bilinear(filter: &AnalogFilter, fs: f64) -> DigitalFilter {
    assert!(fs > 0.0, "sampling frequency must be positive");

    let c = 2.0 * fs;
    let tol = filter.tolerances();
    let mut sections = Vec::with_capacity(filter.num_sections() + 1);
    let mut total_gain = 1.0;

    for factor in filter.factors() {
        let len = factor.numerator().len().max(factor.denominator().len());
        let (num, num_lead) = map_polynomial(factor.numerator(), len, c, tol.tiny);
        let (den, den_lead) = map_polynomial(factor.denominator(), len, c, tol.tiny);

        total_gain *= factor.gain() * num_lead / den_lead;
        sections.push(
            Factor::new(Domain::Digital, num, den, 1.0, tol)
                .expect("bilinear preserves section order"),
        );
    }

    tracing::debug!(
        sections = sections.len(),
        gain = total_gain,
        "bilinear mapping"
    );
    sections.push(Factor::gain_only(Domain::Digital, total_gain, tol));

    let mut digital = DigitalFilter::new(tol);
    digital.replace_factors(sections);
    digital
}

/// Substitute `s = c*(z-1)/(z+1)` into an ascending polynomial padded to
/// `len`, returning the unit-leading `z^-1` sequence and the factored-out
/// leading value.
fn map_polynomial(coeffs: &[f64], len: usize, c: f64, tiny: f64) -> (Vec<f64>, f64) {
    let mut a = [0.0; 3];
    a[..coeffs.len()].copy_from_slice(coeffs);
    let (a0, a1, a2) = (a[0], a[1], a[2]);

    let mapped = match len {
        1 => vec![a0],
        2 => vec![a0 + a1 * c, a0 - a1 * c],
        _ => vec![
            a2 * c * c + a1 * c + a0,
            2.0 * (a0 - a2 * c * c),
            a2 * c * c - a1 * c + a0,
        ],
    };

    let lead = mapped[0];
    if lead.abs() <= tiny {
        // Root at s = +c maps the leading coefficient to zero; keep the raw
        // sequence rather than dividing by it.
        return (mapped, 1.0);
    }
    (mapped.iter().map(|x| x / lead).collect(), lead)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tolerances;
    use crate::prototype;

    fn tol() -> Tolerances {
        Tolerances::default()
    }

    fn one_pole_analog() -> AnalogFilter {
        let mut filter = AnalogFilter::new(tol());
        let section =
            Factor::new(Domain::Analog, vec![1.0], vec![1.0, 1.0], 1.0, tol()).unwrap();
        filter.replace_factors(vec![section]);
        filter
    }

    #[test]
    fn test_one_pole_mapping() {
        // 1/(1+s) at fs = 1 (c = 2): H(z) = (1 + z^-1)/3 / (1 - z^-1/3).
        let analog = one_pole_analog();
        let mut digital = bilinear(&analog, 1.0);

        // Two factors: the mapped section plus the gain-only pseudo-factor.
        assert_eq!(digital.num_sections(), 2);
        let section = &digital.factors()[0];
        assert_eq!(section.numerator(), &[1.0, 1.0]);
        assert!((section.denominator()[1] + 1.0 / 3.0).abs() < 1e-12);
        assert!((digital.get_gain() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_dc_gain_preserved() {
        // The bilinear map sends s = 0 to z = 1 exactly.
        let analog = one_pole_analog();
        let mut digital = bilinear(&analog, 1.0);
        let dc = digital.frequency_response_at(0.0);
        assert!((dc.re - 1.0).abs() < 1e-9, "dc {:?}", dc);
        assert!(dc.im.abs() < 1e-9);
    }

    #[test]
    fn test_quadratic_ad_formula() {
        // ad = 4*a2*fs^2 + 2*a1*fs + a0 before normalization.
        let fs = 1.5;
        let (num, lead) = map_polynomial(&[2.0, 3.0, 4.0], 3, 2.0 * fs, 1e-6);
        let expected = 4.0 * 4.0 * fs * fs + 2.0 * 3.0 * fs + 2.0;
        assert!((lead - expected).abs() < 1e-12);
        assert_eq!(num.len(), 3);
        assert!((num[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_prototype_maps_stable() {
        let analog = prototype::butterworth(0.65, 0.99, 1.02, 0.1, tol());
        let mut lowpass = analog.clone();
        crate::transform::to_lowpass(&mut lowpass);
        let digital = bilinear(&lowpass, 1.0);
        assert!(digital.is_stable(), "bilinear image of a stable analog filter");
    }

    #[test]
    fn test_order_preserved() {
        let mut analog = AnalogFilter::new(tol());
        analog.replace_factors(vec![
            Factor::new(Domain::Analog, vec![1.0], vec![1.0, 0.6, 1.0], 1.0, tol()).unwrap(),
            Factor::new(Domain::Analog, vec![1.0], vec![1.0, 1.0], 1.0, tol()).unwrap(),
        ]);
        let digital = bilinear(&analog, 1.0);
        // Gain-only factor adds no order.
        assert_eq!(digital.order(), 3);
    }
}
