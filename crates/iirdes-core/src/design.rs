//! IIR Design Entry Point
//!
//! Ties the pipeline together: digital band edges are prewarped onto the
//! analog axis, a lowpass prototype is synthesized by the chosen
//! approximation method, the frequency-axis transform reshapes it into the
//! requested band, and the bilinear map produces the digital cascade.
//!
//! Critical frequencies are expressed as **fractions of pi** (1.0 is the
//! Nyquist frequency) and must be strictly increasing; gains are linear
//! magnitudes in (0, 1). The frequency list is interpreted per band type:
//!
//! | band     | frequencies                    | gains                      |
//! |----------|--------------------------------|----------------------------|
//! | lowpass  | `[pass_edge, stop_edge]`       | `[g_pass, g_stop]`         |
//! | highpass | `[stop_edge, pass_edge]`       | `[g_stop, g_pass]`         |
//! | bandpass | `[band_lo, band_hi, stop_ref]` | `[g_pass, g_pass, g_stop]` |
//! | bandstop | `[pass_ref, band_lo, band_hi]` | `[g_pass, g_stop, g_stop]` |
//!
//! For bandpass the band edges delimit the passband and `stop_ref` is a
//! stopband reference above the band; for bandstop the band edges delimit
//! the rejected band and `pass_ref` is a passband reference below it.
//!
//! ## Example
//!
//! ```rust
//! use iirdes_core::design::{design_real_iir, ApproximationMethod, BandType, MappingMethod};
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
//! assert!(filter.order() >= 2);
//! assert!(filter.is_stable());
//! let _response = filter.get_impulse_response();
//! ```

use crate::analog::AnalogFilter;
use crate::bilinear::bilinear;
use crate::config::Tolerances;
use crate::digital::DigitalFilter;
use crate::error::FilterError;
use crate::{prototype, transform};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Analog approximation method for the lowpass prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApproximationMethod {
    /// Maximally flat passband.
    Butterworth,
    /// Equiripple passband.
    ChebyshevI,
    /// Equiripple stopband (inverse Chebyshev).
    ChebyshevII,
    /// Accepted by the enum, rejected by the engine.
    Elliptical,
}

impl std::fmt::Display for ApproximationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Butterworth => write!(f, "Butterworth"),
            Self::ChebyshevI => write!(f, "Chebyshev Type I"),
            Self::ChebyshevII => write!(f, "Chebyshev Type II"),
            Self::Elliptical => write!(f, "Elliptical"),
        }
    }
}

/// Analog-to-digital mapping method. Only the bilinear transform is
/// implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingMethod {
    Bilinear,
    ImpulseInvariant,
    MatchedZ,
}

impl std::fmt::Display for MappingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bilinear => write!(f, "bilinear"),
            Self::ImpulseInvariant => write!(f, "impulse-invariant"),
            Self::MatchedZ => write!(f, "matched-z"),
        }
    }
}

/// Frequency-selective shape of the designed filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandType {
    Lowpass,
    Highpass,
    Bandpass,
    Bandstop,
}

impl std::fmt::Display for BandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lowpass => write!(f, "lowpass"),
            Self::Highpass => write!(f, "highpass"),
            Self::Bandpass => write!(f, "bandpass"),
            Self::Bandstop => write!(f, "bandstop"),
        }
    }
}

/// Bilinear prewarp: the analog frequency whose bilinear image lands on the
/// digital frequency `omega` (radians/sample).
pub fn prewarp(omega: f64, fs: f64) -> f64 {
    (omega / 2.0).tan() * 2.0 * fs
}

/// Inverse of [`prewarp`].
pub fn unwarp(omega_analog: f64, fs: f64) -> f64 {
    2.0 * (omega_analog / (2.0 * fs)).atan()
}

/// Design a real-coefficient digital IIR filter.
///
/// See the module docs for the per-band interpretation of
/// `critical_frequencies` (fractions of pi) and `gains` (linear, in (0,1)).
///
/// # Errors
///
/// `UnsupportedMethod` for a non-bilinear mapping or the Elliptical
/// approximation. Quartic-split non-convergence inside a band transform is
/// recoverable: the design proceeds with the best-effort factors and a
/// warning is logged.
///
/// # Panics
///
/// Panics on malformed arguments: wrong frequency/gain counts, frequencies
/// outside (0, 1) or not strictly increasing, gains outside (0, 1).
pub fn design_real_iir(
    mapping: MappingMethod,
    approximation: ApproximationMethod,
    band: BandType,
    critical_frequencies: &[f64],
    gains: &[f64],
    sampling_frequency: f64,
) -> Result<DigitalFilter, FilterError> {
    design_real_iir_with(
        mapping,
        approximation,
        band,
        critical_frequencies,
        gains,
        sampling_frequency,
        Tolerances::default(),
    )
}

/// [`design_real_iir`] with explicit tolerances.
pub fn design_real_iir_with(
    mapping: MappingMethod,
    approximation: ApproximationMethod,
    band: BandType,
    critical_frequencies: &[f64],
    gains: &[f64],
    sampling_frequency: f64,
    tol: Tolerances,
) -> Result<DigitalFilter, FilterError> {
    if mapping != MappingMethod::Bilinear {
        return Err(FilterError::UnsupportedMethod(match mapping {
            MappingMethod::ImpulseInvariant => "impulse-invariant mapping",
            MappingMethod::MatchedZ => "matched-z mapping",
            MappingMethod::Bilinear => unreachable!(),
        }));
    }
    if approximation == ApproximationMethod::Elliptical {
        return Err(FilterError::UnsupportedMethod("elliptical approximation"));
    }

    validate_arguments(band, critical_frequencies, gains);
    assert!(sampling_frequency > 0.0, "sampling frequency must be positive");

    let fs = sampling_frequency;
    // Fractions of pi -> radians/sample -> prewarped analog frequencies.
    let warped: Vec<f64> = critical_frequencies
        .iter()
        .map(|f| prewarp(f * PI, fs))
        .collect();

    tracing::debug!(
        %approximation,
        %band,
        ?critical_frequencies,
        "designing real IIR filter"
    );

    let analog = match band {
        BandType::Lowpass => {
            let mut proto = synthesize(approximation, warped[0], gains[0], warped[1], gains[1], tol);
            transform::to_lowpass(&mut proto);
            proto
        }
        BandType::Highpass => {
            // Invert the axis to pose an equivalent lowpass problem.
            let (stop, pass) = (warped[0], warped[1]);
            let mut proto = synthesize(
                approximation,
                1.0 / pass,
                gains[1],
                1.0 / stop,
                gains[0],
                tol,
            );
            let fc = 1.0 / proto.analog_fc();
            proto.set_analog_fc(fc);
            transform::to_highpass(&mut proto);
            proto
        }
        BandType::Bandpass => {
            let (lo, hi, outer) = (warped[0], warped[1], warped[2]);
            let center = (lo * hi).sqrt();
            let width = hi - lo;
            // The band edges map to 1 under the band substitution; the outer
            // reference maps to the equivalent lowpass stop edge.
            let stop_eq = ((outer * outer - center * center) / (width * outer)).abs();
            assert!(
                stop_eq > 1.0,
                "stop reference must fall outside the transition region"
            );
            let mut proto = synthesize(approximation, 1.0, gains[0], stop_eq, gains[2], tol);
            proto.set_freq_center(center);
            proto.set_freq_width(width * proto.analog_fc());
            apply_band(transform::to_bandpass, &mut proto);
            proto
        }
        BandType::Bandstop => {
            let (outer, lo, hi) = (warped[0], warped[1], warped[2]);
            let center = (lo * hi).sqrt();
            let width = hi - lo;
            let pass_eq = ((width * outer) / (center * center - outer * outer)).abs();
            assert!(
                pass_eq < 1.0,
                "pass reference must fall outside the transition region"
            );
            let mut proto = synthesize(approximation, pass_eq, gains[0], 1.0, gains[1], tol);
            proto.set_freq_center(center);
            proto.set_freq_width(width / proto.analog_fc());
            apply_band(transform::to_bandstop, &mut proto);
            proto
        }
    };

    let digital = bilinear(&analog, fs);
    tracing::debug!(order = digital.order(), "design complete");
    Ok(digital)
}

fn synthesize(
    approximation: ApproximationMethod,
    pass_edge: f64,
    pass_gain: f64,
    stop_edge: f64,
    stop_gain: f64,
    tol: Tolerances,
) -> AnalogFilter {
    match approximation {
        ApproximationMethod::Butterworth => {
            prototype::butterworth(pass_edge, pass_gain, stop_edge, stop_gain, tol)
        }
        ApproximationMethod::ChebyshevI => {
            prototype::chebyshev1(pass_edge, pass_gain, stop_edge, stop_gain, tol)
        }
        ApproximationMethod::ChebyshevII => {
            prototype::chebyshev2(pass_edge, pass_gain, stop_edge, stop_gain, tol)
        }
        ApproximationMethod::Elliptical => unreachable!("rejected before synthesis"),
    }
}

/// Run a band transform, downgrading quartic non-convergence to a warning:
/// the transform has already applied its best-effort factors.
fn apply_band(
    transform: fn(&mut AnalogFilter) -> Result<(), FilterError>,
    proto: &mut AnalogFilter,
) {
    if let Err(err) = transform(proto) {
        tracing::warn!(%err, "band transform finished with degraded precision");
    }
}

fn validate_arguments(band: BandType, frequencies: &[f64], gains: &[f64]) {
    let expected = match band {
        BandType::Lowpass | BandType::Highpass => 2,
        BandType::Bandpass | BandType::Bandstop => 3,
    };
    assert_eq!(
        frequencies.len(),
        expected,
        "{} design takes {} critical frequencies",
        band,
        expected
    );
    assert_eq!(
        gains.len(),
        expected,
        "one gain per critical frequency"
    );
    for window in frequencies.windows(2) {
        assert!(window[0] < window[1], "frequencies must be strictly increasing");
    }
    for &f in frequencies {
        assert!(f > 0.0 && f < 1.0, "frequencies are fractions of pi in (0, 1)");
    }
    for &g in gains {
        assert!(g > 0.0 && g < 1.0, "gains are linear magnitudes in (0, 1)");
    }
}
