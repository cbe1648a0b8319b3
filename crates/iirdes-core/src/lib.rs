//! # IIR Filter Design & Realization Engine
//!
//! This crate designs classical infinite-impulse-response digital filters
//! and realizes them as cascades of biquad (second-order) sections with
//! explicit internal state.
//!
//! ## Overview
//!
//! The pipeline follows the textbook analog-prototype route:
//!
//! - **Prototype synthesis**: Butterworth or Chebyshev Type I/II unit-cutoff
//!   analog lowpass prototypes from band-edge specifications
//! - **Frequency transform**: lowpass / highpass / bandpass / bandstop
//!   shaping by substitution on the analog axis
//! - **Bilinear mapping**: `s = 2*fs*(z-1)/(z+1)` with prewarped band edges
//! - **Realization**: per-sample direct-form-II evaluation through the
//!   cascade, plus impulse- and frequency-response queries
//!
//! ## Signal Flow
//!
//! ```text
//! spec -> prototype -> freq transform -> bilinear -> DigitalFilter -> y[n]
//!          (analog)      (analog)       (digital)     get_output()
//! ```
//!
//! ## Example
//!
//! ```rust
//! use iirdes_core::prelude::*;
//!
//! // Butterworth lowpass: pass edge 0.2*pi at 0.99, stop edge 0.3*pi at 0.1.
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
//! assert!(filter.is_stable());
//! let filtered = filter.get_response(&[1.0, 0.5, -0.25, 0.0]);
//! assert_eq!(filtered.len(), 4);
//! ```

pub mod analog;
pub mod bilinear;
pub mod config;
pub mod design;
pub mod digital;
pub mod error;
pub mod factor;
pub mod observe;
pub mod pole_zero;
pub mod polynomial;
pub mod prototype;
pub mod transform;

mod cascade;

pub use analog::AnalogFilter;
pub use config::Tolerances;
pub use design::{design_real_iir, ApproximationMethod, BandType, MappingMethod};
pub use digital::DigitalFilter;
pub use error::FilterError;
pub use factor::{Domain, Factor};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::analog::AnalogFilter;
    pub use crate::bilinear::bilinear;
    pub use crate::config::Tolerances;
    pub use crate::design::{
        design_real_iir, design_real_iir_with, prewarp, unwarp, ApproximationMethod, BandType,
        MappingMethod,
    };
    pub use crate::digital::DigitalFilter;
    pub use crate::error::FilterError;
    pub use crate::factor::{Domain, Factor};
    pub use crate::prototype;
    pub use crate::transform;
}
