//! Design a Butterworth lowpass and print its responses
//!
//! Run with: cargo run --example design_lowpass -p iirdes-core

use iirdes_core::observe::{init_logging, LogConfig};
use iirdes_core::prelude::*;
use std::f64::consts::PI;

fn main() {
    init_logging(&LogConfig::development());

    // Pass edge 0.2*pi at gain 0.99, stop edge 0.3*pi at gain 0.1.
    let mut filter = design_real_iir(
        MappingMethod::Bilinear,
        ApproximationMethod::Butterworth,
        BandType::Lowpass,
        &[0.2, 0.3],
        &[0.99, 0.1],
        1.0,
    )
    .expect("bilinear Butterworth design");

    println!(
        "order {} filter in {} sections (stable: {})\n",
        filter.order(),
        filter.num_sections(),
        filter.is_stable()
    );

    println!("poles:");
    for p in filter.get_poles() {
        println!("  {:+.6} {:+.6}j  (|p| = {:.6})", p.re, p.im, p.norm());
    }

    println!("\nmagnitude response:");
    for i in 0..=10 {
        let theta = PI * i as f64 / 10.0;
        let mag = filter.frequency_response_at(theta).norm();
        let bar = "#".repeat((mag * 40.0) as usize);
        println!("  {:.2}*pi  {:8.5}  {}", i as f64 / 10.0, mag, bar);
    }

    println!("\nfirst 15 impulse-response taps:");
    let impulse = filter.get_impulse_response();
    for (n, tap) in impulse.iter().take(15).enumerate() {
        println!("  h[{:2}] = {:+.8}", n, tap);
    }
}
