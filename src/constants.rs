//! Numeric constants shared by the design and streaming code
//!
//! These keep the bilinear transforms and the RMS estimator well defined at
//! the edges of their domains.

/// Band edges closer than this (in radians) to 0 or to the upper limit are
/// moved inward before a bandpass or bandstop bilinear transform.
pub const BAND_EDGE_EPSILON: f64 = 1e-8;

/// Ratio between the peak and the RMS amplitude of a sinusoid, squared.
/// Band RMS multiplies the mean square by this to report sine amplitude.
pub const SINE_RMS_CORRECTION: f64 = 2.0;
