//! Lowpass/highpass/bandpass/bandstop transforms
//!
//! Frequencies are normalized so that 1.0 is the Nyquist frequency. The same
//! band maps an analog [`IirPrototype`] to a digital [`IirDesign`] through
//! the bilinear transform, or a [`FirWindow`] to a windowed-sinc
//! [`FirDesign`].

use std::f64::consts::{FRAC_PI_2, PI};

use log::warn;
use num_complex::Complex64;

use super::fir::{FirDesign, FirWindow};
use super::pole_zero::{PoleZeroLayout, is_infinite};
use super::prototype::IirPrototype;
use crate::constants::BAND_EDGE_EPSILON;
use crate::error::{FilterError, Result};

/// Digital IIR design: z-plane poles and zeros ready for conversion to
/// second-order sections.
#[derive(Debug, Clone, PartialEq)]
pub struct IirDesign {
    layout: PoleZeroLayout,
}

impl IirDesign {
    pub fn from_layout(layout: PoleZeroLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &PoleZeroLayout {
        &self.layout
    }

    pub fn num_stages(&self) -> usize {
        self.layout.num_stages()
    }

    /// Second-order notch at `center` with 3 dB width `bandwidth`, both
    /// normalized to Nyquist.
    pub fn notch(center: f64, bandwidth: f64) -> Result<Self> {
        check_unit("notch center", center)?;
        if bandwidth.is_nan() || bandwidth <= 0.0 || bandwidth > 1.0 {
            return Err(FilterError::InvalidCutoff(bandwidth));
        }

        let gain = 1.0 / (1.0 + (0.5 * bandwidth * PI).tan());
        let w = center * PI;
        let zero = Complex64::from_polar(1.0, w);

        // Root of z^2 - 2g cos(w) z + (2g - 1) with non-negative imaginary part.
        let half_trace = gain * w.cos();
        let discriminant = Complex64::new(half_trace * half_trace - (2.0 * gain - 1.0), 0.0);
        let pole = half_trace + discriminant.sqrt();

        let mut layout = PoleZeroLayout::new();
        layout.add_conjugate_pair(pole, zero);
        layout.set_normal(0.0, 1.0);
        Ok(Self { layout })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Band {
    Lowpass { cutoff: f64 },
    Highpass { cutoff: f64 },
    Bandpass { low: f64, high: f64 },
    Bandstop { low: f64, high: f64 },
}

impl Band {
    pub fn lowpass(cutoff: f64) -> Result<Self> {
        let band = Band::Lowpass { cutoff };
        band.validate()?;
        Ok(band)
    }

    pub fn highpass(cutoff: f64) -> Result<Self> {
        let band = Band::Highpass { cutoff };
        band.validate()?;
        Ok(band)
    }

    pub fn bandpass(low: f64, high: f64) -> Result<Self> {
        let band = Band::Bandpass { low, high };
        band.validate()?;
        Ok(band)
    }

    pub fn bandstop(low: f64, high: f64) -> Result<Self> {
        let band = Band::Bandstop { low, high };
        band.validate()?;
        Ok(band)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Band::Lowpass { cutoff } | Band::Highpass { cutoff } => {
                check_unit("cutoff", cutoff)
            }
            Band::Bandpass { low, high } | Band::Bandstop { low, high } => {
                if low.is_nan() || high.is_nan() || low >= high || low < 0.0 || high > 1.0 {
                    return Err(FilterError::InvalidBand { low, high });
                }
                Ok(())
            }
        }
    }

    /// Bilinear transform of an analog prototype into a digital design.
    pub fn iir(&self, analog: &IirPrototype) -> Result<IirDesign> {
        self.validate()?;
        let layout = match *self {
            Band::Lowpass { cutoff } => lowpass(analog.layout(), cutoff),
            Band::Highpass { cutoff } => highpass(analog.layout(), cutoff),
            Band::Bandpass { low, high } => bandpass(analog.layout(), low, high),
            Band::Bandstop { low, high } => bandstop(analog.layout(), low, high),
        };
        Ok(IirDesign { layout })
    }

    /// Windowed-sinc FIR design with unity peak gain.
    pub fn fir(&self, window: &FirWindow) -> Result<FirDesign> {
        self.validate()?;
        let design = match *self {
            Band::Lowpass { cutoff } => {
                let mut d = FirDesign::windowed_sinc(window, cutoff, |x| (cutoff * x).sin() / x);
                d.gain_to_unity()?;
                d
            }
            Band::Highpass { cutoff } => {
                let mut d =
                    FirDesign::windowed_sinc(window, 1.0 - cutoff, |x| -(cutoff * x).sin() / x);
                d.dc_to_zero(window);
                d.gain_to_unity()?;
                d
            }
            Band::Bandpass { low, high } => {
                let mut d = FirDesign::windowed_sinc(window, high - low, |x| {
                    ((high * x).sin() - (low * x).sin()) / x
                });
                d.dc_to_zero(window);
                d.gain_to_unity()?;
                d
            }
            Band::Bandstop { low, high } => {
                let mut d = FirDesign::windowed_sinc(window, 1.0 + low - high, |x| {
                    ((low * x).sin() - (high * x).sin()) / x
                });
                d.gain_to_unity()?;
                d
            }
        };
        Ok(design)
    }
}

fn check_unit(what: &str, value: f64) -> Result<()> {
    if value.is_nan() || !(0.0..=1.0).contains(&value) {
        log::debug!("Rejecting {} {}", what, value);
        return Err(FilterError::InvalidCutoff(value));
    }
    Ok(())
}

/// Maps each analog pair (or trailing single) of `analog` through `map`.
fn map_pairs(
    analog: &PoleZeroLayout,
    digital: &mut PoleZeroLayout,
    map: impl Fn(Complex64) -> Complex64,
) {
    for pair in analog.pairs() {
        let pole = map(pair.poles.0);
        let zero = map(pair.zeros.0);
        if pair.is_single_pole() {
            digital.add_single(Complex64::new(pole.re, 0.0), Complex64::new(zero.re, 0.0));
        } else {
            digital.add_conjugate_pair(pole, zero);
        }
    }
}

fn lowpass(analog: &PoleZeroLayout, cutoff: f64) -> PoleZeroLayout {
    let f = (FRAC_PI_2 * cutoff).tan();
    let mut digital = PoleZeroLayout::new();
    map_pairs(analog, &mut digital, |c| {
        if is_infinite(c) {
            return Complex64::new(-1.0, 0.0);
        }
        let c = c * f;
        (1.0 + c) / (1.0 - c)
    });
    digital.set_normal(analog.normal_w(), analog.normal_gain());
    digital
}

fn highpass(analog: &PoleZeroLayout, cutoff: f64) -> PoleZeroLayout {
    let f = 1.0 / (FRAC_PI_2 * cutoff).tan();
    let mut digital = PoleZeroLayout::new();
    map_pairs(analog, &mut digital, |c| {
        if is_infinite(c) {
            return Complex64::new(1.0, 0.0);
        }
        let c = c * f;
        -(1.0 + c) / (1.0 - c)
    });
    digital.set_normal(PI - analog.normal_w(), analog.normal_gain());
    digital
}

fn band_edges(low: f64, high: f64, upper: f64) -> (f64, f64) {
    let mut wc2 = low * FRAC_PI_2;
    let mut wc = high * FRAC_PI_2;
    if wc2 < BAND_EDGE_EPSILON {
        warn!("Band lower edge {} moved up to {}", low, BAND_EDGE_EPSILON);
        wc2 = BAND_EDGE_EPSILON;
    }
    if wc > upper - BAND_EDGE_EPSILON {
        warn!("Band upper edge {} moved below the transform limit", high);
        wc = upper - BAND_EDGE_EPSILON;
    }
    (wc2, wc)
}

fn bandpass(analog: &PoleZeroLayout, low: f64, high: f64) -> PoleZeroLayout {
    let (wc2, wc) = band_edges(low, high, FRAC_PI_2);

    let a = (wc + wc2).cos() / (wc - wc2).cos();
    let b = 1.0 / (wc - wc2).tan();
    let ab_2 = 2.0 * a * b;
    let t = b * b * (a * a - 1.0);
    let t1 = 4.0 * (t + 1.0);
    let t2 = 8.0 * (t - 1.0);

    let transform = |c: Complex64| -> (Complex64, Complex64) {
        if is_infinite(c) {
            return (Complex64::new(-1.0, 0.0), Complex64::new(1.0, 0.0));
        }
        let c = (1.0 + c) / (1.0 - c);
        let w = c * ab_2 + ab_2;
        let v = ((c * t1 + t2) * c + t1).sqrt();
        let d = ((b - 1.0) * c + (b + 1.0)) * 2.0;
        ((w - v) / d, (w + v) / d)
    };

    let mut digital = PoleZeroLayout::new();
    for pair in analog.pairs() {
        let poles = transform(pair.poles.0);
        let zeros = transform(pair.zeros.0);
        if pair.is_single_pole() {
            digital.add_pair(poles, zeros);
        } else {
            digital.add_conjugate_pair(poles.0, zeros.0);
            digital.add_conjugate_pair(poles.1, zeros.1);
        }
    }

    let wn = analog.normal_w() * 0.5;
    let normal_w = 2.0 * ((wc + wn).tan() * (wc2 + wn).tan()).sqrt().atan();
    digital.set_normal(normal_w, analog.normal_gain());
    digital
}

fn bandstop(analog: &PoleZeroLayout, low: f64, high: f64) -> PoleZeroLayout {
    let (wc2, wc) = band_edges(low, high, PI);

    let a = (wc + wc2).cos() / (wc - wc2).cos();
    let b = (wc - wc2).tan();
    let a2 = a * a;
    let b2 = b * b;
    let t1 = 4.0 * (b2 + a2 - 1.0);
    let t2 = 8.0 * (b2 - a2 + 1.0);

    let transform = |c: Complex64| -> (Complex64, Complex64) {
        let c = if is_infinite(c) {
            Complex64::new(-1.0, 0.0)
        } else {
            (1.0 + c) / (1.0 - c)
        };
        let w = (1.0 - c) * a;
        let u = ((c * t1 + t2) * c + t1).sqrt() * 0.5;
        let d = (b - 1.0) * c + (b + 1.0);
        ((w + u) / d, (w - u) / d)
    };

    let mut digital = PoleZeroLayout::new();
    for pair in analog.pairs() {
        let poles = transform(pair.poles.0);
        let zeros = transform(pair.zeros.0);
        if pair.is_single_pole() {
            digital.add_pair(poles, zeros);
        } else {
            digital.add_conjugate_pair(poles.0, zeros.0);
            digital.add_conjugate_pair(poles.1, zeros.1);
        }
    }

    let normal_w = if wc + wc2 < FRAC_PI_2 { PI } else { 0.0 };
    digital.set_normal(normal_w, analog.normal_gain());
    digital
}
