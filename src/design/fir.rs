//! FIR windows and windowed-sinc designs

use std::f64::consts::PI;

use log::trace;
use num_complex::Complex64;
use num_traits::{Float, NumCast};
use rustfft::FftPlanner;

use crate::error::{FilterError, Result};

/// Asymmetric window with `future` taps ahead of the center and `past`
/// taps behind it. Index 0 is the future-most tap.
#[derive(Debug, Clone, PartialEq)]
pub struct FirWindow {
    index0: usize,
    coeffs: Vec<f64>,
    sum: f64,
}

impl FirWindow {
    fn build(
        future: usize,
        past: usize,
        rising: impl Fn(f64) -> f64,
        falling: impl Fn(f64) -> f64,
    ) -> Self {
        let mut coeffs = Vec::with_capacity(future + 1 + past);

        let omega = PI / (future + 1) as f64;
        coeffs.extend((1..=future).map(|t| rising(omega * t as f64)));
        coeffs.push(1.0);
        let omega = PI / (past + 1) as f64;
        coeffs.extend((1..=past).map(|t| falling(omega * t as f64)));

        let sum = coeffs.iter().sum();
        Self {
            index0: future,
            coeffs,
            sum,
        }
    }

    pub fn hann(future: usize, past: usize) -> Self {
        Self::build(
            future,
            past,
            |x| 0.5 - 0.5 * x.cos(),
            |x| 0.5 + 0.5 * x.cos(),
        )
    }

    pub fn hamming(future: usize, past: usize) -> Self {
        Self::build(
            future,
            past,
            |x| 0.54 - 0.46 * x.cos(),
            |x| 0.54 + 0.46 * x.cos(),
        )
    }

    pub fn blackman(future: usize, past: usize) -> Self {
        Self::build(
            future,
            past,
            |x| 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
            |x| 0.42 + 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
        )
    }

    /// Position of the center tap.
    pub fn index0(&self) -> usize {
        self.index0
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }
}

/// FIR tap vector produced by a band transform.
#[derive(Debug, Clone, PartialEq)]
pub struct FirDesign {
    coeffs: Vec<f64>,
}

impl FirDesign {
    pub fn from_coeffs(coeffs: Vec<f64>) -> Self {
        Self { coeffs }
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Taps cast to the filter's sample type.
    pub fn taps<T: Float>(&self) -> Vec<T> {
        self.coeffs
            .iter()
            .map(|&c| <T as NumCast>::from(c).unwrap_or_else(T::nan))
            .collect()
    }

    /// Ideal response `f(t·π)` (center value `f0`) shaped by `window`.
    pub(crate) fn windowed_sinc(window: &FirWindow, f0: f64, f: impl Fn(f64) -> f64) -> Self {
        let n = window.len();
        let center = window.index0;
        let mut coeffs = vec![0.0; n];
        coeffs[center] = f0;

        let reach = center.max(n - center - 1);
        for t in 1..=reach {
            let y = f(t as f64 * PI);
            if let Some(i) = center.checked_sub(t) {
                coeffs[i] = y * window.coeffs[i];
            }
            if center + t < n {
                coeffs[center + t] = y * window.coeffs[center + t];
            }
        }
        Self { coeffs }
    }

    /// Subtract a scaled copy of the window so the taps sum to zero.
    pub(crate) fn dc_to_zero(&mut self, window: &FirWindow) {
        let k = self.coeffs.iter().sum::<f64>() / window.sum;
        for (c, w) in self.coeffs.iter_mut().zip(&window.coeffs) {
            *c -= w * k;
        }
    }

    /// Scale so the peak magnitude response is one. Fails when the taps
    /// have no response to scale, e.g. a single tap zeroed by DC removal.
    pub(crate) fn gain_to_unity(&mut self) -> Result<()> {
        let gain = peak_gain(&self.coeffs);
        if !(gain.is_finite() && gain > 0.0) {
            return Err(FilterError::FilterDesign(format!(
                "peak gain of {} taps is {}",
                self.coeffs.len(),
                gain
            )));
        }
        self.coeffs.iter_mut().for_each(|c| *c /= gain);
        Ok(())
    }
}

/// Smallest power of two not less than `n`.
pub fn next_pow2(n: usize) -> usize {
    n.next_power_of_two()
}

/// Largest magnitude of the zero-padded DFT of `coeffs` over the half
/// spectrum.
pub fn peak_gain(coeffs: &[f64]) -> f64 {
    if coeffs.is_empty() {
        return 0.0;
    }
    let n = next_pow2(coeffs.len());
    trace!("FIR gain FFT of size {} for {} taps", n, coeffs.len());

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex64> = coeffs
        .iter()
        .map(|&c| Complex64::new(c, 0.0))
        .chain(std::iter::repeat(Complex64::new(0.0, 0.0)))
        .take(n)
        .collect();
    fft.process(&mut buffer);

    buffer[..=n / 2]
        .iter()
        .map(|z| z.norm())
        .fold(0.0, f64::max)
}
