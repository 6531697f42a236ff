//! FIR filter whose tap weights are polynomials in the sample age
//!
//! The weight of the sample of age `t` (1 = newest) is
//! `Σ_i a_i · C(t + i - 1, i)`, so with two stages it is `a_0 + a_1·t`.
//! Each `a_i` is a ratio of polynomials in the number of samples in the
//! window, which lets the weights track a growing window until it fills.
//! Cumulative sums make the per-sample cost independent of the window
//! length.

use super::filter::{Filter, Real, State, SteadyState};
use super::fir_core::RingBuffer;
use super::math::{cast, rising_binomials, window_binomials};
use crate::error::{FilterError, Result};

/// Numerator and denominator polynomials, one row per stage, coefficients
/// in increasing powers of the window count.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialFirCoeffs<T> {
    numerator: Vec<Vec<T>>,
    denominator: Vec<Vec<T>>,
    length: usize,
}

impl<T: Real> PolynomialFirCoeffs<T> {
    pub fn new(numerator: Vec<Vec<T>>, denominator: Vec<Vec<T>>, length: usize) -> Result<Self> {
        if numerator.len() != denominator.len() {
            return Err(FilterError::PolynomialShape(format!(
                "numerator has {} stages, denominator has {}",
                numerator.len(),
                denominator.len()
            )));
        }
        check_rectangular("numerator", &numerator)?;
        check_rectangular("denominator", &denominator)?;
        Ok(Self {
            numerator,
            denominator,
            length,
        })
    }

    pub fn stages(&self) -> usize {
        self.numerator.len()
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Stage coefficients `a_i` for a window holding `n` samples.
    pub fn weights(&self, n: usize, out: &mut [T]) {
        let n: T = cast(n as f64);
        for ((a, p), q) in out.iter_mut().zip(&self.numerator).zip(&self.denominator) {
            let den = horner(q, n);
            *a = if den == T::zero() {
                T::zero()
            } else {
                horner(p, n) / den
            };
        }
    }
}

fn horner<T: Real>(poly: &[T], x: T) -> T {
    poly.iter().rev().fold(T::zero(), |acc, &c| acc * x + c)
}

fn check_rectangular<T>(what: &str, rows: &[Vec<T>]) -> Result<()> {
    if let Some(first) = rows.first() {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != first.len()) {
            return Err(FilterError::PolynomialShape(format!(
                "{} row {} has {} coefficients, expected {}",
                what,
                i,
                row.len(),
                first.len()
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolynomialFirState<T> {
    channels: usize,
    ring: RingBuffer<T>,
    /// Cumulative sums, `stage * channels + c`.
    sums: Vec<T>,
    weights: Vec<T>,
    /// Weight of the oldest sample in each cumulative sum, for eviction.
    eviction: Vec<T>,
    count: usize,
}

impl<T: Real> State for PolynomialFirState<T> {
    type Sample = T;
    type Coeffs = PolynomialFirCoeffs<T>;

    fn setup(&mut self, coeffs: &PolynomialFirCoeffs<T>, channels: usize) {
        let stages = coeffs.stages();
        if self.channels != channels
            || self.ring.resize(channels, coeffs.length)
            || self.weights.len() != stages
        {
            self.channels = channels;
            self.ring.resize(channels, coeffs.length);
            self.sums = vec![T::zero(); channels * stages];
            self.weights = vec![T::zero(); stages];
            self.eviction = rising_binomials(coeffs.length, stages);
            self.count = 0;
        }
    }

    fn reset(&mut self) {
        self.ring.clear();
        self.sums.iter_mut().for_each(|s| *s = T::zero());
        self.weights.iter_mut().for_each(|a| *a = T::zero());
        self.count = 0;
    }

    fn apply(&mut self, coeffs: &PolynomialFirCoeffs<T>, frame: &mut [T]) {
        if self.ring.is_empty() {
            frame.iter_mut().for_each(|x| *x = T::zero());
            return;
        }
        let channels = self.channels;
        self.ring.advance();

        if self.count == coeffs.length {
            for (c, &old) in self.ring.current().iter().enumerate() {
                for (i, w) in self.eviction.iter().enumerate() {
                    let s = &mut self.sums[i * channels + c];
                    *s = *s - old * *w;
                }
            }
        } else {
            self.count += 1;
            coeffs.weights(self.count, &mut self.weights);
        }
        self.ring.current_mut().copy_from_slice(frame);

        for (c, x) in frame.iter_mut().enumerate() {
            let mut carry = *x;
            let mut y = T::zero();
            for (i, a) in self.weights.iter().enumerate() {
                let s = &mut self.sums[i * channels + c];
                *s = *s + carry;
                carry = *s;
                y = y + *a * carry;
            }
            *x = y;
        }
    }
}

impl<T: Real> SteadyState for PolynomialFirState<T> {
    fn steady_state(&mut self, coeffs: &PolynomialFirCoeffs<T>, x_ss: &[T]) {
        if self.ring.is_empty() {
            return;
        }
        let channels = self.channels;
        self.ring.fill(x_ss);
        self.count = coeffs.length;
        coeffs.weights(self.count, &mut self.weights);
        for (i, total) in window_binomials::<T>(coeffs.length, coeffs.stages())
            .into_iter()
            .enumerate()
        {
            for (c, &x) in x_ss.iter().enumerate() {
                self.sums[i * channels + c] = x * total;
            }
        }
    }
}

pub type PolynomialFir<T> = Filter<PolynomialFirState<T>>;

impl<T: Real> Filter<PolynomialFirState<T>> {
    /// Create a polynomial FIR filter
    ///
    /// Stage `i` weights its cumulative sum by `P_i(n) / Q_i(n)`, where `n`
    /// is the number of samples in the window.
    ///
    /// # Arguments
    /// * `numerator` - One row of polynomial coefficients per stage, lowest power first
    /// * `denominator` - Same shape rules as `numerator`, one row per stage
    /// * `length` - Window length in samples
    ///
    /// # Returns
    /// The filter, or `PolynomialShape` if the stage counts differ or a
    /// matrix is ragged
    pub fn new(numerator: Vec<Vec<T>>, denominator: Vec<Vec<T>>, length: usize) -> Result<Self> {
        Ok(Self::from_coeffs(PolynomialFirCoeffs::new(
            numerator,
            denominator,
            length,
        )?))
    }
}
