use num_complex::Complex;

use super::filter::Real;
use super::math::cast;
use crate::design::{IirDesign, PoleZeroPair};
use crate::error::{FilterError, Result};

/// One second-order section. `m1`, `m2` are the negated feedback
/// coefficients, so `y = x + b1·x1 + b2·x2 + m1·y1 + m2·y2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad<T> {
    pub b1: T,
    pub b2: T,
    pub m1: T,
    pub m2: T,
}

impl<T: Real> Biquad<T> {
    pub fn new(b1: T, b2: T, m1: T, m2: T) -> Self {
        Self { b1, b2, m1, m2 }
    }

    /// Section with poles and zeros taken from `pair`.
    pub fn from_pole_zero_pair(pair: &PoleZeroPair) -> Self {
        let (z1, z2) = pair.zeros;
        let (p1, p2) = pair.poles;

        // Complex roots come in conjugate pairs; real roots may differ.
        let (b1, b2) = if z1.im != 0.0 {
            (-2.0 * z1.re, z1.norm_sqr())
        } else {
            (-(z1.re + z2.re), z1.re * z2.re)
        };
        let (m1, m2) = if p1.im != 0.0 {
            (2.0 * p1.re, -p1.norm_sqr())
        } else {
            (p1.re + p2.re, -(p1.re * p2.re))
        };
        Self::new(cast(b1), cast(b2), cast(m1), cast(m2))
    }

    /// Ratio of output to input for a constant input.
    pub fn dc_gain(&self) -> T {
        (T::one() + self.b1 + self.b2) / (T::one() - self.m1 - self.m2)
    }
}

/// Cascade of biquads with one overall gain factor.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondOrderSections<T> {
    stages: Vec<Biquad<T>>,
    scaling: T,
}

impl<T: Real> SecondOrderSections<T> {
    pub fn new(stages: Vec<Biquad<T>>, scaling: T) -> Self {
        Self { stages, scaling }
    }

    /// Convert a digital design, normalizing the response at the design's
    /// normal frequency to its normal gain.
    pub fn from_design(design: &IirDesign) -> Self {
        let layout = design.layout();
        let stages = layout
            .pairs()
            .iter()
            .map(Biquad::from_pole_zero_pair)
            .collect();
        let mut sos = Self::new(stages, T::one());

        let w: T = cast(layout.normal_w());
        let gain = sos.response(w).norm();
        sos.scaling = cast::<T>(layout.normal_gain()) / gain;
        sos
    }

    /// Fail unless the cascade has exactly `expected` stages.
    pub fn expect_stages(self, expected: usize) -> Result<Self> {
        if self.stages.len() != expected {
            return Err(FilterError::StageMismatch {
                expected,
                actual: self.stages.len(),
            });
        }
        Ok(self)
    }

    pub fn stages(&self) -> &[Biquad<T>] {
        &self.stages
    }

    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }

    pub fn scaling(&self) -> T {
        self.scaling
    }

    /// Output for a constant input of one.
    pub fn dc_gain(&self) -> T {
        self.stages
            .iter()
            .fold(self.scaling, |acc, s| acc * s.dc_gain())
    }

    /// Complex response at `w` radians per sample.
    pub fn response(&self, w: T) -> Complex<T> {
        let czn1 = Complex::from_polar(T::one(), -w);
        let czn2 = Complex::from_polar(T::one(), -(w + w));
        let one = Complex::new(T::one(), T::zero());

        let mut z = Complex::new(self.scaling, T::zero());
        for s in &self.stages {
            z = z * (one + czn1 * s.b1 + czn2 * s.b2) / (one - czn1 * s.m1 - czn2 * s.m2);
        }
        z
    }

    /// Complex response at frequency `f`, where 1.0 is Nyquist.
    pub fn response_normalized(&self, f: T) -> Complex<T> {
        self.response(f * cast::<T>(std::f64::consts::PI))
    }
}
