//! Band-limited RMS estimator
//!
//! Bandpass filter, square, smooth with an expectation filter, then scale
//! so that a sinusoid in the band reports its peak amplitude:
//! `y = sqrt(2·|E[bp(x)²]|)`.

use std::fmt;

use super::filter::{Filter, Real, State, SteadyState};
use super::iir::Df2tState;
use super::math::cast;
use super::moving_average::MovingAverageState;
use crate::constants::SINE_RMS_CORRECTION;

/// Coefficients of both sub-filters.
pub struct BandRmsCoeffs<B: State, E: State> {
    pub bandpass: B::Coeffs,
    pub expectation: E::Coeffs,
}

impl<B: State, E: State> Clone for BandRmsCoeffs<B, E> {
    fn clone(&self) -> Self {
        Self {
            bandpass: self.bandpass.clone(),
            expectation: self.expectation.clone(),
        }
    }
}

impl<B: State, E: State> fmt::Debug for BandRmsCoeffs<B, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BandRmsCoeffs")
            .field("bandpass", &self.bandpass)
            .field("expectation", &self.expectation)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BandRmsState<B, E> {
    bandpass: B,
    expectation: E,
}

impl<T, B, E> State for BandRmsState<B, E>
where
    T: Real,
    B: State<Sample = T>,
    E: State<Sample = T>,
{
    type Sample = T;
    type Coeffs = BandRmsCoeffs<B, E>;

    fn setup(&mut self, coeffs: &Self::Coeffs, channels: usize) {
        self.bandpass.setup(&coeffs.bandpass, channels);
        self.expectation.setup(&coeffs.expectation, channels);
    }

    fn reset(&mut self) {
        self.bandpass.reset();
        self.expectation.reset();
    }

    fn apply(&mut self, coeffs: &Self::Coeffs, frame: &mut [T]) {
        self.bandpass.apply(&coeffs.bandpass, frame);
        frame.iter_mut().for_each(|x| *x = *x * *x);
        self.expectation.apply(&coeffs.expectation, frame);
        let correction: T = cast(SINE_RMS_CORRECTION);
        frame
            .iter_mut()
            .for_each(|x| *x = (correction * x.abs()).sqrt());
    }
}

impl<T, B, E> SteadyState for BandRmsState<B, E>
where
    T: Real,
    B: SteadyState<Sample = T>,
    E: SteadyState<Sample = T>,
{
    fn steady_state(&mut self, coeffs: &Self::Coeffs, x_ss: &[T]) {
        self.bandpass.steady_state(&coeffs.bandpass, x_ss);

        // What the settled bandpass emits for x_ss, squared, is what the
        // expectation filter has been seeing.
        let mut settled = x_ss.to_vec();
        self.bandpass.clone().apply(&coeffs.bandpass, &mut settled);
        settled.iter_mut().for_each(|x| *x = *x * *x);
        self.expectation.steady_state(&coeffs.expectation, &settled);
    }
}

/// Band RMS with arbitrary sub-filters.
pub type BandRms<B, E> = Filter<BandRmsState<B, E>>;

/// Band RMS over a DF2T IIR bandpass and a moving-average expectation.
pub type IirBandRms<T> = BandRms<Df2tState<T>, MovingAverageState<T>>;

impl<T, B, E> Filter<BandRmsState<B, E>>
where
    T: Real,
    B: State<Sample = T>,
    E: State<Sample = T>,
{
    pub fn new(bandpass: B::Coeffs, expectation: E::Coeffs) -> Self {
        Self::from_coeffs(BandRmsCoeffs {
            bandpass,
            expectation,
        })
    }

    /// Take over the coefficients of two existing filters. Their state is
    /// discarded.
    pub fn from_filters(bandpass: Filter<B>, expectation: Filter<E>) -> Self {
        Self::new(bandpass.into_coeffs(), expectation.into_coeffs())
    }
}
