//! Streaming filter contract
//!
//! Every filter in this crate is a [`Filter`] binding an immutable
//! coefficient object to a mutable [`State`]. The driver sizes the state
//! lazily from the channel count it observes and replays blocks one frame
//! at a time, so block processing is always identical to sample-by-sample
//! processing.

use std::fmt;

use log::debug;
use num_traits::{Float, Num, NumCast, Zero};

/// Scalar type a filter can run on.
///
/// Integer types work with the filters that only add, subtract and compare;
/// IIR and polynomial filters require [`Real`].
pub trait Sample:
    Num + NumCast + Copy + Default + PartialOrd + fmt::Debug + Send + Sync + 'static
{
}

impl<T> Sample for T where
    T: Num + NumCast + Copy + Default + PartialOrd + fmt::Debug + Send + Sync + 'static
{
}

/// Floating-point sample type.
pub trait Real: Sample + Float {}

impl<T> Real for T where T: Sample + Float {}

/// Mutable history of one filter algorithm.
///
/// `setup` is called before every frame and must be cheap when the shape is
/// already right. A state whose shape does not match `coeffs` and `channels`
/// reallocates and starts from zero history.
pub trait State: Default + Clone + fmt::Debug + Send {
    type Sample: Sample;
    type Coeffs: Clone + fmt::Debug + Send;

    /// Whether `update` is specialized. When false the driver runs `apply`
    /// on a scratch frame and discards the result.
    const NATIVE_DRY_RUN: bool = false;

    fn setup(&mut self, coeffs: &Self::Coeffs, channels: usize);

    /// Zero the history without changing its shape.
    fn reset(&mut self);

    /// Consume one frame and overwrite it with the filter output.
    fn apply(&mut self, coeffs: &Self::Coeffs, frame: &mut [Self::Sample]);

    /// Consume one frame without producing output.
    fn update(&mut self, coeffs: &Self::Coeffs, frame: &[Self::Sample]) {
        let mut discard = frame.to_vec();
        self.apply(coeffs, &mut discard);
    }
}

/// States with a closed-form fixed point for constant input.
pub trait SteadyState: State {
    /// Put the state where an infinite run of `x_ss` would leave it. The
    /// state has already been sized for `x_ss.len()` channels.
    fn steady_state(&mut self, coeffs: &Self::Coeffs, x_ss: &[Self::Sample]);
}

/// Generic streaming filter driver.
pub struct Filter<S: State> {
    coeffs: S::Coeffs,
    state: S,
    channels: Option<usize>,
    scratch: Vec<S::Sample>,
}

impl<S: State> Filter<S> {
    pub fn from_coeffs(coeffs: S::Coeffs) -> Self {
        Self {
            coeffs,
            state: S::default(),
            channels: None,
            scratch: Vec::new(),
        }
    }

    pub fn coeffs(&self) -> &S::Coeffs {
        &self.coeffs
    }

    pub fn into_coeffs(self) -> S::Coeffs {
        self.coeffs
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Channel count of the most recent frame, if any was seen.
    pub fn channels(&self) -> Option<usize> {
        self.channels
    }

    /// Reset to zero history.
    pub fn initialize(&mut self) {
        self.state.reset();
    }

    fn setup(&mut self, channels: usize) {
        if self.channels != Some(channels) {
            if let Some(previous) = self.channels {
                debug!(
                    "Channel count changed from {} to {}, resetting filter state",
                    previous, channels
                );
            }
            self.channels = Some(channels);
            self.scratch.resize(channels, S::Sample::zero());
        }
        self.state.setup(&self.coeffs, channels);
    }

    /// Process a single-channel sample.
    pub fn process(&mut self, sample: S::Sample) -> S::Sample {
        let mut frame = [sample];
        self.apply_frame(&mut frame);
        frame[0]
    }

    /// Process a single-channel buffer in place.
    pub fn process_buffer(&mut self, buffer: &mut [S::Sample]) {
        self.apply_block(buffer, 1);
    }

    /// Process one frame (one sample per channel) in place.
    pub fn apply_frame(&mut self, frame: &mut [S::Sample]) {
        self.setup(frame.len());
        self.state.apply(&self.coeffs, frame);
    }

    /// Process `input` into `output`, leaving `input` untouched.
    ///
    /// # Panics
    ///
    /// Panics if `input` and `output` differ in length.
    pub fn apply_frame_to(&mut self, input: &[S::Sample], output: &mut [S::Sample]) {
        assert_eq!(
            input.len(),
            output.len(),
            "input and output frames must have the same length"
        );
        output.copy_from_slice(input);
        self.apply_frame(output);
    }

    /// Process an interleaved block (`block[t * channels + c]`) in place.
    ///
    /// Trailing samples that do not fill a whole frame are left untouched.
    pub fn apply_block(&mut self, block: &mut [S::Sample], channels: usize) {
        if channels == 0 {
            return;
        }
        self.setup(channels);
        for frame in block.chunks_exact_mut(channels) {
            self.state.apply(&self.coeffs, frame);
        }
    }

    /// Out-of-place [`Filter::apply_block`].
    ///
    /// # Panics
    ///
    /// Panics if `input` and `output` differ in length.
    pub fn apply_block_to(
        &mut self,
        input: &[S::Sample],
        output: &mut [S::Sample],
        channels: usize,
    ) {
        assert_eq!(
            input.len(),
            output.len(),
            "input and output blocks must have the same length"
        );
        output.copy_from_slice(input);
        self.apply_block(output, channels);
    }

    /// Advance a single-channel filter by one sample without output.
    pub fn dry_run(&mut self, sample: S::Sample) {
        self.dry_run_frame(&[sample]);
    }

    pub fn dry_run_frame(&mut self, frame: &[S::Sample]) {
        self.setup(frame.len());
        self.update_frame(frame);
    }

    pub fn dry_run_block(&mut self, block: &[S::Sample], channels: usize) {
        if channels == 0 {
            return;
        }
        self.setup(channels);
        for frame in block.chunks_exact(channels) {
            self.update_frame(frame);
        }
    }

    fn update_frame(&mut self, frame: &[S::Sample]) {
        if S::NATIVE_DRY_RUN {
            self.state.update(&self.coeffs, frame);
        } else {
            self.scratch.copy_from_slice(frame);
            self.state.apply(&self.coeffs, &mut self.scratch);
        }
    }
}

impl<S: SteadyState> Filter<S> {
    /// Initialize to the fixed point of a constant input, one value per
    /// channel.
    pub fn initialize_steady(&mut self, x_ss: &[S::Sample]) {
        self.setup(x_ss.len());
        self.state.steady_state(&self.coeffs, x_ss);
    }
}

impl<S: State> Clone for Filter<S> {
    fn clone(&self) -> Self {
        Self {
            coeffs: self.coeffs.clone(),
            state: self.state.clone(),
            channels: self.channels,
            scratch: self.scratch.clone(),
        }
    }
}

impl<S: State> fmt::Debug for Filter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("coeffs", &self.coeffs)
            .field("state", &self.state)
            .field("channels", &self.channels)
            .finish()
    }
}

/// Object-safe view of a filter over interleaved blocks, used to chain
/// filters of different types at runtime.
pub trait DynFilter<T>: Send {
    fn apply_block(&mut self, block: &mut [T], channels: usize);

    fn dry_run_block(&mut self, block: &[T], channels: usize);

    fn initialize(&mut self);
}

impl<S: State> DynFilter<S::Sample> for Filter<S> {
    fn apply_block(&mut self, block: &mut [S::Sample], channels: usize) {
        Filter::apply_block(self, block, channels);
    }

    fn dry_run_block(&mut self, block: &[S::Sample], channels: usize) {
        Filter::dry_run_block(self, block, channels);
    }

    fn initialize(&mut self) {
        Filter::initialize(self);
    }
}
