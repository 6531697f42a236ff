use super::filter::{Filter, Sample, State, SteadyState};
use super::fir_core::RingBuffer;

/// Number of samples a [`Delay`] holds back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayCoeffs {
    pub length: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DelayState<T> {
    ring: RingBuffer<T>,
}

impl<T: Sample> State for DelayState<T> {
    type Sample = T;
    type Coeffs = DelayCoeffs;

    const NATIVE_DRY_RUN: bool = true;

    fn setup(&mut self, coeffs: &DelayCoeffs, channels: usize) {
        self.ring.resize(channels, coeffs.length);
    }

    fn reset(&mut self) {
        self.ring.clear();
    }

    fn apply(&mut self, _coeffs: &DelayCoeffs, frame: &mut [T]) {
        if self.ring.is_empty() {
            return;
        }
        self.ring.advance();
        // The slot being overwritten holds the frame from `length` steps ago.
        for (stored, x) in self.ring.current_mut().iter_mut().zip(frame.iter_mut()) {
            std::mem::swap(stored, x);
        }
    }

    fn update(&mut self, _coeffs: &DelayCoeffs, frame: &[T]) {
        if self.ring.is_empty() {
            return;
        }
        self.ring.advance();
        self.ring.current_mut().copy_from_slice(frame);
    }
}

impl<T: Sample> SteadyState for DelayState<T> {
    fn steady_state(&mut self, _coeffs: &DelayCoeffs, x_ss: &[T]) {
        self.ring.fill(x_ss);
    }
}

/// Fixed delay line. A zero length passes samples through unchanged.
pub type Delay<T> = Filter<DelayState<T>>;

impl<T: Sample> Filter<DelayState<T>> {
    pub fn new(length: usize) -> Self {
        Self::from_coeffs(DelayCoeffs { length })
    }

    pub fn length(&self) -> usize {
        self.coeffs().length
    }
}
