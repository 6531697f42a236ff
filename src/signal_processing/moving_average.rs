//! Running mean over a fixed window, optionally cascaded
//!
//! Each stage keeps a running sum over a shared circular buffer, so the
//! cost per sample is independent of the window length. Floating-point
//! drift in the running sums is bounded by rebuilding them every `length`
//! samples from a sum that only ever accumulated one window's worth of
//! values.

use num_traits::NumCast;

use super::filter::{Filter, Sample, State, SteadyState};
use super::fir_core::RingBuffer;
use super::math::count_as;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingAverageCoeffs {
    pub length: usize,
    pub stages: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovingAverageState<T> {
    channels: usize,
    /// One slot holds the inputs of every stage: `stage * channels + c`.
    ring: RingBuffer<T>,
    sums: Vec<T>,
    corrections: Vec<T>,
    /// Samples seen, saturating at the window length.
    count: usize,
    count_value: T,
    until_correction: usize,
}

impl<T: Sample> State for MovingAverageState<T> {
    type Sample = T;
    type Coeffs = MovingAverageCoeffs;

    fn setup(&mut self, coeffs: &MovingAverageCoeffs, channels: usize) {
        let rows = channels * coeffs.stages;
        if self.channels != channels || self.ring.resize(rows, coeffs.length) {
            self.channels = channels;
            self.ring.resize(rows, coeffs.length);
            self.sums = vec![T::zero(); rows];
            self.corrections = vec![T::zero(); rows];
            self.count = 0;
            self.count_value = T::zero();
            self.until_correction = coeffs.length;
        }
    }

    fn reset(&mut self) {
        self.ring.clear();
        self.sums.iter_mut().for_each(|s| *s = T::zero());
        self.corrections.iter_mut().for_each(|s| *s = T::zero());
        self.count = 0;
        self.count_value = T::zero();
        self.until_correction = self.ring.len();
    }

    fn apply(&mut self, coeffs: &MovingAverageCoeffs, frame: &mut [T]) {
        if self.ring.is_empty() {
            frame.iter_mut().for_each(|x| *x = T::zero());
            return;
        }
        self.ring.advance();

        if self.count == coeffs.length {
            for (sum, evicted) in self.sums.iter_mut().zip(self.ring.current()) {
                *sum = *sum - *evicted;
            }
        } else {
            self.count += 1;
            self.count_value = self.count_value + T::one();
        }

        let channels = self.channels;
        let slot = self.ring.current_mut();
        for stage in 0..coeffs.stages {
            for (c, x) in frame.iter_mut().enumerate() {
                let k = stage * channels + c;
                slot[k] = *x;
                self.corrections[k] = self.corrections[k] + *x;
                self.sums[k] = self.sums[k] + *x;
                *x = self.sums[k] / self.count_value;
            }
        }

        self.until_correction -= 1;
        if self.until_correction == 0 {
            self.sums.copy_from_slice(&self.corrections);
            self.corrections.iter_mut().for_each(|s| *s = T::zero());
            self.until_correction = coeffs.length;
        }
    }
}

impl<T: Sample> SteadyState for MovingAverageState<T> {
    fn steady_state(&mut self, coeffs: &MovingAverageCoeffs, x_ss: &[T]) {
        if self.ring.is_empty() {
            return;
        }
        // Every stage of a settled cascade sees the same constant.
        let column: Vec<T> = (0..coeffs.stages).flat_map(|_| x_ss.iter().copied()).collect();
        self.ring.fill(&column);

        let window = count_as::<T>(coeffs.length);
        for (sum, &x) in self.sums.iter_mut().zip(&column) {
            *sum = x * window;
        }
        self.corrections.iter_mut().for_each(|s| *s = T::zero());
        self.count = coeffs.length;
        self.count_value = window;
        self.until_correction = coeffs.length;
    }
}

/// Moving average with `stages` cascaded passes over a `length` window. A
/// zero length outputs zero.
pub type MovingAverage<T> = Filter<MovingAverageState<T>>;

impl<T: Sample> Filter<MovingAverageState<T>> {
    pub fn new(length: usize) -> Self {
        Self::cascaded(length, 1)
    }

    /// Create a cascade of moving averages sharing one window length
    ///
    /// # Arguments
    /// * `length` - Samples per window (larger = smoother but slower response)
    /// * `stages` - Number of passes; each one smooths the previous output
    pub fn cascaded(length: usize, stages: usize) -> Self {
        Self::from_coeffs(MovingAverageCoeffs { length, stages })
    }

    pub fn length(&self) -> usize {
        self.coeffs().length
    }

    pub fn stages(&self) -> usize {
        self.coeffs().stages
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CumulativeCoeffs;

/// Mean over everything seen since the last reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CumulativeState<T> {
    averages: Vec<T>,
    count: u64,
}

impl<T: Sample> State for CumulativeState<T> {
    type Sample = T;
    type Coeffs = CumulativeCoeffs;

    fn setup(&mut self, _coeffs: &CumulativeCoeffs, channels: usize) {
        if self.averages.len() != channels {
            self.averages = vec![T::zero(); channels];
            self.count = 0;
        }
    }

    fn reset(&mut self) {
        self.averages.iter_mut().for_each(|a| *a = T::zero());
        self.count = 0;
    }

    fn apply(&mut self, _coeffs: &CumulativeCoeffs, frame: &mut [T]) {
        let first = self.count == 0;
        self.count = self.count.saturating_add(1);
        // A count the sample type cannot hold exceeds any difference it can
        // hold, so the integer update would be zero anyway.
        let count = if first {
            None
        } else {
            <T as NumCast>::from(self.count)
        };
        for (avg, x) in self.averages.iter_mut().zip(frame.iter_mut()) {
            // The first output is defined as zero; averaging starts with
            // the second sample.
            if let Some(n) = count {
                *avg = *avg + (*x - *avg) / n;
            }
            *x = *avg;
        }
    }
}

/// Cumulative (unbounded window) moving average.
pub type CumulativeMovingAverage<T> = Filter<CumulativeState<T>>;

impl<T: Sample> Filter<CumulativeState<T>> {
    pub fn new() -> Self {
        Self::from_coeffs(CumulativeCoeffs)
    }

    /// Frames seen since the last reset.
    pub fn count(&self) -> u64 {
        self.state().count
    }
}

impl<T: Sample> Default for Filter<CumulativeState<T>> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_then_full_window() {
        let mut ma = MovingAverage::new(3);
        let out: Vec<f64> = [3.0, 6.0, 9.0, 12.0, 0.0]
            .iter()
            .map(|&x| ma.process(x))
            .collect();
        assert_eq!(out, vec![3.0, 4.5, 6.0, 9.0, 7.0]);
    }

    #[test]
    fn test_integer_samples() {
        let mut ma = MovingAverage::new(2);
        let out: Vec<i32> = [4, 8, 2, 2].iter().map(|&x| ma.process(x)).collect();
        assert_eq!(out, vec![4, 6, 5, 2]);
    }

    #[test]
    fn test_two_stage_equals_two_filters() {
        let input: Vec<f64> = (0..50).map(|i| ((i * 13) % 17) as f64).collect();

        let mut cascade = MovingAverage::cascaded(5, 2);
        let mut first = MovingAverage::new(5);
        let mut second = MovingAverage::new(5);
        for &x in &input {
            let expected = second.process(first.process(x));
            let y = cascade.process(x);
            assert!((y - expected).abs() < 1e-12, "{} vs {}", y, expected);
        }
        assert_eq!(cascade.stages(), 2);
    }

    #[test]
    fn test_zero_length_outputs_zero() {
        let mut ma = MovingAverage::<f32>::new(0);
        assert_eq!(ma.process(5.0), 0.0);
        assert_eq!(ma.length(), 0);
    }

    #[test]
    fn test_steady_state() {
        let mut ma = MovingAverage::cascaded(4, 3);
        ma.initialize_steady(&[1.5, -2.0]);
        for _ in 0..10 {
            let mut frame = [1.5, -2.0];
            ma.apply_frame(&mut frame);
            assert_eq!(frame, [1.5, -2.0]);
        }
    }

    #[test]
    fn test_cumulative_first_output_zero() {
        let mut cma = CumulativeMovingAverage::new();
        let out: Vec<f64> = [10.0, 4.0, 8.0].iter().map(|&x| cma.process(x)).collect();
        // Running mean of [0, 4, 8] after the first sample.
        assert_eq!(out, vec![0.0, 2.0, 4.0]);
        assert_eq!(cma.count(), 3);
    }

    #[test]
    fn test_cumulative_count_outlives_narrow_samples() {
        // Past i16::MAX frames the i16 filter must keep tracking the same
        // truncated mean as a wide integer one.
        let mut narrow = CumulativeMovingAverage::<i16>::new();
        let mut wide = CumulativeMovingAverage::<i64>::new();
        for i in 0..40_000 {
            let x = ((i * 7) % 13) as i16 * 10 + 40;
            let y = narrow.process(x);
            assert_eq!(y as i64, wide.process(x as i64), "frame {}", i);
        }
        assert_eq!(narrow.count(), 40_000);

        let mut constant = CumulativeMovingAverage::<i16>::new();
        let mut y = 0;
        for _ in 0..40_000 {
            y = constant.process(100);
        }
        // Integer truncation stalls the mean once 100 - mean < count.
        assert_eq!(y, 89);
    }
}
