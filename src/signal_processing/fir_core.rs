use super::filter::{Filter, Real, Sample, State, SteadyState};
use crate::design::FirDesign;

/// Circular frame buffer shared by the FIR, delay, moving-average and
/// polynomial FIR states.
///
/// Holds `len` slots of `rows` samples each. The write position moves
/// backwards by one slot per frame, so reading forward from the current
/// slot visits frames from newest to oldest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingBuffer<T> {
    data: Vec<T>,
    rows: usize,
    len: usize,
    pos: usize,
}

impl<T: Sample> RingBuffer<T> {
    /// Reshape to `len` slots of `rows` samples. Returns true (and clears
    /// the history) only if the shape changed.
    pub fn resize(&mut self, rows: usize, len: usize) -> bool {
        if self.rows == rows && self.len == len && self.data.len() == rows * len {
            return false;
        }
        self.rows = rows;
        self.len = len;
        self.data = vec![T::zero(); rows * len];
        self.pos = 0;
        true
    }

    pub fn clear(&mut self) {
        self.data.iter_mut().for_each(|v| *v = T::zero());
        self.pos = 0;
    }

    /// Set every slot to `frame`.
    pub fn fill(&mut self, frame: &[T]) {
        for slot in self.data.chunks_exact_mut(self.rows.max(1)) {
            slot.copy_from_slice(frame);
        }
        self.pos = 0;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Step the write position back one slot, onto the oldest frame.
    pub fn advance(&mut self) {
        if self.len == 0 {
            return;
        }
        self.pos = if self.pos == 0 { self.len - 1 } else { self.pos - 1 };
    }

    /// Slot at the write position. Must not be called on an empty buffer.
    pub fn current(&self) -> &[T] {
        let start = self.pos * self.rows;
        &self.data[start..start + self.rows]
    }

    pub fn current_mut(&mut self) -> &mut [T] {
        let start = self.pos * self.rows;
        &mut self.data[start..start + self.rows]
    }

    /// The buffer split at the write position: frames from newest up to the
    /// end of storage, then the wrapped remainder (older frames).
    pub fn split(&self) -> (&[T], &[T]) {
        let (wrapped, newest) = self.data.split_at(self.pos * self.rows);
        (newest, wrapped)
    }
}

/// FIR tap vector. Index 0 weights the newest sample.
#[derive(Debug, Clone, PartialEq)]
pub struct FirCoeffs<T> {
    taps: Vec<T>,
}

impl<T: Sample> FirCoeffs<T> {
    pub fn new(taps: Vec<T>) -> Self {
        Self { taps }
    }

    pub fn taps(&self) -> &[T] {
        &self.taps
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirState<T> {
    ring: RingBuffer<T>,
}

impl<T: Sample> State for FirState<T> {
    type Sample = T;
    type Coeffs = FirCoeffs<T>;

    const NATIVE_DRY_RUN: bool = true;

    fn setup(&mut self, coeffs: &FirCoeffs<T>, channels: usize) {
        self.ring.resize(channels, coeffs.len());
    }

    fn reset(&mut self) {
        self.ring.clear();
    }

    fn apply(&mut self, coeffs: &FirCoeffs<T>, frame: &mut [T]) {
        if self.ring.is_empty() || frame.is_empty() {
            frame.iter_mut().for_each(|x| *x = T::zero());
            return;
        }
        self.ring.advance();
        self.ring.current_mut().copy_from_slice(frame);

        // Two contiguous passes over the ring avoid modulo arithmetic in the
        // inner loop.
        let rows = self.ring.rows();
        let (newest, older) = self.ring.split();
        let (near_taps, far_taps) = coeffs.taps.split_at(newest.len() / rows);
        for (c, y) in frame.iter_mut().enumerate() {
            let mut acc = T::zero();
            for (tap, slot) in near_taps.iter().zip(newest.chunks_exact(rows)) {
                acc = acc + *tap * slot[c];
            }
            for (tap, slot) in far_taps.iter().zip(older.chunks_exact(rows)) {
                acc = acc + *tap * slot[c];
            }
            *y = acc;
        }
    }

    fn update(&mut self, _coeffs: &FirCoeffs<T>, frame: &[T]) {
        if self.ring.is_empty() {
            return;
        }
        self.ring.advance();
        self.ring.current_mut().copy_from_slice(frame);
    }
}

impl<T: Sample> SteadyState for FirState<T> {
    fn steady_state(&mut self, _coeffs: &FirCoeffs<T>, x_ss: &[T]) {
        self.ring.fill(x_ss);
    }
}

/// Causal FIR filter over a circular buffer.
pub type Fir<T> = Filter<FirState<T>>;

impl<T: Sample> Filter<FirState<T>> {
    pub fn new(taps: Vec<T>) -> Self {
        Self::from_coeffs(FirCoeffs::new(taps))
    }

    /// Number of taps.
    pub fn length(&self) -> usize {
        self.coeffs().len()
    }
}

impl<T: Real> Filter<FirState<T>> {
    pub fn from_design(design: &FirDesign) -> Self {
        Self::new(design.taps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(taps: &[f64], input: &[f64]) -> Vec<f64> {
        (0..input.len())
            .map(|t| {
                taps.iter()
                    .enumerate()
                    .filter(|(k, _)| *k <= t)
                    .map(|(k, b)| b * input[t - k])
                    .sum()
            })
            .collect()
    }

    #[test]
    fn test_ring_buffer_order() {
        let mut ring = RingBuffer::<i32>::default();
        assert!(ring.resize(1, 3));
        assert!(!ring.resize(1, 3));
        for x in 1..=4 {
            ring.advance();
            ring.current_mut()[0] = x;
        }
        // Newest first: 4, then 3, 2 wrapped around.
        let (newest, older) = ring.split();
        let ordered: Vec<i32> = newest.iter().chain(older).copied().collect();
        assert_eq!(ordered, vec![4, 3, 2]);
    }

    #[test]
    fn test_impulse_response_is_taps() {
        let taps = vec![0.5, -0.25, 0.125, 2.0];
        let mut fir = Fir::new(taps.clone());
        let mut output = vec![0.0; 8];
        output[0] = 1.0;
        fir.process_buffer(&mut output);
        assert_eq!(&output[..4], &taps[..]);
        assert!(output[4..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_matches_direct_convolution() {
        let taps = vec![0.3, 0.1, -0.2, 0.05, 0.7];
        let input: Vec<f64> = (0..40).map(|i| ((i * 7) % 11) as f64 - 5.0).collect();
        let expected = reference(&taps, &input);

        let mut fir = Fir::new(taps);
        let mut output = input.clone();
        fir.process_buffer(&mut output);

        for (t, (y, e)) in output.iter().zip(&expected).enumerate() {
            assert!((y - e).abs() < 1e-12, "mismatch at sample {}", t);
        }
    }

    #[test]
    fn test_integer_taps() {
        let mut fir = Fir::new(vec![1, 2, 3]);
        let out: Vec<i32> = [1, 0, 0, 1].iter().map(|&x| fir.process(x)).collect();
        assert_eq!(out, vec![1, 2, 3, 1]);
    }

    #[test]
    fn test_multichannel_independent() {
        let mut fir = Fir::new(vec![1.0, 1.0]);
        let mut block = vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0];
        fir.apply_block(&mut block, 2);
        assert_eq!(block, vec![1.0, 10.0, 3.0, 30.0, 5.0, 50.0]);
    }

    #[test]
    fn test_empty_taps_output_zero() {
        let mut fir = Fir::<f32>::new(Vec::new());
        assert_eq!(fir.process(3.0), 0.0);
        assert_eq!(fir.length(), 0);
    }

    #[test]
    fn test_steady_state_output() {
        let mut fir = Fir::new(vec![0.25, 0.5, 0.25, 1.0]);
        fir.initialize_steady(&[2.0, -1.0]);
        let mut frame = [2.0, -1.0];
        fir.apply_frame(&mut frame);
        assert_eq!(frame, [4.0, -2.0]);
    }
}
