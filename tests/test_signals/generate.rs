use rand::{RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// `len` values drawn uniformly from `[low, high)`, reproducible for a seed.
pub fn uniform(seed: u64, len: usize, low: f64, high: f64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| low + (high - low) * rng.random::<f64>())
        .collect()
}

/// `len` integers drawn uniformly from `[low, high]`.
pub fn uniform_integers(seed: u64, len: usize, low: i32, high: i32) -> Vec<i32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let span = (high - low + 1) as f64;
    (0..len)
        .map(|_| (low + (span * rng.random::<f64>()) as i32).min(high))
        .collect()
}

/// Interleaved sine of `frequency` (1.0 = Nyquist), channel `c` shifted by
/// `c` radians.
pub fn sine(frequency: f64, amplitude: f64, frames: usize, channels: usize) -> Vec<f64> {
    let w = std::f64::consts::PI * frequency;
    (0..frames)
        .flat_map(|t| (0..channels).map(move |c| amplitude * (w * t as f64 + c as f64).sin()))
        .collect()
}

/// Interleaved `(t + c) % period`, easy to recognise after a delay.
pub fn sawtooth(frames: usize, channels: usize, period: i32) -> Vec<i32> {
    (0..frames as i32)
        .flat_map(|t| (0..channels as i32).map(move |c| (t + c) % period))
        .collect()
}
