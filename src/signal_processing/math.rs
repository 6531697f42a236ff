use num_traits::NumCast;

use super::filter::{Real, Sample};

/// Convert an `f64` constant to the sample type. Only fails for values the
/// float type cannot represent, which become NaN.
pub fn cast<T: Real>(v: f64) -> T {
    <T as NumCast>::from(v).unwrap_or_else(T::nan)
}

/// `n` as a sample value, built by repeated addition so integer samples
/// need no cast.
pub fn count_as<T: Sample>(n: usize) -> T {
    (0..n).fold(T::zero(), |acc, _| acc + T::one())
}

/// `C(n + i - 1, i)` for `i` in `0..stages`: the weight the `i`-th
/// cumulative sum gives a sample of age `n`.
pub fn rising_binomials<T: Real>(n: usize, stages: usize) -> Vec<T> {
    let n: T = cast(n as f64);
    let mut weights = Vec::with_capacity(stages);
    let mut w = T::one();
    for i in 0..stages {
        if i > 0 {
            let i: T = cast(i as f64);
            w = w * (n + i - T::one()) / i;
        }
        weights.push(w);
    }
    weights
}

/// `C(n + i, i + 1)` for `i` in `0..stages`: the `i`-th cumulative sum of a
/// full window of ones.
pub fn window_binomials<T: Real>(n: usize, stages: usize) -> Vec<T> {
    let n: T = cast(n as f64);
    let mut sums = Vec::with_capacity(stages);
    let mut s = n;
    for i in 0..stages {
        if i > 0 {
            let i: T = cast(i as f64);
            s = s * (n + i) / (i + T::one());
        }
        sums.push(s);
    }
    sums
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_as() {
        assert_eq!(count_as::<i32>(7), 7);
        assert_eq!(count_as::<f32>(0), 0.0);
    }

    #[test]
    fn test_rising_binomials() {
        // C(4,0), C(4,1), C(5,2), C(6,3)
        assert_eq!(rising_binomials::<f64>(4, 4), vec![1.0, 4.0, 10.0, 20.0]);
    }

    #[test]
    fn test_window_binomials_match_sums() {
        let n = 6;
        let stages = 3;
        let weights: Vec<Vec<f64>> = (1..=n).map(|age| rising_binomials(age, stages)).collect();
        let expected = window_binomials::<f64>(n, stages);
        for (i, e) in expected.iter().enumerate() {
            let sum: f64 = weights.iter().map(|w| w[i]).sum();
            assert!((sum - e).abs() < 1e-12, "stage {}: {} vs {}", i, sum, e);
        }
    }
}
