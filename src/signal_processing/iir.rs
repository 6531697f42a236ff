//! IIR cascades in three direct-form topologies
//!
//! All three realize the same transfer function for the same
//! [`SecondOrderSections`]; they differ in what history they keep and in
//! rounding behaviour. DF2T is the default.

use serde::Deserialize;

use super::filter::{Filter, Real, State, SteadyState};
use super::sos::SecondOrderSections;
use crate::design::IirDesign;
use crate::error::Result;

/// Runtime choice of IIR state topology, for configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    Df1,
    Df2,
    #[default]
    Df2t,
}

/// Input reaching each stage of the cascade for a constant input of one.
fn stage_inputs<T: Real>(sos: &SecondOrderSections<T>) -> impl Iterator<Item = T> + '_ {
    sos.stages().iter().scan(T::one(), |gain, s| {
        let input = *gain;
        *gain = *gain * s.dc_gain();
        Some(input)
    })
}

/// Direct form I: keeps `(x1, x2, y1, y2)` per stage and channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Df1State<T> {
    channels: usize,
    history: Vec<[T; 4]>,
}

impl<T: Real> State for Df1State<T> {
    type Sample = T;
    type Coeffs = SecondOrderSections<T>;

    fn setup(&mut self, sos: &SecondOrderSections<T>, channels: usize) {
        let len = channels * sos.num_stages();
        if self.channels != channels || self.history.len() != len {
            self.channels = channels;
            self.history = vec![[T::zero(); 4]; len];
        }
    }

    fn reset(&mut self) {
        self.history.iter_mut().for_each(|h| *h = [T::zero(); 4]);
    }

    fn apply(&mut self, sos: &SecondOrderSections<T>, frame: &mut [T]) {
        let n = sos.num_stages();
        for (c, x) in frame.iter_mut().enumerate() {
            let mut v = *x;
            for (s, h) in sos.stages().iter().zip(&mut self.history[c * n..(c + 1) * n]) {
                let y = v + s.b1 * h[0] + s.b2 * h[1] + s.m1 * h[2] + s.m2 * h[3];
                *h = [v, h[0], y, h[2]];
                v = y;
            }
            *x = v * sos.scaling();
        }
    }
}

impl<T: Real> SteadyState for Df1State<T> {
    fn steady_state(&mut self, sos: &SecondOrderSections<T>, x_ss: &[T]) {
        let n = sos.num_stages();
        for (j, (s, input)) in sos.stages().iter().zip(stage_inputs(sos)).enumerate() {
            let r = s.dc_gain();
            for (c, &x) in x_ss.iter().enumerate() {
                let v = x * input;
                self.history[c * n + j] = [v, v, v * r, v * r];
            }
        }
    }
}

/// Direct form II: keeps the internal `(w1, w2)` per stage and channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Df2State<T> {
    channels: usize,
    history: Vec<[T; 2]>,
}

impl<T: Real> State for Df2State<T> {
    type Sample = T;
    type Coeffs = SecondOrderSections<T>;

    fn setup(&mut self, sos: &SecondOrderSections<T>, channels: usize) {
        let len = channels * sos.num_stages();
        if self.channels != channels || self.history.len() != len {
            self.channels = channels;
            self.history = vec![[T::zero(); 2]; len];
        }
    }

    fn reset(&mut self) {
        self.history.iter_mut().for_each(|h| *h = [T::zero(); 2]);
    }

    fn apply(&mut self, sos: &SecondOrderSections<T>, frame: &mut [T]) {
        let n = sos.num_stages();
        for (c, x) in frame.iter_mut().enumerate() {
            let mut v = *x;
            for (s, w) in sos.stages().iter().zip(&mut self.history[c * n..(c + 1) * n]) {
                let w0 = v + s.m1 * w[0] + s.m2 * w[1];
                v = w0 + s.b1 * w[0] + s.b2 * w[1];
                *w = [w0, w[0]];
            }
            *x = v * sos.scaling();
        }
    }
}

impl<T: Real> SteadyState for Df2State<T> {
    fn steady_state(&mut self, sos: &SecondOrderSections<T>, x_ss: &[T]) {
        let n = sos.num_stages();
        for (j, (s, input)) in sos.stages().iter().zip(stage_inputs(sos)).enumerate() {
            let feedback = T::one() - s.m1 - s.m2;
            for (c, &x) in x_ss.iter().enumerate() {
                let w = x * input / feedback;
                self.history[c * n + j] = [w, w];
            }
        }
    }
}

/// Transposed direct form II: keeps `(d1, d2)` per stage and channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Df2tState<T> {
    channels: usize,
    history: Vec<[T; 2]>,
}

impl<T: Real> State for Df2tState<T> {
    type Sample = T;
    type Coeffs = SecondOrderSections<T>;

    fn setup(&mut self, sos: &SecondOrderSections<T>, channels: usize) {
        let len = channels * sos.num_stages();
        if self.channels != channels || self.history.len() != len {
            self.channels = channels;
            self.history = vec![[T::zero(); 2]; len];
        }
    }

    fn reset(&mut self) {
        self.history.iter_mut().for_each(|h| *h = [T::zero(); 2]);
    }

    fn apply(&mut self, sos: &SecondOrderSections<T>, frame: &mut [T]) {
        let n = sos.num_stages();
        for (c, x) in frame.iter_mut().enumerate() {
            let mut v = *x;
            for (s, d) in sos.stages().iter().zip(&mut self.history[c * n..(c + 1) * n]) {
                let y = v + d[0];
                *d = [s.b1 * v + s.m1 * y + d[1], s.b2 * v + s.m2 * y];
                v = y;
            }
            *x = v * sos.scaling();
        }
    }
}

impl<T: Real> SteadyState for Df2tState<T> {
    fn steady_state(&mut self, sos: &SecondOrderSections<T>, x_ss: &[T]) {
        let n = sos.num_stages();
        for (j, (s, input)) in sos.stages().iter().zip(stage_inputs(sos)).enumerate() {
            let r = s.dc_gain();
            for (c, &x) in x_ss.iter().enumerate() {
                let v = x * input;
                self.history[c * n + j] = [(r - T::one()) * v, (s.b2 + s.m2 * r) * v];
            }
        }
    }
}

/// IIR cascade, transposed direct form II.
pub type Iir<T> = Filter<Df2tState<T>>;
pub type IirDf1<T> = Filter<Df1State<T>>;
pub type IirDf2<T> = Filter<Df2State<T>>;

macro_rules! iir_constructors {
    ($($state:ident),*) => {$(
        impl<T: Real> Filter<$state<T>> {
            pub fn new(sos: SecondOrderSections<T>) -> Self {
                Self::from_coeffs(sos)
            }

            pub fn from_design(design: &IirDesign) -> Self {
                Self::new(SecondOrderSections::from_design(design))
            }

            /// Like `from_design`, for callers that size buffers by stage count
            ///
            /// # Arguments
            /// * `design` - Digital pole/zero layout
            /// * `stages` - Number of second-order sections the caller expects
            ///
            /// # Returns
            /// The filter, or `StageMismatch` if the design has a different
            /// number of sections
            pub fn from_design_with_stages(design: &IirDesign, stages: usize) -> Result<Self> {
                Ok(Self::new(SecondOrderSections::from_design(design).expect_stages(stages)?))
            }

            pub fn num_stages(&self) -> usize {
                self.coeffs().num_stages()
            }
        }
    )*};
}

iir_constructors!(Df1State, Df2State, Df2tState);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{Band, IirPrototype};
    use crate::signal_processing::sos::Biquad;

    fn lowpass() -> SecondOrderSections<f64> {
        let proto = IirPrototype::butterworth(3).unwrap();
        SecondOrderSections::from_design(&Band::lowpass(0.25).unwrap().iir(&proto).unwrap())
    }

    #[test]
    fn test_single_pole_recursion() {
        // y[n] = x[n] + 0.5 y[n-1]
        let sos = SecondOrderSections::new(vec![Biquad::new(0.0, 0.0, 0.5, 0.0)], 1.0);
        let mut iir = Iir::new(sos);
        let out: Vec<f64> = [1.0, 0.0, 0.0, 0.0].iter().map(|&x| iir.process(x)).collect();
        assert_eq!(out, vec![1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn test_scaling_applied_once() {
        let sos = SecondOrderSections::new(
            vec![Biquad::new(1.0, 0.0, 0.0, 0.0), Biquad::new(1.0, 0.0, 0.0, 0.0)],
            0.25,
        );
        let mut iir = IirDf1::new(sos);
        let out: Vec<f64> = [1.0, 0.0, 0.0, 0.0].iter().map(|&x| iir.process(x)).collect();
        assert_eq!(out, vec![0.25, 0.5, 0.25, 0.0]);
    }

    #[test]
    fn test_lowpass_settles_to_dc() {
        let mut iir = Iir::new(lowpass());
        assert_eq!(iir.num_stages(), 2);
        let mut y = 0.0;
        for _ in 0..500 {
            y = iir.process(3.0);
        }
        assert!((y - 3.0).abs() < 1e-9, "settled at {}", y);
    }

    #[test]
    fn test_topologies_agree() {
        let mut df1 = IirDf1::new(lowpass());
        let mut df2 = IirDf2::new(lowpass());
        let mut df2t = Iir::new(lowpass());
        for t in 0..200 {
            let x = ((t * 37) % 23) as f64 - 11.0;
            let a = df1.process(x);
            let b = df2.process(x);
            let c = df2t.process(x);
            assert!((a - b).abs() < 1e-9, "DF1 vs DF2 at {}", t);
            assert!((a - c).abs() < 1e-9, "DF1 vs DF2T at {}", t);
        }
    }

    #[test]
    fn test_steady_state_is_fixed_point() {
        let x_ss = [2.0, -5.0];
        let mut df1 = IirDf1::new(lowpass());
        let mut df2 = IirDf2::new(lowpass());
        let mut df2t = Iir::new(lowpass());
        df1.initialize_steady(&x_ss);
        df2.initialize_steady(&x_ss);
        df2t.initialize_steady(&x_ss);

        let before = (df1.state().clone(), df2.state().clone(), df2t.state().clone());
        let mut frames = [x_ss; 3];
        df1.apply_frame(&mut frames[0]);
        df2.apply_frame(&mut frames[1]);
        df2t.apply_frame(&mut frames[2]);

        for frame in &frames {
            for (y, x) in frame.iter().zip(&x_ss) {
                assert!((y - x).abs() < 1e-9, "{} != {}", y, x);
            }
        }
        for (a, b) in before.2.history.iter().zip(&df2t.state().history) {
            assert!((a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9);
        }
        for (a, b) in before.0.history.iter().zip(&df1.state().history) {
            for k in 0..4 {
                assert!((a[k] - b[k]).abs() < 1e-9);
            }
        }
        for (a, b) in before.1.history.iter().zip(&df2.state().history) {
            assert!((a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_stage_count_checked() {
        let proto = IirPrototype::butterworth(4).unwrap();
        let design = Band::bandpass(0.1, 0.2).unwrap().iir(&proto).unwrap();
        assert!(Iir::<f32>::from_design_with_stages(&design, 4).is_ok());
        assert!(IirDf2::<f32>::from_design_with_stages(&design, 3).is_err());
    }

    #[test]
    fn test_topology_default() {
        assert_eq!(Topology::default(), Topology::Df2t);
    }
}
