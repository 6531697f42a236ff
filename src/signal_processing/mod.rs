pub mod band_rms;
pub mod delay;
pub mod filter;
pub mod fir_core;
pub mod iir;
pub mod math;
pub mod moving_average;
pub mod polynomial_fir;
pub mod running_stats;
pub mod sos;

pub use band_rms::{BandRms, BandRmsCoeffs, BandRmsState, IirBandRms};
pub use delay::{Delay, DelayCoeffs, DelayState};
pub use filter::{DynFilter, Filter, Real, Sample, State, SteadyState};
pub use fir_core::{Fir, FirCoeffs, FirState, RingBuffer};
pub use iir::{Df1State, Df2State, Df2tState, Iir, IirDf1, IirDf2, Topology};
pub use moving_average::{
    CumulativeCoeffs, CumulativeMovingAverage, CumulativeState, MovingAverage,
    MovingAverageCoeffs, MovingAverageState,
};
pub use polynomial_fir::{PolynomialFir, PolynomialFirCoeffs, PolynomialFirState};
pub use running_stats::{
    Extremum, Max, Min, MonotonicDeque, RunningExtremumState, RunningMax, RunningMin,
    RunningRange, RunningRangeState, RunningStatsCoeffs, push_min_max,
};
pub use sos::{Biquad, SecondOrderSections};
