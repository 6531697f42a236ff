//! Offline filter design
//!
//! Produces coefficient objects for the streaming filters: analog
//! prototypes mapped to digital IIR designs through the bilinear transform,
//! notch designs, and windowed-sinc FIR designs. Nothing here holds
//! streaming state.

pub mod band;
pub mod fir;
pub mod pole_zero;
pub mod prototype;

pub use band::{Band, IirDesign};
pub use fir::{FirDesign, FirWindow, next_pow2, peak_gain};
pub use pole_zero::{PoleZeroLayout, PoleZeroPair};
pub use prototype::IirPrototype;
