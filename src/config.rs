//! Filter chains described in TOML.
//!
//! ```toml
//! channels = 2
//!
//! [[filters]]
//! kind = "iir"
//! prototype = { type = "butterworth", order = 4 }
//! band = { type = "lowpass", cutoff = 0.2 }
//!
//! [[filters]]
//! kind = "moving_average"
//! length = 16
//! ```
//!
//! Frequencies are normalized to Nyquist, so they lie in `[0, 1]`.

use std::str::FromStr;

use serde::Deserialize;

use crate::design::{Band, FirWindow, IirDesign, IirPrototype};
use crate::error::{FilterError, Result};
use crate::processing::FilterChain;
use crate::signal_processing::{
    CumulativeMovingAverage, Delay, DynFilter, Fir, Iir, IirBandRms, IirDf1, IirDf2,
    MovingAverage, PolynomialFir, RunningMax, RunningMin, RunningRange, Topology,
};

#[derive(Clone, Debug, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_channels")]
    pub channels: usize,
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
}

fn default_channels() -> usize {
    1
}

fn default_stages() -> usize {
    1
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            filters: Vec::new(),
        }
    }
}

impl ChainConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn build(&self) -> Result<FilterChain> {
        if self.channels == 0 {
            return Err(FilterError::Config(
                "channel count must be at least 1".to_string(),
            ));
        }
        let filters = self
            .filters
            .iter()
            .map(FilterConfig::build)
            .collect::<Result<Vec<_>>>()?;
        Ok(FilterChain::with_filters(self.channels, filters))
    }
}

impl FromStr for ChainConfig {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_toml_str(s)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterConfig {
    Fir {
        taps: Vec<f64>,
    },
    WindowedFir {
        window: WindowKind,
        future: usize,
        past: usize,
        band: BandConfig,
    },
    Iir {
        prototype: PrototypeConfig,
        band: BandConfig,
        #[serde(default)]
        topology: Topology,
    },
    Notch {
        center: f64,
        bandwidth: f64,
        #[serde(default)]
        topology: Topology,
    },
    Delay {
        length: usize,
    },
    MovingAverage {
        length: usize,
        #[serde(default = "default_stages")]
        stages: usize,
    },
    CumulativeMovingAverage,
    PolynomialFir {
        numerator: Vec<Vec<f64>>,
        denominator: Vec<Vec<f64>>,
        length: usize,
    },
    RunningMin {
        length: usize,
    },
    RunningMax {
        length: usize,
    },
    RunningRange {
        length: usize,
    },
    BandRms {
        prototype: PrototypeConfig,
        low: f64,
        high: f64,
        window: usize,
    },
}

impl FilterConfig {
    pub fn build(&self) -> Result<Box<dyn DynFilter<f64>>> {
        let filter: Box<dyn DynFilter<f64>> = match self {
            FilterConfig::Fir { taps } => Box::new(Fir::new(taps.clone())),
            FilterConfig::WindowedFir {
                window,
                future,
                past,
                band,
            } => {
                let design = band.to_band()?.fir(&window.build(*future, *past))?;
                Box::new(Fir::<f64>::from_design(&design))
            }
            FilterConfig::Iir {
                prototype,
                band,
                topology,
            } => {
                let design = band.to_band()?.iir(&prototype.build()?)?;
                iir_with_topology(&design, *topology)
            }
            FilterConfig::Notch {
                center,
                bandwidth,
                topology,
            } => iir_with_topology(&IirDesign::notch(*center, *bandwidth)?, *topology),
            FilterConfig::Delay { length } => Box::new(Delay::<f64>::new(*length)),
            FilterConfig::MovingAverage { length, stages } => {
                Box::new(MovingAverage::<f64>::cascaded(*length, *stages))
            }
            FilterConfig::CumulativeMovingAverage => {
                Box::new(CumulativeMovingAverage::<f64>::new())
            }
            FilterConfig::PolynomialFir {
                numerator,
                denominator,
                length,
            } => Box::new(PolynomialFir::new(
                numerator.clone(),
                denominator.clone(),
                *length,
            )?),
            FilterConfig::RunningMin { length } => Box::new(RunningMin::<f64>::new(*length)),
            FilterConfig::RunningMax { length } => Box::new(RunningMax::<f64>::new(*length)),
            FilterConfig::RunningRange { length } => {
                Box::new(RunningRange::<f64>::new(*length))
            }
            FilterConfig::BandRms {
                prototype,
                low,
                high,
                window,
            } => {
                let design = Band::bandpass(*low, *high)?.iir(&prototype.build()?)?;
                Box::new(IirBandRms::from_filters(
                    Iir::<f64>::from_design(&design),
                    MovingAverage::new(*window),
                ))
            }
        };
        Ok(filter)
    }
}

fn iir_with_topology(design: &IirDesign, topology: Topology) -> Box<dyn DynFilter<f64>> {
    match topology {
        Topology::Df1 => Box::new(IirDf1::<f64>::from_design(design)),
        Topology::Df2 => Box::new(IirDf2::<f64>::from_design(design)),
        Topology::Df2t => Box::new(Iir::<f64>::from_design(design)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BandConfig {
    Lowpass { cutoff: f64 },
    Highpass { cutoff: f64 },
    Bandpass { low: f64, high: f64 },
    Bandstop { low: f64, high: f64 },
}

impl BandConfig {
    pub fn to_band(self) -> Result<Band> {
        match self {
            BandConfig::Lowpass { cutoff } => Band::lowpass(cutoff),
            BandConfig::Highpass { cutoff } => Band::highpass(cutoff),
            BandConfig::Bandpass { low, high } => Band::bandpass(low, high),
            BandConfig::Bandstop { low, high } => Band::bandstop(low, high),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrototypeConfig {
    Butterworth { order: usize },
    ButterworthShelf { order: usize, gain_db: f64 },
    Chebyshev1 { order: usize, ripple_db: f64 },
    Chebyshev2 { order: usize, ripple_db: f64 },
}

impl PrototypeConfig {
    pub fn build(self) -> Result<IirPrototype> {
        match self {
            PrototypeConfig::Butterworth { order } => IirPrototype::butterworth(order),
            PrototypeConfig::ButterworthShelf { order, gain_db } => {
                IirPrototype::butterworth_shelf(order, gain_db)
            }
            PrototypeConfig::Chebyshev1 { order, ripple_db } => {
                IirPrototype::chebyshev1(order, ripple_db)
            }
            PrototypeConfig::Chebyshev2 { order, ripple_db } => {
                IirPrototype::chebyshev2(order, ripple_db)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Hann,
    Hamming,
    Blackman,
}

impl WindowKind {
    pub fn build(self, future: usize, past: usize) -> FirWindow {
        match self {
            WindowKind::Hann => FirWindow::hann(future, past),
            WindowKind::Hamming => FirWindow::hamming(future, past),
            WindowKind::Blackman => FirWindow::blackman(future, past),
        }
    }
}
