//! Streaming multichannel filters over interleaved sample blocks.
//!
//! Every filter is a [`Filter`] driving a per-type [`State`]: FIR, delay,
//! IIR cascades in three topologies, cascaded moving averages, polynomial
//! FIR, running min/max/range and band RMS. The [`design`] module turns
//! analog prototypes and windows into coefficients, and [`config`] builds
//! chains of filters from TOML.

pub mod config;
pub mod constants;
pub mod design;
pub mod error;
pub mod processing;
pub mod signal_processing;

pub use config::{ChainConfig, FilterConfig};
pub use error::{FilterError, Result};
pub use processing::FilterChain;
pub use signal_processing::{DynFilter, Filter, State, SteadyState};
