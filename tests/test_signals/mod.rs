pub mod generate;

pub use generate::{sawtooth, sine, uniform, uniform_integers};
