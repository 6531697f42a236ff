use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Cutoff frequency {0} outside normalized range [0, 1]")]
    InvalidCutoff(f64),

    #[error("Frequency band [{low}, {high}] must be ordered and inside [0, 1]")]
    InvalidBand { low: f64, high: f64 },

    #[error("Filter order must be at least 1, got {0}")]
    InvalidOrder(usize),

    #[error("Ripple must be positive, got {0} dB")]
    InvalidRipple(f64),

    #[error("Stage count mismatch: expected {expected}, design has {actual}")]
    StageMismatch { expected: usize, actual: usize },

    #[error("Polynomial coefficients malformed: {0}")]
    PolynomialShape(String),

    #[error("Filter design failed: {0}")]
    FilterDesign(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for FilterError {
    fn from(err: toml::de::Error) -> Self {
        FilterError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
