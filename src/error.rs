// src/error.rs

//! Error types for structure loading, tensor construction and rescaling.

use thiserror::Error;

/// Errors raised while building or rescaling a crystal graph tensor.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Zero sites, non-positive lattice lengths, unknown elements or
    /// otherwise malformed structure data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// More sites than the fixed site block can hold.
    #[error("Out of range: {sites} sites requested, at most {max} fit in the tensor")]
    OutOfRange {
        /// Number of sites supplied
        sites: usize,
        /// Capacity of the site block
        max: usize,
    },

    /// The calibration table has no usable value for a feature.
    #[error("Missing calibration constant for feature '{0}'")]
    MissingCalibrationConstant(&'static str),

    /// An input form accepted by the API that has no conversion yet.
    #[error("Unsupported input form: {0}")]
    UnsupportedInputForm(String),

    /// Normalize on an already normalized tensor, or the reverse.
    #[error("State error: tensor is already {}", scale_name(.normalized))]
    State {
        /// Value of the `normalized` flag when the call was rejected
        normalized: bool,
    },

    /// Space-group search failed.
    #[error("Symmetry error: {0}")]
    Symmetry(String),

    /// Reading a structure or config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed or written.
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl EncodeError {
    /// Create an InvalidInput error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

fn scale_name(normalized: &bool) -> &'static str {
    if *normalized {
        "normalized"
    } else {
        "unnormalized"
    }
}

pub type Result<T> = std::result::Result<T, EncodeError>;
