//! Encodes a crystal structure (lattice, space group, sites) as a dense
//! 64×64×4 graph tensor, with a reversible per-feature normalization.
//!
//! ```no_run
//! use crysgraph::TensorEncoder;
//!
//! let enc = TensorEncoder::from_parameters(
//!     5.0, 5.0, 5.0, 90.0, 90.0, 90.0, 1, &[26], &[[0.0, 0.0, 0.0]],
//! )?;
//! assert_eq!(enc.tensor().get(0, 12, 0), 26.0);
//! # Ok::<(), crysgraph::EncodeError>(())
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod tensor;
pub mod utils;

pub use config::{Calibration, Config, DistanceMetric};
pub use error::{EncodeError, Result};
pub use model::{Site, Structure, StructureDescriptor};
pub use tensor::{CrysTensor, ParsedInput, TensorEncoder};
