// src/tensor/mod.rs
pub mod construct;
pub mod encoder;
pub mod layout;
pub mod normalize;

use ndarray::{Array3, ArrayView3};

use layout::{CHANNELS, DIM, MAX_SITES, SITE_OFFSET};

pub use encoder::{ParsedInput, TensorEncoder};

/// Dense 64×64×4 crystal graph tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct CrysTensor {
    data: Array3<f64>,
}

impl CrysTensor {
    /// All-zero tensor.
    pub fn zeros() -> Self {
        Self {
            data: Array3::zeros((DIM, DIM, CHANNELS)),
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        [DIM, DIM, CHANNELS]
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[[i, j, k]]
    }

    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    pub fn into_array(self) -> Array3<f64> {
        self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut Array3<f64> {
        &mut self.data
    }

    /// Whether site `i` holds an atom (non-zero atomic-number marker).
    pub fn is_populated(&self, i: usize) -> bool {
        i < MAX_SITES && self.data[[SITE_OFFSET + i, 0, 0]] != 0.0
    }

    /// Number of populated site rows.
    pub fn site_count(&self) -> usize {
        (0..MAX_SITES).filter(|&i| self.is_populated(i)).count()
    }

    /// Whether `T[i, j, k]` and `T[j, i, k]` agree within `tol` everywhere.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        (0..DIM).all(|i| {
            (i + 1..DIM).all(|j| {
                (0..CHANNELS).all(|k| (self.data[[i, j, k]] - self.data[[j, i, k]]).abs() <= tol)
            })
        })
    }
}
