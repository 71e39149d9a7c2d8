// src/model/descriptor.rs

use crate::error::{EncodeError, Result};
use crate::model::elements;
use crate::model::structure::Structure;
use crate::model::symmetry;
use crate::tensor::layout::MAX_SITES;
use log::debug;

/// One atom of the descriptor: species and fractional position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Site {
    pub atomic_number: u32,
    pub frac: [f64; 3],
}

impl Site {
    pub fn new(atomic_number: u32, frac: [f64; 3]) -> Self {
        Self { atomic_number, frac }
    }
}

/// Lattice geometry, space group and ordered site list of one structure.
#[derive(Clone, Debug, PartialEq)]
pub struct StructureDescriptor {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub sg: u32,
    pub sites: Vec<Site>,
}

impl StructureDescriptor {
    pub fn lengths(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }

    pub fn angles(&self) -> [f64; 3] {
        [self.alpha, self.beta, self.gamma]
    }

    /// Checks that the descriptor fits the tensor layout.
    pub fn validate(&self) -> Result<()> {
        if self.sites.is_empty() {
            return Err(EncodeError::invalid("structure has no sites"));
        }
        if self.sites.len() > MAX_SITES {
            return Err(EncodeError::OutOfRange {
                sites: self.sites.len(),
                max: MAX_SITES,
            });
        }

        for (name, len) in [("a", self.a), ("b", self.b), ("c", self.c)] {
            if !(len.is_finite() && len > 0.0) {
                return Err(EncodeError::invalid(format!(
                    "lattice length {} must be positive, got {}",
                    name, len
                )));
            }
        }
        for (name, angle) in [("alpha", self.alpha), ("beta", self.beta), ("gamma", self.gamma)] {
            if !(angle.is_finite() && angle > 0.0 && angle < 180.0) {
                return Err(EncodeError::invalid(format!(
                    "lattice angle {} must lie in (0, 180), got {}",
                    name, angle
                )));
            }
        }

        for (i, site) in self.sites.iter().enumerate() {
            // A zero here would read as an empty row in the tensor.
            if site.atomic_number == 0 {
                return Err(EncodeError::invalid(format!("site {} has atomic number 0", i)));
            }
            if site.frac.iter().any(|v| !v.is_finite()) {
                return Err(EncodeError::invalid(format!(
                    "site {} has non-finite coordinates {:?}",
                    i, site.frac
                )));
            }
        }

        Ok(())
    }

    /// Converts a parsed structure: cell parameters from the lattice
    /// vectors, fractional coordinates, atomic numbers from the element
    /// symbols and the space group from a symmetry search.
    pub fn from_structure(structure: &Structure, symprec: f64) -> Result<Self> {
        if structure.atoms.is_empty() {
            return Err(EncodeError::invalid("structure has no sites"));
        }

        let frac = structure
            .fractional_positions()
            .ok_or_else(|| EncodeError::invalid("lattice is singular"))?;

        let numbers = structure
            .atoms
            .iter()
            .map(|atom| {
                elements::atomic_number(&atom.element).ok_or_else(|| {
                    EncodeError::invalid(format!("unknown element '{}'", atom.element))
                })
            })
            .collect::<Result<Vec<u32>>>()?;

        let sg = symmetry::space_group_number(&structure.lattice, &frac, &numbers, symprec)?;
        let ([a, b, c], [alpha, beta, gamma]) = structure.cell_parameters();

        debug!(
            "{}: space group {} ({}), {} sites",
            structure.formula,
            sg,
            symmetry::crystal_system(sg),
            numbers.len()
        );

        let sites = numbers
            .into_iter()
            .zip(frac)
            .map(|(z, p)| Site::new(z, p))
            .collect();

        Ok(Self { a, b, c, alpha, beta, gamma, sg, sites })
    }
}
