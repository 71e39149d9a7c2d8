// src/model/symmetry.rs

use crate::error::{EncodeError, Result};
use moyo::base::{AngleTolerance, Cell, Lattice};
use moyo::data::Setting;
use moyo::MoyoDataset;
use nalgebra::{Matrix3, Vector3};

/// Space-group number (1..=230) of a cell given as row lattice vectors,
/// fractional positions and atomic numbers.
pub fn space_group_number(
    lattice: &[[f64; 3]; 3],
    positions: &[[f64; 3]],
    numbers: &[u32],
    symprec: f64,
) -> Result<u32> {
    if positions.len() != numbers.len() {
        return Err(EncodeError::invalid(format!(
            "{} positions but {} atomic numbers",
            positions.len(),
            numbers.len()
        )));
    }

    let lattice_mat = Matrix3::new(
        lattice[0][0], lattice[0][1], lattice[0][2],
        lattice[1][0], lattice[1][1], lattice[1][2],
        lattice[2][0], lattice[2][1], lattice[2][2],
    );

    let positions: Vec<Vector3<f64>> = positions.iter().map(|p| Vector3::from(*p)).collect();
    let numbers: Vec<i32> = numbers.iter().map(|&z| z as i32).collect();

    let cell = Cell::new(Lattice::new(lattice_mat), positions, numbers);
    let dataset = MoyoDataset::new(&cell, symprec, AngleTolerance::Default, Setting::Spglib, true)
        .map_err(|e| EncodeError::Symmetry(format!("symmetry search failed: {:?}", e)))?;

    match dataset.number {
        n @ 1..=230 => Ok(n as u32),
        n => Err(EncodeError::Symmetry(format!("space group {} out of range", n))),
    }
}

/// Crystal system for a space-group number.
pub fn crystal_system(number: u32) -> &'static str {
    match number {
        1..=2 => "Triclinic",
        3..=15 => "Monoclinic",
        16..=74 => "Orthorhombic",
        75..=142 => "Tetragonal",
        143..=167 => "Trigonal",
        168..=194 => "Hexagonal",
        195..=230 => "Cubic",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crystal_system() {
        assert_eq!(crystal_system(1), "Triclinic");
        assert_eq!(crystal_system(62), "Orthorhombic");
        assert_eq!(crystal_system(225), "Cubic");
        assert_eq!(crystal_system(0), "Unknown");
    }

    #[test]
    fn test_rocksalt_is_fm3m() {
        // Conventional NaCl cell
        let lattice = [[5.64, 0.0, 0.0], [0.0, 5.64, 0.0], [0.0, 0.0, 5.64]];
        let fcc = [[0.0, 0.0, 0.0], [0.0, 0.5, 0.5], [0.5, 0.0, 0.5], [0.5, 0.5, 0.0]];

        let mut positions = Vec::new();
        let mut numbers = Vec::new();
        for p in fcc {
            positions.push(p);
            numbers.push(11);
            positions.push([(p[0] + 0.5) % 1.0, p[1], p[2]]);
            numbers.push(17);
        }

        let sg = space_group_number(&lattice, &positions, &numbers, 1e-3).unwrap();
        assert_eq!(sg, 225);
    }

    #[test]
    fn test_simple_cubic_single_atom() {
        let lattice = [[3.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 3.0]];
        let sg = space_group_number(&lattice, &[[0.0, 0.0, 0.0]], &[84], 1e-3).unwrap();
        assert_eq!(sg, 221);
    }

    #[test]
    fn test_length_mismatch() {
        let lattice = [[3.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 3.0]];
        let err = space_group_number(&lattice, &[[0.0; 3]], &[], 1e-3).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidInput(_)));
    }
}
