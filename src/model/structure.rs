// src/model/structure.rs

use crate::utils::linalg;

#[derive(Clone, Debug, PartialEq)]
pub struct Atom {
    pub element: String,
    // Cartesian position in Angstroms
    pub position: [f64; 3],
}

/// A periodic structure as produced by the file parsers.
#[derive(Clone, Debug, PartialEq)]
pub struct Structure {
    // Lattice vectors: [a_vec, b_vec, c_vec]
    pub lattice: [[f64; 3]; 3],
    pub atoms: Vec<Atom>,
    pub formula: String,
}

impl Structure {
    pub fn new(lattice: [[f64; 3]; 3], atoms: Vec<Atom>) -> Self {
        let formula = formula_of(&atoms);
        Self { lattice, atoms, formula }
    }

    /// Fractional coordinates of every atom, or None for a singular lattice.
    pub fn fractional_positions(&self) -> Option<Vec<[f64; 3]>> {
        self.atoms
            .iter()
            .map(|a| linalg::cart_to_frac(a.position, &self.lattice))
            .collect()
    }

    /// ([a, b, c], [alpha, beta, gamma])
    pub fn cell_parameters(&self) -> ([f64; 3], [f64; 3]) {
        linalg::lattice_parameters(&self.lattice)
    }

    pub fn volume(&self) -> f64 {
        linalg::column_basis(&self.lattice).determinant().abs()
    }
}

/// Element counts in order of first appearance, e.g. "Fe2O3".
fn formula_of(atoms: &[Atom]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for atom in atoms {
        let found = counts.iter().position(|(el, _)| *el == atom.element);
        match found {
            Some(i) => counts[i].1 += 1,
            None => counts.push((atom.element.as_str(), 1)),
        }
    }

    counts
        .iter()
        .map(|(el, n)| if *n == 1 { el.to_string() } else { format!("{}{}", el, n) })
        .collect()
}
