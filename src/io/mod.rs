// src/io/mod.rs
pub mod cif;
pub mod poscar;

use crate::model::Structure;
use std::io;
use std::path::Path;

pub fn load_structure(path: &Path) -> io::Result<Structure> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if name.ends_with(".cif") {
        cif::parse(path)
    } else {
        // Fallback to POSCAR for unknown or explicit POSCAR/CONTCAR/.vasp
        poscar::parse(path)
    }
}
