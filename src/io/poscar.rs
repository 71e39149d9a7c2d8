// src/io/poscar.rs

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use crate::model::{Atom, Structure};
use crate::utils::linalg;

pub fn parse(path: &Path) -> io::Result<Structure> {
    let file = File::open(path)?;
    parse_reader(io::BufReader::new(file))
}

pub fn parse_reader<R: BufRead>(reader: R) -> io::Result<Structure> {
    let mut lines = reader.lines();
    let mut next_line = |what: &str| -> io::Result<String> {
        lines
            .next()
            .ok_or_else(|| invalid(format!("Missing {}", what)))?
    };

    let _ = next_line("comment")?;

    // Scale
    let scale_line = next_line("scale")?;
    let scale: f64 = parse_f64(scale_line.split_whitespace().next().unwrap_or(""), "scale")?;
    if scale <= 0.0 {
        return Err(invalid("Volume-style (negative) scale is not supported".to_string()));
    }

    // Lattice
    let mut lattice = [[0.0; 3]; 3];
    for row in lattice.iter_mut() {
        let line = next_line("lattice vector")?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(invalid(format!("Invalid lattice line '{}'", line.trim())));
        }
        for k in 0..3 {
            row[k] = parse_f64(parts[k], "lattice component")? * scale;
        }
    }

    // Elements & Counts (VASP 4 files have no element line)
    let line6 = next_line("element or count line")?;
    let starts_alpha = line6.trim().chars().next().map_or(false, |c| c.is_alphabetic());
    let (element_names, counts_line) = if starts_alpha {
        let names: Vec<String> = line6.split_whitespace().map(|s| s.to_string()).collect();
        (names, next_line("count line")?)
    } else {
        (Vec::new(), line6)
    };

    let counts: Vec<usize> = counts_line
        .split_whitespace()
        .map(|x| x.parse().map_err(|_| invalid(format!("Invalid atom count '{}'", x))))
        .collect::<io::Result<_>>()?;

    if element_names.is_empty() {
        return Err(invalid("POSCAR without element symbols is not supported".to_string()));
    }
    if element_names.len() != counts.len() {
        return Err(invalid(format!(
            "{} element symbols but {} counts",
            element_names.len(),
            counts.len()
        )));
    }

    // Mode, with optional "Selective dynamics" line first
    let mut mode_line = next_line("coordinate mode")?;
    if mode_line.trim().to_lowercase().starts_with('s') {
        mode_line = next_line("coordinate mode")?;
    }
    let is_direct = mode_line.trim().to_lowercase().starts_with('d');

    // Atoms
    let mut atoms = Vec::new();
    for (element, &count) in element_names.iter().zip(&counts) {
        for _ in 0..count {
            let line = next_line("atom position")?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                return Err(invalid(format!("Invalid atom line '{}'", line.trim())));
            }
            let p = [
                parse_f64(parts[0], "x")?,
                parse_f64(parts[1], "y")?,
                parse_f64(parts[2], "z")?,
            ];

            let position = if is_direct {
                linalg::frac_to_cart(p, &lattice)
            } else {
                [p[0] * scale, p[1] * scale, p[2] * scale]
            };

            atoms.push(Atom {
                element: element.clone(),
                position,
            });
        }
    }

    Ok(Structure::new(lattice, atoms))
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

fn parse_f64(s: &str, what: &str) -> io::Result<f64> {
    s.parse()
        .map_err(|_| invalid(format!("Invalid {} '{}'", what, s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct() {
        let src = "\
Rutile-ish
2.0
 2.0 0.0 0.0
 0.0 2.0 0.0
 0.0 0.0 1.5
Ti O
1 2
Direct
0.0 0.0 0.0
0.3 0.3 0.0
0.7 0.7 0.0
";
        let s = parse_reader(src.as_bytes()).unwrap();
        assert_eq!(s.atoms.len(), 3);
        assert_eq!(s.formula, "TiO2");
        assert!((s.lattice[0][0] - 4.0).abs() < 1e-12);
        assert!((s.atoms[1].position[0] - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_cartesian_selective() {
        let src = "\
Si
1.0
5.43 0 0
0 5.43 0
0 0 5.43
Si
2
Selective dynamics
Cartesian
0.0 0.0 0.0 T T T
1.3575 1.3575 1.3575 F F F
";
        let s = parse_reader(src.as_bytes()).unwrap();
        assert_eq!(s.atoms.len(), 2);
        assert!((s.atoms[1].position[2] - 1.3575).abs() < 1e-12);
    }

    #[test]
    fn test_truncated() {
        let src = "x\n1.0\n1 0 0\n0 1 0\n0 0 1\nFe\n2\nDirect\n0 0 0\n";
        let err = parse_reader(src.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_vasp4_rejected() {
        let src = "x\n1.0\n1 0 0\n0 1 0\n0 0 1\n1\nDirect\n0 0 0\n";
        assert!(parse_reader(src.as_bytes()).is_err());
    }
}
