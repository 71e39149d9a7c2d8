use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use crate::model::{Atom, Structure};
use crate::utils::linalg;

/// Tolerance for merging symmetry-generated duplicates (fractional units).
const DUPLICATE_EPS: f64 = 1e-3;

pub fn parse(path: &Path) -> io::Result<Structure> {
    let file = File::open(path)?;
    parse_reader(io::BufReader::new(file))
}

pub fn parse_reader<R: BufRead>(reader: R) -> io::Result<Structure> {
    let mut lengths: [Option<f64>; 3] = [None; 3];
    let mut angles = [90.0, 90.0, 90.0];

    let mut symmetry_ops: Vec<String> = Vec::new();
    let mut base_atoms: Vec<(String, [f64; 3])> = Vec::new();

    let mut in_loop = false;
    let mut loop_has_rows = false;
    let mut loop_headers: Vec<String> = Vec::new();

    for line_res in reader.lines() {
        let line = line_res?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // 1. Cell Parameters
        if trimmed.starts_with("_cell_") {
            in_loop = false;
            let value = || {
                cif_value(trimmed).ok_or_else(|| bad_data(format!("bad value in '{}'", trimmed)))
            };
            match trimmed.split_whitespace().next() {
                Some("_cell_length_a") => lengths[0] = Some(value()?),
                Some("_cell_length_b") => lengths[1] = Some(value()?),
                Some("_cell_length_c") => lengths[2] = Some(value()?),
                Some("_cell_angle_alpha") => angles[0] = value()?,
                Some("_cell_angle_beta") => angles[1] = value()?,
                Some("_cell_angle_gamma") => angles[2] = value()?,
                _ => {}
            }
            continue;
        }

        // 2. Loop Detection
        if trimmed.starts_with("loop_") {
            in_loop = true;
            loop_has_rows = false;
            loop_headers.clear();
            continue;
        }

        if trimmed.starts_with("data_") {
            in_loop = false;
            continue;
        }

        // 3. Header Parsing
        if trimmed.starts_with('_') {
            // A tag after the loop rows ends the loop
            if in_loop && !loop_has_rows {
                loop_headers.push(trimmed.to_string());
            } else {
                in_loop = false;
            }
            continue;
        }

        // 4. Data Parsing
        if !in_loop {
            continue;
        }
        loop_has_rows = true;

        if is_symop_loop(&loop_headers) {
            if let Some(op) = symop_from_row(trimmed) {
                symmetry_ops.push(op);
            }
        } else if let Some(atom) = atom_from_row(&loop_headers, trimmed) {
            base_atoms.push(atom);
        }
    }

    let [a, b, c] = match lengths {
        [Some(a), Some(b), Some(c)] => [a, b, c],
        _ => return Err(bad_data("missing _cell_length_* entries".to_string())),
    };

    if base_atoms.is_empty() {
        return Err(bad_data("no _atom_site rows found".to_string()));
    }

    if symmetry_ops.is_empty() {
        symmetry_ops.push("x,y,z".to_string());
    }

    // 5. Expand Symmetry
    let mut final_atoms: Vec<(String, [f64; 3])> = Vec::new();
    for (element, position) in &base_atoms {
        for op in &symmetry_ops {
            let p = apply_symmetry(*position, op)?;
            let wrapped = [p[0].rem_euclid(1.0), p[1].rem_euclid(1.0), p[2].rem_euclid(1.0)];

            let is_duplicate = final_atoms.iter().any(|(_, existing)| {
                (0..3).all(|k| {
                    let d = (existing[k] - wrapped[k]).abs();
                    d < DUPLICATE_EPS || (1.0 - d) < DUPLICATE_EPS
                })
            });

            if !is_duplicate {
                final_atoms.push((element.clone(), wrapped));
            }
        }
    }

    // 6. Lattice Construction
    let lattice = linalg::lattice_from_parameters([a, b, c], angles);

    let atoms = final_atoms
        .into_iter()
        .map(|(element, frac)| Atom {
            element,
            position: linalg::frac_to_cart(frac, &lattice),
        })
        .collect();

    Ok(Structure::new(lattice, atoms))
}

fn bad_data(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

fn is_symop_loop(headers: &[String]) -> bool {
    headers.iter().any(|h| {
        h.starts_with("_symmetry_equiv_pos_as_xyz")
            || h.starts_with("_space_group_symop_operation_xyz")
    })
}

fn is_atom_loop(headers: &[String]) -> bool {
    headers.iter().any(|h| h.starts_with("_atom_site_fract_x"))
}

fn symop_from_row(row: &str) -> Option<String> {
    let op = row.replace(['\'', '"'], "");
    // Drop a leading integer id such as "12  -x,y+1/2,z"
    let op = match op.split_once(char::is_whitespace) {
        Some((first, rest)) if first.chars().all(|c| c.is_ascii_digit()) => rest.to_string(),
        _ => op,
    };
    let op: String = op.split_whitespace().collect();
    if op.split(',').count() == 3 {
        Some(op)
    } else {
        None
    }
}

fn atom_from_row(headers: &[String], row: &str) -> Option<(String, [f64; 3])> {
    if !is_atom_loop(headers) {
        return None;
    }

    let parts: Vec<&str> = row.split_whitespace().collect();
    if parts.len() < headers.len() {
        return None;
    }

    let column = |tag: &str| headers.iter().position(|h| h == tag).map(|i| parts[i]);

    // Prefer the type symbol over the free-form label
    let element = column("_atom_site_type_symbol").or_else(|| column("_atom_site_label"))?;
    let fx = parse_cif_float(column("_atom_site_fract_x")?)?;
    let fy = parse_cif_float(column("_atom_site_fract_y")?)?;
    let fz = parse_cif_float(column("_atom_site_fract_z")?)?;

    let symbol: String = element.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    Some((symbol, [fx, fy, fz]))
}

fn apply_symmetry(p: [f64; 3], op: &str) -> io::Result<[f64; 3]> {
    let parts: Vec<&str> = op.split(',').collect();
    if parts.len() != 3 {
        return Err(bad_data(format!("bad symmetry operation '{}'", op)));
    }

    Ok([
        evaluate_expr(parts[0], p)?,
        evaluate_expr(parts[1], p)?,
        evaluate_expr(parts[2], p)?,
    ])
}

/// Evaluate one component such as "-x+1/2" or "y-x".
fn evaluate_expr(expr: &str, p: [f64; 3]) -> io::Result<f64> {
    let s = expr.replace(' ', "").to_lowercase();
    let mut val = 0.0;
    let mut current_term = String::new();

    // Split by + or - but keep the delimiter
    for c in s.chars() {
        if (c == '+' || c == '-') && !current_term.is_empty() {
            val += evaluate_term(&current_term, p)?;
            current_term.clear();
        }
        current_term.push(c);
    }
    if !current_term.is_empty() {
        val += evaluate_term(&current_term, p)?;
    }

    Ok(val)
}

fn evaluate_term(term: &str, p: [f64; 3]) -> io::Result<f64> {
    let (sign, body) = match term.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, term.strip_prefix('+').unwrap_or(term)),
    };

    let value = match body {
        "x" => p[0],
        "y" => p[1],
        "z" => p[2],
        _ => {
            let number = match body.split_once('/') {
                Some((num, den)) => num
                    .parse::<f64>()
                    .ok()
                    .zip(den.parse::<f64>().ok())
                    .map(|(n, d)| n / d),
                None => body.parse::<f64>().ok(),
            };
            number.ok_or_else(|| bad_data(format!("bad symmetry term '{}'", term)))?
        }
    };

    Ok(sign * value)
}

fn cif_value(line: &str) -> Option<f64> {
    let (_, value) = line.split_once(char::is_whitespace)?;
    parse_cif_float(value.trim())
}

/// Parse "5.4307(2)" as 5.4307.
fn parse_cif_float(s: &str) -> Option<f64> {
    let clean: String = s.chars().take_while(|c| *c != '(').collect();
    clean.parse().ok()
}
