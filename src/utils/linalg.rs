// src/utils/linalg.rs

use nalgebra::{Matrix3, Vector3};

/// Lattice vectors as a column matrix, so that `Cartesian = M × Fractional`.
///
/// # Arguments
/// * `lattice` - Lattice vectors as rows [[ax, ay, az], [bx, by, bz], [cx, cy, cz]]
pub fn column_basis(lattice: &[[f64; 3]; 3]) -> Matrix3<f64> {
    Matrix3::from_row_slice(&[
        lattice[0][0],
        lattice[0][1],
        lattice[0][2],
        lattice[1][0],
        lattice[1][1],
        lattice[1][2],
        lattice[2][0],
        lattice[2][1],
        lattice[2][2],
    ])
    .transpose()
}

/// Convert fractional coordinates to Cartesian (Angstroms).
///
/// # Formula
/// ```text
/// Cartesian = Lattice^T × Fractional
/// ```
pub fn frac_to_cart(frac: [f64; 3], lattice: &[[f64; 3]; 3]) -> [f64; 3] {
    let cart = column_basis(lattice) * Vector3::from(frac);
    [cart.x, cart.y, cart.z]
}

/// Convert Cartesian coordinates to fractional.
///
/// Returns None if the lattice is singular.
pub fn cart_to_frac(cart: [f64; 3], lattice: &[[f64; 3]; 3]) -> Option<[f64; 3]> {
    let inv = column_basis(lattice).try_inverse()?;
    let frac = inv * Vector3::from(cart);
    Some([frac.x, frac.y, frac.z])
}

/// Build lattice vectors from cell parameters (lengths in Angstroms,
/// angles in degrees). `a` lies along x, `b` in the xy plane.
pub fn lattice_from_parameters(lengths: [f64; 3], angles: [f64; 3]) -> [[f64; 3]; 3] {
    let [a, b, c] = lengths;
    let alpha = angles[0].to_radians();
    let beta = angles[1].to_radians();
    let gamma = angles[2].to_radians();

    let (cos_a, cos_b, cos_g) = (alpha.cos(), beta.cos(), gamma.cos());
    let sin_g = gamma.sin();
    let v = (1.0 - cos_a * cos_a - cos_b * cos_b - cos_g * cos_g + 2.0 * cos_a * cos_b * cos_g)
        .max(0.0)
        .sqrt();

    [
        [a, 0.0, 0.0],
        [b * cos_g, b * sin_g, 0.0],
        [c * cos_b, c * (cos_a - cos_b * cos_g) / sin_g, c * v / sin_g],
    ]
}

/// Inverse of [`lattice_from_parameters`]: returns ([a, b, c], [alpha, beta, gamma]).
pub fn lattice_parameters(lattice: &[[f64; 3]; 3]) -> ([f64; 3], [f64; 3]) {
    let va = Vector3::from(lattice[0]);
    let vb = Vector3::from(lattice[1]);
    let vc = Vector3::from(lattice[2]);

    let (a, b, c) = (va.norm(), vb.norm(), vc.norm());

    // alpha = angle(b, c), beta = angle(a, c), gamma = angle(a, b)
    let angle = |u: &Vector3<f64>, w: &Vector3<f64>, nu: f64, nw: f64| {
        (u.dot(w) / (nu * nw)).clamp(-1.0, 1.0).acos().to_degrees()
    };

    (
        [a, b, c],
        [angle(&vb, &vc, b, c), angle(&va, &vc, a, c), angle(&va, &vb, a, b)],
    )
}
