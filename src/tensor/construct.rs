// src/tensor/construct.rs

use log::debug;
use nalgebra::{Matrix3, Vector3};
use ndarray::s;
use rayon::prelude::*;

use crate::config::DistanceMetric;
use crate::error::Result;
use crate::model::descriptor::{Site, StructureDescriptor};
use crate::tensor::layout::{site_row, GlobalFeature, DISPLACEMENT, DISTANCE};
use crate::tensor::CrysTensor;
use crate::utils::linalg;

/// Build the raw tensor for a descriptor.
///
/// For every site `i` the global features are broadcast into
/// `T[f, 12+i, :]` and `T[12+i, f, :]`. For every pair `i <= j` the
/// distance goes to channel 0 and the fractional displacement
/// `frac[j] - frac[i]` to channels 1..3, written to both `T[12+i, 12+j, :]`
/// and `T[12+j, 12+i, :]`.
pub fn construct(desc: &StructureDescriptor, metric: DistanceMetric) -> Result<CrysTensor> {
    desc.validate()?;

    let mut tensor = CrysTensor::zeros();
    let data = tensor.data_mut();

    for (i, site) in desc.sites.iter().enumerate() {
        let row = site_row(i);
        for feature in GlobalFeature::ALL {
            let value = global_value(desc, site, feature);
            data.slice_mut(s![feature.index(), row, ..]).fill(value);
            data.slice_mut(s![row, feature.index(), ..]).fill(value);
        }
    }

    let basis = match metric {
        DistanceMetric::Cartesian => Some(linalg::column_basis(
            &linalg::lattice_from_parameters(desc.lengths(), desc.angles()),
        )),
        DistanceMetric::Fractional => None,
    };

    // Each (i, j) pair is independent; compute in parallel, write serially.
    let sites = &desc.sites;
    let n = sites.len();
    let pairs: Vec<(usize, usize, [f64; 4])> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            (i..n).map(move |j| (i, j, pair_geometry(&sites[i], &sites[j], basis.as_ref())))
        })
        .collect();

    for (i, j, cell) in pairs {
        let (ri, rj) = (site_row(i), site_row(j));
        for (k, value) in cell.iter().enumerate() {
            data[[ri, rj, k]] = *value;
            data[[rj, ri, k]] = *value;
        }
    }

    debug!(
        "constructed tensor: {} sites, space group {}, {:?} distances",
        n, desc.sg, metric
    );

    Ok(tensor)
}

fn global_value(desc: &StructureDescriptor, site: &Site, feature: GlobalFeature) -> f64 {
    match feature {
        GlobalFeature::Atom => site.atomic_number as f64,
        GlobalFeature::X => site.frac[0],
        GlobalFeature::Y => site.frac[1],
        GlobalFeature::Z => site.frac[2],
        GlobalFeature::A => desc.a,
        GlobalFeature::B => desc.b,
        GlobalFeature::C => desc.c,
        GlobalFeature::Alpha => desc.alpha,
        GlobalFeature::Beta => desc.beta,
        GlobalFeature::Gamma => desc.gamma,
        GlobalFeature::SpaceGroup => desc.sg as f64,
    }
}

/// [distance, dx, dy, dz] for the pair, with the displacement taken as
/// `to - from` in fractional coordinates.
fn pair_geometry(from: &Site, to: &Site, basis: Option<&Matrix3<f64>>) -> [f64; 4] {
    let d = Vector3::new(
        to.frac[0] - from.frac[0],
        to.frac[1] - from.frac[1],
        to.frac[2] - from.frac[2],
    );

    let distance = match basis {
        Some(m) => (m * d).norm(),
        None => d.norm(),
    };

    let mut cell = [0.0; 4];
    cell[DISTANCE] = distance;
    for (axis, k) in DISPLACEMENT.iter().enumerate() {
        cell[*k] = d[axis];
    }
    cell
}
