// src/tensor/normalize.rs

//! Reversible per-feature rescaling of a constructed tensor.
//!
//! Global cells are divided by their feature constant. Site-to-site cells
//! of distinct populated sites have the distance divided by `length` and
//! each displacement shifted by `direction_offset` then divided by `dir`.
//! Self-pair cells are left as they are.

use ndarray::s;

use crate::config::Calibration;
use crate::error::{EncodeError, Result};
use crate::tensor::layout::{site_row, GlobalFeature, DISPLACEMENT, DISTANCE, MAX_SITES};
use crate::tensor::CrysTensor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Inverse,
}

/// Calibration with every constant checked usable.
struct Scales {
    global: [f64; 11],
    length: f64,
    dir: f64,
    offset: f64,
}

impl Scales {
    fn resolve(cal: &Calibration) -> Result<Self> {
        let mut global = [0.0; 11];
        for feature in GlobalFeature::ALL {
            let value = match feature {
                GlobalFeature::Atom => cal.atom,
                GlobalFeature::X => cal.x,
                GlobalFeature::Y => cal.y,
                GlobalFeature::Z => cal.z,
                GlobalFeature::A => cal.a,
                GlobalFeature::B => cal.b,
                GlobalFeature::C => cal.c,
                GlobalFeature::Alpha => cal.alpha,
                GlobalFeature::Beta => cal.beta,
                GlobalFeature::Gamma => cal.gamma,
                GlobalFeature::SpaceGroup => cal.sg,
            };
            global[feature.index()] = divisor(feature.name(), Some(value))?;
        }

        if !cal.direction_offset.is_finite() {
            return Err(EncodeError::MissingCalibrationConstant("direction_offset"));
        }

        Ok(Self {
            global,
            length: divisor("length", cal.length)?,
            dir: divisor("dir", Some(cal.dir))?,
            offset: cal.direction_offset,
        })
    }
}

fn divisor(name: &'static str, value: Option<f64>) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() && v != 0.0 => Ok(v),
        _ => Err(EncodeError::MissingCalibrationConstant(name)),
    }
}

/// Scale the populated cells of `tensor` into the calibrated range.
///
/// The calibration is checked before any cell is touched, so an error
/// leaves the tensor unchanged.
pub fn normalize(tensor: &mut CrysTensor, cal: &Calibration) -> Result<()> {
    let scales = Scales::resolve(cal)?;
    rescale(tensor, &scales, Direction::Forward);
    Ok(())
}

/// Exact inverse of [`normalize`].
pub fn denormalize(tensor: &mut CrysTensor, cal: &Calibration) -> Result<()> {
    let scales = Scales::resolve(cal)?;
    rescale(tensor, &scales, Direction::Inverse);
    Ok(())
}

fn rescale(tensor: &mut CrysTensor, scales: &Scales, direction: Direction) {
    let populated: Vec<usize> = (0..MAX_SITES).filter(|&i| tensor.is_populated(i)).collect();
    let data = tensor.data_mut();

    for &i in &populated {
        let row = site_row(i);
        for feature in GlobalFeature::ALL {
            let f = feature.index();
            let c = scales.global[f];
            let apply = |v: f64| match direction {
                Direction::Forward => v / c,
                Direction::Inverse => v * c,
            };
            data.slice_mut(s![f, row, ..]).mapv_inplace(apply);
            data.slice_mut(s![row, f, ..]).mapv_inplace(apply);
        }
    }

    // Each unordered pair once, both mirrored cells.
    for (n, &i) in populated.iter().enumerate() {
        for &j in &populated[n + 1..] {
            let (ri, rj) = (site_row(i), site_row(j));
            for (r, c) in [(ri, rj), (rj, ri)] {
                let cell = &mut data[[r, c, DISTANCE]];
                *cell = match direction {
                    Direction::Forward => *cell / scales.length,
                    Direction::Inverse => *cell * scales.length,
                };

                for k in DISPLACEMENT {
                    let cell = &mut data[[r, c, k]];
                    *cell = match direction {
                        Direction::Forward => (*cell + scales.offset) / scales.dir,
                        Direction::Inverse => *cell * scales.dir - scales.offset,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistanceMetric;
    use crate::model::descriptor::{Site, StructureDescriptor};
    use crate::tensor::construct::construct;
    use crate::tensor::layout::{CHANNELS, DIM};
    use approx::assert_relative_eq;

    fn calibration() -> Calibration {
        Calibration::default().with_length(12.5)
    }

    fn sample(n: usize) -> CrysTensor {
        let sites = (0..n)
            .map(|i| {
                let f = i as f64;
                Site::new(
                    3 + i as u32,
                    [(f * 0.31) % 1.0, (f * 0.17 + 0.05) % 1.0, (f * 0.77) % 1.0],
                )
            })
            .collect();
        let desc = StructureDescriptor {
            a: 7.5,
            b: 9.25,
            c: 11.0,
            alpha: 85.0,
            beta: 95.0,
            gamma: 110.0,
            sg: 14,
            sites,
        };
        construct(&desc, DistanceMetric::Cartesian).unwrap()
    }

    fn assert_close(a: &CrysTensor, b: &CrysTensor) {
        for i in 0..DIM {
            for j in 0..DIM {
                for k in 0..CHANNELS {
                    assert_relative_eq!(
                        a.get(i, j, k),
                        b.get(i, j, k),
                        epsilon = 1e-12,
                        max_relative = 1e-9
                    );
                }
            }
        }
    }

    #[test]
    fn test_roundtrip() {
        let original = sample(23);
        let mut t = original.clone();

        normalize(&mut t, &calibration()).unwrap();
        assert_ne!(t, original);
        denormalize(&mut t, &calibration()).unwrap();

        assert_close(&t, &original);
    }

    #[test]
    fn test_global_cells_scaled() {
        let original = sample(4);
        let mut t = original.clone();
        let cal = calibration();
        normalize(&mut t, &cal).unwrap();

        for k in 0..CHANNELS {
            assert_relative_eq!(t.get(0, 13, k), original.get(0, 13, k) / cal.atom);
            assert_relative_eq!(t.get(13, 0, k), original.get(13, 0, k) / cal.atom);
            assert_relative_eq!(t.get(5, 14, k), 9.25 / cal.b);
            assert_relative_eq!(t.get(10, 12, k), 14.0 / cal.sg);
            assert_relative_eq!(t.get(12, 10, k), 14.0 / cal.sg);
        }
    }

    #[test]
    fn test_pair_cells_scaled_once() {
        let original = sample(5);
        let mut t = original.clone();
        let cal = calibration();
        normalize(&mut t, &cal).unwrap();

        for (r, c) in [(12, 15), (15, 12), (13, 16)] {
            assert_relative_eq!(t.get(r, c, 0), original.get(r, c, 0) / 12.5);
            for k in 1..4 {
                assert_relative_eq!(
                    t.get(r, c, k),
                    (original.get(r, c, k) + cal.direction_offset) / cal.dir
                );
            }
        }

        // Self pairs are untouched
        for k in 0..CHANNELS {
            assert_eq!(t.get(14, 14, k), 0.0);
        }
        assert!(t.is_symmetric(0.0));
    }

    #[test]
    fn test_empty_rows_stay_zero() {
        let mut t = sample(3);
        normalize(&mut t, &calibration()).unwrap();

        for i in 15..DIM {
            for j in 0..DIM {
                for k in 0..CHANNELS {
                    assert_eq!(t.get(i, j, k), 0.0);
                    assert_eq!(t.get(j, i, k), 0.0);
                }
            }
        }
    }

    #[test]
    fn test_missing_length_leaves_tensor_untouched() {
        let original = sample(6);
        let mut t = original.clone();

        let err = normalize(&mut t, &Calibration::default()).unwrap_err();
        assert!(matches!(err, EncodeError::MissingCalibrationConstant("length")));
        assert_eq!(t, original);
    }

    #[test]
    fn test_zero_constant_rejected() {
        let mut t = sample(2);
        let mut cal = calibration();
        cal.gamma = 0.0;
        let err = denormalize(&mut t, &cal).unwrap_err();
        assert!(matches!(err, EncodeError::MissingCalibrationConstant("gamma")));

        let mut cal = calibration();
        cal.direction_offset = f64::NAN;
        let err = normalize(&mut t, &cal).unwrap_err();
        assert!(matches!(err, EncodeError::MissingCalibrationConstant("direction_offset")));
    }
}
