// src/tensor/encoder.rs

use log::{info, warn};
use ndarray::Array3;
use std::path::Path;

use crate::config::Config;
use crate::error::{EncodeError, Result};
use crate::io;
use crate::model::{Atom, Site, Structure, StructureDescriptor};
use crate::tensor::{construct, normalize, CrysTensor};

/// An already parsed structure handed to [`TensorEncoder::from_parsed`].
#[derive(Clone, Debug)]
pub enum ParsedInput {
    /// Periodic structure with lattice vectors and Cartesian positions.
    Structure(Structure),
    /// Atoms without a lattice.
    Molecule(Vec<Atom>),
}

/// Owns one structure's tensor and tracks whether it is currently normalized.
#[derive(Clone, Debug)]
pub struct TensorEncoder {
    descriptor: StructureDescriptor,
    tensor: CrysTensor,
    normalized: bool,
    config: Config,
}

impl TensorEncoder {
    pub fn from_descriptor(descriptor: StructureDescriptor) -> Result<Self> {
        Self::from_descriptor_with_config(descriptor, &Config::default())
    }

    pub fn from_descriptor_with_config(
        descriptor: StructureDescriptor,
        config: &Config,
    ) -> Result<Self> {
        let tensor = construct::construct(&descriptor, config.distance_metric)?;
        Ok(Self {
            descriptor,
            tensor,
            normalized: false,
            config: config.clone(),
        })
    }

    /// Build from cell parameters, space group, atomic numbers and
    /// fractional coordinates (one entry per site in both slices).
    #[allow(clippy::too_many_arguments)]
    pub fn from_parameters(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
        sg: u32,
        atomic_numbers: &[u32],
        coords: &[[f64; 3]],
    ) -> Result<Self> {
        if atomic_numbers.len() != coords.len() {
            return Err(EncodeError::invalid(format!(
                "{} atomic numbers but {} coordinates",
                atomic_numbers.len(),
                coords.len()
            )));
        }

        let sites = atomic_numbers
            .iter()
            .zip(coords)
            .map(|(&z, &p)| Site::new(z, p))
            .collect();

        Self::from_descriptor(StructureDescriptor { a, b, c, alpha, beta, gamma, sg, sites })
    }

    /// Load a CIF or POSCAR file and resolve its space group.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with_config(path, &Config::default())
    }

    pub fn from_file_with_config(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        let structure = io::load_structure(path)?;
        info!(
            "Loaded {} ({} atoms) from {}",
            structure.formula,
            structure.atoms.len(),
            path.display()
        );
        Self::from_parsed_with_config(ParsedInput::Structure(structure), config)
    }

    pub fn from_parsed(input: ParsedInput) -> Result<Self> {
        Self::from_parsed_with_config(input, &Config::default())
    }

    pub fn from_parsed_with_config(input: ParsedInput, config: &Config) -> Result<Self> {
        match input {
            ParsedInput::Structure(structure) => {
                let descriptor = StructureDescriptor::from_structure(&structure, config.symprec)?;
                Self::from_descriptor_with_config(descriptor, config)
            }
            ParsedInput::Molecule(atoms) => Err(EncodeError::UnsupportedInputForm(format!(
                "molecule of {} atoms has no lattice",
                atoms.len()
            ))),
        }
    }

    /// Rescale the tensor in place. Rejected if it is already normalized.
    pub fn normalize(&mut self) -> Result<()> {
        if self.normalized {
            warn!("normalize called on an already normalized tensor");
            return Err(EncodeError::State { normalized: true });
        }
        normalize::normalize(&mut self.tensor, &self.config.calibration)?;
        self.normalized = true;
        Ok(())
    }

    /// Undo [`normalize`](Self::normalize). Rejected if the tensor is raw.
    pub fn denormalize(&mut self) -> Result<()> {
        if !self.normalized {
            warn!("denormalize called on a raw tensor");
            return Err(EncodeError::State { normalized: false });
        }
        normalize::denormalize(&mut self.tensor, &self.config.calibration)?;
        self.normalized = false;
        Ok(())
    }

    pub fn tensor(&self) -> &CrysTensor {
        &self.tensor
    }

    pub fn descriptor(&self) -> &StructureDescriptor {
        &self.descriptor
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Hand the tensor to a consumer together with its scale flag.
    pub fn into_parts(self) -> (Array3<f64>, bool) {
        (self.tensor.into_array(), self.normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Calibration, DistanceMetric};
    use approx::assert_relative_eq;
    use std::fs;

    fn config() -> Config {
        Config {
            calibration: Calibration::default().with_length(10.0),
            ..Config::default()
        }
    }

    fn two_site() -> TensorEncoder {
        let desc = StructureDescriptor {
            a: 10.0,
            b: 5.0,
            c: 5.0,
            alpha: 90.0,
            beta: 90.0,
            gamma: 90.0,
            sg: 1,
            sites: vec![Site::new(26, [0.0, 0.0, 0.0]), Site::new(8, [0.5, 0.0, 0.0])],
        };
        TensorEncoder::from_descriptor_with_config(desc, &config()).unwrap()
    }

    #[test]
    fn test_from_parameters_single_site() {
        let enc = TensorEncoder::from_parameters(
            5.0, 5.0, 5.0, 90.0, 90.0, 90.0, 1, &[26], &[[0.0, 0.0, 0.0]],
        )
        .unwrap();

        let t = enc.tensor();
        for k in 0..4 {
            assert_eq!(t.get(0, 12, k), 26.0);
            assert_eq!(t.get(12, 0, k), 26.0);
        }
        assert_eq!(t.get(12, 12, 0), 0.0);
        assert!(!enc.is_normalized());
        assert_eq!(enc.descriptor().sites.len(), 1);
    }

    #[test]
    fn test_from_parameters_mismatch() {
        let err = TensorEncoder::from_parameters(
            5.0, 5.0, 5.0, 90.0, 90.0, 90.0, 1, &[26, 8], &[[0.0, 0.0, 0.0]],
        )
        .unwrap_err();
        assert!(matches!(err, EncodeError::InvalidInput(_)));
    }

    #[test]
    fn test_from_parameters_bounds() {
        let err = TensorEncoder::from_parameters(5.0, 5.0, 5.0, 90.0, 90.0, 90.0, 1, &[], &[])
            .unwrap_err();
        assert!(matches!(err, EncodeError::InvalidInput(_)));

        let numbers = vec![1; 53];
        let coords = vec![[0.25, 0.5, 0.75]; 53];
        let err = TensorEncoder::from_parameters(
            5.0, 5.0, 5.0, 90.0, 90.0, 90.0, 1, &numbers, &coords,
        )
        .unwrap_err();
        assert!(matches!(err, EncodeError::OutOfRange { sites: 53, .. }));
    }

    #[test]
    fn test_normalize_state_guard() {
        let mut enc = two_site();
        let raw = enc.tensor().clone();

        assert!(matches!(
            enc.denormalize(),
            Err(EncodeError::State { normalized: false })
        ));

        enc.normalize().unwrap();
        assert!(enc.is_normalized());
        assert!(matches!(
            enc.normalize(),
            Err(EncodeError::State { normalized: true })
        ));

        enc.denormalize().unwrap();
        assert!(!enc.is_normalized());
        assert_relative_eq!(enc.tensor().get(12, 13, 0), raw.get(12, 13, 0), epsilon = 1e-12);
        assert_relative_eq!(enc.tensor().get(13, 12, 1), raw.get(13, 12, 1), epsilon = 1e-12);
        assert_relative_eq!(enc.tensor().get(7, 13, 2), raw.get(7, 13, 2), epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_without_distance_scale() {
        let desc = two_site().descriptor().clone();
        let mut enc = TensorEncoder::from_descriptor(desc).unwrap();

        let err = enc.normalize().unwrap_err();
        assert!(matches!(err, EncodeError::MissingCalibrationConstant("length")));
        assert!(!enc.is_normalized());
    }

    #[test]
    fn test_fractional_metric_from_config() {
        let cfg = Config {
            distance_metric: DistanceMetric::Fractional,
            ..config()
        };
        let desc = two_site().descriptor().clone();
        let enc = TensorEncoder::from_descriptor_with_config(desc, &cfg).unwrap();
        assert_relative_eq!(enc.tensor().get(12, 13, 0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_into_parts() {
        let mut enc = two_site();
        enc.normalize().unwrap();
        let (array, normalized) = enc.into_parts();
        assert_eq!(array.shape(), &[64, 64, 4]);
        assert!(normalized);
    }

    #[test]
    fn test_molecule_unsupported() {
        let atoms = vec![Atom { element: "O".into(), position: [0.0, 0.0, 0.0] }];
        let err = TensorEncoder::from_parsed(ParsedInput::Molecule(atoms)).unwrap_err();
        assert!(matches!(err, EncodeError::UnsupportedInputForm(_)));
    }

    #[test]
    fn test_from_parsed_structure() {
        let structure = Structure::new(
            [[10.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 5.0]],
            vec![
                Atom { element: "Fe".into(), position: [0.0, 0.0, 0.0] },
                Atom { element: "O".into(), position: [5.0, 0.0, 0.0] },
            ],
        );
        let enc = TensorEncoder::from_parsed(ParsedInput::Structure(structure)).unwrap();

        let t = enc.tensor();
        assert_eq!(t.site_count(), 2);
        assert_relative_eq!(t.get(12, 13, 0), 5.0, epsilon = 1e-12);
        assert_relative_eq!(t.get(4, 12, 0), 10.0, epsilon = 1e-12);
        assert!(enc.descriptor().sg >= 1 && enc.descriptor().sg <= 230);
    }

    #[test]
    fn test_from_file_poscar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("POSCAR");
        fs::write(
            &path,
            "CsCl\n1.0\n4.0 0.0 0.0\n0.0 4.0 0.0\n0.0 0.0 4.0\nCs Cl\n1 1\nDirect\n0.0 0.0 0.0\n0.5 0.5 0.5\n",
        )
        .unwrap();

        let enc = TensorEncoder::from_file(&path).unwrap();
        let t = enc.tensor();
        assert_eq!(enc.descriptor().sg, 221);
        assert_eq!(t.get(0, 12, 0), 55.0);
        assert_eq!(t.get(0, 13, 0), 17.0);
        assert_relative_eq!(t.get(12, 13, 0), 12f64.sqrt(), epsilon = 1e-10);
        assert_relative_eq!(t.get(10, 13, 3), 221.0);
    }

    #[test]
    fn test_from_file_missing() {
        let err = TensorEncoder::from_file("/definitely/not/here.cif").unwrap_err();
        assert!(matches!(err, EncodeError::Io(_)));
    }
}
