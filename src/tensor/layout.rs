// src/tensor/layout.rs

//! Index layout of the crystal graph tensor.
//!
//! Rows and columns 0..12 hold broadcast structure features, rows and
//! columns 12..64 hold one site each. The trailing axis has four channels.

/// Rows (and columns) of the square tensor.
pub const DIM: usize = 64;
/// Length of the trailing axis.
pub const CHANNELS: usize = 4;
/// First row of the site block.
pub const SITE_OFFSET: usize = 12;
/// Number of sites the site block can hold.
pub const MAX_SITES: usize = DIM - SITE_OFFSET;
/// Global row kept at zero.
pub const RESERVED: usize = 11;

/// Site-block channel holding the pair distance.
pub const DISTANCE: usize = 0;
/// Site-block channels holding the x, y, z displacement.
pub const DISPLACEMENT: [usize; 3] = [1, 2, 3];

/// Tensor row/column of site `i`.
#[inline]
pub fn site_row(i: usize) -> usize {
    SITE_OFFSET + i
}

/// The broadcast features of the global block, in row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalFeature {
    Atom,
    X,
    Y,
    Z,
    A,
    B,
    C,
    Alpha,
    Beta,
    Gamma,
    SpaceGroup,
}

impl GlobalFeature {
    pub const ALL: [GlobalFeature; 11] = [
        GlobalFeature::Atom,
        GlobalFeature::X,
        GlobalFeature::Y,
        GlobalFeature::Z,
        GlobalFeature::A,
        GlobalFeature::B,
        GlobalFeature::C,
        GlobalFeature::Alpha,
        GlobalFeature::Beta,
        GlobalFeature::Gamma,
        GlobalFeature::SpaceGroup,
    ];

    /// Row/column of this feature in the global block.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            GlobalFeature::Atom => "atom",
            GlobalFeature::X => "x",
            GlobalFeature::Y => "y",
            GlobalFeature::Z => "z",
            GlobalFeature::A => "a",
            GlobalFeature::B => "b",
            GlobalFeature::C => "c",
            GlobalFeature::Alpha => "alpha",
            GlobalFeature::Beta => "beta",
            GlobalFeature::Gamma => "gamma",
            GlobalFeature::SpaceGroup => "sg",
        }
    }
}
