//src/model/mod.rs
pub mod descriptor;
pub mod elements;
pub mod structure;
pub mod symmetry;

// Re-exports for cleaner imports
pub use descriptor::{Site, StructureDescriptor};
pub use elements::atomic_number;
pub use structure::{Atom, Structure};
