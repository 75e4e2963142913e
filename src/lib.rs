//! Laser injection for particle-in-cell field solvers.
//!
//! The crate writes an analytic laser waveform into a thin plane of cells of
//! the electric field once per time step, for as long as the laser is being
//! initialised. Work is organised the way accelerator kernels are: the local
//! domain is cut into supercells, each supercell is one block, and each block
//! is processed cooperatively by a fixed number of workers.
//!
//! # Modules
//!
//! - [`math`]: single-precision special functions (`erf`)
//! - [`grid`]: `DataSpace`, supercells, guard cells and block mapping
//! - [`fields`]: E-field storage over the local domain including guards
//! - [`kernel`]: block/worker parallel-for with pluggable backends
//! - [`window`] and [`comm`]: moving window and boundary topology services
//! - [`laser`]: profiles, the injection kernel and the [`LaserPhysics`] orchestrator
//! - [`gpu`]: WebGPU dispatch of the injection kernel
//! - [`simulation`]: a step runner driving the laser over a range of steps

pub mod comm;
pub mod constants;
pub mod error;
pub mod fields;
pub mod gpu;
pub mod grid;
pub mod kernel;
pub mod laser;
pub mod math;
pub mod params;
pub mod simulation;
pub mod window;

pub use error::{Error, Result};
pub use laser::LaserPhysics;

/// Floating point type of the field arrays.
pub type FloatX = f32;

/// One E-field vector (x, y, z components).
pub type Float3 = [FloatX; 3];
