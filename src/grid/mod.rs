//! Grid geometry of the local domain.
//!
//! The local domain is cut into fixed-size supercells. Each supercell is
//! processed by one block of workers. Guard cells surround the local domain
//! and are a whole number of supercells thick on every side.

mod data_space;
mod layout;

pub use data_space::DataSpace;
pub use layout::{AreaMapping, GridLayout, SubGrid, SuperCellSize};

/// Index of the x axis.
pub const X: usize = 0;
/// Index of the y axis, the laser propagation axis.
pub const Y: usize = 1;
/// Index of the z axis (3D only).
pub const Z: usize = 2;
