//! Laser injection.
//!
//! - [`profile`]: analytic waveforms
//! - [`definition`]: per-step evaluation and the functor writing it
//! - [`kernel`]: the block/worker injection kernel
//! - [`physics`]: [`LaserPhysics`], deciding each step whether to inject

pub mod definition;
pub mod kernel;
pub mod physics;
pub mod profile;

pub use definition::{LaserDefinition, LaserFunctor, PlaneCellWriter};
pub use kernel::{plane_offsets, LaserKernel, LaserPlane, PlaneGeometry};
pub use physics::{Activation, LaserPhysics};
pub use profile::{GaussianBeam, LaserProfile, PlaneWave, Polarisation, Transverse};

/// Laser selection and placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserConfig {
    /// Waveform
    pub profile: LaserProfile,
    /// Plane position in cells from the local-domain start along y
    pub init_plane_y: u32,
    /// Plane height in cells
    pub init_cells_in_y: u32,
}

impl LaserConfig {
    /// Laser injected in a single-cell plane at the domain boundary.
    pub fn new(profile: LaserProfile) -> Self {
        Self {
            profile,
            init_plane_y: 0,
            init_cells_in_y: 1,
        }
    }

    /// Move the plane to `y` cells from the local-domain start.
    pub fn with_init_plane_y(mut self, y: u32) -> Self {
        self.init_plane_y = y;
        self
    }

    /// Set the plane height in cells.
    pub fn with_init_cells_in_y(mut self, cells: u32) -> Self {
        self.init_cells_in_y = cells;
        self
    }
}

impl Default for LaserConfig {
    fn default() -> Self {
        Self::new(LaserProfile::None)
    }
}
