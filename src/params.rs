//! Grid and absorber parameters.

use crate::comm::Side;
use crate::constants::C0;
use crate::{Error, Result};

/// Cell size, time step and propagation speed of the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    /// Cell size per axis (m): width, height, depth
    pub cell_size: [f64; 3],
    /// Time step (s)
    pub dt: f64,
    /// Speed of light (m/s), defaults to the vacuum value
    pub speed_of_light: f64,
}

impl GridParams {
    /// Create parameters with the vacuum speed of light.
    pub fn new(cell_size: [f64; 3], dt: f64) -> Self {
        Self {
            cell_size,
            dt,
            speed_of_light: C0,
        }
    }

    /// Override the speed of light (e.g. normalised units).
    pub fn with_speed_of_light(mut self, c: f64) -> Self {
        self.speed_of_light = c;
        self
    }

    /// Cell extent along y, the laser axis.
    pub fn cell_height(&self) -> f64 {
        self.cell_size[1]
    }

    /// Check all values are finite and positive.
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !self.cell_size.iter().all(|&d| positive(d)) {
            return Err(Error::Config(format!(
                "cell size {:?} must be positive",
                self.cell_size
            )));
        }
        if !positive(self.dt) {
            return Err(Error::Config(format!("time step {} must be positive", self.dt)));
        }
        if !positive(self.speed_of_light) {
            return Err(Error::Config(format!(
                "speed of light {} must be positive",
                self.speed_of_light
            )));
        }
        Ok(())
    }
}

/// Absorber thickness in cells per axis and side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AbsorberCells {
    cells: [[u32; 2]; 3],
}

impl AbsorberCells {
    /// Thickness table indexed as `[axis][side]`.
    pub fn new(cells: [[u32; 2]; 3]) -> Self {
        Self { cells }
    }

    /// Same thickness on every face.
    pub fn uniform(thickness: u32) -> Self {
        Self {
            cells: [[thickness; 2]; 3],
        }
    }

    /// No absorber.
    pub fn none() -> Self {
        Self::default()
    }

    /// Thickness on `side` of `axis`.
    pub fn get(&self, axis: usize, side: Side) -> u32 {
        self.cells
            .get(axis)
            .map(|sides| sides[side.index()])
            .unwrap_or(0)
    }
}
