//! Moving window schedules.
//!
//! A moving window shifts the simulated domain along y to follow a
//! propagating structure. Each shift ("slide") moves the grid by one
//! supercell row.

use crate::params::GridParams;
use crate::{Error, Result};

/// Reports how many slides the window has performed.
pub trait MovingWindow: Send + Sync {
    /// Number of slides performed up to and including `step`.
    fn slide_count_at(&self, step: u32) -> u32;
}

/// Window that never moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticWindow;

impl MovingWindow for StaticWindow {
    fn slide_count_at(&self, _step: u32) -> u32 {
        0
    }
}

/// Window moving along y at a fixed velocity.
///
/// After `start_step` the window slides once every time it has travelled
/// one supercell row.
#[derive(Debug, Clone, Copy)]
pub struct SlidingWindow {
    start_step: u32,
    dt: f64,
    velocity: f64,
    row_height: f64,
}

impl SlidingWindow {
    /// Window moving at the speed of light of `params`, starting at step 0,
    /// sliding by `super_cell_y` cells.
    pub fn new(params: &GridParams, super_cell_y: u32) -> Result<Self> {
        if super_cell_y == 0 {
            return Err(Error::Config("supercell height must be positive".into()));
        }
        params.validate()?;
        Ok(Self {
            start_step: 0,
            dt: params.dt,
            velocity: params.speed_of_light,
            row_height: params.cell_height() * super_cell_y as f64,
        })
    }

    /// Start moving at `step`.
    pub fn with_start_step(mut self, step: u32) -> Self {
        self.start_step = step;
        self
    }

    /// Start moving once light has crossed `slide_point` (fraction in [0, 1])
    /// of a global domain `global_height` cells high.
    pub fn with_slide_point(self, slide_point: f64, global_height: u32, cell_height: f64) -> Self {
        let distance = slide_point.clamp(0.0, 1.0) * global_height as f64 * cell_height;
        let start = (distance / (self.velocity * self.dt)).ceil();
        self.with_start_step(start as u32)
    }

    /// Step at which the window starts moving.
    pub fn start_step(&self) -> u32 {
        self.start_step
    }
}

impl MovingWindow for SlidingWindow {
    fn slide_count_at(&self, step: u32) -> u32 {
        if step < self.start_step {
            return 0;
        }
        let travelled = (step - self.start_step) as f64 * self.dt * self.velocity;
        (travelled / self.row_height).floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GridParams {
        // normalised units: half a cell per step
        GridParams::new([1.0; 3], 0.5).with_speed_of_light(1.0)
    }

    #[test]
    fn test_static_window() {
        assert_eq!(StaticWindow.slide_count_at(1_000_000), 0);
    }

    #[test]
    fn test_sliding_window_counts_rows() {
        let window = SlidingWindow::new(&params(), 8).unwrap();
        // one row of 8 cells takes 16 steps
        assert_eq!(window.slide_count_at(0), 0);
        assert_eq!(window.slide_count_at(15), 0);
        assert_eq!(window.slide_count_at(17), 1);
        assert_eq!(window.slide_count_at(40), 2);
    }

    #[test]
    fn test_sliding_window_start() {
        let window = SlidingWindow::new(&params(), 8).unwrap().with_start_step(100);
        assert_eq!(window.slide_count_at(110), 0);
        assert_eq!(window.slide_count_at(117), 1);
    }

    #[test]
    fn test_slide_point() {
        let p = params();
        let window = SlidingWindow::new(&p, 8)
            .unwrap()
            .with_slide_point(0.5, 64, p.cell_height());
        // 32 cells at half a cell per step
        assert_eq!(window.start_step(), 64);
    }

    #[test]
    fn test_monotone() {
        let window = SlidingWindow::new(&params(), 4).unwrap().with_start_step(3);
        let mut prev = 0;
        for step in 0..500 {
            let n = window.slide_count_at(step);
            assert!(n >= prev);
            prev = n;
        }
    }

    #[test]
    fn test_zero_row_rejected() {
        assert!(SlidingWindow::new(&params(), 0).is_err());
    }
}
