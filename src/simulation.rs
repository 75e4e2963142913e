//! Step runner driving the laser over a range of time steps.
//!
//! This is a harness around [`LaserPhysics`], not a particle-in-cell time
//! loop: no field solver or particle push runs between steps.

use indicatif::{ProgressBar, ProgressStyle};
use instant::Instant;
use log::info;

use crate::fields::FieldE;
use crate::laser::LaserPhysics;
use crate::Result;

/// Statistics from a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    /// Steps executed
    pub steps: u32,
    /// Steps at which the laser was injected
    pub injected_steps: u32,
    /// Wall clock time (seconds)
    pub wall_time: f64,
    /// Sum of |E|^2 after the last step
    pub final_energy: f64,
}

/// Field plus laser, advanced step by step.
#[derive(Debug)]
pub struct Simulation<const D: usize> {
    laser: LaserPhysics<D>,
    field: FieldE<D>,
    current_step: u32,
    show_progress: bool,
}

impl<const D: usize> Simulation<D> {
    /// Runner with a zeroed field matching the laser layout.
    pub fn new(laser: LaserPhysics<D>) -> Self {
        let field = FieldE::new(*laser.geometry().layout());
        Self {
            laser,
            field,
            current_step: 0,
            show_progress: false,
        }
    }

    /// Show a progress bar during `run`.
    pub fn set_show_progress(&mut self, show: bool) {
        self.show_progress = show;
    }

    /// Next step to execute.
    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    /// Current field.
    pub fn field(&self) -> &FieldE<D> {
        &self.field
    }

    /// Mutable field, e.g. to seed initial values.
    pub fn field_mut(&mut self) -> &mut FieldE<D> {
        &mut self.field
    }

    /// Laser driven by this runner.
    pub fn laser(&self) -> &LaserPhysics<D> {
        &self.laser
    }

    /// Run `steps` steps starting at the current step.
    pub fn run(&mut self, steps: u32) -> Result<RunStats> {
        let progress = if self.show_progress {
            let pb = ProgressBar::new(steps as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({per_sec})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            Some(pb)
        } else {
            None
        };

        let start_time = Instant::now();
        let mut injected_steps = 0;

        for _ in 0..steps {
            if self.laser.activation(self.current_step).is_active() {
                injected_steps += 1;
            }
            self.laser.apply(self.current_step, &mut self.field)?;
            self.current_step += 1;

            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message("Run complete");
        }

        let stats = RunStats {
            steps,
            injected_steps,
            wall_time: start_time.elapsed().as_secs_f64(),
            final_energy: self.field.energy(),
        };

        info!(
            "Completed {} steps on {} backend in {:.2}s, laser injected in {} of them",
            stats.steps,
            self.laser.backend_name(),
            stats.wall_time,
            stats.injected_steps
        );

        Ok(stats)
    }
}
