//! Per-step laser orchestration.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};

use crate::comm::{GridController, Side, StaticGridController};
use crate::fields::FieldE;
use crate::gpu::GpuLaserInjector;
use crate::grid::{GridLayout, SubGrid, Y};
use crate::kernel::{Backend, KernelBackend};
use crate::laser::definition::{FieldLaserFunctor, LaserDefinition};
use crate::laser::kernel::{LaserKernel, LaserPlane, PlaneGeometry};
use crate::laser::LaserConfig;
use crate::params::{AbsorberCells, GridParams};
use crate::window::{MovingWindow, StaticWindow};
use crate::{Error, Result};

/// Where the injection kernel runs.
enum Injector {
    Cpu(Backend),
    Gpu(Box<GpuLaserInjector>),
}

impl Injector {
    fn name(&self) -> &str {
        match self {
            Injector::Cpu(backend) => backend.name(),
            Injector::Gpu(_) => "gpu",
        }
    }
}

/// Conditions that switch the laser off at a step.
///
/// The laser is injected only if none of them holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Activation {
    /// The profile has zero init time
    pub profile_disabled: bool,
    /// The init time has passed, corrected by the plane's light travel time
    pub init_time_elapsed: bool,
    /// The lower y boundary is periodic
    pub top_periodic: bool,
    /// The moving window has slid at least once during the run
    pub has_slid: bool,
}

impl Activation {
    /// True if the laser is injected.
    pub fn is_active(&self) -> bool {
        self.reason().is_none()
    }

    /// First condition that disables the laser.
    pub fn reason(&self) -> Option<&'static str> {
        if self.profile_disabled {
            Some("laser profile disabled")
        } else if self.init_time_elapsed {
            Some("init time elapsed")
        } else if self.top_periodic {
            Some("y boundary is periodic")
        } else if self.has_slid {
            Some("moving window has slid")
        } else {
            None
        }
    }
}

/// Laser injection boundary condition.
///
/// Writes the laser into the injection plane of the E field every step
/// while the laser is being initialised. Once the moving window has slid
/// the laser stays off for the rest of the run.
pub struct LaserPhysics<const D: usize> {
    config: LaserConfig,
    params: GridParams,
    geometry: PlaneGeometry<D>,
    sub_grid: SubGrid<D>,
    window: Arc<dyn MovingWindow>,
    controller: Arc<dyn GridController>,
    injector: Injector,
    has_slid: AtomicBool,
}

impl<const D: usize> fmt::Debug for LaserPhysics<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaserPhysics")
            .field("config", &self.config)
            .field("params", &self.params)
            .field("geometry", &self.geometry)
            .field("injector", &self.injector.name())
            .field("has_slid", &self.has_slid.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<const D: usize> LaserPhysics<D> {
    /// Validate `config` against the grid and build the injection kernel.
    ///
    /// The plane is cut from the supercell of `layout`. Uses a static
    /// window, an absorbing grid and the default CPU backend until replaced
    /// with the `with_*` methods.
    pub fn new(
        config: LaserConfig,
        params: GridParams,
        layout: GridLayout<D>,
        absorber: AbsorberCells,
    ) -> Result<Self> {
        config.profile.validate()?;
        params.validate()?;

        // the plane must lie behind the absorber unless it sits on the boundary
        let absorber_y = absorber.get(Y, Side::Lower);
        let plane_y = config.init_plane_y;
        if !(plane_y > absorber_y || plane_y == 0 || config.profile.is_disabled()) {
            return Err(Error::Config(format!(
                "laser plane at y = {plane_y} lies inside the absorber ({absorber_y} cells)"
            )));
        }

        let plane = LaserPlane::new(layout.super_cell(), config.init_cells_in_y)?;
        let geometry = PlaneGeometry::new(layout, plane, plane_y)?;

        info!(
            "Laser: {} profile, init time {:.3e} s, plane at y = {} ({} cells high)",
            config.profile.name(),
            config.profile.init_time(),
            plane_y,
            config.init_cells_in_y
        );

        Ok(Self {
            config,
            params,
            geometry,
            sub_grid: SubGrid::single(layout.data_space_without_guarding()),
            window: Arc::new(StaticWindow),
            controller: Arc::new(StaticGridController::<D>::absorbing()),
            injector: Injector::Cpu(Backend::default()),
            has_slid: AtomicBool::new(false),
        })
    }

    /// Place the local domain inside a larger global domain.
    pub fn with_sub_grid(mut self, sub_grid: SubGrid<D>) -> Result<Self> {
        let local = self.geometry.layout().data_space_without_guarding();
        if sub_grid.local_size() != local {
            return Err(Error::Config(format!(
                "sub grid local size {} differs from field layout {local}",
                sub_grid.local_size()
            )));
        }
        self.sub_grid = sub_grid;
        Ok(self)
    }

    /// Set the moving window.
    pub fn with_window(mut self, window: Arc<dyn MovingWindow>) -> Self {
        self.window = window;
        self
    }

    /// Set the grid controller.
    pub fn with_grid_controller(mut self, controller: Arc<dyn GridController>) -> Self {
        self.controller = controller;
        self
    }

    /// Run the kernel on a CPU backend.
    pub fn with_backend(mut self, backend: impl Into<Backend>) -> Self {
        self.injector = Injector::Cpu(backend.into());
        self
    }

    /// Run the kernel on the WebGPU device.
    pub fn with_gpu(mut self) -> Result<Self> {
        self.injector = Injector::Gpu(Box::new(GpuLaserInjector::new(&self.geometry)?));
        Ok(self)
    }

    /// Laser configuration.
    pub fn config(&self) -> &LaserConfig {
        &self.config
    }

    /// Launch geometry of the injection kernel.
    pub fn geometry(&self) -> &PlaneGeometry<D> {
        &self.geometry
    }

    /// Name of the backend running the kernel.
    pub fn backend_name(&self) -> &str {
        self.injector.name()
    }

    /// Time (s) light needs from the domain start to the injection plane.
    pub fn laser_time_shift(&self) -> f64 {
        self.config.init_plane_y as f64 * self.params.cell_height() / self.params.speed_of_light
    }

    /// Evaluate the activation conditions at `current_step`.
    pub fn activation(&self, current_step: u32) -> Activation {
        let run_time = current_step as f64 * self.params.dt - self.laser_time_shift();
        let init_time = self.config.profile.init_time();
        let slides = self.window.slide_count_at(current_step);
        Activation {
            profile_disabled: self.config.profile.is_disabled(),
            init_time_elapsed: run_time >= init_time,
            top_periodic: self.controller.is_boundary_periodic(Y, Side::Lower),
            has_slid: slides != 0 || self.has_slid.load(Ordering::Relaxed),
        }
    }

    /// Inject the laser for `current_step` into `field`.
    ///
    /// Does nothing if the laser is off at this step. Returns once all
    /// writes have landed in `field`.
    pub fn apply(&self, current_step: u32, field: &mut FieldE<D>) -> Result<()> {
        if field.layout() != self.geometry.layout() {
            return Err(Error::Config(format!(
                "field layout {:?} does not match laser layout {:?}",
                field.layout(),
                self.geometry.layout()
            )));
        }

        let activation = self.activation(current_step);
        if activation.has_slid {
            self.has_slid.store(true, Ordering::Relaxed);
        }
        if let Some(reason) = activation.reason() {
            debug!("Laser off at step {current_step}: {reason}");
            return Ok(());
        }

        let local_y = self.geometry.layout().data_space_without_guarding()[Y] as i64;
        let plane_y = self.config.init_plane_y as i64;
        if plane_y >= local_y {
            return Err(Error::Config(format!(
                "laser plane at y = {plane_y} outside local domain of height {local_y}"
            )));
        }
        let plane_end = plane_y + self.config.init_cells_in_y as i64;
        if plane_end > local_y {
            return Err(Error::Config(format!(
                "laser plane y = {plane_y}..{plane_end} crosses the local domain end at {local_y}"
            )));
        }

        let definition =
            LaserDefinition::new(current_step, &self.config.profile, &self.params, &self.sub_grid);

        match &self.injector {
            Injector::Cpu(backend) => {
                let functor =
                    FieldLaserFunctor::new(&definition, field.writer(), self.geometry.super_cell());
                let kernel = LaserKernel::new(self.geometry, functor);
                let workers = backend.num_workers(self.geometry.plane().volume());
                backend.launch(self.geometry.grid_blocks(), workers, &kernel)
            }
            Injector::Gpu(gpu) => gpu.inject(field, &definition, &self.geometry),
        }
    }
}
