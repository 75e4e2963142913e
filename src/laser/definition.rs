//! Per-step laser evaluation bound to a field.

use crate::fields::FieldWriter;
use crate::grid::{DataSpace, SubGrid, SuperCellSize, Y};
use crate::kernel::WorkerCfg;
use crate::laser::profile::{LaserProfile, Transverse};
use crate::params::GridParams;
use crate::Float3;

/// Laser field at one time step.
///
/// Built fresh for every step from the step counter and discarded after the
/// launch. The temporal part is evaluated on construction, the transverse
/// shape per cell.
#[derive(Debug, Clone, Copy)]
pub struct LaserDefinition<const D: usize> {
    step: u32,
    time: f64,
    time_part: Float3,
    transverse: Transverse,
    cell_size: [f64; 3],
    global_size: DataSpace<D>,
    local_offset: DataSpace<D>,
}

impl<const D: usize> LaserDefinition<D> {
    /// Evaluate `profile` at `step`.
    pub fn new(
        step: u32,
        profile: &LaserProfile,
        params: &GridParams,
        sub_grid: &SubGrid<D>,
    ) -> Self {
        let time = step as f64 * params.dt;
        Self {
            step,
            time,
            time_part: profile.time_part(time, params.speed_of_light),
            transverse: profile.transverse(),
            cell_size: params.cell_size,
            global_size: sub_grid.global_size(),
            local_offset: sub_grid.local_offset(),
        }
    }

    /// Step this definition was built for.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Simulation time (s).
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Temporal part of the field shared by all cells.
    pub fn time_part(&self) -> Float3 {
        self.time_part
    }

    /// Transverse shape.
    pub fn transverse(&self) -> Transverse {
        self.transverse
    }

    /// Cell size (m).
    pub fn cell_size(&self) -> [f64; 3] {
        self.cell_size
    }

    /// Global domain size in cells.
    pub fn global_size(&self) -> DataSpace<D> {
        self.global_size
    }

    /// Offset of the local domain in the global domain.
    pub fn local_offset(&self) -> DataSpace<D> {
        self.local_offset
    }

    /// Transverse factor for a cell given in local-domain coordinates.
    ///
    /// The distance is taken from the cell centre to the centre of the
    /// global domain, in x and (3D) z.
    pub fn transverse_factor(&self, local_cell: DataSpace<D>) -> f64 {
        match self.transverse {
            Transverse::Uniform => 1.0,
            Transverse::Gaussian { w0 } => {
                let global = local_cell + self.local_offset;
                let mut r2 = 0.0;
                for axis in (0..D).filter(|&a| a != Y) {
                    let centre = 0.5 * self.global_size[axis] as f64;
                    let d = (global[axis] as f64 + 0.5 - centre) * self.cell_size[axis];
                    r2 += d * d;
                }
                (-r2 / (w0 * w0)).exp()
            }
        }
    }

    /// Field vector written into a cell given in local-domain coordinates.
    #[inline]
    pub fn value_at(&self, local_cell: DataSpace<D>) -> Float3 {
        let f = self.transverse_factor(local_cell) as f32;
        [
            self.time_part[0] * f,
            self.time_part[1] * f,
            self.time_part[2] * f,
        ]
    }
}

/// Writes one cell of the injection plane.
pub trait PlaneCellWriter<const D: usize> {
    /// Handle `cell_in_super_cell`, given relative to the block's supercell.
    fn write(&mut self, cell_in_super_cell: DataSpace<D>);
}

/// Produces a per-block cell writer.
///
/// The injection kernel binds the functor once per block and worker to the
/// block's supercell offset in the local domain.
pub trait LaserFunctor<const D: usize>: Sync {
    /// Writer bound to one block.
    type Acc: PlaneCellWriter<D>;

    /// Bind to the supercell at `local_super_cell_offset` (in supercells,
    /// guards excluded).
    fn bind(&self, local_super_cell_offset: DataSpace<D>, worker: WorkerCfg) -> Self::Acc;
}

/// Laser functor overwriting E-field cells with a [`LaserDefinition`].
///
/// Only sound when driven by [`LaserKernel`](crate::laser::LaserKernel),
/// which hands every plane cell to exactly one worker per launch.
#[derive(Clone, Copy)]
pub(crate) struct FieldLaserFunctor<'a, const D: usize> {
    definition: &'a LaserDefinition<D>,
    writer: FieldWriter<'a, D>,
    super_cell: DataSpace<D>,
}

impl<'a, const D: usize> FieldLaserFunctor<'a, D> {
    /// Functor writing `definition` through `writer`.
    pub(crate) fn new(
        definition: &'a LaserDefinition<D>,
        writer: FieldWriter<'a, D>,
        super_cell: SuperCellSize<D>,
    ) -> Self {
        Self {
            definition,
            writer,
            super_cell: super_cell.extent(),
        }
    }
}

impl<'a, const D: usize> LaserFunctor<D> for FieldLaserFunctor<'a, D> {
    type Acc = AccLaser<'a, D>;

    fn bind(&self, local_super_cell_offset: DataSpace<D>, _worker: WorkerCfg) -> AccLaser<'a, D> {
        AccLaser {
            definition: self.definition,
            writer: self.writer,
            origin: local_super_cell_offset * self.super_cell,
        }
    }
}

/// Block-bound writer of [`FieldLaserFunctor`].
pub(crate) struct AccLaser<'a, const D: usize> {
    definition: &'a LaserDefinition<D>,
    writer: FieldWriter<'a, D>,
    origin: DataSpace<D>,
}

impl<const D: usize> PlaneCellWriter<D> for AccLaser<'_, D> {
    #[inline]
    fn write(&mut self, cell_in_super_cell: DataSpace<D>) {
        let cell = self.origin + cell_in_super_cell;
        let value = self.definition.value_at(cell);
        // SAFETY: blocks own distinct supercells and the workers of a block
        // split the plane cells round-robin, so `cell` has a single writer.
        let written = unsafe { self.writer.set(cell, value) };
        debug_assert!(written, "laser cell {cell:?} outside the stored field");
    }
}
