//! Laser injection kernel.
//!
//! One block per supercell touching the injection plane. The workers of a
//! block split the plane cells of their supercell round-robin and hand each
//! cell to the block's laser writer.

use crate::grid::{AreaMapping, DataSpace, GridLayout, SuperCellSize, Y};
use crate::kernel::{BlockKernel, ForEachIdx, WorkerCfg};
use crate::laser::definition::{LaserFunctor, PlaneCellWriter};
use crate::{Error, Result};

/// Cells of one supercell that take part in the injection.
///
/// Same as the supercell on every axis except y, where it spans
/// `init_cells_in_y` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaserPlane<const D: usize> {
    size: DataSpace<D>,
}

impl<const D: usize> LaserPlane<D> {
    /// Plane of `init_cells_in_y` cells inside supercells of `super_cell`.
    pub fn new(super_cell: SuperCellSize<D>, init_cells_in_y: u32) -> Result<Self> {
        let sc = super_cell.extent();
        if init_cells_in_y == 0 || init_cells_in_y as i64 > sc[Y] as i64 {
            return Err(Error::Config(format!(
                "laser plane height {init_cells_in_y} must be in 1..={} (supercell height)",
                sc[Y]
            )));
        }
        Ok(Self {
            size: sc.with_component(Y, init_cells_in_y as i32),
        })
    }

    /// Plane extent inside one supercell.
    pub fn size(&self) -> DataSpace<D> {
        self.size
    }

    /// Number of plane cells per supercell.
    pub fn volume(&self) -> u32 {
        self.size.product() as u32
    }
}

/// Split `init_plane_y` into whole supercell rows and the residual cell
/// offset inside the first touched supercell.
pub fn plane_offsets(init_plane_y: u32, super_cell_y: u32) -> (u32, u32) {
    (init_plane_y / super_cell_y, init_plane_y % super_cell_y)
}

/// Fixed launch geometry of the injection for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneGeometry<const D: usize> {
    layout: GridLayout<D>,
    mapping: AreaMapping<D>,
    plane: LaserPlane<D>,
    init_plane_y: u32,
}

impl<const D: usize> PlaneGeometry<D> {
    /// Geometry for a plane at `init_plane_y` cells from the local-domain start.
    ///
    /// `plane` must be cut from the supercell of `layout`.
    pub fn new(layout: GridLayout<D>, plane: LaserPlane<D>, init_plane_y: u32) -> Result<Self> {
        let sc = layout.super_cell().extent();
        let size = plane.size();
        if size.with_component(Y, sc[Y]) != sc || size[Y] > sc[Y] {
            return Err(Error::Config(format!(
                "laser plane {size} does not fit the layout supercell {sc}"
            )));
        }
        Ok(Self {
            layout,
            mapping: AreaMapping::new(&layout),
            plane,
            init_plane_y,
        })
    }

    /// Blocks to launch: all supercells of the local domain on x (and z),
    /// one layer on y.
    pub fn grid_blocks(&self) -> DataSpace<D> {
        self.mapping.grid_dim().with_component(Y, 1)
    }

    /// Supercell rows skipped before the plane starts.
    pub fn block_offset_correction(&self) -> u32 {
        plane_offsets(self.init_plane_y, self.super_cell().extent()[Y] as u32).0
    }

    /// Cell offset of the plane inside its supercell.
    pub fn cell_offset_in_super_cell(&self) -> u32 {
        plane_offsets(self.init_plane_y, self.super_cell().extent()[Y] as u32).1
    }

    /// Plane position in cells from the local-domain start.
    pub fn init_plane_y(&self) -> u32 {
        self.init_plane_y
    }

    /// Field layout.
    pub fn layout(&self) -> &GridLayout<D> {
        &self.layout
    }

    /// Block to supercell mapping.
    pub fn mapping(&self) -> &AreaMapping<D> {
        &self.mapping
    }

    /// Plane extent inside a supercell.
    pub fn plane(&self) -> &LaserPlane<D> {
        &self.plane
    }

    /// Supercell extent.
    pub fn super_cell(&self) -> SuperCellSize<D> {
        self.mapping.super_cell_size()
    }
}

/// Injection kernel over a laser functor.
pub struct LaserKernel<const D: usize, F> {
    geometry: PlaneGeometry<D>,
    functor: F,
}

impl<const D: usize, F> LaserKernel<D, F>
where
    F: LaserFunctor<D>,
{
    /// Kernel writing through `functor`.
    pub fn new(geometry: PlaneGeometry<D>, functor: F) -> Self {
        Self { geometry, functor }
    }

    /// Launch geometry.
    pub fn geometry(&self) -> &PlaneGeometry<D> {
        &self.geometry
    }
}

impl<const D: usize, F> BlockKernel<D> for LaserKernel<D, F>
where
    F: LaserFunctor<D>,
{
    fn run(&self, block_idx: DataSpace<D>, worker: WorkerCfg) {
        let mapping = self.geometry.mapping();
        let super_cell_idx = mapping.super_cell_index(block_idx);

        // offset of the supercell (in supercells, without guards) to the local-domain origin
        let mut local_super_cell_offset = super_cell_idx - mapping.guarding_super_cells();
        local_super_cell_offset[Y] += self.geometry.block_offset_correction() as i32;
        let cell_offset_in_super_cell = self.geometry.cell_offset_in_super_cell() as i32;

        let mut acc = self.functor.bind(local_super_cell_offset, worker);
        let plane = self.geometry.plane();
        let plane_size = plane.size();

        ForEachIdx::new(plane.volume(), worker).for_each(|linear_idx, _| {
            let mut cell = DataSpace::map_linear(&plane_size, linear_idx);
            cell[Y] += cell_offset_in_super_cell;
            acc.write(cell);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{BasicBackend, KernelBackend, ParallelBackend};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_plane_offsets() {
        assert_eq!(plane_offsets(0, 8), (0, 0));
        assert_eq!(plane_offsets(10, 8), (1, 2));
        assert_eq!(plane_offsets(7, 8), (0, 7));
        assert_eq!(plane_offsets(16, 8), (2, 0));
    }

    #[test]
    fn test_plane_larger_than_super_cell_rejected() {
        let sc = SuperCellSize::new([8, 4, 2]).unwrap();
        assert!(matches!(LaserPlane::new(sc, 5), Err(Error::Config(_))));
        assert!(LaserPlane::new(sc, 0).is_err());
        let plane = LaserPlane::new(sc, 4).unwrap();
        assert_eq!(plane.size(), DataSpace::new([8, 4, 2]));
        assert_eq!(LaserPlane::new(sc, 1).unwrap().volume(), 16);
    }

    fn geometry_3d(init_plane_y: u32) -> PlaneGeometry<3> {
        let sc = SuperCellSize::new([4, 8, 2]).unwrap();
        let layout = GridLayout::new(
            DataSpace::new([8, 32, 4]),
            DataSpace::new([4, 8, 2]),
            sc,
        )
        .unwrap();
        PlaneGeometry::new(layout, LaserPlane::new(sc, 1).unwrap(), init_plane_y).unwrap()
    }

    #[test]
    fn test_plane_from_other_super_cell_rejected() {
        let layout_sc = SuperCellSize::new([4, 4]).unwrap();
        let layout =
            GridLayout::new(DataSpace::new([12, 16]), DataSpace::new([0, 0]), layout_sc).unwrap();

        let wide = SuperCellSize::new([8, 4]).unwrap();
        let plane = LaserPlane::new(wide, 1).unwrap();
        assert!(matches!(
            PlaneGeometry::new(layout, plane, 0),
            Err(Error::Config(_))
        ));

        let tall = SuperCellSize::new([4, 8]).unwrap();
        assert!(PlaneGeometry::new(layout, LaserPlane::new(tall, 8).unwrap(), 0).is_err());

        let geometry = PlaneGeometry::new(layout, LaserPlane::new(layout_sc, 1).unwrap(), 0);
        assert_eq!(geometry.unwrap().grid_blocks(), DataSpace::new([3, 1]));
    }

    #[test]
    fn test_grid_blocks_single_layer() {
        let geometry = geometry_3d(10);
        assert_eq!(geometry.grid_blocks(), DataSpace::new([2, 1, 2]));
        assert_eq!(geometry.block_offset_correction(), 1);
        assert_eq!(geometry.cell_offset_in_super_cell(), 2);
    }

    /// Records the local-domain cells a launch visits.
    struct Recorder {
        super_cell: DataSpace<3>,
        cells: Mutex<Vec<DataSpace<3>>>,
        binds: AtomicU32,
    }

    struct RecorderAcc<'a> {
        recorder: &'a Recorder,
        origin: DataSpace<3>,
    }

    impl PlaneCellWriter<3> for RecorderAcc<'_> {
        fn write(&mut self, cell_in_super_cell: DataSpace<3>) {
            let mut cells = self.recorder.cells.lock().unwrap();
            cells.push(self.origin + cell_in_super_cell);
        }
    }

    impl<'r> LaserFunctor<3> for &'r Recorder {
        type Acc = RecorderAcc<'r>;

        fn bind(&self, offset: DataSpace<3>, _worker: WorkerCfg) -> RecorderAcc<'r> {
            self.binds.fetch_add(1, Ordering::Relaxed);
            RecorderAcc {
                recorder: *self,
                origin: offset * self.super_cell,
            }
        }
    }

    fn record<B: KernelBackend>(backend: &B, init_plane_y: u32) -> (Vec<DataSpace<3>>, u32) {
        let geometry = geometry_3d(init_plane_y);
        let recorder = Recorder {
            super_cell: geometry.super_cell().extent(),
            cells: Mutex::new(Vec::new()),
            binds: AtomicU32::new(0),
        };
        let kernel = LaserKernel::new(geometry, &recorder);
        let workers = backend.num_workers(geometry.plane().volume());
        backend
            .launch(geometry.grid_blocks(), workers, &kernel)
            .unwrap();
        let mut cells = recorder.cells.into_inner().unwrap();
        cells.sort_by_key(|c| (c[2], c[1], c[0]));
        (cells, recorder.binds.load(Ordering::Relaxed))
    }

    fn expected_plane(y: i32) -> Vec<DataSpace<3>> {
        let mut cells = Vec::new();
        for z in 0..4 {
            for x in 0..8 {
                cells.push(DataSpace::new([x, y, z]));
            }
        }
        cells
    }

    #[test]
    fn test_kernel_visits_plane_once() {
        let (cells, binds) = record(&BasicBackend::new(), 10);
        assert_eq!(cells, expected_plane(10));
        // 4 blocks x 1 worker
        assert_eq!(binds, 4);
    }

    #[test]
    fn test_kernel_plane_at_origin() {
        let (cells, _) = record(&BasicBackend::with_workers(3), 0);
        assert_eq!(cells, expected_plane(0));
    }

    #[test]
    fn test_kernel_parallel_workers() {
        let (cells, binds) = record(&ParallelBackend::with_workers(5), 19);
        assert_eq!(cells, expected_plane(19));
        assert_eq!(binds, 4 * 5);
    }
}
