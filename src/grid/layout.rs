//! Supercell decomposition, guard regions and block mapping.

use super::DataSpace;
use crate::{Error, Result};

/// Validated extent of one supercell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperCellSize<const D: usize>(DataSpace<D>);

impl<const D: usize> SuperCellSize<D> {
    /// Create a supercell size. Every extent must be positive.
    pub fn new(extent: [i32; D]) -> Result<Self> {
        const { assert!(D == 2 || D == 3, "only 2D and 3D grids are supported") };

        if extent.iter().any(|&e| e <= 0) {
            return Err(Error::Config(format!(
                "supercell extents must be positive, got {}",
                DataSpace(extent)
            )));
        }
        Ok(Self(DataSpace(extent)))
    }

    /// Extent as a `DataSpace`.
    #[inline]
    pub fn extent(&self) -> DataSpace<D> {
        self.0
    }

    /// Number of cells in one supercell.
    pub fn volume(&self) -> u32 {
        self.0.product() as u32
    }
}

/// Layout of a field over the local domain.
///
/// `size` is the local domain without guards, `guard` the guard thickness
/// on each side. Both are whole multiples of the supercell extent, which
/// the layout keeps so block mappings always use the one it was checked
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout<const D: usize> {
    size: DataSpace<D>,
    guard: DataSpace<D>,
    super_cell: SuperCellSize<D>,
}

impl<const D: usize> GridLayout<D> {
    /// Create a layout and check it against the supercell extent.
    pub fn new(
        size: DataSpace<D>,
        guard: DataSpace<D>,
        super_cell: SuperCellSize<D>,
    ) -> Result<Self> {
        let sc = super_cell.extent();
        for axis in 0..D {
            if size[axis] <= 0 {
                return Err(Error::Config(format!(
                    "local domain size {size} must be positive on every axis"
                )));
            }
            if guard[axis] < 0 {
                return Err(Error::Config(format!("guard {guard} must not be negative")));
            }
            if size[axis] % sc[axis] != 0 || guard[axis] % sc[axis] != 0 {
                return Err(Error::Config(format!(
                    "local domain {size} and guard {guard} must be multiples of the supercell {sc}"
                )));
            }
        }
        Ok(Self {
            size,
            guard,
            super_cell,
        })
    }

    /// Extent including guard cells on both sides.
    pub fn data_space(&self) -> DataSpace<D> {
        self.size + self.guard * 2
    }

    /// Extent of the local domain without guards.
    pub fn data_space_without_guarding(&self) -> DataSpace<D> {
        self.size
    }

    /// Guard thickness on each side.
    pub fn guard(&self) -> DataSpace<D> {
        self.guard
    }

    /// Supercell extent the layout is divided into.
    pub fn super_cell(&self) -> SuperCellSize<D> {
        self.super_cell
    }
}

/// Maps block indices of the non-guard area onto supercell indices.
///
/// Supercell indices count from the lower guard corner, so the first
/// physical supercell has index `guarding_super_cells()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaMapping<const D: usize> {
    super_cell: SuperCellSize<D>,
    grid_super_cells: DataSpace<D>,
    guarding_super_cells: DataSpace<D>,
}

impl<const D: usize> AreaMapping<D> {
    /// Build the mapping of `layout` over its supercells.
    pub fn new(layout: &GridLayout<D>) -> Self {
        let super_cell = layout.super_cell();
        let sc = super_cell.extent();
        Self {
            super_cell,
            grid_super_cells: layout.data_space() / sc,
            guarding_super_cells: layout.guard() / sc,
        }
    }

    /// Number of blocks covering the local domain without guards.
    pub fn grid_dim(&self) -> DataSpace<D> {
        self.grid_super_cells - self.guarding_super_cells * 2
    }

    /// Supercell index (guards included) of a block.
    #[inline]
    pub fn super_cell_index(&self, block_idx: DataSpace<D>) -> DataSpace<D> {
        block_idx + self.guarding_super_cells
    }

    /// Guard thickness in supercells.
    #[inline]
    pub fn guarding_super_cells(&self) -> DataSpace<D> {
        self.guarding_super_cells
    }

    /// Supercell count including guards.
    pub fn grid_super_cells(&self) -> DataSpace<D> {
        self.grid_super_cells
    }

    /// Supercell extent.
    #[inline]
    pub fn super_cell_size(&self) -> SuperCellSize<D> {
        self.super_cell
    }
}

/// Placement of the local domain inside the global simulation domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubGrid<const D: usize> {
    global_size: DataSpace<D>,
    local_size: DataSpace<D>,
    local_offset: DataSpace<D>,
}

impl<const D: usize> SubGrid<D> {
    /// Single-domain run: local and global domain coincide.
    pub fn single(size: DataSpace<D>) -> Self {
        Self {
            global_size: size,
            local_size: size,
            local_offset: DataSpace::zero(),
        }
    }

    /// Local domain of `local_size` placed at `local_offset` inside `global_size`.
    pub fn new(
        global_size: DataSpace<D>,
        local_size: DataSpace<D>,
        local_offset: DataSpace<D>,
    ) -> Result<Self> {
        let end = local_offset + local_size;
        let inside = local_offset.is_non_negative()
            && (0..D).all(|axis| local_size[axis] > 0 && end[axis] <= global_size[axis]);
        if !inside {
            return Err(Error::Config(format!(
                "local domain {local_size} at {local_offset} exceeds global domain {global_size}"
            )));
        }
        Ok(Self {
            global_size,
            local_size,
            local_offset,
        })
    }

    /// Global domain size in cells.
    pub fn global_size(&self) -> DataSpace<D> {
        self.global_size
    }

    /// Local domain size in cells.
    pub fn local_size(&self) -> DataSpace<D> {
        self.local_size
    }

    /// Offset of the local domain in the global domain.
    pub fn local_offset(&self) -> DataSpace<D> {
        self.local_offset
    }
}
