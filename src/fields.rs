//! Electric field storage over the local domain.
//!
//! `FieldE` owns one `Float3` per cell of the local domain including guard
//! cells. Kernels running on several threads write through a [`FieldWriter`],
//! which shares the storage as a raw pointer. Soundness rests on the kernels
//! writing disjoint cell sets.

use std::marker::PhantomData;

use crate::grid::{DataSpace, GridLayout};
use crate::Float3;

/// E-field vectors over a [`GridLayout`], guards included.
///
/// Shared writes are reserved to the injection kernel; outside the crate the
/// field is only reachable through `&mut` access:
///
/// ```compile_fail
/// use pic_laser::fields::FieldE;
/// use pic_laser::grid::{DataSpace, GridLayout, SuperCellSize};
///
/// let sc = SuperCellSize::new([4, 4]).unwrap();
/// let layout = GridLayout::new(DataSpace::new([8, 8]), DataSpace::new([0, 0]), sc).unwrap();
/// let mut field = FieldE::new(layout);
/// let _shared = field.writer();
/// ```
#[derive(Debug, Clone)]
pub struct FieldE<const D: usize> {
    layout: GridLayout<D>,
    data: Vec<Float3>,
}

impl<const D: usize> FieldE<D> {
    /// Zero-initialised field for `layout`.
    pub fn new(layout: GridLayout<D>) -> Self {
        let total = layout.data_space().product() as usize;
        Self {
            layout,
            data: vec![[0.0; 3]; total],
        }
    }

    /// Layout of the field.
    pub fn layout(&self) -> &GridLayout<D> {
        &self.layout
    }

    /// Number of stored cells (guards included).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the field stores no cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Linear index of a cell given relative to the local-domain origin.
    ///
    /// Guard cells have negative (lower guard) or `>= size` (upper guard)
    /// coordinates. Returns `None` outside the stored region.
    #[inline]
    pub fn index_of(&self, cell: DataSpace<D>) -> Option<usize> {
        linear_index(&self.layout, cell)
    }

    /// Value of a cell relative to the local-domain origin.
    pub fn get(&self, cell: DataSpace<D>) -> Option<Float3> {
        self.index_of(cell).map(|idx| self.data[idx])
    }

    /// Overwrite a cell relative to the local-domain origin.
    ///
    /// Returns false if the cell lies outside the stored region.
    pub fn set(&mut self, cell: DataSpace<D>, value: Float3) -> bool {
        match self.index_of(cell) {
            Some(idx) => {
                self.data[idx] = value;
                true
            }
            None => false,
        }
    }

    /// Raw storage in linear order (x fastest, guards included).
    pub fn as_slice(&self) -> &[Float3] {
        &self.data
    }

    /// Mutable raw storage in linear order.
    pub fn as_mut_slice(&mut self) -> &mut [Float3] {
        &mut self.data
    }

    /// Sum of |E|^2 over all stored cells.
    pub fn energy(&self) -> f64 {
        self.data
            .iter()
            .map(|e| e.iter().map(|&c| (c as f64) * (c as f64)).sum::<f64>())
            .sum()
    }

    /// Set every cell to zero.
    pub fn clear(&mut self) {
        self.data.fill([0.0; 3]);
    }

    /// Shared writer for kernels with disjoint write sets.
    pub(crate) fn writer(&mut self) -> FieldWriter<'_, D> {
        FieldWriter {
            ptr: SendPtrMut(self.data.as_mut_ptr()),
            len: self.data.len(),
            layout: self.layout,
            _marker: PhantomData,
        }
    }
}

#[inline]
fn linear_index<const D: usize>(layout: &GridLayout<D>, cell: DataSpace<D>) -> Option<usize> {
    let with_guard = cell + layout.guard();
    let extent = layout.data_space();
    if with_guard.is_non_negative() && with_guard.is_less_than(&extent) {
        Some(with_guard.to_linear(&extent))
    } else {
        None
    }
}

/// Raw pointer that may cross thread boundaries.
///
/// # Safety
/// Concurrent users must write to non-overlapping elements.
#[derive(Copy, Clone)]
struct SendPtrMut<T>(*mut T);

unsafe impl<T> Send for SendPtrMut<T> {}
unsafe impl<T> Sync for SendPtrMut<T> {}

/// Write handle on a [`FieldE`] shared by all workers of a kernel launch.
///
/// The handle mutably borrows the field for its lifetime, so no other
/// access can happen while a kernel runs.
#[derive(Copy, Clone)]
pub(crate) struct FieldWriter<'a, const D: usize> {
    ptr: SendPtrMut<Float3>,
    len: usize,
    layout: GridLayout<D>,
    _marker: PhantomData<&'a mut [Float3]>,
}

impl<const D: usize> FieldWriter<'_, D> {
    /// Overwrite a cell relative to the local-domain origin.
    ///
    /// Out-of-range cells are ignored and reported with `false`.
    ///
    /// # Safety
    /// No other thread may write or read the same cell through a copy of
    /// this writer while the writer is alive.
    #[inline]
    pub(crate) unsafe fn set(&self, cell: DataSpace<D>, value: Float3) -> bool {
        match linear_index(&self.layout, cell) {
            Some(idx) => {
                debug_assert!(idx < self.len);
                // SAFETY: idx is in bounds; exclusivity of the cell is the
                // caller's contract.
                unsafe {
                    *self.ptr.0.add(idx) = value;
                }
                true
            }
            None => false,
        }
    }
}
