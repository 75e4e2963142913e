//! CPU launch backends.

use log::trace;
use rayon::prelude::*;

use super::{BlockKernel, WorkerCfg, MAX_WORKERS};
use crate::grid::DataSpace;
use crate::{Error, Result};

/// Backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendType {
    /// Single-threaded reference implementation
    Basic,
    /// Multi-threaded implementation using Rayon
    #[default]
    Parallel,
}

/// Launch interface shared by all CPU backends.
pub trait KernelBackend {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Largest worker count per block this backend runs.
    fn max_workers(&self) -> u32;

    /// Worker count for a block with `volume` work items.
    fn num_workers(&self, volume: u32) -> u32 {
        volume.clamp(1, self.max_workers().max(1))
    }

    /// Run `kernel` for every worker of every block in `grid_blocks`.
    ///
    /// Returns once all blocks have completed.
    fn launch<const D: usize, K>(
        &self,
        grid_blocks: DataSpace<D>,
        num_workers: u32,
        kernel: &K,
    ) -> Result<()>
    where
        K: BlockKernel<D>;
}

fn check_launch<const D: usize>(grid_blocks: &DataSpace<D>, num_workers: u32) -> Result<u32> {
    if num_workers == 0 || num_workers > MAX_WORKERS {
        return Err(Error::Config(format!(
            "worker count {num_workers} outside 1..={MAX_WORKERS}"
        )));
    }
    if !grid_blocks.is_non_negative() {
        return Err(Error::Config(format!(
            "block grid {grid_blocks} has negative extent"
        )));
    }
    Ok(grid_blocks.product() as u32)
}

/// Serial backend.
///
/// Visits blocks in linear order and runs the workers of each block one
/// after another.
#[derive(Debug, Clone, Copy)]
pub struct BasicBackend {
    workers: u32,
}

impl BasicBackend {
    /// Serial backend with one worker per block.
    pub fn new() -> Self {
        Self { workers: 1 }
    }

    /// Emulate `workers` workers per block.
    pub fn with_workers(workers: u32) -> Self {
        Self {
            workers: workers.clamp(1, MAX_WORKERS),
        }
    }
}

impl Default for BasicBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelBackend for BasicBackend {
    fn name(&self) -> &str {
        "basic"
    }

    fn max_workers(&self) -> u32 {
        self.workers
    }

    fn launch<const D: usize, K>(
        &self,
        grid_blocks: DataSpace<D>,
        num_workers: u32,
        kernel: &K,
    ) -> Result<()>
    where
        K: BlockKernel<D>,
    {
        let num_blocks = check_launch(&grid_blocks, num_workers)?;
        trace!("basic launch: {grid_blocks} blocks x {num_workers} workers");

        for linear_block in 0..num_blocks {
            let block_idx = DataSpace::map_linear(&grid_blocks, linear_block);
            for worker_idx in 0..num_workers {
                kernel.run(block_idx, WorkerCfg::new(worker_idx, num_workers));
            }
        }
        Ok(())
    }
}

/// Rayon backend.
///
/// Every (block, worker) pair is an independent task on the global Rayon
/// pool.
#[derive(Debug, Clone, Copy)]
pub struct ParallelBackend {
    workers: u32,
    /// Threads in the Rayon pool
    num_threads: usize,
}

impl ParallelBackend {
    /// Parallel backend with one worker per block; blocks run concurrently.
    pub fn new() -> Self {
        Self {
            workers: 1,
            num_threads: rayon::current_num_threads(),
        }
    }

    /// Run `workers` workers per block as separate tasks.
    pub fn with_workers(workers: u32) -> Self {
        Self {
            workers: workers.clamp(1, MAX_WORKERS),
            ..Self::new()
        }
    }

    /// Threads available to the backend.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }
}

impl Default for ParallelBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelBackend for ParallelBackend {
    fn name(&self) -> &str {
        "parallel"
    }

    fn max_workers(&self) -> u32 {
        self.workers
    }

    fn launch<const D: usize, K>(
        &self,
        grid_blocks: DataSpace<D>,
        num_workers: u32,
        kernel: &K,
    ) -> Result<()>
    where
        K: BlockKernel<D>,
    {
        let num_blocks = check_launch(&grid_blocks, num_workers)?;
        trace!(
            "parallel launch: {grid_blocks} blocks x {num_workers} workers on {} threads",
            self.num_threads
        );

        let tasks = num_blocks as u64 * num_workers as u64;
        (0..tasks).into_par_iter().for_each(|task| {
            let linear_block = (task / num_workers as u64) as u32;
            let worker_idx = (task % num_workers as u64) as u32;
            let block_idx = DataSpace::map_linear(&grid_blocks, linear_block);
            kernel.run(block_idx, WorkerCfg::new(worker_idx, num_workers));
        });
        Ok(())
    }
}

/// CPU backend with enum-based dispatch.
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    /// Single-threaded reference implementation
    Basic(BasicBackend),
    /// Multi-threaded implementation
    Parallel(ParallelBackend),
}

/// Expands to a match that forwards the call to the selected backend.
macro_rules! dispatch_backend {
    ($self:expr, $method:ident($($args:expr),*)) => {
        match $self {
            Backend::Basic(b) => b.$method($($args),*),
            Backend::Parallel(b) => b.$method($($args),*),
        }
    };
}

impl Backend {
    /// Default backend of the given type.
    pub fn new(backend_type: BackendType) -> Self {
        match backend_type {
            BackendType::Basic => Backend::Basic(BasicBackend::new()),
            BackendType::Parallel => Backend::Parallel(ParallelBackend::new()),
        }
    }

    /// Backend type of this instance.
    pub fn backend_type(&self) -> BackendType {
        match self {
            Backend::Basic(_) => BackendType::Basic,
            Backend::Parallel(_) => BackendType::Parallel,
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::new(BackendType::default())
    }
}

impl KernelBackend for Backend {
    fn name(&self) -> &str {
        dispatch_backend!(self, name())
    }

    fn max_workers(&self) -> u32 {
        dispatch_backend!(self, max_workers())
    }

    fn launch<const D: usize, K>(
        &self,
        grid_blocks: DataSpace<D>,
        num_workers: u32,
        kernel: &K,
    ) -> Result<()>
    where
        K: BlockKernel<D>,
    {
        dispatch_backend!(self, launch(grid_blocks, num_workers, kernel))
    }
}

impl From<BasicBackend> for Backend {
    fn from(b: BasicBackend) -> Self {
        Backend::Basic(b)
    }
}

impl From<ParallelBackend> for Backend {
    fn from(b: ParallelBackend) -> Self {
        Backend::Parallel(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::ForEachIdx;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingKernel {
        grid: DataSpace<3>,
        per_item: u32,
        hits: Vec<AtomicU32>,
    }

    impl BlockKernel<3> for CountingKernel {
        fn run(&self, block_idx: DataSpace<3>, worker: WorkerCfg) {
            let block = block_idx.to_linear(&self.grid) as u32;
            ForEachIdx::new(self.per_item, worker).for_each(|idx, _| {
                self.hits[(block * self.per_item + idx) as usize].fetch_add(1, Ordering::Relaxed);
            });
        }
    }

    fn counting(grid: DataSpace<3>, per_item: u32) -> CountingKernel {
        let n = grid.product() as usize * per_item as usize;
        CountingKernel {
            grid,
            per_item,
            hits: (0..n).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    fn assert_all_once(kernel: &CountingKernel) {
        assert!(kernel.hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn test_basic_backend_covers_grid() {
        let kernel = counting(DataSpace::new([3, 1, 2]), 10);
        let backend = BasicBackend::with_workers(4);
        backend.launch(kernel.grid, backend.num_workers(10), &kernel).unwrap();
        assert_all_once(&kernel);
    }

    #[test]
    fn test_parallel_backend_covers_grid() {
        let kernel = counting(DataSpace::new([4, 1, 4]), 32);
        let backend = ParallelBackend::with_workers(8);
        backend.launch(kernel.grid, 8, &kernel).unwrap();
        assert_all_once(&kernel);
    }

    #[test]
    fn test_num_workers_clamped() {
        let backend = ParallelBackend::with_workers(64);
        assert_eq!(backend.num_workers(32), 32);
        assert_eq!(backend.num_workers(1000), 64);
        assert_eq!(BasicBackend::new().num_workers(32), 1);
        assert_eq!(BasicBackend::with_workers(10_000).max_workers(), MAX_WORKERS);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let kernel = counting(DataSpace::new([1, 1, 1]), 1);
        assert!(matches!(
            BasicBackend::new().launch(kernel.grid, 0, &kernel),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_enum_dispatch() {
        let backend = Backend::new(BackendType::Basic);
        assert_eq!(backend.name(), "basic");
        assert_eq!(backend.backend_type(), BackendType::Basic);
        assert_eq!(Backend::default().backend_type(), BackendType::Parallel);

        let kernel = counting(DataSpace::new([2, 2, 2]), 3);
        Backend::from(ParallelBackend::with_workers(2))
            .launch(kernel.grid, 2, &kernel)
            .unwrap();
        assert_all_once(&kernel);
    }
}
