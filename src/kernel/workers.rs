//! Worker configuration and collective index iteration.

/// Upper bound on workers per block, matching the smallest common
/// workgroup limit of compute APIs.
pub const MAX_WORKERS: u32 = 256;

/// Identity of one worker inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerCfg {
    /// Index of this worker in `0..num_workers`.
    pub worker_idx: u32,
    /// Workers per block.
    pub num_workers: u32,
}

impl WorkerCfg {
    /// Create a worker configuration.
    pub fn new(worker_idx: u32, num_workers: u32) -> Self {
        debug_assert!(worker_idx < num_workers);
        Self {
            worker_idx,
            num_workers,
        }
    }
}

/// Round-robin distribution of `domain_size` linear indices over the
/// workers of a block.
///
/// In iteration `i` worker `w` handles index `i * num_workers + w`. Indices
/// beyond the domain are skipped, so the union over all workers covers the
/// domain exactly once.
#[derive(Debug, Clone, Copy)]
pub struct ForEachIdx {
    domain_size: u32,
    worker: WorkerCfg,
}

impl ForEachIdx {
    /// Distribution of `domain_size` indices for `worker`.
    pub fn new(domain_size: u32, worker: WorkerCfg) -> Self {
        Self {
            domain_size,
            worker,
        }
    }

    /// Iterations every worker runs, including the partially filled last one.
    pub fn num_collective_iterations(&self) -> u32 {
        self.domain_size.div_ceil(self.worker.num_workers.max(1))
    }

    /// Call `f(linear_idx, iteration)` for every index owned by this worker.
    #[inline]
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(u32, u32),
    {
        let workers = self.worker.num_workers.max(1);
        for i in 0..self.num_collective_iterations() {
            let linear_idx = i * workers + self.worker.worker_idx;
            if linear_idx < self.domain_size {
                f(linear_idx, i);
            }
        }
    }
}
