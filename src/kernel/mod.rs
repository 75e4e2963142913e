//! Two-level parallel-for over (block, worker) index spaces.
//!
//! A launch runs a [`BlockKernel`] once for every worker of every block of a
//! block grid. Blocks are independent. Workers of one block split the
//! block's work with [`ForEachIdx`], so each element is handled by exactly
//! one worker and no synchronisation is needed.
//!
//! Backends implement the same indexing contract:
//! - [`BasicBackend`]: serial reference implementation
//! - [`ParallelBackend`]: Rayon thread pool over (block, worker) pairs
//!
//! The WebGPU backend lives in [`crate::gpu`] since it runs generated WGSL
//! rather than Rust closures.

mod backend;
mod workers;

pub use backend::{Backend, BackendType, BasicBackend, KernelBackend, ParallelBackend};
pub use workers::{ForEachIdx, WorkerCfg, MAX_WORKERS};

use crate::grid::DataSpace;

/// Per-block work item of a launch.
pub trait BlockKernel<const D: usize>: Sync {
    /// Execute the share of `worker` within block `block_idx`.
    fn run(&self, block_idx: DataSpace<D>, worker: WorkerCfg);
}
