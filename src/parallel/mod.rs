//! Execution strategy for per-file work
//!
//! Content search can fan files out over a rayon pool. Both strategies return
//! results in input order, so output does not depend on thread scheduling.

use anyhow::{Context, Result};
use rayon::prelude::*;

/// Execution strategy enum for choosing between parallel and sequential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Sequential,
    Parallel { workers: usize },
}

impl ExecutionStrategy {
    /// Apply `processor` to every item, preserving input order
    pub fn execute<T, R, F>(&self, work_items: &[T], processor: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Send + Sync,
    {
        match self {
            ExecutionStrategy::Sequential => Ok(work_items.iter().map(processor).collect()),
            ExecutionStrategy::Parallel { workers } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(*workers)
                    .build()
                    .context("Failed to build worker pool")?;
                Ok(pool.install(|| work_items.par_iter().map(processor).collect()))
            }
        }
    }

    /// Parallel once the workload reaches `min_items_for_parallel`, sequential below it
    pub fn auto(
        work_items_count: usize,
        min_items_for_parallel: usize,
        optimal_workers: usize,
    ) -> Self {
        if work_items_count >= min_items_for_parallel && optimal_workers > 1 {
            ExecutionStrategy::Parallel {
                workers: optimal_workers,
            }
        } else {
            ExecutionStrategy::Sequential
        }
    }

    /// Workers allowed by the CPU count, a percentage of it, and an optional hard cap
    ///
    /// `max_threads_config` of 0 means no cap. Always at least one.
    pub fn calculate_optimal_workers(max_threads_config: usize, thread_percentage: u8) -> usize {
        let available_cores = num_cpus::get();
        let workers_by_percentage =
            std::cmp::max(1, (available_cores * thread_percentage as usize) / 100);

        if max_threads_config > 0 {
            std::cmp::min(max_threads_config, workers_by_percentage)
        } else {
            workers_by_percentage
        }
    }
}
