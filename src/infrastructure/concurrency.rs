//! Thread pool sizing for batch rewrites.

use anyhow::Result;
use tracing::info;

/// Initialize the global rayon thread pool.
///
/// Without an explicit count, uses half of the available cores (minimum 1).
/// Returns the number of workers configured.
pub fn init_thread_pool(workers: Option<usize>) -> Result<usize> {
    let cores = num_cpus::get();
    let workers = worker_count(workers, cores);

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;

    info!(workers, cores, "initialized thread pool");

    Ok(workers)
}

/// An explicit non-zero count wins; otherwise half of `cores`, minimum 1.
pub fn worker_count(requested: Option<usize>, cores: usize) -> usize {
    requested
        .filter(|&n| n > 0)
        .unwrap_or_else(|| std::cmp::max(1, cores / 2))
}
