//! Worker pool for lane and column parallel work
//!
//! Each unit of work gets an index, reads only shared immutable inputs and
//! returns its own result; results come back ordered by index. A batch
//! blocks until every unit has finished.

use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "multi-thread")]
use rayon::prelude::*;

/// Worker pool configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of workers, 0 to use all available hardware parallelism
    #[serde(default)]
    pub workers: usize,
}

/// Bounded set of workers
///
/// Dropping the pool releases its workers; [`Pool::tear_down`] does the same
/// explicitly.
pub struct Pool {
    #[cfg(feature = "multi-thread")]
    inner: rayon::ThreadPool,
    workers: usize,
}

impl Pool {
    /// Create a pool with `workers` threads, 0 meaning one per available core
    pub fn new(workers: usize) -> Result<Self> {
        Self::from_config(&PoolConfig { workers })
    }

    /// Create a pool from configuration
    #[cfg(feature = "multi-thread")]
    pub fn from_config(config: &PoolConfig) -> Result<Self> {
        let inner = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("ot-worker-{}", i))
            .build()
            .map_err(|e| crate::Error::InvalidConfig(e.to_string()))?;
        let workers = inner.current_num_threads();

        debug!(requested = config.workers, workers, "Started worker pool");
        Ok(Self { inner, workers })
    }

    /// Create a pool from configuration
    ///
    /// Without the `multi-thread` feature every batch runs on the calling
    /// thread, whatever the configuration says.
    #[cfg(not(feature = "multi-thread"))]
    pub fn from_config(config: &PoolConfig) -> Result<Self> {
        if config.workers > 1 {
            debug!(
                requested = config.workers,
                "multi-thread feature disabled, running batches inline"
            );
        }
        Ok(Self { workers: 1 })
    }

    /// Number of workers
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `f(i)` for every `i < count` and collect the results by index
    #[cfg(feature = "multi-thread")]
    pub fn parallelize<T, F>(&self, count: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Send + Sync,
    {
        self.inner
            .install(|| (0..count).into_par_iter().map(&f).collect())
    }

    /// Run `f(i)` for every `i < count` and collect the results by index
    #[cfg(not(feature = "multi-thread"))]
    pub fn parallelize<T, F>(&self, count: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Send + Sync,
    {
        (0..count).map(f).collect()
    }

    /// Release the workers
    pub fn tear_down(self) {
        debug!(workers = self.workers, "Tearing down worker pool");
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool").field("workers", &self.workers).finish()
    }
}
