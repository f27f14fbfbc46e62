//! CPU client and parallelism configuration

use super::device::CpuDevice;
use super::runtime::CpuRuntime;
use crate::error::Result;
use crate::ops::WindowSumAlgorithm;
use crate::runtime::RuntimeClient;
#[cfg(feature = "rayon")]
use std::sync::Arc;

/// Default minimum number of work items handed to one rayon task
const DEFAULT_MIN_LEN: usize = 64;

/// Thread-level parallelism settings for host kernels
///
/// `num_threads: None` runs on rayon's global pool; `Some(n)` builds a
/// dedicated pool of `n` threads owned by the client. `min_len` bounds how
/// finely lanes (or batch planes) are split across tasks.
///
/// Without the `rayon` feature these settings are accepted and ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParallelismConfig {
    /// Number of worker threads, or `None` for the global pool
    pub num_threads: Option<usize>,
    /// Minimum items per rayon task
    pub min_len: usize,
}

impl Default for ParallelismConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            min_len: DEFAULT_MIN_LEN,
        }
    }
}

impl ParallelismConfig {
    /// Single-threaded execution
    pub fn sequential() -> Self {
        Self {
            num_threads: Some(1),
            min_len: usize::MAX,
        }
    }
}

/// CPU client for operation dispatch
#[derive(Clone)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
    parallelism: ParallelismConfig,
    window_sum: WindowSumAlgorithm,
    #[cfg(feature = "rayon")]
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl CpuClient {
    /// Create a new CPU client
    ///
    /// Uses the global rayon pool and the shifted-slice window sum.
    pub fn new(device: CpuDevice) -> Self {
        Self {
            device,
            parallelism: ParallelismConfig::default(),
            window_sum: WindowSumAlgorithm::Shifted,
            #[cfg(feature = "rayon")]
            pool: None,
        }
    }

    /// Replace the parallelism settings
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if a dedicated thread pool cannot be built.
    pub fn with_parallelism(mut self, config: ParallelismConfig) -> Result<Self> {
        #[cfg(feature = "rayon")]
        {
            self.pool = match config.num_threads {
                Some(threads) => {
                    let pool = rayon::ThreadPoolBuilder::new()
                        .num_threads(threads.max(1))
                        .build()
                        .map_err(|e| {
                            crate::error::Error::Backend(format!(
                                "failed to build rayon pool with {threads} threads: {e}"
                            ))
                        })?;
                    Some(Arc::new(pool))
                }
                None => None,
            };
        }
        self.parallelism = config;
        Ok(self)
    }

    /// Select the window-sum algorithm used by the LRN operator
    pub fn with_window_sum(mut self, algorithm: WindowSumAlgorithm) -> Self {
        self.window_sum = algorithm;
        self
    }

    /// The configured window-sum algorithm
    #[inline]
    pub fn window_sum_algorithm(&self) -> WindowSumAlgorithm {
        self.window_sum
    }

    /// The configured parallelism settings
    #[inline]
    pub fn parallelism(&self) -> ParallelismConfig {
        self.parallelism
    }

    /// Minimum items per rayon task (never zero)
    #[inline]
    #[cfg_attr(not(feature = "rayon"), allow(dead_code))]
    pub(crate) fn rayon_min_len(&self) -> usize {
        self.parallelism.min_len.max(1)
    }

    /// Run `f` inside the client's dedicated pool, if it has one
    #[cfg(feature = "rayon")]
    pub(crate) fn install_parallelism<T, F>(&self, f: F) -> T
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

impl std::fmt::Debug for CpuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuClient")
            .field("device", &self.device)
            .field("parallelism", &self.parallelism)
            .field("window_sum", &self.window_sum)
            .finish()
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }

    fn synchronize(&self) {
        // CPU operations are synchronous, nothing to do
    }
}
