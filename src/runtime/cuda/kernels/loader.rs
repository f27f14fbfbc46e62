//! CUDA kernel loading and launch configuration
//!
//! - PTX files are compiled by `build.rs` using nvcc
//! - Modules are loaded on first use and cached per-device
//!
//! The module cache uses `OnceLock<Mutex<HashMap>>` for thread-safe
//! initialization and concurrent access from multiple CUDA streams.

pub use cudarc::driver::safe::LaunchConfig;
use cudarc::driver::safe::{CudaContext, CudaFunction, CudaModule};
use cudarc::nvrtc::Ptx;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::{Error, Result};

// ============================================================================
// PTX Sources (compiled by build.rs)
// ============================================================================

/// Directory containing compiled PTX files (set by build.rs)
const KERNEL_DIR: &str = env!("CUDA_KERNEL_DIR");

fn load_ptx(name: &str) -> Ptx {
    Ptx::from_file(format!("{}/{}.ptx", KERNEL_DIR, name))
}

// ============================================================================
// Kernel Module Cache
// ============================================================================

/// Cache for loaded CUDA modules, keyed by (device_index, module_name)
static MODULE_CACHE: OnceLock<Mutex<HashMap<(usize, &'static str), Arc<CudaModule>>>> =
    OnceLock::new();

/// Get or load a CUDA module from PTX.
///
/// Modules are cached per-device to avoid repeated loading.
///
/// # Errors
///
/// Returns an error if the PTX file cannot be loaded or the module cannot be created.
pub fn get_or_load_module(
    context: &Arc<CudaContext>,
    device_index: usize,
    module_name: &'static str,
) -> Result<Arc<CudaModule>> {
    let cache = MODULE_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache.lock().map_err(|e| {
        Error::Internal(format!(
            "Failed to acquire module cache lock (Mutex poisoned): {}",
            e
        ))
    })?;

    let key = (device_index, module_name);
    if let Some(module) = guard.get(&key) {
        return Ok(module.clone());
    }

    log::debug!("loading CUDA module '{}' on device {}", module_name, device_index);
    let module = context.load_module(load_ptx(module_name)).map_err(|e| {
        Error::Internal(format!(
            "Failed to load CUDA module '{}': {:?}. \
             Ensure CUDA kernels were compiled correctly by build.rs.",
            module_name, e
        ))
    })?;

    guard.insert(key, module.clone());

    Ok(module)
}

/// Get a kernel function from a loaded module.
///
/// # Errors
///
/// Returns an error if the kernel function is not found in the module.
pub fn get_kernel_function(module: &Arc<CudaModule>, kernel_name: &str) -> Result<CudaFunction> {
    module.load_function(kernel_name).map_err(|e| {
        Error::Internal(format!(
            "Failed to get kernel '{}': {:?}. \
             Check that the kernel name matches the CUDA source.",
            kernel_name, e
        ))
    })
}

// ============================================================================
// Launch Configuration
// ============================================================================

/// Threads per block for one-thread-per-item kernels
pub const BLOCK_SIZE: u32 = 256;

/// 1D launch configuration covering `items` threads.
///
/// `items` must already fit in `u32`; see [`checked_u32`].
#[inline]
pub fn elementwise_launch_config(items: u32) -> LaunchConfig {
    LaunchConfig {
        grid_dim: (items.div_ceil(BLOCK_SIZE), 1, 1),
        block_dim: (BLOCK_SIZE, 1, 1),
        shared_mem_bytes: 0,
    }
}

/// Convert a size to the `unsigned int` the kernels take.
#[inline]
pub fn checked_u32(arg: &'static str, value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        Error::invalid_argument(arg, format!("{value} exceeds the CUDA kernel index range"))
    })
}

/// Module names, one per `.cu` file.
pub mod kernel_names {
    /// Local response normalization (window sum, forward, backward)
    pub const LRN_MODULE: &str = "lrn";
}
