//! CUDA runtime implementation

use super::cache::{
    get_or_create_client, is_cuda_context_valid, log_cuda_memory_error, try_get_cached_stream,
};
use super::client::CudaClient;
use super::device::CudaDevice;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use cudarc::driver::sys::CUresult;

/// CUDA Runtime adapter
///
/// Implements the generic Runtime trait for the CUDA backend.
/// Uses cudarc for direct GPU control.
#[derive(Clone, Debug, Default)]
pub struct CudaRuntime;

fn check(result: CUresult, what: impl FnOnce() -> String) -> Result<()> {
    if result == CUresult::CUDA_SUCCESS {
        Ok(())
    } else {
        Err(Error::Backend(format!("{} ({:?})", what(), result)))
    }
}

impl Runtime for CudaRuntime {
    type Device = CudaDevice;
    type Client = CudaClient;

    fn name() -> &'static str {
        "cuda"
    }

    /// Allocate GPU memory (stream-ordered).
    fn allocate(size_bytes: usize, device: &Self::Device) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }

        let client = get_or_create_client(device)?;

        let mut ptr: u64 = 0;
        let result = unsafe {
            cudarc::driver::sys::cuMemAllocAsync(&mut ptr, size_bytes, client.stream.cu_stream())
        };

        match result {
            CUresult::CUDA_SUCCESS => Ok(ptr),
            CUresult::CUDA_ERROR_OUT_OF_MEMORY => Err(Error::OutOfMemory { size: size_bytes }),
            other => Err(Error::Backend(format!(
                "allocation of {} bytes on device {} failed ({:?})",
                size_bytes, device.index, other
            ))),
        }
    }

    fn deallocate(ptr: u64, _size_bytes: usize, device: &Self::Device) {
        if ptr == 0 {
            return;
        }

        unsafe {
            // Context already torn down: the driver reclaims the memory
            if !is_cuda_context_valid() {
                return;
            }

            let result = if let Some(stream) = try_get_cached_stream(device.index) {
                cudarc::driver::sys::cuMemFreeAsync(ptr, stream)
            } else {
                cudarc::driver::sys::cuMemFree_v2(ptr)
            };

            if result != CUresult::CUDA_SUCCESS && result != CUresult::CUDA_ERROR_ILLEGAL_ADDRESS {
                log_cuda_memory_error("cuMemFree", ptr, result);
            }
        }
    }

    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> Result<()> {
        if src.is_empty() || dst == 0 {
            return Ok(());
        }

        let client = get_or_create_client(device)?;

        let result = unsafe {
            cudarc::driver::sys::cuMemcpyHtoDAsync_v2(
                dst,
                src.as_ptr() as *const std::ffi::c_void,
                src.len(),
                client.stream.cu_stream(),
            )
        };
        check(result, || {
            format!("host-to-device copy of {} bytes failed", src.len())
        })?;

        // The host slice may be freed as soon as we return
        client.stream.synchronize()?;
        Ok(())
    }

    fn copy_from_device(src: u64, dst: &mut [u8], device: &Self::Device) -> Result<()> {
        if dst.is_empty() || src == 0 {
            return Ok(());
        }

        let client = get_or_create_client(device)?;

        let len = dst.len();
        let result = unsafe {
            cudarc::driver::sys::cuMemcpyDtoHAsync_v2(
                dst.as_mut_ptr() as *mut std::ffi::c_void,
                src,
                len,
                client.stream.cu_stream(),
            )
        };
        check(result, || format!("device-to-host copy of {} bytes failed", len))?;

        client.stream.synchronize()?;
        Ok(())
    }

    fn copy_within_device(
        src: u64,
        dst: u64,
        size_bytes: usize,
        device: &Self::Device,
    ) -> Result<()> {
        if size_bytes == 0 || src == 0 || dst == 0 {
            return Ok(());
        }

        let client = get_or_create_client(device)?;

        let result = unsafe {
            cudarc::driver::sys::cuMemcpyDtoDAsync_v2(
                dst,
                src,
                size_bytes,
                client.stream.cu_stream(),
            )
        };
        check(result, || {
            format!("device-to-device copy of {} bytes failed", size_bytes)
        })
    }

    fn default_device() -> Self::Device {
        CudaDevice::new(0)
    }

    /// # Panics
    ///
    /// Panics if no CUDA context can be created for `device`. Use
    /// [`is_cuda_available`] to check first.
    fn default_client(device: &Self::Device) -> Self::Client {
        get_or_create_client(device)
            .unwrap_or_else(|e| panic!("failed to create CUDA client for {:?}: {}", device, e))
    }
}

/// Check whether a CUDA device 0 can be initialized.
///
/// Driver loading failures surface as panics inside cudarc, so the check
/// catches them.
pub fn is_cuda_available() -> bool {
    std::panic::catch_unwind(|| get_or_create_client(&CudaDevice::new(0)).is_ok())
        .unwrap_or(false)
}
