//! CUDA Client implementation
//!
//! `CudaClient` is `Clone` and can be shared across threads. The underlying
//! CUDA context and stream are reference-counted via `Arc`.

use cudarc::driver::safe::{CudaContext, CudaStream};
use std::sync::Arc;

use super::CudaRuntime;
use super::device::{CudaDevice, CudaError};
use crate::runtime::RuntimeClient;

/// CUDA Runtime Client
///
/// Owns the CUDA context and the stream every LRN kernel launches on.
/// Launches on one client are ordered; results are visible to the host after
/// a copy back (which synchronizes) or [`RuntimeClient::synchronize`].
#[derive(Clone)]
pub struct CudaClient {
    /// GPU device index
    pub(crate) device: CudaDevice,

    /// CUDA context for this device
    pub(crate) context: Arc<CudaContext>,

    /// Stream on which all kernels launch
    pub(crate) stream: Arc<CudaStream>,
}

impl std::fmt::Debug for CudaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CudaClient")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl CudaClient {
    /// Create a new CUDA client for a device.
    ///
    /// # Errors
    ///
    /// Returns an error if context creation, binding or stream creation fails
    /// (e.g. an invalid device index).
    pub fn new(device: CudaDevice) -> Result<Self, CudaError> {
        let context = CudaContext::new(device.index).map_err(|e| {
            CudaError::ContextError(format!(
                "Failed to create CUDA context for device {}: {:?}",
                device.index, e
            ))
        })?;

        context.bind_to_thread().map_err(|e| {
            CudaError::ContextError(format!("Failed to bind CUDA context to thread: {:?}", e))
        })?;

        let stream = context.new_stream().map_err(|e| {
            CudaError::ContextError(format!("Failed to create CUDA stream: {:?}", e))
        })?;

        log::debug!("created CUDA client for device {}", device.index);

        Ok(Self {
            device,
            context,
            stream,
        })
    }

    /// Get reference to the CUDA stream.
    #[inline]
    pub fn stream(&self) -> &CudaStream {
        &self.stream
    }

    /// Get reference to the CUDA context.
    #[inline]
    pub fn context(&self) -> &Arc<CudaContext> {
        &self.context
    }
}

impl RuntimeClient<CudaRuntime> for CudaClient {
    fn device(&self) -> &CudaDevice {
        &self.device
    }

    fn synchronize(&self) {
        if let Err(e) = self.stream.synchronize() {
            log::warn!("CUDA stream synchronization failed: {:?}", e);
        }
    }
}
