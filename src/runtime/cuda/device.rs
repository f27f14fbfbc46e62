//! CUDA device handle and setup errors

use crate::runtime::Device;

/// One GPU, by ordinal
///
/// Cheap to clone; holds no driver state. The context and stream live on the
/// [`super::CudaClient`] cached for that index.
#[derive(Clone, Debug)]
pub struct CudaDevice {
    /// Index of the GPU device (0, 1, 2, ...)
    pub(crate) index: usize,
}

impl CudaDevice {
    /// Create a new CUDA device
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    /// Get the compute capability of this CUDA device
    ///
    /// Returns (major, minor) version numbers (e.g., (8, 6) for sm_86).
    /// The PTX shipped with this crate targets sm_75 and newer.
    pub fn compute_capability(&self) -> Result<(u32, u32), CudaError> {
        let device = cudarc::driver::result::device::get(self.index as i32).map_err(|e| {
            CudaError::DeviceError(format!("Failed to get CUDA device {}: {:?}", self.index, e))
        })?;

        let attribute = |attr| {
            unsafe { cudarc::driver::result::device::get_attribute(device, attr) }
                .map(|v| v as u32)
                .map_err(|e| {
                    CudaError::DeviceError(format!(
                        "Failed to query {:?} for device {}: {:?}",
                        attr, self.index, e
                    ))
                })
        };

        let major = attribute(
            cudarc::driver::sys::CUdevice_attribute::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MAJOR,
        )?;
        let minor = attribute(
            cudarc::driver::sys::CUdevice_attribute::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MINOR,
        )?;

        Ok((major, minor))
    }
}

impl Device for CudaDevice {
    fn id(&self) -> usize {
        self.index
    }

    fn name(&self) -> String {
        format!("cuda:{}", self.index)
    }
}

impl Default for CudaDevice {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Failures while querying a device or setting up its client
#[derive(Debug, Clone, thiserror::Error)]
pub enum CudaError {
    /// Device lookup or attribute query failed
    #[error("CUDA device error: {0}")]
    DeviceError(String),
    /// Context or stream creation failed
    #[error("CUDA context error: {0}")]
    ContextError(String),
}

impl From<CudaError> for crate::error::Error {
    fn from(err: CudaError) -> Self {
        crate::error::Error::Backend(err.to_string())
    }
}
