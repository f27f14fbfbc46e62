//! Backend abstraction: devices, clients and runtimes

use crate::error::Result;
use std::fmt::Debug;

/// A compute unit a tensor can live on: the host, or one CUDA device
pub trait Device: Clone + Send + Sync + Debug + 'static {
    /// Ordinal of the device within its runtime (always 0 for the host)
    fn id(&self) -> usize;

    /// Whether two handles refer to the same compute unit
    fn is_same(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Name used in log records, e.g. `cpu` or `cuda:1`
    fn name(&self) -> String {
        format!("device:{}", self.id())
    }
}

/// Handle through which LRN ops are dispatched on one device
///
/// The CPU client carries thread-pool and window-sum settings, the CUDA
/// client its context and stream. Clients are cheap to clone; backward
/// structs keep a clone of the client that ran the forward pass.
pub trait RuntimeClient<R: Runtime>: Clone + Send + Sync {
    /// Device this client allocates on
    fn device(&self) -> &R::Device;

    /// Block until all work queued by this client has finished
    fn synchronize(&self);
}

/// A compute backend
///
/// All dispatch is static: ops are generic over `R: Runtime`, and each
/// runtime's client implements the op traits. Memory is handled as raw
/// `u64` addresses (a host pointer on the CPU, a `CUdeviceptr` on CUDA)
/// owned by [`crate::tensor::Storage`].
///
/// ```ignore
/// let device = CpuRuntime::default_device();
/// let ptr = CpuRuntime::allocate(4 * 16, &device)?;
/// CpuRuntime::copy_to_device(bytemuck::cast_slice(&[0.5f32; 16]), ptr, &device)?;
/// CpuRuntime::deallocate(ptr, 4 * 16, &device);
/// ```
pub trait Runtime: Clone + Send + Sync + 'static {
    /// Device handle type
    type Device: Device;

    /// Client type used for op dispatch
    type Client: RuntimeClient<Self>;

    /// Short backend name (`"cpu"`, `"cuda"`)
    fn name() -> &'static str;

    /// Allocate `size_bytes` bytes
    ///
    /// A zero-byte request returns the null address `0`.
    ///
    /// # Errors
    ///
    /// `OutOfMemory` when the allocator refuses the request; `Backend` for
    /// any other driver failure.
    fn allocate(size_bytes: usize, device: &Self::Device) -> Result<u64>;

    /// Free memory returned by [`Runtime::allocate`]; failures are logged, not returned
    fn deallocate(ptr: u64, size_bytes: usize, device: &Self::Device);

    /// Host to device copy of `src.len()` bytes
    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> Result<()>;

    /// Device to host copy of `dst.len()` bytes
    fn copy_from_device(src: u64, dst: &mut [u8], device: &Self::Device) -> Result<()>;

    /// Device to device copy
    fn copy_within_device(
        src: u64,
        dst: u64,
        size_bytes: usize,
        device: &Self::Device,
    ) -> Result<()>;

    /// Device used when the caller does not pick one (host, or CUDA ordinal 0)
    fn default_device() -> Self::Device;

    /// Client for `device` with default settings
    fn default_client(device: &Self::Device) -> Self::Client;
}
