//! CPU runtime implementation
//!
//! The CPU runtime uses aligned heap allocation and is the reference backend
//! for the LRN operator. Host kernels parallelize over batch planes or
//! channel lanes with rayon when the `rayon` feature is enabled.

mod client;
mod device;
pub(crate) mod kernels;
mod runtime;

pub use crate::tensor::Tensor;
pub use client::{CpuClient, ParallelismConfig};
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
