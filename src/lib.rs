//! # numr-lrn
//!
//! **Cross-channel Local Response Normalization (LRN) for Rust, on CPU and CUDA.**
//!
//! LRN normalizes each channel's activations by a smoothed sum of squared
//! activations taken over a sliding window of neighboring channels:
//!
//! ```text
//! scale_c = k + alpha * sum_{j = max(0, c - n/2)}^{min(N - 1, c + n/2)} x_j^2
//! y_c     = x_c * scale_c^(-beta)
//! ```
//!
//! It was popularised by AlexNet. Both the forward transform and its exact
//! gradient are provided, so the operator can participate in reverse-mode
//! differentiation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use numr_lrn::prelude::*;
//!
//! let device = CpuDevice::new();
//! let client = CpuRuntime::default_client(&device);
//! let x = Tensor::<CpuRuntime>::from_slice(&data, &[2, 8, 4, 4], &device);
//!
//! let (y, grad_fn) = local_response_normalization(&client, &x, &LrnParams::default())?;
//! let grads = grad_fn.backward(&grad_y)?;
//! ```
//!
//! ## Layout
//!
//! Inputs have at least two axes and axis 1 is the channel axis. Everything
//! after it is flattened into a single spatial extent (`rdim`), so a
//! `(batch, channel, height, width)` tensor is processed as
//! `(batch, channel, height * width)`.
//!
//! ## Feature Flags
//!
//! - `cpu` (default): CPU backend
//! - `rayon` (default): Multi-threaded CPU kernels
//! - `cuda`: NVIDIA CUDA backend

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod autograd;
pub mod error;
pub mod ops;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::autograd::{
        GradFn, LrnBackward, local_response_normalization, local_response_normalization_default,
    };
    pub use crate::error::{Error, Result};
    pub use crate::ops::{ChannelGeometry, LrnContext, LrnOps, LrnParams, WindowSumAlgorithm};
    pub use crate::runtime::{Device, Runtime, RuntimeClient};
    pub use crate::tensor::{Layout, Tensor};

    pub use crate::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime, ParallelismConfig};

    #[cfg(feature = "cuda")]
    pub use crate::runtime::cuda::{CudaClient, CudaDevice, CudaRuntime};
}

/// Default runtime based on enabled features
///
/// - With `cuda` feature: `CudaRuntime`
/// - Otherwise: `CpuRuntime`
#[cfg(feature = "cuda")]
pub type DefaultRuntime = runtime::cuda::CudaRuntime;

/// Default runtime based on enabled features
#[cfg(not(feature = "cuda"))]
pub type DefaultRuntime = runtime::cpu::CpuRuntime;
