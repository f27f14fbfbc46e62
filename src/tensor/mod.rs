//! Tensor types
//!
//! This module provides the `Tensor` type: a dense `f32` n-dimensional array
//! stored on a compute device (CPU or CUDA GPU).

mod core;
mod id;
mod layout;
mod storage;

pub use core::Tensor;
pub use id::TensorId;
pub use layout::{Layout, Shape, Strides};
pub use storage::Storage;
