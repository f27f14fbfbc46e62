//! CUDA kernels for local response normalization
//!
//! Kernels are written in CUDA C++ (`lrn.cu`) and compiled to PTX by build.rs.
//! The PTX is loaded at runtime and cached per-device.
//!
//! - `loader` - Module loading, caching and launch configuration
//! - `lrn` - Window sum, forward and backward launchers

mod loader;
mod lrn;

pub use lrn::{
    launch_lrn_backward, launch_lrn_backward_summand, launch_lrn_forward, launch_lrn_square,
    launch_lrn_window_sum,
};
