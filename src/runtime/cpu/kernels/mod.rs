//! CPU kernel implementations
//!
//! Low-level compute kernels for the LRN operator. Kernels take raw pointers
//! into tensor storage; callers in `ops::cpu` check shapes and contiguity.

#![allow(unsafe_op_in_unsafe_fn)] // Kernels are already marked unsafe, inner unsafe is redundant

pub mod lrn;
pub mod window_sum;

pub use lrn::{
    PowMode, lrn_backward_kernel, lrn_backward_summand_kernel, lrn_forward_kernel, square_kernel,
};
pub use window_sum::{window_sum_shifted_kernel, window_sum_streaming_kernel};
