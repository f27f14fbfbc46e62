//! Differentiable operations
//!
//! A forward call that needs a backward returns, next to its output, a
//! [`GradFn`] holding what the backward needs. Nothing is cached on the
//! client or on a long-lived operator object, so the same client can run any
//! number of interleaved forward/backward pairs.

mod grad_fn;

pub mod ops;

pub use grad_fn::GradFn;
pub use ops::{LrnBackward, local_response_normalization, local_response_normalization_default};
