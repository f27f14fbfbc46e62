//! Backward implementations for operations
//!
//! Each operation has a corresponding backward struct that implements
//! `GradFn` to compute gradients during the backward pass.
//!
//! - `lrn`: Local response normalization

mod lrn;

pub use lrn::*;
