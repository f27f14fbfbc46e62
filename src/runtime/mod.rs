//! Runtime backends for tensor computation
//!
//! This module defines the `Runtime` trait and provides implementations
//! for the CPU (always available) and CUDA (feature `cuda`) backends.
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity)
//! ├── Device (the host, or one CUDA ordinal)
//! └── Client (dispatches LRN ops; owns the stream or thread pool)
//! ```

mod helpers;
mod traits;

pub mod cpu;

#[cfg(feature = "cuda")]
pub mod cuda;

pub(crate) use helpers::{require_contiguous, require_same_shape, require_storage_len};
pub use traits::{Device, Runtime, RuntimeClient};
