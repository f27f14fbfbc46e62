//! Tensor operations
//!
//! Operations are defined as traits implemented by each runtime's client,
//! which gives them the device to allocate outputs on and, for CPU, the
//! parallelism and algorithm settings.
//!
//! ```text
//! RuntimeClient<R>
//!   └── implements LrnOps<R>
//!         ├── lrn_window_sum  (windowed channel sum)
//!         ├── lrn_forward     (y, LrnContext)
//!         └── lrn_backward    (grad_x from LrnContext)
//! ```
//!
//! Parameter and geometry types shared by all backends live in [`common`].

pub mod common;
mod cpu;
#[cfg(feature = "cuda")]
mod cuda;
mod traits;

pub use common::{ChannelGeometry, LrnContext, LrnParams, WindowSumAlgorithm};
pub use traits::LrnOps;
