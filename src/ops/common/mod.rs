//! Parameter types and validation shared across operation backends.

pub mod lrn;

pub use lrn::{ChannelGeometry, LrnContext, LrnParams, WindowSumAlgorithm};
pub(crate) use lrn::validate_lrn_backward;
