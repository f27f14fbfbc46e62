//! Operation traits implemented by runtime clients.

mod lrn;

pub use lrn::LrnOps;
