//! CPU implementation of tensor operations.

mod lrn;
