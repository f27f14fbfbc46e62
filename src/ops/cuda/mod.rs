//! CUDA tensor operation implementations

mod lrn;
