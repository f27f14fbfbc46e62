//! Shared argument checks for runtime backends
//!
//! Kernels on every backend address memory as `base + channel * rdim + spatial`,
//! so operands must be contiguous, must agree on shape, and must be backed by
//! at least as many elements as their layout claims.

use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Ensure a tensor is laid out contiguously in row-major order.
#[inline]
pub(crate) fn require_contiguous<R: Runtime>(tensor: &Tensor<R>) -> Result<()> {
    if tensor.is_contiguous() {
        Ok(())
    } else {
        Err(Error::NotContiguous)
    }
}

/// Ensure the storage behind `tensor` holds every element its layout addresses.
///
/// `Tensor::from_parts` accepts any storage/layout pair, and kernels read
/// `numel()` elements from the storage base.
#[inline]
pub(crate) fn require_storage_len<R: Runtime>(tensor: &Tensor<R>) -> Result<()> {
    let available = tensor.storage().len();
    if available >= tensor.numel() {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            expected: tensor.shape().to_vec(),
            got: vec![available],
        })
    }
}

/// Ensure `got` has exactly the shape of `expected`.
#[inline]
pub(crate) fn require_same_shape<R: Runtime>(
    expected: &Tensor<R>,
    got: &Tensor<R>,
) -> Result<()> {
    if expected.shape() == got.shape() {
        Ok(())
    } else {
        Err(Error::shape_mismatch(expected.shape(), got.shape()))
    }
}
