//! Local response normalization operations trait.

use crate::error::Result;
use crate::ops::{LrnContext, LrnParams};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Local response normalization across the channel axis
///
/// Inputs are contiguous tensors of rank ≥ 2 laid out as
/// `(batch, channels, rest...)`. Every position of every batch entry is
/// normalized independently over a window of neighbouring channels.
pub trait LrnOps<R: Runtime> {
    /// Sum each element's window of `n` neighbouring channels
    ///
    /// Output has the input's shape. Channels outside `[0, channels)` count
    /// as zero. Which window is used for even `n` depends on the backend's
    /// window-sum algorithm (see [`crate::ops::WindowSumAlgorithm`]).
    ///
    /// # Errors
    ///
    /// - `InvalidDimension` if `input` has fewer than two dimensions
    /// - `NotContiguous` if `input` is not contiguous
    fn lrn_window_sum(&self, input: &Tensor<R>, n: usize) -> Result<Tensor<R>>;

    /// Forward pass: `y = x * (k + alpha * windowsum(x^2))^-beta`
    ///
    /// Returns `y` together with the context the matching backward call
    /// needs. The context owns this call's `scale` and `y`; nothing is kept
    /// on the client.
    ///
    /// # Errors
    ///
    /// - `InvalidDimension` if `x` has fewer than two dimensions
    /// - `NotContiguous` if `x` is not contiguous
    fn lrn_forward(&self, x: &Tensor<R>, params: &LrnParams) -> Result<(Tensor<R>, LrnContext<R>)>;

    /// Backward pass: gradient of the loss with respect to `x`
    ///
    /// ```text
    /// summand = y * grad_y / scale
    /// grad_x  = grad_y * scale^-beta - 2 * alpha * beta * x * windowsum(summand)
    /// ```
    ///
    /// `x` must be the tensor the context's forward call saw. The window sum
    /// and `pow` are those recorded in the context
    /// ([`LrnContext::algorithm`]), not the ones this client is configured
    /// with.
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if `x` or `grad_y` differ in shape from the context
    /// - `NotContiguous` if `x` or `grad_y` is not contiguous
    fn lrn_backward(
        &self,
        ctx: &LrnContext<R>,
        x: &Tensor<R>,
        grad_y: &Tensor<R>,
    ) -> Result<Tensor<R>>;
}
