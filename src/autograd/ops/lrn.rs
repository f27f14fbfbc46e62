//! Backward implementation for local response normalization

use crate::autograd::GradFn;
use crate::error::Result;
use crate::ops::{LrnContext, LrnOps, LrnParams};
use crate::runtime::Runtime;
use crate::tensor::{Tensor, TensorId};

// ============================================================================
// LrnBackward
// ============================================================================

/// Backward for LRN: y = x * (k + alpha * windowsum(x^2))^-beta
///
/// Gradient:
/// ```text
/// dL/dx = dL/dy * scale^-beta - 2*alpha*beta * x * windowsum(y * dL/dy / scale)
/// ```
///
/// Keeps the client that ran the forward pass, so backward runs on the same
/// device and thread pool.
pub struct LrnBackward<R: Runtime> {
    input_id: TensorId,
    /// `[x, scale, y]`
    saved: [Tensor<R>; 3],
    ctx: LrnContext<R>,
    client: R::Client,
}

impl<R: Runtime> LrnBackward<R> {
    /// Create a new LrnBackward from a forward call's input and context
    pub fn new(client: R::Client, input: Tensor<R>, ctx: LrnContext<R>) -> Self {
        Self {
            input_id: input.id(),
            saved: [input, ctx.scale().clone(), ctx.output().clone()],
            ctx,
            client,
        }
    }

    /// The forward context this backward consumes
    pub fn context(&self) -> &LrnContext<R> {
        &self.ctx
    }
}

impl<R: Runtime> GradFn<R> for LrnBackward<R>
where
    R::Client: LrnOps<R>,
{
    fn backward(&self, grad_output: &Tensor<R>) -> Result<Vec<Option<Tensor<R>>>> {
        let grad = self
            .client
            .lrn_backward(&self.ctx, &self.saved[0], grad_output)?;
        Ok(vec![Some(grad)])
    }

    fn inputs(&self) -> &[TensorId] {
        std::slice::from_ref(&self.input_id)
    }

    fn saved_tensors(&self) -> &[Tensor<R>] {
        &self.saved
    }

    fn name(&self) -> &'static str {
        "LrnBackward"
    }
}

// ============================================================================
// Factories
// ============================================================================

/// Local response normalization across neighbouring channels
///
/// For an input with `N` channels, computes
///
/// ```text
/// y_c = x_c / (k + alpha * sum_{d = c - n/2}^{c + n/2} x_d^2)^beta
/// ```
///
/// with out-of-range channels treated as zero. Returns the output and the
/// [`LrnBackward`] that maps `dL/dy` to `dL/dx`.
///
/// See Sec. 3.3 of "ImageNet Classification with Deep Convolutional Neural
/// Networks" (Krizhevsky et al., 2012).
///
/// # Example
///
/// ```
/// use numr_lrn::prelude::*;
///
/// let device = CpuDevice::new();
/// let client = CpuRuntime::default_client(&device);
/// let x = Tensor::<CpuRuntime>::from_slice(&[1.0f32; 8], &[1, 8], &device);
///
/// let (y, grad_fn) = local_response_normalization(&client, &x, &LrnParams::default())?;
/// let gy = Tensor::<CpuRuntime>::from_slice(&[1.0f32; 8], &[1, 8], &device);
/// let grads = grad_fn.backward(&gy)?;
/// assert_eq!(grads[0].as_ref().map(|g| g.shape().to_vec()), Some(vec![1, 8]));
/// # Ok::<(), numr_lrn::error::Error>(())
/// ```
pub fn local_response_normalization<R: Runtime>(
    client: &R::Client,
    x: &Tensor<R>,
    params: &LrnParams,
) -> Result<(Tensor<R>, LrnBackward<R>)>
where
    R::Client: LrnOps<R>,
{
    let (y, ctx) = client.lrn_forward(x, params)?;
    Ok((y, LrnBackward::new(client.clone(), x.clone(), ctx)))
}

/// [`local_response_normalization`] with `n = 5, k = 2, alpha = 1e-4, beta = 0.75`
pub fn local_response_normalization_default<R: Runtime>(
    client: &R::Client,
    x: &Tensor<R>,
) -> Result<(Tensor<R>, LrnBackward<R>)>
where
    R::Client: LrnOps<R>,
{
    local_response_normalization(client, x, &LrnParams::default())
}
