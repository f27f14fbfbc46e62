//! LRN parameters, channel geometry and the forward context
//!
//! Shared by every backend: the geometry math and shape checks here are the
//! only place the `(batch, channels, rest...)` convention is spelled out.

use crate::error::{Error, Result};
use crate::runtime::{Runtime, require_contiguous, require_same_shape, require_storage_len};
use crate::tensor::Tensor;

// ============================================================================
// Parameters
// ============================================================================

/// Local response normalization parameters
///
/// ```text
/// scale = k + alpha * sum_{window of n channels} x^2
/// y     = x * scale^-beta
/// ```
///
/// Odd `n` gives a window centred on each channel. Even `n` is accepted as-is;
/// see [`WindowSumAlgorithm`] for how each window sum places it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LrnParams {
    /// Window width in channels
    pub n: usize,
    /// Additive constant in `scale`
    pub k: f32,
    /// Multiplier on the windowed sum of squares
    pub alpha: f32,
    /// Exponent applied to `scale`
    pub beta: f32,
}

impl Default for LrnParams {
    fn default() -> Self {
        Self {
            n: 5,
            k: 2.0,
            alpha: 1e-4,
            beta: 0.75,
        }
    }
}

impl LrnParams {
    /// Create parameters with every field given
    pub fn new(n: usize, k: f32, alpha: f32, beta: f32) -> Self {
        Self { n, k, alpha, beta }
    }

    /// Set the window width
    pub fn with_n(mut self, n: usize) -> Self {
        self.n = n;
        self
    }

    /// Set the additive constant
    pub fn with_k(mut self, k: f32) -> Self {
        self.k = k;
        self
    }

    /// Set the sum-of-squares multiplier
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the exponent
    pub fn with_beta(mut self, beta: f32) -> Self {
        self.beta = beta;
        self
    }

    /// Channels on each side of the centre: `n / 2`
    #[inline]
    pub fn half(&self) -> usize {
        self.n / 2
    }

    /// Coefficient of the cross term in the gradient: `2 * alpha * beta`
    #[inline]
    pub fn grad_coeff(&self) -> f32 {
        2.0 * self.alpha * self.beta
    }

    /// Reject parameters that make the result meaningless
    ///
    /// The operators themselves never call this; `n == 0` or a non-positive
    /// `scale` simply produce whatever the arithmetic gives (zeros, infinities
    /// or NaN). Call it at the boundary where parameters come from user input.
    pub fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(Error::invalid_argument(
                "n",
                "window width must be at least 1",
            ));
        }
        for (arg, value) in [("k", self.k), ("alpha", self.alpha), ("beta", self.beta)] {
            if !value.is_finite() {
                return Err(Error::invalid_argument(arg, format!("must be finite, got {value}")));
            }
        }
        if self.k < 0.0 {
            return Err(Error::invalid_argument(
                "k",
                format!("must be non-negative, got {}", self.k),
            ));
        }
        if self.alpha < 0.0 {
            return Err(Error::invalid_argument(
                "alpha",
                format!("must be non-negative, got {}", self.alpha),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Window-sum algorithm
// ============================================================================

/// Which window-sum implementation a CPU client runs
///
/// The two agree for odd `n`. For even `n` they differ:
///
/// | algorithm   | window for channel `c`      | width   |
/// |-------------|-----------------------------|---------|
/// | `Shifted`   | `[c - n/2, c + n/2]`        | `n + 1` |
/// | `Streaming` | `[c - n/2 + 1, c + n/2]`    | `n`     |
///
/// and for `n == 0` `Shifted` returns the input while `Streaming` returns
/// zeros. CUDA always runs the streaming form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WindowSumAlgorithm {
    /// Whole-plane shifted additions, `scale^-beta` via `powf`
    #[default]
    Shifted,
    /// One running sum per channel column, `scale^-beta` via `exp2(log2)`
    Streaming,
}

impl WindowSumAlgorithm {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            WindowSumAlgorithm::Shifted => "shifted",
            WindowSumAlgorithm::Streaming => "streaming",
        }
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// View of a contiguous tensor as `(batch, channels, rdim)`
///
/// `rdim` is the product of every dimension after the channel axis, so the
/// elements of one channel column sit `rdim` apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelGeometry {
    /// Size of dimension 0
    pub batch: usize,
    /// Size of dimension 1
    pub channels: usize,
    /// Product of dimensions `2..`, 1 for rank-2 tensors
    pub rdim: usize,
}

impl ChannelGeometry {
    /// Derive the geometry of `shape`
    ///
    /// # Errors
    ///
    /// `Error::InvalidDimension` when `shape` has fewer than two dimensions.
    pub fn from_shape(shape: &[usize]) -> Result<Self> {
        if shape.len() < 2 {
            return Err(Error::InvalidDimension {
                dim: 1,
                ndim: shape.len(),
            });
        }
        Ok(Self {
            batch: shape[0],
            channels: shape[1],
            rdim: shape[2..].iter().product(),
        })
    }

    /// Number of independent channel columns: `batch * rdim`
    #[inline]
    pub fn lanes(&self) -> usize {
        self.batch * self.rdim
    }

    /// Elements per batch entry: `channels * rdim`
    #[inline]
    pub fn plane(&self) -> usize {
        self.channels * self.rdim
    }

    /// Total element count
    #[inline]
    pub fn numel(&self) -> usize {
        self.batch * self.plane()
    }

    /// Cap a window width where widening it stops changing the streaming sum
    ///
    /// Once `n/2 >= channels` nothing ever leaves the window and every output
    /// is the whole column. `2 * channels` is the smallest such width, so the
    /// per-lane loop is bounded by `2 * channels` steps for any `n`.
    #[inline]
    pub fn clamp_width(&self, n: usize) -> usize {
        n.min(self.channels.saturating_mul(2))
    }
}

// ============================================================================
// Forward context
// ============================================================================

/// What a forward call leaves behind for its backward call
///
/// Each `lrn_forward` returns a fresh context; pass the same one to
/// `lrn_backward`. Contexts hold shared references to device buffers, so
/// keeping one alive keeps `scale` and `y` allocated.
///
/// The window-sum algorithm is recorded too: backward differentiates with
/// the forward call's window and `pow`, whichever client it runs on.
pub struct LrnContext<R: Runtime> {
    pub(crate) scale: Tensor<R>,
    pub(crate) y: Tensor<R>,
    pub(crate) params: LrnParams,
    pub(crate) algorithm: WindowSumAlgorithm,
}

impl<R: Runtime> LrnContext<R> {
    pub(crate) fn new(
        scale: Tensor<R>,
        y: Tensor<R>,
        params: LrnParams,
        algorithm: WindowSumAlgorithm,
    ) -> Self {
        Self {
            scale,
            y,
            params,
            algorithm,
        }
    }

    /// `k + alpha * windowsum(x^2)` from the forward call
    pub fn scale(&self) -> &Tensor<R> {
        &self.scale
    }

    /// The forward output `y`
    pub fn output(&self) -> &Tensor<R> {
        &self.y
    }

    /// Parameters the forward call ran with
    pub fn params(&self) -> &LrnParams {
        &self.params
    }

    /// Window-sum algorithm the forward call used
    pub fn algorithm(&self) -> WindowSumAlgorithm {
        self.algorithm
    }

    /// Shape of the tensors the context was built from
    pub fn shape(&self) -> &[usize] {
        self.y.shape()
    }
}

impl<R: Runtime> Clone for LrnContext<R> {
    fn clone(&self) -> Self {
        Self {
            scale: self.scale.clone(),
            y: self.y.clone(),
            params: self.params,
            algorithm: self.algorithm,
        }
    }
}

impl<R: Runtime> std::fmt::Debug for LrnContext<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LrnContext")
            .field("shape", &self.shape())
            .field("params", &self.params)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Check a backward call's inputs against the context it came with
///
/// Shapes must all match the cached `y`, and `x`/`grad_y` must be contiguous
/// and fully backed by their storage.
/// Returns the shared geometry on success.
pub(crate) fn validate_lrn_backward<R: Runtime>(
    ctx: &LrnContext<R>,
    x: &Tensor<R>,
    grad_y: &Tensor<R>,
) -> Result<ChannelGeometry> {
    require_same_shape(&ctx.y, &ctx.scale)?;
    require_same_shape(&ctx.y, x)?;
    require_same_shape(&ctx.y, grad_y)?;
    require_contiguous(x)?;
    require_contiguous(grad_y)?;
    require_storage_len(x)?;
    require_storage_len(grad_y)?;
    ChannelGeometry::from_shape(ctx.shape())
}
