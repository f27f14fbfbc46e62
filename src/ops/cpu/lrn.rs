//! CPU implementation of local response normalization.

use crate::error::Result;
use crate::ops::common::validate_lrn_backward;
use crate::ops::{ChannelGeometry, LrnContext, LrnOps, LrnParams, WindowSumAlgorithm};
use crate::runtime::cpu::kernels::{self, PowMode};
use crate::runtime::cpu::{CpuClient, CpuRuntime};
use crate::runtime::{Device, require_contiguous, require_storage_len};
use crate::tensor::Tensor;

impl CpuClient {
    /// Run `algorithm`'s window sum from `input` into `out`
    ///
    /// # Safety
    /// Both addresses must be host pointers to `geom.numel()` f32 elements
    /// in distinct buffers.
    unsafe fn window_sum_into(
        &self,
        algorithm: WindowSumAlgorithm,
        input: u64,
        out: u64,
        geom: ChannelGeometry,
        n: usize,
    ) {
        let input = input as *const f32;
        let out = out as *mut f32;
        unsafe {
            match algorithm {
                WindowSumAlgorithm::Shifted => {
                    kernels::window_sum_shifted_kernel(self, input, out, geom, n)
                }
                WindowSumAlgorithm::Streaming => {
                    kernels::window_sum_streaming_kernel(self, input, out, geom, n)
                }
            }
        }
    }

}

/// Streaming mirrors the device path, including its fast `pow`
fn pow_mode(algorithm: WindowSumAlgorithm) -> PowMode {
    match algorithm {
        WindowSumAlgorithm::Shifted => PowMode::Exact,
        WindowSumAlgorithm::Streaming => PowMode::Fast,
    }
}

/// LrnOps implementation for CPU runtime.
impl LrnOps<CpuRuntime> for CpuClient {
    fn lrn_window_sum(&self, input: &Tensor<CpuRuntime>, n: usize) -> Result<Tensor<CpuRuntime>> {
        let geom = ChannelGeometry::from_shape(input.shape())?;
        require_contiguous(input)?;
        require_storage_len(input)?;
        log::debug!(
            "lrn_window_sum: shape={:?} n={} algorithm={} device={}",
            input.shape(),
            n,
            self.window_sum_algorithm().name(),
            self.device.name()
        );

        let out = Tensor::<CpuRuntime>::try_empty(input.shape(), &self.device)?;
        unsafe {
            self.window_sum_into(
                self.window_sum_algorithm(),
                input.storage().ptr(),
                out.storage().ptr(),
                geom,
                n,
            );
        }
        Ok(out)
    }

    fn lrn_forward(
        &self,
        x: &Tensor<CpuRuntime>,
        params: &LrnParams,
    ) -> Result<(Tensor<CpuRuntime>, LrnContext<CpuRuntime>)> {
        let geom = ChannelGeometry::from_shape(x.shape())?;
        require_contiguous(x)?;
        require_storage_len(x)?;
        let algorithm = self.window_sum_algorithm();
        log::debug!(
            "lrn_forward: shape={:?} n={} algorithm={} device={}",
            x.shape(),
            params.n,
            algorithm.name(),
            self.device.name()
        );

        let len = x.numel();
        let y = Tensor::<CpuRuntime>::try_empty(x.shape(), &self.device)?;
        let scale = Tensor::<CpuRuntime>::try_empty(x.shape(), &self.device)?;

        let x_ptr = x.storage().ptr();
        let y_ptr = y.storage().ptr();
        let scale_ptr = scale.storage().ptr();

        unsafe {
            // y holds x^2 until the final kernel overwrites it
            kernels::square_kernel(x_ptr as *const f32, y_ptr as *mut f32, len);
            self.window_sum_into(algorithm, y_ptr, scale_ptr, geom, params.n);
            kernels::lrn_forward_kernel(
                x_ptr as *const f32,
                scale_ptr as *mut f32,
                y_ptr as *mut f32,
                len,
                params.k,
                params.alpha,
                params.beta,
                pow_mode(algorithm),
            );
        }

        let ctx = LrnContext::new(scale, y.clone(), *params, algorithm);
        Ok((y, ctx))
    }

    fn lrn_backward(
        &self,
        ctx: &LrnContext<CpuRuntime>,
        x: &Tensor<CpuRuntime>,
        grad_y: &Tensor<CpuRuntime>,
    ) -> Result<Tensor<CpuRuntime>> {
        let geom = validate_lrn_backward(ctx, x, grad_y)?;
        let params = ctx.params();
        // Differentiate the forward that built the context, not this client's setting
        let algorithm = ctx.algorithm();
        log::debug!(
            "lrn_backward: shape={:?} n={} algorithm={} device={}",
            x.shape(),
            params.n,
            algorithm.name(),
            self.device.name()
        );

        let len = x.numel();
        let summand = Tensor::<CpuRuntime>::try_empty(x.shape(), &self.device)?;
        let grad_x = Tensor::<CpuRuntime>::try_empty(x.shape(), &self.device)?;

        let x_ptr = x.storage().ptr();
        let gy_ptr = grad_y.storage().ptr();
        let y_ptr = ctx.output().storage().ptr();
        let scale_ptr = ctx.scale().storage().ptr();
        let summand_ptr = summand.storage().ptr();
        let gx_ptr = grad_x.storage().ptr();

        unsafe {
            kernels::lrn_backward_summand_kernel(
                y_ptr as *const f32,
                gy_ptr as *const f32,
                scale_ptr as *const f32,
                summand_ptr as *mut f32,
                len,
            );
            self.window_sum_into(algorithm, summand_ptr, gx_ptr, geom, params.n);
            kernels::lrn_backward_kernel(
                x_ptr as *const f32,
                gy_ptr as *const f32,
                scale_ptr as *const f32,
                gx_ptr as *mut f32,
                len,
                params.beta,
                params.grad_coeff(),
                pow_mode(algorithm),
            );
        }

        Ok(grad_x)
    }
}
