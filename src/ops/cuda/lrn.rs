//! Local response normalization for CUDA runtime
use crate::error::Result;
use crate::ops::common::validate_lrn_backward;
use crate::ops::{ChannelGeometry, LrnContext, LrnOps, LrnParams, WindowSumAlgorithm};
use crate::runtime::cuda::kernels::{
    launch_lrn_backward, launch_lrn_backward_summand, launch_lrn_forward, launch_lrn_square,
    launch_lrn_window_sum,
};
use crate::runtime::cuda::{CudaClient, CudaRuntime};
use crate::runtime::{Device, require_contiguous, require_storage_len};
use crate::tensor::Tensor;

impl LrnOps<CudaRuntime> for CudaClient {
    fn lrn_window_sum(
        &self,
        input: &Tensor<CudaRuntime>,
        n: usize,
    ) -> Result<Tensor<CudaRuntime>> {
        let geom = ChannelGeometry::from_shape(input.shape())?;
        require_contiguous(input)?;
        require_storage_len(input)?;
        log::debug!(
            "lrn_window_sum: shape={:?} n={} algorithm=streaming device={}",
            input.shape(),
            n,
            self.device.name()
        );

        let out = Tensor::<CudaRuntime>::try_empty(input.shape(), &self.device)?;
        unsafe {
            launch_lrn_window_sum(
                &self.context,
                &self.stream,
                self.device.index,
                input.storage().ptr(),
                out.storage().ptr(),
                geom,
                n,
            )?;
        }
        Ok(out)
    }

    fn lrn_forward(
        &self,
        x: &Tensor<CudaRuntime>,
        params: &LrnParams,
    ) -> Result<(Tensor<CudaRuntime>, LrnContext<CudaRuntime>)> {
        let geom = ChannelGeometry::from_shape(x.shape())?;
        require_contiguous(x)?;
        require_storage_len(x)?;
        log::debug!(
            "lrn_forward: shape={:?} n={} algorithm=streaming device={}",
            x.shape(),
            params.n,
            self.device.name()
        );

        let len = x.numel();
        let y = Tensor::<CudaRuntime>::try_empty(x.shape(), &self.device)?;
        let scale = Tensor::<CudaRuntime>::try_empty(x.shape(), &self.device)?;

        let x_ptr = x.storage().ptr();
        let y_ptr = y.storage().ptr();
        let scale_ptr = scale.storage().ptr();

        unsafe {
            // y holds x^2 until lrn_forward_f32 overwrites it
            launch_lrn_square(&self.context, &self.stream, self.device.index, x_ptr, y_ptr, len)?;
            launch_lrn_window_sum(
                &self.context,
                &self.stream,
                self.device.index,
                y_ptr,
                scale_ptr,
                geom,
                params.n,
            )?;
            launch_lrn_forward(
                &self.context,
                &self.stream,
                self.device.index,
                x_ptr,
                scale_ptr,
                y_ptr,
                len,
                params.k,
                params.alpha,
                params.beta,
            )?;
        }

        // The device only implements the streaming window sum
        let ctx = LrnContext::new(scale, y.clone(), *params, WindowSumAlgorithm::Streaming);
        Ok((y, ctx))
    }

    fn lrn_backward(
        &self,
        ctx: &LrnContext<CudaRuntime>,
        x: &Tensor<CudaRuntime>,
        grad_y: &Tensor<CudaRuntime>,
    ) -> Result<Tensor<CudaRuntime>> {
        let geom = validate_lrn_backward(ctx, x, grad_y)?;
        let params = ctx.params();
        log::debug!(
            "lrn_backward: shape={:?} n={} algorithm=streaming device={}",
            x.shape(),
            params.n,
            self.device.name()
        );

        let len = x.numel();
        let summand = Tensor::<CudaRuntime>::try_empty(x.shape(), &self.device)?;
        let grad_x = Tensor::<CudaRuntime>::try_empty(x.shape(), &self.device)?;

        let summand_ptr = summand.storage().ptr();
        let gx_ptr = grad_x.storage().ptr();
        let scale_ptr = ctx.scale().storage().ptr();

        unsafe {
            launch_lrn_backward_summand(
                &self.context,
                &self.stream,
                self.device.index,
                ctx.output().storage().ptr(),
                grad_y.storage().ptr(),
                scale_ptr,
                summand_ptr,
                len,
            )?;
            launch_lrn_window_sum(
                &self.context,
                &self.stream,
                self.device.index,
                summand_ptr,
                gx_ptr,
                geom,
                params.n,
            )?;
            launch_lrn_backward(
                &self.context,
                &self.stream,
                self.device.index,
                x.storage().ptr(),
                grad_y.storage().ptr(),
                scale_ptr,
                gx_ptr,
                len,
                params.beta,
                params.grad_coeff(),
            )?;
        }

        Ok(grad_x)
    }
}
