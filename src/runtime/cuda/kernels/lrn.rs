//! LRN CUDA kernel launchers
//!
//! Every launcher queues work on `stream` and returns without synchronizing.
//! Buffers are contiguous f32 device pointers of the stated length.

use cudarc::driver::PushKernelArg;
use cudarc::driver::safe::{CudaContext, CudaStream};
use std::sync::Arc;

use super::loader::{
    checked_u32, elementwise_launch_config, get_kernel_function, get_or_load_module,
    kernel_names,
};
use crate::error::{Error, Result};
use crate::ops::ChannelGeometry;

/// Launch `lrn_window_sum_f32`: one thread per `(batch, position)` lane.
///
/// # Safety
///
/// - `input_ptr` and `output_ptr` must be valid device memory of `geom.numel()` f32
/// - the two buffers must not overlap
pub unsafe fn launch_lrn_window_sum(
    context: &Arc<CudaContext>,
    stream: &CudaStream,
    device_index: usize,
    input_ptr: u64,
    output_ptr: u64,
    geom: ChannelGeometry,
    n: usize,
) -> Result<()> {
    if geom.numel() == 0 {
        return Ok(());
    }
    let n = geom.clamp_width(n);
    let lanes = checked_u32("lanes", geom.lanes())?;
    let rdim = checked_u32("rdim", geom.rdim)?;
    let channels = checked_u32("channels", geom.channels)?;
    let width = checked_u32("n", n)?;
    // Inner index j runs to channels + n/2
    checked_u32("channels + n/2", geom.channels + n / 2)?;

    unsafe {
        let module = get_or_load_module(context, device_index, kernel_names::LRN_MODULE)?;
        let func = get_kernel_function(&module, "lrn_window_sum_f32")?;

        let cfg = elementwise_launch_config(lanes);
        log::trace!(
            "lrn_window_sum_f32: grid={:?} block={:?} lanes={} channels={} rdim={} n={}",
            cfg.grid_dim,
            cfg.block_dim,
            lanes,
            channels,
            rdim,
            width
        );

        let mut builder = stream.launch_builder(&func);
        builder.arg(&output_ptr);
        builder.arg(&input_ptr);
        builder.arg(&rdim);
        builder.arg(&channels);
        builder.arg(&width);
        builder.arg(&lanes);

        builder.launch(cfg).map_err(|e| {
            Error::Internal(format!("CUDA lrn_window_sum kernel launch failed: {:?}", e))
        })?;
    }

    Ok(())
}

/// Launch `lrn_square_f32`: `out = x * x`.
///
/// # Safety
///
/// `x_ptr` and `out_ptr` must be valid device memory of `len` f32.
pub unsafe fn launch_lrn_square(
    context: &Arc<CudaContext>,
    stream: &CudaStream,
    device_index: usize,
    x_ptr: u64,
    out_ptr: u64,
    len: usize,
) -> Result<()> {
    if len == 0 {
        return Ok(());
    }
    let n = checked_u32("len", len)?;

    unsafe {
        let module = get_or_load_module(context, device_index, kernel_names::LRN_MODULE)?;
        let func = get_kernel_function(&module, "lrn_square_f32")?;

        let cfg = elementwise_launch_config(n);
        log::trace!("lrn_square_f32: grid={:?} len={}", cfg.grid_dim, n);

        let mut builder = stream.launch_builder(&func);
        builder.arg(&out_ptr);
        builder.arg(&x_ptr);
        builder.arg(&n);

        builder.launch(cfg).map_err(|e| {
            Error::Internal(format!("CUDA lrn_square kernel launch failed: {:?}", e))
        })?;
    }

    Ok(())
}

/// Launch `lrn_forward_f32`.
///
/// `scale` holds the window sum of `x^2` on entry; on return it holds
/// `k + alpha * sum` and `y = x * scale^-beta`.
///
/// # Safety
///
/// All pointers must be valid device memory of `len` f32.
#[allow(clippy::too_many_arguments)]
pub unsafe fn launch_lrn_forward(
    context: &Arc<CudaContext>,
    stream: &CudaStream,
    device_index: usize,
    x_ptr: u64,
    scale_ptr: u64,
    y_ptr: u64,
    len: usize,
    k: f32,
    alpha: f32,
    beta: f32,
) -> Result<()> {
    if len == 0 {
        return Ok(());
    }
    let n = checked_u32("len", len)?;

    unsafe {
        let module = get_or_load_module(context, device_index, kernel_names::LRN_MODULE)?;
        let func = get_kernel_function(&module, "lrn_forward_f32")?;

        let cfg = elementwise_launch_config(n);
        log::trace!("lrn_forward_f32: grid={:?} len={}", cfg.grid_dim, n);

        let mut builder = stream.launch_builder(&func);
        builder.arg(&y_ptr);
        builder.arg(&scale_ptr);
        builder.arg(&x_ptr);
        builder.arg(&k);
        builder.arg(&alpha);
        builder.arg(&beta);
        builder.arg(&n);

        builder.launch(cfg).map_err(|e| {
            Error::Internal(format!("CUDA lrn_forward kernel launch failed: {:?}", e))
        })?;
    }

    Ok(())
}

/// Launch `lrn_backward_summand_f32`: `summand = y * gy / scale`.
///
/// # Safety
///
/// All pointers must be valid device memory of `len` f32.
#[allow(clippy::too_many_arguments)]
pub unsafe fn launch_lrn_backward_summand(
    context: &Arc<CudaContext>,
    stream: &CudaStream,
    device_index: usize,
    y_ptr: u64,
    gy_ptr: u64,
    scale_ptr: u64,
    summand_ptr: u64,
    len: usize,
) -> Result<()> {
    if len == 0 {
        return Ok(());
    }
    let n = checked_u32("len", len)?;

    unsafe {
        let module = get_or_load_module(context, device_index, kernel_names::LRN_MODULE)?;
        let func = get_kernel_function(&module, "lrn_backward_summand_f32")?;

        let cfg = elementwise_launch_config(n);
        log::trace!("lrn_backward_summand_f32: grid={:?} len={}", cfg.grid_dim, n);

        let mut builder = stream.launch_builder(&func);
        builder.arg(&summand_ptr);
        builder.arg(&scale_ptr);
        builder.arg(&y_ptr);
        builder.arg(&gy_ptr);
        builder.arg(&n);

        builder.launch(cfg).map_err(|e| {
            Error::Internal(format!(
                "CUDA lrn_backward_summand kernel launch failed: {:?}",
                e
            ))
        })?;
    }

    Ok(())
}

/// Launch `lrn_backward_f32`.
///
/// `gx` holds the window sum of the summand on entry and the input gradient
/// on return: `gx = scale^-beta * gy - coeff * x * gx`.
///
/// # Safety
///
/// All pointers must be valid device memory of `len` f32.
#[allow(clippy::too_many_arguments)]
pub unsafe fn launch_lrn_backward(
    context: &Arc<CudaContext>,
    stream: &CudaStream,
    device_index: usize,
    x_ptr: u64,
    gy_ptr: u64,
    scale_ptr: u64,
    gx_ptr: u64,
    len: usize,
    beta: f32,
    coeff: f32,
) -> Result<()> {
    if len == 0 {
        return Ok(());
    }
    let n = checked_u32("len", len)?;

    unsafe {
        let module = get_or_load_module(context, device_index, kernel_names::LRN_MODULE)?;
        let func = get_kernel_function(&module, "lrn_backward_f32")?;

        let cfg = elementwise_launch_config(n);
        log::trace!("lrn_backward_f32: grid={:?} len={}", cfg.grid_dim, n);

        let mut builder = stream.launch_builder(&func);
        builder.arg(&gx_ptr);
        builder.arg(&x_ptr);
        builder.arg(&gy_ptr);
        builder.arg(&scale_ptr);
        builder.arg(&beta);
        builder.arg(&coeff);
        builder.arg(&n);

        builder.launch(cfg).map_err(|e| {
            Error::Internal(format!("CUDA lrn_backward kernel launch failed: {:?}", e))
        })?;
    }

    Ok(())
}
