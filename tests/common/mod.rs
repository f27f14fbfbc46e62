//! Common test utilities
#![allow(dead_code)]

use numr_lrn::runtime::Runtime;
use numr_lrn::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
#[cfg(feature = "cuda")]
use numr_lrn::runtime::cuda::{CudaClient, CudaDevice, CudaRuntime};
use numr_lrn::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);
    (client, device)
}

/// Create a CUDA client and device, returning None if CUDA is unavailable
#[cfg(feature = "cuda")]
pub fn create_cuda_client() -> Option<(CudaClient, CudaDevice)> {
    if !numr_lrn::runtime::cuda::is_cuda_available() {
        return None;
    }
    let init = std::panic::catch_unwind(|| {
        let device = CudaDevice::new(0);
        let client = CudaRuntime::default_client(&device);
        (client, device)
    });
    init.ok()
}

/// Deterministic uniform samples in `[lo, hi)`
pub fn random_vec(len: usize, lo: f32, hi: f32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(lo..hi)).collect()
}

/// Seeded random tensor of the given shape on `device`
pub fn random_tensor<R: Runtime>(
    shape: &[usize],
    lo: f32,
    hi: f32,
    seed: u64,
    device: &R::Device,
) -> Tensor<R> {
    let numel: usize = shape.iter().product();
    Tensor::<R>::from_slice(&random_vec(numel, lo, hi, seed), shape, device)
}

/// Window sum by definition: sum of channels `c + lo ..= c + hi`, clipped
pub fn window_sum_reference(
    x: &[f32],
    shape: &[usize],
    lo_offset: isize,
    hi_offset: isize,
) -> Vec<f32> {
    let batch = shape[0];
    let channels = shape[1];
    let rdim: usize = shape[2..].iter().product();
    let mut out = vec![0.0f32; x.len()];
    for b in 0..batch {
        for c in 0..channels {
            let lo = (c as isize + lo_offset).max(0);
            let hi = (c as isize + hi_offset).min(channels as isize - 1);
            for r in 0..rdim {
                let mut sum = 0.0f64;
                let mut d = lo;
                while d <= hi {
                    sum += x[(b * channels + d as usize) * rdim + r] as f64;
                    d += 1;
                }
                out[(b * channels + c) * rdim + r] = sum as f32;
            }
        }
    }
    out
}

/// Centred window `[c - n/2, c + n/2]` used by the shifted window sum
pub fn shifted_window_reference(x: &[f32], shape: &[usize], n: usize) -> Vec<f32> {
    let half = (n / 2) as isize;
    window_sum_reference(x, shape, -half, half)
}

/// Window `[c - n/2 + 1, c + n/2]` for even `n` (centred for odd `n`) used by
/// the streaming window sum
pub fn streaming_window_reference(x: &[f32], shape: &[usize], n: usize) -> Vec<f32> {
    let half = (n / 2) as isize;
    let below = n as isize - 1 - half;
    window_sum_reference(x, shape, -below, half)
}

/// Assert two f32 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}
