//! Local Response Normalization: forward and backward on CPU
//!
//! This example normalizes a batch of AlexNet-sized activations, runs the
//! backward pass for the loss `sum(y)`, and compares the two CPU window-sum
//! algorithms.
//!
//! Key concepts demonstrated:
//! - `local_response_normalization` returns the output and its `GradFn`
//! - The forward `LrnContext` carries everything backward needs
//! - `WindowSumAlgorithm` selects shifted slices or the streaming sum
//!
//! Run with:
//! ```sh
//! RUST_LOG=debug cargo run --example lrn_forward_backward
//! ```

use numr_lrn::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn stats(name: &str, values: &[f32]) {
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let max_abs = values.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    println!("  {name:<8} mean={mean:+.6e} max|.|={max_abs:.6e}");
}

fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).fold(0.0f32, |m, (x, y)| m.max((x - y).abs()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    // -----------------------------------------------------------------------
    // 1. Activations shaped like AlexNet's first conv output
    // -----------------------------------------------------------------------
    let shape = [4, 96, 27, 27];
    let numel: usize = shape.iter().product();
    let mut rng = StdRng::seed_from_u64(7);
    let data: Vec<f32> = (0..numel).map(|_| rng.random_range(-4.0..4.0)).collect();
    let x = Tensor::<CpuRuntime>::try_from_slice(&data, &shape, &device)?;

    let params = LrnParams::default();
    params.validate()?;
    log::info!("input {:?}, {:?}", x.shape(), params);

    // -----------------------------------------------------------------------
    // 2. Forward and backward through the GradFn
    // -----------------------------------------------------------------------
    let (y, grad_fn) = local_response_normalization(&client, &x, &params)?;
    let grad_y = Tensor::<CpuRuntime>::try_full_scalar(&shape, 1.0, &device)?;
    let grad_x = grad_fn
        .backward(&grad_y)?
        .remove(0)
        .ok_or_else(|| Error::Internal("LrnBackward returned no gradient".into()))?;

    println!("shifted window sum:");
    stats("x", &data);
    stats("scale", &grad_fn.context().scale().try_to_vec()?);
    stats("y", &y.try_to_vec()?);
    stats("grad_x", &grad_x.try_to_vec()?);

    // -----------------------------------------------------------------------
    // 3. Same computation with the streaming window sum
    // -----------------------------------------------------------------------
    let streaming = client.clone().with_window_sum(WindowSumAlgorithm::Streaming);
    let (y_fast, ctx) = streaming.lrn_forward(&x, &params)?;
    let grad_fast = streaming.lrn_backward(&ctx, &x, &grad_y)?;

    println!("streaming vs shifted (odd n, same window):");
    println!(
        "  max|dy|={:.3e} max|dgrad|={:.3e}",
        max_abs_diff(&y_fast.try_to_vec()?, &y.try_to_vec()?),
        max_abs_diff(&grad_fast.try_to_vec()?, &grad_x.try_to_vec()?)
    );

    Ok(())
}
