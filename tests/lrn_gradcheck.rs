//! Finite-difference checks of the LRN backward pass
//!
//! Loss is `sum(y * w)` for a fixed random `w`, so `grad_y = w` and the
//! analytic gradient can be compared against central differences in `x`.

mod common;

use common::{create_cpu_client, random_vec};
use numr_lrn::autograd::{GradFn, local_response_normalization};
use numr_lrn::ops::{LrnOps, LrnParams, WindowSumAlgorithm};
use numr_lrn::runtime::RuntimeClient;
use numr_lrn::runtime::cpu::{CpuClient, CpuRuntime};
use numr_lrn::tensor::Tensor;

const SHAPE: [usize; 3] = [2, 5, 3];
const EPS: f32 = 1e-2;

fn loss(client: &CpuClient, x: &[f32], w: &[f32], params: &LrnParams) -> f64 {
    let device = client.device().clone();
    let x = Tensor::<CpuRuntime>::from_slice(x, &SHAPE, &device);
    let (y, _) = client.lrn_forward(&x, params).unwrap();
    y.to_vec()
        .iter()
        .zip(w)
        .map(|(&yi, &wi)| yi as f64 * wi as f64)
        .sum()
}

fn check_gradient(client: &CpuClient, params: &LrnParams, seed: u64) {
    let device = client.device().clone();
    let numel: usize = SHAPE.iter().product();
    let xv = random_vec(numel, -1.0, 1.0, seed);
    let wv = random_vec(numel, -1.0, 1.0, seed + 100);

    let x = Tensor::<CpuRuntime>::from_slice(&xv, &SHAPE, &device);
    let w = Tensor::<CpuRuntime>::from_slice(&wv, &SHAPE, &device);
    let (_, ctx) = client.lrn_forward(&x, params).unwrap();
    let analytic = client.lrn_backward(&ctx, &x, &w).unwrap().to_vec();

    for i in 0..numel {
        let mut plus = xv.clone();
        let mut minus = xv.clone();
        plus[i] += EPS;
        minus[i] -= EPS;
        let numeric = (loss(client, &plus, &wv, params) - loss(client, &minus, &wv, params))
            / (2.0 * EPS as f64);
        let ana = analytic[i] as f64;
        let tol = 1e-2 * numeric.abs().max(ana.abs()) + 1e-3;
        assert!(
            (numeric - ana).abs() <= tol,
            "{:?} {params:?}: element {i}: numeric {numeric} vs analytic {ana}",
            client.window_sum_algorithm()
        );
    }
}

fn odd_width_params() -> [LrnParams; 4] {
    [
        LrnParams::new(3, 1.0, 0.5, 0.75),
        LrnParams::new(5, 2.0, 1.0, 0.5),
        LrnParams::new(1, 1.0, 1.0, 1.0),
        LrnParams::default(),
    ]
}

#[test]
fn test_gradcheck_shifted() {
    let (client, _) = create_cpu_client();
    for (seed, params) in odd_width_params().iter().enumerate() {
        check_gradient(&client, params, seed as u64);
    }
}

#[test]
fn test_gradcheck_shifted_even_width() {
    // The shifted window is symmetric for every n, so even widths
    // differentiate exactly too
    let (client, _) = create_cpu_client();
    check_gradient(&client, &LrnParams::new(4, 1.0, 0.5, 0.75), 20);
    check_gradient(&client, &LrnParams::new(2, 1.5, 0.8, 1.0), 21);
}

#[test]
fn test_gradcheck_streaming() {
    let (client, _) = create_cpu_client();
    let client = client.with_window_sum(WindowSumAlgorithm::Streaming);
    for (seed, params) in odd_width_params().iter().enumerate() {
        check_gradient(&client, params, 10 + seed as u64);
    }
}

#[test]
fn test_gradcheck_through_grad_fn() {
    let (client, device) = create_cpu_client();
    let params = LrnParams::new(3, 1.0, 0.5, 0.75);
    let numel: usize = SHAPE.iter().product();
    let xv = random_vec(numel, -1.0, 1.0, 30);
    let wv = random_vec(numel, -1.0, 1.0, 31);

    let x = Tensor::<CpuRuntime>::from_slice(&xv, &SHAPE, &device);
    let w = Tensor::<CpuRuntime>::from_slice(&wv, &SHAPE, &device);
    let (_, grad_fn) = local_response_normalization(&client, &x, &params).unwrap();
    let grad = grad_fn.backward(&w).unwrap().remove(0).unwrap().to_vec();

    let i = numel / 2;
    let mut plus = xv.clone();
    let mut minus = xv;
    plus[i] += EPS;
    minus[i] -= EPS;
    let numeric = (loss(&client, &plus, &wv, &params) - loss(&client, &minus, &wv, &params))
        / (2.0 * EPS as f64);
    assert!((numeric - grad[i] as f64).abs() <= 1e-2 * numeric.abs() + 1e-3);
}
