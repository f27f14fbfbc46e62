//! Integration tests for the channel-window sum

mod common;

use common::{
    assert_allclose_f32, create_cpu_client, random_tensor, shifted_window_reference,
    streaming_window_reference,
};
use numr_lrn::error::Error;
use numr_lrn::ops::{LrnOps, WindowSumAlgorithm};
use numr_lrn::runtime::cpu::{CpuClient, CpuRuntime, ParallelismConfig};
use numr_lrn::tensor::{Layout, Shape, Storage, Strides, Tensor};

fn streaming(client: &CpuClient) -> CpuClient {
    client.clone().with_window_sum(WindowSumAlgorithm::Streaming)
}

#[test]
fn test_shifted_matches_definition() {
    let (client, device) = create_cpu_client();
    for channels in [1usize, 2, 5, 100] {
        let shape = [2, channels, 3];
        let x = random_tensor::<CpuRuntime>(&shape, -1.0, 1.0, channels as u64, &device);
        let data = x.to_vec();
        for n in [1usize, 3, 5, 7] {
            let out = client.lrn_window_sum(&x, n).unwrap();
            assert_allclose_f32(
                &out.to_vec(),
                &shifted_window_reference(&data, &shape, n),
                1e-5,
                1e-5,
                &format!("shifted N={channels} n={n}"),
            );
        }
    }
}

#[test]
fn test_streaming_matches_definition() {
    let (client, device) = create_cpu_client();
    let client = streaming(&client);
    for channels in [1usize, 2, 5, 100] {
        let shape = [2, channels, 3];
        let x = random_tensor::<CpuRuntime>(&shape, -1.0, 1.0, 100 + channels as u64, &device);
        let data = x.to_vec();
        for n in [1usize, 3, 5, 7] {
            let out = client.lrn_window_sum(&x, n).unwrap();
            // Running sums drift slightly over long columns
            assert_allclose_f32(
                &out.to_vec(),
                &streaming_window_reference(&data, &shape, n),
                1e-4,
                2e-4,
                &format!("streaming N={channels} n={n}"),
            );
        }
    }
}

#[test]
fn test_algorithms_agree_for_odd_width() {
    let (client, device) = create_cpu_client();
    let shape = [2, 8, 4, 4];
    let x = random_tensor::<CpuRuntime>(&shape, -2.0, 2.0, 7, &device);
    for n in [1usize, 3, 5, 7, 9] {
        let shifted = client.lrn_window_sum(&x, n).unwrap().to_vec();
        let streamed = streaming(&client).lrn_window_sum(&x, n).unwrap().to_vec();
        assert_allclose_f32(&streamed, &shifted, 1e-3, 1e-4, &format!("n={n}"));
    }
}

#[test]
fn test_even_width_windows_differ() {
    // Shifted sums [c-1, c+1] for n = 2; streaming sums [c, c+1]
    let (client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::from_slice(&[1.0, 10.0, 100.0, 1000.0], &[1, 4], &device);

    let shifted = client.lrn_window_sum(&x, 2).unwrap().to_vec();
    assert_eq!(shifted, [11.0, 111.0, 1110.0, 1100.0]);

    let streamed = streaming(&client).lrn_window_sum(&x, 2).unwrap().to_vec();
    assert_eq!(streamed, [11.0, 110.0, 1100.0, 1000.0]);
}

#[test]
fn test_even_width_matches_definition() {
    let (client, device) = create_cpu_client();
    let shape = [3, 9, 2];
    let x = random_tensor::<CpuRuntime>(&shape, -1.0, 1.0, 11, &device);
    let data = x.to_vec();
    for n in [2usize, 4, 6] {
        assert_allclose_f32(
            &client.lrn_window_sum(&x, n).unwrap().to_vec(),
            &shifted_window_reference(&data, &shape, n),
            1e-5,
            1e-5,
            &format!("shifted n={n}"),
        );
        assert_allclose_f32(
            &streaming(&client).lrn_window_sum(&x, n).unwrap().to_vec(),
            &streaming_window_reference(&data, &shape, n),
            1e-4,
            1e-4,
            &format!("streaming n={n}"),
        );
    }
}

#[test]
fn test_zero_width() {
    let (client, device) = create_cpu_client();
    let x = random_tensor::<CpuRuntime>(&[2, 4, 3], -1.0, 1.0, 3, &device);

    assert_eq!(client.lrn_window_sum(&x, 0).unwrap().to_vec(), x.to_vec());
    assert!(
        streaming(&client)
            .lrn_window_sum(&x, 0)
            .unwrap()
            .to_vec()
            .iter()
            .all(|&v| v == 0.0)
    );
}

#[test]
fn test_window_wider_than_channels() {
    // Every window covers all channels: each position sums its whole column
    let (client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[1, 3, 2], &device);
    for c in [client.clone(), streaming(&client)] {
        let out = c.lrn_window_sum(&x, 11).unwrap().to_vec();
        assert_eq!(out, [9.0, 12.0, 9.0, 12.0, 9.0, 12.0]);
    }
}

#[test]
fn test_huge_width_sums_whole_column() {
    // Must finish promptly: the streaming pass is bounded by the channel count
    let (client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[1, 3, 2], &device);
    for n in [6usize, 7, 1 << 20, usize::MAX / 2, usize::MAX] {
        for c in [client.clone(), streaming(&client)] {
            let out = c.lrn_window_sum(&x, n).unwrap().to_vec();
            assert_eq!(out, [9.0, 12.0, 9.0, 12.0, 9.0, 12.0], "n={n}");
        }
    }
}

#[test]
fn test_short_storage_rejected() {
    let (client, device) = create_cpu_client();
    let storage = Storage::<CpuRuntime>::new(2, &device).unwrap();
    let x = Tensor::from_parts(storage, Layout::contiguous(&[1, 4096, 64]));
    for c in [client.clone(), streaming(&client)] {
        assert!(matches!(
            c.lrn_window_sum(&x, 5),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}

#[test]
fn test_rank_two_input() {
    let (client, device) = create_cpu_client();
    let shape = [4, 6];
    let x = random_tensor::<CpuRuntime>(&shape, -1.0, 1.0, 5, &device);
    let out = client.lrn_window_sum(&x, 3).unwrap();
    assert_eq!(out.shape(), &shape);
    assert_allclose_f32(
        &out.to_vec(),
        &shifted_window_reference(&x.to_vec(), &shape, 3),
        1e-5,
        1e-6,
        "rank 2",
    );
}

#[test]
fn test_rank_one_rejected() {
    let (client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::from_slice(&[1.0, 2.0, 3.0], &[3], &device);
    assert!(matches!(
        client.lrn_window_sum(&x, 3),
        Err(Error::InvalidDimension { ndim: 1, .. })
    ));
}

#[test]
fn test_non_contiguous_rejected() {
    let (client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::from_slice(&[0.0; 8], &[2, 4], &device);
    let shape: Shape = [4usize, 2].into_iter().collect();
    let strides: Strides = [1isize, 4].into_iter().collect();
    let transposed = Tensor::from_parts(x.storage().clone(), Layout::new(shape, strides));
    assert!(matches!(
        client.lrn_window_sum(&transposed, 3),
        Err(Error::NotContiguous)
    ));
}

#[test]
fn test_empty_batch() {
    let (client, device) = create_cpu_client();
    let x = Tensor::<CpuRuntime>::empty(&[0, 5, 3], &device);
    for c in [client.clone(), streaming(&client)] {
        let out = c.lrn_window_sum(&x, 5).unwrap();
        assert_eq!(out.shape(), &[0, 5, 3]);
        assert!(out.to_vec().is_empty());
    }
}

#[test]
fn test_parallelism_settings_do_not_change_results() {
    let (client, device) = create_cpu_client();
    let shape = [3, 16, 5, 5];
    let x = random_tensor::<CpuRuntime>(&shape, -1.0, 1.0, 21, &device);

    let sequential = client
        .clone()
        .with_parallelism(ParallelismConfig::sequential())
        .unwrap();
    let pooled = client
        .clone()
        .with_parallelism(ParallelismConfig {
            num_threads: Some(3),
            min_len: 1,
        })
        .unwrap();

    for algorithm in [WindowSumAlgorithm::Shifted, WindowSumAlgorithm::Streaming] {
        let a = sequential
            .clone()
            .with_window_sum(algorithm)
            .lrn_window_sum(&x, 5)
            .unwrap();
        let b = pooled
            .clone()
            .with_window_sum(algorithm)
            .lrn_window_sum(&x, 5)
            .unwrap();
        assert_eq!(a.to_vec(), b.to_vec(), "{algorithm:?}");
    }
}
