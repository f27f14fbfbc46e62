//! Channel-window sum kernels
//!
//! Both kernels compute, for every element `(b, c, r)` of a `(batch, channels, rdim)`
//! buffer, a sum of the same-position elements over a window of neighbouring
//! channels. They differ in window placement for even widths:
//!
//! - shifted: channels `[c - n/2, c + n/2]` (width `n + 1` when `n` is even)
//! - streaming: channels `[c - n/2 + 1, c + n/2]` (always width `n`)
//!
//! For odd `n` both windows are `[c - (n-1)/2, c + (n-1)/2]`.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::ops::ChannelGeometry;
use crate::runtime::cpu::CpuClient;

/// Shifted-slice window sum over one `(channels, rdim)` plane
///
/// Starts from a copy of the input and, for each offset `i` in `1..=n/2`,
/// adds the plane shifted down by `i` channels and shifted up by `i` channels.
/// Offsets at or past `channels` contribute nothing.
///
/// # Safety
/// - `input` and `out` must be valid for `channels * rdim` elements
/// - `input` and `out` must not overlap
#[inline]
unsafe fn shifted_plane(
    input: *const f32,
    out: *mut f32,
    channels: usize,
    rdim: usize,
    half: usize,
) {
    let plane = channels * rdim;
    let src = std::slice::from_raw_parts(input, plane);
    let dst = std::slice::from_raw_parts_mut(out, plane);
    dst.copy_from_slice(src);

    for i in 1..=half.min(channels.saturating_sub(1)) {
        let shift = i * rdim;
        let len = plane - shift;

        // channel c += channel c - i
        for (o, &v) in dst[shift..].iter_mut().zip(&src[..len]) {
            *o += v;
        }
        // channel c += channel c + i
        for (o, &v) in dst[..len].iter_mut().zip(&src[shift..]) {
            *o += v;
        }
    }
}

/// Host window sum using shifted whole-plane additions
///
/// Batch planes are independent and run in parallel when the `rayon` feature
/// is enabled.
///
/// # Safety
/// - `input` and `out` must be valid for `geom.numel()` elements
/// - `input` and `out` must not overlap
pub unsafe fn window_sum_shifted_kernel(
    client: &CpuClient,
    input: *const f32,
    out: *mut f32,
    geom: ChannelGeometry,
    n: usize,
) {
    let plane = geom.plane();
    if plane == 0 || geom.batch == 0 {
        return;
    }
    let half = n / 2;

    #[cfg(feature = "rayon")]
    {
        // Raw pointers are not Send; pass addresses and rebuild per task
        let in_addr = input as usize;
        let out_addr = out as usize;
        let planes_per_task = (client.rayon_min_len() / plane).max(1);

        client.install_parallelism(|| {
            (0..geom.batch)
                .into_par_iter()
                .with_min_len(planes_per_task)
                .for_each(|b| unsafe {
                    shifted_plane(
                        (in_addr as *const f32).add(b * plane),
                        (out_addr as *mut f32).add(b * plane),
                        geom.channels,
                        geom.rdim,
                        half,
                    );
                });
        });
    }

    #[cfg(not(feature = "rayon"))]
    {
        let _ = client;
        for b in 0..geom.batch {
            shifted_plane(
                input.add(b * plane),
                out.add(b * plane),
                geom.channels,
                geom.rdim,
                half,
            );
        }
    }
}

/// Running window sum down one channel column
///
/// Walks `channels + n/2` steps: each step adds the entering channel (while
/// in range), drops the channel that left the window `n` steps ago, and once
/// `n/2` steps in writes the sum for the channel `n/2` behind the cursor.
/// With `n == 0` every entry is added and dropped in the same step, so the
/// column comes out all zeros.
///
/// # Safety
/// - `input` and `out` must be valid for the full `(batch, channels, rdim)` buffer
/// - no other thread may write the column owned by `lane`
#[inline]
unsafe fn streaming_lane(input: *const f32, out: *mut f32, lane: usize, geom: ChannelGeometry, n: usize) {
    let ChannelGeometry { channels, rdim, .. } = geom;
    let half = n / 2;
    let offset = lane / rdim * channels * rdim + lane % rdim;
    let xi = input.add(offset);
    let yi = out.add(offset);

    let mut sum_part = 0.0f32;
    for j in 0..channels + half {
        if j < channels {
            sum_part += *xi.add(j * rdim);
        }
        if j >= n {
            sum_part -= *xi.add((j - n) * rdim);
        }
        if j >= half {
            *yi.add((j - half) * rdim) = sum_part;
        }
    }
}

/// Host window sum with one sequential pass per `(batch, position)` lane
///
/// Same arithmetic as the CUDA `lrn_window_sum_f32` kernel, so host and
/// device results agree for every `n`.
///
/// # Safety
/// - `input` and `out` must be valid for `geom.numel()` elements
/// - `input` and `out` must not overlap
pub unsafe fn window_sum_streaming_kernel(
    client: &CpuClient,
    input: *const f32,
    out: *mut f32,
    geom: ChannelGeometry,
    n: usize,
) {
    let lanes = geom.lanes();
    if lanes == 0 || geom.channels == 0 {
        return;
    }
    let n = geom.clamp_width(n);

    #[cfg(feature = "rayon")]
    {
        let in_addr = input as usize;
        let out_addr = out as usize;
        let min_len = client.rayon_min_len();

        client.install_parallelism(|| {
            (0..lanes)
                .into_par_iter()
                .with_min_len(min_len)
                .for_each(|lane| unsafe {
                    streaming_lane(in_addr as *const f32, out_addr as *mut f32, lane, geom, n);
                });
        });
    }

    #[cfg(not(feature = "rayon"))]
    {
        let _ = client;
        for lane in 0..lanes {
            streaming_lane(input, out, lane, geom, n);
        }
    }
}
