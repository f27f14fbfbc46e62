//! Element-wise LRN kernels
//!
//! The window sum itself lives in [`super::window_sum`]; these kernels cover
//! the point-wise stages around it.

/// How `scale^-beta` is evaluated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowMode {
    /// `f32::powf`
    Exact,
    /// `exp2(exp * log2(base))`, the CUDA `__powf` formulation
    Fast,
}

impl PowMode {
    #[inline(always)]
    fn pow(self, base: f32, exp: f32) -> f32 {
        match self {
            PowMode::Exact => base.powf(exp),
            PowMode::Fast => (exp * base.log2()).exp2(),
        }
    }
}

/// out[i] = x[i]^2
///
/// # Safety
/// - `x` and `out` must be valid for `len` elements
#[inline]
pub unsafe fn square_kernel(x: *const f32, out: *mut f32, len: usize) {
    if len == 0 {
        return;
    }
    let x = std::slice::from_raw_parts(x, len);
    let out = std::slice::from_raw_parts_mut(out, len);
    for (o, &v) in out.iter_mut().zip(x) {
        *o = v * v;
    }
}

/// Forward finish: turns the window sum into `scale` in place and writes `y`
///
/// `scale[i] = k + alpha * scale[i]`, `y[i] = x[i] * scale[i]^-beta`
///
/// # Safety
/// - `x`, `scale` and `y` must be valid for `len` elements
/// - `y` may alias neither `x` nor `scale`
#[inline]
#[allow(clippy::too_many_arguments)]
pub unsafe fn lrn_forward_kernel(
    x: *const f32,
    scale: *mut f32,
    y: *mut f32,
    len: usize,
    k: f32,
    alpha: f32,
    beta: f32,
    pow: PowMode,
) {
    if len == 0 {
        return;
    }
    let x = std::slice::from_raw_parts(x, len);
    let scale = std::slice::from_raw_parts_mut(scale, len);
    let y = std::slice::from_raw_parts_mut(y, len);

    for ((&xi, s), yi) in x.iter().zip(scale.iter_mut()).zip(y.iter_mut()) {
        *s = k + alpha * *s;
        *yi = xi * pow.pow(*s, -beta);
    }
}

/// summand[i] = y[i] * grad_y[i] / scale[i]
///
/// # Safety
/// - all pointers must be valid for `len` elements
#[inline]
pub unsafe fn lrn_backward_summand_kernel(
    y: *const f32,
    grad_y: *const f32,
    scale: *const f32,
    summand: *mut f32,
    len: usize,
) {
    if len == 0 {
        return;
    }
    let y = std::slice::from_raw_parts(y, len);
    let gy = std::slice::from_raw_parts(grad_y, len);
    let scale = std::slice::from_raw_parts(scale, len);
    let summand = std::slice::from_raw_parts_mut(summand, len);

    for (i, out) in summand.iter_mut().enumerate() {
        *out = y[i] * gy[i] / scale[i];
    }
}

/// Backward finish: `gx[i] = gy[i] * scale[i]^-beta - coeff * x[i] * gx[i]`
///
/// `gx` holds the window sum of the summand on entry and the input gradient
/// on return; `coeff` is `2 * alpha * beta`.
///
/// # Safety
/// - all pointers must be valid for `len` elements
#[inline]
#[allow(clippy::too_many_arguments)]
pub unsafe fn lrn_backward_kernel(
    x: *const f32,
    grad_y: *const f32,
    scale: *const f32,
    gx: *mut f32,
    len: usize,
    beta: f32,
    coeff: f32,
    pow: PowMode,
) {
    if len == 0 {
        return;
    }
    let x = std::slice::from_raw_parts(x, len);
    let gy = std::slice::from_raw_parts(grad_y, len);
    let scale = std::slice::from_raw_parts(scale, len);
    let gx = std::slice::from_raw_parts_mut(gx, len);

    for (i, g) in gx.iter_mut().enumerate() {
        *g = gy[i] * pow.pow(scale[i], -beta) - coeff * x[i] * *g;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_pow_close_to_exact() {
        for &base in &[0.5f32, 1.0, 2.0, 3.7, 100.0] {
            for &exp in &[-0.75f32, -0.5, -1.0, -2.5] {
                let exact = PowMode::Exact.pow(base, exp);
                let fast = PowMode::Fast.pow(base, exp);
                assert!((exact - fast).abs() <= 1e-5 * exact.abs().max(1.0), "{base}^{exp}");
            }
        }
    }

    #[test]
    fn test_forward_kernel() {
        let x = [1.0f32, -2.0, 3.0];
        let mut scale = [0.0f32, 1.0, 2.0];
        let mut y = [0.0f32; 3];
        unsafe {
            lrn_forward_kernel(
                x.as_ptr(),
                scale.as_mut_ptr(),
                y.as_mut_ptr(),
                3,
                1.0,
                0.5,
                1.0,
                PowMode::Exact,
            );
        }
        assert_eq!(scale, [1.0, 1.5, 2.0]);
        assert!((y[0] - 1.0).abs() < 1e-6);
        assert!((y[1] + 2.0 / 1.5).abs() < 1e-6);
        assert!((y[2] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_backward_kernels() {
        let x = [1.0f32, 2.0];
        let y = [0.5f32, 1.0];
        let gy = [1.0f32, -1.0];
        let scale = [2.0f32, 4.0];
        let mut buf = [0.0f32; 2];
        unsafe {
            lrn_backward_summand_kernel(y.as_ptr(), gy.as_ptr(), scale.as_ptr(), buf.as_mut_ptr(), 2);
        }
        assert_eq!(buf, [0.25, -0.25]);

        unsafe {
            lrn_backward_kernel(
                x.as_ptr(),
                gy.as_ptr(),
                scale.as_ptr(),
                buf.as_mut_ptr(),
                2,
                1.0,
                0.5,
                PowMode::Exact,
            );
        }
        // 1 * 2^-1 - 0.5 * 1 * 0.25, -1 * 4^-1 - 0.5 * 2 * -0.25
        assert!((buf[0] - 0.375).abs() < 1e-6);
        assert!((buf[1] - 0.0).abs() < 1e-6);
    }
}
