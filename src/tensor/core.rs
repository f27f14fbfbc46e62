//! Core Tensor type

use super::{Layout, Storage, TensorId};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::fmt;

/// N-dimensional `f32` array stored on a compute device
///
/// `Tensor` consists of:
/// - **Storage**: Reference-counted device memory
/// - **Layout**: Shape and strides defining the view into storage
///
/// Cloning a tensor shares its storage; only `reshape` produces a new view.
///
/// # Example
///
/// ```ignore
/// use numr_lrn::prelude::*;
///
/// let device = CpuDevice::new();
/// let a = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[1, 4], &device);
/// let b = a.reshape(&[1, 2, 2])?; // Zero-copy, shares storage with a
/// ```
pub struct Tensor<R: Runtime> {
    /// Unique ID for autograd tracking
    id: TensorId,
    storage: Storage<R>,
    layout: Layout,
}

impl<R: Runtime> Tensor<R> {
    /// Create a tensor from storage and layout
    pub fn from_parts(storage: Storage<R>, layout: Layout) -> Self {
        Self {
            id: TensorId::new(),
            storage,
            layout,
        }
    }

    /// Create a tensor from a slice of data
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not equal the product of the `shape` dimensions.
    /// For a fallible alternative, use [`Self::try_from_slice`].
    pub fn from_slice(data: &[f32], shape: &[usize], device: &R::Device) -> Self {
        Self::try_from_slice(data, shape, device).expect("Tensor::from_slice failed")
    }

    /// Create a tensor from a slice of data (fallible version)
    ///
    /// Returns an error if `data.len()` does not equal the product of the `shape` dimensions,
    /// or if memory allocation fails.
    pub fn try_from_slice(data: &[f32], shape: &[usize], device: &R::Device) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                got: vec![data.len()],
            });
        }

        let storage = Storage::from_slice(data, device)?;
        Ok(Self::from_parts(storage, Layout::contiguous(shape)))
    }

    /// Create a tensor whose contents will be overwritten by a kernel
    ///
    /// Contents are unspecified on GPU backends; read only after writing.
    pub fn empty(shape: &[usize], device: &R::Device) -> Self {
        Self::try_empty(shape, device).expect("Tensor::empty failed")
    }

    /// Create a tensor whose contents will be overwritten by a kernel (fallible version)
    pub fn try_empty(shape: &[usize], device: &R::Device) -> Result<Self> {
        let len: usize = shape.iter().product();
        let storage = Storage::new(len, device)?;
        Ok(Self::from_parts(storage, Layout::contiguous(shape)))
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize], device: &R::Device) -> Self {
        Self::full_scalar(shape, 0.0, device)
    }

    /// Create a tensor filled with a scalar value
    pub fn full_scalar(shape: &[usize], value: f32, device: &R::Device) -> Self {
        Self::try_full_scalar(shape, value, device).expect("Tensor::full_scalar failed")
    }

    /// Create a tensor filled with a scalar value (fallible version)
    pub fn try_full_scalar(shape: &[usize], value: f32, device: &R::Device) -> Result<Self> {
        let len: usize = shape.iter().product();
        Self::try_from_slice(&vec![value; len], shape, device)
    }

    // ===== Accessors =====

    /// Get the tensor ID
    #[inline]
    pub fn id(&self) -> TensorId {
        self.id
    }

    /// Get the storage
    #[inline]
    pub fn storage(&self) -> &Storage<R> {
        &self.storage
    }

    /// Get the layout
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    /// Get the number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    /// Get the total number of elements
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.elem_count()
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        self.storage.device()
    }

    /// Check if the tensor is contiguous in memory
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    /// Get size along a dimension (supports negative indexing)
    pub fn size(&self, dim: isize) -> Option<usize> {
        self.layout.dim(dim)
    }

    // ===== View Operations (Zero-Copy) =====

    /// Reshape to a new shape (zero-copy, requires a contiguous tensor)
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        if shape.iter().product::<usize>() != self.numel() {
            return Err(Error::shape_mismatch(shape, self.shape()));
        }
        let new_layout = self.layout.reshape(shape).ok_or(Error::NotContiguous)?;

        Ok(Self::from_parts(self.storage.clone(), new_layout))
    }

    /// Detach from computation graph (for autograd)
    pub fn detach(&self) -> Self {
        Self::from_parts(self.storage.clone(), self.layout.clone())
    }

    // ===== Data Access =====

    /// Copy tensor data to a Vec on the host
    ///
    /// # Panics
    ///
    /// Panics if the device-to-host copy fails. Use [`Self::try_to_vec`] to
    /// handle the error instead.
    pub fn to_vec(&self) -> Vec<f32> {
        self.try_to_vec().expect("copy_from_device failed in to_vec()")
    }

    /// Copy tensor data to a Vec on the host (fallible version)
    pub fn try_to_vec(&self) -> Result<Vec<f32>> {
        if !self.is_contiguous() {
            return Err(Error::NotContiguous);
        }
        self.storage.to_vec()
    }
}

impl<R: Runtime> Clone for Tensor<R> {
    /// Clone creates a new tensor sharing the same storage (zero-copy)
    fn clone(&self) -> Self {
        Self::from_parts(self.storage.clone(), self.layout.clone())
    }
}

impl<R: Runtime> fmt::Debug for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.id)
            .field("shape", &self.shape())
            .field("contiguous", &self.is_contiguous())
            .finish()
    }
}

impl<R: Runtime> fmt::Display for Tensor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor({:?}, dtype=f32)", self.shape())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::{CpuDevice, CpuRuntime};

    #[test]
    fn test_from_slice() {
        let device = CpuDevice::new();
        let data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let tensor = Tensor::<CpuRuntime>::from_slice(&data, &[1, 2, 3], &device);

        assert_eq!(tensor.shape(), &[1, 2, 3]);
        assert!(tensor.is_contiguous());
        assert_eq!(tensor.numel(), 6);
        assert_eq!(tensor.to_vec(), data);
    }

    #[test]
    fn test_try_from_slice_length_mismatch() {
        let device = CpuDevice::new();
        let result = Tensor::<CpuRuntime>::try_from_slice(&[1.0, 2.0, 3.0], &[2, 2], &device);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_reshape_shares_storage() {
        let device = CpuDevice::new();
        let data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let tensor = Tensor::<CpuRuntime>::from_slice(&data, &[1, 2, 3], &device);

        let reshaped = tensor.reshape(&[1, 3, 2]).unwrap();
        assert_eq!(reshaped.shape(), &[1, 3, 2]);
        assert_eq!(reshaped.storage().ptr(), tensor.storage().ptr());
        assert_eq!(reshaped.to_vec(), data);
        assert_ne!(reshaped.id(), tensor.id());
    }

    #[test]
    fn test_reshape_wrong_numel() {
        let device = CpuDevice::new();
        let tensor = Tensor::<CpuRuntime>::zeros(&[2, 3], &device);
        assert!(matches!(
            tensor.reshape(&[4, 2]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_zeros_and_full() {
        let device = CpuDevice::new();
        let zeros = Tensor::<CpuRuntime>::zeros(&[2, 3], &device);
        assert_eq!(zeros.to_vec(), [0.0; 6]);

        let full = Tensor::<CpuRuntime>::full_scalar(&[2, 2], 2.5, &device);
        assert_eq!(full.to_vec(), [2.5; 4]);
    }

    #[test]
    fn test_empty_tensor() {
        let device = CpuDevice::new();
        let tensor = Tensor::<CpuRuntime>::empty(&[2, 0, 3], &device);
        assert_eq!(tensor.numel(), 0);
        assert!(tensor.to_vec().is_empty());
    }
}
