//! Host device handle

use crate::runtime::Device;

/// The host CPU
///
/// There is a single host memory space, so every `CpuDevice` compares equal
/// and carries no state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CpuDevice;

impl CpuDevice {
    /// Handle to the host
    pub fn new() -> Self {
        Self
    }
}

impl Device for CpuDevice {
    fn id(&self) -> usize {
        0
    }

    fn name(&self) -> String {
        "cpu".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_host_device() {
        let a = CpuDevice::new();
        let b = CpuDevice::default();
        assert!(a.is_same(&b));
        assert_eq!(a.name(), "cpu");
    }
}
