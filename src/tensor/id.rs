//! Process-unique tensor identity

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of one tensor handle
///
/// Every constructor, `clone` and `reshape` mints a fresh id even when the
/// storage is shared, so [`crate::autograd::GradFn::inputs`] can name the
/// exact handle a gradient belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TensorId(NonZeroU64);

impl TensorId {
    /// Mint a new id
    #[inline]
    pub fn new() -> Self {
        let raw = COUNTER.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and would need 2^64 tensors to wrap
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    /// Numeric value of the id
    #[inline]
    pub fn raw(self) -> u64 {
        self.0.get()
    }
}

impl Default for TensorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
