//! Long-poll waiter identifier.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for waiter ID generation.
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of one registered long-poll waiter.
///
/// Displayed as `wait-XXXXXXXX` where X is a hexadecimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaiterId(u64);

impl WaiterId {
    /// Allocate the next waiter ID.
    pub fn next() -> Self {
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for WaiterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wait-{:08x}", self.0)
    }
}
