//! Interrupt-sourced encoder tick counters.
//!
//! Two independent counters, each incremented by one per rising edge on its
//! own channel from interrupt (or driver-thread) context. The tick context
//! reads them through `snapshot()` once per control tick and drains them
//! with `take()` after every completed cell-advance and maneuver. `take()`
//! swaps the counter to zero atomically, so an edge delivered between the
//! read and the reset is never lost or double-counted.

use std::sync::atomic::{AtomicU32, Ordering};

/// Counts read from the two channels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncoderSnapshot {
    pub left: u32,
    pub right: u32,
}

/// Pair of atomic edge counters shared between interrupt and tick contexts
#[derive(Debug, Default)]
pub struct EncoderBank {
    left: AtomicU32,
    right: AtomicU32,
}

impl EncoderBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// One rising edge on the left channel (interrupt-safe)
    #[inline]
    pub fn increment_left(&self) {
        self.left.fetch_add(1, Ordering::Relaxed);
    }

    /// One rising edge on the right channel (interrupt-safe)
    #[inline]
    pub fn increment_right(&self) {
        self.right.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counts without resetting
    pub fn snapshot(&self) -> EncoderSnapshot {
        EncoderSnapshot {
            left: self.left.load(Ordering::Relaxed),
            right: self.right.load(Ordering::Relaxed),
        }
    }

    /// Drain both counters to zero, returning the counts removed
    pub fn take(&self) -> EncoderSnapshot {
        EncoderSnapshot {
            left: self.left.swap(0, Ordering::Relaxed),
            right: self.right.swap(0, Ordering::Relaxed),
        }
    }
}
