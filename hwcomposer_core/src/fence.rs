// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared synchronization handles.
//!
//! A [`Fence`] stands for "signals when an operation completes". Clones share
//! the same underlying state; the state is released when the last clone is
//! dropped. [`Fence::NO_FENCE`] is the sentinel meaning no wait is required.

use alloc::sync::Arc;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::time::HostTime;

const SIGNAL_TIME_PENDING: u64 = u64::MAX;

/// Observed state of a fence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalTime {
    /// The fence is the [`Fence::NO_FENCE`] sentinel.
    Invalid,
    /// The fence has not signaled yet.
    Pending,
    /// The fence signaled at the given time.
    Signaled(HostTime),
}

struct FenceState {
    signal_time: AtomicU64,
}

/// A shared-ownership synchronization handle.
#[derive(Clone, Default)]
pub struct Fence(Option<Arc<FenceState>>);

impl Fence {
    /// The sentinel fence: nothing to wait for.
    pub const NO_FENCE: Self = Self(None);

    /// Creates a fence that has not signaled yet.
    #[must_use]
    pub fn pending() -> Self {
        Self(Some(Arc::new(FenceState {
            signal_time: AtomicU64::new(SIGNAL_TIME_PENDING),
        })))
    }

    /// Creates a fence that already signaled at `at`.
    #[must_use]
    pub fn signaled(at: HostTime) -> Self {
        let fence = Self::pending();
        fence.signal(at);
        fence
    }

    /// Marks the fence as signaled at `at`.
    ///
    /// The first signal wins; later calls and calls on the sentinel do
    /// nothing. `u64::MAX` is reserved for the pending state and is stored as
    /// one tick earlier.
    pub fn signal(&self, at: HostTime) {
        if let Some(state) = &self.0 {
            let ticks = at.ticks().min(SIGNAL_TIME_PENDING - 1);
            _ = state.signal_time.compare_exchange(
                SIGNAL_TIME_PENDING,
                ticks,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
    }

    /// Returns the current signal state.
    #[must_use]
    pub fn signal_time(&self) -> SignalTime {
        match &self.0 {
            None => SignalTime::Invalid,
            Some(state) => match state.signal_time.load(Ordering::Acquire) {
                SIGNAL_TIME_PENDING => SignalTime::Pending,
                ticks => SignalTime::Signaled(HostTime(ticks)),
            },
        }
    }

    /// Returns `true` unless this is the sentinel.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    /// Returns `true` if the fence has not signaled yet.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.signal_time() == SignalTime::Pending
    }
}

impl PartialEq for Fence {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Fence {}

impl fmt::Debug for Fence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.signal_time() {
            SignalTime::Invalid => f.write_str("Fence::NO_FENCE"),
            state => f.debug_tuple("Fence").field(&state).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_invalid_and_not_pending() {
        assert_eq!(Fence::NO_FENCE.signal_time(), SignalTime::Invalid);
        assert!(!Fence::NO_FENCE.is_pending());
        assert_eq!(Fence::default(), Fence::NO_FENCE);
    }

    #[test]
    fn first_signal_wins() {
        let fence = Fence::pending();
        assert!(fence.is_pending());
        fence.signal(HostTime(10));
        fence.signal(HostTime(20));
        assert_eq!(fence.signal_time(), SignalTime::Signaled(HostTime(10)));
    }

    #[test]
    fn clones_share_state() {
        let a = Fence::pending();
        let b = a.clone();
        assert_eq!(a, b);
        a.signal(HostTime(5));
        assert_eq!(b.signal_time(), SignalTime::Signaled(HostTime(5)));
        assert_ne!(a, Fence::pending());
    }
}
