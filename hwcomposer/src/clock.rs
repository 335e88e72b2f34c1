// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host clock reads and present pacing.
//!
//! Host ticks are `CLOCK_MONOTONIC` nanoseconds, the clock the device uses
//! for vsync timestamps and fence signal times.

use rustix::time::{ClockId, Timespec, clock_gettime};

use hwcomposer_core::time::{HostTime, Timebase};

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Returns the composer [`Timebase`]: host ticks are nanoseconds.
#[must_use]
pub const fn timebase() -> Timebase {
    Timebase::NANOS
}

/// Returns the current monotonic host time in nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    timespec_to_host_time(clock_gettime(ClockId::Monotonic))
}

fn timespec_to_host_time(timespec: Timespec) -> HostTime {
    let seconds = u64::try_from(timespec.tv_sec).unwrap_or(0);
    let nanos = u64::try_from(timespec.tv_nsec)
        .unwrap_or(0)
        .min(999_999_999);

    let ticks_u128 = u128::from(seconds)
        .saturating_mul(NANOS_PER_SECOND)
        .saturating_add(u128::from(nanos));
    let ticks = u64::try_from(ticks_u128).unwrap_or(u64::MAX);
    HostTime(ticks)
}

/// Blocks the frame thread until the earliest allowed present time.
pub trait Pacer: Send + Sync {
    /// Current host time.
    fn now(&self) -> HostTime;

    /// Blocks the calling thread until `deadline`. Returns immediately if the
    /// deadline has passed.
    fn sleep_until(&self, deadline: HostTime);
}

/// [`Pacer`] backed by `CLOCK_MONOTONIC`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonotonicPacer;

impl Pacer for MonotonicPacer {
    fn now(&self) -> HostTime {
        now()
    }

    fn sleep_until(&self, deadline: HostTime) {
        // `thread::sleep` may wake early on some platforms.
        loop {
            let remaining = deadline.saturating_duration_since(now());
            if remaining.ticks() == 0 {
                return;
            }
            std::thread::sleep(std::time::Duration::from_nanos(
                remaining.to_nanos(timebase()),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwcomposer_core::time::Duration;

    #[test]
    fn timebase_is_nanos_identity() {
        assert_eq!(timebase(), Timebase::NANOS);
    }

    #[test]
    fn now_is_monotonic_non_decreasing() {
        let first = now();
        let second = now();
        assert!(second >= first, "monotonic clock should not go backwards");
    }

    #[test]
    fn timespec_conversion_builds_nanosecond_ticks() {
        let input = Timespec {
            tv_sec: 12,
            tv_nsec: 345_678_901,
        };
        let expected = HostTime(12 * 1_000_000_000 + 345_678_901);
        assert_eq!(timespec_to_host_time(input), expected);
    }

    #[test]
    fn timespec_conversion_saturates_on_large_values() {
        let input = Timespec {
            tv_sec: i64::MAX,
            tv_nsec: 999_999_999,
        };
        assert_eq!(timespec_to_host_time(input), HostTime(u64::MAX));
    }

    #[test]
    fn pacer_sleeps_until_deadline() {
        let pacer = MonotonicPacer;
        let deadline = pacer.now() + Duration(2_000_000);
        pacer.sleep_until(deadline);
        assert!(pacer.now() >= deadline, "woke before the deadline");
    }

    #[test]
    fn pacer_returns_immediately_for_past_deadline() {
        let pacer = MonotonicPacer;
        pacer.sleep_until(HostTime(0));
    }
}
