// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vsync period switching.
//!
//! A mode change that alters the refresh period is requested with
//! [`VsyncPeriodChangeConstraints`] and answered by the device with a
//! [`VsyncPeriodChangeTimeline`]. The same timeline type arrives again through
//! the asynchronous timing-changed notification when the device revises its
//! plan.
//!
//! # Data flow
//!
//! 1. The pipeline picks a target mode and the earliest time it may apply.
//! 2. The device answers with the time the new period takes effect and
//!    whether a refresh frame must be presented first.
//! 3. If a refresh is required, the pipeline presents one frame no later than
//!    [`VsyncPeriodChangeTimeline::refresh_time`].

use crate::time::{Duration, HostTime};

/// Constraints on when a vsync period change may take effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VsyncPeriodChangeConstraints {
    /// Earliest time the new period may be applied.
    pub desired_time: HostTime,
    /// Whether the change must happen without a visible glitch.
    pub seamless_required: bool,
}

impl VsyncPeriodChangeConstraints {
    /// Constraints for a change that may apply at `now`, glitches allowed.
    #[inline]
    #[must_use]
    pub const fn immediate(now: HostTime) -> Self {
        Self {
            desired_time: now,
            seamless_required: false,
        }
    }
}

/// The device's plan for applying a vsync period change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct VsyncPeriodChangeTimeline {
    /// Time the first vsync with the new period occurs.
    pub new_vsync_applied_time: HostTime,
    /// Whether the pipeline must present a refresh frame first.
    pub refresh_required: bool,
    /// Deadline for the refresh frame, meaningful only if
    /// [`refresh_required`](Self::refresh_required) is set.
    pub refresh_time: HostTime,
}

impl VsyncPeriodChangeTimeline {
    /// Returns the refresh deadline, if a refresh frame is required.
    #[inline]
    #[must_use]
    pub const fn refresh_deadline(&self) -> Option<HostTime> {
        if self.refresh_required {
            Some(self.refresh_time)
        } else {
            None
        }
    }
}

/// Converts a vsync period to a refresh rate in millihertz.
///
/// Returns 0 for a zero period.
#[must_use]
pub const fn refresh_rate_millihertz(period: Duration) -> u64 {
    match period.ticks() {
        0 => 0,
        nanos => 1_000_000_000_000 / nanos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_deadline_only_when_required() {
        let mut timeline = VsyncPeriodChangeTimeline {
            new_vsync_applied_time: HostTime(100),
            refresh_required: false,
            refresh_time: HostTime(80),
        };
        assert_eq!(timeline.refresh_deadline(), None);
        timeline.refresh_required = true;
        assert_eq!(timeline.refresh_deadline(), Some(HostTime(80)));
    }

    #[test]
    fn refresh_rate_from_period() {
        assert_eq!(refresh_rate_millihertz(Duration(16_666_667)), 59_999);
        assert_eq!(refresh_rate_millihertz(Duration(8_333_333)), 120_000);
        assert_eq!(refresh_rate_millihertz(Duration::ZERO), 0);
    }
}
