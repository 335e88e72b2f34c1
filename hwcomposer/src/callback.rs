// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asynchronous notifications from the device.
//!
//! The device speaks [`DeviceCallback`]: raw handles, raw connection codes
//! and signed nanosecond timestamps, with two vsync flavours depending on
//! whether it supports vsync period switching. The display pipeline
//! implements [`ComposerCallback`], which receives typed values and a single
//! vsync method. [`CallbackBridge`] adapts one to the other and is built once,
//! when the pipeline registers.

use std::sync::Arc;

use hwcomposer_core::display::HwDisplayId;
use hwcomposer_core::hal::Connection;
use hwcomposer_core::time::{Duration, HostTime};
use hwcomposer_core::timing::VsyncPeriodChangeTimeline;

/// Raw notifications as delivered by the device.
pub trait DeviceCallback: Send + Sync {
    /// A display was attached or detached. `connection` is the raw code:
    /// 1 connected, 2 disconnected, anything else invalid.
    fn on_hotplug(&self, display: u64, connection: i32);

    /// The device asks for a new frame on `display`.
    fn on_refresh(&self, display: u64);

    /// Vsync from a device without vsync period switching.
    fn on_vsync(&self, display: u64, timestamp: i64);

    /// Vsync from a device with vsync period switching.
    fn on_vsync_with_period(&self, display: u64, timestamp: i64, vsync_period_nanos: u32);

    /// The device revised the timeline of a pending vsync period change.
    fn on_vsync_period_timing_changed(
        &self,
        display: u64,
        new_vsync_applied_time: i64,
        refresh_required: bool,
        refresh_time: i64,
    );

    /// A previously refused seamless mode change is now possible.
    fn on_seamless_possible(&self, display: u64);
}

/// Typed notifications for the display pipeline.
pub trait ComposerCallback: Send + Sync {
    /// A display was attached, detached, or the notification was malformed.
    fn on_hotplug_received(&self, display: HwDisplayId, connection: Connection);

    /// The device asks for a new frame.
    fn on_refresh_received(&self, display: HwDisplayId);

    /// A vsync occurred. `vsync_period` is set on devices with vsync period
    /// switching.
    fn on_vsync_received(
        &self,
        display: HwDisplayId,
        timestamp: i64,
        vsync_period: Option<Duration>,
    );

    /// The device revised a vsync period change timeline.
    fn on_vsync_period_timing_changed_received(
        &self,
        display: HwDisplayId,
        timeline: &VsyncPeriodChangeTimeline,
    );

    /// A seamless mode change is now possible.
    fn on_seamless_possible_received(&self, display: HwDisplayId);
}

/// Adapts raw [`DeviceCallback`] notifications to a [`ComposerCallback`].
///
/// A device reports vsync through exactly one of the two vsync methods. The
/// bridge forwards the flavour matching the device's vsync period switching
/// support and drops the other with a warning.
pub struct CallbackBridge {
    callback: Arc<dyn ComposerCallback>,
    vsync_switching_supported: bool,
}

impl CallbackBridge {
    /// Creates a bridge forwarding to `callback`.
    #[must_use]
    pub fn new(callback: Arc<dyn ComposerCallback>, vsync_switching_supported: bool) -> Self {
        Self {
            callback,
            vsync_switching_supported,
        }
    }
}

impl core::fmt::Debug for CallbackBridge {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CallbackBridge")
            .field("vsync_switching_supported", &self.vsync_switching_supported)
            .finish_non_exhaustive()
    }
}

fn connection_from_raw(raw: i32) -> Connection {
    match raw {
        1 => Connection::Connected,
        2 => Connection::Disconnected,
        _ => Connection::Invalid,
    }
}

impl DeviceCallback for CallbackBridge {
    fn on_hotplug(&self, display: u64, connection: i32) {
        self.callback
            .on_hotplug_received(HwDisplayId(display), connection_from_raw(connection));
    }

    fn on_refresh(&self, display: u64) {
        self.callback.on_refresh_received(HwDisplayId(display));
    }

    fn on_vsync(&self, hwc_display: u64, timestamp: i64) {
        if self.vsync_switching_supported {
            tracing::warn!(hwc_display, "unexpected vsync without period, ignoring");
            return;
        }
        self.callback
            .on_vsync_received(HwDisplayId(hwc_display), timestamp, None);
    }

    fn on_vsync_with_period(&self, hwc_display: u64, timestamp: i64, vsync_period_nanos: u32) {
        if !self.vsync_switching_supported {
            tracing::warn!(hwc_display, "unexpected vsync with period, ignoring");
            return;
        }
        self.callback.on_vsync_received(
            HwDisplayId(hwc_display),
            timestamp,
            Some(Duration(u64::from(vsync_period_nanos))),
        );
    }

    fn on_vsync_period_timing_changed(
        &self,
        display: u64,
        new_vsync_applied_time: i64,
        refresh_required: bool,
        refresh_time: i64,
    ) {
        let timeline = VsyncPeriodChangeTimeline {
            new_vsync_applied_time: HostTime::from_device_nanos(new_vsync_applied_time),
            refresh_required,
            refresh_time: HostTime::from_device_nanos(refresh_time),
        };
        self.callback
            .on_vsync_period_timing_changed_received(HwDisplayId(display), &timeline);
    }

    fn on_seamless_possible(&self, display: u64) {
        self.callback
            .on_seamless_possible_received(HwDisplayId(display));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingCallback;

    #[test]
    fn hotplug_codes_are_typed() {
        let callback = Arc::new(RecordingCallback::default());
        let bridge = CallbackBridge::new(callback.clone(), false);
        bridge.on_hotplug(3, 1);
        bridge.on_hotplug(3, 2);
        bridge.on_hotplug(3, 0);
        assert_eq!(
            callback.hotplugs(),
            vec![
                (HwDisplayId(3), Connection::Connected),
                (HwDisplayId(3), Connection::Disconnected),
                (HwDisplayId(3), Connection::Invalid),
            ]
        );
    }

    #[test]
    fn legacy_device_forwards_only_plain_vsync() {
        let callback = Arc::new(RecordingCallback::default());
        let bridge = CallbackBridge::new(callback.clone(), false);
        bridge.on_vsync(1, 100);
        bridge.on_vsync_with_period(1, 200, 16_666_666);
        assert_eq!(callback.vsyncs(), vec![(HwDisplayId(1), 100, None)]);
    }

    #[test]
    fn switching_device_forwards_only_vsync_with_period() {
        let callback = Arc::new(RecordingCallback::default());
        let bridge = CallbackBridge::new(callback.clone(), true);
        bridge.on_vsync(1, 100);
        bridge.on_vsync_with_period(1, 200, 8_333_333);
        assert_eq!(
            callback.vsyncs(),
            vec![(HwDisplayId(1), 200, Some(Duration(8_333_333)))]
        );
    }

    #[test]
    fn timing_change_converts_timestamps() {
        let callback = Arc::new(RecordingCallback::default());
        let bridge = CallbackBridge::new(callback.clone(), true);
        bridge.on_vsync_period_timing_changed(4, 1_000, true, -5);
        let timelines = callback.timelines();
        assert_eq!(timelines.len(), 1);
        let (display, timeline) = timelines[0];
        assert_eq!(display, HwDisplayId(4));
        assert_eq!(timeline.new_vsync_applied_time, HostTime(1_000));
        assert_eq!(timeline.refresh_deadline(), Some(HostTime(0)));
    }

    #[test]
    fn refresh_and_seamless_pass_through() {
        let callback = Arc::new(RecordingCallback::default());
        let bridge = CallbackBridge::new(callback.clone(), false);
        bridge.on_refresh(2);
        bridge.on_seamless_possible(5);
        assert_eq!(callback.refreshes(), vec![HwDisplayId(2)]);
        assert_eq!(callback.seamless(), vec![HwDisplayId(5)]);
    }
}
