// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vsync filtering and vsync enable state.

use hwcomposer_core::display::{DisplayId, HwDisplayId, PhysicalDisplayId};
use hwcomposer_core::hal::Vsync;
use hwcomposer_core::time::{Duration, HostTime};
use hwcomposer_core::trace::{VsyncEnabledEvent, VsyncEvent};

use crate::HwComposer;
use crate::error::{self, Result};

impl HwComposer {
    /// Filters a raw vsync.
    ///
    /// Returns `true` if the vsync should be forwarded to the pipeline. Vsyncs
    /// from unknown handles and repeats of the previous timestamp are dropped.
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to a virtual display.
    pub fn on_vsync(&self, hw_display: HwDisplayId, timestamp: i64) -> bool {
        let Some(id) = self.registry.to_physical_display_id(hw_display) else {
            tracing::error!(hwc_display = hw_display.0, "vsync from unknown display handle");
            return false;
        };
        let Some(record) = self.registry.lookup(DisplayId::Physical(id)) else {
            tracing::error!(display = %id, "vsync for display without record");
            return false;
        };
        assert!(!record.is_virtual, "vsync reported for virtual display {id}");

        let toggle = {
            let mut vsync = record.vsync.lock();
            if vsync.last_hw_vsync == Some(timestamp) {
                tracing::warn!(display = %id, timestamp, "ignoring duplicate vsync");
                return false;
            }
            vsync.last_hw_vsync = Some(timestamp);
            let toggle = vsync.toggle;
            vsync.toggle = !toggle;
            toggle
        };

        self.trace(|sink| {
            sink.on_vsync(&VsyncEvent {
                display: id,
                timestamp: HostTime::from_device_nanos(timestamp),
                toggle,
            });
        });
        true
    }

    /// Enables or disables vsync delivery for a physical display.
    ///
    /// Does nothing when the display is already in the requested state. The
    /// cached state changes only when the device accepts the request.
    pub fn set_vsync_enabled(&self, id: PhysicalDisplayId, enabled: Vsync) -> Result<()> {
        let record = self.physical_record(id, "setVsyncEnabled")?;

        let mut current = record.vsync_enabled.lock();
        if *current == enabled {
            return Ok(());
        }
        self.device
            .set_vsync_enabled(record.hw_id, enabled)
            .map_err(|error| error::device("setVsyncEnabled", id.into(), error))?;
        *current = enabled;
        drop(current);

        tracing::debug!(display = %id, ?enabled, "vsync delivery changed");
        self.trace(|sink| {
            sink.on_vsync_enabled(&VsyncEnabledEvent {
                display: id,
                enabled: enabled == Vsync::Enable,
            });
        });
        Ok(())
    }

    /// Whether the device can switch vsync periods on `display`.
    pub fn is_vsync_period_switch_supported(&self, display: DisplayId) -> Result<bool> {
        self.record(display)?;
        Ok(self.device.is_vsync_period_switch_supported())
    }

    /// Current vsync period of `id`.
    ///
    /// Fails with [`Error::Unsupported`](error::Error::Unsupported) without
    /// asking the device when it cannot switch vsync periods.
    pub fn get_display_vsync_period(&self, id: DisplayId) -> Result<Duration> {
        const OP: &str = "getDisplayVsyncPeriod";
        let record = self.record(id)?;

        if !self.device.is_vsync_period_switch_supported() {
            tracing::error!(display = %id, "vsync period switching is not supported");
            return Err(error::Error::Unsupported { op: OP, display: id });
        }
        self.device
            .display_vsync_period(record.hw_id)
            .map_err(|error| error::classified(OP, id, error))
    }
}
