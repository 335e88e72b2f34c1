// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instrumentation for the display and frame paths.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! composer calls at each stage: vsync delivery, vsync enable changes, hotplug
//! outcomes, composition negotiation and present. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! The vsync events carry the alternating counter values a systrace-style
//! viewer renders as `HW_VSYNC_<display>` and `HW_VSYNC_ON_<display>` tracks.

use crate::changes::PresentOrValidateState;
use crate::display::{DisplayId, HwDisplayId, PhysicalDisplayId};
use crate::hal;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which step of a frame is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Present-or-validate or explicit validate, plus the change queries.
    Validate,
    /// Sleeping until the earliest allowed present time.
    PresentWait,
    /// The present call and release fence collection.
    Present,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every vsync forwarded by the filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VsyncEvent {
    /// Display the vsync belongs to.
    pub display: PhysicalDisplayId,
    /// Device timestamp of the vsync.
    pub timestamp: HostTime,
    /// Alternating counter value; flips on every forwarded vsync.
    pub toggle: bool,
}

/// Emitted when vsync delivery is switched on or off for a display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VsyncEnabledEvent {
    /// Display whose vsync state changed.
    pub display: PhysicalDisplayId,
    /// New state.
    pub enabled: bool,
}

/// Emitted when a hotplug notification resolves to an identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HotplugEvent {
    /// Device handle from the notification.
    pub hw_display: HwDisplayId,
    /// Resolved identity.
    pub display: PhysicalDisplayId,
    /// `true` for connect, `false` for disconnect.
    pub connected: bool,
}

/// Emitted once validation for a frame has completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidateEvent {
    /// Display being composed.
    pub display: DisplayId,
    /// Which path the device took.
    pub state: PresentOrValidateState,
    /// Number of layers whose composition type changed.
    pub num_types: u32,
    /// Number of layer requests.
    pub num_requests: u32,
}

/// Marks the beginning of a frame step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseBeginEvent {
    /// Display being composed.
    pub display: DisplayId,
    /// Which step is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the step.
    pub timestamp: HostTime,
}

/// Marks the end of a frame step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseEndEvent {
    /// Display being composed.
    pub display: DisplayId,
    /// Which step is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the step.
    pub timestamp: HostTime,
}

/// Emitted when the present step of a frame finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresentEvent {
    /// Display being presented.
    pub display: DisplayId,
    /// Host time when the present step finished.
    pub presented_at: HostTime,
    /// Whether the frame was already committed during validation.
    pub skipped_validate: bool,
    /// Device error surfaced by the present step, if any.
    pub error: Option<hal::Error>,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the composer.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a vsync is forwarded.
    fn on_vsync(&mut self, e: &VsyncEvent) {
        _ = e;
    }

    /// Called when vsync delivery is toggled for a display.
    fn on_vsync_enabled(&mut self, e: &VsyncEnabledEvent) {
        _ = e;
    }

    /// Called when a hotplug notification resolves.
    fn on_hotplug(&mut self, e: &HotplugEvent) {
        _ = e;
    }

    /// Called when validation for a frame completes.
    fn on_validate(&mut self, e: &ValidateEvent) {
        _ = e;
    }

    /// Called at the beginning of a frame step.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a frame step.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when the present step finishes.
    fn on_present(&mut self, e: &PresentEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
