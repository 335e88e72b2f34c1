// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Display identities are stored as their raw value, device errors as their
//! raw code (0 for none).

use hwcomposer_core::changes::PresentOrValidateState;
use hwcomposer_core::display::{DisplayId, HwDisplayId, PhysicalDisplayId};
use hwcomposer_core::hal;
use hwcomposer_core::time::HostTime;
use hwcomposer_core::trace::{
    HotplugEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, PresentEvent, TraceSink,
    ValidateEvent, VsyncEnabledEvent, VsyncEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_VSYNC: u8 = 1;
const TAG_VSYNC_ENABLED: u8 = 2;
const TAG_HOTPLUG: u8 = 3;
const TAG_VALIDATE: u8 = 4;
const TAG_PHASE_BEGIN: u8 = 5;
const TAG_PHASE_END: u8 = 6;
const TAG_PRESENT: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
}

fn encode_phase(phase: PhaseKind) -> u8 {
    match phase {
        PhaseKind::Validate => 0,
        PhaseKind::PresentWait => 1,
        PhaseKind::Present => 2,
    }
}

fn decode_phase(v: u8) -> Option<PhaseKind> {
    match v {
        0 => Some(PhaseKind::Validate),
        1 => Some(PhaseKind::PresentWait),
        2 => Some(PhaseKind::Present),
        _ => None,
    }
}

fn encode_state(state: PresentOrValidateState) -> u8 {
    match state {
        PresentOrValidateState::ValidateOnly => 0,
        PresentOrValidateState::CommittedNoChanges => 1,
        PresentOrValidateState::CommittedWithChanges => 2,
    }
}

impl TraceSink for RecorderSink {
    fn on_vsync(&mut self, e: &VsyncEvent) {
        self.write_u8(TAG_VSYNC);
        self.write_u64(e.display.value());
        self.write_u64(e.timestamp.0);
        self.write_bool(e.toggle);
    }

    fn on_vsync_enabled(&mut self, e: &VsyncEnabledEvent) {
        self.write_u8(TAG_VSYNC_ENABLED);
        self.write_u64(e.display.value());
        self.write_bool(e.enabled);
    }

    fn on_hotplug(&mut self, e: &HotplugEvent) {
        self.write_u8(TAG_HOTPLUG);
        self.write_u64(e.hw_display.0);
        self.write_u64(e.display.value());
        self.write_bool(e.connected);
    }

    fn on_validate(&mut self, e: &ValidateEvent) {
        self.write_u8(TAG_VALIDATE);
        self.write_u64(e.display.value());
        self.write_u8(encode_state(e.state));
        self.write_u32(e.num_types);
        self.write_u32(e.num_requests);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.display.value());
        self.write_u8(encode_phase(e.phase));
        self.write_u64(e.timestamp.0);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.display.value());
        self.write_u8(encode_phase(e.phase));
        self.write_u64(e.timestamp.0);
    }

    fn on_present(&mut self, e: &PresentEvent) {
        self.write_u8(TAG_PRESENT);
        self.write_u64(e.display.value());
        self.write_u64(e.presented_at.0);
        self.write_bool(e.skipped_validate);
        self.write_i32(e.error.map_or(0, hal::Error::code));
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// A decoded event from a recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A forwarded vsync.
    Vsync(VsyncEvent),
    /// A vsync enable state change.
    VsyncEnabled(VsyncEnabledEvent),
    /// A resolved hotplug.
    Hotplug(HotplugEvent),
    /// A validate outcome.
    Validate(ValidateEvent),
    /// A phase began.
    PhaseBegin(PhaseBeginEvent),
    /// A phase ended.
    PhaseEnd(PhaseEndEvent),
    /// A present attempt.
    Present(PresentEvent),
}

/// Decodes a byte buffer produced by [`RecorderSink`] into an iterator of
/// events.
///
/// Decoding stops at the first unknown tag, undecodable value, or at a
/// truncated record.
pub fn decode(data: &[u8]) -> DecodeIter<'_> {
    DecodeIter { data, pos: 0 }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn read_u8(&mut self) -> Option<u8> {
        let v = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    fn read_display(&mut self) -> Option<DisplayId> {
        self.read_u64().map(DisplayId::from_value)
    }

    fn read_physical(&mut self) -> Option<PhysicalDisplayId> {
        self.read_display()?.as_physical()
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        decode_phase(self.read_u8()?)
    }

    fn decode_vsync(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Vsync(VsyncEvent {
            display: self.read_physical()?,
            timestamp: HostTime(self.read_u64()?),
            toggle: self.read_bool()?,
        }))
    }

    fn decode_vsync_enabled(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::VsyncEnabled(VsyncEnabledEvent {
            display: self.read_physical()?,
            enabled: self.read_bool()?,
        }))
    }

    fn decode_hotplug(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Hotplug(HotplugEvent {
            hw_display: HwDisplayId(self.read_u64()?),
            display: self.read_physical()?,
            connected: self.read_bool()?,
        }))
    }

    fn decode_validate(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Validate(ValidateEvent {
            display: self.read_display()?,
            state: PresentOrValidateState::from_raw(u32::from(self.read_u8()?))?,
            num_types: self.read_u32()?,
            num_requests: self.read_u32()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            display: self.read_display()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            display: self.read_display()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_present(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Present(PresentEvent {
            display: self.read_display()?,
            presented_at: HostTime(self.read_u64()?),
            skipped_validate: self.read_bool()?,
            error: hal::Error::from_code(self.read_i32()?),
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_VSYNC => self.decode_vsync(),
            TAG_VSYNC_ENABLED => self.decode_vsync_enabled(),
            TAG_HOTPLUG => self.decode_hotplug(),
            TAG_VALIDATE => self.decode_validate(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_PRESENT => self.decode_present(),
            _ => None,
        }
    }
}
