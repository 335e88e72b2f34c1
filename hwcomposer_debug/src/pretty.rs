// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use hwcomposer_core::time::{HostTime, Timebase};
use hwcomposer_core::trace::{
    HotplugEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, PresentEvent, TraceSink,
    ValidateEvent, VsyncEnabledEvent, VsyncEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.timebase.ticks_to_nanos(t.ticks()) as f64 / 1000.0
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Validate => "validate",
        PhaseKind::PresentWait => "present-wait",
        PhaseKind::Present => "present",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_vsync(&mut self, e: &VsyncEvent) {
        let _ = writeln!(
            self.writer,
            "[vsync] display={} at={:.1}µs toggle={}",
            e.display,
            self.host_us(e.timestamp),
            u8::from(e.toggle),
        );
    }

    fn on_vsync_enabled(&mut self, e: &VsyncEnabledEvent) {
        let _ = writeln!(
            self.writer,
            "[vsync-on] display={} enabled={}",
            e.display, e.enabled,
        );
    }

    fn on_hotplug(&mut self, e: &HotplugEvent) {
        let state = if e.connected {
            "connected"
        } else {
            "disconnected"
        };
        let _ = writeln!(
            self.writer,
            "[hotplug] hw={} display={} {state}",
            e.hw_display, e.display,
        );
    }

    fn on_validate(&mut self, e: &ValidateEvent) {
        let _ = writeln!(
            self.writer,
            "[validate] display={} state={:?} types={} requests={}",
            e.display, e.state, e.num_types, e.num_requests,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[begin] display={} {} at={:.1}µs",
            e.display,
            phase_name(e.phase),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[end]   display={} {} at={:.1}µs",
            e.display,
            phase_name(e.phase),
            self.host_us(e.timestamp),
        );
    }

    fn on_present(&mut self, e: &PresentEvent) {
        let path = if e.skipped_validate {
            "fast"
        } else {
            "validated"
        };
        match e.error {
            Some(error) => {
                let _ = writeln!(
                    self.writer,
                    "[present] display={} at={:.1}µs path={path} error={error}",
                    e.display,
                    self.host_us(e.presented_at),
                );
            }
            None => {
                let _ = writeln!(
                    self.writer,
                    "[present] display={} at={:.1}µs path={path}",
                    e.display,
                    self.host_us(e.presented_at),
                );
            }
        }
    }
}
