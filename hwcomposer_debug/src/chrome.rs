// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Vsync activity becomes two counter tracks per display: `HW_VSYNC_<display>`
//! alternates between 0 and 1 on every forwarded vsync, and
//! `HW_VSYNC_ON_<display>` follows the enable state. Frame phases become
//! duration events on a thread per display.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use hwcomposer_core::display::DisplayId;
use hwcomposer_core::time::Timebase;
use hwcomposer_core::trace::PhaseKind;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
/// Events without a timestamp of their own (enable changes, hotplugs and
/// validate outcomes) reuse the most recent timestamp in the recording.
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut last_ts = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Vsync(e) => {
                last_ts = ticks_to_us(e.timestamp.ticks(), timebase);
                events.push(json!({
                    "ph": "C",
                    "name": format!("HW_VSYNC_{}", e.display),
                    "cat": "Vsync",
                    "ts": last_ts,
                    "pid": 0,
                    "args": { "value": u8::from(e.toggle) }
                }));
            }
            RecordedEvent::VsyncEnabled(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": format!("HW_VSYNC_ON_{}", e.display),
                    "cat": "Vsync",
                    "ts": last_ts,
                    "pid": 0,
                    "args": { "value": u8::from(e.enabled) }
                }));
            }
            RecordedEvent::Hotplug(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": if e.connected { "Connected" } else { "Disconnected" },
                    "cat": "Hotplug",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "hw_display": e.hw_display.0,
                        "display": e.display.value(),
                    }
                }));
            }
            RecordedEvent::Validate(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Validate",
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": tid(e.display),
                    "s": "t",
                    "args": {
                        "state": format!("{:?}", e.state),
                        "num_types": e.num_types,
                        "num_requests": e.num_requests,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                last_ts = ticks_to_us(e.timestamp.ticks(), timebase);
                events.push(json!({
                    "ph": "B",
                    "name": phase_name(e.phase),
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": tid(e.display),
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                last_ts = ticks_to_us(e.timestamp.ticks(), timebase);
                events.push(json!({
                    "ph": "E",
                    "name": phase_name(e.phase),
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": tid(e.display),
                }));
            }
            RecordedEvent::Present(e) => {
                last_ts = ticks_to_us(e.presented_at.ticks(), timebase);
                events.push(json!({
                    "ph": "i",
                    "name": "Present",
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": tid(e.display),
                    "s": "t",
                    "args": {
                        "skipped_validate": e.skipped_validate,
                        "error": e.error.map(|error| error.to_string()),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn tid(display: DisplayId) -> u64 {
    display.value()
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Validate => "Validate",
        PhaseKind::PresentWait => "PresentWait",
        PhaseKind::Present => "Present",
    }
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}
