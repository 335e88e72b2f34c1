// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for hwcomposer
//! diagnostics.
//!
//! This crate provides [`TraceSink`](hwcomposer_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: one human-readable line per event.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON
//!   from recorded bytes, with the `HW_VSYNC_<display>` and
//!   `HW_VSYNC_ON_<display>` counters.

pub mod chrome;
pub mod pretty;
pub mod recorder;
