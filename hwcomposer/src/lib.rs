// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display management on top of a hardware compositing device.
//!
//! [`HwComposer`] sits between a display pipeline and a [`ComposerDevice`]. It
//! provides:
//!
//! - A display registry mapping device handles to stable display identities
//! - Hotplug resolution, in legacy or generalized addressing mode
//! - Vsync filtering and per-display vsync enable state
//! - Per-frame composition negotiation with the skip-validate fast path
//! - Present and release fence tracking
//! - A capability and mode catalog, plus power, color and content controls
//!
//! Device notifications reach the pipeline through a [`CallbackBridge`],
//! installed by [`HwComposer::set_callback`]. The pipeline then feeds hotplug
//! and vsync notifications back into [`HwComposer::on_hotplug`] and
//! [`HwComposer::on_vsync`].
//!
//! Errors are logged through `tracing` where they are created. Frame-loop
//! events are also reported to a [`TraceSink`](hwcomposer_core::trace::TraceSink)
//! installed with [`HwComposer::with_trace_sink`].

mod callback;
mod catalog;
mod clock;
mod composer;
mod config;
mod control;
mod device;
mod error;
mod fences;
mod hotplug;
mod negotiate;
mod registry;
mod vsync;

#[cfg(test)]
mod testing;

pub use callback::{CallbackBridge, ComposerCallback, DeviceCallback};
pub use clock::{MonotonicPacer, Pacer, now, timebase};
pub use composer::{HwComposer, VirtualDisplay};
pub use config::ComposerConfig;
pub use device::{
    ComposerDevice, CreatedVirtualDisplay, DeviceResult, IdentificationData, PresentOrValidate,
    ValidateCounts,
};
pub use error::{Error, Result, Status};
pub use hotplug::IdentificationParser;
