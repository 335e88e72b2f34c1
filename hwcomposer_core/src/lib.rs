// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for driving a hardware display compositing device.
//!
//! `hwcomposer_core` holds the data model shared by the composer runtime and
//! its diagnostics. It is `no_std` compatible (with `alloc`) and has no
//! opinion about threads or clocks.
//!
//! # Architecture
//!
//! One frame on one display flows through these types:
//!
//! ```text
//!   hotplug ──► DisplayIdentificationInfo ──► DisplayId
//!                                               │
//!                 ┌─────────────────────────────┘
//!                 ▼
//!   present-or-validate ──► PresentOrValidateState
//!                                │
//!                 ┌──────────────┴──────────────┐
//!                 ▼                             ▼
//!   DeviceRequestedChanges              present fence + release fences
//! ```
//!
//! - [`display`]: Device handles and stable display identities.
//! - [`hal`]: Result codes, states and descriptors exchanged with the
//!   device.
//! - [`changes`]: Per-frame negotiation results.
//! - [`fence`]: Shared synchronization handles.
//! - [`time`]: Monotonic host time and timebase conversion.
//! - [`timing`]: Vsync period switching constraints and timelines.
//! - [`color`]: 4×4 color transform.
//! - [`trace`]: [`TraceSink`](trace::TraceSink) trait and event types for
//!   vsync, hotplug and frame instrumentation.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod changes;
pub mod color;
pub mod display;
pub mod fence;
pub mod hal;
pub mod time;
pub mod timing;
pub mod trace;
