// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The composer facade.
//!
//! [`HwComposer`] owns the device, the display registry and the capability
//! catalog. Its operations are spread over the component modules
//! ([`hotplug`](crate::hotplug), [`vsync`](crate::vsync),
//! [`negotiate`](crate::negotiate), [`fences`](crate::fences),
//! [`catalog`](crate::catalog), [`control`](crate::control)); this module
//! holds construction, callback registration and display lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use hwcomposer_core::display::{DisplayId, HwDisplayId, PhysicalDisplayId, VirtualDisplayId};
use hwcomposer_core::hal::PixelFormat;
use hwcomposer_core::trace::{NoopSink, TraceSink};

use crate::callback::{CallbackBridge, ComposerCallback};
use crate::catalog::Catalog;
use crate::clock::{MonotonicPacer, Pacer};
use crate::config::ComposerConfig;
use crate::device::ComposerDevice;
use crate::error::{self, Error, Result};
use crate::hotplug::IdentificationParser;
use crate::registry::{DisplayRecord, DisplayRegistry};

/// A virtual display created by [`HwComposer::allocate_virtual_display`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VirtualDisplay {
    /// Identity of the new display.
    pub id: VirtualDisplayId,
    /// Output pixel format selected by the device.
    pub format: PixelFormat,
}

/// Manages the displays driven through one hardware compositing device.
///
/// All operations take `&self`; the composer is shared between the frame
/// thread and the device callback thread.
pub struct HwComposer {
    pub(crate) device: Arc<dyn ComposerDevice>,
    pub(crate) parser: Box<dyn IdentificationParser>,
    pub(crate) config: ComposerConfig,
    pub(crate) registry: DisplayRegistry,
    pub(crate) catalog: RwLock<Catalog>,
    pub(crate) pacer: Arc<dyn Pacer>,
    callback_registered: AtomicBool,
    trace_sink: Mutex<Box<dyn TraceSink + Send>>,
}

impl core::fmt::Debug for HwComposer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HwComposer")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("catalog", &self.catalog)
            .field(
                "callback_registered",
                &self.callback_registered.load(Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}

impl HwComposer {
    /// Creates a composer for `device`.
    ///
    /// Presents are paced on `CLOCK_MONOTONIC` and trace events are dropped
    /// until [`with_pacer`](Self::with_pacer) or
    /// [`with_trace_sink`](Self::with_trace_sink) say otherwise.
    #[must_use]
    pub fn new(
        device: Arc<dyn ComposerDevice>,
        parser: Box<dyn IdentificationParser>,
        config: ComposerConfig,
    ) -> Self {
        Self {
            device,
            parser,
            config,
            registry: DisplayRegistry::new(),
            catalog: RwLock::new(Catalog::default()),
            pacer: Arc::new(MonotonicPacer),
            callback_registered: AtomicBool::new(false),
            trace_sink: Mutex::new(Box::new(NoopSink)),
        }
    }

    /// Replaces the present pacer.
    #[must_use]
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Replaces the trace sink.
    #[must_use]
    pub fn with_trace_sink(mut self, sink: Box<dyn TraceSink + Send>) -> Self {
        self.trace_sink = Mutex::new(sink);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Loads the capability catalog and registers `callback` with the device.
    ///
    /// The catalog is reloaded on every call; only the first call registers a
    /// callback.
    pub fn set_callback(&self, callback: Arc<dyn ComposerCallback>) {
        self.load_catalog();

        if self.callback_registered.swap(true, Ordering::AcqRel) {
            tracing::warn!("callback already registered, ignoring extra registration");
            return;
        }

        let bridge = CallbackBridge::new(callback, self.device.is_vsync_period_switch_supported());
        self.device.register_callback(Box::new(bridge));
    }

    // -- lifecycle -------------------------------------------------------

    /// Creates a virtual display of `width`×`height`, optionally mirroring a
    /// physical display.
    ///
    /// No record is created on failure.
    pub fn allocate_virtual_display(
        &self,
        width: i32,
        height: i32,
        format: PixelFormat,
        mirror: Option<PhysicalDisplayId>,
    ) -> Result<VirtualDisplay> {
        let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
            tracing::error!(width, height, "invalid virtual display resolution");
            return Err(Error::InvalidResolution { width, height });
        };
        if w == 0 || h == 0 {
            tracing::error!(width, height, "invalid virtual display resolution");
            return Err(Error::InvalidResolution { width, height });
        }

        let max = self.config.max_virtual_display_dimension;
        if max > 0 && (w > max || h > max) {
            tracing::error!(
                width,
                height,
                max,
                "virtual display resolution exceeds maximum dimension"
            );
            return Err(Error::ResolutionExceedsMax {
                width: w,
                height: h,
                max,
            });
        }

        let hw_mirror = mirror.and_then(|id| self.registry.hw_id_of_physical(id));
        let created = self
            .device
            .create_virtual_display(w, h, format, hw_mirror)
            .map_err(|error| {
                tracing::error!(code = error.code(), %error, "createVirtualDisplay failed");
                Error::VirtualDisplayAllocation(error)
            })?;

        let id = self.registry.next_virtual_id();
        self.registry.insert_virtual(id, created.hw_display);
        tracing::info!(display = %DisplayId::Virtual(id), hwc_display = created.hw_display.0, "allocated virtual display");
        Ok(VirtualDisplay {
            id,
            format: created.format,
        })
    }

    /// Destroys the record of `display` and frees its handle mapping.
    ///
    /// If the display held the internal or external legacy slot, the slot is
    /// released for the next hotplug. Virtual displays are also destroyed on
    /// the device.
    pub fn disconnect_display(&self, id: DisplayId) -> Result<()> {
        let record = self
            .registry
            .remove(id)
            .ok_or_else(|| error::invalid_display(id))?;

        if record.is_virtual
            && let Err(error) = self.device.destroy_virtual_display(record.hw_id)
        {
            return Err(error::device("destroyVirtualDisplay", id, error));
        }
        tracing::info!(display = %id, hwc_display = record.hw_id.0, "display destroyed");
        Ok(())
    }

    /// Whether a physical display has a record and is connected.
    #[must_use]
    pub fn is_connected(&self, display: PhysicalDisplayId) -> bool {
        self.registry.is_connected(display)
    }

    /// Identities of all physical displays with a record.
    #[must_use]
    pub fn physical_display_ids(&self) -> Vec<PhysicalDisplayId> {
        self.registry.physical_display_ids()
    }

    /// Identity of the display holding the internal slot.
    #[must_use]
    pub fn internal_display_id(&self) -> Option<PhysicalDisplayId> {
        self.registry.internal_display_id()
    }

    /// Translates a device handle to a physical identity.
    #[must_use]
    pub fn to_physical_display_id(&self, hw_display: HwDisplayId) -> Option<PhysicalDisplayId> {
        self.registry.to_physical_display_id(hw_display)
    }

    /// Translates a physical identity to its device handle.
    #[must_use]
    #[expect(
        clippy::wrong_self_convention,
        reason = "named after the identity kind it translates from"
    )]
    pub fn from_physical_display_id(&self, display: PhysicalDisplayId) -> Option<HwDisplayId> {
        self.registry.hw_id_of_physical(display)
    }

    /// Translates a virtual identity to its device handle.
    #[must_use]
    #[expect(
        clippy::wrong_self_convention,
        reason = "named after the identity kind it translates from"
    )]
    pub fn from_virtual_display_id(&self, display: VirtualDisplayId) -> Option<HwDisplayId> {
        self.registry.hw_id_of_virtual(display)
    }

    /// Device debug text, verbatim.
    #[must_use]
    pub fn dump(&self) -> String {
        self.device.dump_debug_info()
    }

    // -- shared helpers --------------------------------------------------

    /// Looks up a display, logging unknown identities.
    pub(crate) fn record(&self, display: DisplayId) -> Result<Arc<DisplayRecord>> {
        self.registry
            .lookup(display)
            .ok_or_else(|| error::invalid_display(display))
    }

    /// Looks up a physical display that must not be virtual.
    ///
    /// # Panics
    ///
    /// Panics if the record is virtual.
    pub(crate) fn physical_record(
        &self,
        display: PhysicalDisplayId,
        op: &'static str,
    ) -> Result<Arc<DisplayRecord>> {
        let record = self.record(display.into())?;
        assert!(
            !record.is_virtual,
            "{op}: invalid operation on virtual display {display}"
        );
        Ok(record)
    }

    pub(crate) fn trace(&self, emit: impl FnOnce(&mut dyn TraceSink)) {
        emit(&mut **self.trace_sink.lock());
    }
}
