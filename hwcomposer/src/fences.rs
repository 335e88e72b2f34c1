// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Present and release fence tracking, and layer lifetime.
//!
//! Each display keeps the present fence of its last frame and the release
//! fences reported for that frame. Both are replaced wholesale whenever a
//! frame is presented.

use hwcomposer_core::display::DisplayId;
use hwcomposer_core::fence::Fence;
use hwcomposer_core::hal::HwLayerId;

use crate::HwComposer;
use crate::error::{self, Result};

impl HwComposer {
    /// Present fence of the last frame on `display`.
    pub fn get_present_fence(&self, display: DisplayId) -> Result<Fence> {
        let record = self.record(display)?;
        let fence = record.frame.lock().last_present_fence.clone();
        Ok(fence)
    }

    /// Release fence of `layer` from the last frame, or [`Fence::NO_FENCE`] if
    /// the device reported none.
    pub fn get_layer_release_fence(&self, display: DisplayId, layer: HwLayerId) -> Result<Fence> {
        let record = self.record(display)?;
        let frame = record.frame.lock();
        Ok(frame
            .release_fences
            .get(&layer)
            .cloned()
            .unwrap_or(Fence::NO_FENCE))
    }

    /// Forgets all release fences of `display`.
    pub fn clear_release_fences(&self, display: DisplayId) -> Result<()> {
        self.record(display)?.frame.lock().release_fences.clear();
        Ok(())
    }

    /// Forgets the release fence of one layer.
    pub fn clear_layer_release_fence(&self, display: DisplayId, layer: HwLayerId) -> Result<()> {
        self.record(display)?
            .frame
            .lock()
            .release_fences
            .remove(&layer);
        Ok(())
    }

    /// Creates a layer on `display`.
    pub fn create_layer(&self, display: DisplayId) -> Result<HwLayerId> {
        let record = self.record(display)?;
        self.device
            .create_layer(record.hw_id)
            .map_err(|error| error::device("createLayer", display, error))
    }

    /// Destroys a layer and drops its release fence.
    pub fn destroy_layer(&self, display: DisplayId, layer: HwLayerId) -> Result<()> {
        let record = self.record(display)?;
        // Dropped even if the device refuses.
        record.frame.lock().release_fences.remove(&layer);
        self.device
            .destroy_layer(record.hw_id, layer)
            .map_err(|error| error::device("destroyLayer", display, error))
    }
}
