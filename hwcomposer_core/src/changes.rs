// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame negotiation results.

use hashbrown::HashMap;

use crate::hal::{Composition, Dataspace, DisplayRequest, HwLayerId, LayerRequest, PixelFormat};

/// Outcome of the combined present-or-validate call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PresentOrValidateState {
    /// The device only validated; changes must be queried and accepted.
    ValidateOnly,
    /// The device validated and presented; there are no changes to report.
    CommittedNoChanges,
    /// The device validated and presented; changes must be queried this call
    /// but were already applied by the device.
    CommittedWithChanges,
}

impl PresentOrValidateState {
    /// Maps the device's raw state code. Unknown codes return `None`.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::ValidateOnly),
            1 => Some(Self::CommittedNoChanges),
            2 => Some(Self::CommittedWithChanges),
            _ => None,
        }
    }

    /// Returns `true` if the device already presented the frame.
    #[inline]
    #[must_use]
    pub const fn is_committed(self) -> bool {
        !matches!(self, Self::ValidateOnly)
    }
}

/// Format hints for the client target, chosen by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClientTargetProperty {
    /// Preferred pixel format.
    pub pixel_format: PixelFormat,
    /// Preferred dataspace.
    pub dataspace: Dataspace,
}

impl Default for ClientTargetProperty {
    fn default() -> Self {
        Self {
            pixel_format: PixelFormat::RGBA_8888,
            dataspace: Dataspace::UNKNOWN,
        }
    }
}

/// Composition changes the device requested for one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceRequestedChanges {
    /// Layers whose composition type the device wants changed.
    pub changed_types: HashMap<HwLayerId, Composition>,
    /// Display-level requests.
    pub display_requests: DisplayRequest,
    /// Per-layer requests.
    pub layer_requests: HashMap<HwLayerId, LayerRequest>,
    /// Client target format hints.
    pub client_target_property: ClientTargetProperty,
}

impl DeviceRequestedChanges {
    /// Returns `true` if the device asked for nothing beyond the defaults.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed_types.is_empty()
            && self.layer_requests.is_empty()
            && self.display_requests == DisplayRequest::NONE
    }
}
