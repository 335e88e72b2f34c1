// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composer configuration.

/// Configuration for the [`HwComposer`](crate::HwComposer).
///
/// Values are fixed for the life of the composer. Loading them from system
/// properties is the host's job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComposerConfig {
    /// Largest width or height accepted for a virtual display, or 0 for no
    /// limit.
    pub max_virtual_display_dimension: u32,
    /// Re-read identification data when a known display reconnects and
    /// refresh its product descriptor.
    pub update_device_product_info_on_hotplug_reconnect: bool,
    /// Try the combined present-or-validate call before falling back to an
    /// explicit validate.
    pub skip_validate: bool,
}

impl ComposerConfig {
    /// Default configuration: unbounded virtual displays, no descriptor
    /// refresh on reconnect, skip-validate enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_virtual_display_dimension: 0,
            update_device_product_info_on_hotplug_reconnect: false,
            skip_validate: true,
        }
    }

    /// Configuration for devices whose present-or-validate is unreliable:
    /// every frame is validated explicitly.
    #[must_use]
    pub const fn always_validate() -> Self {
        Self {
            skip_validate: false,
            ..Self::new()
        }
    }

    /// Returns a copy with the given maximum virtual display dimension.
    #[must_use]
    pub const fn with_max_virtual_display_dimension(mut self, max: u32) -> Self {
        self.max_virtual_display_dimension = max;
        self
    }

    /// Returns a copy that refreshes product descriptors on reconnect.
    #[must_use]
    pub const fn with_device_product_info_refresh(mut self, refresh: bool) -> Self {
        self.update_device_product_info_on_hotplug_reconnect = refresh;
        self
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self::new()
    }
}
