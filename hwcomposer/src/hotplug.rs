// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hotplug resolution.
//!
//! A raw hotplug carries only a device handle. Resolving it means deciding
//! whether the handle is a reconnect of a known display or a new one, which
//! identity it gets, and whether it should be ignored.
//!
//! Identity assignment depends on the addressing mode, chosen once on the
//! very first connection:
//!
//! - **Generalized**: the first display reported identification data. Every
//!   display is identified by parsing its data; displays without data are
//!   ignored.
//! - **Legacy**: the first display had no data. Identities come from two fixed
//!   ports, primary and external, and a third display is ignored.

use hwcomposer_core::display::{
    DisplayId, DisplayIdentificationInfo, HwDisplayId, LEGACY_DISPLAY_TYPE_EXTERNAL,
    LEGACY_DISPLAY_TYPE_PRIMARY, PhysicalDisplayId,
};
use hwcomposer_core::hal::{self, Connection};
use hwcomposer_core::trace::HotplugEvent;

use crate::HwComposer;
use crate::device::IdentificationData;
use crate::registry::AddressingMode;

const INTERNAL_DISPLAY_NAME: &str = "Internal display";
const EXTERNAL_DISPLAY_NAME: &str = "External display";

/// Parses display identification data (typically EDID).
pub trait IdentificationParser: Send + Sync {
    /// Derives the identity of the display on `port` from its raw data.
    ///
    /// Returns `None` if the data cannot be parsed.
    fn parse(&self, port: u8, data: &[u8]) -> Option<DisplayIdentificationInfo>;
}

impl HwComposer {
    /// Resolves a hotplug notification.
    ///
    /// Returns the identification of the display that connected or
    /// disconnected, or `None` when the notification was ignored.
    pub fn on_hotplug(
        &self,
        hw_display: HwDisplayId,
        connection: Connection,
    ) -> Option<DisplayIdentificationInfo> {
        let (info, connected) = match connection {
            Connection::Connected => (self.on_hotplug_connect(hw_display)?, true),
            Connection::Disconnected => (self.on_hotplug_disconnect(hw_display)?, false),
            Connection::Invalid => {
                tracing::error!(hwc_display = hw_display.0, "invalid hotplug connection");
                return None;
            }
        };

        tracing::info!(
            display = %info.id,
            hwc_display = hw_display.0,
            connected,
            "hotplug resolved"
        );
        self.trace(|sink| {
            sink.on_hotplug(&HotplugEvent {
                hw_display,
                display: info.id,
                connected,
            });
        });
        Some(info)
    }

    /// Whether reconnects refresh the product descriptor.
    #[must_use]
    pub fn updates_device_product_info_on_hotplug_reconnect(&self) -> bool {
        self.config.update_device_product_info_on_hotplug_reconnect
    }

    fn on_hotplug_connect(&self, hw_display: HwDisplayId) -> Option<DisplayIdentificationInfo> {
        let info = match self.registry.to_physical_display_id(hw_display) {
            Some(display) => self.reconnect_info(hw_display, display),
            None => {
                let data = self.identification_data(hw_display);

                let mode = if data.is_some() {
                    AddressingMode::Generalized
                } else {
                    AddressingMode::Legacy
                };
                if self.registry.select_addressing_mode(mode) {
                    tracing::info!(?mode, "selected display addressing mode");
                }

                if self.should_ignore_hotplug_connect(hw_display, data.is_some()) {
                    return None;
                }
                self.identify_new_display(hw_display, data)
            }
        };

        if !self.registry.is_connected(info.id) {
            self.registry.allocate_physical(hw_display, info.id);
        }
        Some(info)
    }

    fn on_hotplug_disconnect(&self, hw_display: HwDisplayId) -> Option<DisplayIdentificationInfo> {
        let Some(id) = self.registry.to_physical_display_id(hw_display) else {
            tracing::error!(
                hwc_display = hw_display.0,
                "disconnect of unknown display handle"
            );
            return None;
        };

        match self.registry.lookup(DisplayId::Physical(id)) {
            Some(record) if record.is_connected() => record.set_connected(false),
            _ => tracing::warn!(display = %id, "disconnect of display that is not connected"),
        }
        Some(DisplayIdentificationInfo::bare(id))
    }

    fn reconnect_info(
        &self,
        hw_display: HwDisplayId,
        id: PhysicalDisplayId,
    ) -> DisplayIdentificationInfo {
        let mut info = DisplayIdentificationInfo::bare(id);
        if !self.config.update_device_product_info_on_hotplug_reconnect {
            return info;
        }

        let parsed = self
            .identification_data(hw_display)
            .and_then(|data| self.parser.parse(data.port, &data.data));
        match parsed {
            Some(parsed) => info.device_product_info = parsed.device_product_info,
            None => tracing::error!(
                display = %id,
                hwc_display = hw_display.0,
                "failed to refresh device product info on reconnect"
            ),
        }
        info
    }

    fn should_ignore_hotplug_connect(&self, hw_display: HwDisplayId, has_data: bool) -> bool {
        if self.registry.multi_display_support() {
            if !has_data {
                tracing::error!(
                    hwc_display = hw_display.0,
                    "ignoring connection of display without identification data"
                );
                return true;
            }
            return false;
        }

        if self.registry.internal_hw_id().is_some() && self.registry.external_hw_id().is_some() {
            tracing::error!(
                hwc_display = hw_display.0,
                "ignoring connection of tertiary display"
            );
            return true;
        }
        false
    }

    fn identify_new_display(
        &self,
        hw_display: HwDisplayId,
        data: Option<IdentificationData>,
    ) -> DisplayIdentificationInfo {
        let is_primary = self.registry.internal_hw_id().is_none();

        let port = match data {
            Some(data) if self.registry.multi_display_support() => {
                if let Some(info) = self.parser.parse(data.port, &data.data) {
                    return info;
                }
                tracing::error!(
                    hwc_display = hw_display.0,
                    port = data.port,
                    "failed to parse identification data"
                );
                data.port
            }
            data => {
                if data.is_some() {
                    tracing::warn!(
                        hwc_display = hw_display.0,
                        "ignoring identification data in legacy mode"
                    );
                }
                if is_primary {
                    LEGACY_DISPLAY_TYPE_PRIMARY
                } else {
                    LEGACY_DISPLAY_TYPE_EXTERNAL
                }
            }
        };

        DisplayIdentificationInfo {
            id: PhysicalDisplayId::from_port(port),
            name: if is_primary {
                INTERNAL_DISPLAY_NAME
            } else {
                EXTERNAL_DISPLAY_NAME
            }
            .to_owned(),
            device_product_info: None,
        }
    }

    /// Reads identification data; devices that cannot report it yield `None`.
    fn identification_data(&self, hw_display: HwDisplayId) -> Option<IdentificationData> {
        match self.device.display_identification_data(hw_display) {
            Ok(data) => Some(data),
            Err(hal::Error::Unsupported) => None,
            Err(error) => {
                tracing::error!(
                    hwc_display = hw_display.0,
                    code = error.code(),
                    %error,
                    "failed to read identification data"
                );
                None
            }
        }
    }
}
