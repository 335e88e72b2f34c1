// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capability and mode catalog.
//!
//! Device-wide capabilities and generic metadata keys are loaded when the
//! pipeline registers its callback. Everything per-display is read through
//! from the device on each query.

use hashbrown::{HashMap, HashSet};

use hwcomposer_core::color::ColorTransform;
use hwcomposer_core::display::{DisplayId, PhysicalDisplayId};
use hwcomposer_core::hal::{
    self, Attribute, Capability, ColorMode, ConnectionType, Dataspace, DisplayCapability,
    HdrCapabilities, HwConfigId, HwcDisplayMode, RenderIntent,
};

use crate::HwComposer;
use crate::error::{self, Result};

/// Device-wide capabilities, loaded once per callback registration.
#[derive(Debug, Default)]
pub(crate) struct Catalog {
    capabilities: HashSet<Capability>,
    /// Generic metadata key name to whether the key is mandatory.
    layer_generic_metadata: HashMap<String, bool>,
}

impl HwComposer {
    pub(crate) fn load_catalog(&self) {
        let capabilities = self.device.capabilities().into_iter().collect();
        let layer_generic_metadata = match self.device.layer_generic_metadata_keys() {
            Ok(keys) => keys
                .into_iter()
                .map(|key| (key.name, key.mandatory))
                .collect(),
            Err(hal::Error::Unsupported) => HashMap::new(),
            Err(error) => {
                tracing::error!(
                    code = error.code(),
                    %error,
                    "failed to load layer generic metadata keys"
                );
                HashMap::new()
            }
        };

        let mut catalog = self.catalog.write();
        catalog.capabilities = capabilities;
        catalog.layer_generic_metadata = layer_generic_metadata;
        tracing::debug!(
            capabilities = catalog.capabilities.len(),
            metadata_keys = catalog.layer_generic_metadata.len(),
            "loaded capability catalog"
        );
    }

    /// Whether the device has a device-wide capability.
    #[must_use]
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.catalog.read().capabilities.contains(&capability)
    }

    /// Generic metadata keys the device understands, mapped to whether each
    /// is mandatory.
    #[must_use]
    pub fn get_supported_layer_generic_metadata(&self) -> HashMap<String, bool> {
        self.catalog.read().layer_generic_metadata.clone()
    }

    /// Whether `display` has a per-display capability. Unknown displays and
    /// failed queries report `false`.
    #[must_use]
    pub fn has_display_capability(&self, id: DisplayId, capability: DisplayCapability) -> bool {
        let Ok(record) = self.record(id) else {
            return false;
        };
        match self.device.display_capabilities(record.hw_id) {
            Ok(capabilities) => capabilities.contains(&capability),
            Err(error) => {
                tracing::error!(display = %id, code = error.code(), %error, "getDisplayCapabilities failed");
                false
            }
        }
    }

    /// Maximum number of virtual displays the device supports.
    #[must_use]
    pub fn get_max_virtual_display_count(&self) -> u32 {
        self.device.max_virtual_display_count()
    }

    /// Largest accepted virtual display width or height, 0 for no limit.
    #[must_use]
    pub fn get_max_virtual_display_dimension(&self) -> u32 {
        self.config.max_virtual_display_dimension
    }

    // -- modes -----------------------------------------------------------

    /// All modes of a physical display.
    ///
    /// Each attribute is queried separately; one that the device fails to
    /// report reads as `-1`.
    pub fn get_modes(&self, id: PhysicalDisplayId) -> Result<Vec<HwcDisplayMode>> {
        let record = self.record(id.into())?;
        let configs = self
            .device
            .display_configs(record.hw_id)
            .map_err(|error| error::device("getDisplayConfigs", id.into(), error))?;

        let attribute = |config: HwConfigId, attribute: Attribute| {
            self.device
                .display_attribute(record.hw_id, config, attribute)
                .unwrap_or_else(|error| {
                    tracing::warn!(
                        display = %id,
                        config = config.0,
                        ?attribute,
                        code = error.code(),
                        "failed to read mode attribute"
                    );
                    -1
                })
        };

        Ok(configs
            .into_iter()
            .map(|config| HwcDisplayMode {
                hwc_id: config,
                width: attribute(config, Attribute::Width),
                height: attribute(config, Attribute::Height),
                vsync_period: attribute(config, Attribute::VsyncPeriod),
                dpi_x: attribute(config, Attribute::DpiX),
                dpi_y: attribute(config, Attribute::DpiY),
                config_group: attribute(config, Attribute::ConfigGroup),
            })
            .collect())
    }

    /// The active mode of a physical display, or `None` if the device has
    /// not activated one.
    pub fn get_active_mode(&self, id: PhysicalDisplayId) -> Result<Option<HwConfigId>> {
        let record = self.record(id.into())?;
        match self.device.active_config(record.hw_id) {
            Ok(config) => Ok(Some(config)),
            Err(hal::Error::BadConfig) => {
                tracing::warn!(display = %id, "no active mode");
                Ok(None)
            }
            Err(error) => Err(error::device("getActiveConfig", id.into(), error)),
        }
    }

    /// How a physical display is attached.
    ///
    /// If the device cannot tell, the display holding the internal slot is
    /// internal and every other display external.
    pub fn get_display_connection_type(&self, id: PhysicalDisplayId) -> Result<ConnectionType> {
        let record = self.record(id.into())?;
        match self.device.display_connection_type(record.hw_id) {
            Ok(connection_type) => Ok(connection_type),
            Err(error) => {
                tracing::debug!(
                    display = %id,
                    code = error.code(),
                    "connection type not reported, inferring from internal slot"
                );
                Ok(if self.registry.internal_hw_id() == Some(record.hw_id) {
                    ConnectionType::Internal
                } else {
                    ConnectionType::External
                })
            }
        }
    }

    // -- color -----------------------------------------------------------

    /// Color modes supported by `display`.
    pub fn get_color_modes(&self, display: DisplayId) -> Result<Vec<ColorMode>> {
        let record = self.record(display)?;
        self.device
            .color_modes(record.hw_id)
            .map_err(|error| error::device("getColorModes", display, error))
    }

    /// Render intents supported by `display` in `mode`.
    pub fn get_render_intents(&self, display: DisplayId, mode: ColorMode) -> Result<Vec<RenderIntent>> {
        let record = self.record(display)?;
        self.device
            .render_intents(record.hw_id, mode)
            .map_err(|error| error::device("getRenderIntents", display, error))
    }

    /// Sets the color mode and render intent of `display`.
    pub fn set_active_color_mode(
        &self,
        display: DisplayId,
        mode: ColorMode,
        intent: RenderIntent,
    ) -> Result<()> {
        let record = self.record(display)?;
        self.device
            .set_color_mode(record.hw_id, mode, intent)
            .map_err(|error| error::device("setColorMode", display, error))
    }

    /// HDR support of `display`.
    pub fn get_hdr_capabilities(&self, display: DisplayId) -> Result<HdrCapabilities> {
        let record = self.record(display)?;
        self.device
            .hdr_capabilities(record.hw_id)
            .map_err(|error| error::device("getHdrCapabilities", display, error))
    }

    /// Bitmask of per-frame metadata keys supported by `display`.
    pub fn get_supported_per_frame_metadata(&self, display: DisplayId) -> Result<u32> {
        let record = self.record(display)?;
        self.device
            .supported_per_frame_metadata(record.hw_id)
            .map_err(|error| error::device("getPerFrameMetadataKeys", display, error))
    }

    /// Saturation matrix the device applies for `dataspace`.
    pub fn get_dataspace_saturation_matrix(
        &self,
        display: DisplayId,
        dataspace: Dataspace,
    ) -> Result<ColorTransform> {
        let record = self.record(display)?;
        self.device
            .dataspace_saturation_matrix(record.hw_id, dataspace)
            .map_err(|error| error::device("getDataspaceSaturationMatrix", display, error))
    }
}
