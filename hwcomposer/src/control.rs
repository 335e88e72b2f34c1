// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Power, mode, color and auxiliary display controls.

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use hwcomposer_core::color::ColorTransform;
use hwcomposer_core::display::{DisplayId, PhysicalDisplayId};
use hwcomposer_core::hal::{
    self, ColorTransformHint, ContentSample, ContentSamplingAttributes, ContentType, HwConfigId,
    PowerMode,
};
use hwcomposer_core::time::HostTime;
use hwcomposer_core::timing::{VsyncPeriodChangeConstraints, VsyncPeriodChangeTimeline};

use crate::HwComposer;
use crate::error::{self, Result};

impl HwComposer {
    /// Sets the power mode of a physical display.
    ///
    /// Doze modes fall back to [`PowerMode::On`] on displays that cannot doze,
    /// and [`PowerMode::OnSuspend`] is not forwarded. Device failures are
    /// logged but not returned.
    ///
    /// # Panics
    ///
    /// Panics if `id` resolves to a virtual display.
    pub fn set_power_mode(&self, id: PhysicalDisplayId, mode: PowerMode) -> Result<()> {
        let record = self.physical_record(id, "setPowerMode")?;

        let mode = match mode {
            PowerMode::Off | PowerMode::On => mode,
            PowerMode::Doze | PowerMode::DozeSuspend => {
                let supports_doze = self
                    .device
                    .supports_doze(record.hw_id)
                    .unwrap_or_else(|error| {
                        tracing::error!(
                            display = %id,
                            op = "supportsDoze",
                            code = error.code(),
                            %error,
                            "device call failed"
                        );
                        false
                    });
                if supports_doze { mode } else { PowerMode::On }
            }
            PowerMode::OnSuspend => {
                tracing::debug!(display = %id, ?mode, "power mode not forwarded");
                return Ok(());
            }
        };

        if let Err(error) = self.device.set_power_mode(record.hw_id, mode) {
            tracing::error!(display = %id, op = "setPowerMode", ?mode, code = error.code(), %error, "device call failed");
        }
        Ok(())
    }

    /// Switches a physical display to `config` within `constraints`.
    pub fn set_active_mode_with_constraints(
        &self,
        display: PhysicalDisplayId,
        config: HwConfigId,
        constraints: &VsyncPeriodChangeConstraints,
    ) -> Result<VsyncPeriodChangeTimeline> {
        let record = self.record(display.into())?;
        self.device
            .set_active_config_with_constraints(record.hw_id, config, constraints)
            .map_err(|error| error::device("setActiveConfigWithConstraints", display.into(), error))
    }

    /// Sets the post-composition color transform of `display`.
    pub fn set_color_transform(&self, display: DisplayId, matrix: &ColorTransform) -> Result<()> {
        let record = self.record(display)?;
        let hint = if matrix.is_identity() {
            ColorTransformHint::Identity
        } else {
            ColorTransformHint::ArbitraryMatrix
        };
        self.device
            .set_color_transform(record.hw_id, matrix, hint)
            .map_err(|error| error::device("setColorTransform", display, error))
    }

    /// Sets the panel brightness of a physical display.
    ///
    /// `brightness` is in `0.0..=1.0`, or `-1.0` to turn the backlight off.
    /// The device completes the request asynchronously.
    pub fn set_display_brightness(
        &self,
        display: PhysicalDisplayId,
        brightness: f32,
    ) -> BoxFuture<'static, Result<()>> {
        let record = match self.record(display.into()) {
            Ok(record) => record,
            Err(error) => return future::ready(Err(error)).boxed(),
        };
        self.device
            .set_display_brightness(record.hw_id, brightness)
            .map(move |result| {
                result.map_err(|error| {
                    error::classified("setDisplayBrightness", display.into(), error)
                })
            })
            .boxed()
    }

    /// Tells the device when the next frame is expected to be presented.
    pub fn set_display_elapse_time(&self, display: DisplayId, timestamp: HostTime) -> Result<()> {
        let record = self.record(display)?;
        self.device
            .set_display_elapse_time(record.hw_id, timestamp)
            .map_err(|error| match error {
                hal::Error::BadParameter => {
                    error::classified("setDisplayElapseTime", display, error)
                }
                error => error::device("setDisplayElapseTime", display, error),
            })
    }

    // -- content sampling ------------------------------------------------

    /// Format of the content samples of `display`.
    pub fn get_displayed_content_sampling_attributes(
        &self,
        display: DisplayId,
    ) -> Result<ContentSamplingAttributes> {
        let record = self.record(display)?;
        self.device
            .displayed_content_sampling_attributes(record.hw_id)
            .map_err(|error| {
                error::classified("getDisplayedContentSamplingAttributes", display, error)
            })
    }

    /// Starts or stops content sampling on `display`.
    pub fn set_display_content_sampling_enabled(
        &self,
        display: DisplayId,
        enabled: bool,
        component_mask: u8,
        max_frames: u64,
    ) -> Result<()> {
        let record = self.record(display)?;
        self.device
            .set_displayed_content_sampling_enabled(record.hw_id, enabled, component_mask, max_frames)
            .map_err(|error| error::classified("setDisplayContentSamplingEnabled", display, error))
    }

    /// Content samples collected on `display` since `timestamp`.
    pub fn get_displayed_content_sample(
        &self,
        display: DisplayId,
        max_frames: u64,
        timestamp: u64,
    ) -> Result<ContentSample> {
        let record = self.record(display)?;
        self.device
            .displayed_content_sample(record.hw_id, max_frames, timestamp)
            .map_err(|error| error::classified("getDisplayedContentSample", display, error))
    }

    // -- content type ----------------------------------------------------

    /// Turns auto low-latency mode on or off.
    pub fn set_auto_low_latency_mode(&self, display: PhysicalDisplayId, on: bool) -> Result<()> {
        let record = self.record(display.into())?;
        self.device
            .set_auto_low_latency_mode(record.hw_id, on)
            .map_err(|error| error::classified("setAutoLowLatencyMode", display.into(), error))
    }

    /// Content types `display` can be optimized for.
    pub fn get_supported_content_types(&self, display: PhysicalDisplayId) -> Result<Vec<ContentType>> {
        let record = self.record(display.into())?;
        self.device
            .supported_content_types(record.hw_id)
            .map_err(|error| error::device("getSupportedContentTypes", display.into(), error))
    }

    /// Optimizes `display` for a content type.
    pub fn set_content_type(&self, display: PhysicalDisplayId, content_type: ContentType) -> Result<()> {
        let record = self.record(display.into())?;
        self.device
            .set_content_type(record.hw_id, content_type)
            .map_err(|error| error::classified("setContentType", display.into(), error))
    }
}
