// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The hardware compositing device boundary.
//!
//! [`ComposerDevice`] is everything the composer asks of the device. Every
//! call is synchronous except brightness, which resolves through a boxed
//! future because the device may complete it off the calling thread.
//!
//! Implementations must be callable from both the frame thread and the
//! device callback thread.

use futures::future::BoxFuture;
use hwcomposer_core::changes::{ClientTargetProperty, PresentOrValidateState};
use hwcomposer_core::color::ColorTransform;
use hwcomposer_core::display::{DisplayIdentificationData, HwDisplayId};
use hwcomposer_core::fence::Fence;
use hwcomposer_core::hal::{
    Attribute, BufferHandle, Capability, ColorMode, ColorTransformHint, Composition,
    ConnectionType, ContentSample, ContentSamplingAttributes, ContentType, Dataspace,
    DisplayCapability, DisplayRequest, Error, HdrCapabilities, HwConfigId, HwLayerId,
    LayerGenericMetadataKey, LayerRequest, PixelFormat, PowerMode, RenderIntent, Vsync,
};
use hwcomposer_core::time::{Duration, HostTime};
use hwcomposer_core::timing::{VsyncPeriodChangeConstraints, VsyncPeriodChangeTimeline};

use crate::callback::DeviceCallback;

/// Result of a device call.
pub type DeviceResult<T> = Result<T, Error>;

/// Counts reported by a validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidateCounts {
    /// Number of layers whose composition type changed.
    pub num_types: u32,
    /// Number of layer requests.
    pub num_requests: u32,
}

/// Outcome of [`ComposerDevice::present_or_validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresentOrValidate {
    /// Which path the device took.
    pub state: PresentOrValidateState,
    /// Validation counts; zero when the device committed without changes.
    pub counts: ValidateCounts,
    /// Present fence; [`Fence::NO_FENCE`] unless the device committed.
    pub present_fence: Fence,
}

/// A virtual display created by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreatedVirtualDisplay {
    /// Handle of the new display.
    pub hw_display: HwDisplayId,
    /// Pixel format the device selected for the output buffer.
    pub format: PixelFormat,
}

/// Identification data read from a physical display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentificationData {
    /// Connector port.
    pub port: u8,
    /// Raw descriptor bytes, typically EDID.
    pub data: DisplayIdentificationData,
}

/// The hardware compositing device.
///
/// Validation calls ([`validate`](Self::validate) and
/// [`present_or_validate`](Self::present_or_validate)) may report pending
/// composition changes as [`Error::HasChanges`]; the composer treats that code
/// as a successful validation.
pub trait ComposerDevice: Send + Sync {
    // -- device-wide -----------------------------------------------------

    /// Device-wide capabilities.
    fn capabilities(&self) -> Vec<Capability>;

    /// Per-layer generic metadata keys the device understands.
    fn layer_generic_metadata_keys(&self) -> DeviceResult<Vec<LayerGenericMetadataKey>>;

    /// Whether the device supports vsync period switching (and thus reports
    /// vsync with a period).
    fn is_vsync_period_switch_supported(&self) -> bool;

    /// Maximum number of virtual displays the device can create.
    fn max_virtual_display_count(&self) -> u32;

    /// Registers the callback receiving hotplug, vsync and timing
    /// notifications.
    fn register_callback(&self, callback: Box<dyn DeviceCallback>);

    /// Flushes queued commands.
    fn execute_commands(&self) -> DeviceResult<()>;

    /// Free-form debug text.
    fn dump_debug_info(&self) -> String;

    // -- display lifecycle -----------------------------------------------

    /// Creates a virtual display, optionally mirroring a physical one.
    fn create_virtual_display(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
        mirror: Option<HwDisplayId>,
    ) -> DeviceResult<CreatedVirtualDisplay>;

    /// Destroys a virtual display.
    fn destroy_virtual_display(&self, display: HwDisplayId) -> DeviceResult<()>;

    /// Reads identification data from a physical display.
    fn display_identification_data(&self, display: HwDisplayId)
    -> DeviceResult<IdentificationData>;

    /// Per-display capabilities.
    fn display_capabilities(&self, display: HwDisplayId) -> DeviceResult<Vec<DisplayCapability>>;

    /// How the display is attached.
    fn display_connection_type(&self, display: HwDisplayId) -> DeviceResult<ConnectionType>;

    // -- modes -----------------------------------------------------------

    /// Configuration handles of a display.
    fn display_configs(&self, display: HwDisplayId) -> DeviceResult<Vec<HwConfigId>>;

    /// One attribute of one configuration.
    fn display_attribute(
        &self,
        display: HwDisplayId,
        config: HwConfigId,
        attribute: Attribute,
    ) -> DeviceResult<i32>;

    /// Currently active configuration.
    fn active_config(&self, display: HwDisplayId) -> DeviceResult<HwConfigId>;

    /// Current vsync period.
    fn display_vsync_period(&self, display: HwDisplayId) -> DeviceResult<Duration>;

    /// Switches configuration subject to timing constraints.
    fn set_active_config_with_constraints(
        &self,
        display: HwDisplayId,
        config: HwConfigId,
        constraints: &VsyncPeriodChangeConstraints,
    ) -> DeviceResult<VsyncPeriodChangeTimeline>;

    // -- vsync and power -------------------------------------------------

    /// Enables or disables vsync callbacks.
    fn set_vsync_enabled(&self, display: HwDisplayId, enabled: Vsync) -> DeviceResult<()>;

    /// Whether the display supports the doze modes.
    fn supports_doze(&self, display: HwDisplayId) -> DeviceResult<bool>;

    /// Sets the power mode.
    fn set_power_mode(&self, display: HwDisplayId, mode: PowerMode) -> DeviceResult<()>;

    // -- color -----------------------------------------------------------

    /// Supported color modes.
    fn color_modes(&self, display: HwDisplayId) -> DeviceResult<Vec<ColorMode>>;

    /// Render intents supported for a color mode.
    fn render_intents(
        &self,
        display: HwDisplayId,
        mode: ColorMode,
    ) -> DeviceResult<Vec<RenderIntent>>;

    /// Sets the color mode and render intent.
    fn set_color_mode(
        &self,
        display: HwDisplayId,
        mode: ColorMode,
        intent: RenderIntent,
    ) -> DeviceResult<()>;

    /// Saturation matrix for a dataspace.
    fn dataspace_saturation_matrix(
        &self,
        display: HwDisplayId,
        dataspace: Dataspace,
    ) -> DeviceResult<ColorTransform>;

    /// Sets the post-composition color transform.
    fn set_color_transform(
        &self,
        display: HwDisplayId,
        matrix: &ColorTransform,
        hint: ColorTransformHint,
    ) -> DeviceResult<()>;

    /// HDR support.
    fn hdr_capabilities(&self, display: HwDisplayId) -> DeviceResult<HdrCapabilities>;

    /// Bitmask of supported per-frame metadata keys.
    fn supported_per_frame_metadata(&self, display: HwDisplayId) -> DeviceResult<u32>;

    // -- frame -----------------------------------------------------------

    /// Validates the current layer state.
    fn validate(&self, display: HwDisplayId) -> DeviceResult<ValidateCounts>;

    /// Validates and, when possible, presents in one round trip.
    fn present_or_validate(&self, display: HwDisplayId) -> DeviceResult<PresentOrValidate>;

    /// Presents the validated frame and returns its present fence.
    fn present(&self, display: HwDisplayId) -> DeviceResult<Fence>;

    /// Layers whose composition type the device changed during validation.
    fn changed_composition_types(
        &self,
        display: HwDisplayId,
    ) -> DeviceResult<Vec<(HwLayerId, Composition)>>;

    /// Display and layer requests from the last validation.
    fn requests(
        &self,
        display: HwDisplayId,
    ) -> DeviceResult<(DisplayRequest, Vec<(HwLayerId, LayerRequest)>)>;

    /// Preferred format of the client target.
    fn client_target_property(&self, display: HwDisplayId) -> DeviceResult<ClientTargetProperty>;

    /// Accepts the changes requested by the last validation.
    fn accept_display_changes(&self, display: HwDisplayId) -> DeviceResult<()>;

    /// Release fences of the last presented frame.
    fn release_fences(&self, display: HwDisplayId) -> DeviceResult<Vec<(HwLayerId, Fence)>>;

    /// Sets the buffer holding client-composed content.
    fn set_client_target(
        &self,
        display: HwDisplayId,
        slot: u32,
        target: BufferHandle,
        acquire_fence: &Fence,
        dataspace: Dataspace,
    ) -> DeviceResult<()>;

    /// Expected present time of the next frame.
    fn set_display_elapse_time(&self, display: HwDisplayId, timestamp: HostTime)
    -> DeviceResult<()>;

    /// Sets the output buffer of a virtual display.
    fn set_output_buffer(
        &self,
        display: HwDisplayId,
        buffer: BufferHandle,
        release_fence: &Fence,
    ) -> DeviceResult<()>;

    // -- layers ----------------------------------------------------------

    /// Creates a layer.
    fn create_layer(&self, display: HwDisplayId) -> DeviceResult<HwLayerId>;

    /// Destroys a layer.
    fn destroy_layer(&self, display: HwDisplayId, layer: HwLayerId) -> DeviceResult<()>;

    // -- auxiliary controls ----------------------------------------------

    /// Sets panel brightness in `0.0..=1.0`, or `-1.0` to turn the backlight
    /// off.
    fn set_display_brightness(
        &self,
        display: HwDisplayId,
        brightness: f32,
    ) -> BoxFuture<'static, DeviceResult<()>>;

    /// Format of content samples.
    fn displayed_content_sampling_attributes(
        &self,
        display: HwDisplayId,
    ) -> DeviceResult<ContentSamplingAttributes>;

    /// Starts or stops content sampling.
    fn set_displayed_content_sampling_enabled(
        &self,
        display: HwDisplayId,
        enabled: bool,
        component_mask: u8,
        max_frames: u64,
    ) -> DeviceResult<()>;

    /// Collected content samples.
    fn displayed_content_sample(
        &self,
        display: HwDisplayId,
        max_frames: u64,
        timestamp: u64,
    ) -> DeviceResult<ContentSample>;

    /// Turns auto low-latency mode on or off.
    fn set_auto_low_latency_mode(&self, display: HwDisplayId, on: bool) -> DeviceResult<()>;

    /// Content types the display can be optimized for.
    fn supported_content_types(&self, display: HwDisplayId) -> DeviceResult<Vec<ContentType>>;

    /// Optimizes the display for a content type.
    fn set_content_type(&self, display: HwDisplayId, content_type: ContentType)
    -> DeviceResult<()>;
}
