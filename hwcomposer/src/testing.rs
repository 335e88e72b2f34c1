// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles shared by the unit tests.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use hashbrown::HashMap;
use parking_lot::{Mutex, MutexGuard};

use hwcomposer_core::changes::{ClientTargetProperty, PresentOrValidateState};
use hwcomposer_core::color::ColorTransform;
use hwcomposer_core::display::{
    DeviceProductInfo, DisplayIdentificationInfo, HwDisplayId, PhysicalDisplayId,
};
use hwcomposer_core::fence::Fence;
use hwcomposer_core::hal::{
    Attribute, BufferHandle, Capability, ColorMode, ColorTransformHint, Composition,
    Connection, ConnectionType, ContentSample, ContentSamplingAttributes, ContentType,
    Dataspace, DisplayCapability, DisplayRequest, Error, HdrCapabilities, HwConfigId,
    HwLayerId, LayerGenericMetadataKey, LayerRequest, PixelFormat, PowerMode, RenderIntent,
    Vsync,
};
use hwcomposer_core::time::{Duration, HostTime};
use hwcomposer_core::timing::{VsyncPeriodChangeConstraints, VsyncPeriodChangeTimeline};
use hwcomposer_core::trace::{
    HotplugEvent, PhaseBeginEvent, PhaseEndEvent, PresentEvent, TraceSink, ValidateEvent,
    VsyncEnabledEvent, VsyncEvent,
};

use crate::HwComposer;
use crate::callback::{ComposerCallback, DeviceCallback};
use crate::clock::Pacer;
use crate::config::ComposerConfig;
use crate::device::{
    ComposerDevice, CreatedVirtualDisplay, DeviceResult, IdentificationData, PresentOrValidate,
    ValidateCounts,
};
use crate::hotplug::IdentificationParser;

pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

// ---------------------------------------------------------------------------
// FakeDevice
// ---------------------------------------------------------------------------

/// Scripted results and recorded requests of a [`FakeDevice`].
#[derive(Debug)]
pub(crate) struct FakeState {
    pub(crate) calls: Vec<&'static str>,

    pub(crate) capabilities: Vec<Capability>,
    pub(crate) metadata_keys: DeviceResult<Vec<LayerGenericMetadataKey>>,
    pub(crate) vsync_period_switch_supported: bool,
    pub(crate) max_virtual_display_count: u32,
    pub(crate) debug_info: String,
    pub(crate) execute_commands: DeviceResult<()>,

    pub(crate) create_virtual_display: DeviceResult<()>,
    pub(crate) virtual_format: PixelFormat,
    pub(crate) next_virtual_hw: u64,
    pub(crate) last_mirror: Option<HwDisplayId>,
    pub(crate) identification: HashMap<HwDisplayId, IdentificationData>,
    pub(crate) display_capabilities: DeviceResult<Vec<DisplayCapability>>,
    pub(crate) connection_type: DeviceResult<ConnectionType>,

    pub(crate) configs: Vec<HwConfigId>,
    pub(crate) attributes: HashMap<(HwConfigId, Attribute), i32>,
    pub(crate) active_config: DeviceResult<HwConfigId>,
    pub(crate) display_vsync_period: DeviceResult<Duration>,
    pub(crate) mode_switch: DeviceResult<VsyncPeriodChangeTimeline>,

    pub(crate) set_vsync_enabled: DeviceResult<()>,
    pub(crate) vsync_requests: Vec<Vsync>,
    pub(crate) supports_doze: DeviceResult<bool>,
    pub(crate) set_power_mode: DeviceResult<()>,
    pub(crate) power_modes: Vec<PowerMode>,

    pub(crate) color_modes: Vec<ColorMode>,
    pub(crate) color_mode: Option<(ColorMode, RenderIntent)>,
    pub(crate) color_transform_hints: Vec<ColorTransformHint>,
    pub(crate) set_color_transform: DeviceResult<()>,
    pub(crate) hdr: HdrCapabilities,

    pub(crate) validate: DeviceResult<ValidateCounts>,
    pub(crate) present_or_validate: DeviceResult<PresentOrValidate>,
    pub(crate) present: DeviceResult<Fence>,
    pub(crate) changed_types: Vec<(HwLayerId, Composition)>,
    pub(crate) requests: (DisplayRequest, Vec<(HwLayerId, LayerRequest)>),
    pub(crate) client_target_property: DeviceResult<ClientTargetProperty>,
    pub(crate) release_fences: DeviceResult<Vec<(HwLayerId, Fence)>>,

    pub(crate) next_layer: u64,
    pub(crate) destroy_layer: DeviceResult<()>,

    pub(crate) set_elapse_time: DeviceResult<()>,
    pub(crate) elapse_times: Vec<HostTime>,
    pub(crate) set_brightness: DeviceResult<()>,
    pub(crate) brightness: Option<f32>,
    pub(crate) set_content_type: DeviceResult<()>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            capabilities: Vec::new(),
            metadata_keys: Err(Error::Unsupported),
            vsync_period_switch_supported: false,
            max_virtual_display_count: 1,
            debug_info: String::new(),
            execute_commands: Ok(()),
            create_virtual_display: Ok(()),
            virtual_format: PixelFormat::RGBA_8888,
            next_virtual_hw: 1000,
            last_mirror: None,
            identification: HashMap::new(),
            display_capabilities: Ok(Vec::new()),
            connection_type: Ok(ConnectionType::Internal),
            configs: Vec::new(),
            attributes: HashMap::new(),
            active_config: Err(Error::BadConfig),
            display_vsync_period: Ok(Duration(16_666_666)),
            mode_switch: Ok(VsyncPeriodChangeTimeline::default()),
            set_vsync_enabled: Ok(()),
            vsync_requests: Vec::new(),
            supports_doze: Ok(false),
            set_power_mode: Ok(()),
            power_modes: Vec::new(),
            color_modes: vec![ColorMode::NATIVE],
            color_mode: None,
            color_transform_hints: Vec::new(),
            set_color_transform: Ok(()),
            hdr: HdrCapabilities::default(),
            validate: Ok(ValidateCounts::default()),
            present_or_validate: Ok(PresentOrValidate {
                state: PresentOrValidateState::ValidateOnly,
                counts: ValidateCounts::default(),
                present_fence: Fence::NO_FENCE,
            }),
            present: Ok(Fence::NO_FENCE),
            changed_types: Vec::new(),
            requests: (DisplayRequest::NONE, Vec::new()),
            client_target_property: Ok(ClientTargetProperty::default()),
            release_fences: Ok(Vec::new()),
            next_layer: 1,
            destroy_layer: Ok(()),
            set_elapse_time: Ok(()),
            elapse_times: Vec::new(),
            set_brightness: Ok(()),
            brightness: None,
            set_content_type: Ok(()),
        }
    }
}

/// A [`ComposerDevice`] that records calls and returns scripted results.
#[derive(Default)]
pub(crate) struct FakeDevice {
    state: Mutex<FakeState>,
    callback: Mutex<Option<Arc<dyn DeviceCallback>>>,
}

impl core::fmt::Debug for FakeDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FakeDevice")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl FakeDevice {
    pub(crate) fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock()
    }

    pub(crate) fn calls_named(&self, name: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == name).count()
    }

    pub(crate) fn set_identification(&self, display: HwDisplayId, port: u8, data: Vec<u8>) {
        self.state
            .lock()
            .identification
            .insert(display, IdentificationData { port, data });
    }

    pub(crate) fn add_config(&self, config: HwConfigId, width: i32, height: i32, period: i32) {
        let mut state = self.state.lock();
        state.configs.push(config);
        state.attributes.insert((config, Attribute::Width), width);
        state.attributes.insert((config, Attribute::Height), height);
        state
            .attributes
            .insert((config, Attribute::VsyncPeriod), period);
    }

    /// Delivers a raw hotplug through the registered callback.
    pub(crate) fn fire_hotplug(&self, display: u64, connection: i32) {
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback.on_hotplug(display, connection);
        }
    }

    fn record(&self, name: &'static str) -> MutexGuard<'_, FakeState> {
        let mut state = self.state.lock();
        state.calls.push(name);
        state
    }
}

impl ComposerDevice for FakeDevice {
    fn capabilities(&self) -> Vec<Capability> {
        self.record("capabilities").capabilities.clone()
    }

    fn layer_generic_metadata_keys(&self) -> DeviceResult<Vec<LayerGenericMetadataKey>> {
        self.record("layer_generic_metadata_keys")
            .metadata_keys
            .clone()
    }

    fn is_vsync_period_switch_supported(&self) -> bool {
        self.state.lock().vsync_period_switch_supported
    }

    fn max_virtual_display_count(&self) -> u32 {
        self.state.lock().max_virtual_display_count
    }

    fn register_callback(&self, callback: Box<dyn DeviceCallback>) {
        self.record("register_callback");
        *self.callback.lock() = Some(Arc::from(callback));
    }

    fn execute_commands(&self) -> DeviceResult<()> {
        self.record("execute_commands").execute_commands
    }

    fn dump_debug_info(&self) -> String {
        self.state.lock().debug_info.clone()
    }

    fn create_virtual_display(
        &self,
        _width: u32,
        _height: u32,
        _format: PixelFormat,
        mirror: Option<HwDisplayId>,
    ) -> DeviceResult<CreatedVirtualDisplay> {
        let mut state = self.record("create_virtual_display");
        state.create_virtual_display?;
        state.last_mirror = mirror;
        state.next_virtual_hw += 1;
        Ok(CreatedVirtualDisplay {
            hw_display: HwDisplayId(state.next_virtual_hw),
            format: state.virtual_format,
        })
    }

    fn destroy_virtual_display(&self, _display: HwDisplayId) -> DeviceResult<()> {
        self.record("destroy_virtual_display");
        Ok(())
    }

    fn display_identification_data(
        &self,
        display: HwDisplayId,
    ) -> DeviceResult<IdentificationData> {
        self.record("display_identification_data")
            .identification
            .get(&display)
            .cloned()
            .ok_or(Error::Unsupported)
    }

    fn display_capabilities(&self, _display: HwDisplayId) -> DeviceResult<Vec<DisplayCapability>> {
        self.record("display_capabilities")
            .display_capabilities
            .clone()
    }

    fn display_connection_type(&self, _display: HwDisplayId) -> DeviceResult<ConnectionType> {
        self.record("display_connection_type").connection_type
    }

    fn display_configs(&self, _display: HwDisplayId) -> DeviceResult<Vec<HwConfigId>> {
        Ok(self.record("display_configs").configs.clone())
    }

    fn display_attribute(
        &self,
        _display: HwDisplayId,
        config: HwConfigId,
        attribute: Attribute,
    ) -> DeviceResult<i32> {
        self.record("display_attribute")
            .attributes
            .get(&(config, attribute))
            .copied()
            .ok_or(Error::BadConfig)
    }

    fn active_config(&self, _display: HwDisplayId) -> DeviceResult<HwConfigId> {
        self.record("active_config").active_config
    }

    fn display_vsync_period(&self, _display: HwDisplayId) -> DeviceResult<Duration> {
        self.record("display_vsync_period").display_vsync_period
    }

    fn set_active_config_with_constraints(
        &self,
        _display: HwDisplayId,
        _config: HwConfigId,
        _constraints: &VsyncPeriodChangeConstraints,
    ) -> DeviceResult<VsyncPeriodChangeTimeline> {
        self.record("set_active_config_with_constraints")
            .mode_switch
    }

    fn set_vsync_enabled(&self, _display: HwDisplayId, enabled: Vsync) -> DeviceResult<()> {
        let mut state = self.record("set_vsync_enabled");
        state.vsync_requests.push(enabled);
        state.set_vsync_enabled
    }

    fn supports_doze(&self, _display: HwDisplayId) -> DeviceResult<bool> {
        self.record("supports_doze").supports_doze
    }

    fn set_power_mode(&self, _display: HwDisplayId, mode: PowerMode) -> DeviceResult<()> {
        let mut state = self.record("set_power_mode");
        state.power_modes.push(mode);
        state.set_power_mode
    }

    fn color_modes(&self, _display: HwDisplayId) -> DeviceResult<Vec<ColorMode>> {
        Ok(self.record("color_modes").color_modes.clone())
    }

    fn render_intents(
        &self,
        _display: HwDisplayId,
        _mode: ColorMode,
    ) -> DeviceResult<Vec<RenderIntent>> {
        self.record("render_intents");
        Ok(vec![RenderIntent::COLORIMETRIC])
    }

    fn set_color_mode(
        &self,
        _display: HwDisplayId,
        mode: ColorMode,
        intent: RenderIntent,
    ) -> DeviceResult<()> {
        self.record("set_color_mode").color_mode = Some((mode, intent));
        Ok(())
    }

    fn dataspace_saturation_matrix(
        &self,
        _display: HwDisplayId,
        _dataspace: Dataspace,
    ) -> DeviceResult<ColorTransform> {
        self.record("dataspace_saturation_matrix");
        Ok(ColorTransform::IDENTITY)
    }

    fn set_color_transform(
        &self,
        _display: HwDisplayId,
        _matrix: &ColorTransform,
        hint: ColorTransformHint,
    ) -> DeviceResult<()> {
        let mut state = self.record("set_color_transform");
        state.color_transform_hints.push(hint);
        state.set_color_transform
    }

    fn set_display_elapse_time(
        &self,
        _display: HwDisplayId,
        timestamp: HostTime,
    ) -> DeviceResult<()> {
        let mut state = self.record("set_display_elapse_time");
        let result = state.set_elapse_time;
        if result.is_ok() {
            state.elapse_times.push(timestamp);
        }
        result
    }

    fn hdr_capabilities(&self, _display: HwDisplayId) -> DeviceResult<HdrCapabilities> {
        Ok(self.record("hdr_capabilities").hdr.clone())
    }

    fn supported_per_frame_metadata(&self, _display: HwDisplayId) -> DeviceResult<u32> {
        self.record("supported_per_frame_metadata");
        Ok(0)
    }

    fn validate(&self, _display: HwDisplayId) -> DeviceResult<ValidateCounts> {
        self.record("validate").validate
    }

    fn present_or_validate(&self, _display: HwDisplayId) -> DeviceResult<PresentOrValidate> {
        self.record("present_or_validate")
            .present_or_validate
            .clone()
    }

    fn present(&self, _display: HwDisplayId) -> DeviceResult<Fence> {
        self.record("present").present.clone()
    }

    fn changed_composition_types(
        &self,
        _display: HwDisplayId,
    ) -> DeviceResult<Vec<(HwLayerId, Composition)>> {
        Ok(self.record("changed_composition_types").changed_types.clone())
    }

    fn requests(
        &self,
        _display: HwDisplayId,
    ) -> DeviceResult<(DisplayRequest, Vec<(HwLayerId, LayerRequest)>)> {
        Ok(self.record("requests").requests.clone())
    }

    fn client_target_property(&self, _display: HwDisplayId) -> DeviceResult<ClientTargetProperty> {
        self.record("client_target_property")
            .client_target_property
    }

    fn accept_display_changes(&self, _display: HwDisplayId) -> DeviceResult<()> {
        self.record("accept_display_changes");
        Ok(())
    }

    fn release_fences(&self, _display: HwDisplayId) -> DeviceResult<Vec<(HwLayerId, Fence)>> {
        self.record("release_fences").release_fences.clone()
    }

    fn set_client_target(
        &self,
        _display: HwDisplayId,
        _slot: u32,
        _target: BufferHandle,
        _acquire_fence: &Fence,
        _dataspace: Dataspace,
    ) -> DeviceResult<()> {
        self.record("set_client_target");
        Ok(())
    }

    fn set_output_buffer(
        &self,
        _display: HwDisplayId,
        _buffer: BufferHandle,
        _release_fence: &Fence,
    ) -> DeviceResult<()> {
        self.record("set_output_buffer");
        Ok(())
    }

    fn create_layer(&self, _display: HwDisplayId) -> DeviceResult<HwLayerId> {
        let mut state = self.record("create_layer");
        state.next_layer += 1;
        Ok(HwLayerId(state.next_layer))
    }

    fn destroy_layer(&self, _display: HwDisplayId, _layer: HwLayerId) -> DeviceResult<()> {
        self.record("destroy_layer").destroy_layer
    }

    fn set_display_brightness(
        &self,
        _display: HwDisplayId,
        brightness: f32,
    ) -> BoxFuture<'static, DeviceResult<()>> {
        let mut state = self.record("set_display_brightness");
        let result = state.set_brightness;
        if result.is_ok() {
            state.brightness = Some(brightness);
        }
        future::ready(result).boxed()
    }

    fn displayed_content_sampling_attributes(
        &self,
        _display: HwDisplayId,
    ) -> DeviceResult<ContentSamplingAttributes> {
        self.record("displayed_content_sampling_attributes");
        Err(Error::Unsupported)
    }

    fn set_displayed_content_sampling_enabled(
        &self,
        _display: HwDisplayId,
        _enabled: bool,
        _component_mask: u8,
        _max_frames: u64,
    ) -> DeviceResult<()> {
        self.record("set_displayed_content_sampling_enabled");
        Ok(())
    }

    fn displayed_content_sample(
        &self,
        _display: HwDisplayId,
        _max_frames: u64,
        _timestamp: u64,
    ) -> DeviceResult<ContentSample> {
        self.record("displayed_content_sample");
        Ok(ContentSample::default())
    }

    fn set_auto_low_latency_mode(&self, _display: HwDisplayId, _on: bool) -> DeviceResult<()> {
        self.record("set_auto_low_latency_mode");
        Ok(())
    }

    fn supported_content_types(&self, _display: HwDisplayId) -> DeviceResult<Vec<ContentType>> {
        self.record("supported_content_types");
        Ok(vec![ContentType::Graphics, ContentType::Game])
    }

    fn set_content_type(
        &self,
        _display: HwDisplayId,
        _content_type: ContentType,
    ) -> DeviceResult<()> {
        self.record("set_content_type").set_content_type
    }
}

// ---------------------------------------------------------------------------
// FakeParser
// ---------------------------------------------------------------------------

/// Parses any data whose first byte is non-zero. The first byte stands in for
/// the manufacturer and names the display.
#[derive(Debug, Default)]
pub(crate) struct FakeParser;

impl IdentificationParser for FakeParser {
    fn parse(&self, port: u8, data: &[u8]) -> Option<DisplayIdentificationInfo> {
        let first = *data.first().filter(|b| **b != 0)?;
        let model_hash = data
            .iter()
            .fold(0_u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(*b)));
        let name = format!("Display {first}");
        Some(DisplayIdentificationInfo {
            id: PhysicalDisplayId::from_edid(port, u16::from(first), model_hash),
            name: name.clone(),
            device_product_info: Some(DeviceProductInfo {
                name,
                ..DeviceProductInfo::default()
            }),
        })
    }
}

// ---------------------------------------------------------------------------
// RecordingPacer
// ---------------------------------------------------------------------------

/// A [`Pacer`] on a manual clock. Sleeping records the deadline and jumps the
/// clock forward to it.
#[derive(Debug, Default)]
pub(crate) struct RecordingPacer {
    state: Mutex<(HostTime, Vec<HostTime>)>,
}

impl RecordingPacer {
    pub(crate) fn set_now(&self, now: HostTime) {
        self.state.lock().0 = now;
    }

    pub(crate) fn deadlines(&self) -> Vec<HostTime> {
        self.state.lock().1.clone()
    }
}

impl Pacer for RecordingPacer {
    fn now(&self) -> HostTime {
        self.state.lock().0
    }

    fn sleep_until(&self, deadline: HostTime) {
        let mut state = self.state.lock();
        state.1.push(deadline);
        state.0 = state.0.max(deadline);
    }
}

// ---------------------------------------------------------------------------
// TraceLog
// ---------------------------------------------------------------------------

/// One trace event, as received by a [`TraceLog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TraceRecord {
    Vsync(VsyncEvent),
    VsyncEnabled(VsyncEnabledEvent),
    Hotplug(HotplugEvent),
    Validate(ValidateEvent),
    PhaseBegin(PhaseBeginEvent),
    PhaseEnd(PhaseEndEvent),
    Present(PresentEvent),
}

/// A [`TraceSink`] whose events stay readable after the sink is handed to
/// the composer.
#[derive(Clone, Debug, Default)]
pub(crate) struct TraceLog(Arc<Mutex<Vec<TraceRecord>>>);

impl TraceLog {
    pub(crate) fn records(&self) -> Vec<TraceRecord> {
        self.0.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.0.lock().clear();
    }

    fn push(&self, record: TraceRecord) {
        self.0.lock().push(record);
    }
}

impl TraceSink for TraceLog {
    fn on_vsync(&mut self, e: &VsyncEvent) {
        self.push(TraceRecord::Vsync(*e));
    }

    fn on_vsync_enabled(&mut self, e: &VsyncEnabledEvent) {
        self.push(TraceRecord::VsyncEnabled(*e));
    }

    fn on_hotplug(&mut self, e: &HotplugEvent) {
        self.push(TraceRecord::Hotplug(*e));
    }

    fn on_validate(&mut self, e: &ValidateEvent) {
        self.push(TraceRecord::Validate(*e));
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.push(TraceRecord::PhaseBegin(*e));
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.push(TraceRecord::PhaseEnd(*e));
    }

    fn on_present(&mut self, e: &PresentEvent) {
        self.push(TraceRecord::Present(*e));
    }
}

// ---------------------------------------------------------------------------
// RecordingCallback
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct CallbackLog {
    hotplugs: Vec<(HwDisplayId, Connection)>,
    refreshes: Vec<HwDisplayId>,
    vsyncs: Vec<(HwDisplayId, i64, Option<Duration>)>,
    timelines: Vec<(HwDisplayId, VsyncPeriodChangeTimeline)>,
    seamless: Vec<HwDisplayId>,
}

/// A [`ComposerCallback`] that records every notification.
#[derive(Debug, Default)]
pub(crate) struct RecordingCallback {
    log: Mutex<CallbackLog>,
}

impl RecordingCallback {
    pub(crate) fn hotplugs(&self) -> Vec<(HwDisplayId, Connection)> {
        self.log.lock().hotplugs.clone()
    }

    pub(crate) fn refreshes(&self) -> Vec<HwDisplayId> {
        self.log.lock().refreshes.clone()
    }

    pub(crate) fn vsyncs(&self) -> Vec<(HwDisplayId, i64, Option<Duration>)> {
        self.log.lock().vsyncs.clone()
    }

    pub(crate) fn timelines(&self) -> Vec<(HwDisplayId, VsyncPeriodChangeTimeline)> {
        self.log.lock().timelines.clone()
    }

    pub(crate) fn seamless(&self) -> Vec<HwDisplayId> {
        self.log.lock().seamless.clone()
    }
}

impl ComposerCallback for RecordingCallback {
    fn on_hotplug_received(&self, display: HwDisplayId, connection: Connection) {
        self.log.lock().hotplugs.push((display, connection));
    }

    fn on_refresh_received(&self, display: HwDisplayId) {
        self.log.lock().refreshes.push(display);
    }

    fn on_vsync_received(
        &self,
        display: HwDisplayId,
        timestamp: i64,
        vsync_period: Option<Duration>,
    ) {
        self.log
            .lock()
            .vsyncs
            .push((display, timestamp, vsync_period));
    }

    fn on_vsync_period_timing_changed_received(
        &self,
        display: HwDisplayId,
        timeline: &VsyncPeriodChangeTimeline,
    ) {
        self.log.lock().timelines.push((display, *timeline));
    }

    fn on_seamless_possible_received(&self, display: HwDisplayId) {
        self.log.lock().seamless.push(display);
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// A composer wired to fakes, with handles on each fake.
#[derive(Debug)]
pub(crate) struct Harness {
    pub(crate) device: Arc<FakeDevice>,
    pub(crate) pacer: Arc<RecordingPacer>,
    pub(crate) trace: TraceLog,
    pub(crate) composer: HwComposer,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_config(ComposerConfig::new())
    }

    pub(crate) fn with_config(config: ComposerConfig) -> Self {
        init_logging();
        let device = Arc::new(FakeDevice::default());
        let pacer = Arc::new(RecordingPacer::default());
        let trace = TraceLog::default();
        let composer = HwComposer::new(device.clone(), Box::new(FakeParser), config)
            .with_pacer(pacer.clone())
            .with_trace_sink(Box::new(trace.clone()));
        Self {
            device,
            pacer,
            trace,
            composer,
        }
    }

    /// Connects a display that reports no identification data.
    pub(crate) fn connect_legacy(&self, hw_display: HwDisplayId) -> PhysicalDisplayId {
        assert!(
            !self.device.state().identification.contains_key(&hw_display),
            "display {hw_display} has identification data"
        );
        self.connect(hw_display)
    }

    /// Connects a display whose identification data was set up beforehand.
    pub(crate) fn connect_edid(&self, hw_display: HwDisplayId) -> PhysicalDisplayId {
        self.connect(hw_display)
    }

    fn connect(&self, hw_display: HwDisplayId) -> PhysicalDisplayId {
        self.composer
            .on_hotplug(hw_display, Connection::Connected)
            .expect("hotplug should not be ignored")
            .id
    }
}
