// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame composition negotiation.
//!
//! Each frame runs two steps on the frame thread:
//!
//! 1. [`get_device_composition_changes`](HwComposer::get_device_composition_changes)
//!    validates the layer stack and returns the changes the device wants.
//!    When the frame needs no client composition it first tries the combined
//!    present-or-validate call, which may commit the frame right away.
//! 2. [`present_and_get_release_fences`](HwComposer::present_and_get_release_fences)
//!    presents the frame, or only flushes queued commands when step 1
//!    already committed it.
//!
//! ```text
//!   present_or_validate ──┬─ CommittedNoChanges ───► None (frame done)
//!                         ├─ CommittedWithChanges ─► changes, no accept
//!                         └─ ValidateOnly ─────────► changes, accept
//!   validate ──────────────────────────────────────► changes, accept
//! ```

use hashbrown::HashMap;

use hwcomposer_core::changes::{
    ClientTargetProperty, DeviceRequestedChanges, PresentOrValidateState,
};
use hwcomposer_core::display::{DisplayId, HwDisplayId};
use hwcomposer_core::fence::Fence;
use hwcomposer_core::hal::{self, BufferHandle, Dataspace};
use hwcomposer_core::time::HostTime;
use hwcomposer_core::trace::{
    PhaseBeginEvent, PhaseEndEvent, PhaseKind, PresentEvent, ValidateEvent,
};

use crate::HwComposer;
use crate::device::{PresentOrValidate, ValidateCounts};
use crate::error::{self, Result};
use crate::registry::DisplayRecord;

impl HwComposer {
    /// Validates the frame on `id` and returns the changes requested by
    /// the device.
    ///
    /// Returns `Ok(None)` when the display is disconnected or when the device
    /// committed the frame without changes.
    pub fn get_device_composition_changes(
        &self,
        id: DisplayId,
        frame_uses_client_composition: bool,
        earliest_present_time: HostTime,
        previous_present_fence: &Fence,
    ) -> Result<Option<DeviceRequestedChanges>> {
        let record = self.record(id)?;
        if !record.is_connected() {
            tracing::debug!(display = %id, "skipping composition for disconnected display");
            return Ok(None);
        }

        self.phase_begin(id, PhaseKind::Validate);
        let result = self.negotiate(
            id,
            &record,
            frame_uses_client_composition,
            earliest_present_time,
            previous_present_fence,
        );
        self.phase_end(id, PhaseKind::Validate);
        result
    }

    /// Presents the frame on `display` and collects its fences.
    ///
    /// Waits until `earliest_present_time` unless the previous frame has not
    /// been presented yet.
    pub fn present_and_get_release_fences(
        &self,
        display: DisplayId,
        earliest_present_time: HostTime,
        previous_present_fence: &Fence,
    ) -> Result<()> {
        let record = self.record(display)?;
        let hw_id = record.hw_id;

        {
            let mut frame = record.frame.lock();
            if frame.validate_was_skipped {
                frame.validate_was_skipped = false;
                let present_error = frame.present_error.take();
                drop(frame);
                return self.finish_skipped_present(display, present_error);
            }
            frame.last_present_fence = Fence::NO_FENCE;
        }

        if !previous_present_fence.is_pending() {
            self.phase_begin(display, PhaseKind::PresentWait);
            self.pacer.sleep_until(earliest_present_time);
            self.phase_end(display, PhaseKind::PresentWait);
        }

        self.phase_begin(display, PhaseKind::Present);
        let presented = self.device.present(hw_id);
        self.phase_end(display, PhaseKind::Present);
        let presented_at = self.pacer.now();
        self.trace(|sink| {
            sink.on_present(&PresentEvent {
                display,
                presented_at,
                skipped_validate: false,
                error: presented.as_ref().err().copied(),
            });
        });

        let present_fence = presented.map_err(|error| error::device("present", display, error))?;
        record.frame.lock().last_present_fence = present_fence;

        let release_fences = self
            .device
            .release_fences(hw_id)
            .map_err(|error| error::device("getReleaseFences", display, error))?;
        record.frame.lock().release_fences = release_fences.into_iter().collect();
        Ok(())
    }

    /// Sets the client target buffer for the current frame.
    ///
    /// Does nothing if the frame was already committed during validation.
    pub fn set_client_target(
        &self,
        id: DisplayId,
        slot: u32,
        acquire_fence: &Fence,
        target: BufferHandle,
        dataspace: Dataspace,
    ) -> Result<()> {
        let record = self.record(id)?;
        if record.frame.lock().validate_was_skipped {
            tracing::trace!(display = %id, "frame already committed, skipping client target");
            return Ok(());
        }
        self.device
            .set_client_target(record.hw_id, slot, target, acquire_fence, dataspace)
            .map_err(|error| error::device("setClientTarget", id, error))
    }

    /// Sets the output buffer of a virtual display.
    ///
    /// # Panics
    ///
    /// Panics if `display` is physical.
    pub fn set_output_buffer(
        &self,
        display: DisplayId,
        release_fence: &Fence,
        buffer: BufferHandle,
    ) -> Result<()> {
        let record = self.record(display)?;
        assert!(
            record.is_virtual,
            "setOutputBuffer: invalid operation on physical display {display}"
        );
        self.device
            .set_output_buffer(record.hw_id, buffer, release_fence)
            .map_err(|error| error::device("setOutputBuffer", display, error))
    }

    fn negotiate(
        &self,
        id: DisplayId,
        record: &DisplayRecord,
        frame_uses_client_composition: bool,
        earliest_present_time: HostTime,
        previous_present_fence: &Fence,
    ) -> Result<Option<DeviceRequestedChanges>> {
        let hw_id = record.hw_id;
        record.frame.lock().validate_was_skipped = false;

        let (state, counts) = if self.can_skip_validate(
            frame_uses_client_composition,
            earliest_present_time,
            previous_present_fence,
        ) {
            let outcome = match self.device.present_or_validate(hw_id) {
                Ok(outcome) => outcome,
                Err(hal::Error::HasChanges) => PresentOrValidate {
                    state: PresentOrValidateState::ValidateOnly,
                    counts: ValidateCounts::default(),
                    present_fence: Fence::NO_FENCE,
                },
                Err(error) => return Err(error::device("presentOrValidate", id, error)),
            };
            if outcome.state.is_committed() {
                self.capture_committed_frame(record, outcome.present_fence);
            }
            (outcome.state, outcome.counts)
        } else {
            let counts = match self.device.validate(hw_id) {
                Ok(counts) => counts,
                Err(hal::Error::HasChanges) => ValidateCounts::default(),
                Err(error) => return Err(error::device("validate", id, error)),
            };
            (PresentOrValidateState::ValidateOnly, counts)
        };

        tracing::trace!(
            display = %id,
            ?state,
            num_types = counts.num_types,
            num_requests = counts.num_requests,
            "validated"
        );
        self.trace(|sink| {
            sink.on_validate(&ValidateEvent {
                display: id,
                state,
                num_types: counts.num_types,
                num_requests: counts.num_requests,
            });
        });

        if state == PresentOrValidateState::CommittedNoChanges {
            return Ok(None);
        }

        let changes = self.requested_changes(id, hw_id, counts)?;

        if state != PresentOrValidateState::CommittedWithChanges {
            self.device
                .accept_display_changes(hw_id)
                .map_err(|error| error::device("acceptDisplayChanges", id, error))?;
        }
        Ok(Some(changes))
    }

    fn can_skip_validate(
        &self,
        frame_uses_client_composition: bool,
        earliest_present_time: HostTime,
        previous_present_fence: &Fence,
    ) -> bool {
        // Client composition needs the client target rendered first.
        if !self.config.skip_validate || frame_uses_client_composition {
            return false;
        }
        // Committing now must not present ahead of the earliest present time.
        self.pacer.now() >= earliest_present_time || previous_present_fence.is_pending()
    }

    /// Stores the fences of a frame the device committed during validation.
    fn capture_committed_frame(&self, record: &DisplayRecord, present_fence: Fence) {
        let (release_fences, present_error) = match self.device.release_fences(record.hw_id) {
            Ok(fences) => (fences.into_iter().collect(), None),
            Err(error) => (HashMap::new(), Some(error)),
        };

        let mut frame = record.frame.lock();
        frame.release_fences = release_fences;
        frame.last_present_fence = present_fence;
        frame.validate_was_skipped = true;
        frame.present_error = present_error;
    }

    fn requested_changes(
        &self,
        id: DisplayId,
        hw_id: HwDisplayId,
        counts: ValidateCounts,
    ) -> Result<DeviceRequestedChanges> {
        let changed = self
            .device
            .changed_composition_types(hw_id)
            .map_err(|error| error::device("getChangedCompositionTypes", id, error))?;
        let mut changed_types = HashMap::with_capacity(capacity(counts.num_types));
        changed_types.extend(changed);

        let (display_requests, requests) = self
            .device
            .requests(hw_id)
            .map_err(|error| error::device("getRequests", id, error))?;
        let mut layer_requests = HashMap::with_capacity(capacity(counts.num_requests));
        layer_requests.extend(requests);

        let client_target_property = self
            .device
            .client_target_property(hw_id)
            .unwrap_or_else(|error| {
                tracing::debug!(
                    display = %id,
                    code = error.code(),
                    "no client target property hint"
                );
                ClientTargetProperty::default()
            });

        Ok(DeviceRequestedChanges {
            changed_types,
            display_requests,
            layer_requests,
            client_target_property,
        })
    }

    fn phase_begin(&self, display: DisplayId, phase: PhaseKind) {
        let timestamp = self.pacer.now();
        self.trace(|sink| {
            sink.on_phase_begin(&PhaseBeginEvent {
                display,
                phase,
                timestamp,
            });
        });
    }

    fn phase_end(&self, display: DisplayId, phase: PhaseKind) {
        let timestamp = self.pacer.now();
        self.trace(|sink| {
            sink.on_phase_end(&PhaseEndEvent {
                display,
                phase,
                timestamp,
            });
        });
    }

    fn finish_skipped_present(
        &self,
        display: DisplayId,
        present_error: Option<hal::Error>,
    ) -> Result<()> {
        let flushed = self.device.execute_commands();
        let presented_at = self.pacer.now();
        self.trace(|sink| {
            sink.on_present(&PresentEvent {
                display,
                presented_at,
                skipped_validate: true,
                error: flushed.err().or(present_error),
            });
        });

        flushed.map_err(|error| error::device("executeCommands", display, error))?;
        match present_error {
            Some(error) => Err(error::device("present", display, error)),
            None => Ok(()),
        }
    }
}

fn capacity(count: u32) -> usize {
    usize::try_from(count).unwrap_or(0)
}
