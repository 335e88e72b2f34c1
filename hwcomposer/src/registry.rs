// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display registry.
//!
//! The registry maps device handles to display identities and owns the
//! per-display state. It is shared between the frame thread and the device
//! callback thread.
//!
//! # Locking
//!
//! The structural lock (a `RwLock` over the maps) is held only for lookups and
//! insert/erase, never across a device call. Lookups hand out an
//! `Arc<DisplayRecord>` so the caller can drop the structural lock before
//! talking to the device. Each record then carries its own locks:
//!
//! - `vsync`: last vsync timestamp and trace toggle (callback thread).
//! - `vsync_enabled`: held across the single set-vsync device call.
//! - `frame`: skip-validate bookkeeping and fences (frame thread).
//!
//! `connected` is atomic so disconnect notifications never wait on a frame in
//! flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};

use hwcomposer_core::display::{DisplayId, HwDisplayId, PhysicalDisplayId, VirtualDisplayId};
use hwcomposer_core::fence::Fence;
use hwcomposer_core::hal::{self, HwLayerId, Vsync};

/// Vsync filter state.
#[derive(Debug, Default)]
pub(crate) struct VsyncState {
    /// Raw device timestamp of the last forwarded vsync.
    pub(crate) last_hw_vsync: Option<i64>,
    /// Alternating trace counter value.
    pub(crate) toggle: bool,
}

/// Per-frame negotiation state and fences.
#[derive(Debug)]
pub(crate) struct FrameState {
    pub(crate) validate_was_skipped: bool,
    /// Release fence query error captured while committing during validation.
    pub(crate) present_error: Option<hal::Error>,
    pub(crate) last_present_fence: Fence,
    pub(crate) release_fences: HashMap<HwLayerId, Fence>,
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            validate_was_skipped: false,
            present_error: None,
            last_present_fence: Fence::NO_FENCE,
            release_fences: HashMap::new(),
        }
    }
}

/// State of one display.
#[derive(Debug)]
pub(crate) struct DisplayRecord {
    pub(crate) hw_id: HwDisplayId,
    pub(crate) is_virtual: bool,
    connected: AtomicBool,
    pub(crate) vsync: Mutex<VsyncState>,
    pub(crate) vsync_enabled: Mutex<Vsync>,
    pub(crate) frame: Mutex<FrameState>,
}

impl DisplayRecord {
    fn new(hw_id: HwDisplayId, is_virtual: bool) -> Self {
        Self {
            hw_id,
            is_virtual,
            connected: AtomicBool::new(true),
            vsync: Mutex::new(VsyncState::default()),
            vsync_enabled: Mutex::new(Vsync::Disable),
            frame: Mutex::new(FrameState::default()),
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }
}

/// How physical displays are identified, fixed by the first connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AddressingMode {
    /// Two fixed ports, primary and external.
    Legacy,
    /// Identities parsed from identification data.
    Generalized,
}

#[derive(Debug, Default)]
struct RegistryState {
    displays: HashMap<DisplayId, Arc<DisplayRecord>>,
    physical_ids: HashMap<HwDisplayId, PhysicalDisplayId>,
    internal_hw_id: Option<HwDisplayId>,
    external_hw_id: Option<HwDisplayId>,
    addressing_mode: Option<AddressingMode>,
}

/// Handle-to-identity mapping and per-display state.
#[derive(Debug, Default)]
pub(crate) struct DisplayRegistry {
    state: RwLock<RegistryState>,
    next_virtual: AtomicU64,
}

impl DisplayRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `display`, if known.
    pub(crate) fn lookup(&self, display: DisplayId) -> Option<Arc<DisplayRecord>> {
        self.state.read().displays.get(&display).cloned()
    }

    /// Creates (or replaces) the record of a physical display and maps
    /// `hw_id` to it.
    ///
    /// The first handle ever registered becomes the internal display and the
    /// next distinct handle the external one, until
    /// [`remove`](Self::remove) frees a slot.
    pub(crate) fn allocate_physical(&self, hw_id: HwDisplayId, display: PhysicalDisplayId) {
        let mut state = self.state.write();
        state.physical_ids.insert(hw_id, display);

        if state.internal_hw_id.is_none() {
            state.internal_hw_id = Some(hw_id);
        } else if state.internal_hw_id != Some(hw_id) && state.external_hw_id.is_none() {
            state.external_hw_id = Some(hw_id);
        }

        let previous = state.displays.insert(
            DisplayId::Physical(display),
            Arc::new(DisplayRecord::new(hw_id, false)),
        );
        // A display that reappears under a new handle leaves its old handle
        // mapped to the same identity; drop that mapping and hand its slot
        // to the new handle.
        if let Some(previous) = previous
            && previous.hw_id != hw_id
            && state.physical_ids.get(&previous.hw_id) == Some(&display)
        {
            state.physical_ids.remove(&previous.hw_id);
            if state.internal_hw_id == Some(previous.hw_id) {
                state.internal_hw_id = Some(hw_id);
                if state.external_hw_id == Some(hw_id) {
                    state.external_hw_id = None;
                }
            } else if state.external_hw_id == Some(previous.hw_id) {
                state.external_hw_id = Some(hw_id);
            }
        }
    }

    /// Reserves a fresh virtual identity. Identities are never reused.
    pub(crate) fn next_virtual_id(&self) -> VirtualDisplayId {
        VirtualDisplayId::new(self.next_virtual.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates the record of a virtual display.
    pub(crate) fn insert_virtual(&self, display: VirtualDisplayId, hw_id: HwDisplayId) {
        self.state.write().displays.insert(
            DisplayId::Virtual(display),
            Arc::new(DisplayRecord::new(hw_id, true)),
        );
    }

    /// Removes the record and handle mapping of `display`, freeing its
    /// internal/external slot.
    pub(crate) fn remove(&self, display: DisplayId) -> Option<Arc<DisplayRecord>> {
        let mut state = self.state.write();
        let record = state.displays.remove(&display)?;
        let hw_id = record.hw_id;
        if !record.is_virtual {
            if state.internal_hw_id == Some(hw_id) {
                state.internal_hw_id = None;
            } else if state.external_hw_id == Some(hw_id) {
                state.external_hw_id = None;
            }
            state.physical_ids.remove(&hw_id);
        }
        Some(record)
    }

    pub(crate) fn to_physical_display_id(&self, hw_id: HwDisplayId) -> Option<PhysicalDisplayId> {
        self.state.read().physical_ids.get(&hw_id).copied()
    }

    pub(crate) fn hw_id_of_physical(&self, display: PhysicalDisplayId) -> Option<HwDisplayId> {
        self.state
            .read()
            .displays
            .get(&DisplayId::Physical(display))
            .filter(|record| !record.is_virtual)
            .map(|record| record.hw_id)
    }

    pub(crate) fn hw_id_of_virtual(&self, display: VirtualDisplayId) -> Option<HwDisplayId> {
        self.state
            .read()
            .displays
            .get(&DisplayId::Virtual(display))
            .filter(|record| record.is_virtual)
            .map(|record| record.hw_id)
    }

    pub(crate) fn is_connected(&self, display: PhysicalDisplayId) -> bool {
        self.lookup(DisplayId::Physical(display))
            .is_some_and(|record| record.is_connected())
    }

    /// Physical identities with a record, in no particular order.
    pub(crate) fn physical_display_ids(&self) -> Vec<PhysicalDisplayId> {
        self.state
            .read()
            .displays
            .keys()
            .filter_map(|id| id.as_physical())
            .collect()
    }

    pub(crate) fn internal_hw_id(&self) -> Option<HwDisplayId> {
        self.state.read().internal_hw_id
    }

    pub(crate) fn external_hw_id(&self) -> Option<HwDisplayId> {
        self.state.read().external_hw_id
    }

    pub(crate) fn internal_display_id(&self) -> Option<PhysicalDisplayId> {
        let state = self.state.read();
        let hw_id = state.internal_hw_id?;
        state.physical_ids.get(&hw_id).copied()
    }

    pub(crate) fn multi_display_support(&self) -> bool {
        self.state.read().addressing_mode == Some(AddressingMode::Generalized)
    }

    /// Fixes the addressing mode if none was chosen yet.
    ///
    /// Returns `true` if `mode` was selected by this call. Later calls never
    /// change it, even after every display was destroyed.
    pub(crate) fn select_addressing_mode(&self, mode: AddressingMode) -> bool {
        let mut state = self.state.write();
        if state.addressing_mode.is_some() {
            return false;
        }
        state.addressing_mode = Some(mode);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(p: u8) -> PhysicalDisplayId {
        PhysicalDisplayId::from_port(p)
    }

    #[test]
    fn first_two_handles_claim_the_legacy_slots() {
        let registry = DisplayRegistry::new();
        registry.allocate_physical(HwDisplayId(10), port(0));
        registry.allocate_physical(HwDisplayId(10), port(0));
        assert_eq!(registry.internal_hw_id(), Some(HwDisplayId(10)));
        assert_eq!(registry.external_hw_id(), None);

        registry.allocate_physical(HwDisplayId(11), port(1));
        registry.allocate_physical(HwDisplayId(12), port(2));
        assert_eq!(registry.internal_hw_id(), Some(HwDisplayId(10)));
        assert_eq!(registry.external_hw_id(), Some(HwDisplayId(11)));
        assert_eq!(registry.internal_display_id(), Some(port(0)));
    }

    #[test]
    fn remove_frees_slot_and_mapping() {
        let registry = DisplayRegistry::new();
        registry.allocate_physical(HwDisplayId(10), port(0));
        registry.allocate_physical(HwDisplayId(11), port(1));

        assert!(registry.remove(DisplayId::Physical(port(1))).is_some());
        assert_eq!(registry.external_hw_id(), None);
        assert_eq!(registry.to_physical_display_id(HwDisplayId(11)), None);
        assert!(registry.lookup(DisplayId::Physical(port(1))).is_none());
        assert!(registry.remove(DisplayId::Physical(port(1))).is_none());

        registry.allocate_physical(HwDisplayId(13), port(1));
        assert_eq!(registry.external_hw_id(), Some(HwDisplayId(13)));
    }

    #[test]
    fn physical_and_virtual_queries_do_not_cross() {
        let registry = DisplayRegistry::new();
        registry.allocate_physical(HwDisplayId(10), port(0));
        let virtual_id = registry.next_virtual_id();
        registry.insert_virtual(virtual_id, HwDisplayId(99));

        assert_eq!(registry.hw_id_of_virtual(virtual_id), Some(HwDisplayId(99)));
        assert_eq!(registry.hw_id_of_physical(port(0)), Some(HwDisplayId(10)));
        assert_eq!(registry.to_physical_display_id(HwDisplayId(99)), None);
        assert_eq!(registry.physical_display_ids(), vec![port(0)]);
    }

    #[test]
    fn addressing_mode_is_selected_once() {
        let registry = DisplayRegistry::new();
        assert!(!registry.multi_display_support());
        assert!(registry.select_addressing_mode(AddressingMode::Legacy));
        assert!(!registry.select_addressing_mode(AddressingMode::Generalized));
        assert!(!registry.multi_display_support());
    }

    #[test]
    fn virtual_ids_are_never_reused() {
        let registry = DisplayRegistry::new();
        let a = registry.next_virtual_id();
        registry.insert_virtual(a, HwDisplayId(1));
        registry.remove(DisplayId::Virtual(a));
        let b = registry.next_virtual_id();
        assert_ne!(a, b);
    }

    #[test]
    fn bare_disconnect_keeps_record() {
        let registry = DisplayRegistry::new();
        registry.allocate_physical(HwDisplayId(10), port(0));
        let record = registry.lookup(DisplayId::Physical(port(0))).unwrap();
        record.set_connected(false);
        assert!(!registry.is_connected(port(0)));
        assert!(registry.lookup(DisplayId::Physical(port(0))).is_some());
    }

    #[test]
    fn reappearing_under_new_handle_drops_old_mapping() {
        let registry = DisplayRegistry::new();
        let id = PhysicalDisplayId::from_edid(0, 7, 9);
        registry.allocate_physical(HwDisplayId(10), id);
        registry.allocate_physical(HwDisplayId(20), id);
        assert_eq!(registry.to_physical_display_id(HwDisplayId(10)), None);
        assert_eq!(registry.to_physical_display_id(HwDisplayId(20)), Some(id));
        assert_eq!(registry.hw_id_of_physical(id), Some(HwDisplayId(20)));
        assert_eq!(registry.internal_hw_id(), Some(HwDisplayId(20)));
        assert_eq!(registry.external_hw_id(), None);
        assert_eq!(registry.internal_display_id(), Some(id));
    }
}
