// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display identification.
//!
//! Two namespaces meet here:
//!
//! - [`HwDisplayId`] is the raw handle the hardware device hands out. It is
//!   only meaningful while the device considers the display connected.
//! - [`DisplayId`] is the stable system-level identity. Physical identities
//!   are derived from the connector port and, when available, the product
//!   descriptor decoded from the display's identification data. Virtual
//!   identities are allocated locally.
//!
//! The two identity kinds live in disjoint value ranges (the virtual flag bit),
//! so a raw value can never be mistaken for the other kind.

use alloc::string::String;
use core::fmt;

/// Port assigned to the primary built-in display in legacy addressing mode.
pub const LEGACY_DISPLAY_TYPE_PRIMARY: u8 = 0;

/// Port assigned to the secondary (external) display in legacy addressing
/// mode.
pub const LEGACY_DISPLAY_TYPE_EXTERNAL: u8 = 1;

const FLAG_VIRTUAL: u64 = 1 << 63;
const FLAG_STABLE: u64 = 1 << 62;

/// Device-assigned display handle.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HwDisplayId(pub u64);

impl fmt::Debug for HwDisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HwDisplayId({})", self.0)
    }
}

impl fmt::Display for HwDisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a physical display.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysicalDisplayId(u64);

impl PhysicalDisplayId {
    /// Builds an identity from a port and the manufacturer/model fields of a
    /// parsed product descriptor.
    ///
    /// Two connections producing the same triple map to the same identity, so
    /// the display keeps its identity across reconnects.
    #[inline]
    #[must_use]
    pub const fn from_edid(port: u8, manufacturer_id: u16, model_hash: u32) -> Self {
        Self(
            FLAG_STABLE
                | ((manufacturer_id as u64) << 40)
                | ((model_hash as u64) << 8)
                | port as u64,
        )
    }

    /// Builds a degraded identity from the port alone.
    ///
    /// Used in legacy addressing mode and when identification data fails to
    /// parse.
    #[inline]
    #[must_use]
    pub const fn from_port(port: u8) -> Self {
        Self::from_edid(port, 0, 0)
    }

    /// Returns the connector port encoded in this identity.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the port occupies the low byte"
    )]
    pub const fn port(self) -> u8 {
        self.0 as u8
    }

    /// Returns the raw identity value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for PhysicalDisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalDisplayId({})", self.0)
    }
}

impl fmt::Display for PhysicalDisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Locally allocated identity of a virtual display.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualDisplayId(u64);

impl VirtualDisplayId {
    /// Creates a virtual identity from an allocator sequence number.
    #[inline]
    #[must_use]
    pub const fn new(sequence: u64) -> Self {
        Self(FLAG_VIRTUAL | (sequence & !FLAG_VIRTUAL))
    }

    /// Returns the allocator sequence number.
    #[inline]
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.0 & !FLAG_VIRTUAL
    }

    /// Returns the raw identity value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for VirtualDisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtualDisplayId({})", self.sequence())
    }
}

impl fmt::Display for VirtualDisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of any display known to the composer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DisplayId {
    /// A physical display discovered through hotplug.
    Physical(PhysicalDisplayId),
    /// A virtual display allocated by the pipeline.
    Virtual(VirtualDisplayId),
}

impl DisplayId {
    /// Returns `true` for virtual displays.
    #[inline]
    #[must_use]
    pub const fn is_virtual(self) -> bool {
        matches!(self, Self::Virtual(_))
    }

    /// Returns the physical identity, if this is a physical display.
    #[inline]
    #[must_use]
    pub const fn as_physical(self) -> Option<PhysicalDisplayId> {
        match self {
            Self::Physical(id) => Some(id),
            Self::Virtual(_) => None,
        }
    }

    /// Returns the raw identity value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        match self {
            Self::Physical(id) => id.0,
            Self::Virtual(id) => id.0,
        }
    }

    /// Rebuilds an identity from a value returned by [`value`](Self::value).
    #[inline]
    #[must_use]
    pub const fn from_value(value: u64) -> Self {
        if value & FLAG_VIRTUAL != 0 {
            Self::Virtual(VirtualDisplayId(value))
        } else {
            Self::Physical(PhysicalDisplayId(value))
        }
    }
}

impl From<PhysicalDisplayId> for DisplayId {
    fn from(id: PhysicalDisplayId) -> Self {
        Self::Physical(id)
    }
}

impl From<VirtualDisplayId> for DisplayId {
    fn from(id: VirtualDisplayId) -> Self {
        Self::Virtual(id)
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Physical(id) => write!(f, "{id}"),
            Self::Virtual(id) => write!(f, "virtual:{}", id.sequence()),
        }
    }
}

/// Product descriptor decoded from a display's identification data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceProductInfo {
    /// Human-readable product name.
    pub name: String,
    /// Three-letter PNP manufacturer id.
    pub manufacturer_pnp_id: [u8; 3],
    /// Manufacturer-assigned product code.
    pub product_id: String,
    /// Year of manufacture or model year, if encoded.
    pub manufacture_or_model_year: Option<u16>,
    /// Port-relative address for displays behind a hub, if any.
    pub relative_address: alloc::vec::Vec<u8>,
}

/// Outcome of resolving a hotplug event into a display identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayIdentificationInfo {
    /// Stable identity of the display.
    pub id: PhysicalDisplayId,
    /// Display name; empty when unknown.
    pub name: String,
    /// Decoded product descriptor, if identification data was available and
    /// parsed.
    pub device_product_info: Option<DeviceProductInfo>,
}

impl DisplayIdentificationInfo {
    /// Creates an info record carrying only the identity.
    #[must_use]
    pub fn bare(id: PhysicalDisplayId) -> Self {
        Self {
            id,
            name: String::new(),
            device_product_info: None,
        }
    }
}

/// Raw identification data (typically EDID) read from the device.
pub type DisplayIdentificationData = alloc::vec::Vec<u8>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edid_identity_is_stable_for_identical_descriptors() {
        let a = PhysicalDisplayId::from_edid(3, 0x4c2d, 0xdead_beef);
        let b = PhysicalDisplayId::from_edid(3, 0x4c2d, 0xdead_beef);
        assert_eq!(a, b);
        assert_eq!(a.port(), 3);
        assert_ne!(a, PhysicalDisplayId::from_edid(4, 0x4c2d, 0xdead_beef));
    }

    #[test]
    fn port_identity_differs_from_edid_identity() {
        let legacy = PhysicalDisplayId::from_port(LEGACY_DISPLAY_TYPE_PRIMARY);
        assert_eq!(legacy.port(), LEGACY_DISPLAY_TYPE_PRIMARY);
        assert_ne!(legacy, PhysicalDisplayId::from_edid(0, 1, 0));
    }

    #[test]
    fn virtual_and_physical_ranges_are_disjoint() {
        let v = VirtualDisplayId::new(7);
        assert_eq!(v.sequence(), 7);
        assert_ne!(v.value() & FLAG_VIRTUAL, 0);
        assert_eq!(PhysicalDisplayId::from_port(7).value() & FLAG_VIRTUAL, 0);
        assert!(DisplayId::from(v).is_virtual());
        assert_eq!(DisplayId::from(v).as_physical(), None);
    }

    #[test]
    fn raw_value_preserves_kind() {
        let p = DisplayId::from(PhysicalDisplayId::from_edid(2, 9, 77));
        let v = DisplayId::from(VirtualDisplayId::new(3));
        assert_eq!(DisplayId::from_value(p.value()), p);
        assert_eq!(DisplayId::from_value(v.value()), v);
    }
}
