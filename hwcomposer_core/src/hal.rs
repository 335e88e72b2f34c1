// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vocabulary of the hardware compositing device.
//!
//! These types mirror the values exchanged with the device: result codes,
//! connection and composition states, power and vsync modes, display
//! attributes, color and content descriptors. Open-ended value sets (color
//! modes, dataspaces, pixel formats) are newtypes over the raw integer with
//! named constants for the values the composer itself refers to.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A non-success result code returned by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// The configuration handle is not valid.
    BadConfig,
    /// The display handle is not valid.
    BadDisplay,
    /// The layer handle is not valid.
    BadLayer,
    /// A parameter was out of range.
    BadParameter,
    /// Validation succeeded but the device requested composition changes.
    HasChanges,
    /// The device ran out of resources.
    NoResources,
    /// Present was called before a successful validate.
    NotValidated,
    /// The operation is not supported by this device or display.
    Unsupported,
    /// A code outside the known range.
    Unknown(i32),
}

impl Error {
    /// Maps a raw device code to an error. Returns `None` for success (0).
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => return None,
            1 => Self::BadConfig,
            2 => Self::BadDisplay,
            3 => Self::BadLayer,
            4 => Self::BadParameter,
            5 => Self::HasChanges,
            6 => Self::NoResources,
            7 => Self::NotValidated,
            8 => Self::Unsupported,
            other => Self::Unknown(other),
        })
    }

    /// Returns the raw device code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::BadConfig => 1,
            Self::BadDisplay => 2,
            Self::BadLayer => 3,
            Self::BadParameter => 4,
            Self::HasChanges => 5,
            Self::NoResources => 6,
            Self::NotValidated => 7,
            Self::Unsupported => 8,
            Self::Unknown(code) => code,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BadConfig => "bad config",
            Self::BadDisplay => "bad display",
            Self::BadLayer => "bad layer",
            Self::BadParameter => "bad parameter",
            Self::HasChanges => "has changes",
            Self::NoResources => "no resources",
            Self::NotValidated => "not validated",
            Self::Unsupported => "unsupported",
            Self::Unknown(_) => "unknown error",
        };
        write!(f, "{name} ({})", self.code())
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Device-assigned layer handle.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HwLayerId(pub u64);

impl fmt::Debug for HwLayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HwLayerId({})", self.0)
    }
}

/// Device-assigned display configuration (mode) handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HwConfigId(pub u32);

/// Opaque reference to a graphics buffer allocated outside the composer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

// ---------------------------------------------------------------------------
// States and modes
// ---------------------------------------------------------------------------

/// Connection state reported by a hotplug notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Connection {
    /// Malformed notification.
    Invalid,
    /// The display was attached.
    Connected,
    /// The display was detached.
    Disconnected,
}

/// How a layer is composed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Composition {
    /// Unset.
    Invalid,
    /// Composed by the client into the client target.
    Client,
    /// Composed by the device.
    Device,
    /// Filled with a solid color by the device.
    SolidColor,
    /// Composed by the device as a cursor.
    Cursor,
    /// Composed by the device from a sideband stream.
    Sideband,
}

/// Display power mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerMode {
    /// Panel off.
    Off,
    /// Low-power ambient mode with updates suspended.
    DozeSuspend,
    /// Low-power ambient mode.
    Doze,
    /// Fully on.
    On,
    /// On with updates suspended.
    OnSuspend,
}

/// Vsync delivery state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Vsync {
    /// Unset.
    Invalid,
    /// Vsync callbacks enabled.
    Enable,
    /// Vsync callbacks disabled.
    Disable,
}

/// Device-wide optional feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Sideband stream layers are supported.
    SidebandStream,
    /// The client must not apply the color transform itself.
    SkipClientColorTransform,
    /// Present fences do not reflect real scanout.
    PresentFenceIsNotReliable,
    /// The device may commit a frame during present-or-validate.
    SkipValidate,
}

/// Per-display optional feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisplayCapability {
    /// The client must not apply the color transform itself.
    SkipClientColorTransform,
    /// The display supports the doze power modes.
    Doze,
    /// The display supports brightness control.
    Brightness,
    /// The display can show protected content.
    ProtectedContents,
    /// The display supports auto low-latency mode.
    AutoLowLatencyMode,
}

/// Display configuration attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Width in pixels.
    Width,
    /// Height in pixels.
    Height,
    /// Vsync period in nanoseconds.
    VsyncPeriod,
    /// Horizontal dots per thousand inches.
    DpiX,
    /// Vertical dots per thousand inches.
    DpiY,
    /// Group of configurations that can be switched between seamlessly.
    ConfigGroup,
}

/// How a display is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    /// Built into the device.
    Internal,
    /// Attached through an external connector.
    External,
}

/// Hint sent alongside a color transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorTransformHint {
    /// The matrix is the identity.
    Identity,
    /// The matrix is arbitrary.
    ArbitraryMatrix,
}

/// Content category a display is optimized for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// No particular category.
    None,
    /// Graphics content such as documents.
    Graphics,
    /// Still photos.
    Photo,
    /// Film content.
    Cinema,
    /// Games.
    Game,
}

// ---------------------------------------------------------------------------
// Open value sets
// ---------------------------------------------------------------------------

/// Color mode identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ColorMode(pub i32);

impl ColorMode {
    /// The panel's native gamut.
    pub const NATIVE: Self = Self(0);
    /// sRGB.
    pub const SRGB: Self = Self(7);
    /// Display P3.
    pub const DISPLAY_P3: Self = Self(9);
}

/// Render intent identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RenderIntent(pub i32);

impl RenderIntent {
    /// Colorimetric rendering without enhancement.
    pub const COLORIMETRIC: Self = Self(0);
    /// Enhanced colorimetric rendering.
    pub const ENHANCE: Self = Self(1);
}

/// Dataspace identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Dataspace(pub i32);

impl Dataspace {
    /// Unspecified.
    pub const UNKNOWN: Self = Self(0);
    /// sRGB linear.
    pub const SRGB_LINEAR: Self = Self(0x0813_0000);
    /// sRGB.
    pub const SRGB: Self = Self(0x0814_2000);
}

/// Pixel format identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PixelFormat(pub i32);

impl PixelFormat {
    /// Unspecified.
    pub const UNSPECIFIED: Self = Self(0);
    /// 8-bit RGBA.
    pub const RGBA_8888: Self = Self(1);
    /// 8-bit RGB with padding.
    pub const RGBX_8888: Self = Self(2);
    /// 16-bit float RGBA.
    pub const RGBA_FP16: Self = Self(0x16);
}

/// HDR technology identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hdr(pub i32);

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Display-level request flags returned after validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct DisplayRequest(pub u32);

impl DisplayRequest {
    /// No request.
    pub const NONE: Self = Self(0);
    /// The client target should be flipped.
    pub const FLIP_CLIENT_TARGET: Self = Self(1 << 0);
    /// The client target should be written to the output buffer.
    pub const WRITE_CLIENT_TARGET_TO_OUTPUT: Self = Self(1 << 1);

    /// Returns `true` if every flag in `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Per-layer request flags returned after validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct LayerRequest(pub u32);

impl LayerRequest {
    /// The client target should be cleared under this layer.
    pub const CLEAR_CLIENT_TARGET: Self = Self(1 << 0);
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// One display mode, assembled from per-attribute queries.
///
/// An attribute the device failed to report reads as `-1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HwcDisplayMode {
    /// Configuration handle.
    pub hwc_id: HwConfigId,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Vsync period in nanoseconds.
    pub vsync_period: i32,
    /// Horizontal dots per thousand inches.
    pub dpi_x: i32,
    /// Vertical dots per thousand inches.
    pub dpi_y: i32,
    /// Seamless switching group.
    pub config_group: i32,
}

/// HDR support of a display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HdrCapabilities {
    /// Supported HDR technologies.
    pub types: Vec<Hdr>,
    /// Peak luminance in nits.
    pub max_luminance: f32,
    /// Maximum frame-average luminance in nits.
    pub max_average_luminance: f32,
    /// Minimum luminance in nits.
    pub min_luminance: f32,
}

/// A per-layer generic metadata key advertised by the device.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayerGenericMetadataKey {
    /// Reverse-DNS key name.
    pub name: String,
    /// Whether the device requires the key to be set.
    pub mandatory: bool,
}

/// Format of content samples collected by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentSamplingAttributes {
    /// Sample pixel format.
    pub format: PixelFormat,
    /// Sample dataspace.
    pub dataspace: Dataspace,
    /// Bitmask of sampled components.
    pub component_mask: u8,
}

/// Histogram of displayed content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentSample {
    /// Number of frames sampled.
    pub frame_count: u64,
    /// One histogram per sampled component.
    pub histograms: [Vec<u64>; 4],
}
