// Copyright 2026 the Hwcomposer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 color transform.
//!
//! The device applies this matrix to linear RGBA after composition. Only the
//! operations the composer needs are provided: identity detection (which picks
//! the transform hint sent alongside the matrix), composition, and the flat
//! layout handed to the device.

use core::ops::Mul;

/// A column-major 4×4 color matrix stored as `[[f32; 4]; 4]`.
///
/// Each inner array is one *column*. Column 3 carries the additive offset
/// applied to each output channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorTransform {
    /// Four columns, each a 4-element array `[r, g, b, a]`.
    pub cols: [[f32; 4]; 4],
}

impl ColorTransform {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a matrix from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f32; 4], col1: [f32; 4], col2: [f32; 4], col3: [f32; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Creates a per-channel gain matrix.
    #[inline]
    #[must_use]
    pub const fn from_gains(r: f32, g: f32, b: f32) -> Self {
        Self {
            cols: [
                [r, 0.0, 0.0, 0.0],
                [0.0, g, 0.0, 0.0],
                [0.0, 0.0, b, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Returns the 16 entries in column-major order, as the device expects.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [f32; 16] {
        let c = self.cols;
        [
            c[0][0], c[0][1], c[0][2], c[0][3], c[1][0], c[1][1], c[1][2], c[1][3], c[2][0],
            c[2][1], c[2][2], c[2][3], c[3][0], c[3][1], c[3][2], c[3][3],
        ]
    }

    /// Returns `true` if this matrix is exactly the identity.
    ///
    /// Exact comparison; a matrix that is merely close to identity is still
    /// sent as an arbitrary matrix.
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Is every entry [finite]?
    ///
    /// [finite]: f32::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for ColorTransform {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for ColorTransform {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f32; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, v) in col.iter_mut().enumerate() {
                *v = a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
            }
        }
        Self { cols: out }
    }
}
