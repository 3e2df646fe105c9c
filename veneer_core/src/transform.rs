// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 transforms for render-tree composition.
//!
//! Composition follows the usual column-vector convention: `a * b` applies
//! `b` first, then `a`. During spec resolution a node's world transform is
//! therefore `parent * local`, so a child's own transform is applied before
//! everything it inherits.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A column-major 4×4 affine transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, which is also the order
/// CSS `matrix3d()` expects its sixteen arguments in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from a column-major 2-D array.
    #[inline]
    #[must_use]
    pub const fn from_cols_array_2d(cols: [[f64; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Returns the translation component `[x, y, z]`.
    #[inline]
    #[must_use]
    pub const fn translation(self) -> [f64; 3] {
        [self.cols[3][0], self.cols[3][1], self.cols[3][2]]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the X axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_x(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, s, 0.0],
                [0.0, -s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Y axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_y(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, 0.0, -s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Returns `self` followed by a translation of `v`.
    ///
    /// The translation happens in the outer (parent) frame, so it is not
    /// affected by any rotation or scale in `self`.
    #[inline]
    #[must_use]
    pub fn then_move(self, v: [f64; 3]) -> Self {
        let mut out = self;
        out.cols[3][0] += v[0];
        out.cols[3][1] += v[1];
        out.cols[3][2] += v[2];
        out
    }

    /// Returns a translation of `v` followed by `self`.
    ///
    /// The translation happens in the inner (local) frame and is carried
    /// through `self`'s linear part.
    #[inline]
    #[must_use]
    pub fn move_then(self, v: [f64; 3]) -> Self {
        self.then_move(self.transform_vector(v))
    }

    /// Applies only the linear 3×3 part of the transform to a vector.
    ///
    /// Used to express an offset measured in a parent's box in the
    /// coordinate frame that box was placed with.
    #[inline]
    #[must_use]
    pub fn transform_vector(self, v: [f64; 3]) -> [f64; 3] {
        let c = &self.cols;
        [
            v[0] * c[0][0] + v[1] * c[1][0] + v[2] * c[2][0],
            v[0] * c[0][1] + v[1] * c[1][1] + v[2] * c[2][1],
            v[0] * c[0][2] + v[1] * c[1][2] + v[2] * c[2][2],
        ]
    }

    /// Applies the full transform to a point.
    #[inline]
    #[must_use]
    pub fn transform_point(self, p: [f64; 3]) -> [f64; 3] {
        let v = self.transform_vector(p);
        let t = self.translation();
        [v[0] + t[0], v[1] + t[1], v[2] + t[2]]
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;

    fn approx(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn identity_multiply() {
        let t = Transform3d::from_translation(1.0, 2.0, 3.0);
        assert_eq!(Transform3d::IDENTITY * t, t);
        assert_eq!(t * Transform3d::IDENTITY, t);
        assert_eq!(Transform3d::default(), Transform3d::IDENTITY);
    }

    #[test]
    fn translation_composition() {
        let a = Transform3d::from_translation(1.0, 0.0, 0.0);
        let b = Transform3d::from_translation(0.0, 2.0, 0.0);
        assert_eq!((a * b).translation(), [1.0, 2.0, 0.0]);
    }

    #[test]
    fn scale_then_translate() {
        let s = Transform3d::from_scale(2.0, 2.0, 2.0);
        let t = Transform3d::from_translation(3.0, 4.0, 0.0);
        // Scale first, then translate: T * S
        let combined = t * s;
        assert_eq!(combined.col(0), [2.0, 0.0, 0.0, 0.0]);
        assert_eq!(combined.col(3), [3.0, 4.0, 0.0, 1.0]);
    }

    #[test]
    fn rotation_z_ninety_degrees() {
        let r = Transform3d::from_rotation_z(FRAC_PI_2);
        assert!(approx(r.transform_point([1.0, 0.0, 0.0]), [0.0, 1.0, 0.0]));
    }

    #[test]
    fn translate_and_rotate_do_not_commute() {
        let t = Transform3d::from_translation(10.0, 0.0, 0.0);
        let r = Transform3d::from_rotation_z(FRAC_PI_2);

        // Translate first, then rotate: (0,0) -> (10,0) -> (0,10).
        let translate_then_rotate = r * t;
        // Rotate first, then translate: (0,0) -> (0,0) -> (10,0).
        let rotate_then_translate = t * r;

        let origin = [0.0, 0.0, 0.0];
        assert!(approx(
            translate_then_rotate.transform_point(origin),
            [0.0, 10.0, 0.0]
        ));
        assert!(approx(
            rotate_then_translate.transform_point(origin),
            [10.0, 0.0, 0.0]
        ));
        assert_ne!(translate_then_rotate, rotate_then_translate);
    }

    #[test]
    fn then_move_ignores_linear_part() {
        let r = Transform3d::from_rotation_z(FRAC_PI_2);
        let moved = r.then_move([5.0, 0.0, 0.0]);
        assert!(approx(moved.translation(), [5.0, 0.0, 0.0]));
    }

    #[test]
    fn move_then_is_rotated() {
        let r = Transform3d::from_rotation_z(FRAC_PI_2);
        let moved = r.move_then([5.0, 0.0, 0.0]);
        assert!(approx(moved.translation(), [0.0, 5.0, 0.0]));
        let expected = r * Transform3d::from_translation(5.0, 0.0, 0.0);
        assert!(approx(moved.translation(), expected.translation()));
    }

    #[test]
    fn rotation_x_and_y_preserve_axis() {
        let rx = Transform3d::from_rotation_x(FRAC_PI_2);
        assert!(approx(rx.transform_point([1.0, 0.0, 0.0]), [1.0, 0.0, 0.0]));
        assert!(approx(rx.transform_point([0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]));

        let ry = Transform3d::from_rotation_y(FRAC_PI_2);
        assert!(approx(ry.transform_point([0.0, 1.0, 0.0]), [0.0, 1.0, 0.0]));
        assert!(approx(ry.transform_point([0.0, 0.0, 1.0]), [1.0, 0.0, 0.0]));
    }
}
