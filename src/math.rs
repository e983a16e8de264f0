//! Matrix and vector helpers on top of glam.
//!
//! glam already covers composition, transposition and the axis rotations.
//! This module adds the operations whose failure modes matter to the scene
//! graph: inversion and normal matrices report a singular input as `None`
//! instead of producing infinities, and arbitrary-axis rotation refuses a
//! degenerate axis. These run every frame, so failure is a plain `Option`
//! the caller checks and skips on.
//!
//! All matrices are column-major. `a * b` applies `b` first, so chained
//! multiplications read in call order:
//!
//! ```
//! use phanto::math;
//! use glam::{Mat4, Vec3};
//!
//! let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
//!     * Mat4::from_rotation_y(0.5)
//!     * Mat4::from_scale(Vec3::splat(2.0));
//! let inv = math::try_invert(&m).unwrap();
//! assert!((m * inv).abs_diff_eq(Mat4::IDENTITY, 1e-5));
//! ```

use glam::{Mat3, Mat4, Vec3, Vec4};

/// Axes shorter than this cannot define a rotation.
pub const AXIS_EPSILON: f32 = 1e-6;

/// Inverts a 4x4 matrix.
///
/// Returns `None` only when the determinant is exactly zero; nearly singular
/// matrices still invert.
pub fn try_invert(m: &Mat4) -> Option<Mat4> {
    let det = m.determinant();
    if det == 0.0 {
        return None;
    }
    Some(m.inverse())
}

/// Computes the normal matrix: the transpose of the inverse of the
/// upper-left 3x3 of `m`.
///
/// Normals transformed by this matrix stay perpendicular to their surface
/// under non-uniform scale. Returns `None` when the 3x3 block is singular.
pub fn normal_matrix(m: &Mat4) -> Option<Mat3> {
    let upper = Mat3::from_mat4(*m);
    let det = upper.determinant();
    if det == 0.0 {
        return None;
    }
    Some(upper.inverse().transpose())
}

/// Post-multiplies `m` by a rotation of `rad` radians about `axis`.
///
/// The axis does not need to be normalized. Returns `None` when its length is
/// below [`AXIS_EPSILON`].
pub fn try_rotate_axis(m: &Mat4, rad: f32, axis: Vec3) -> Option<Mat4> {
    let len = axis.length();
    if len.abs() < AXIS_EPSILON {
        return None;
    }
    Some(*m * Mat4::from_axis_angle(axis / len, rad))
}

/// OpenGL-convention perspective projection (right-handed, z in [-1, 1]).
///
/// `fovy` is the vertical field of view in radians.
pub fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fovy, aspect, near, far)
}

/// OpenGL-convention orthographic projection (right-handed, z in [-1, 1]).
pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    Mat4::orthographic_rh_gl(left, right, bottom, top, near, far)
}

/// Transforms a homogeneous vector. A `w` of zero transforms a direction
/// (translation is ignored).
pub fn transform_vec4(m: &Mat4, v: Vec4) -> Vec4 {
    *m * v
}

/// Cross product of two 3-vectors.
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    a.cross(b)
}

/// Euclidean distance between two points.
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

/// Linearly remaps `value` from `[min, max]` to `[out_min, out_max]`.
///
/// No clamping is applied; values outside the input range extrapolate.
pub fn map_range(value: f32, min: f32, max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (out_max - out_min) * (value - min) / (max - min)
}
