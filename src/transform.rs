//! Position, Euler rotation, and scale for anything placed in a scene.
//!
//! A [`Transform`] keeps its inputs (`position`, `rotate` in degrees, `scale`)
//! separate from the derived state (the local matrix and the forward/up/right
//! axes). Mutators only touch the inputs; call [`Transform::update`] to
//! refresh the derived state. There is no dirty tracking, so a transform that
//! was moved but not updated still reports its old matrix.
//!
//! ```
//! use phanto::Transform;
//!
//! let mut t = Transform::new();
//! t.set_translate(0.0, 2.0, -5.0).rotate(0.0, 90.0, 0.0).update();
//!
//! // The forward axis (+Z) now points along +X.
//! assert!((t.forward().x - 1.0).abs() < 1e-6);
//! ```
//!
//! # Composition order
//!
//! The local matrix is always `translate · rotateY · rotateX · rotateZ · scale`:
//! a vertex is scaled, then rotated about Z, X and Y, then translated.

use glam::{Mat4, Vec3, Vec4};

/// Position, rotation (Euler degrees), and scale with a cached local matrix.
#[derive(Clone, Debug)]
pub struct Transform {
    /// Translation.
    pub position: Vec3,
    /// Euler angles in degrees, applied Y, then X, then Z.
    pub rotate: Vec3,
    /// Per-axis scale factors.
    pub scale: Vec3,
    matrix: Mat4,
    forward: Vec3,
    up: Vec3,
    right: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotate: Vec3::ZERO,
            scale: Vec3::ONE,
            matrix: Mat4::IDENTITY,
            forward: Vec3::Z,
            up: Vec3::Y,
            right: Vec3::X,
        }
    }
}

impl Transform {
    /// Creates an identity transform (origin, no rotation, unit scale).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an updated transform positioned at the given location.
    pub fn from_position(position: Vec3) -> Self {
        let mut t = Self {
            position,
            ..Default::default()
        };
        t.update();
        t
    }

    /// Resets the inputs to identity. Derived state is left for [`update`](Self::update).
    pub fn reset(&mut self) -> &mut Self {
        self.position = Vec3::ZERO;
        self.rotate = Vec3::ZERO;
        self.scale = Vec3::ONE;
        self
    }

    pub fn set_translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    /// Sets the Euler angles, in degrees.
    pub fn set_rotate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.rotate = Vec3::new(x, y, z);
        self
    }

    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.scale = Vec3::new(x, y, z);
        self
    }

    /// Moves by the given offset in parent space.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.position += Vec3::new(x, y, z);
        self
    }

    /// Adds to the Euler angles, in degrees.
    pub fn rotate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.rotate += Vec3::new(x, y, z);
        self
    }

    /// Multiplies the current scale per axis.
    pub fn scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.scale *= Vec3::new(x, y, z);
        self
    }

    /// Moves `v` units along the right axis from the last [`update`](Self::update).
    pub fn pan_x(&mut self, v: f32) -> &mut Self {
        let d = self.right * v;
        self.translate(d.x, d.y, d.z)
    }

    /// Moves `v` units along the up axis from the last [`update`](Self::update).
    pub fn pan_y(&mut self, v: f32) -> &mut Self {
        let d = self.up * v;
        self.translate(d.x, d.y, d.z)
    }

    /// Moves `v` units along the forward axis from the last [`update`](Self::update).
    pub fn pan_z(&mut self, v: f32) -> &mut Self {
        let d = self.forward * v;
        self.translate(d.x, d.y, d.z)
    }

    /// Recomputes the local matrix and the basis axes from the current inputs.
    pub fn update(&mut self) -> &mut Self {
        self.matrix = Mat4::from_translation(self.position)
            * Mat4::from_rotation_y(self.rotate.y.to_radians())
            * Mat4::from_rotation_x(self.rotate.x.to_radians())
            * Mat4::from_rotation_z(self.rotate.z.to_radians())
            * Mat4::from_scale(self.scale);

        self.forward = (self.matrix * Vec4::new(0.0, 0.0, 1.0, 0.0)).truncate();
        self.up = (self.matrix * Vec4::new(0.0, 1.0, 0.0, 0.0)).truncate();
        self.right = (self.matrix * Vec4::new(1.0, 0.0, 0.0, 0.0)).truncate();
        self
    }

    /// The local matrix as of the last [`update`](Self::update).
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Local +Z transformed by the matrix (includes scale; not normalized).
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Local +Y transformed by the matrix.
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Local +X transformed by the matrix.
    pub fn right(&self) -> Vec3 {
        self.right
    }
}
