/// Projection parameters for a [`Camera`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// `fov` is the vertical field of view in radians.
    Perspective {
        fov: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

/// Projection state attached to a camera model.
///
/// The projection matrix is rebuilt lazily: setters only mark it dirty, and
/// [`projection_matrix`](Self::projection_matrix) recomputes it on the next
/// read. The view matrix comes from the owning model's world transform, see
/// [`Scene::view_matrix`](crate::Scene::view_matrix).
///
/// # Example
///
/// ```
/// use phanto::Camera;
///
/// let mut camera = Camera::perspective(std::f32::consts::FRAC_PI_3, 1.0, 0.01, 1000.0);
/// let before = camera.projection_matrix();
///
/// camera.set_aspect(2.0);
/// assert_ne!(camera.projection_matrix(), before);
/// ```
#[derive(Clone, Debug)]
pub struct Camera {
    projection: Projection,
    matrix: glam::Mat4,
    dirty: bool,
}

impl Camera {
    pub fn new(projection: Projection) -> Self {
        Self {
            projection,
            matrix: glam::Mat4::IDENTITY,
            dirty: true,
        }
    }

    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Perspective {
            fov,
            aspect,
            near,
            far,
        })
    }

    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            near,
            far,
        })
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Replaces the projection parameters wholesale.
    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        self.dirty = true;
    }

    /// Sets the aspect ratio. Ignored by orthographic cameras.
    pub fn set_aspect(&mut self, value: f32) {
        if let Projection::Perspective { aspect, .. } = &mut self.projection {
            *aspect = value;
            self.dirty = true;
        }
    }

    /// Sets the vertical field of view in radians. Ignored by orthographic cameras.
    pub fn set_fov(&mut self, value: f32) {
        if let Projection::Perspective { fov, .. } = &mut self.projection {
            *fov = value;
            self.dirty = true;
        }
    }

    pub fn set_clip(&mut self, near_value: f32, far_value: f32) {
        match &mut self.projection {
            Projection::Perspective { near, far, .. } | Projection::Orthographic { near, far, .. } => {
                *near = near_value;
                *far = far_value;
            }
        }
        self.dirty = true;
    }

    /// Whether the next read will rebuild the matrix.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The projection matrix, rebuilt first if any parameter changed.
    pub fn projection_matrix(&mut self) -> glam::Mat4 {
        if self.dirty {
            self.matrix = match self.projection {
                Projection::Perspective {
                    fov,
                    aspect,
                    near,
                    far,
                } => crate::math::perspective(fov, aspect, near, far),
                Projection::Orthographic {
                    left,
                    right,
                    bottom,
                    top,
                    near,
                    far,
                } => crate::math::orthographic(left, right, bottom, top, near, far),
            };
            self.dirty = false;
        }
        self.matrix
    }
}
