use crate::geometry::GeometryId;
use crate::material::Material;
use crate::transform::Transform;

/// Handle to a model spawned into a [`Scene`](super::Scene).
///
/// Cameras and lights are models too. A handle outlives the model it names;
/// scene lookups with a deleted handle fail with
/// [`SceneError::UnknownModel`](crate::SceneError::UnknownModel).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelId(pub(crate) hecs::Entity);

/// Non-owning link to the parent model, stored on the child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Parent(pub(crate) hecs::Entity);

/// Marks a model whose geometry was created for it by the scene. The
/// geometry is removed together with the model.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OwnsGeometry;

/// Per-model render state toggled around each draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extras {
    /// Back-face culling.
    pub cull: bool,
    /// Polygon offset fill, for coplanar overlays.
    pub polygon_offset: bool,
}

impl Default for Extras {
    fn default() -> Self {
        Self {
            cull: true,
            polygon_offset: false,
        }
    }
}

/// Geometry and material for a model that can be drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct Renderable {
    pub geometry: GeometryId,
    pub material: Material,
    pub extras: Extras,
}

/// Everything needed to spawn a model.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use phanto::{Model, Scene, Transform, material, primitives};
///
/// let mut scene = Scene::new();
/// let cube = scene.add_geometry(primitives::cube(1.0, &primitives::CubeFace::ALL));
///
/// let body = scene
///     .spawn(Model::new(cube, material::basic(Vec3::ONE)))
///     .unwrap();
/// let turret = scene
///     .spawn(
///         Model::new(cube, material::basic(Vec3::X))
///             .with_transform(Transform::from_position(Vec3::Y))
///             .with_parent(body),
///     )
///     .unwrap();
///
/// assert_eq!(scene.parent(turret), Some(body));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Model {
    pub transform: Transform,
    pub parent: Option<ModelId>,
    pub renderable: Option<Renderable>,
}

impl Model {
    /// A drawable model with default extras.
    pub fn new(geometry: GeometryId, material: Material) -> Self {
        Self {
            transform: Transform::new(),
            parent: None,
            renderable: Some(Renderable {
                geometry,
                material,
                extras: Extras::default(),
            }),
        }
    }

    /// A model with only a transform, used as a pivot or group node.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_parent(mut self, parent: ModelId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the render state. Has no effect on a model without geometry.
    pub fn with_extras(mut self, extras: Extras) -> Self {
        if let Some(renderable) = &mut self.renderable {
            renderable.extras = extras;
        }
        self
    }
}
