use glam::{Mat3, Mat4, Vec3};
use hecs::{EntityBuilder, World};
use log::debug;

use crate::camera::Camera;
use crate::error::SceneError;
use crate::geometry::{Geometry, GeometryId, RenderInfo};
use crate::gl::GraphicsContext;
use crate::light::{AmbientLight, DirectionalLight, PointLight};
use crate::material::{self, Material};
use crate::math;
use crate::primitives;
use crate::shader::ShaderRegistry;
use crate::transform::Transform;

use super::model::{Extras, Model, ModelId, OwnsGeometry, Parent, Renderable};

/// Models added for drawing under one shader, in insertion order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialGroup {
    pub shader: String,
    pub items: Vec<ModelId>,
}

/// A retained scene: models in a `hecs` world, the geometry they draw, the
/// active camera, and the light registries.
///
/// Spawning a model only stores it. A model is drawn once it is added with
/// [`add_item`](Self::add_item), which files it under its material's shader.
/// Lights are registered the same way, so a light can exist in the scene
/// without contributing to the lit shaders.
pub struct Scene {
    world: World,
    geometries: Vec<Option<Geometry>>,
    free_geometries: Vec<usize>,
    camera: Option<ModelId>,
    groups: Vec<MaterialGroup>,
    directional_lights: Vec<ModelId>,
    point_lights: Vec<ModelId>,
    ambient_light: Option<AmbientLight>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            geometries: Vec::new(),
            free_geometries: Vec::new(),
            camera: None,
            groups: Vec::new(),
            directional_lights: Vec::new(),
            point_lights: Vec::new(),
            ambient_light: None,
        }
    }

    /// Stores a geometry. Several models may draw the same geometry.
    ///
    /// Slots freed by [`remove_geometry`](Self::remove_geometry) are reused,
    /// so an id kept past its removal may name a later geometry.
    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        match self.free_geometries.pop() {
            Some(slot) => {
                self.geometries[slot] = Some(geometry);
                GeometryId(slot)
            }
            None => {
                self.geometries.push(Some(geometry));
                GeometryId(self.geometries.len() - 1)
            }
        }
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id.0).and_then(Option::as_ref)
    }

    pub fn geometry_mut(&mut self, id: GeometryId) -> Option<&mut Geometry> {
        self.geometries.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Number of geometries currently stored.
    pub fn geometry_count(&self) -> usize {
        self.geometries.len() - self.free_geometries.len()
    }

    /// Removes a geometry no model draws, releasing its GPU objects.
    ///
    /// Fails with [`SceneError::GeometryInUse`] while a model still draws it.
    pub fn remove_geometry(
        &mut self,
        gl: &mut dyn GraphicsContext,
        id: GeometryId,
    ) -> Result<Geometry, SceneError> {
        if self.geometry(id).is_none() {
            return Err(SceneError::UnknownGeometry(id));
        }
        if self.geometry_in_use(id) {
            return Err(SceneError::GeometryInUse(id));
        }
        let mut geometry = self.geometries[id.0]
            .take()
            .ok_or(SceneError::UnknownGeometry(id))?;
        geometry.invalidate(gl);
        self.free_geometries.push(id.0);
        Ok(geometry)
    }

    fn geometry_in_use(&self, id: GeometryId) -> bool {
        self.world
            .query::<&Renderable>()
            .iter()
            .any(|(_, renderable)| renderable.geometry == id)
    }

    /// Spawns a model. Its transform is updated before it is stored.
    pub fn spawn(&mut self, model: Model) -> Result<ModelId, SceneError> {
        let Model {
            mut transform,
            parent,
            renderable,
        } = model;

        if let Some(parent) = parent {
            self.check(parent)?;
        }
        if let Some(renderable) = &renderable {
            if self.geometry(renderable.geometry).is_none() {
                return Err(SceneError::UnknownGeometry(renderable.geometry));
            }
        }

        transform.update();
        let mut builder = EntityBuilder::new();
        builder.add(transform);
        if let Some(parent) = parent {
            builder.add(Parent(parent.0));
        }
        if let Some(renderable) = renderable {
            builder.add(renderable);
        }
        Ok(ModelId(self.world.spawn(builder.build())))
    }

    /// Spawns a camera model without geometry.
    pub fn spawn_camera(&mut self, camera: Camera, mut transform: Transform) -> ModelId {
        transform.update();
        ModelId(self.world.spawn((transform, camera)))
    }

    /// Spawns a directional light model. Its direction is the model's forward axis.
    pub fn spawn_directional_light(
        &mut self,
        light: DirectionalLight,
        mut transform: Transform,
    ) -> ModelId {
        transform.update();
        ModelId(self.world.spawn((transform, light)))
    }

    /// Spawns a point light as a drawable model: a unit sphere in the light's
    /// color, which shows up once the light is also added as an item.
    ///
    /// The sphere belongs to the light and is removed with it.
    pub fn spawn_point_light(&mut self, light: PointLight, mut transform: Transform) -> ModelId {
        let geometry = self.add_geometry(primitives::sphere(1.0, 8));
        let renderable = Renderable {
            geometry,
            material: material::basic(light.color),
            extras: Extras::default(),
        };
        transform.update();
        ModelId(self.world.spawn((transform, light, renderable, OwnsGeometry)))
    }

    pub fn contains(&self, id: ModelId) -> bool {
        self.world.contains(id.0)
    }

    /// Sets or clears a model's parent.
    ///
    /// Fails with [`SceneError::ParentCycle`] when `parent` is `child` or one
    /// of its descendants.
    pub fn set_parent(&mut self, child: ModelId, parent: Option<ModelId>) -> Result<(), SceneError> {
        self.check(child)?;
        let Some(parent) = parent else {
            // Removing a missing Parent is not an error.
            let _ = self.world.remove_one::<Parent>(child.0);
            return Ok(());
        };
        self.check(parent)?;

        let mut cursor = Some(parent.0);
        while let Some(entity) = cursor {
            if entity == child.0 {
                return Err(SceneError::ParentCycle { child, parent });
            }
            cursor = self.parent_entity(entity);
        }

        self.world
            .insert_one(child.0, Parent(parent.0))
            .map_err(|_| SceneError::UnknownModel(child))
    }

    pub fn parent(&self, id: ModelId) -> Option<ModelId> {
        self.parent_entity(id.0).map(ModelId)
    }

    /// Makes `id` the active camera. It must carry a [`Camera`] component.
    pub fn set_camera(&mut self, id: ModelId) -> Result<&mut Self, SceneError> {
        if !self.has::<Camera>(id)? {
            return Err(SceneError::NotACamera(id));
        }
        self.camera = Some(id);
        Ok(self)
    }

    pub fn camera(&self) -> Option<ModelId> {
        self.camera
    }

    /// Mutable access to a camera's projection state.
    pub fn camera_mut(&mut self, id: ModelId) -> Result<&mut Camera, SceneError> {
        self.world
            .query_one_mut::<&mut Camera>(id.0)
            .map_err(|_| SceneError::NotACamera(id))
    }

    /// Files a model under its material's shader for drawing.
    ///
    /// Adding a model that is already filed is a no-op.
    pub fn add_item(&mut self, id: ModelId) -> Result<&mut Self, SceneError> {
        let shader = self.renderable(id)?.material.shader.clone();
        if self.groups.iter().any(|g| g.items.contains(&id)) {
            return Ok(self);
        }
        match self.groups.iter_mut().find(|g| g.shader == shader) {
            Some(group) => group.items.push(id),
            None => self.groups.push(MaterialGroup {
                shader,
                items: vec![id],
            }),
        }
        Ok(self)
    }

    pub fn add_items(
        &mut self,
        ids: impl IntoIterator<Item = ModelId>,
    ) -> Result<&mut Self, SceneError> {
        for id in ids {
            self.add_item(id)?;
        }
        Ok(self)
    }

    pub fn add_directional_light(&mut self, id: ModelId) -> Result<&mut Self, SceneError> {
        if !self.has::<DirectionalLight>(id)? {
            return Err(SceneError::UnknownModel(id));
        }
        self.directional_lights.push(id);
        Ok(self)
    }

    pub fn add_directional_lights(
        &mut self,
        ids: impl IntoIterator<Item = ModelId>,
    ) -> Result<&mut Self, SceneError> {
        for id in ids {
            self.add_directional_light(id)?;
        }
        Ok(self)
    }

    pub fn add_point_light(&mut self, id: ModelId) -> Result<&mut Self, SceneError> {
        if !self.has::<PointLight>(id)? {
            return Err(SceneError::UnknownModel(id));
        }
        self.point_lights.push(id);
        Ok(self)
    }

    pub fn add_point_lights(
        &mut self,
        ids: impl IntoIterator<Item = ModelId>,
    ) -> Result<&mut Self, SceneError> {
        for id in ids {
            self.add_point_light(id)?;
        }
        Ok(self)
    }

    /// Sets the ambient light, replacing any previous one.
    pub fn add_ambient_light(&mut self, light: AmbientLight) -> &mut Self {
        self.ambient_light = Some(light);
        self
    }

    pub fn ambient_light(&self) -> Option<&AmbientLight> {
        self.ambient_light.as_ref()
    }

    pub fn directional_lights(&self) -> &[ModelId] {
        &self.directional_lights
    }

    pub fn point_lights(&self) -> &[ModelId] {
        &self.point_lights
    }

    pub fn transform(&self, id: ModelId) -> Result<hecs::Ref<'_, Transform>, SceneError> {
        self.world
            .get::<&Transform>(id.0)
            .map_err(|_| SceneError::UnknownModel(id))
    }

    /// Mutable access to a model's transform. Call [`Transform::update`] (or
    /// [`Scene::update`]) after editing it.
    pub fn transform_mut(&mut self, id: ModelId) -> Result<&mut Transform, SceneError> {
        self.world
            .query_one_mut::<&mut Transform>(id.0)
            .map_err(|_| SceneError::UnknownModel(id))
    }

    pub fn renderable(&self, id: ModelId) -> Result<hecs::Ref<'_, Renderable>, SceneError> {
        self.check(id)?;
        self.world
            .get::<&Renderable>(id.0)
            .map_err(|_| SceneError::NotRenderable(id))
    }

    pub fn set_extras(&mut self, id: ModelId, extras: Extras) -> Result<(), SceneError> {
        self.check(id)?;
        let renderable = self
            .world
            .query_one_mut::<&mut Renderable>(id.0)
            .map_err(|_| SceneError::NotRenderable(id))?;
        renderable.extras = extras;
        Ok(())
    }

    /// Replaces a model's material, moving it to the matching group if it was
    /// added as an item.
    pub fn set_material(&mut self, id: ModelId, material: Material) -> Result<(), SceneError> {
        self.check(id)?;
        let renderable = self
            .world
            .query_one_mut::<&mut Renderable>(id.0)
            .map_err(|_| SceneError::NotRenderable(id))?;
        let regroup = renderable.material.shader != material.shader;
        renderable.material = material;

        if regroup && self.remove_from_groups(id) {
            self.add_item(id)?;
        }
        Ok(())
    }

    /// Recomputes every model's local matrix and basis axes.
    pub fn update(&mut self) {
        for (_, transform) in self.world.query_mut::<&mut Transform>() {
            transform.update();
        }
    }

    /// The model's matrix composed through its ancestors:
    /// `root.local × … × parent.local × local`.
    pub fn world_matrix(&self, id: ModelId) -> Result<Mat4, SceneError> {
        let mut matrix = self.transform(id)?.matrix();
        let mut cursor = self.parent_entity(id.0);
        while let Some(entity) = cursor {
            let parent = self
                .world
                .get::<&Transform>(entity)
                .map_err(|_| SceneError::UnknownModel(ModelId(entity)))?;
            matrix = parent.matrix() * matrix;
            cursor = self.parent_entity(entity);
        }
        Ok(matrix)
    }

    /// Normal matrix of the world matrix, `None` when it is singular.
    pub fn normal_matrix(&self, id: ModelId) -> Result<Option<Mat3>, SceneError> {
        Ok(math::normal_matrix(&self.world_matrix(id)?))
    }

    /// Inverse of the model's world matrix, `None` when it is singular.
    pub fn view_matrix(&self, id: ModelId) -> Result<Option<Mat4>, SceneError> {
        Ok(math::try_invert(&self.world_matrix(id)?))
    }

    /// Translation part of the world matrix.
    pub fn world_position(&self, id: ModelId) -> Result<Vec3, SceneError> {
        Ok(self.world_matrix(id)?.w_axis.truncate())
    }

    pub(crate) fn directional_light(
        &self,
        id: ModelId,
    ) -> Result<hecs::Ref<'_, DirectionalLight>, SceneError> {
        self.world
            .get::<&DirectionalLight>(id.0)
            .map_err(|_| SceneError::UnknownModel(id))
    }

    pub(crate) fn point_light(&self, id: ModelId) -> Result<hecs::Ref<'_, PointLight>, SceneError> {
        self.world
            .get::<&PointLight>(id.0)
            .map_err(|_| SceneError::UnknownModel(id))
    }

    /// Realizes the model's geometry and returns it with the model's
    /// renderable data.
    pub(crate) fn prepare_draw(
        &mut self,
        gl: &mut dyn GraphicsContext,
        id: ModelId,
    ) -> Result<(RenderInfo, hecs::Ref<'_, Renderable>), SceneError> {
        self.check(id)?;
        let renderable = self
            .world
            .get::<&Renderable>(id.0)
            .map_err(|_| SceneError::NotRenderable(id))?;
        let geometry = self
            .geometries
            .get_mut(renderable.geometry.0)
            .and_then(Option::as_mut)
            .ok_or(SceneError::UnknownGeometry(renderable.geometry))?;
        Ok((geometry.ensure(gl), renderable))
    }

    /// Items grouped by material shader. Groups appear in the order their
    /// shader was first seen; items keep insertion order.
    pub fn get_items_by_material(&self) -> &[MaterialGroup] {
        &self.groups
    }

    /// Removes a model.
    ///
    /// Children of the model become roots. Once no model draws its geometry,
    /// the geometry's GPU objects are released. Geometry added with
    /// [`add_geometry`](Self::add_geometry) stays stored for later spawns;
    /// a point light's own sphere is removed.
    pub fn delete_model(
        &mut self,
        gl: &mut dyn GraphicsContext,
        id: ModelId,
    ) -> Result<(), SceneError> {
        self.check(id)?;

        let geometry = self
            .world
            .get::<&Renderable>(id.0)
            .ok()
            .map(|renderable| renderable.geometry);
        let owned = self.world.entity(id.0).is_ok_and(|e| e.has::<OwnsGeometry>());

        let children: Vec<hecs::Entity> = self
            .world
            .query::<&Parent>()
            .iter()
            .filter(|(_, parent)| parent.0 == id.0)
            .map(|(entity, _)| entity)
            .collect();
        for child in children {
            let _ = self.world.remove_one::<Parent>(child);
        }

        self.remove_from_groups(id);
        self.directional_lights.retain(|l| *l != id);
        self.point_lights.retain(|l| *l != id);
        if self.camera == Some(id) {
            self.camera = None;
        }

        self.world
            .despawn(id.0)
            .map_err(|_| SceneError::UnknownModel(id))?;

        if let Some(geometry) = geometry.filter(|&g| !self.geometry_in_use(g)) {
            if owned {
                self.remove_geometry(gl, geometry)?;
            } else if let Some(stored) = self.geometry_mut(geometry) {
                stored.invalidate(gl);
            }
        }
        Ok(())
    }

    /// Releases every GPU object the scene created and empties it.
    ///
    /// Each group's shader program is deleted from `registry`; the descriptors
    /// stay registered.
    pub fn delete(&mut self, gl: &mut dyn GraphicsContext, registry: &mut ShaderRegistry) {
        for group in &self.groups {
            registry.delete(gl, &group.shader);
        }
        for geometry in self.geometries.iter_mut().flatten() {
            geometry.invalidate(gl);
        }
        debug!(
            "deleted scene with {} models and {} geometries",
            self.world.len(),
            self.geometry_count()
        );

        self.world.clear();
        self.geometries.clear();
        self.free_geometries.clear();
        self.groups.clear();
        self.directional_lights.clear();
        self.point_lights.clear();
        self.camera = None;
        self.ambient_light = None;
    }

    fn check(&self, id: ModelId) -> Result<(), SceneError> {
        if self.world.contains(id.0) {
            Ok(())
        } else {
            Err(SceneError::UnknownModel(id))
        }
    }

    fn has<T: hecs::Component>(&self, id: ModelId) -> Result<bool, SceneError> {
        self.world
            .entity(id.0)
            .map(|entity| entity.has::<T>())
            .map_err(|_| SceneError::UnknownModel(id))
    }

    fn parent_entity(&self, entity: hecs::Entity) -> Option<hecs::Entity> {
        self.world.get::<&Parent>(entity).ok().map(|p| p.0)
    }

    fn remove_from_groups(&mut self, id: ModelId) -> bool {
        let mut removed = false;
        for group in &mut self.groups {
            let before = group.items.len();
            group.items.retain(|item| *item != id);
            removed |= group.items.len() != before;
        }
        self.groups.retain(|g| !g.items.is_empty());
        removed
    }
}
