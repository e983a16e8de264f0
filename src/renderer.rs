//! Batched scene rendering.
//!
//! [`Renderer::render_scene`] walks the scene's material groups. Each group's
//! program is built (on first use) and activated once, the frame-wide
//! uniforms are bound once, and then every model in the group is drawn with
//! its own matrices, render state and material values:
//!
//! ```text
//! for group in scene.get_items_by_material():
//!     program = registry.program(group.shader)   // missing: skip group
//!     use_program(program)
//!     u_view, u_proj, u_camera, u_d_lights, u_p_lights, u_a_light
//!     for model in group.items:
//!         u_model, u_normal
//!         cull face / polygon offset from extras
//!         material handler
//!         draw_elements or draw_arrays
//!     use_program(none)
//! ```
//!
//! Every uniform is optional: a program that does not declare one never sees
//! a setter call for it.

use std::rc::Rc;

use glam::{Mat4, Vec3};
use log::{debug, info};

use crate::error::{RenderError, ShaderError};
use crate::light::{DirectionalLight, PointLight};
use crate::gl::{Capability, CullFace, DepthFunc, FrontFace, GraphicsContext};
use crate::material;
use crate::scene::{ModelId, Scene};
use crate::shader::{
    ShaderDescriptor, ShaderProgram, ShaderRegistry, TextureUnits, UniformBinding, UniformContext,
    UniformValue,
};

/// Context state applied when a [`Renderer`] is created.
///
/// # Example
///
/// ```
/// use phanto::RendererConfig;
///
/// let config = RendererConfig::new()
///     .clear_color([0.1, 0.1, 0.1, 1.0])
///     .viewport(1280, 720);
/// assert!(config.builtin_shaders);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RendererConfig {
    pub clear_color: [f32; 4],
    /// Viewport width and height in pixels.
    pub viewport: (u32, u32),
    /// Depth testing with `LEQUAL`.
    pub depth_test: bool,
    /// Polygon offset `(factor, units)` used by models with `polygon_offset` set.
    pub polygon_offset: (f32, f32),
    /// Register the `basic`, `normal`, `diffuse` and `phong` shaders.
    pub builtin_shaders: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            viewport: (800, 600),
            depth_test: true,
            polygon_offset: (1.0, 0.1),
            builtin_shaders: true,
        }
    }
}

impl RendererConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_color(mut self, rgba: [f32; 4]) -> Self {
        self.clear_color = rgba;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = (width, height);
        self
    }

    pub fn depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = enabled;
        self
    }

    pub fn polygon_offset(mut self, factor: f32, units: f32) -> Self {
        self.polygon_offset = (factor, units);
        self
    }

    pub fn builtin_shaders(mut self, enabled: bool) -> Self {
        self.builtin_shaders = enabled;
        self
    }
}

/// Counters for one `render_scene` or `render_item` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub programs_bound: u32,
    /// Groups whose shader has no registered descriptor.
    pub groups_skipped: u32,
}

/// Frame-wide uniform values, computed once per render call.
struct Globals {
    view: UniformValue,
    proj: UniformValue,
    camera: UniformValue,
    d_lights: Vec<UniformValue>,
    p_lights: Vec<UniformValue>,
    a_light: Option<UniformValue>,
}

impl Globals {
    fn collect(scene: &mut Scene) -> Result<Self, RenderError> {
        let camera = scene.camera().ok_or(RenderError::NoCamera)?;
        let view = scene
            .view_matrix(camera)?
            .ok_or(RenderError::SingularCamera)?;
        let eye = scene.world_position(camera)?;
        let proj = scene.camera_mut(camera)?.projection_matrix();

        let mut d_lights = Vec::with_capacity(scene.directional_lights().len());
        for &id in scene.directional_lights() {
            let direction = scene.world_matrix(id)?.transform_vector3(Vec3::Z);
            d_lights.push(scene.directional_light(id)?.uniform(direction));
        }

        let mut p_lights = Vec::with_capacity(scene.point_lights().len());
        for &id in scene.point_lights() {
            let position = scene.world_position(id)?;
            p_lights.push(scene.point_light(id)?.uniform(position));
        }

        Ok(Self {
            view: UniformValue::Mat4(view),
            proj: UniformValue::Mat4(proj),
            camera: UniformValue::Vec3(eye),
            d_lights,
            p_lights,
            a_light: scene.ambient_light().map(|light| light.uniform()),
        })
    }

    fn bind(&self, program: &ShaderProgram, cx: &mut UniformContext<'_>) -> Result<(), ShaderError> {
        program.set_if_declared(cx, "u_view", &self.view)?;
        program.set_if_declared(cx, "u_proj", &self.proj)?;
        program.set_if_declared(cx, "u_camera", &self.camera)?;
        bind_lights(program, cx, "u_d_lights", &self.d_lights, || {
            DirectionalLight::new(Vec3::ZERO).uniform(Vec3::Z)
        })?;
        bind_lights(program, cx, "u_p_lights", &self.p_lights, || {
            PointLight::new(Vec3::ZERO, 0.0).uniform(Vec3::ZERO)
        })?;
        if let Some(a_light) = &self.a_light {
            program.set_if_declared(cx, "u_a_light", a_light)?;
        }
        Ok(())
    }
}

/// Uploads a light array, filling the declared slots past the registered
/// lights with black lights so removed lights stop contributing.
fn bind_lights(
    program: &ShaderProgram,
    cx: &mut UniformContext<'_>,
    uniform: &str,
    lights: &[UniformValue],
    unlit: impl FnOnce() -> UniformValue,
) -> Result<(), ShaderError> {
    let slots = match program.binding(uniform) {
        Some(UniformBinding::StructArray { elements }) => elements.len(),
        Some(_) => lights.len(),
        None => return Ok(()),
    };
    let mut values = lights.to_vec();
    if values.len() < slots {
        values.resize(slots, unlit());
    }
    program.set(cx, uniform, &UniformValue::Array(values))
}

/// Draws scenes through a [`GraphicsContext`].
///
/// The renderer owns the context, the shader registry and the texture units,
/// so every GL object it creates is released through it.
pub struct Renderer<G: GraphicsContext> {
    gl: G,
    config: RendererConfig,
    registry: ShaderRegistry,
    textures: TextureUnits,
}

impl<G: GraphicsContext> Renderer<G> {
    /// Takes ownership of `gl` and applies the fixed context state: clear
    /// color, viewport, depth test, counter-clockwise front faces, back-face
    /// culling and the polygon offset.
    pub fn new(mut gl: G, config: RendererConfig) -> Self {
        let (width, height) = config.viewport;
        gl.clear_color(config.clear_color);
        gl.viewport(0, 0, width, height);
        if config.depth_test {
            gl.enable(Capability::DepthTest);
            gl.depth_func(DepthFunc::LessEqual);
        }
        gl.front_face(FrontFace::Ccw);
        gl.cull_face(CullFace::Back);
        gl.polygon_offset(config.polygon_offset.0, config.polygon_offset.1);

        let mut registry = ShaderRegistry::new();
        if config.builtin_shaders {
            for descriptor in material::builtin_shaders() {
                registry.register(descriptor);
            }
        }
        info!(
            "renderer ready: {width}x{height} viewport, {} shaders registered",
            registry.names().len()
        );

        Self {
            gl,
            config,
            registry,
            textures: TextureUnits::new(),
        }
    }

    pub fn gl(&self) -> &G {
        &self.gl
    }

    pub fn gl_mut(&mut self) -> &mut G {
        &mut self.gl
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn registry(&self) -> &ShaderRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ShaderRegistry {
        &mut self.registry
    }

    pub fn textures(&self) -> &TextureUnits {
        &self.textures
    }

    /// Registers a shader, replacing any descriptor with the same name.
    pub fn register_shader(&mut self, descriptor: ShaderDescriptor) -> &mut Self {
        self.registry.register(descriptor);
        self
    }

    /// Resets the viewport, e.g. after the host surface changed size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.viewport = (width, height);
        self.gl.viewport(0, 0, width, height);
    }

    /// Clears the color and depth buffers.
    pub fn clear(&mut self) -> &mut Self {
        self.gl.clear(true, true);
        self
    }

    /// Draws every item in `scene`, batched by shader.
    ///
    /// A group whose shader is not registered is skipped. Shader build errors
    /// and scene lookup failures abort the frame. With `debug` set, each
    /// group and the frame totals are logged at info level.
    pub fn render_scene(&mut self, scene: &mut Scene, debug: bool) -> Result<FrameStats, RenderError> {
        let mut stats = FrameStats::default();
        if scene.get_items_by_material().is_empty() {
            return Ok(stats);
        }

        let globals = Globals::collect(scene)?;
        let groups = scene.get_items_by_material().to_vec();

        for group in &groups {
            let Some(program) = self.program(&group.shader)? else {
                stats.groups_skipped += 1;
                continue;
            };
            if debug {
                info!("group '{}': {} items", group.shader, group.items.len());
            }

            program.activate(&mut self.gl);
            stats.programs_bound += 1;
            let result = self.render_group(&program, scene, &globals, &group.items, &mut stats);
            program.deactivate(&mut self.gl);
            result?;
        }

        if debug {
            info!("frame: {stats:?}");
        }
        Ok(stats)
    }

    /// Draws one model outside the batched pass.
    pub fn render_item(
        &mut self,
        scene: &mut Scene,
        item: ModelId,
        debug: bool,
    ) -> Result<FrameStats, RenderError> {
        let mut stats = FrameStats::default();
        let shader = scene.renderable(item)?.material.shader.clone();
        let Some(program) = self.program(&shader)? else {
            stats.groups_skipped += 1;
            return Ok(stats);
        };
        let globals = Globals::collect(scene)?;
        if debug {
            info!("item {item:?} with shader '{shader}'");
        }

        program.activate(&mut self.gl);
        stats.programs_bound += 1;
        let result = self.render_group(&program, scene, &globals, &[item], &mut stats);
        program.deactivate(&mut self.gl);
        result.map(|()| stats)
    }

    /// Releases the scene's GPU objects and the programs of its groups.
    pub fn release_scene(&mut self, scene: &mut Scene) {
        scene.delete(&mut self.gl, &mut self.registry);
    }

    /// Deletes every program and texture the renderer created.
    ///
    /// Descriptors stay registered, so the renderer can keep drawing; programs
    /// and textures are recreated on demand.
    pub fn delete(&mut self) {
        self.registry.delete_all(&mut self.gl);
        self.textures.release(&mut self.gl);
        debug!("renderer released its programs and textures");
    }

    fn program(&mut self, shader: &str) -> Result<Option<Rc<ShaderProgram>>, RenderError> {
        let program = self.registry.program(&mut self.gl, shader)?;
        if program.is_none() {
            debug!("skipping shader '{shader}': not registered");
        }
        Ok(program)
    }

    fn render_group(
        &mut self,
        program: &ShaderProgram,
        scene: &mut Scene,
        globals: &Globals,
        items: &[ModelId],
        stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        let mut cx = UniformContext::new(&mut self.gl, &mut self.textures);
        globals.bind(program, &mut cx)?;
        for &item in items {
            render_model(program, &mut cx, scene, item)?;
            stats.draw_calls += 1;
        }
        Ok(())
    }
}

fn render_model(
    program: &ShaderProgram,
    cx: &mut UniformContext<'_>,
    scene: &mut Scene,
    item: ModelId,
) -> Result<(), RenderError> {
    let model: Mat4 = scene.world_matrix(item)?;
    program.set_if_declared(cx, "u_model", &UniformValue::Mat4(model))?;
    if program.declares("u_normal") {
        match scene.normal_matrix(item)? {
            Some(normal) => program.set(cx, "u_normal", &UniformValue::Mat3(normal))?,
            None => debug!("model {item:?} has a singular world matrix; u_normal not updated"),
        }
    }

    let (info, renderable) = scene.prepare_draw(&mut *cx.gl, item)?;
    set_capability(&mut *cx.gl, Capability::CullFace, renderable.extras.cull);
    set_capability(&mut *cx.gl, Capability::PolygonOffsetFill, renderable.extras.polygon_offset);

    program.bind_material(cx, &renderable.material)?;

    cx.gl.bind_vertex_array(Some(info.vao));
    if info.index_count > 0 {
        cx.gl.draw_elements(info.mode, info.index_count, 0);
    } else {
        cx.gl.draw_arrays(info.mode, 0, info.vertex_count);
    }
    cx.gl.bind_vertex_array(None);
    Ok(())
}

fn set_capability(gl: &mut dyn GraphicsContext, capability: Capability, enabled: bool) {
    if enabled {
        gl.enable(capability);
    } else {
        gl.disable(capability);
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_3;

    use super::*;
    use crate::camera::Camera;
    use crate::gl::{DrawMode, GlCall, RecordingContext, ShaderStage};
    use crate::light::{AmbientLight, DirectionalLight, PointLight};
    use crate::material::Material;
    use crate::primitives::{CubeFace, cube, triangle};
    use crate::scene::{Extras, Model};
    use crate::transform::Transform;

    fn renderer() -> Renderer<RecordingContext> {
        Renderer::new(RecordingContext::new(), RendererConfig::default())
    }

    fn scene_with_camera() -> Scene {
        let mut scene = Scene::new();
        let camera = scene.spawn_camera(Camera::perspective(FRAC_PI_3, 1.0, 0.01, 1000.0), Transform::new());
        scene.set_camera(camera).unwrap();
        scene
    }

    #[test]
    fn new_applies_context_state() {
        let r = renderer();
        let calls = r.gl().calls();
        assert!(calls.contains(&GlCall::Enable(Capability::DepthTest)));
        assert!(calls.contains(&GlCall::DepthFunc(DepthFunc::LessEqual)));
        assert!(calls.contains(&GlCall::PolygonOffset {
            factor: 1.0,
            units: 0.1
        }));
        assert_eq!(r.registry().names(), ["basic", "diffuse", "normal", "phong"]);
    }

    #[test]
    fn basic_cube_draws_once_with_its_index_count() {
        let mut r = renderer();
        let mut scene = scene_with_camera();
        let geo = scene.add_geometry(cube(1.0, &CubeFace::ALL));
        let id = scene.spawn(Model::new(geo, material::basic(Vec3::ONE))).unwrap();
        scene.add_item(id).unwrap();

        let stats = r.render_scene(&mut scene, false).unwrap();

        assert_eq!(
            stats,
            FrameStats {
                draw_calls: 1,
                programs_bound: 1,
                groups_skipped: 0
            }
        );
        assert_eq!(r.gl().draw_count(), 1);
        assert!(r.gl().calls().contains(&GlCall::DrawElements {
            mode: DrawMode::Triangles,
            count: 36,
            offset: 0
        }));
        assert_eq!(r.gl().calls().last(), Some(&GlCall::UseProgram(None)));
    }

    #[test]
    fn light_uniforms_skip_programs_that_do_not_declare_them() {
        let mut r = renderer();
        let mut scene = scene_with_camera();
        let geo = scene.add_geometry(cube(1.0, &CubeFace::ALL));
        let id = scene.spawn(Model::new(geo, material::basic(Vec3::ONE))).unwrap();
        let sun = scene.spawn_directional_light(DirectionalLight::new(Vec3::ONE), Transform::new());
        scene.add_item(id).unwrap().add_directional_light(sun).unwrap();
        scene.add_ambient_light(AmbientLight::new(Vec3::ONE, 0.2));

        r.render_scene(&mut scene, false).unwrap();

        assert!(!r.gl().uploaded_with_prefix("u_d_lights"));
        assert!(!r.gl().uploaded_with_prefix("u_a_light"));
        assert!(!r.gl().uploaded_with_prefix("u_camera"));
        assert_eq!(r.gl().uniform_values("u_color").len(), 1);
    }

    #[test]
    fn lit_shader_receives_lights() {
        let mut r = renderer();
        let mut scene = scene_with_camera();
        let geo = scene.add_geometry(cube(1.0, &CubeFace::ALL));
        let id = scene.spawn(Model::new(geo, material::phong(Vec3::X, 8.0, Vec3::ONE))).unwrap();
        let sun = scene.spawn_directional_light(DirectionalLight::new(Vec3::ONE), Transform::new());
        let bulb = scene.spawn_point_light(
            PointLight::new(Vec3::ONE, 0.1),
            Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
        );
        scene
            .add_item(id)
            .unwrap()
            .add_directional_light(sun)
            .unwrap()
            .add_point_light(bulb)
            .unwrap();

        r.render_scene(&mut scene, true).unwrap();

        let gl = r.gl();
        assert_eq!(
            gl.uniform_values("u_d_lights[0].direction"),
            vec![&crate::gl::RecordedUniform::Vec3([0.0, 0.0, 1.0])]
        );
        assert_eq!(
            gl.uniform_values("u_p_lights[0].position"),
            vec![&crate::gl::RecordedUniform::Vec3([0.0, 2.0, 0.0])]
        );
        assert_eq!(
            gl.uniform_values("u_d_lights[1].color"),
            vec![&crate::gl::RecordedUniform::Vec3([0.0, 0.0, 0.0])]
        );
        // No ambient light registered.
        assert!(!gl.uploaded_with_prefix("u_a_light"));
        assert_eq!(gl.uniform_values("u_camera").len(), 1);
    }

    #[test]
    fn deleted_lights_go_dark() {
        let mut r = renderer();
        let mut scene = scene_with_camera();
        let geo = scene.add_geometry(cube(1.0, &CubeFace::ALL));
        let id = scene.spawn(Model::new(geo, material::diffuse(Vec3::ONE))).unwrap();
        let red = scene.spawn_directional_light(DirectionalLight::new(Vec3::X), Transform::new());
        let green = scene.spawn_directional_light(DirectionalLight::new(Vec3::Y), Transform::new());
        scene.add_item(id).unwrap().add_directional_lights([red, green]).unwrap();

        r.render_scene(&mut scene, false).unwrap();
        assert_eq!(
            r.gl().uniform_values("u_d_lights[1].color"),
            vec![&crate::gl::RecordedUniform::Vec3([0.0, 1.0, 0.0])]
        );

        scene.delete_model(r.gl_mut(), green).unwrap();
        r.gl_mut().clear_calls();
        r.render_scene(&mut scene, false).unwrap();

        let gl = r.gl();
        assert_eq!(
            gl.uniform_values("u_d_lights[0].color"),
            vec![&crate::gl::RecordedUniform::Vec3([1.0, 0.0, 0.0])]
        );
        for slot in 1..material::MAX_LIGHTS {
            assert_eq!(
                gl.uniform_values(&format!("u_d_lights[{slot}].color")),
                vec![&crate::gl::RecordedUniform::Vec3([0.0, 0.0, 0.0])]
            );
        }
    }

    #[test]
    fn singular_camera_aborts_before_drawing() {
        let mut r = renderer();
        let mut scene = scene_with_camera();
        let camera = scene.camera().unwrap();
        let geo = scene.add_geometry(cube(1.0, &CubeFace::ALL));
        let id = scene.spawn(Model::new(geo, material::basic(Vec3::ONE))).unwrap();
        scene.add_item(id).unwrap();

        scene.transform_mut(camera).unwrap().set_scale(0.0, 1.0, 1.0);
        scene.update();

        assert!(matches!(
            r.render_scene(&mut scene, false),
            Err(RenderError::SingularCamera)
        ));
        assert_eq!(r.gl().draw_count(), 0);
    }

    #[test]
    fn flattened_model_still_draws_every_frame() {
        let mut r = renderer();
        let mut scene = scene_with_camera();
        let geo = scene.add_geometry(cube(1.0, &CubeFace::ALL));
        let mut flat = Transform::new();
        flat.scale = Vec3::new(1.0, 0.0, 1.0);
        let id = scene
            .spawn(Model::new(geo, material::normal()).with_transform(flat))
            .unwrap();
        scene.add_item(id).unwrap();

        for _ in 0..2 {
            r.render_scene(&mut scene, false).unwrap();
        }

        assert_eq!(r.gl().draw_count(), 2);
        assert_eq!(r.gl().uniform_values("u_model").len(), 2);
        assert!(!r.gl().uploaded_with_prefix("u_normal"));
    }

    #[test]
    fn groups_bind_their_program_once() {
        let mut r = renderer();
        let mut scene = scene_with_camera();
        let geo = scene.add_geometry(cube(1.0, &CubeFace::ALL));
        let a = scene.spawn(Model::new(geo, material::basic(Vec3::ONE))).unwrap();
        let b = scene.spawn(Model::new(geo, material::normal())).unwrap();
        let c = scene.spawn(Model::new(geo, material::basic(Vec3::X))).unwrap();
        scene.add_items([a, b, c]).unwrap();

        let stats = r.render_scene(&mut scene, false).unwrap();

        assert_eq!(stats.programs_bound, 2);
        assert_eq!(stats.draw_calls, 3);
        assert_eq!(r.gl().count(|c| matches!(c, GlCall::UseProgram(Some(_)))), 2);
        // The view matrix is bound once per group, the model matrix once per item.
        assert_eq!(r.gl().uniform_values("u_view").len(), 2);
        assert_eq!(r.gl().uniform_values("u_model").len(), 3);
    }

    #[test]
    fn unregistered_shader_is_skipped() {
        let mut r = renderer();
        let mut scene = scene_with_camera();
        let geo = scene.add_geometry(cube(1.0, &CubeFace::ALL));
        let id = scene.spawn(Model::new(geo, Material::new("toon"))).unwrap();
        scene.add_item(id).unwrap();

        let stats = r.render_scene(&mut scene, false).unwrap();
        assert_eq!(stats.groups_skipped, 1);
        assert_eq!(r.gl().draw_count(), 0);
    }

    #[test]
    fn compile_errors_propagate() {
        let mut r = renderer();
        let mut scene = scene_with_camera();
        let geo = scene.add_geometry(cube(1.0, &CubeFace::ALL));
        let id = scene.spawn(Model::new(geo, material::normal())).unwrap();
        scene.add_item(id).unwrap();

        r.gl_mut().fail_compile(ShaderStage::Fragment, "0:1: syntax error");
        let err = r.render_scene(&mut scene, false).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Shader(ShaderError::Compile {
                stage: ShaderStage::Fragment,
                ..
            })
        ));
        assert_eq!(r.gl().live_shaders(), 0);
    }

    #[test]
    fn missing_camera_is_an_error() {
        let mut r = renderer();
        let mut scene = Scene::new();
        let geo = scene.add_geometry(cube(1.0, &CubeFace::ALL));
        let id = scene.spawn(Model::new(geo, material::normal())).unwrap();
        scene.add_item(id).unwrap();

        assert!(matches!(r.render_scene(&mut scene, false), Err(RenderError::NoCamera)));
    }

    #[test]
    fn extras_toggle_render_state() {
        let mut r = renderer();
        let mut scene = scene_with_camera();
        let geo = scene.add_geometry(triangle(1.0));
        let id = scene
            .spawn(Model::new(geo, material::basic(Vec3::ONE)).with_extras(Extras {
                cull: false,
                polygon_offset: true,
            }))
            .unwrap();

        r.gl_mut().clear_calls();
        let stats = r.render_item(&mut scene, id, false).unwrap();

        assert_eq!(stats.draw_calls, 1);
        let calls = r.gl().calls();
        assert!(calls.contains(&GlCall::Disable(Capability::CullFace)));
        assert!(calls.contains(&GlCall::Enable(Capability::PolygonOffsetFill)));
        assert!(calls.contains(&GlCall::DrawArrays {
            mode: DrawMode::Triangles,
            first: 0,
            count: 3
        }));
    }

    #[test]
    fn release_and_delete_free_gl_objects() {
        let mut r = renderer();
        let mut scene = scene_with_camera();
        let geo = scene.add_geometry(cube(1.0, &CubeFace::ALL));
        let id = scene.spawn(Model::new(geo, material::basic(Vec3::ONE))).unwrap();
        scene.add_item(id).unwrap();
        r.render_scene(&mut scene, false).unwrap();

        r.release_scene(&mut scene);
        assert_eq!(r.gl().live_buffers(), 0);
        assert_eq!(r.gl().live_vertex_arrays(), 0);
        assert_eq!(r.gl().live_programs(), 0);

        r.render_scene(&mut scene, false).unwrap();
        r.delete();
        assert_eq!(r.gl().live_programs(), 0);
        assert!(r.registry().contains("basic"));
    }

    #[test]
    fn clear_clears_color_and_depth() {
        let mut r = renderer();
        r.clear();
        assert_eq!(
            r.gl().calls().last(),
            Some(&GlCall::Clear {
                color: true,
                depth: true
            })
        );
    }
}
