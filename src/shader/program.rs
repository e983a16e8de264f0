//! Linked shader programs and their uniform tables.

use std::collections::HashMap;

use log::{debug, error, info};

use crate::error::ShaderError;
use crate::gl::{GraphicsContext, ProgramId, ShaderId, ShaderStage};
use crate::material::Material;
use crate::shader::descriptor::{MaterialHandler, ShaderDescriptor};
use crate::shader::texture_units::TextureUnits;
use crate::shader::uniform::{UniformBinding, UniformValue, setter_name};

/// What a uniform upload needs besides the program: the context and the
/// renderer's texture units.
pub struct UniformContext<'a> {
    pub gl: &'a mut dyn GraphicsContext,
    pub textures: &'a mut TextureUnits,
}

impl<'a> UniformContext<'a> {
    pub fn new(gl: &'a mut dyn GraphicsContext, textures: &'a mut TextureUnits) -> Self {
        Self { gl, textures }
    }
}

/// A linked program with one [`UniformBinding`] per declared uniform.
pub struct ShaderProgram {
    id: ProgramId,
    name: String,
    bindings: HashMap<String, UniformBinding>,
    attributes: Vec<(String, u32)>,
    handler: Option<MaterialHandler>,
}

impl std::fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("uniforms", &self.bindings.len())
            .finish_non_exhaustive()
    }
}

impl ShaderProgram {
    /// Compiles, links and reflects `descriptor`.
    ///
    /// Vertex inputs are bound to locations in declaration order before
    /// linking. On any failure the shader and program objects created so far
    /// are deleted.
    pub(crate) fn build(
        gl: &mut dyn GraphicsContext,
        descriptor: &ShaderDescriptor,
    ) -> Result<Self, ShaderError> {
        let name = descriptor.name();
        let vs_src = descriptor.source(ShaderStage::Vertex);
        let fs_src = descriptor.source(ShaderStage::Fragment);
        debug!("shader '{name}' vertex source:\n{vs_src}");
        debug!("shader '{name}' fragment source:\n{fs_src}");

        let vs = compile(gl, name, ShaderStage::Vertex, &vs_src)?;
        let fs = match compile(gl, name, ShaderStage::Fragment, &fs_src) {
            Ok(fs) => fs,
            Err(err) => {
                gl.delete_shader(vs);
                return Err(err);
            }
        };

        let id = gl.create_program();
        gl.attach_shader(id, vs);
        gl.attach_shader(id, fs);

        let mut attributes = Vec::new();
        for (index, input) in descriptor.stage(ShaderStage::Vertex).inputs.iter().enumerate() {
            let index = index as u32;
            gl.bind_attrib_location(id, index, &input.name);
            attributes.push((input.name.clone(), index));
        }

        let linked = gl.link_program(id);

        gl.detach_shader(id, vs);
        gl.detach_shader(id, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);

        if let Err(log) = linked {
            error!("shader '{name}' failed to link: {log}");
            gl.delete_program(id);
            return Err(ShaderError::Link {
                shader: name.to_string(),
                log,
            });
        }

        let mut bindings = HashMap::new();
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            for decl in &descriptor.stage(stage).uniforms {
                match UniformBinding::resolve(gl, id, name, decl, descriptor.structs()) {
                    Ok(binding) => {
                        bindings.insert(decl.name.clone(), binding);
                    }
                    Err(err) => {
                        gl.delete_program(id);
                        return Err(err);
                    }
                }
            }
        }

        info!("built shader '{name}' ({} uniforms)", bindings.len());
        Ok(Self {
            id,
            name: name.to_string(),
            bindings,
            attributes,
            handler: descriptor.handler().cloned(),
        })
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the program declares a uniform called `uniform`.
    pub fn declares(&self, uniform: &str) -> bool {
        self.bindings.contains_key(uniform)
    }

    pub fn binding(&self, uniform: &str) -> Option<&UniformBinding> {
        self.bindings.get(uniform)
    }

    /// Location bound to a vertex input before linking.
    pub fn attribute_location(&self, input: &str) -> Option<u32> {
        self.attributes
            .iter()
            .find(|(name, _)| name == input)
            .map(|(_, index)| *index)
    }

    /// `(setter name, uniform name)` for every declared uniform, sorted by setter.
    pub fn setters(&self) -> Vec<(String, &str)> {
        let mut setters: Vec<_> = self
            .bindings
            .keys()
            .map(|uniform| (setter_name(uniform), uniform.as_str()))
            .collect();
        setters.sort();
        setters
    }

    /// Uploads `value` to a declared uniform.
    pub fn set(
        &self,
        cx: &mut UniformContext<'_>,
        uniform: &str,
        value: &UniformValue,
    ) -> Result<(), ShaderError> {
        let binding = self.bindings.get(uniform).ok_or_else(|| ShaderError::UnknownUniform {
            shader: self.name.clone(),
            uniform: uniform.to_string(),
        })?;
        binding.apply(cx.gl, cx.textures, uniform, value)
    }

    /// Uploads `value` only when the uniform is declared. Returns whether it was.
    pub fn set_if_declared(
        &self,
        cx: &mut UniformContext<'_>,
        uniform: &str,
        value: &UniformValue,
    ) -> Result<bool, ShaderError> {
        match self.bindings.get(uniform) {
            Some(binding) => binding.apply(cx.gl, cx.textures, uniform, value).map(|()| true),
            None => Ok(false),
        }
    }

    /// Runs the material handler, if the descriptor had one.
    pub fn bind_material(
        &self,
        cx: &mut UniformContext<'_>,
        material: &Material,
    ) -> Result<(), ShaderError> {
        match &self.handler {
            Some(handler) => handler(self, cx, material),
            None => Ok(()),
        }
    }

    pub fn activate(&self, gl: &mut dyn GraphicsContext) {
        gl.use_program(Some(self.id));
    }

    pub fn deactivate(&self, gl: &mut dyn GraphicsContext) {
        gl.use_program(None);
    }
}

fn compile(
    gl: &mut dyn GraphicsContext,
    shader: &str,
    stage: ShaderStage,
    source: &str,
) -> Result<ShaderId, ShaderError> {
    gl.compile_shader(stage, source).map_err(|log| {
        error!("shader '{shader}': {stage} stage failed to compile: {log}");
        ShaderError::Compile {
            shader: shader.to_string(),
            stage,
            log,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlCall, RecordedUniform, RecordingContext};
    use crate::shader::{StructDecl, UniformDecl, Variable};
    use glam::Vec3;

    fn tinted() -> ShaderDescriptor {
        ShaderDescriptor::new("tinted")
            .defaults()
            .add_struct(StructDecl::new("a_light").field("color", "vec3").field("attenuation", "float"))
            .fragment()
            .add_uniform(UniformDecl::new("u_color", "vec3"))
            .add_uniform(UniformDecl::new("u_a_light", "a_light"))
            .material_handler(|program, cx, material| {
                program.set(cx, "u_color", material.require("color")?)
            })
    }

    #[test]
    fn build_binds_inputs_in_declaration_order() {
        let mut gl = RecordingContext::new();
        let program = ShaderProgram::build(&mut gl, &tinted()).unwrap();

        assert_eq!(program.attribute_location("a_position"), Some(0));
        assert_eq!(program.attribute_location("a_texture"), Some(2));
        let bound: Vec<_> = gl
            .calls()
            .iter()
            .filter_map(|c| match c {
                GlCall::BindAttribLocation { index, name, .. } => Some((*index, name.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(bound, [(0, "a_position"), (1, "a_normal"), (2, "a_texture")]);
    }

    #[test]
    fn build_releases_stage_objects_after_link() {
        let mut gl = RecordingContext::new();
        ShaderProgram::build(&mut gl, &tinted()).unwrap();
        assert_eq!(gl.live_shaders(), 0);
        assert_eq!(gl.live_programs(), 1);
    }

    #[test]
    fn every_declared_uniform_gets_a_binding() {
        let mut gl = RecordingContext::new();
        let program = ShaderProgram::build(&mut gl, &tinted()).unwrap();

        for uniform in ["u_proj", "u_view", "u_model", "u_normal", "u_color", "u_a_light"] {
            assert!(program.declares(uniform), "{uniform}");
        }
        assert!(!program.declares("u_d_lights"));
        assert!(matches!(program.binding("u_a_light"), Some(UniformBinding::Struct { .. })));

        let setters: Vec<_> = program.setters().into_iter().map(|(s, _)| s).collect();
        assert!(setters.contains(&"setUALight".to_string()));
        assert!(setters.contains(&"setUColor".to_string()));
    }

    #[test]
    fn fragment_compile_failure_cleans_up() {
        let mut gl = RecordingContext::new();
        gl.fail_compile(ShaderStage::Fragment, "ERROR: 0:7: 'u_colour' : undeclared identifier");

        let err = ShaderProgram::build(&mut gl, &tinted()).unwrap_err();
        match err {
            ShaderError::Compile { shader, stage, log } => {
                assert_eq!(shader, "tinted");
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("u_colour"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(gl.live_shaders(), 0);
        assert_eq!(gl.live_programs(), 0);
    }

    #[test]
    fn link_failure_deletes_the_program() {
        let mut gl = RecordingContext::new();
        gl.fail_link("varying 'normal' not written");

        let err = ShaderProgram::build(&mut gl, &tinted()).unwrap_err();
        assert!(matches!(err, ShaderError::Link { ref log, .. } if log.contains("normal")));
        assert_eq!(gl.live_programs(), 0);
        assert_eq!(gl.live_shaders(), 0);
    }

    #[test]
    fn unknown_uniform_type_fails_the_build() {
        let mut gl = RecordingContext::new();
        let desc = ShaderDescriptor::new("broken")
            .add_input(Variable::new("a_position", "vec3"))
            .add_uniform(UniformDecl::new("u_light", "s_light"));

        let err = ShaderProgram::build(&mut gl, &desc).unwrap_err();
        assert!(matches!(err, ShaderError::UnknownType { .. }));
        assert_eq!(gl.live_programs(), 0);
    }

    #[test]
    fn set_rejects_undeclared_names() {
        let mut gl = RecordingContext::new();
        let mut textures = TextureUnits::new();
        let program = ShaderProgram::build(&mut gl, &tinted()).unwrap();
        let mut cx = UniformContext::new(&mut gl, &mut textures);

        let err = program
            .set(&mut cx, "u_shininess", &UniformValue::Float(1.0))
            .unwrap_err();
        assert!(matches!(err, ShaderError::UnknownUniform { .. }));
        assert!(!program.set_if_declared(&mut cx, "u_shininess", &UniformValue::Float(1.0)).unwrap());
    }

    #[test]
    fn material_handler_pushes_parameters() {
        let mut gl = RecordingContext::new();
        let mut textures = TextureUnits::new();
        let program = ShaderProgram::build(&mut gl, &tinted()).unwrap();

        let material = Material::new("tinted").with("color", Vec3::new(1.0, 0.5, 0.0));
        let mut cx = UniformContext::new(&mut gl, &mut textures);
        program.bind_material(&mut cx, &material).unwrap();
        assert_eq!(
            gl.uniform_values("u_color"),
            vec![&RecordedUniform::Vec3([1.0, 0.5, 0.0])]
        );

        let bare = Material::new("tinted");
        let mut cx = UniformContext::new(&mut gl, &mut textures);
        let err = program.bind_material(&mut cx, &bare).unwrap_err();
        assert!(matches!(err, ShaderError::MissingParameter { ref param, .. } if param == "color"));
    }
}
