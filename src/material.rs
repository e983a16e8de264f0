//! Materials and the built-in shaders they select.
//!
//! A [`Material`] names a shader and carries the parameter values that
//! shader's material handler uploads. Four shaders ship with the crate:
//!
//! | Shader | Constructor | Parameters | Lighting |
//! |--------|-------------|------------|----------|
//! | `basic` | [`basic`] | `color` | none |
//! | `normal` | [`normal`] | none | none, shades by normal |
//! | `diffuse` | [`diffuse`] | `color` | ambient, directional, point |
//! | `phong` | [`phong`] | `color`, `shininess`, `specular_color` | diffuse plus specular |
//!
//! The lit shaders declare `u_a_light`, `u_d_lights[5]` and `u_p_lights[5]`;
//! lights beyond the fifth of each kind are not bound.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::error::ShaderError;
use crate::shader::{ShaderDescriptor, StructDecl, UniformDecl, UniformValue, Variable};

pub const BASIC_SHADER: &str = "basic";
pub const NORMAL_SHADER: &str = "normal";
pub const DIFFUSE_SHADER: &str = "diffuse";
pub const PHONG_SHADER: &str = "phong";

/// Length of the directional and point light arrays in the lit shaders.
pub const MAX_LIGHTS: usize = 5;

/// A shader name plus the uniform values its handler reads.
///
/// Models that look the same each hold a clone of one material.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub shader: String,
    pub params: BTreeMap<String, UniformValue>,
}

impl Material {
    pub fn new(shader: impl Into<String>) -> Self {
        Self {
            shader: shader.into(),
            params: BTreeMap::new(),
        }
    }

    /// Sets a parameter, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.params.get(name)
    }

    /// Like [`get`](Self::get), but a missing parameter is an error naming it.
    pub fn require(&self, name: &str) -> Result<&UniformValue, ShaderError> {
        self.params.get(name).ok_or_else(|| ShaderError::MissingParameter {
            shader: self.shader.clone(),
            param: name.to_string(),
        })
    }
}

/// Unlit solid color.
pub fn basic(color: Vec3) -> Material {
    Material::new(BASIC_SHADER).with("color", color)
}

/// Colors surfaces by their world-space normal.
pub fn normal() -> Material {
    Material::new(NORMAL_SHADER)
}

/// Lambertian shading under the scene's lights.
pub fn diffuse(color: Vec3) -> Material {
    Material::new(DIFFUSE_SHADER).with("color", color)
}

/// Diffuse plus a specular highlight toward the camera.
///
/// Highlights appear only when `shininess` is above 1.
pub fn phong(color: Vec3, shininess: f32, specular_color: Vec3) -> Material {
    Material::new(PHONG_SHADER)
        .with("color", color)
        .with("shininess", shininess)
        .with("specular_color", specular_color)
}

/// Descriptors for every built-in shader.
pub fn builtin_shaders() -> Vec<ShaderDescriptor> {
    vec![basic_shader(), normal_shader(), diffuse_shader(), phong_shader()]
}

fn with_light_structs(desc: ShaderDescriptor) -> ShaderDescriptor {
    desc.add_struct(
        StructDecl::new("a_light")
            .field("color", "vec3")
            .field("attenuation", "float"),
    )
    .add_struct(
        StructDecl::new("d_light")
            .field("direction", "vec3")
            .field("color", "vec3"),
    )
    .add_struct(
        StructDecl::new("p_light")
            .field("position", "vec3")
            .field("color", "vec3")
            .field("attenuation", "float"),
    )
}

fn with_light_uniforms(desc: ShaderDescriptor) -> ShaderDescriptor {
    desc.add_uniform(UniformDecl::new("u_a_light", "a_light"))
        .add_uniform(UniformDecl::new("u_d_lights", "d_light").array(MAX_LIGHTS))
        .add_uniform(UniformDecl::new("u_p_lights", "p_light").array(MAX_LIGHTS))
}

const LIT_VERTEX_MAIN: &str = "void main(void) {
  vec4 world_coord = u_model * vec4(a_position, 1.0);
  gl_Position = u_proj * u_view * world_coord;
  normal = u_normal * a_normal;
  position = world_coord.xyz;
}";

const DIRECTIONAL_LIGHT_FN: &str = "vec3 directional_light(vec3 normal, vec3 color, d_light light) {
  float coefficient = dot(normalize(normal), normalize(light.direction));
  return max(0.0, coefficient) * color * light.color;
}";

pub fn basic_shader() -> ShaderDescriptor {
    ShaderDescriptor::new(BASIC_SHADER)
        .defaults()
        .vertex()
        .add_function(
            "void main(void) {
  vec4 world_coord = u_model * vec4(a_position, 1.0);
  gl_Position = u_proj * u_view * world_coord;
}",
        )
        .fragment()
        .add_uniform(UniformDecl::new("u_color", "vec3"))
        .add_function(
            "void main(void) {
  final_color = vec4(u_color, 1.0);
}",
        )
        .material_handler(|program, cx, material| {
            program.set(cx, "u_color", material.require("color")?)
        })
}

pub fn normal_shader() -> ShaderDescriptor {
    ShaderDescriptor::new(NORMAL_SHADER)
        .defaults()
        .vertex()
        .add_output(Variable::new("normal", "vec3"))
        .add_function(
            "void main(void) {
  gl_Position = u_proj * u_view * u_model * vec4(a_position, 1.0);
  normal = u_normal * a_normal;
}",
        )
        .fragment()
        .add_input(Variable::new("normal", "vec3"))
        .add_function(
            "void main(void) {
  vec3 n = normalize(normal);
  final_color = vec4(vec3(1.0, 1.0, 1.0) - n / 3.0, 1.0);
}",
        )
}

pub fn diffuse_shader() -> ShaderDescriptor {
    let desc = with_light_structs(ShaderDescriptor::new(DIFFUSE_SHADER).defaults())
        .vertex()
        .add_output(Variable::new("normal", "vec3"))
        .add_output(Variable::new("position", "vec3"))
        .add_function(LIT_VERTEX_MAIN)
        .fragment()
        .add_input(Variable::new("normal", "vec3"))
        .add_input(Variable::new("position", "vec3"))
        .add_uniform(UniformDecl::new("u_color", "vec3"));

    with_light_uniforms(desc)
        .add_function(DIRECTIONAL_LIGHT_FN)
        .add_function(
            "vec3 point_light(vec3 position, vec3 normal, vec3 color, p_light light) {
  vec3 n_normal = normalize(normal);
  vec3 to_point = light.position - position;
  float p_coefficient = dot(n_normal, normalize(to_point));
  vec3 p_diffuse = max(0.0, p_coefficient) * color * light.color;
  float attenuation = 1.0 / (1.0 + light.attenuation * pow(length(to_point), 2.0));
  return attenuation * p_diffuse;
}",
        )
        .add_function(
            "void main(void) {
  vec3 directional = vec3(0.0);
  vec3 point = vec3(0.0);
  vec3 ambient = u_a_light.attenuation * u_color * u_a_light.color;
  for (int i = 0; i < 5; ++i) {
    directional += directional_light(normal, u_color, u_d_lights[i]);
  }
  for (int i = 0; i < 5; ++i) {
    point += point_light(position, normal, u_color, u_p_lights[i]);
  }
  final_color = vec4(ambient + directional + point, 1.0);
}",
        )
        .material_handler(|program, cx, material| {
            program.set(cx, "u_color", material.require("color")?)
        })
}

pub fn phong_shader() -> ShaderDescriptor {
    let desc = with_light_structs(ShaderDescriptor::new(PHONG_SHADER).defaults())
        .vertex()
        .add_output(Variable::new("normal", "vec3"))
        .add_output(Variable::new("position", "vec3"))
        .add_function(LIT_VERTEX_MAIN)
        .fragment()
        .add_input(Variable::new("normal", "vec3"))
        .add_input(Variable::new("position", "vec3"))
        .add_uniform(UniformDecl::new("u_camera", "vec3"))
        .add_uniform(UniformDecl::new("u_color", "vec3"))
        .add_uniform(UniformDecl::new("u_shininess", "float"))
        .add_uniform(UniformDecl::new("u_specular_color", "vec3"));

    with_light_uniforms(desc)
        .add_function(DIRECTIONAL_LIGHT_FN)
        .add_function(
            "vec3 point_light(vec3 position, vec3 normal, vec3 color, vec3 camera, p_light light) {
  vec3 n_normal = normalize(normal);
  vec3 to_point = light.position - position;
  float attenuation = 1.0 / (1.0 + light.attenuation * pow(length(to_point), 2.0));
  to_point = normalize(to_point);
  float p_coefficient = dot(n_normal, to_point);
  vec3 p_diffuse = max(0.0, p_coefficient) * color * light.color;
  float s_coefficient = 0.0;
  if (p_coefficient > 0.0 && u_shininess > 1.0) {
    vec3 reflection = reflect(-to_point, n_normal);
    vec3 to_camera = normalize(camera - position);
    s_coefficient = pow(max(0.0, dot(to_camera, reflection)), u_shininess);
  }
  vec3 p_specular = s_coefficient * u_specular_color * light.color;
  return attenuation * (p_diffuse + p_specular);
}",
        )
        .add_function(
            "void main(void) {
  vec3 directional = vec3(0.0);
  vec3 point = vec3(0.0);
  vec3 ambient = u_a_light.attenuation * u_color * u_a_light.color;
  for (int i = 0; i < 5; ++i) {
    directional += directional_light(normal, u_color, u_d_lights[i]);
  }
  for (int i = 0; i < 5; ++i) {
    point += point_light(position, normal, u_color, u_camera, u_p_lights[i]);
  }
  final_color = vec4(ambient + directional + point, 1.0);
}",
        )
        .material_handler(|program, cx, material| {
            program.set(cx, "u_color", material.require("color")?)?;
            program.set(cx, "u_shininess", material.require("shininess")?)?;
            program.set(cx, "u_specular_color", material.require("specular_color")?)
        })
}
