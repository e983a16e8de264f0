//! Declarative shaders, program building, and uniform binding.
//!
//! A [`ShaderDescriptor`] lists a program's structs, per-stage inputs,
//! outputs, uniforms and function bodies. The [`ShaderRegistry`] turns it
//! into a [`ShaderProgram`] on first use: GLSL ES 3.00 source is synthesized
//! for both stages, compiled, linked with vertex inputs bound to locations in
//! declaration order, and every uniform is resolved to a [`UniformBinding`]
//! chosen by its declared type.
//!
//! ```
//! use glam::Vec3;
//! use phanto::gl::{RecordingContext, RecordedUniform};
//! use phanto::shader::{ShaderDescriptor, ShaderRegistry, TextureUnits, UniformContext, UniformDecl, UniformValue};
//!
//! let mut gl = RecordingContext::new();
//! let mut textures = TextureUnits::new();
//! let mut registry = ShaderRegistry::new();
//! registry.register(
//!     ShaderDescriptor::new("solid")
//!         .defaults()
//!         .fragment()
//!         .add_uniform(UniformDecl::new("u_color", "vec3")),
//! );
//!
//! let program = registry.program(&mut gl, "solid").unwrap().unwrap();
//! let mut cx = UniformContext::new(&mut gl, &mut textures);
//! program.set(&mut cx, "u_color", &UniformValue::from(Vec3::X)).unwrap();
//!
//! assert_eq!(gl.uniform_values("u_color"), vec![&RecordedUniform::Vec3([1.0, 0.0, 0.0])]);
//! ```

mod descriptor;
mod program;
mod registry;
mod texture_units;
mod uniform;

pub use descriptor::{
    GlslType, MaterialHandler, ShaderDescriptor, StageDecls, StructDecl, StructField, UniformDecl,
    Variable,
};
pub use program::{ShaderProgram, UniformContext};
pub use registry::ShaderRegistry;
pub use texture_units::TextureUnits;
pub use uniform::{FieldSlot, ScalarType, TextureSource, UniformBinding, UniformValue, setter_name};
