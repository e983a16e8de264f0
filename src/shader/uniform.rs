//! Uniform values and the per-uniform binding table built at link time.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use image::RgbaImage;

use crate::error::ShaderError;
use crate::gl::{GraphicsContext, ProgramId, UniformLocation};
use crate::shader::descriptor::{GlslType, StructDecl, UniformDecl};
use crate::shader::texture_units::TextureUnits;

/// A value that can be uploaded to a uniform.
#[derive(Clone, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
    /// Field name to value, for struct uniforms.
    Struct(BTreeMap<String, UniformValue>),
    /// Elements of an array uniform.
    Array(Vec<UniformValue>),
    /// Image data bound to a texture unit by logical name.
    Texture(TextureSource),
}

/// A named RGBA image for `sampler2D` uniforms.
///
/// The name identifies the texture: the first upload under a name claims a
/// texture unit, later uploads with the same name reuse it.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureSource {
    pub name: String,
    pub image: Arc<RgbaImage>,
}

impl UniformValue {
    /// Builds a struct value from `(field, value)` pairs.
    pub fn fields<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, UniformValue)>,
    {
        UniformValue::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn texture(name: impl Into<String>, image: Arc<RgbaImage>) -> Self {
        UniformValue::Texture(TextureSource {
            name: name.into(),
            image,
        })
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Int(_) => "int",
            UniformValue::Bool(_) => "bool",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat3(_) => "mat3",
            UniformValue::Mat4(_) => "mat4",
            UniformValue::Struct(_) => "struct",
            UniformValue::Array(_) => "array",
            UniformValue::Texture(_) => "texture",
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Bool(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Mat3> for UniformValue {
    fn from(m: Mat3) -> Self {
        UniformValue::Mat3(m)
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        UniformValue::Mat4(m)
    }
}

impl<T: Into<UniformValue>> From<Vec<T>> for UniformValue {
    fn from(items: Vec<T>) -> Self {
        UniformValue::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Types that map to a single uniform upload call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarType {
    Float,
    Int,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
}

impl ScalarType {
    fn from_glsl(ty: &GlslType) -> Option<Self> {
        Some(match ty {
            GlslType::Float => ScalarType::Float,
            GlslType::Int => ScalarType::Int,
            GlslType::Bool => ScalarType::Bool,
            GlslType::Vec2 => ScalarType::Vec2,
            GlslType::Vec3 => ScalarType::Vec3,
            GlslType::Vec4 => ScalarType::Vec4,
            GlslType::Mat3 => ScalarType::Mat3,
            GlslType::Mat4 => ScalarType::Mat4,
            GlslType::Sampler2D | GlslType::Named(_) => return None,
        })
    }

    fn accepts(self, value: &UniformValue) -> bool {
        matches!(
            (self, value),
            (ScalarType::Float, UniformValue::Float(_))
                | (ScalarType::Int, UniformValue::Int(_))
                | (ScalarType::Bool, UniformValue::Bool(_) | UniformValue::Int(_))
                | (ScalarType::Vec2, UniformValue::Vec2(_))
                | (ScalarType::Vec3, UniformValue::Vec3(_))
                | (ScalarType::Vec4, UniformValue::Vec4(_))
                | (ScalarType::Mat3, UniformValue::Mat3(_))
                | (ScalarType::Mat4, UniformValue::Mat4(_))
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Float => "float",
            ScalarType::Int => "int",
            ScalarType::Bool => "bool",
            ScalarType::Vec2 => "vec2",
            ScalarType::Vec3 => "vec3",
            ScalarType::Vec4 => "vec4",
            ScalarType::Mat3 => "mat3",
            ScalarType::Mat4 => "mat4",
        };
        f.write_str(name)
    }
}

/// One scalar slot of a struct uniform.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSlot {
    pub field: String,
    pub ty: ScalarType,
    pub location: Option<UniformLocation>,
}

/// How a declared uniform is uploaded, resolved once after linking.
///
/// A `None` location means the driver dropped that slot; uploads to it are
/// skipped after the value's type is checked.
#[derive(Clone, Debug, PartialEq)]
pub enum UniformBinding {
    /// `float`, `int`, `bool`, vectors, and matrices.
    Scalar {
        ty: ScalarType,
        location: Option<UniformLocation>,
    },
    /// A struct: one slot per `name.field`.
    Struct { fields: Vec<FieldSlot> },
    /// A scalar array: one slot per `name[i]`.
    ScalarArray {
        ty: ScalarType,
        locations: Vec<Option<UniformLocation>>,
    },
    /// A struct array: one slot per `name[i].field`.
    StructArray { elements: Vec<Vec<FieldSlot>> },
    /// A `sampler2D`, fed a texture unit index.
    Sampler { location: Option<UniformLocation> },
}

/// The setter name a uniform is exposed under: `set` plus the name in camel case.
///
/// ```
/// use phanto::shader::setter_name;
///
/// assert_eq!(setter_name("u_d_lights"), "setUDLights");
/// assert_eq!(setter_name("u_color"), "setUColor");
/// ```
pub fn setter_name(uniform: &str) -> String {
    let mut out = String::with_capacity(uniform.len() + 3);
    out.push_str("set");
    let mut upper = true;
    for c in uniform.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn struct_slots(
    gl: &mut dyn GraphicsContext,
    program: ProgramId,
    prefix: &str,
    decl: &StructDecl,
    shader: &str,
    uniform: &str,
) -> Result<Vec<FieldSlot>, ShaderError> {
    decl.fields
        .iter()
        .map(|field| -> Result<FieldSlot, ShaderError> {
            let ty = ScalarType::from_glsl(&field.ty).ok_or_else(|| ShaderError::UnknownType {
                shader: shader.to_string(),
                uniform: format!("{uniform}.{}", field.name),
                ty: field.ty.to_string(),
            })?;
            Ok(FieldSlot {
                field: field.name.clone(),
                ty,
                location: gl.uniform_location(program, &format!("{prefix}.{}", field.name)),
            })
        })
        .collect()
}

impl UniformBinding {
    /// Looks up every location a declaration needs and picks its binding kind.
    pub(crate) fn resolve(
        gl: &mut dyn GraphicsContext,
        program: ProgramId,
        shader: &str,
        decl: &UniformDecl,
        structs: &[StructDecl],
    ) -> Result<Self, ShaderError> {
        let name = decl.name.as_str();
        if let Some(ty) = ScalarType::from_glsl(&decl.ty) {
            return Ok(match decl.count {
                Some(count) => UniformBinding::ScalarArray {
                    ty,
                    locations: (0..count)
                        .map(|i| gl.uniform_location(program, &format!("{name}[{i}]")))
                        .collect(),
                },
                None => UniformBinding::Scalar {
                    ty,
                    location: gl.uniform_location(program, name),
                },
            });
        }

        if decl.ty == GlslType::Sampler2D {
            return Ok(UniformBinding::Sampler {
                location: gl.uniform_location(program, name),
            });
        }

        let Some(struct_decl) = structs.iter().find(|s| s.name == decl.ty.as_str()) else {
            return Err(ShaderError::UnknownType {
                shader: shader.to_string(),
                uniform: name.to_string(),
                ty: decl.ty.to_string(),
            });
        };

        match decl.count {
            Some(count) => {
                let elements = (0..count)
                    .map(|i| struct_slots(gl, program, &format!("{name}[{i}]"), struct_decl, shader, name))
                    .collect::<Result<_, _>>()?;
                Ok(UniformBinding::StructArray { elements })
            }
            None => Ok(UniformBinding::Struct {
                fields: struct_slots(gl, program, name, struct_decl, shader, name)?,
            }),
        }
    }

    /// Uploads `value` through this binding.
    ///
    /// Arrays upload the provided elements up to the declared length; extra
    /// elements are ignored. Struct fields absent from the value are skipped.
    pub(crate) fn apply(
        &self,
        gl: &mut dyn GraphicsContext,
        textures: &mut TextureUnits,
        uniform: &str,
        value: &UniformValue,
    ) -> Result<(), ShaderError> {
        match self {
            UniformBinding::Scalar { ty, location } => upload_scalar(gl, uniform, *ty, *location, value),
            UniformBinding::Struct { fields } => upload_struct(gl, uniform, fields, value),
            UniformBinding::ScalarArray { ty, locations } => {
                let items = expect_array(uniform, value, || format!("{ty}[{}]", locations.len()))?;
                for (location, item) in locations.iter().zip(items) {
                    upload_scalar(gl, uniform, *ty, *location, item)?;
                }
                Ok(())
            }
            UniformBinding::StructArray { elements } => {
                let items = expect_array(uniform, value, || format!("struct[{}]", elements.len()))?;
                for (fields, item) in elements.iter().zip(items) {
                    upload_struct(gl, uniform, fields, item)?;
                }
                Ok(())
            }
            UniformBinding::Sampler { location } => {
                let unit = match value {
                    UniformValue::Texture(source) => textures.unit_for(gl, &source.name, &source.image),
                    UniformValue::Int(unit) => *unit as u32,
                    other => {
                        return Err(ShaderError::TypeMismatch {
                            uniform: uniform.to_string(),
                            expected: "sampler2D".to_string(),
                            found: other.kind(),
                        });
                    }
                };
                if let Some(location) = location {
                    gl.uniform_1i(*location, unit as i32);
                }
                Ok(())
            }
        }
    }
}

fn expect_array<'v>(
    uniform: &str,
    value: &'v UniformValue,
    expected: impl FnOnce() -> String,
) -> Result<&'v [UniformValue], ShaderError> {
    match value {
        UniformValue::Array(items) => Ok(items),
        other => Err(ShaderError::TypeMismatch {
            uniform: uniform.to_string(),
            expected: expected(),
            found: other.kind(),
        }),
    }
}

fn upload_struct(
    gl: &mut dyn GraphicsContext,
    uniform: &str,
    fields: &[FieldSlot],
    value: &UniformValue,
) -> Result<(), ShaderError> {
    let UniformValue::Struct(map) = value else {
        return Err(ShaderError::TypeMismatch {
            uniform: uniform.to_string(),
            expected: "struct".to_string(),
            found: value.kind(),
        });
    };
    for slot in fields {
        if let Some(field_value) = map.get(&slot.field) {
            let name = format!("{uniform}.{}", slot.field);
            upload_scalar(gl, &name, slot.ty, slot.location, field_value)?;
        }
    }
    Ok(())
}

fn upload_scalar(
    gl: &mut dyn GraphicsContext,
    uniform: &str,
    ty: ScalarType,
    location: Option<UniformLocation>,
    value: &UniformValue,
) -> Result<(), ShaderError> {
    if !ty.accepts(value) {
        return Err(ShaderError::TypeMismatch {
            uniform: uniform.to_string(),
            expected: ty.to_string(),
            found: value.kind(),
        });
    }
    let Some(location) = location else {
        return Ok(());
    };
    match value {
        UniformValue::Float(v) => gl.uniform_1f(location, *v),
        UniformValue::Int(v) => gl.uniform_1i(location, *v),
        UniformValue::Bool(b) => gl.uniform_1i(location, i32::from(*b)),
        UniformValue::Vec2(v) => gl.uniform_2fv(location, v.to_array()),
        UniformValue::Vec3(v) => gl.uniform_3fv(location, v.to_array()),
        UniformValue::Vec4(v) => gl.uniform_4fv(location, v.to_array()),
        UniformValue::Mat3(m) => gl.uniform_matrix_3fv(location, &m.to_cols_array()),
        UniformValue::Mat4(m) => gl.uniform_matrix_4fv(location, &m.to_cols_array()),
        // Rejected by `accepts` above.
        UniformValue::Struct(_) | UniformValue::Array(_) | UniformValue::Texture(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlCall, RecordedUniform, RecordingContext, ShaderStage};

    const SOURCE: &str = "uniform vec3 u_color;\n\
        uniform float u_weights[3];\n\
        uniform p_light u_light;\n\
        uniform p_light u_lights[2];\n\
        uniform sampler2D u_tex;\n";

    fn light() -> StructDecl {
        StructDecl::new("p_light")
            .field("position", "vec3")
            .field("attenuation", "float")
    }

    fn program(gl: &mut RecordingContext) -> ProgramId {
        let vs = gl.compile_shader(ShaderStage::Vertex, SOURCE).unwrap();
        let p = gl.create_program();
        gl.attach_shader(p, vs);
        gl.link_program(p).unwrap();
        p
    }

    fn bind(gl: &mut RecordingContext, p: ProgramId, decl: UniformDecl) -> UniformBinding {
        UniformBinding::resolve(gl, p, "test", &decl, &[light()]).unwrap()
    }

    #[test]
    fn setter_names_are_camel_case() {
        assert_eq!(setter_name("u_model"), "setUModel");
        assert_eq!(setter_name("u_p_lights"), "setUPLights");
        assert_eq!(setter_name("u_specular_color"), "setUSpecularColor");
        assert_eq!(setter_name("color"), "setColor");
    }

    #[test]
    fn binding_kind_follows_declared_type() {
        let mut gl = RecordingContext::new();
        let p = program(&mut gl);

        assert!(matches!(
            bind(&mut gl, p, UniformDecl::new("u_color", "vec3")),
            UniformBinding::Scalar { ty: ScalarType::Vec3, location: Some(_) }
        ));
        assert!(matches!(
            bind(&mut gl, p, UniformDecl::new("u_weights", "float").array(3)),
            UniformBinding::ScalarArray { locations, .. } if locations.len() == 3
        ));
        assert!(matches!(
            bind(&mut gl, p, UniformDecl::new("u_light", "p_light")),
            UniformBinding::Struct { fields } if fields.len() == 2
        ));
        assert!(matches!(
            bind(&mut gl, p, UniformDecl::new("u_lights", "p_light").array(2)),
            UniformBinding::StructArray { elements } if elements.len() == 2 && elements[1].len() == 2
        ));
        assert!(matches!(
            bind(&mut gl, p, UniformDecl::new("u_tex", "sampler2D")),
            UniformBinding::Sampler { location: Some(_) }
        ));
    }

    #[test]
    fn unknown_struct_type_is_rejected() {
        let mut gl = RecordingContext::new();
        let p = program(&mut gl);
        let err = UniformBinding::resolve(&mut gl, p, "test", &UniformDecl::new("u_x", "s_light"), &[])
            .unwrap_err();
        assert!(matches!(err, ShaderError::UnknownType { ty, .. } if ty == "s_light"));
    }

    #[test]
    fn struct_array_forwards_each_field_and_drops_excess() {
        let mut gl = RecordingContext::new();
        let mut units = TextureUnits::new();
        let p = program(&mut gl);
        let binding = bind(&mut gl, p, UniformDecl::new("u_lights", "p_light").array(2));

        let element = |x: f32| {
            UniformValue::fields([
                ("position", UniformValue::Vec3(Vec3::new(x, 0.0, 0.0))),
                ("attenuation", UniformValue::Float(x)),
            ])
        };
        let value = UniformValue::Array(vec![element(1.0), element(2.0), element(3.0)]);
        binding.apply(&mut gl, &mut units, "u_lights", &value).unwrap();

        assert_eq!(
            gl.uniform_values("u_lights[1].position"),
            vec![&RecordedUniform::Vec3([2.0, 0.0, 0.0])]
        );
        assert_eq!(gl.uniform_values("u_lights[0].attenuation"), vec![&RecordedUniform::Float(1.0)]);
        assert_eq!(gl.count(|c| matches!(c, GlCall::Uniform { .. })), 4);
    }

    #[test]
    fn missing_struct_fields_are_skipped() {
        let mut gl = RecordingContext::new();
        let mut units = TextureUnits::new();
        let p = program(&mut gl);
        let binding = bind(&mut gl, p, UniformDecl::new("u_light", "p_light"));

        let value = UniformValue::fields([("attenuation", UniformValue::Float(0.5))]);
        binding.apply(&mut gl, &mut units, "u_light", &value).unwrap();

        assert!(gl.uniform_values("u_light.position").is_empty());
        assert_eq!(gl.uniform_values("u_light.attenuation"), vec![&RecordedUniform::Float(0.5)]);
    }

    #[test]
    fn scalar_array_uploads_each_element() {
        let mut gl = RecordingContext::new();
        let mut units = TextureUnits::new();
        let p = program(&mut gl);
        let binding = bind(&mut gl, p, UniformDecl::new("u_weights", "float").array(3));

        binding
            .apply(&mut gl, &mut units, "u_weights", &UniformValue::from(vec![0.25f32, 0.5]))
            .unwrap();
        assert_eq!(gl.uniform_values("u_weights[0]"), vec![&RecordedUniform::Float(0.25)]);
        assert_eq!(gl.uniform_values("u_weights[1]"), vec![&RecordedUniform::Float(0.5)]);
        assert!(gl.uniform_values("u_weights[2]").is_empty());
    }

    #[test]
    fn mismatched_value_is_an_error() {
        let mut gl = RecordingContext::new();
        let mut units = TextureUnits::new();
        let p = program(&mut gl);
        let binding = bind(&mut gl, p, UniformDecl::new("u_color", "vec3"));

        let err = binding
            .apply(&mut gl, &mut units, "u_color", &UniformValue::Float(1.0))
            .unwrap_err();
        assert!(matches!(
            err,
            ShaderError::TypeMismatch { expected, found: "float", .. } if expected == "vec3"
        ));
        assert!(gl.uniform_values("u_color").is_empty());
    }

    #[test]
    fn sampler_reuses_the_unit_for_a_name() {
        let mut gl = RecordingContext::new();
        let mut units = TextureUnits::new();
        let p = program(&mut gl);
        let binding = bind(&mut gl, p, UniformDecl::new("u_tex", "sampler2D"));
        let image = Arc::new(RgbaImage::new(2, 2));

        let value = UniformValue::texture("crate", image);
        binding.apply(&mut gl, &mut units, "u_tex", &value).unwrap();
        binding.apply(&mut gl, &mut units, "u_tex", &value).unwrap();

        assert_eq!(gl.live_textures(), 1);
        assert_eq!(
            gl.uniform_values("u_tex"),
            vec![&RecordedUniform::Int(0), &RecordedUniform::Int(0)]
        );
    }
}
