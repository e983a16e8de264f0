//! Declarative shader descriptions and GLSL source synthesis.

use std::fmt;
use std::fmt::Write as _;
use std::rc::Rc;

use crate::error::ShaderError;
use crate::gl::ShaderStage;
use crate::material::Material;
use crate::shader::{ShaderProgram, UniformContext};

/// Callback that pushes a material's values into a bound program.
pub type MaterialHandler =
    Rc<dyn Fn(&ShaderProgram, &mut UniformContext<'_>, &Material) -> Result<(), ShaderError>>;

/// A GLSL type name as it appears in a declaration.
///
/// Anything that is not a built-in scalar, vector, matrix, or sampler is kept
/// as [`GlslType::Named`]; for uniforms it must name a registered struct.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GlslType {
    Float,
    Int,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
    Sampler2D,
    Named(String),
}

impl GlslType {
    pub fn as_str(&self) -> &str {
        match self {
            GlslType::Float => "float",
            GlslType::Int => "int",
            GlslType::Bool => "bool",
            GlslType::Vec2 => "vec2",
            GlslType::Vec3 => "vec3",
            GlslType::Vec4 => "vec4",
            GlslType::Mat3 => "mat3",
            GlslType::Mat4 => "mat4",
            GlslType::Sampler2D => "sampler2D",
            GlslType::Named(name) => name,
        }
    }
}

impl From<&str> for GlslType {
    fn from(name: &str) -> Self {
        match name {
            "float" => GlslType::Float,
            "int" => GlslType::Int,
            "bool" => GlslType::Bool,
            "vec2" => GlslType::Vec2,
            "vec3" => GlslType::Vec3,
            "vec4" => GlslType::Vec4,
            "mat3" => GlslType::Mat3,
            "mat4" => GlslType::Mat4,
            "sampler2D" => GlslType::Sampler2D,
            other => GlslType::Named(other.to_string()),
        }
    }
}

impl fmt::Display for GlslType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage input or output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub ty: GlslType,
    /// Declared with `flat` interpolation.
    pub flat: bool,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: impl Into<GlslType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            flat: false,
        }
    }

    pub fn flat(mut self) -> Self {
        self.flat = true;
        self
    }
}

/// A uniform declaration, optionally an array of `count` elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformDecl {
    pub name: String,
    pub ty: GlslType,
    pub count: Option<usize>,
}

impl UniformDecl {
    pub fn new(name: impl Into<String>, ty: impl Into<GlslType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            count: None,
        }
    }

    pub fn array(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub ty: GlslType,
}

/// A user struct type shared by both stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<StructField>,
}

impl StructDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, ty: impl Into<GlslType>) -> Self {
        self.fields.push(StructField {
            name: name.into(),
            ty: ty.into(),
        });
        self
    }
}

/// Declarations belonging to one stage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageDecls {
    pub inputs: Vec<Variable>,
    pub outputs: Vec<Variable>,
    pub uniforms: Vec<UniformDecl>,
    /// Raw GLSL appended verbatim, in registration order.
    pub functions: Vec<String>,
}

/// Declarative description of a shader program.
///
/// Declarations go to the *active* stage, selected with
/// [`vertex`](Self::vertex) and [`fragment`](Self::fragment) (vertex until
/// switched). Structs are shared by both stages.
///
/// ```
/// use phanto::shader::{ShaderDescriptor, StructDecl, UniformDecl};
///
/// let desc = ShaderDescriptor::new("flat")
///     .defaults()
///     .add_struct(StructDecl::new("tint").field("color", "vec3").field("strength", "float"))
///     .fragment()
///     .add_uniform(UniformDecl::new("u_tints", "tint").array(2))
///     .add_function("void main(void) { final_color = vec4(u_tints[0].color, 1.0); }");
///
/// let src = desc.source(phanto::gl::ShaderStage::Fragment);
/// assert!(src.contains("uniform tint u_tints[2];"));
/// ```
#[derive(Clone)]
pub struct ShaderDescriptor {
    name: String,
    structs: Vec<StructDecl>,
    vertex: StageDecls,
    fragment: StageDecls,
    active: ShaderStage,
    handler: Option<MaterialHandler>,
}

impl fmt::Debug for ShaderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderDescriptor")
            .field("name", &self.name)
            .field("structs", &self.structs)
            .field("vertex", &self.vertex)
            .field("fragment", &self.fragment)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl ShaderDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            structs: Vec::new(),
            vertex: StageDecls::default(),
            fragment: StageDecls::default(),
            active: ShaderStage::Vertex,
            handler: None,
        }
    }

    /// Declares the attributes, matrices, and output every built-in shader uses.
    ///
    /// Vertex inputs `a_position`, `a_normal`, `a_texture` (bound to
    /// locations 0, 1, 2), vertex uniforms `u_proj`, `u_view`, `u_model`,
    /// `u_normal`, and the fragment output `final_color`. Leaves the fragment
    /// stage active.
    pub fn defaults(self) -> Self {
        self.vertex()
            .add_input(Variable::new("a_position", GlslType::Vec3))
            .add_input(Variable::new("a_normal", GlslType::Vec3))
            .add_input(Variable::new("a_texture", GlslType::Vec3))
            .add_uniform(UniformDecl::new("u_proj", GlslType::Mat4))
            .add_uniform(UniformDecl::new("u_view", GlslType::Mat4))
            .add_uniform(UniformDecl::new("u_model", GlslType::Mat4))
            .add_uniform(UniformDecl::new("u_normal", GlslType::Mat3))
            .fragment()
            .add_output(Variable::new("final_color", GlslType::Vec4))
    }

    pub fn vertex(mut self) -> Self {
        self.active = ShaderStage::Vertex;
        self
    }

    pub fn fragment(mut self) -> Self {
        self.active = ShaderStage::Fragment;
        self
    }

    /// Registers a struct type. Re-registering a name replaces its fields in place.
    pub fn add_struct(mut self, decl: StructDecl) -> Self {
        match self.structs.iter_mut().find(|s| s.name == decl.name) {
            Some(existing) => *existing = decl,
            None => self.structs.push(decl),
        }
        self
    }

    pub fn add_input(mut self, input: Variable) -> Self {
        self.active_mut().inputs.push(input);
        self
    }

    pub fn add_output(mut self, output: Variable) -> Self {
        self.active_mut().outputs.push(output);
        self
    }

    pub fn add_uniform(mut self, uniform: UniformDecl) -> Self {
        self.active_mut().uniforms.push(uniform);
        self
    }

    pub fn add_function(mut self, body: impl Into<String>) -> Self {
        self.active_mut().functions.push(body.into());
        self
    }

    /// Sets the callback used to upload a material's values at draw time.
    pub fn material_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ShaderProgram, &mut UniformContext<'_>, &Material) -> Result<(), ShaderError>
            + 'static,
    {
        self.handler = Some(Rc::new(handler));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn structs(&self) -> &[StructDecl] {
        &self.structs
    }

    pub fn find_struct(&self, name: &str) -> Option<&StructDecl> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn stage(&self, stage: ShaderStage) -> &StageDecls {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }

    pub fn handler(&self) -> Option<&MaterialHandler> {
        self.handler.as_ref()
    }

    fn active_mut(&mut self) -> &mut StageDecls {
        match self.active {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Fragment => &mut self.fragment,
        }
    }

    /// Synthesizes the GLSL ES 3.00 source for one stage.
    ///
    /// Sections appear in a fixed order: preamble, structs, inputs, uniforms,
    /// outputs, functions. The output depends only on the declarations, so
    /// equal descriptors produce byte-identical source.
    pub fn source(&self, stage: ShaderStage) -> String {
        let decls = self.stage(stage);
        let mut src = String::from("#version 300 es\nprecision mediump float;\n");

        // Writing into a String cannot fail.
        for s in &self.structs {
            let _ = writeln!(src, "struct {} {{", s.name);
            for field in &s.fields {
                let _ = writeln!(src, "  {} {};", field.ty, field.name);
            }
            src.push_str("};\n");
        }
        for input in &decls.inputs {
            let qualifier = if input.flat { "flat in" } else { "in" };
            let _ = writeln!(src, "{qualifier} {} {};", input.ty, input.name);
        }
        for uniform in &decls.uniforms {
            match uniform.count {
                Some(count) => {
                    let _ = writeln!(src, "uniform {} {}[{count}];", uniform.ty, uniform.name);
                }
                None => {
                    let _ = writeln!(src, "uniform {} {};", uniform.ty, uniform.name);
                }
            }
        }
        for output in &decls.outputs {
            let qualifier = if output.flat { "flat out" } else { "out" };
            let _ = writeln!(src, "{qualifier} {} {};", output.ty, output.name);
        }
        for body in &decls.functions {
            src.push_str(body);
            src.push('\n');
        }
        src
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit() -> ShaderDescriptor {
        ShaderDescriptor::new("lit")
            .defaults()
            .add_struct(
                StructDecl::new("d_light")
                    .field("direction", "vec3")
                    .field("color", "vec3"),
            )
            .vertex()
            .add_output(Variable::new("normal", "vec3"))
            .add_output(Variable::new("id", "int").flat())
            .add_function("void main(void) { gl_Position = vec4(a_position, 1.0); }")
            .fragment()
            .add_input(Variable::new("normal", "vec3"))
            .add_input(Variable::new("id", "int").flat())
            .add_uniform(UniformDecl::new("u_d_lights", "d_light").array(5))
            .add_function("void main(void) { final_color = vec4(normal, 1.0); }")
    }

    #[test]
    fn source_is_byte_identical_across_builds() {
        let a = lit();
        let b = lit();
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            assert_eq!(a.source(stage), b.source(stage));
            assert_eq!(a.source(stage), a.source(stage));
        }
    }

    #[test]
    fn fragment_source_has_sections_in_order() {
        let src = lit().source(ShaderStage::Fragment);
        let expected = "#version 300 es\n\
            precision mediump float;\n\
            struct d_light {\n  vec3 direction;\n  vec3 color;\n};\n\
            in vec3 normal;\n\
            flat in int id;\n\
            uniform d_light u_d_lights[5];\n\
            out vec4 final_color;\n\
            void main(void) { final_color = vec4(normal, 1.0); }\n";
        assert_eq!(src, expected);
    }

    #[test]
    fn defaults_declare_the_shared_vertex_interface() {
        let desc = ShaderDescriptor::new("d").defaults();
        let vertex = desc.stage(ShaderStage::Vertex);
        let inputs: Vec<_> = vertex.inputs.iter().map(|v| v.name.as_str()).collect();
        let uniforms: Vec<_> = vertex.uniforms.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(inputs, ["a_position", "a_normal", "a_texture"]);
        assert_eq!(uniforms, ["u_proj", "u_view", "u_model", "u_normal"]);
        assert_eq!(desc.stage(ShaderStage::Fragment).outputs[0].name, "final_color");
    }

    #[test]
    fn declarations_land_on_the_active_stage() {
        let desc = ShaderDescriptor::new("s")
            .add_uniform(UniformDecl::new("u_a", "float"))
            .fragment()
            .add_uniform(UniformDecl::new("u_b", "float"))
            .vertex()
            .add_uniform(UniformDecl::new("u_c", "float"));
        let names = |stage| {
            desc.stage(stage)
                .uniforms
                .iter()
                .map(|u| u.name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(ShaderStage::Vertex), ["u_a", "u_c"]);
        assert_eq!(names(ShaderStage::Fragment), ["u_b"]);
    }

    #[test]
    fn re_registering_a_struct_keeps_its_position() {
        let desc = ShaderDescriptor::new("s")
            .add_struct(StructDecl::new("a").field("x", "float"))
            .add_struct(StructDecl::new("b").field("y", "float"))
            .add_struct(StructDecl::new("a").field("z", "vec2"));
        let names: Vec<_> = desc.structs().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(desc.find_struct("a").unwrap().fields[0].ty, GlslType::Vec2);
    }

    #[test]
    fn type_names_round_trip_through_display() {
        for name in ["float", "int", "bool", "vec2", "vec3", "vec4", "mat3", "mat4", "sampler2D", "p_light"] {
            assert_eq!(GlslType::from(name).to_string(), name);
        }
        assert_eq!(GlslType::from("p_light"), GlslType::Named("p_light".into()));
    }
}
