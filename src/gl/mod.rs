//! The graphics context contract consumed by the renderer.
//!
//! [`GraphicsContext`] is a GL-style immediate API: shader compile/link,
//! uniform lookup and typed uploads, buffers and vertex arrays, textures,
//! draw calls, and a handful of fixed-function state toggles. A WebGL2 or
//! desktop GL binding implements it by forwarding each call; the crate
//! itself never talks to a driver.
//!
//! Handles are opaque `u32` newtypes so a context can hand out whatever
//! names its backend uses while the trait stays object safe.
//!
//! [`RecordingContext`] is a headless implementation that keeps a log of
//! every call. It is what the test suite renders into.

mod recording;

pub use recording::{GlCall, RecordedUniform, RecordingContext};

use std::fmt;

/// Programmable pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Compiled shader stage object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Linked program object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Location of a single uniform slot inside a linked program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Primitive assembly mode for draw calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Index data.
    ElementArray,
}

/// Toggleable fixed-function state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    DepthTest,
    CullFace,
    PolygonOffsetFill,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DepthFunc {
    Less,
    LessEqual,
    Always,
}

/// Winding of front-facing triangles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrontFace {
    Ccw,
    Cw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CullFace {
    Front,
    Back,
    FrontAndBack,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    ClampToEdge,
    Repeat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// Sampler parameter applied to the currently bound 2D texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureParameter {
    WrapS(TextureWrap),
    WrapT(TextureWrap),
    MinFilter(TextureFilter),
    MagFilter(TextureFilter),
}

/// A GL-style drawing context.
///
/// Every method maps onto one WebGL2 call. Methods that can fail in GL
/// (`compile_shader`, `link_program`) return the driver's info log as the
/// error. `uniform_location` returns `None` for names the linked program
/// does not expose.
pub trait GraphicsContext {
    // Shaders and programs

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, String>;
    fn delete_shader(&mut self, shader: ShaderId);
    fn create_program(&mut self) -> ProgramId;
    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId);
    fn detach_shader(&mut self, program: ProgramId, shader: ShaderId);
    fn bind_attrib_location(&mut self, program: ProgramId, index: u32, name: &str);
    fn link_program(&mut self, program: ProgramId) -> Result<(), String>;
    fn delete_program(&mut self, program: ProgramId);
    fn use_program(&mut self, program: Option<ProgramId>);

    // Uniforms

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    fn uniform_1f(&mut self, location: UniformLocation, value: f32);
    fn uniform_1i(&mut self, location: UniformLocation, value: i32);
    fn uniform_2fv(&mut self, location: UniformLocation, value: [f32; 2]);
    fn uniform_3fv(&mut self, location: UniformLocation, value: [f32; 3]);
    fn uniform_4fv(&mut self, location: UniformLocation, value: [f32; 4]);
    /// Column-major, not transposed.
    fn uniform_matrix_3fv(&mut self, location: UniformLocation, value: &[f32; 9]);
    /// Column-major, not transposed.
    fn uniform_matrix_4fv(&mut self, location: UniformLocation, value: &[f32; 16]);

    // Buffers and vertex arrays

    fn create_buffer(&mut self) -> BufferId;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>);
    /// Uploads `data` with static-draw usage to the buffer bound at `target`.
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]);
    fn delete_buffer(&mut self, buffer: BufferId);
    fn create_vertex_array(&mut self) -> VertexArrayId;
    fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>);
    fn delete_vertex_array(&mut self, vao: VertexArrayId);
    fn enable_vertex_attrib_array(&mut self, location: u32);
    /// Describes tightly packed `f32` data (stride 0, offset 0) in the bound array buffer.
    fn vertex_attrib_pointer(&mut self, location: u32, components: u32, normalized: bool);

    // Textures

    fn create_texture(&mut self) -> TextureId;
    fn active_texture(&mut self, unit: u32);
    fn bind_texture(&mut self, texture: Option<TextureId>);
    fn tex_parameter(&mut self, parameter: TextureParameter);
    /// Uploads RGBA8 pixels to mip level 0 of the bound 2D texture.
    fn tex_image_2d(&mut self, width: u32, height: u32, rgba: &[u8]);
    fn generate_mipmap(&mut self);
    fn delete_texture(&mut self, texture: TextureId);

    // Drawing

    fn draw_arrays(&mut self, mode: DrawMode, first: u32, count: u32);
    /// Draws `count` unsigned 16-bit indices starting at byte `offset`.
    fn draw_elements(&mut self, mode: DrawMode, count: u32, offset: u32);

    // State

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32);
    fn clear_color(&mut self, rgba: [f32; 4]);
    fn clear(&mut self, color: bool, depth: bool);
    fn enable(&mut self, capability: Capability);
    fn disable(&mut self, capability: Capability);
    fn depth_func(&mut self, func: DepthFunc);
    fn front_face(&mut self, face: FrontFace);
    fn cull_face(&mut self, face: CullFace);
    fn polygon_offset(&mut self, factor: f32, units: f32);
}
