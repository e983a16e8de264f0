//! Headless [`GraphicsContext`] that records every call.

use std::collections::{HashMap, HashSet};

use super::{
    BufferId, BufferTarget, Capability, CullFace, DepthFunc, DrawMode, FrontFace,
    GraphicsContext, ProgramId, ShaderId, ShaderStage, TextureId, TextureParameter,
    UniformLocation, VertexArrayId,
};

/// A uniform upload as it reached the context.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedUniform {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

/// One recorded context call.
#[derive(Clone, Debug, PartialEq)]
pub enum GlCall {
    CompileShader { stage: ShaderStage, shader: ShaderId },
    DeleteShader(ShaderId),
    CreateProgram(ProgramId),
    AttachShader { program: ProgramId, shader: ShaderId },
    DetachShader { program: ProgramId, shader: ShaderId },
    BindAttribLocation { program: ProgramId, index: u32, name: String },
    LinkProgram(ProgramId),
    DeleteProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    /// Upload to a location; `name` is the string the location was looked up with.
    Uniform { name: String, value: RecordedUniform },
    CreateBuffer(BufferId),
    BindBuffer { target: BufferTarget, buffer: Option<BufferId> },
    BufferData { target: BufferTarget, bytes: usize },
    DeleteBuffer(BufferId),
    CreateVertexArray(VertexArrayId),
    BindVertexArray(Option<VertexArrayId>),
    DeleteVertexArray(VertexArrayId),
    EnableVertexAttribArray(u32),
    VertexAttribPointer { location: u32, components: u32, normalized: bool },
    CreateTexture(TextureId),
    ActiveTexture(u32),
    BindTexture(Option<TextureId>),
    TexParameter(TextureParameter),
    TexImage2d { width: u32, height: u32 },
    GenerateMipmap,
    DeleteTexture(TextureId),
    DrawArrays { mode: DrawMode, first: u32, count: u32 },
    DrawElements { mode: DrawMode, count: u32, offset: u32 },
    Viewport { x: i32, y: i32, width: u32, height: u32 },
    ClearColor([f32; 4]),
    Clear { color: bool, depth: bool },
    Enable(Capability),
    Disable(Capability),
    DepthFunc(DepthFunc),
    FrontFace(FrontFace),
    CullFace(CullFace),
    PolygonOffset { factor: f32, units: f32 },
}

#[derive(Default)]
struct ProgramRecord {
    attached: Vec<ShaderId>,
    /// Declared uniform base names and their array counts, filled at link.
    uniforms: HashMap<String, Option<usize>>,
    locations: HashMap<String, UniformLocation>,
}

/// A [`GraphicsContext`] with no GPU behind it.
///
/// Every call is appended to a log that tests inspect with [`calls`](Self::calls)
/// and the query helpers. Linking parses the attached sources for
/// `uniform <type> <name>[<count>];` lines, so `uniform_location` answers the
/// way a driver would for the generated GLSL: base names, `name.field`, and
/// `name[i]` / `name[i].field` with `i` below the declared count.
///
/// Compile and link failures can be injected to exercise error paths.
#[derive(Default)]
pub struct RecordingContext {
    calls: Vec<GlCall>,
    next_handle: u32,
    shaders: HashMap<ShaderId, String>,
    programs: HashMap<ProgramId, ProgramRecord>,
    location_names: HashMap<UniformLocation, String>,
    buffers: HashSet<BufferId>,
    vertex_arrays: HashSet<VertexArrayId>,
    textures: HashSet<TextureId>,
    compile_failure: Option<(ShaderStage, String)>,
    link_failure: Option<String>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every compile of `stage` fail with `log` until [`clear_failures`](Self::clear_failures).
    pub fn fail_compile(&mut self, stage: ShaderStage, log: impl Into<String>) {
        self.compile_failure = Some((stage, log.into()));
    }

    /// Makes every link fail with `log` until [`clear_failures`](Self::clear_failures).
    pub fn fail_link(&mut self, log: impl Into<String>) {
        self.link_failure = Some(log.into());
    }

    pub fn clear_failures(&mut self) {
        self.compile_failure = None;
        self.link_failure = None;
    }

    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Drops the call log, keeping all object state.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of `draw_arrays` and `draw_elements` calls.
    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, GlCall::DrawArrays { .. } | GlCall::DrawElements { .. }))
            .count()
    }

    /// Every value uploaded to the uniform looked up as `name`, in call order.
    pub fn uniform_values(&self, name: &str) -> Vec<&RecordedUniform> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GlCall::Uniform { name: n, value } if n == name => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Whether any upload went to a uniform whose name starts with `prefix`.
    pub fn uploaded_with_prefix(&self, prefix: &str) -> bool {
        self.calls
            .iter()
            .any(|c| matches!(c, GlCall::Uniform { name, .. } if name.starts_with(prefix)))
    }

    /// Count of calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.vertex_arrays.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    fn next_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn upload(&mut self, location: UniformLocation, value: RecordedUniform) {
        let name = self
            .location_names
            .get(&location)
            .cloned()
            .unwrap_or_else(|| format!("#{}", location.0));
        self.calls.push(GlCall::Uniform { name, value });
    }
}

/// Parses `uniform <type> <name>;` and `uniform <type> <name>[<count>];` lines.
fn declared_uniforms(source: &str) -> impl Iterator<Item = (String, Option<usize>)> + '_ {
    source.lines().filter_map(|line| {
        let decl = line.trim().strip_prefix("uniform ")?.trim_end_matches(';');
        let mut parts = decl.split_whitespace();
        let _ty = parts.next()?;
        let name = parts.next()?;
        match name.split_once('[') {
            Some((base, count)) => {
                Some((base.to_string(), count.trim_end_matches(']').parse().ok()))
            }
            None => Some((name.to_string(), None)),
        }
    })
}

/// Whether `name` addresses a slot of the declared uniforms.
fn resolves(uniforms: &HashMap<String, Option<usize>>, name: &str) -> bool {
    let end = name.find(|c: char| c == '.' || c == '[').unwrap_or(name.len());
    let (base, rest) = name.split_at(end);
    let Some(count) = uniforms.get(base) else {
        return false;
    };
    match rest.strip_prefix('[') {
        Some(indexed) => {
            let Some((index, _)) = indexed.split_once(']') else {
                return false;
            };
            matches!((index.parse::<usize>(), count), (Ok(i), Some(c)) if i < *c)
        }
        None => true,
    }
}

impl GraphicsContext for RecordingContext {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, String> {
        if let Some((failing, log)) = &self.compile_failure {
            if *failing == stage {
                return Err(log.clone());
            }
        }
        let shader = ShaderId(self.next_handle());
        self.shaders.insert(shader, source.to_string());
        self.calls.push(GlCall::CompileShader { stage, shader });
        Ok(shader)
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
        self.calls.push(GlCall::DeleteShader(shader));
    }

    fn create_program(&mut self) -> ProgramId {
        let program = ProgramId(self.next_handle());
        self.programs.insert(program, ProgramRecord::default());
        self.calls.push(GlCall::CreateProgram(program));
        program
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        if let Some(record) = self.programs.get_mut(&program) {
            record.attached.push(shader);
        }
        self.calls.push(GlCall::AttachShader { program, shader });
    }

    fn detach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        if let Some(record) = self.programs.get_mut(&program) {
            record.attached.retain(|s| *s != shader);
        }
        self.calls.push(GlCall::DetachShader { program, shader });
    }

    fn bind_attrib_location(&mut self, program: ProgramId, index: u32, name: &str) {
        self.calls.push(GlCall::BindAttribLocation {
            program,
            index,
            name: name.to_string(),
        });
    }

    fn link_program(&mut self, program: ProgramId) -> Result<(), String> {
        self.calls.push(GlCall::LinkProgram(program));
        if let Some(log) = &self.link_failure {
            return Err(log.clone());
        }
        let Some(record) = self.programs.get_mut(&program) else {
            return Err(format!("program {} does not exist", program.0));
        };
        record.uniforms.clear();
        for shader in &record.attached {
            if let Some(source) = self.shaders.get(shader) {
                record.uniforms.extend(declared_uniforms(source));
            }
        }
        Ok(())
    }

    fn delete_program(&mut self, program: ProgramId) {
        if let Some(record) = self.programs.remove(&program) {
            for location in record.locations.values() {
                self.location_names.remove(location);
            }
        }
        self.calls.push(GlCall::DeleteProgram(program));
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.calls.push(GlCall::UseProgram(program));
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let next = self.next_handle + 1;
        let record = self.programs.get_mut(&program)?;
        if !resolves(&record.uniforms, name) {
            return None;
        }
        if let Some(location) = record.locations.get(name) {
            return Some(*location);
        }
        let location = UniformLocation(next);
        record.locations.insert(name.to_string(), location);
        self.next_handle = next;
        self.location_names.insert(location, name.to_string());
        Some(location)
    }

    fn uniform_1f(&mut self, location: UniformLocation, value: f32) {
        self.upload(location, RecordedUniform::Float(value));
    }

    fn uniform_1i(&mut self, location: UniformLocation, value: i32) {
        self.upload(location, RecordedUniform::Int(value));
    }

    fn uniform_2fv(&mut self, location: UniformLocation, value: [f32; 2]) {
        self.upload(location, RecordedUniform::Vec2(value));
    }

    fn uniform_3fv(&mut self, location: UniformLocation, value: [f32; 3]) {
        self.upload(location, RecordedUniform::Vec3(value));
    }

    fn uniform_4fv(&mut self, location: UniformLocation, value: [f32; 4]) {
        self.upload(location, RecordedUniform::Vec4(value));
    }

    fn uniform_matrix_3fv(&mut self, location: UniformLocation, value: &[f32; 9]) {
        self.upload(location, RecordedUniform::Mat3(*value));
    }

    fn uniform_matrix_4fv(&mut self, location: UniformLocation, value: &[f32; 16]) {
        self.upload(location, RecordedUniform::Mat4(*value));
    }

    fn create_buffer(&mut self) -> BufferId {
        let buffer = BufferId(self.next_handle());
        self.buffers.insert(buffer);
        self.calls.push(GlCall::CreateBuffer(buffer));
        buffer
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        self.calls.push(GlCall::BindBuffer { target, buffer });
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        self.calls.push(GlCall::BufferData {
            target,
            bytes: data.len(),
        });
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
        self.calls.push(GlCall::DeleteBuffer(buffer));
    }

    fn create_vertex_array(&mut self) -> VertexArrayId {
        let vao = VertexArrayId(self.next_handle());
        self.vertex_arrays.insert(vao);
        self.calls.push(GlCall::CreateVertexArray(vao));
        vao
    }

    fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>) {
        self.calls.push(GlCall::BindVertexArray(vao));
    }

    fn delete_vertex_array(&mut self, vao: VertexArrayId) {
        self.vertex_arrays.remove(&vao);
        self.calls.push(GlCall::DeleteVertexArray(vao));
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        self.calls.push(GlCall::EnableVertexAttribArray(location));
    }

    fn vertex_attrib_pointer(&mut self, location: u32, components: u32, normalized: bool) {
        self.calls.push(GlCall::VertexAttribPointer {
            location,
            components,
            normalized,
        });
    }

    fn create_texture(&mut self) -> TextureId {
        let texture = TextureId(self.next_handle());
        self.textures.insert(texture);
        self.calls.push(GlCall::CreateTexture(texture));
        texture
    }

    fn active_texture(&mut self, unit: u32) {
        self.calls.push(GlCall::ActiveTexture(unit));
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.calls.push(GlCall::BindTexture(texture));
    }

    fn tex_parameter(&mut self, parameter: TextureParameter) {
        self.calls.push(GlCall::TexParameter(parameter));
    }

    fn tex_image_2d(&mut self, width: u32, height: u32, _rgba: &[u8]) {
        self.calls.push(GlCall::TexImage2d { width, height });
    }

    fn generate_mipmap(&mut self) {
        self.calls.push(GlCall::GenerateMipmap);
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        self.calls.push(GlCall::DeleteTexture(texture));
    }

    fn draw_arrays(&mut self, mode: DrawMode, first: u32, count: u32) {
        self.calls.push(GlCall::DrawArrays { mode, first, count });
    }

    fn draw_elements(&mut self, mode: DrawMode, count: u32, offset: u32) {
        self.calls.push(GlCall::DrawElements {
            mode,
            count,
            offset,
        });
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.calls.push(GlCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear_color(&mut self, rgba: [f32; 4]) {
        self.calls.push(GlCall::ClearColor(rgba));
    }

    fn clear(&mut self, color: bool, depth: bool) {
        self.calls.push(GlCall::Clear { color, depth });
    }

    fn enable(&mut self, capability: Capability) {
        self.calls.push(GlCall::Enable(capability));
    }

    fn disable(&mut self, capability: Capability) {
        self.calls.push(GlCall::Disable(capability));
    }

    fn depth_func(&mut self, func: DepthFunc) {
        self.calls.push(GlCall::DepthFunc(func));
    }

    fn front_face(&mut self, face: FrontFace) {
        self.calls.push(GlCall::FrontFace(face));
    }

    fn cull_face(&mut self, face: CullFace) {
        self.calls.push(GlCall::CullFace(face));
    }

    fn polygon_offset(&mut self, factor: f32, units: f32) {
        self.calls.push(GlCall::PolygonOffset { factor, units });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "#version 300 es\n\
        precision mediump float;\n\
        struct d_light {\n  vec3 direction;\n  vec3 color;\n};\n\
        uniform mat4 u_model;\n\
        uniform d_light u_d_lights[5];\n\
        void main() {}\n";

    const FRAGMENT: &str = "#version 300 es\n\
        precision mediump float;\n\
        uniform vec4 u_color;\n\
        out vec4 final_color;\n";

    fn linked(gl: &mut RecordingContext) -> ProgramId {
        let vs = gl.compile_shader(ShaderStage::Vertex, VERTEX).unwrap();
        let fs = gl.compile_shader(ShaderStage::Fragment, FRAGMENT).unwrap();
        let program = gl.create_program();
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program).unwrap();
        program
    }

    #[test]
    fn locations_follow_declarations() {
        let mut gl = RecordingContext::new();
        let program = linked(&mut gl);

        assert!(gl.uniform_location(program, "u_model").is_some());
        assert!(gl.uniform_location(program, "u_color").is_some());
        assert!(gl.uniform_location(program, "u_d_lights[0].direction").is_some());
        assert!(gl.uniform_location(program, "u_d_lights[4].color").is_some());
        assert!(gl.uniform_location(program, "u_d_lights[5].color").is_none());
        assert!(gl.uniform_location(program, "u_view").is_none());
        assert!(gl.uniform_location(program, "u_model[0]").is_none());
    }

    #[test]
    fn repeated_lookup_returns_the_same_location() {
        let mut gl = RecordingContext::new();
        let program = linked(&mut gl);
        let a = gl.uniform_location(program, "u_color");
        let b = gl.uniform_location(program, "u_color");
        assert_eq!(a, b);
    }

    #[test]
    fn uploads_are_recorded_by_name() {
        let mut gl = RecordingContext::new();
        let program = linked(&mut gl);
        let loc = gl.uniform_location(program, "u_color").unwrap();
        gl.uniform_4fv(loc, [1.0, 0.0, 0.0, 1.0]);

        assert_eq!(
            gl.uniform_values("u_color"),
            vec![&RecordedUniform::Vec4([1.0, 0.0, 0.0, 1.0])]
        );
        assert!(gl.uploaded_with_prefix("u_col"));
        assert!(!gl.uploaded_with_prefix("u_d_lights"));
    }

    #[test]
    fn injected_failures_surface_logs() {
        let mut gl = RecordingContext::new();
        gl.fail_compile(ShaderStage::Fragment, "0:1: syntax error");
        assert!(gl.compile_shader(ShaderStage::Vertex, VERTEX).is_ok());
        assert_eq!(
            gl.compile_shader(ShaderStage::Fragment, FRAGMENT),
            Err("0:1: syntax error".to_string())
        );

        gl.clear_failures();
        gl.fail_link("missing main");
        let program = gl.create_program();
        assert_eq!(gl.link_program(program), Err("missing main".to_string()));
    }

    #[test]
    fn deleted_objects_are_no_longer_live() {
        let mut gl = RecordingContext::new();
        let program = linked(&mut gl);
        let buffer = gl.create_buffer();
        let vao = gl.create_vertex_array();
        assert_eq!((gl.live_programs(), gl.live_buffers(), gl.live_vertex_arrays()), (1, 1, 1));

        gl.delete_program(program);
        gl.delete_buffer(buffer);
        gl.delete_vertex_array(vao);
        assert_eq!((gl.live_programs(), gl.live_buffers(), gl.live_vertex_arrays()), (0, 0, 0));
    }

    #[test]
    fn draw_count_covers_both_draw_kinds() {
        let mut gl = RecordingContext::new();
        gl.draw_arrays(DrawMode::Triangles, 0, 3);
        gl.draw_elements(DrawMode::Lines, 6, 0);
        gl.clear(true, true);
        assert_eq!(gl.draw_count(), 2);
    }
}
