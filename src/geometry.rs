//! Vertex attribute and index data with explicit GPU realization.
//!
//! A [`Geometry`] is plain data until [`Geometry::ensure`] uploads it: one
//! vertex array, one `f32` buffer per attribute, and a `u16` index buffer
//! when indices are present. The resulting [`RenderInfo`] is cached, so later
//! `ensure` calls return it without touching the context. [`Geometry::invalidate`]
//! deletes the GL objects and drops the cache; the next `ensure` uploads again.
//!
//! ```
//! use phanto::geometry::Geometry;
//! use phanto::gl::{DrawMode, RecordingContext};
//!
//! let mut gl = RecordingContext::new();
//! let mut tri = Geometry::new(DrawMode::Triangles)
//!     .with_attribute(0, 3, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
//!
//! let info = tri.ensure(&mut gl);
//! assert_eq!(info.vertex_count, 3);
//! assert_eq!(info.index_count, 0);
//! ```

use log::warn;

use crate::gl::{BufferId, BufferTarget, DrawMode, GraphicsContext, VertexArrayId};

/// Handle to a geometry stored in a [`Scene`](crate::scene::Scene).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeometryId(pub(crate) usize);

/// One vertex attribute stream.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexAttribute {
    /// Shader input location the stream feeds.
    pub location: u32,
    /// Components per vertex (1 to 4).
    pub components: u32,
    pub data: Vec<f32>,
    pub normalize: bool,
}

/// What a draw call needs from a realized geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderInfo {
    pub vao: VertexArrayId,
    pub mode: DrawMode,
    /// Number of `u16` indices; zero for non-indexed geometry.
    pub index_count: u32,
    pub vertex_count: u32,
}

#[derive(Debug)]
struct GpuBuffers {
    info: RenderInfo,
    buffers: Vec<BufferId>,
}

/// Mesh data plus its cached GPU realization.
#[derive(Debug)]
pub struct Geometry {
    attributes: Vec<VertexAttribute>,
    indices: Option<Vec<u16>>,
    mode: DrawMode,
    gpu: Option<GpuBuffers>,
}

impl Geometry {
    pub fn new(mode: DrawMode) -> Self {
        Self {
            attributes: Vec::new(),
            indices: None,
            mode,
            gpu: None,
        }
    }

    /// Adds an attribute stream at `location`, not normalized.
    pub fn with_attribute(self, location: u32, components: u32, data: Vec<f32>) -> Self {
        self.add_attribute(VertexAttribute {
            location,
            components,
            data,
            normalize: false,
        })
    }

    pub fn add_attribute(mut self, attribute: VertexAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_indices(mut self, indices: Vec<u16>) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn indices(&self) -> Option<&[u16]> {
        self.indices.as_deref()
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Vertex count implied by the last attribute stream.
    pub fn vertex_count(&self) -> u32 {
        match self.attributes.last() {
            Some(attr) if attr.components > 0 => (attr.data.len() / attr.components as usize) as u32,
            _ => 0,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.as_ref().map_or(0, |i| i.len() as u32)
    }

    /// Whether GPU objects currently exist for this geometry.
    pub fn is_realized(&self) -> bool {
        self.gpu.is_some()
    }

    /// The cached render info, if realized.
    pub fn render_info(&self) -> Option<RenderInfo> {
        self.gpu.as_ref().map(|gpu| gpu.info)
    }

    /// Uploads the geometry on first call and returns its render info.
    pub fn ensure(&mut self, gl: &mut dyn GraphicsContext) -> RenderInfo {
        if let Some(gpu) = &self.gpu {
            return gpu.info;
        }

        let vao = gl.create_vertex_array();
        gl.bind_vertex_array(Some(vao));

        let mut buffers = Vec::with_capacity(self.attributes.len() + 1);
        for attr in &self.attributes {
            if attr.components == 0 || attr.data.len() % attr.components as usize != 0 {
                warn!(
                    "attribute at location {} has {} floats, not a multiple of {}",
                    attr.location,
                    attr.data.len(),
                    attr.components
                );
            }
            let buffer = gl.create_buffer();
            gl.bind_buffer(BufferTarget::Array, Some(buffer));
            gl.buffer_data(BufferTarget::Array, bytemuck::cast_slice(&attr.data));
            gl.enable_vertex_attrib_array(attr.location);
            gl.vertex_attrib_pointer(attr.location, attr.components, attr.normalize);
            gl.bind_buffer(BufferTarget::Array, None);
            buffers.push(buffer);
        }

        if let Some(indices) = &self.indices {
            let buffer = gl.create_buffer();
            gl.bind_buffer(BufferTarget::ElementArray, Some(buffer));
            gl.buffer_data(BufferTarget::ElementArray, bytemuck::cast_slice(indices));
            buffers.push(buffer);
        }

        gl.bind_vertex_array(None);

        let info = RenderInfo {
            vao,
            mode: self.mode,
            index_count: self.index_count(),
            vertex_count: self.vertex_count(),
        };
        self.gpu = Some(GpuBuffers { info, buffers });
        info
    }

    /// Deletes the GPU objects, if any. The data stays and can be realized again.
    pub fn invalidate(&mut self, gl: &mut dyn GraphicsContext) {
        if let Some(gpu) = self.gpu.take() {
            for buffer in gpu.buffers {
                gl.delete_buffer(buffer);
            }
            gl.delete_vertex_array(gpu.info.vao);
        }
    }
}
