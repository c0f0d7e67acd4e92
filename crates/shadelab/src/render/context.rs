//! The graphics context and shader program traits.
//!
//! Both are deliberately GL-shaped: handles are plain integers, state is
//! bound before it is used, and creation can fail (`None`, like a WebGL
//! `createBuffer` returning `null`). Data operations report misuse through
//! [`ContextError`] instead of a global error flag.

use glam::{Mat4, Vec4};

use crate::error::ContextError;
use crate::layout::VertexAttribute;

/// Handle to a buffer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// Handle to a vertex array object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexArrayId(pub u32);

/// Binding point for [`GraphicsContext::bind_buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Triangle indices. Bound into the current vertex array.
    ElementArray,
}

/// Usage hint for [`GraphicsContext::buffer_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferUsage {
    #[default]
    StaticDraw,
    DynamicDraw,
}

/// Initial contents for [`GraphicsContext::buffer_data`].
#[derive(Debug, Clone, Copy)]
pub enum BufferSource<'a> {
    /// Allocate `n` zeroed bytes, to be filled with `buffer_sub_data`.
    Size(usize),
    /// Allocate and fill in one go.
    Data(&'a [u8]),
}

impl BufferSource<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Size(n) => *n,
            Self::Data(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The slice of a WebGL2-style context that meshes need.
pub trait GraphicsContext {
    /// Create a buffer object. `None` if the context cannot.
    fn create_buffer(&mut self) -> Option<BufferId>;

    /// Create a vertex array object. `None` if the context cannot.
    fn create_vertex_array(&mut self) -> Option<VertexArrayId>;

    fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>) -> Result<(), ContextError>;

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) -> Result<(), ContextError>;

    /// (Re)allocate the buffer bound to `target`.
    fn buffer_data(
        &mut self,
        target: BufferTarget,
        source: BufferSource<'_>,
        usage: BufferUsage,
    ) -> Result<(), ContextError>;

    /// Overwrite `data.len()` bytes of the bound buffer starting at `offset`.
    fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) -> Result<(), ContextError>;

    /// Point an attribute of the bound vertex array at the bound array buffer.
    fn vertex_attrib_pointer(&mut self, attribute: &VertexAttribute) -> Result<(), ContextError>;

    fn enable_vertex_attrib_array(&mut self, location: u32) -> Result<(), ContextError>;

    /// Draw `count` `u32` indices as a triangle list, starting `offset` bytes
    /// into the bound element buffer.
    fn draw_elements(&mut self, count: u32, offset: usize) -> Result<(), ContextError>;

    /// Clear the color (and depth) of the whole framebuffer.
    fn clear(&mut self, color: [f32; 4]);

    fn delete_buffer(&mut self, buffer: BufferId);

    fn delete_vertex_array(&mut self, vao: VertexArrayId);
}

/// A linked shader program with named uniforms.
pub trait ShaderProgram {
    /// Make this the current program.
    fn use_program(&mut self);

    fn set_mat4(&mut self, name: &str, value: &Mat4);

    fn set_vec4(&mut self, name: &str, value: Vec4);

    fn set_float(&mut self, name: &str, value: f32);
}
