//! # Headless: In-Memory Graphics Context
//!
//! [`HeadlessContext`] implements [`GraphicsContext`] without a GPU. Buffers
//! are byte vectors, vertex arrays remember their attribute pointers and
//! element buffer, and every draw, clear and partial upload is logged. This
//! makes the whole mesh lifecycle observable from tests and from demos that
//! run without a window.
//!
//! It is strict where real drivers are lenient: writing past the end of a
//! buffer, drawing more indices than the element buffer holds, or binding a
//! deleted handle all return a [`ContextError`].
//!
//! `with_creation_limit(n)` makes the context refuse object creation after
//! `n` successful creations, which is how acquisition failures are tested.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use glam::{Mat4, Vec4};

use super::context::{
    BufferId, BufferSource, BufferTarget, BufferUsage, GraphicsContext, ShaderProgram, VertexArrayId,
};
use crate::error::ContextError;
use crate::layout::VertexAttribute;

/// An attribute pointer as captured by a vertex array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBinding {
    pub attribute: VertexAttribute,
    pub buffer: BufferId,
}

#[derive(Debug, Default)]
struct VertexArrayState {
    attributes: BTreeMap<u32, AttributeBinding>,
    enabled: BTreeSet<u32>,
    element_buffer: Option<BufferId>,
}

#[derive(Debug)]
struct BufferState {
    data: Vec<u8>,
    usage: BufferUsage,
}

/// One `draw_elements` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub vao: VertexArrayId,
    pub count: u32,
    pub offset: usize,
}

/// One `buffer_sub_data` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubUpload {
    pub buffer: BufferId,
    pub offset: usize,
    pub len: usize,
}

/// A [`GraphicsContext`] backed by plain memory.
#[derive(Debug, Default)]
pub struct HeadlessContext {
    next_id: u32,
    creations_left: Option<usize>,
    buffers: HashMap<BufferId, BufferState>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayState>,
    bound_array: Option<BufferId>,
    bound_vao: Option<VertexArrayId>,
    draws: Vec<DrawCall>,
    clears: Vec<[f32; 4]>,
    sub_uploads: Vec<SubUpload>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow only `n` more object creations; later ones return `None`.
    pub fn with_creation_limit(mut self, n: usize) -> Self {
        self.creations_left = Some(n);
        self
    }

    fn next_handle(&mut self) -> Option<u32> {
        if let Some(left) = &mut self.creations_left {
            if *left == 0 {
                return None;
            }
            *left -= 1;
        }
        self.next_id += 1;
        Some(self.next_id)
    }

    fn bound_vao_state(&mut self) -> Result<&mut VertexArrayState, ContextError> {
        let vao = self.bound_vao.ok_or(ContextError::NoVertexArrayBound)?;
        self.vertex_arrays
            .get_mut(&vao)
            .ok_or(ContextError::UnknownVertexArray(vao.0))
    }

    fn bound(&self, target: BufferTarget) -> Option<BufferId> {
        match target {
            BufferTarget::Array => self.bound_array,
            BufferTarget::ElementArray => self
                .bound_vao
                .and_then(|vao| self.vertex_arrays.get(&vao))
                .and_then(|state| state.element_buffer),
        }
    }

    fn bound_buffer_mut(&mut self, target: BufferTarget) -> Result<&mut BufferState, ContextError> {
        let id = self.bound(target).ok_or(ContextError::NoBufferBound(target))?;
        self.buffers.get_mut(&id).ok_or(ContextError::UnknownBuffer(id.0))
    }

    // ── Inspection ─────────────────────────────────────────────────────

    /// Contents of a live buffer.
    pub fn buffer(&self, id: BufferId) -> Option<&[u8]> {
        self.buffers.get(&id).map(|b| b.data.as_slice())
    }

    pub fn buffer_usage(&self, id: BufferId) -> Option<BufferUsage> {
        self.buffers.get(&id).map(|b| b.usage)
    }

    /// Reinterpret a byte range of a live buffer as native-endian `f32`s.
    pub fn read_f32s(&self, id: BufferId, range: std::ops::Range<usize>) -> Option<Vec<f32>> {
        let bytes = self.buffer(id)?.get(range)?;
        Some(
            bytes
                .chunks_exact(4)
                .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        )
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.vertex_arrays.len()
    }

    /// Attribute pointer recorded in `vao` for `location`.
    pub fn attribute(&self, vao: VertexArrayId, location: u32) -> Option<AttributeBinding> {
        self.vertex_arrays.get(&vao)?.attributes.get(&location).copied()
    }

    pub fn is_attribute_enabled(&self, vao: VertexArrayId, location: u32) -> bool {
        self.vertex_arrays
            .get(&vao)
            .is_some_and(|state| state.enabled.contains(&location))
    }

    pub fn element_buffer(&self, vao: VertexArrayId) -> Option<BufferId> {
        self.vertex_arrays.get(&vao)?.element_buffer
    }

    pub fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.bound_vao
    }

    pub fn bound_array_buffer(&self) -> Option<BufferId> {
        self.bound_array
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn clears(&self) -> &[[f32; 4]] {
        &self.clears
    }

    pub fn sub_uploads(&self) -> &[SubUpload] {
        &self.sub_uploads
    }

    /// Forget logged draws, clears and uploads. Resources are kept.
    pub fn clear_log(&mut self) {
        self.draws.clear();
        self.clears.clear();
        self.sub_uploads.clear();
    }
}

impl GraphicsContext for HeadlessContext {
    fn create_buffer(&mut self) -> Option<BufferId> {
        let id = BufferId(self.next_handle()?);
        self.buffers.insert(
            id,
            BufferState {
                data: Vec::new(),
                usage: BufferUsage::default(),
            },
        );
        Some(id)
    }

    fn create_vertex_array(&mut self) -> Option<VertexArrayId> {
        let id = VertexArrayId(self.next_handle()?);
        self.vertex_arrays.insert(id, VertexArrayState::default());
        Some(id)
    }

    fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>) -> Result<(), ContextError> {
        if let Some(vao) = vao {
            if !self.vertex_arrays.contains_key(&vao) {
                return Err(ContextError::UnknownVertexArray(vao.0));
            }
        }
        self.bound_vao = vao;
        Ok(())
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) -> Result<(), ContextError> {
        if let Some(id) = buffer {
            if !self.buffers.contains_key(&id) {
                return Err(ContextError::UnknownBuffer(id.0));
            }
        }
        match target {
            BufferTarget::Array => self.bound_array = buffer,
            BufferTarget::ElementArray => self.bound_vao_state()?.element_buffer = buffer,
        }
        Ok(())
    }

    fn buffer_data(
        &mut self,
        target: BufferTarget,
        source: BufferSource<'_>,
        usage: BufferUsage,
    ) -> Result<(), ContextError> {
        let buffer = self.bound_buffer_mut(target)?;
        buffer.data = match source {
            BufferSource::Size(n) => vec![0; n],
            BufferSource::Data(bytes) => bytes.to_vec(),
        };
        buffer.usage = usage;
        Ok(())
    }

    fn buffer_sub_data(&mut self, target: BufferTarget, offset: usize, data: &[u8]) -> Result<(), ContextError> {
        let id = self.bound(target).ok_or(ContextError::NoBufferBound(target))?;
        let buffer = self.bound_buffer_mut(target)?;
        let size = buffer.data.len();
        let end = offset
            .checked_add(data.len())
            .filter(|end| *end <= size)
            .ok_or(ContextError::OutOfBounds { offset, len: data.len(), size })?;
        buffer.data[offset..end].copy_from_slice(data);
        self.sub_uploads.push(SubUpload { buffer: id, offset, len: data.len() });
        Ok(())
    }

    fn vertex_attrib_pointer(&mut self, attribute: &VertexAttribute) -> Result<(), ContextError> {
        let buffer = self
            .bound_array
            .ok_or(ContextError::NoBufferBound(BufferTarget::Array))?;
        self.bound_vao_state()?.attributes.insert(
            attribute.location,
            AttributeBinding {
                attribute: *attribute,
                buffer,
            },
        );
        Ok(())
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) -> Result<(), ContextError> {
        self.bound_vao_state()?.enabled.insert(location);
        Ok(())
    }

    fn draw_elements(&mut self, count: u32, offset: usize) -> Result<(), ContextError> {
        let vao = self.bound_vao.ok_or(ContextError::NoVertexArrayBound)?;
        let elements = self
            .vertex_arrays
            .get(&vao)
            .ok_or(ContextError::UnknownVertexArray(vao.0))?
            .element_buffer
            .ok_or(ContextError::NoElementBuffer)?;
        let size = self
            .buffers
            .get(&elements)
            .ok_or(ContextError::UnknownBuffer(elements.0))?
            .data
            .len();

        let needed = offset + count as usize * size_of::<u32>();
        if needed > size {
            return Err(ContextError::DrawOutOfRange {
                count,
                available: size.saturating_sub(offset) / size_of::<u32>(),
            });
        }

        self.draws.push(DrawCall { vao, count, offset });
        Ok(())
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.clears.push(color);
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if self.buffers.remove(&buffer).is_none() {
            log::warn!("delete of unknown buffer {}", buffer.0);
        }
        if self.bound_array == Some(buffer) {
            self.bound_array = None;
        }
    }

    fn delete_vertex_array(&mut self, vao: VertexArrayId) {
        if self.vertex_arrays.remove(&vao).is_none() {
            log::warn!("delete of unknown vertex array {}", vao.0);
        }
        if self.bound_vao == Some(vao) {
            self.bound_vao = None;
        }
    }
}

/// The last value written to a uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec4(Vec4),
    Float(f32),
}

/// A [`ShaderProgram`] that remembers its uniforms.
#[derive(Debug, Default)]
pub struct RecordingShader {
    uniforms: HashMap<String, UniformValue>,
    uses: usize,
}

impl RecordingShader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }

    pub fn mat4(&self, name: &str) -> Option<Mat4> {
        match self.uniform(name)? {
            UniformValue::Mat4(m) => Some(m),
            _ => None,
        }
    }

    /// How many times the program was made current.
    pub fn uses(&self) -> usize {
        self.uses
    }
}

impl ShaderProgram for RecordingShader {
    fn use_program(&mut self) {
        self.uses += 1;
    }

    fn set_mat4(&mut self, name: &str, value: &Mat4) {
        self.uniforms.insert(name.to_owned(), UniformValue::Mat4(*value));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.uniforms.insert(name.to_owned(), UniformValue::Vec4(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.uniforms.insert(name.to_owned(), UniformValue::Float(value));
    }
}
