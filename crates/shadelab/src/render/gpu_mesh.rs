//! # GpuMesh: Uploaded Mesh with Explicit Lifetime
//!
//! A [`GpuMesh`] owns a CPU [`Mesh`] together with the three context objects
//! that hold its uploaded copy: a vertex array, a section-packed vertex
//! buffer and an element buffer.
//!
//! ## Lifetime
//!
//! Graphics contexts do not reclaim objects on their own, and a `GpuMesh`
//! cannot reach its context from `Drop`. Release is therefore explicit:
//!
//! - [`GpuMesh::dispose`] deletes the objects and hands back the CPU mesh.
//! - [`ScopedMesh`] borrows the context for its whole lifetime and disposes
//!   in its own `Drop`, so early returns, `?` and panics all release.
//!
//! Dropping an undisposed `GpuMesh` logs a leak warning.
//!
//! ## Normal Switching
//!
//! [`GpuMesh::set_normal_mode`] flips the mesh's selector and rewrites only
//! the normal section of the vertex buffer. Positions, colors and texture
//! coordinates are uploaded once, in [`GpuMesh::upload`].

use std::ops::{Deref, DerefMut};

use super::context::{
    BufferId, BufferSource, BufferTarget, BufferUsage, GraphicsContext, ShaderProgram, VertexArrayId,
};
use crate::error::MeshError;
use crate::layout::SectionLayout;
use crate::mesh::{Mesh, NormalMode};

/// A mesh whose data lives in a graphics context.
#[derive(Debug)]
pub struct GpuMesh {
    mesh: Mesh,
    layout: SectionLayout,
    vao: VertexArrayId,
    vbo: BufferId,
    ebo: BufferId,
    index_count: u32,
    disposed: bool,
}

/// Create the three objects a mesh needs, releasing any already created if
/// a later one fails.
fn acquire<C: GraphicsContext>(ctx: &mut C) -> Result<(VertexArrayId, BufferId, BufferId), MeshError> {
    let vao = ctx
        .create_vertex_array()
        .ok_or(MeshError::ResourceAcquisition { resource: "vertex array" })?;

    let Some(vbo) = ctx.create_buffer() else {
        ctx.delete_vertex_array(vao);
        return Err(MeshError::ResourceAcquisition { resource: "vertex buffer" });
    };

    let Some(ebo) = ctx.create_buffer() else {
        ctx.delete_buffer(vbo);
        ctx.delete_vertex_array(vao);
        return Err(MeshError::ResourceAcquisition { resource: "index buffer" });
    };

    Ok((vao, vbo, ebo))
}

impl GpuMesh {
    /// Create the context objects for `mesh` and upload every stream.
    ///
    /// On failure nothing is left behind in the context.
    pub fn upload<C: GraphicsContext>(ctx: &mut C, mesh: Mesh) -> Result<Self, MeshError> {
        let (vao, vbo, ebo) = acquire(ctx)?;
        let layout = SectionLayout::for_mesh(&mesh);

        let gpu = Self {
            index_count: mesh.indices().len() as u32,
            mesh,
            layout,
            vao,
            vbo,
            ebo,
            disposed: false,
        };

        match gpu.write_all(ctx) {
            Ok(()) => {
                log::debug!(
                    "uploaded mesh: {} bytes vertex data, {} indices",
                    gpu.layout.total_bytes(),
                    gpu.index_count
                );
                Ok(gpu)
            }
            Err(e) => {
                let _ = gpu.dispose(ctx);
                Err(e)
            }
        }
    }

    fn write_all<C: GraphicsContext>(&self, ctx: &mut C) -> Result<(), MeshError> {
        let mesh = &self.mesh;
        let layout = &self.layout;

        ctx.bind_vertex_array(Some(self.vao))?;
        ctx.bind_buffer(BufferTarget::Array, Some(self.vbo))?;
        ctx.buffer_data(
            BufferTarget::Array,
            BufferSource::Size(layout.total_bytes()),
            BufferUsage::StaticDraw,
        )?;
        ctx.buffer_sub_data(BufferTarget::Array, layout.positions.start, bytemuck::cast_slice(mesh.positions()))?;
        ctx.buffer_sub_data(BufferTarget::Array, layout.normals.start, bytemuck::cast_slice(mesh.active_normals()))?;
        ctx.buffer_sub_data(BufferTarget::Array, layout.colors.start, bytemuck::cast_slice(mesh.colors()))?;
        if let (Some(range), Some(tc)) = (&layout.tex_coords, mesh.tex_coords()) {
            ctx.buffer_sub_data(BufferTarget::Array, range.start, bytemuck::cast_slice(tc))?;
        }

        ctx.bind_buffer(BufferTarget::ElementArray, Some(self.ebo))?;
        ctx.buffer_data(
            BufferTarget::ElementArray,
            BufferSource::Data(bytemuck::cast_slice(mesh.indices())),
            BufferUsage::StaticDraw,
        )?;

        for attribute in layout.attributes() {
            ctx.vertex_attrib_pointer(&attribute)?;
            ctx.enable_vertex_attrib_array(attribute.location)?;
        }

        ctx.bind_vertex_array(None)?;
        ctx.bind_buffer(BufferTarget::Array, None)?;
        Ok(())
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn layout(&self) -> &SectionLayout {
        &self.layout
    }

    pub fn vertex_array(&self) -> VertexArrayId {
        self.vao
    }

    pub fn vertex_buffer(&self) -> BufferId {
        self.vbo
    }

    pub fn index_buffer(&self) -> BufferId {
        self.ebo
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn normal_mode(&self) -> NormalMode {
        self.mesh.normal_mode()
    }

    /// Select a normal stream and re-upload just the normal section.
    /// Does nothing if `mode` is already active.
    ///
    /// The selector only changes once the upload succeeded, so on error the
    /// mesh still reports the mode whose normals are in the buffer.
    pub fn set_normal_mode<C: GraphicsContext>(&mut self, ctx: &mut C, mode: NormalMode) -> Result<(), MeshError> {
        if self.mesh.normal_mode() == mode {
            return Ok(());
        }
        self.write_normals(ctx, self.mesh.normals(mode))?;
        self.mesh.set_normal_mode(mode);
        log::debug!("switched to {mode:?} normals");
        Ok(())
    }

    /// Rewrite the normal section from the mesh's active stream.
    pub fn update_normals<C: GraphicsContext>(&self, ctx: &mut C) -> Result<(), MeshError> {
        self.write_normals(ctx, self.mesh.active_normals())
    }

    /// Write `normals` into the normal section. The vertex array and array
    /// buffer are unbound afterwards whether or not the write succeeded.
    fn write_normals<C: GraphicsContext>(&self, ctx: &mut C, normals: &[[f32; 3]]) -> Result<(), MeshError> {
        let written = self.bind_and_write_normals(ctx, normals);
        let unbound = ctx
            .bind_buffer(BufferTarget::Array, None)
            .and(ctx.bind_vertex_array(None));
        written?;
        unbound?;
        Ok(())
    }

    fn bind_and_write_normals<C: GraphicsContext>(&self, ctx: &mut C, normals: &[[f32; 3]]) -> Result<(), MeshError> {
        ctx.bind_vertex_array(Some(self.vao))?;
        ctx.bind_buffer(BufferTarget::Array, Some(self.vbo))?;
        ctx.buffer_sub_data(BufferTarget::Array, self.layout.normals.start, bytemuck::cast_slice(normals))?;
        Ok(())
    }

    /// Make `shader` current and issue one indexed triangle draw.
    pub fn draw<C: GraphicsContext, S: ShaderProgram>(&self, ctx: &mut C, shader: &mut S) -> Result<(), MeshError> {
        shader.use_program();
        ctx.bind_vertex_array(Some(self.vao))?;
        ctx.draw_elements(self.index_count, 0)?;
        ctx.bind_vertex_array(None)?;
        Ok(())
    }

    /// Delete the context objects and return the CPU mesh.
    pub fn dispose<C: GraphicsContext>(mut self, ctx: &mut C) -> Mesh {
        self.release(ctx)
    }

    /// Delete the context objects once; later calls return an empty mesh.
    fn release<C: GraphicsContext>(&mut self, ctx: &mut C) -> Mesh {
        if self.disposed {
            return Mesh::default();
        }
        ctx.delete_buffer(self.vbo);
        ctx.delete_buffer(self.ebo);
        ctx.delete_vertex_array(self.vao);
        self.disposed = true;
        std::mem::take(&mut self.mesh)
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        if !self.disposed {
            log::warn!(
                "GpuMesh dropped without dispose; leaking vertex array {} and buffers {}, {}",
                self.vao.0,
                self.vbo.0,
                self.ebo.0
            );
        }
    }
}

/// A [`GpuMesh`] that disposes itself when it goes out of scope.
///
/// Holds the context mutably for its whole lifetime; use
/// [`context`](Self::context) to reach it in between.
///
/// ```ignore
/// let mut scoped = ScopedMesh::upload(&mut ctx, Cone::with_segments(32, color)?)?;
/// scoped.set_normal_mode(NormalMode::Flat)?;
/// scoped.draw(&mut shader)?;
/// // buffers released here, even on early return
/// ```
pub struct ScopedMesh<'c, C: GraphicsContext> {
    ctx: &'c mut C,
    mesh: GpuMesh,
}

impl<'c, C: GraphicsContext> ScopedMesh<'c, C> {
    pub fn upload(ctx: &'c mut C, mesh: Mesh) -> Result<Self, MeshError> {
        let mesh = GpuMesh::upload(ctx, mesh)?;
        Ok(Self { ctx, mesh })
    }

    /// Borrow the context and the mesh at the same time.
    pub fn parts(&mut self) -> (&mut C, &mut GpuMesh) {
        (&mut *self.ctx, &mut self.mesh)
    }

    pub fn context(&mut self) -> &mut C {
        &mut *self.ctx
    }

    pub fn set_normal_mode(&mut self, mode: NormalMode) -> Result<(), MeshError> {
        self.mesh.set_normal_mode(&mut *self.ctx, mode)
    }

    pub fn draw<S: ShaderProgram>(&mut self, shader: &mut S) -> Result<(), MeshError> {
        self.mesh.draw(&mut *self.ctx, shader)
    }

    /// Dispose now and keep the CPU mesh.
    pub fn into_mesh(mut self) -> Mesh {
        self.mesh.release(&mut *self.ctx)
    }
}

impl<C: GraphicsContext> Deref for ScopedMesh<'_, C> {
    type Target = GpuMesh;

    fn deref(&self) -> &GpuMesh {
        &self.mesh
    }
}

impl<C: GraphicsContext> DerefMut for ScopedMesh<'_, C> {
    fn deref_mut(&mut self) -> &mut GpuMesh {
        &mut self.mesh
    }
}

impl<C: GraphicsContext> Drop for ScopedMesh<'_, C> {
    fn drop(&mut self) {
        self.mesh.release(&mut *self.ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContextError;
    use crate::layout::{NORMAL_LOCATION, TEX_COORD_LOCATION};
    use crate::render::headless::{HeadlessContext, RecordingShader};
    use crate::shapes::{Cone, Pyramid, cone::DEFAULT_COLOR};

    fn flatten(v: &[[f32; 3]]) -> Vec<f32> {
        v.iter().flatten().copied().collect()
    }

    #[test]
    fn upload_writes_every_section() {
        let mut ctx = HeadlessContext::new();
        let mesh = Cone::with_segments(8, DEFAULT_COLOR).unwrap();
        let expected_positions = flatten(mesh.positions());
        let expected_normals = flatten(mesh.vertex_normals());

        let gpu = GpuMesh::upload(&mut ctx, mesh).unwrap();
        let layout = gpu.layout().clone();
        let vbo = gpu.vertex_buffer();

        assert_eq!(ctx.buffer(vbo).map(<[u8]>::len), Some(layout.total_bytes()));
        assert_eq!(ctx.read_f32s(vbo, layout.positions.clone()), Some(expected_positions));
        assert_eq!(ctx.read_f32s(vbo, layout.normals.clone()), Some(expected_normals));
        assert_eq!(ctx.buffer(gpu.index_buffer()).map(<[u8]>::len), Some(24 * 4));

        let vao = gpu.vertex_array();
        assert_eq!(ctx.element_buffer(vao), Some(gpu.index_buffer()));
        let normal = ctx.attribute(vao, NORMAL_LOCATION).unwrap();
        assert_eq!(normal.attribute.offset, layout.positions.end);
        assert_eq!(normal.buffer, vbo);
        assert!(ctx.is_attribute_enabled(vao, TEX_COORD_LOCATION));
        assert_eq!(ctx.bound_vertex_array(), None);

        gpu.dispose(&mut ctx);
    }

    #[test]
    fn normal_switch_rewrites_only_normal_section() {
        let mut ctx = HeadlessContext::new();
        let mut gpu = GpuMesh::upload(&mut ctx, Cone::with_segments(6, DEFAULT_COLOR).unwrap()).unwrap();
        let layout = gpu.layout().clone();
        let vbo = gpu.vertex_buffer();
        let before = ctx.buffer(vbo).unwrap().to_vec();
        ctx.clear_log();

        gpu.set_normal_mode(&mut ctx, NormalMode::Flat).unwrap();

        let uploads = ctx.sub_uploads().to_vec();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].offset, layout.positions.end);
        assert_eq!(uploads[0].len, layout.normals.len());
        assert_eq!(
            ctx.read_f32s(vbo, layout.normals.clone()),
            Some(flatten(gpu.mesh().face_normals()))
        );

        let after = ctx.buffer(vbo).unwrap();
        assert_eq!(after[..layout.normals.start], before[..layout.normals.start]);
        assert_eq!(after[layout.normals.end..], before[layout.normals.end..]);

        gpu.dispose(&mut ctx);
    }

    #[test]
    fn switching_back_restores_buffer() {
        let mut ctx = HeadlessContext::new();
        let mut gpu = GpuMesh::upload(&mut ctx, Cone::with_segments(12, DEFAULT_COLOR).unwrap()).unwrap();
        let original = ctx.buffer(gpu.vertex_buffer()).unwrap().to_vec();

        gpu.set_normal_mode(&mut ctx, NormalMode::Flat).unwrap();
        gpu.set_normal_mode(&mut ctx, NormalMode::Smooth).unwrap();

        assert_eq!(ctx.buffer(gpu.vertex_buffer()).unwrap(), original.as_slice());
        gpu.dispose(&mut ctx);
    }

    #[test]
    fn failed_switch_keeps_mode_and_unbinds() {
        let mut ctx = HeadlessContext::new();
        let mut gpu = GpuMesh::upload(&mut ctx, Cone::with_segments(5, DEFAULT_COLOR).unwrap()).unwrap();
        let vbo = gpu.vertex_buffer();
        ctx.delete_buffer(vbo);

        let err = gpu.set_normal_mode(&mut ctx, NormalMode::Flat).unwrap_err();
        assert_eq!(err, MeshError::Context(ContextError::UnknownBuffer(vbo.0)));
        assert_eq!(gpu.normal_mode(), NormalMode::Smooth);
        assert_eq!(ctx.bound_vertex_array(), None);
        assert_eq!(ctx.bound_array_buffer(), None);

        // A retry is attempted again rather than treated as a no-op.
        assert!(gpu.set_normal_mode(&mut ctx, NormalMode::Flat).is_err());
        assert_eq!(gpu.normal_mode(), NormalMode::Smooth);

        gpu.dispose(&mut ctx);
    }

    #[test]
    fn redundant_switch_uploads_nothing() {
        let mut ctx = HeadlessContext::new();
        let mut gpu = GpuMesh::upload(&mut ctx, Pyramid::build().unwrap()).unwrap();
        ctx.clear_log();
        gpu.set_normal_mode(&mut ctx, NormalMode::Smooth).unwrap();
        assert!(ctx.sub_uploads().is_empty());
        gpu.dispose(&mut ctx);
    }

    #[test]
    fn draw_issues_one_indexed_draw() {
        let mut ctx = HeadlessContext::new();
        let mut shader = RecordingShader::new();
        let gpu = GpuMesh::upload(&mut ctx, Pyramid::build().unwrap()).unwrap();

        gpu.draw(&mut ctx, &mut shader).unwrap();

        assert_eq!(ctx.draws().len(), 1);
        assert_eq!(ctx.draws()[0].count, 18);
        assert_eq!(ctx.draws()[0].vao, gpu.vertex_array());
        assert_eq!(shader.uses(), 1);
        gpu.dispose(&mut ctx);
    }

    #[test]
    fn dispose_releases_everything() {
        let mut ctx = HeadlessContext::new();
        let mesh = Pyramid::build().unwrap();
        let gpu = GpuMesh::upload(&mut ctx, mesh.clone()).unwrap();
        assert_eq!(ctx.live_buffers(), 2);
        assert_eq!(ctx.live_vertex_arrays(), 1);

        let back = gpu.dispose(&mut ctx);
        assert_eq!(back, mesh);
        assert_eq!(ctx.live_buffers(), 0);
        assert_eq!(ctx.live_vertex_arrays(), 0);
    }

    #[test]
    fn failed_acquisition_leaves_nothing_behind() {
        for limit in 0..3 {
            let mut ctx = HeadlessContext::new().with_creation_limit(limit);
            let err = GpuMesh::upload(&mut ctx, Pyramid::build().unwrap()).unwrap_err();
            assert!(matches!(err, MeshError::ResourceAcquisition { .. }), "limit {limit}: {err}");
            assert_eq!(ctx.live_buffers(), 0);
            assert_eq!(ctx.live_vertex_arrays(), 0);
        }
    }

    #[test]
    fn scoped_mesh_releases_on_early_return() {
        fn render_once(ctx: &mut HeadlessContext) -> Result<(), MeshError> {
            let mut scoped = ScopedMesh::upload(ctx, Cone::with_segments(4, DEFAULT_COLOR)?)?;
            scoped.set_normal_mode(NormalMode::Flat)?;
            Err(MeshError::InvalidSegments { segments: 0 })
        }

        let mut ctx = HeadlessContext::new();
        assert!(render_once(&mut ctx).is_err());
        assert_eq!(ctx.live_buffers(), 0);
        assert_eq!(ctx.live_vertex_arrays(), 0);
    }

    #[test]
    fn scoped_mesh_draws_and_returns_mesh() {
        let mut ctx = HeadlessContext::new();
        let mut shader = RecordingShader::new();
        let mut scoped = ScopedMesh::upload(&mut ctx, Pyramid::build().unwrap()).unwrap();
        scoped.draw(&mut shader).unwrap();
        assert_eq!(scoped.index_count(), 18);
        assert_eq!(scoped.context().draws().len(), 1);

        let mesh = scoped.into_mesh();
        assert_eq!(mesh.vertex_count(), 18);
        assert_eq!(ctx.live_buffers(), 0);
    }
}
