//! Rendering subsystem: the graphics-context seam.
//!
//! Nothing in this crate talks to a GPU API directly. Meshes are uploaded and
//! drawn through the [`GraphicsContext`] and [`ShaderProgram`] traits, which
//! mirror the small slice of WebGL2 the classroom solids need.
//! [`HeadlessContext`] and [`RecordingShader`] implement them in memory.

pub mod context;
pub mod gpu_mesh;
pub mod headless;

pub use context::{
    BufferId, BufferSource, BufferTarget, BufferUsage, GraphicsContext, ShaderProgram, VertexArrayId,
};
pub use gpu_mesh::{GpuMesh, ScopedMesh};
pub use headless::{DrawCall, HeadlessContext, RecordingShader, SubUpload, UniformValue};
