//! Error types.
//!
//! Geometry and upload failures surface as [`MeshError`]; the graphics
//! context reports its own misuse as [`ContextError`], which converts into
//! `MeshError` so `?` works across the seam. Configuration loading has its
//! own [`ConfigError`].

use thiserror::Error;

/// Everything that can go wrong while building, validating, uploading or
/// drawing a mesh.
#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    /// The index buffer does not describe whole triangles.
    #[error("index count {len} is not a multiple of 3")]
    IndexCountNotMultipleOfThree { len: usize },

    /// A triangle references a vertex-instance that does not exist.
    #[error("index {index} out of range for {vertex_count} vertex-instances")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    /// A triangle has (near) zero area, so its normal is undefined.
    #[error("triangle {triangle} is degenerate (zero area)")]
    DegenerateTriangle { triangle: usize },

    /// A per-vertex-instance stream does not match the position count.
    #[error("{stream} stream has {actual} entries, expected {expected}")]
    StreamLengthMismatch {
        stream: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A normal in one of the normal streams is not unit length.
    #[error("{stream} normal {index} has length {length}, expected 1")]
    NonUnitNormal {
        stream: &'static str,
        index: usize,
        length: f32,
    },

    /// A cone needs at least three segments to enclose any area.
    #[error("cone needs at least 3 segments, got {segments}")]
    InvalidSegments { segments: u32 },

    /// A shape dimension is not a positive finite number.
    #[error("{name} must be positive and finite, got {value}")]
    InvalidDimension { name: &'static str, value: f32 },

    /// The graphics context refused to create a resource.
    #[error("graphics context failed to create {resource}")]
    ResourceAcquisition { resource: &'static str },

    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Misuse of a [`GraphicsContext`](crate::render::GraphicsContext), in the
/// spirit of a GL error flag.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("no buffer bound to {0:?}")]
    NoBufferBound(crate::render::BufferTarget),

    #[error("unknown buffer handle {0}")]
    UnknownBuffer(u32),

    #[error("unknown vertex array handle {0}")]
    UnknownVertexArray(u32),

    #[error("no vertex array bound")]
    NoVertexArrayBound,

    #[error("bound vertex array has no element buffer")]
    NoElementBuffer,

    #[error("write of {len} bytes at offset {offset} exceeds buffer size {size}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },

    #[error("draw of {count} indices exceeds element buffer ({available} available)")]
    DrawOutOfRange { count: u32, available: usize },
}

/// Errors while loading a [`SceneConfig`](crate::config::SceneConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
