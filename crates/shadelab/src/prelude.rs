//! Convenience re-exports: `use shadelab::prelude::*` for the common items.

pub use crate::app::{AppContext, DrawCommand, FrameState, frame, submit};
pub use crate::camera::OrbitCamera;
pub use crate::config::{SceneConfig, SolidConfig, Viewport};
pub use crate::error::{ConfigError, ContextError, MeshError};
pub use crate::input::{ElementState, KeyCode, Keyboard};
pub use crate::math::{Mat4, Quat, Transform, Vec3, Vec4};
pub use crate::mesh::{Mesh, MeshStreams, NormalMode};
pub use crate::normals::SmoothStyle;
pub use crate::render::{GpuMesh, GraphicsContext, HeadlessContext, RecordingShader, ScopedMesh, ShaderProgram};
pub use crate::shapes::{Cone, ConeOptions, Pyramid};
pub use crate::time::{FrameTime, Time};
