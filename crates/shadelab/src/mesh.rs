//! # Mesh: Validated Attribute Streams
//!
//! A [`Mesh`] is the CPU side of a shaded solid: one entry per
//! *vertex-instance* in every stream (positions, colors, optional texture
//! coordinates, flat normals, smooth normals) plus a flat triangle index list.
//! Vertex-instances are never shared between faces, so a face can carry its
//! own color and flat normal without affecting its neighbours.
//!
//! ## Invariants
//!
//! [`Mesh::new`] is the only way in and it checks everything up front:
//!
//! - every stream has exactly `positions.len()` entries,
//! - the index list is whole triangles that stay in range,
//! - both normal streams are unit length.
//!
//! After construction the streams never change. The one mutable bit is the
//! [`NormalMode`] selector, which picks which normal stream is *active*, i.e.
//! the one handed to the GPU. Switching is a pointer flip, not a copy, so
//! flat → smooth → flat always lands back on identical data.

use serde::{Deserialize, Serialize};

use crate::error::MeshError;
use crate::normals;

/// Which normal stream is currently bound for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalMode {
    /// One normal per face: faceted shading.
    Flat,
    /// One blended normal per vertex: gradient shading.
    #[default]
    Smooth,
}

impl NormalMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Flat => Self::Smooth,
            Self::Smooth => Self::Flat,
        }
    }
}

/// The raw streams a builder hands to [`Mesh::new`].
#[derive(Debug, Clone, Default)]
pub struct MeshStreams {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
    pub tex_coords: Option<Vec<[f32; 2]>>,
    pub indices: Vec<u32>,
    pub face_normals: Vec<[f32; 3]>,
    pub vertex_normals: Vec<[f32; 3]>,
}

/// An immutable, validated triangle mesh with two normal streams.
///
/// The default value is the empty mesh, which trivially satisfies every
/// invariant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 4]>,
    tex_coords: Option<Vec<[f32; 2]>>,
    indices: Vec<u32>,
    face_normals: Vec<[f32; 3]>,
    vertex_normals: Vec<[f32; 3]>,
    mode: NormalMode,
}

fn check_len(stream: &'static str, expected: usize, actual: usize) -> Result<(), MeshError> {
    if expected != actual {
        return Err(MeshError::StreamLengthMismatch { stream, expected, actual });
    }
    Ok(())
}

fn check_unit(stream: &'static str, normals: &[[f32; 3]]) -> Result<(), MeshError> {
    match normals::first_non_unit(normals) {
        Some((index, length)) => Err(MeshError::NonUnitNormal { stream, index, length }),
        None => Ok(()),
    }
}

impl Mesh {
    /// Validate `streams` and wrap them. The initial mode is
    /// [`NormalMode::Smooth`].
    pub fn new(streams: MeshStreams) -> Result<Self, MeshError> {
        let MeshStreams {
            positions,
            colors,
            tex_coords,
            indices,
            face_normals,
            vertex_normals,
        } = streams;

        let n = positions.len();
        check_len("color", n, colors.len())?;
        check_len("face normal", n, face_normals.len())?;
        check_len("vertex normal", n, vertex_normals.len())?;
        if let Some(tc) = &tex_coords {
            check_len("texcoord", n, tc.len())?;
        }

        if indices.len() % 3 != 0 {
            return Err(MeshError::IndexCountNotMultipleOfThree { len: indices.len() });
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= n) {
            return Err(MeshError::IndexOutOfRange { index, vertex_count: n });
        }

        check_unit("face", &face_normals)?;
        check_unit("vertex", &vertex_normals)?;

        Ok(Self {
            positions,
            colors,
            tex_coords,
            indices,
            face_normals,
            vertex_normals,
            mode: NormalMode::default(),
        })
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn colors(&self) -> &[[f32; 4]] {
        &self.colors
    }

    pub fn tex_coords(&self) -> Option<&[[f32; 2]]> {
        self.tex_coords.as_deref()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Flat (per-face) normals.
    pub fn face_normals(&self) -> &[[f32; 3]] {
        &self.face_normals
    }

    /// Smooth (per-vertex) normals.
    pub fn vertex_normals(&self) -> &[[f32; 3]] {
        &self.vertex_normals
    }

    pub fn normal_mode(&self) -> NormalMode {
        self.mode
    }

    /// Select the active normal stream. Returns `true` if the mode changed.
    pub fn set_normal_mode(&mut self, mode: NormalMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    /// The normal stream `mode` selects.
    pub fn normals(&self, mode: NormalMode) -> &[[f32; 3]] {
        match mode {
            NormalMode::Flat => &self.face_normals,
            NormalMode::Smooth => &self.vertex_normals,
        }
    }

    /// The normal stream selected by [`normal_mode`](Self::normal_mode).
    pub fn active_normals(&self) -> &[[f32; 3]] {
        self.normals(self.mode)
    }

    /// Number of vertex-instances.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
