//! Section-packed vertex buffer layout.
//!
//! A mesh goes to the GPU as a single vertex buffer holding each attribute
//! stream back to back:
//!
//! ```text
//! | positions | normals | colors | texcoords (optional) |
//! 0           P         P+N      P+N+C                  total
//! ```
//!
//! Each stream is tightly packed (stride 0), so an attribute pointer only
//! needs its component count and the byte offset of its section. Keeping the
//! normals in their own contiguous range is what makes a normal-mode switch a
//! single partial upload.

use std::mem::size_of;
use std::ops::Range;

use crate::mesh::Mesh;

/// Shader attribute locations, fixed across every shape.
pub const POSITION_LOCATION: u32 = 0;
pub const NORMAL_LOCATION: u32 = 1;
pub const COLOR_LOCATION: u32 = 2;
pub const TEX_COORD_LOCATION: u32 = 3;

/// One `vertexAttribPointer` worth of configuration. Components are always
/// `f32`, never normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u32,
    /// Byte distance between consecutive elements; 0 means tightly packed.
    pub stride: u32,
    /// Byte offset of the first element within the vertex buffer.
    pub offset: usize,
}

/// Byte ranges of each section plus the matching attribute pointers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLayout {
    pub positions: Range<usize>,
    pub normals: Range<usize>,
    pub colors: Range<usize>,
    pub tex_coords: Option<Range<usize>>,
}

impl SectionLayout {
    /// Layout for `vertex_count` vertex-instances.
    pub fn new(vertex_count: usize, has_tex_coords: bool) -> Self {
        let p = vertex_count * size_of::<[f32; 3]>();
        let n = vertex_count * size_of::<[f32; 3]>();
        let c = vertex_count * size_of::<[f32; 4]>();
        let t = vertex_count * size_of::<[f32; 2]>();

        let positions = 0..p;
        let normals = positions.end..positions.end + n;
        let colors = normals.end..normals.end + c;
        let tex_coords = has_tex_coords.then(|| colors.end..colors.end + t);

        Self { positions, normals, colors, tex_coords }
    }

    pub fn for_mesh(mesh: &Mesh) -> Self {
        Self::new(mesh.vertex_count(), mesh.tex_coords().is_some())
    }

    /// Size of the whole vertex buffer in bytes.
    pub fn total_bytes(&self) -> usize {
        self.tex_coords
            .as_ref()
            .map_or(self.colors.end, |tc| tc.end)
    }

    /// Attribute pointers in location order.
    pub fn attributes(&self) -> Vec<VertexAttribute> {
        let attr = |location, components, range: &Range<usize>| VertexAttribute {
            location,
            components,
            stride: 0,
            offset: range.start,
        };

        let mut attrs = vec![
            attr(POSITION_LOCATION, 3, &self.positions),
            attr(NORMAL_LOCATION, 3, &self.normals),
            attr(COLOR_LOCATION, 4, &self.colors),
        ];
        if let Some(tc) = &self.tex_coords {
            attrs.push(attr(TEX_COORD_LOCATION, 2, tc));
        }
        attrs
    }
}
