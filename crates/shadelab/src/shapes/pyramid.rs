//! Square pyramid: unit base on the `y = 0` plane, apex at `(0, 1, 0)`.

use crate::error::MeshError;
use crate::mesh::{Mesh, MeshStreams};
use crate::normals::face_normals;

const H: f32 = 0.5;
const APEX: [f32; 3] = [0.0, 1.0, 0.0];

/// Base corners, counter-clockwise seen from above.
const CORNERS: [[f32; 3]; 4] = [
    [-H, 0.0, -H],
    [H, 0.0, -H],
    [H, 0.0, H],
    [-H, 0.0, H],
];

/// One color per face: base, then the sides facing −Z, +X, +Z, −X.
pub const PALETTE: [[f32; 4]; 5] = [
    [0.6, 0.6, 0.6, 1.0],
    [1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 1.0, 1.0],
    [1.0, 0.0, 1.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
];

/// Builder for the five-faced square pyramid.
pub struct Pyramid;

impl Pyramid {
    /// 6 triangles, 18 vertex-instances. The pyramid is flat shaded only:
    /// its smooth normal stream is a copy of the flat one.
    pub fn build() -> Result<Mesh, MeshError> {
        let [c0, c1, c2, c3] = CORNERS;

        // The base faces down, so it runs clockwise seen from above.
        let mut faces: Vec<([[f32; 3]; 3], [f32; 4])> = vec![
            ([c0, c1, c2], PALETTE[0]),
            ([c0, c2, c3], PALETTE[0]),
        ];

        // Each side walks its base edge backwards, then climbs to the apex.
        for (side, (a, b)) in [(c0, c1), (c1, c2), (c2, c3), (c3, c0)].into_iter().enumerate() {
            faces.push(([b, a, APEX], PALETTE[side + 1]));
        }

        let mut positions = Vec::with_capacity(18);
        let mut colors = Vec::with_capacity(18);
        for (corners, color) in &faces {
            positions.extend_from_slice(corners);
            colors.extend_from_slice(&[*color; 3]);
        }
        let indices: Vec<u32> = (0..positions.len() as u32).collect();

        let flat = face_normals(&positions, &indices)?;
        let mesh = Mesh::new(MeshStreams {
            positions,
            colors,
            tex_coords: None,
            indices,
            vertex_normals: flat.clone(),
            face_normals: flat,
        })?;

        log::debug!(
            "built pyramid: {} vertex-instances, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normals::dot;

    #[test]
    fn pyramid_has_correct_counts() {
        let mesh = Pyramid::build().unwrap();
        assert_eq!(mesh.vertex_count(), 18);
        assert_eq!(mesh.triangle_count(), 6);
        assert_eq!(mesh.indices().len(), 18);
        assert_eq!(mesh.face_normals().len(), mesh.positions().len());
        assert_eq!(mesh.vertex_normals().len(), mesh.positions().len());
        assert_eq!(mesh.colors().len(), mesh.positions().len());
        assert!(mesh.tex_coords().is_none());
    }

    #[test]
    fn base_normal_points_straight_down() {
        let mesh = Pyramid::build().unwrap();
        for n in &mesh.face_normals()[..6] {
            assert_eq!(*n, [0.0, -1.0, 0.0]);
        }
    }

    #[test]
    fn every_face_points_away_from_center() {
        let mesh = Pyramid::build().unwrap();
        let center = [0.0, 0.25, 0.0];
        for tri in mesh.indices().chunks_exact(3) {
            let p: [[f32; 3]; 3] = std::array::from_fn(|k| mesh.positions()[tri[k] as usize]);
            let centroid = [
                (p[0][0] + p[1][0] + p[2][0]) / 3.0 - center[0],
                (p[0][1] + p[1][1] + p[2][1]) / 3.0 - center[1],
                (p[0][2] + p[1][2] + p[2][2]) / 3.0 - center[2],
            ];
            let n = mesh.face_normals()[tri[0] as usize];
            assert!(dot(n, centroid) > 0.0, "face {tri:?} points inward: {n:?}");
        }
    }

    #[test]
    fn side_normal_matches_slope() {
        let mesh = Pyramid::build().unwrap();
        // The −Z side rises 1 over a run of 0.5: normal ∝ (0, 0.5, −1).
        let n = mesh.face_normals()[6];
        let s = 1.25_f32.sqrt();
        assert!((n[0]).abs() < 1e-6);
        assert!((n[1] - 0.5 / s).abs() < 1e-6);
        assert!((n[2] + 1.0 / s).abs() < 1e-6);
    }

    #[test]
    fn faces_use_palette_in_order() {
        let mesh = Pyramid::build().unwrap();
        for (face, chunk) in mesh.colors().chunks(3).enumerate() {
            let expected = if face < 2 { PALETTE[0] } else { PALETTE[face - 1] };
            assert!(chunk.iter().all(|c| *c == expected), "face {face} color mismatch");
        }
    }

    #[test]
    fn smooth_stream_equals_flat_stream() {
        let mesh = Pyramid::build().unwrap();
        assert_eq!(mesh.vertex_normals(), mesh.face_normals());
    }
}
