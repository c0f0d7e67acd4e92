//! # Normals: Flat, Welded and Analytical
//!
//! Lighting needs a direction per vertex-instance. This module derives those
//! directions from raw geometry, three ways:
//!
//! - [`face_normals`]: one normal per triangle, written to all three of its
//!   corners. Produces faceted (flat) shading.
//! - [`smooth_normals`]: face normals accumulated across every
//!   vertex-instance sharing a position, weighted by triangle area. Produces
//!   smooth shading for meshes that duplicate vertices per face.
//! - [`ConeProfile::smooth_normal`]: the cone's surface normal computed from
//!   its shape instead of from neighbouring faces.
//!
//! ## Winding
//!
//! For a triangle `(p0, p1, p2)` the normal is `normalize((p1-p0) × (p2-p0))`.
//! By the right-hand rule it points toward a viewer who sees the corners in
//! counter-clockwise order. Inconsistently wound input yields inward normals;
//! nothing here tries to guess which side is "outside".
//!
//! ## Degenerate Triangles
//!
//! A zero-area triangle has no normal. Rather than inventing one, every
//! function here rejects it with [`MeshError::DegenerateTriangle`].
//!
//! The vector helpers work on plain `[f32; 3]` arrays, the same shape the
//! mesh streams use.

use std::collections::HashMap;

use crate::error::MeshError;

/// A triangle is degenerate when `|u × v| <= DEGENERATE_EPSILON · |u| · |v|`
/// for its edge vectors `u`, `v`, i.e. when the sine of its corner angle is
/// this small. Being relative, the test does not depend on the mesh's scale.
pub const DEGENERATE_EPSILON: f32 = 1e-6;

/// Tolerance used when checking that a normal is unit length.
pub const UNIT_TOLERANCE: f32 = 1e-5;

/// Normal assigned to the tip of a cone, where every mantle face meets.
pub const APEX_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// `a - b`
pub fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Right-handed cross product `a × b`.
pub fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn max_abs(v: [f32; 3]) -> f32 {
    v[0].abs().max(v[1].abs()).max(v[2].abs())
}

/// Euclidean length. Components are divided by the largest one before
/// squaring, so neither huge nor tiny vectors overflow or underflow.
pub fn length(v: [f32; 3]) -> f32 {
    if !v.iter().all(|c| c.is_finite()) {
        return dot(v, v).sqrt();
    }
    let m = max_abs(v);
    if m == 0.0 {
        return 0.0;
    }
    let s = v.map(|c| c / m);
    m * dot(s, s).sqrt()
}

/// Scale `v` to unit length. Returns `None` for the zero vector and for
/// vectors with non-finite components.
pub fn normalize(v: [f32; 3]) -> Option<[f32; 3]> {
    let m = max_abs(v);
    if m == 0.0 || !v.iter().all(|c| c.is_finite()) {
        return None;
    }
    let s = v.map(|c| c / m);
    let len = dot(s, s).sqrt();
    Some(s.map(|c| c / len))
}

/// Unnormalized normal of a triangle; its length is twice the triangle's area.
fn area_normal(p0: [f32; 3], p1: [f32; 3], p2: [f32; 3]) -> [f32; 3] {
    cross(sub(p1, p0), sub(p2, p0))
}

/// Unit normal of a single triangle, or `None` if it is degenerate (see
/// [`DEGENERATE_EPSILON`]).
pub fn triangle_normal(p0: [f32; 3], p1: [f32; 3], p2: [f32; 3]) -> Option<[f32; 3]> {
    let (u, v) = (sub(p1, p0), sub(p2, p0));
    let n = cross(u, v);
    let sine = length(n) / length(u) / length(v);
    // NaN (a zero edge) fails the comparison too.
    if !(sine > DEGENERATE_EPSILON) {
        return None;
    }
    normalize(n)
}

/// Checks the index buffer against the position count and yields the
/// triangles as `usize` triples.
fn triangles(positions: &[[f32; 3]], indices: &[u32]) -> Result<Vec<[usize; 3]>, MeshError> {
    if indices.len() % 3 != 0 {
        return Err(MeshError::IndexCountNotMultipleOfThree { len: indices.len() });
    }
    let vertex_count = positions.len();
    indices
        .chunks_exact(3)
        .map(|tri| {
            let mut out = [0usize; 3];
            for (slot, &index) in out.iter_mut().zip(tri) {
                if index as usize >= vertex_count {
                    return Err(MeshError::IndexOutOfRange { index, vertex_count });
                }
                *slot = index as usize;
            }
            Ok(out)
        })
        .collect()
}

/// Flat normals: every corner of a triangle gets that triangle's unit normal.
///
/// The output has one entry per position. A vertex-instance shared by
/// several triangles keeps the normal of the last one; a vertex-instance no
/// triangle references is left as the zero vector.
pub fn face_normals(positions: &[[f32; 3]], indices: &[u32]) -> Result<Vec<[f32; 3]>, MeshError> {
    let mut normals = vec![[0.0; 3]; positions.len()];

    for (triangle, [i0, i1, i2]) in triangles(positions, indices)?.into_iter().enumerate() {
        let n = triangle_normal(positions[i0], positions[i1], positions[i2])
            .ok_or(MeshError::DegenerateTriangle { triangle })?;
        normals[i0] = n;
        normals[i1] = n;
        normals[i2] = n;
    }

    Ok(normals)
}

/// Position key for welding. `-0.0` and `0.0` must land in the same bucket.
fn weld_key(p: [f32; 3]) -> [u32; 3] {
    p.map(|c| if c == 0.0 { 0 } else { c.to_bits() })
}

/// Smooth normals for meshes with duplicated vertex-instances.
///
/// Area-weighted face normals are summed per *position* (exact bit match),
/// so corners of different triangles that sit on the same point end up with
/// the same averaged direction. If the contributions cancel out (a knife
/// edge), the corner falls back to its own face normal.
pub fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Result<Vec<[f32; 3]>, MeshError> {
    let tris = triangles(positions, indices)?;
    let flat = face_normals(positions, indices)?;

    // Per welded position: summed area normals and the sum of their lengths.
    let mut sums: HashMap<[u32; 3], ([f32; 3], f32)> = HashMap::new();
    for &[i0, i1, i2] in &tris {
        let n = area_normal(positions[i0], positions[i1], positions[i2]);
        let weight = length(n);
        for i in [i0, i1, i2] {
            let (sum, total) = sums.entry(weld_key(positions[i])).or_insert(([0.0; 3], 0.0));
            sum[0] += n[0];
            sum[1] += n[1];
            sum[2] += n[2];
            *total += weight;
        }
    }

    let normals = positions
        .iter()
        .zip(&flat)
        .map(|(p, face)| {
            sums.get(&weld_key(*p))
                .filter(|(sum, total)| length(*sum) > DEGENERATE_EPSILON * total)
                .and_then(|(sum, _)| normalize(*sum))
                .unwrap_or(*face)
        })
        .collect();

    Ok(normals)
}

/// How a cone's smooth normals are derived.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "style", content = "lift", rename_all = "snake_case")]
pub enum SmoothStyle {
    /// The true surface normal of the mantle,
    /// `(cos θ · h/s, r/s, sin θ · h/s)` with `s = sqrt(r² + h²)`.
    Exact,
    /// `normalize(x, lift, z)` for a ring point `(x, _, z)`. With the default
    /// cone (`r = 0.5`, `h = 1`) a lift of `0.25` matches [`Exact`](Self::Exact).
    FixedLift(f32),
}

impl Default for SmoothStyle {
    fn default() -> Self {
        Self::Exact
    }
}

/// The dimensions of an upright cone centered on the origin: base ring at
/// `y = -half_height`, apex at `y = +half_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeProfile {
    pub radius: f32,
    pub half_height: f32,
}

impl ConeProfile {
    pub fn height(&self) -> f32 {
        self.half_height * 2.0
    }

    pub fn apex(&self) -> [f32; 3] {
        [0.0, self.half_height, 0.0]
    }

    /// Point on the base ring at `angle` radians (measured from +X toward +Z).
    pub fn ring_point(&self, angle: f32) -> [f32; 3] {
        [
            self.radius * angle.cos(),
            -self.half_height,
            self.radius * angle.sin(),
        ]
    }

    /// Smooth normal for a point of this cone.
    ///
    /// The apex has no single normal; it gets [`APEX_NORMAL`] by convention.
    /// Any other point is treated as lying on the mantle and only its radial
    /// direction `(x, z)` is used.
    pub fn smooth_normal(&self, point: [f32; 3], style: SmoothStyle) -> [f32; 3] {
        let radial = length([point[0], 0.0, point[2]]);
        if radial == 0.0 {
            return APEX_NORMAL;
        }

        let lift = match style {
            // (x, r·r/h, z) is parallel to (cos θ·h, r, sin θ·h) when |(x, z)| = r.
            // Scale by the actual radial distance so interior points agree too.
            SmoothStyle::Exact => radial * self.radius / self.height(),
            SmoothStyle::FixedLift(lift) => lift,
        };

        normalize([point[0], lift, point[2]]).unwrap_or(APEX_NORMAL)
    }
}

impl Default for ConeProfile {
    fn default() -> Self {
        Self {
            radius: 0.5,
            half_height: 0.5,
        }
    }
}

/// Returns the index and length of the first normal that is not unit length.
pub(crate) fn first_non_unit(normals: &[[f32; 3]]) -> Option<(usize, f32)> {
    normals
        .iter()
        .map(|n| length(*n))
        .enumerate()
        .find(|(_, len)| (len - 1.0).abs() > UNIT_TOLERANCE)
}
