//! Cone: a triangle fan from a base ring up to an apex.
//!
//! Segment `i` spans angles `i·2π/N .. (i+1)·2π/N` and contributes the wedge
//! `(apex, base1, base0)`. The base is left open unless
//! [`ConeOptions::capped`] asks for a bottom fan.
//!
//! Texture coordinates unwrap the mantle onto a strip: the apex maps to
//! `(0.5, 1)` and ring point `i` to `(i/N, 0)`. There is no seam correction
//! beyond the first and last wedge meeting at `u = 0` / `u = 1`.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::MeshError;
use crate::mesh::{Mesh, MeshStreams};
use crate::normals::{ConeProfile, SmoothStyle, face_normals};

pub const DEFAULT_SEGMENTS: u32 = 32;
pub const DEFAULT_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

const DOWN: [f32; 3] = [0.0, -1.0, 0.0];

/// Parameters for [`Cone::build`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConeOptions {
    /// Number of wedges around the circumference (at least 3).
    pub segments: u32,
    /// RGBA color shared by every vertex-instance.
    pub color: [f32; 4],
    pub radius: f32,
    /// Distance from the center to the apex (and to the base plane).
    pub half_height: f32,
    /// Close the base with a downward-facing fan.
    pub capped: bool,
    pub smooth_style: SmoothStyle,
}

impl Default for ConeOptions {
    fn default() -> Self {
        Self {
            segments: DEFAULT_SEGMENTS,
            color: DEFAULT_COLOR,
            radius: 0.5,
            half_height: 0.5,
            capped: false,
            smooth_style: SmoothStyle::Exact,
        }
    }
}

impl ConeOptions {
    pub fn segments(mut self, segments: u32) -> Self {
        self.segments = segments;
        self
    }

    pub fn color(mut self, rgba: [f32; 4]) -> Self {
        self.color = rgba;
        self
    }

    pub fn capped(mut self, capped: bool) -> Self {
        self.capped = capped;
        self
    }

    pub fn smooth_style(mut self, style: SmoothStyle) -> Self {
        self.smooth_style = style;
        self
    }

    pub fn profile(&self) -> ConeProfile {
        ConeProfile {
            radius: self.radius,
            half_height: self.half_height,
        }
    }

    /// Reject parameters that would produce degenerate geometry.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.segments < 3 {
            return Err(MeshError::InvalidSegments { segments: self.segments });
        }
        for (name, value) in [("radius", self.radius), ("half_height", self.half_height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(MeshError::InvalidDimension { name, value });
            }
        }
        if let SmoothStyle::FixedLift(lift) = self.smooth_style {
            if !(lift.is_finite() && lift > 0.0) {
                return Err(MeshError::InvalidDimension { name: "lift", value: lift });
            }
        }
        Ok(())
    }
}

/// Builder for the procedural cone.
pub struct Cone;

impl Cone {
    /// Shorthand for the default-sized cone.
    pub fn with_segments(segments: u32, color: [f32; 4]) -> Result<Mesh, MeshError> {
        Self::build(&ConeOptions::default().segments(segments).color(color))
    }

    pub fn build(options: &ConeOptions) -> Result<Mesh, MeshError> {
        options.validate()?;

        let n = options.segments;
        let profile = options.profile();
        let style = options.smooth_style;
        let apex = profile.apex();
        let step = TAU / n as f32;

        let wedges = n as usize * if options.capped { 2 } else { 1 };
        let mut positions = Vec::with_capacity(wedges * 3);
        let mut tex_coords = Vec::with_capacity(wedges * 3);
        let mut smooth = Vec::with_capacity(wedges * 3);

        for i in 0..n {
            let base0 = profile.ring_point(i as f32 * step);
            let base1 = profile.ring_point((i + 1) as f32 * step);

            positions.extend_from_slice(&[apex, base1, base0]);
            tex_coords.extend_from_slice(&[
                [0.5, 1.0],
                [(i + 1) as f32 / n as f32, 0.0],
                [i as f32 / n as f32, 0.0],
            ]);
            smooth.extend([apex, base1, base0].map(|p| profile.smooth_normal(p, style)));
        }

        if options.capped {
            let center = [0.0, -profile.half_height, 0.0];
            for i in 0..n {
                let (a0, a1) = (i as f32 * step, (i + 1) as f32 * step);
                positions.extend_from_slice(&[center, profile.ring_point(a0), profile.ring_point(a1)]);
                tex_coords.extend_from_slice(&[
                    [0.5, 0.5],
                    [0.5 + 0.5 * a0.cos(), 0.5 + 0.5 * a0.sin()],
                    [0.5 + 0.5 * a1.cos(), 0.5 + 0.5 * a1.sin()],
                ]);
                smooth.extend_from_slice(&[DOWN; 3]);
            }
        }

        let indices: Vec<u32> = (0..positions.len() as u32).collect();
        let flat = face_normals(&positions, &indices)?;
        let colors = vec![options.color; positions.len()];

        let mesh = Mesh::new(MeshStreams {
            positions,
            colors,
            tex_coords: Some(tex_coords),
            indices,
            face_normals: flat,
            vertex_normals: smooth,
        })?;

        log::debug!(
            "built cone: {} segments{}, {} vertex-instances",
            n,
            if options.capped { " (capped)" } else { "" },
            mesh.vertex_count()
        );
        Ok(mesh)
    }
}
