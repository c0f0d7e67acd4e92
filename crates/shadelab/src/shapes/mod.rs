//! # Shapes: Procedural Solids
//!
//! Builders that turn a handful of parameters into a validated
//! [`Mesh`](crate::mesh::Mesh):
//!
//! | Builder | Faces | Vertex-instances | Smooth normals |
//! |---------|-------|------------------|----------------|
//! | [`Pyramid`] | 2 base + 4 side triangles | 18 | same as flat |
//! | [`Cone`] | `segments` wedges (+ `segments` cap) | `3·segments` (`6·segments`) | analytical |
//!
//! ## Winding
//!
//! Every triangle is counter-clockwise when viewed from outside the solid,
//! so [`face_normals`](crate::normals::face_normals) yields outward normals.
//!
//! ## Why Duplicate Vertices?
//!
//! A pyramid has five distinct points, but a base corner belongs to the base
//! and to two sides, each with a different color and flat normal. Giving
//! every triangle corner its own vertex-instance keeps those attributes
//! independent at the cost of a few extra bytes.

pub mod cone;
pub mod pyramid;

pub use cone::{Cone, ConeOptions};
pub use pyramid::Pyramid;
