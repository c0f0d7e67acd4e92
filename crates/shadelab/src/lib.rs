//! # Shadelab: Shaded Classroom Solids
//!
//! Procedural solids (a square pyramid and a cone) with both flat and smooth
//! normals, uploaded through a small WebGL2-shaped graphics context and
//! switched between normal modes at runtime.
//!
//! Start with `use shadelab::prelude::*`, build a [`Mesh`](mesh::Mesh) from
//! a [`shapes`] builder and upload it with
//! [`GpuMesh`](render::GpuMesh) or [`ScopedMesh`](render::ScopedMesh).
//! [`app::frame`] and [`app::submit`] drive one frame of the orbiting demo.

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod layout;
pub mod math;
pub mod mesh;
pub mod normals;
pub mod prelude;
pub mod render;
pub mod shapes;
pub mod time;
