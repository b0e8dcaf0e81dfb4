//! Parametric surface generator.
//!
//! A `Surface` holds radius, denominators, angle spans and segment counts;
//! `mesh::generate` turns them into vertex, normal, triangle and wireframe
//! arrays.

pub mod mesh;
pub mod surface;

pub use mesh::{generate, surface_point, Mesh};
pub use surface::{AngleSpans, Denominators, Segments, Surface, SurfaceParams};
