//! Parametric ellipsoid tessellation.
//!
//! For vertical step i in [0, v] and horizontal step j in [0, h]:
//!
//! ```text
//! phi   = i * vertical_span / v
//! theta = j * horizontal_span / h
//! x = r sin(phi) sin(theta) / b
//! y = r cos(phi)            / c
//! z = r sin(phi) cos(theta) / a
//! ```
//!
//! The unscaled point doubles as the outward normal; the vertex position
//! is that point plus the surface origin. Vertices are laid out row-major,
//! `k = i * (h + 1) + j`.

use glam::Vec3;

use super::surface::SurfaceParams;
use crate::math::utils::EPSILON;

/// Tolerance when deciding whether the vertical span reaches the lower pole.
const POLE_TOLERANCE: f32 = 1e-4;

/// Triangulated surface, in flat arrays ready for upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// xyz per vertex
    pub positions: Vec<f32>,
    /// xyz per vertex, parallel to `positions`
    pub normals: Vec<f32>,
    /// Triangle list, counter-clockwise seen from outside
    pub indices: Vec<u32>,
    /// Line list for the wireframe overlay
    pub wires: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position of vertex `k`.
    pub fn position(&self, k: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[k * 3..k * 3 + 3])
    }

    /// Normal of vertex `k`.
    pub fn normal(&self, k: usize) -> Vec3 {
        Vec3::from_slice(&self.normals[k * 3..k * 3 + 3])
    }
}

/// Point on the surface at polar angle `phi` and azimuth `theta`,
/// relative to the surface origin.
#[inline]
pub fn surface_point(params: &SurfaceParams, phi: f32, theta: f32) -> Vec3 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    let d = &params.denominators;
    Vec3::new(
        params.radius * sin_phi * sin_theta / d.b,
        params.radius * cos_phi / d.c,
        params.radius * sin_phi * cos_theta / d.a,
    )
}

/// Number of triangles `generate` emits for `params`.
pub fn expected_triangles(params: &SurfaceParams) -> usize {
    let h = params.segments.horizontal.max(1) as usize;
    let v = params.segments.vertical.max(1) as usize;
    if is_degenerate(params) {
        return 0;
    }
    let mut count = 2 * h * v - h;
    if reaches_lower_pole(params) {
        count -= h;
    }
    count
}

fn is_degenerate(params: &SurfaceParams) -> bool {
    params.angle_spans.horizontal <= EPSILON || params.angle_spans.vertical <= EPSILON
}

fn reaches_lower_pole(params: &SurfaceParams) -> bool {
    (params.angle_spans.vertical - std::f32::consts::PI).abs() < POLE_TOLERANCE
}

/// Tessellate `params` around `origin`.
///
/// The first ring is always the upper pole, so it only contributes the
/// lower triangle of each cell; the last ring drops its upper triangle
/// when the vertical span reaches the lower pole. A zero span produces a
/// single ring and no faces.
pub fn generate(params: &SurfaceParams, origin: Vec3) -> Mesh {
    let h = params.segments.horizontal.max(1);
    let v = params.segments.vertical.max(1);
    let degenerate = is_degenerate(params);
    let rows = if degenerate { 0 } else { v };
    let ring = h + 1;

    let h_inc = params.angle_spans.horizontal / h as f32;
    let v_inc = params.angle_spans.vertical / v as f32;

    let vertex_count = ((rows + 1) * ring) as usize;
    let mut mesh = Mesh {
        positions: Vec::with_capacity(vertex_count * 3),
        normals: Vec::with_capacity(vertex_count * 3),
        indices: Vec::with_capacity(expected_triangles(params) * 3),
        wires: Vec::new(),
    };

    for i in 0..=rows {
        let phi = i as f32 * v_inc;
        for j in 0..=h {
            let theta = j as f32 * h_inc;
            let n = surface_point(params, phi, theta);
            mesh.normals.extend_from_slice(&n.to_array());
            mesh.positions.extend_from_slice(&(n + origin).to_array());
        }
    }

    if degenerate {
        return mesh;
    }

    let lower_pole = reaches_lower_pole(params);

    for i in 0..v {
        for j in 0..h {
            let k0 = i * ring + j;
            let k1 = k0 + ring;
            if i != 0 {
                mesh.indices.extend_from_slice(&[k0, k1, k0 + 1]);
            }
            if !(lower_pole && i == v - 1) {
                mesh.indices.extend_from_slice(&[k0 + 1, k1, k1 + 1]);
            }
        }
    }

    for i in 0..=v {
        let pole_ring = i == 0 || (lower_pole && i == v);
        for j in 0..=h {
            let k = i * ring + j;
            if i < v {
                mesh.wires.extend_from_slice(&[k, k + ring]);
            }
            if j < h && !pole_ring {
                mesh.wires.extend_from_slice(&[k, k + 1]);
            }
        }
    }

    mesh
}
